use crate::binding::ListenerBinding;
use crate::handler::ResponseRule;
use serde::Deserialize;
use std::str::FromStr;

use crate::ports::CDN_PORTS;

pub const PATH_ECHO_PORT: &str = "8888";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_ip: String,
    pub ports: Vec<String>,
    pub rule: ResponseRule,
    /// `{port}` is replaced with the port string.
    pub message: String,
    pub serialize_responses: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_ip: "0.0.0.0".to_string(),
            ports: CDN_PORTS.iter().map(|p| p.to_string()).collect(),
            rule: ResponseRule::Port,
            message: "{port}".to_string(),
            serialize_responses: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Cdn,
    PathEcho,
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cdn" => Ok(Profile::Cdn),
            "path-echo" => Ok(Profile::PathEcho),
            other => anyhow::bail!("unknown profile '{}' (expected cdn or path-echo)", other),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_profile(profile: Profile) -> Self {
        match profile {
            Profile::Cdn => Config::default(),
            Profile::PathEcho => Config {
                server: ServerConfig {
                    ports: vec![PATH_ECHO_PORT.to_string()],
                    rule: ResponseRule::Path,
                    serialize_responses: false,
                    ..ServerConfig::default()
                },
            },
        }
    }

    pub fn bindings(&self) -> Vec<ListenerBinding> {
        self.server
            .ports
            .iter()
            .map(|port| ListenerBinding {
                bind_ip: self.server.bind_ip.clone(),
                port: port.clone(),
                rule: self.server.rule,
            })
            .collect()
    }
}
