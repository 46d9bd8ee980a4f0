use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod binding;
mod config;
mod error;
mod fanout;
mod handler;
mod listener;
mod ports;

use config::{Config, Profile};

fn load_config(mut args: impl Iterator<Item = String>) -> Result<Config> {
    match args.next().as_deref() {
        None => {
            info!("No config given, using the cdn profile");
            Ok(Config::from_profile(Profile::Cdn))
        }
        Some("--profile") => {
            let name = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("--profile needs a name (cdn or path-echo)"))?;
            info!("Using the {} profile", name);
            Ok(Config::from_profile(name.parse()?))
        }
        Some(path) => {
            info!("Loading config from {}", path);
            Config::from_file(path)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("portecho=info")),
        )
        .init();

    info!("Starting portecho");

    let config = load_config(std::env::args().skip(1))?;
    info!(
        "Loaded config with {} ports ({:?} rule, serialize_responses={})",
        config.server.ports.len(),
        config.server.rule,
        config.server.serialize_responses
    );

    let fanout = fanout::FanOut::new(
        config.bindings(),
        &config.server.message,
        config.server.serialize_responses,
    );
    if fanout.is_empty() {
        warn!("No ports configured");
    }

    fanout.run().await;
    Ok(())
}
