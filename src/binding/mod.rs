use crate::handler::ResponseRule;

/// A port plus the rule its handler answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerBinding {
    pub bind_ip: String,
    pub port: String,
    pub rule: ResponseRule,
}

impl ListenerBinding {
    pub fn address(&self) -> String {
        if self.bind_ip.contains(':') && !self.bind_ip.starts_with('[') {
            format!("[{}]:{}", self.bind_ip, self.port)
        } else {
            format!("{}:{}", self.bind_ip, self.port)
        }
    }
}
