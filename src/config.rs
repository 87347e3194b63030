//! Node configuration read from the environment (and `.env`, if present).

use std::env;
use std::time::Duration;

use crate::blockchain::DEFAULT_MINING_INTERVAL_SECS;
use crate::consensus::EngineConfig;
use crate::error::ConfigError;

const DEFAULT_NODE_ID: &str = "5000";
const DEFAULT_BROADCAST_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// This node's identifier; by convention the port it serves on.
    pub node_id: String,
    /// Round-robin roster, in leader order.
    pub nodes: Vec<String>,
    pub mining_interval: Duration,
    pub host: String,
    pub port: u16,
    /// Host part of peer URLs; peers are addressed as `peer_host:node_id`.
    pub peer_host: String,
    pub broadcast_timeout: Duration,
}

impl NodeConfig {
    /// Reads `NODE_ID`, `NODES`, `MINING_INTERVAL_SECS`, `HOST`, `PORT`,
    /// `PEER_HOST` and `BROADCAST_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let node_id = lookup("NODE_ID").unwrap_or_else(|| DEFAULT_NODE_ID.to_string());

        let nodes: Vec<String> = match lookup("NODES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => vec![node_id.clone()],
        };
        if nodes.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let mining_interval_secs = parse_or(&lookup, "MINING_INTERVAL_SECS", DEFAULT_MINING_INTERVAL_SECS)?;
        let broadcast_timeout_ms = parse_or(&lookup, "BROADCAST_TIMEOUT_MS", DEFAULT_BROADCAST_TIMEOUT_MS)?;
        let default_port = node_id.parse::<u16>().unwrap_or(5000);
        let port = parse_or(&lookup, "PORT", default_port)?;

        Ok(Self {
            node_id,
            nodes,
            mining_interval: Duration::from_secs(mining_interval_secs),
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            peer_host: lookup("PEER_HOST").unwrap_or_else(|| "localhost".to_string()),
            broadcast_timeout: Duration::from_millis(broadcast_timeout_ms),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.node_id.clone(), self.nodes.clone(), self.mining_interval)
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::NodeConfig;
    use crate::error::ConfigError;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config(pairs: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_to_single_node() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.node_id, "5000");
        assert_eq!(cfg.nodes, vec!["5000".to_string()]);
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.mining_interval, Duration::from_secs(5));
        assert_eq!(cfg.peer_host, "localhost");
    }

    #[test]
    fn parses_roster_and_derives_port() {
        let cfg = config(&[
            ("NODE_ID", "5001"),
            ("NODES", "5000, 5001,5002"),
            ("MINING_INTERVAL_SECS", "2"),
        ])
        .unwrap();
        assert_eq!(cfg.nodes, vec!["5000", "5001", "5002"]);
        assert_eq!(cfg.port, 5001);
        assert_eq!(cfg.engine_config().mining_interval(), Duration::from_secs(2));
    }

    #[test]
    fn engine_roster_gains_missing_self() {
        let cfg = config(&[("NODE_ID", "5009"), ("NODES", "5000")]).unwrap();
        assert_eq!(cfg.engine_config().nodes(), vec!["5000", "5009"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("MINING_INTERVAL_SECS", "soon")]),
            Err(ConfigError::Invalid { var: "MINING_INTERVAL_SECS", .. })
        ));
        assert!(matches!(
            config(&[("NODES", " , ")]),
            Err(ConfigError::EmptyRoster)
        ));
    }
}
