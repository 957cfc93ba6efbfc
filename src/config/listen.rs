//! Network listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:5050").
    pub address: SocketAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_config_deserialize_from_toml() {
        let config: ListenConfig = toml::from_str(r#"address = "[::1]:7000""#).unwrap();
        assert!(config.address.is_ipv6());
        assert_eq!(config.address.port(), 7000);
    }

    #[test]
    fn listen_config_rejects_bad_address() {
        let result: Result<ListenConfig, _> = toml::from_str(r#"address = "localhost""#);
        assert!(result.is_err());
    }
}
