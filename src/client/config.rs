//! Client configuration

use std::time::Duration;

/// Client configuration options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address to connect to, as `host:port`
    pub server_addr: String,

    /// Timeout for establishing the connection
    pub connect_timeout: Duration,

    /// Enable TCP_NODELAY on the connection
    pub tcp_nodelay: bool,
}

impl ClientConfig {
    /// Create a config for the given server address
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            connect_timeout: Duration::from_secs(10),
            tcp_nodelay: true,
        }
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = ClientConfig::new("127.0.0.1:11111");

        assert_eq!(config.server_addr, "127.0.0.1:11111");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ClientConfig::new("example.com:4000")
            .connect_timeout(Duration::from_secs(3))
            .tcp_nodelay(false);

        assert_eq!(config.server_addr, "example.com:4000");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.tcp_nodelay);
    }
}
