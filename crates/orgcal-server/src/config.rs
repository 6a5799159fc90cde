//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use orgcal_core::WindowLimits;
use orgcal_engine::DEFAULT_ADAPTER_TIMEOUT;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,

    /// Whether browser clients from other origins may call the API.
    pub enable_cors: bool,

    /// Upper bound on each source fetch.
    pub adapter_timeout: Duration,

    /// Window span and page size limits.
    pub limits: WindowLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            enable_cors: true,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            limits: WindowLimits::default(),
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration bound to the given address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: enable or disable CORS.
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Builder: set the per-source fetch timeout.
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Builder: set the window limits.
    pub fn with_limits(mut self, limits: WindowLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Returns the default bind address, loopback only.
pub fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7410))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, default_bind_addr());
        assert!(config.enable_cors);
        assert_eq!(config.adapter_timeout, Duration::from_secs(10));
        assert_eq!(config.limits.max_span_days, 400);
    }

    #[test]
    fn custom_config() {
        let config = ServerConfig::new(SocketAddr::from(([0, 0, 0, 0], 8080)))
            .with_cors(false)
            .with_adapter_timeout(Duration::from_secs(2))
            .with_limits(WindowLimits::default().with_max_events(100));

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.enable_cors);
        assert_eq!(config.adapter_timeout, Duration::from_secs(2));
        assert_eq!(config.limits.max_events, 100);
    }
}
