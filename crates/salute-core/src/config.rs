//! Server configuration
//!
//! Resolved once at startup and passed by value into [`crate::server::Server`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Loopback bind host
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Port used when `PORT` is unset or unparseable
pub const DEFAULT_PORT: u16 = 5000;

/// Largest accepted request body (100 KiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 100 * 1024;

/// Environment variable overriding the port
pub const PORT_ENV: &str = "PORT";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// How long to wait for in-flight connections on shutdown
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`
    ///
    /// `PORT` replaces the default port when it parses as a `u16`; any other
    /// value is logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    default = DEFAULT_PORT,
                    "ignoring unparseable PORT"
                ),
            }
        }

        config
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Socket address to bind
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
