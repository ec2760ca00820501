use std::time::Duration;

use crate::env_or;

/// HTTP server settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on (`PORT`, default 4000).
    pub port: u16,
    /// Environment name reported by the healthcheck (`ENVIRONMENT`, default `development`).
    pub environment: String,
    /// How long in-flight requests may run after a shutdown signal
    /// (`SHUTDOWN_GRACE_SECONDS`, default 30).
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            environment: "development".to_string(),
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            shutdown_grace: Duration::from_secs(env_or("SHUTDOWN_GRACE_SECONDS", 30)),
        }
    }
}
