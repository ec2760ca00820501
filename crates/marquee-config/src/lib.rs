//! # Marquee Config
//!
//! Configuration types for the Marquee API.
//!
//! Every structure is loaded from environment variables (a `.env` file is
//! honoured by the binaries through `dotenvy`) and falls back to defaults:
//!
//! - [`server`]: Listen port, environment name, shutdown grace period
//! - [`database`]: PostgreSQL connection pool settings
//! - [`rate_limit`]: Per-client request rate limiting
//! - [`cors`]: Trusted CORS origins
//! - [`email`]: SMTP settings for outbound notifications
//!
//! # Example
//!
//! ```ignore
//! use marquee_config::{DatabaseConfig, RateLimitConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let database = DatabaseConfig::from_env()?;
//! let limiter = RateLimitConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod rate_limit;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Accepts `true`/`1`/`yes` (case-insensitive) as enabled.
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
