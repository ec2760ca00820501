//! Rate limiting configuration.
//!
//! Each client IP gets its own token bucket:
//!
//! - Tokens are added at `rps` per second
//! - Each request consumes one token
//! - `burst` is the maximum number of tokens a bucket holds
//! - Requests are rejected when the bucket is empty
//!
//! # Environment Variables
//!
//! - `LIMITER_RPS`: Refill rate in requests per second, fractional allowed (default: 2)
//! - `LIMITER_BURST`: Bucket capacity (default: 4)
//! - `LIMITER_ENABLED`: Set to `false` to disable rate limiting (default: true)

use std::num::NonZeroU32;
use std::time::Duration;

use governor::Quota;

use crate::{env_flag, env_or};

/// How often idle clients are swept from the limiter.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Clients not seen for longer than this are evicted by the sweep.
pub const CLIENT_IDLE_TTL: Duration = Duration::from_secs(3 * 60);

#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitConfig {
    /// Requests per second a client may sustain.
    pub rps: f64,
    /// Requests a client may make in an instant burst.
    pub burst: u32,
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rps: 2.0,
            burst: 4,
            enabled: true,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rps: env_or("LIMITER_RPS", defaults.rps),
            burst: env_or("LIMITER_BURST", defaults.burst),
            enabled: env_flag("LIMITER_ENABLED", defaults.enabled),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Builds the per-client token bucket quota.
    ///
    /// Returns `None` when `rps` is not a positive finite number, when its
    /// period does not fit a `Duration`, or when `burst` is zero.
    #[must_use]
    pub fn quota(&self) -> Option<Quota> {
        if !self.rps.is_finite() || self.rps <= 0.0 {
            return None;
        }
        let burst = NonZeroU32::new(self.burst)?;
        let period = Duration::try_from_secs_f64(1.0 / self.rps).ok()?;
        Quota::with_period(period).map(|q| q.allow_burst(burst))
    }
}
