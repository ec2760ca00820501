//! Per-client rate limiting.
//!
//! Every remote IP owns a token bucket. Buckets live in a single map behind
//! one mutex that the request path and the idle sweep both take, so a client
//! can never be evicted between lookup and check.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota};
use marquee_config::RateLimitConfig;
use marquee_config::rate_limit::{CLIENT_IDLE_TTL, SWEEP_INTERVAL};
use marquee_core::AppError;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::utils::background::BackgroundTasks;

struct Client {
    limiter: DefaultDirectRateLimiter,
    last_seen: Instant,
}

pub struct RateLimiter {
    quota: Option<Quota>,
    clients: Mutex<HashMap<IpAddr, Client>>,
}

impl RateLimiter {
    /// Builds a limiter from configuration.
    ///
    /// # Errors
    ///
    /// Fails when limiting is enabled but `rps` or `burst` cannot form a quota.
    pub fn from_config(config: &RateLimitConfig) -> anyhow::Result<Self> {
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let quota = config.quota().ok_or_else(|| {
            anyhow!(
                "invalid rate limit: rps must be positive and burst non-zero (rps={}, burst={})",
                config.rps,
                config.burst
            )
        })?;

        Ok(Self::new(quota))
    }

    pub fn new(quota: Quota) -> Self {
        Self {
            quota: Some(quota),
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            quota: None,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.quota.is_some()
    }

    /// Takes one token from `ip`'s bucket, creating the bucket on first sight.
    ///
    /// Returns `false` when the bucket is empty. Always `true` when disabled.
    pub fn check(&self, ip: IpAddr) -> bool {
        let Some(quota) = self.quota else {
            return true;
        };

        let now = Instant::now();
        let mut clients = self.clients.lock();
        let client = clients.entry(ip).or_insert_with(|| Client {
            limiter: DefaultDirectRateLimiter::direct(quota),
            last_seen: now,
        });
        client.last_seen = now;
        client.limiter.check().is_ok()
    }

    /// Drops clients not seen within [`CLIENT_IDLE_TTL`] of `now`.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain(|_, client| now.saturating_duration_since(client.last_seen) <= CLIENT_IDLE_TTL);
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }

    /// Starts the idle sweep on the background tracker until `shutdown` fires.
    ///
    /// Does nothing when the limiter is disabled.
    pub fn spawn_sweeper(self: &Arc<Self>, tasks: &BackgroundTasks, shutdown: CancellationToken) {
        if !self.is_enabled() {
            return;
        }

        let limiter = Arc::clone(self);
        tasks.spawn("rate_limit_sweeper", async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            // first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        let evicted = limiter.evict_idle(Instant::now());
                        if evicted > 0 {
                            debug!(evicted, remaining = limiter.tracked_clients(), "evicted idle rate limit clients");
                        }
                    }
                }
            }

            info!("rate limit sweeper stopped");
            Ok(())
        });
    }
}

/// Rejects the request with 429 once the client's bucket is empty.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !limiter.is_enabled() {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let ConnectInfo(addr) = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &())
        .await
        .map_err(|e| AppError::internal(anyhow!("client address unavailable: {}", e)))?;

    if !limiter.check(addr.ip()) {
        return Err(AppError::rate_limit_exceeded());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
