use std::sync::Arc;

use anyhow::Context;
use marquee_config::{CorsConfig, DatabaseConfig, EmailConfig, RateLimitConfig, ServerConfig};
use marquee_db::{PgPool, init_db_pool};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::middleware::rate_limit::RateLimiter;
use crate::utils::background::BackgroundTasks;
use crate::utils::email::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub server_config: ServerConfig,
    pub cors_config: CorsConfig,
    pub email: EmailService,
    pub rate_limiter: Arc<RateLimiter>,
    pub background: BackgroundTasks,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        server_config: ServerConfig,
        cors_config: CorsConfig,
        email_config: EmailConfig,
        rate_limit_config: &RateLimitConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            server_config,
            cors_config,
            email: EmailService::new(email_config),
            rate_limiter: Arc::new(RateLimiter::from_config(rate_limit_config)?),
            background: BackgroundTasks::new(),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Builds the application state from environment variables.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let database_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let db = init_db_pool(&database_config)
        .await
        .context("failed to connect to database")?;

    AppState::new(
        db,
        ServerConfig::from_env(),
        CorsConfig::from_env(),
        EmailConfig::from_env(),
        &RateLimitConfig::from_env(),
    )
}
