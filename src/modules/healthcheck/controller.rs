use axum::{Json, extract::State};
use marquee_models::{HealthEnvelope, SystemInfo};

use crate::state::AppState;

/// Report service availability
#[utoipa::path(
    get,
    path = "/v1/healthcheck",
    responses(
        (status = 200, description = "Service is available", body = HealthEnvelope),
    ),
    tag = "Health"
)]
pub async fn healthcheck(State(state): State<AppState>) -> Json<HealthEnvelope> {
    Json(HealthEnvelope {
        status: "available".to_string(),
        system_info: SystemInfo {
            environment: state.server_config.environment.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}
