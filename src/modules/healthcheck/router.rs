use axum::{Router, routing::get};

use crate::modules::healthcheck::controller::healthcheck;
use crate::state::AppState;

pub fn init_healthcheck_router() -> Router<AppState> {
    Router::new().route("/v1/healthcheck", get(healthcheck))
}
