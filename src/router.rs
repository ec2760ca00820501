use std::any::Any;

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use marquee_config::CorsConfig;
use marquee_core::AppError;
use marquee_core::errors::SERVER_ERROR_MESSAGE;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, render_metrics};
use crate::middleware::auth::authenticate;
use crate::middleware::rate_limit::rate_limit;
use crate::modules::healthcheck::router::init_healthcheck_router;
use crate::modules::movies::router::init_movies_router;
use crate::modules::tokens::router::init_tokens_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Builds the full application.
///
/// Outermost first, every request passes panic recovery, metrics, logging,
/// CORS, rate limiting and authentication before reaching its route.
pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/debug/metrics", get(render_metrics))
        .merge(init_healthcheck_router())
        .merge(init_movies_router(&state))
        .merge(init_users_router())
        .merge(init_tokens_router())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .layer(cors_layer(&state.cors_config))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::not_found()
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::method_not_allowed(method.as_str())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .trusted_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::OPTIONS,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONNECTION, "close")],
        axum::Json(json!({ "error": SERVER_ERROR_MESSAGE })),
    )
        .into_response()
}
