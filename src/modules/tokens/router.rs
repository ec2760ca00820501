use axum::{Router, routing::post};

use crate::modules::tokens::controller::{
    create_activation_token, create_authentication_token, create_password_reset_token,
};
use crate::state::AppState;

pub fn init_tokens_router() -> Router<AppState> {
    Router::new()
        .route("/v1/tokens/authentication", post(create_authentication_token))
        .route("/v1/tokens/activation", post(create_activation_token))
        .route("/v1/tokens/password-reset", post(create_password_reset_token))
}
