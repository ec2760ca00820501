use axum::{
    Router,
    routing::{post, put},
};

use crate::modules::users::controller::{activate_user, register_user, update_user_password};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(register_user))
        .route("/v1/users/activated", put(activate_user))
        .route("/v1/users/password", put(update_user_password))
}
