//! Route-level authorization gates.
//!
//! Each gate runs after [`authenticate`](crate::middleware::auth::authenticate)
//! and includes the checks of the gates before it:
//!
//! 1. [`require_authenticated_user`]: rejects anonymous requests with 401
//! 2. [`require_activated_user`]: rejects unactivated accounts with 403
//! 3. [`require_permission`]: rejects users lacking a permission code with 403
//!
//! # Usage with axum::middleware::from_fn_with_state
//!
//! ```rust,ignore
//! use axum::{middleware, routing::post};
//! use crate::middleware::authorization::require_movies_write;
//!
//! let route = post(create_movie)
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_movies_write));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use marquee_core::AppError;
use marquee_core::permissions::{MOVIES_READ, MOVIES_WRITE};
use marquee_models::User;

use crate::middleware::auth::{CurrentUser, RequestUser};
use crate::modules::permissions::service::PermissionService;
use crate::state::AppState;

fn authenticated_user(user: &RequestUser) -> Result<&User, AppError> {
    user.user().ok_or_else(AppError::authentication_required)
}

fn activated_user(user: &RequestUser) -> Result<&User, AppError> {
    let user = authenticated_user(user)?;
    if !user.activated {
        return Err(AppError::inactive_account());
    }
    Ok(user)
}

pub async fn require_authenticated_user(
    CurrentUser(user): CurrentUser,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authenticated_user(&user)?;
    Ok(next.run(req).await)
}

pub async fn require_activated_user(
    CurrentUser(user): CurrentUser,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    activated_user(&user)?;
    Ok(next.run(req).await)
}

/// Checks that an activated user holds `code`; permissions are read fresh from storage.
pub async fn require_permission(
    state: &AppState,
    user: &RequestUser,
    code: &str,
) -> Result<(), AppError> {
    let user = activated_user(user)?;

    let permissions = PermissionService::get_all_for_user(&state.db, user.id).await?;
    if !permissions.include(code) {
        return Err(AppError::not_permitted());
    }

    Ok(())
}

pub async fn require_movies_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_permission(&state, &user, MOVIES_READ).await?;
    Ok(next.run(req).await)
}

pub async fn require_movies_write(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_permission(&state, &user, MOVIES_WRITE).await?;
    Ok(next.run(req).await)
}
