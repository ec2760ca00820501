use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use marquee_auth::{TokenScope, validate_plaintext};
use marquee_core::{AppError, Validator};
use marquee_models::User;

use crate::modules::users::service::UserService;
use crate::state::AppState;

/// Identity attached to every request by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUser {
    Anonymous,
    Authenticated(User),
}

impl RequestUser {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, RequestUser::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            RequestUser::Anonymous => None,
            RequestUser::Authenticated(user) => Some(user),
        }
    }
}

/// Extractor for the identity resolved by [`authenticate`].
///
/// Using it on a route the middleware does not cover is a wiring bug and
/// fails the request with a 500.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::internal(anyhow!("missing user value in request extensions")))
    }
}

/// Resolves the `Authorization: Bearer <token>` header into a [`RequestUser`].
///
/// A missing or empty header means anonymous. A present but unusable header is a 401
/// carrying `WWW-Authenticate: Bearer`. Every response varies on
/// `Authorization`.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut response = match resolve(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<RequestUser, AppError> {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .filter(|value| !value.is_empty())
    else {
        return Ok(RequestUser::Anonymous);
    };

    let plaintext = value
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(AppError::invalid_authentication_token)?;

    let mut v = Validator::new();
    validate_plaintext(&mut v, plaintext);
    if !v.is_valid() {
        return Err(AppError::invalid_authentication_token());
    }

    UserService::get_for_token(&state.db, TokenScope::Authentication, plaintext)
        .await?
        .map(RequestUser::Authenticated)
        .ok_or_else(AppError::invalid_authentication_token)
}

/// Splits `Bearer <token>` into its token; anything but exactly two
/// space-separated parts with the `Bearer` scheme is rejected.
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}
