use axum::{Json, extract::State, http::StatusCode};
use marquee_auth::TokenScope;
use marquee_core::{AppError, Validator};
use marquee_models::{
    AuthenticationTokenEnvelope, CreateAuthenticationTokenDto, MessageEnvelope, TokenRequestDto,
};
use tracing::instrument;

use crate::modules::tokens::service::TokenService;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::password;
use crate::validator::StrictJson;

/// Exchange email and password for an authentication token
///
/// Unactivated accounts may log in; activation is enforced by the routes
/// that need it.
#[utoipa::path(
    post,
    path = "/v1/tokens/authentication",
    request_body = CreateAuthenticationTokenDto,
    responses(
        (status = 201, description = "Token issued", body = AuthenticationTokenEnvelope),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Tokens"
)]
#[instrument(skip(state, dto))]
pub async fn create_authentication_token(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<CreateAuthenticationTokenDto>,
) -> Result<(StatusCode, Json<AuthenticationTokenEnvelope>), AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let user = UserService::get_by_email(&state.db, &dto.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !password::matches(dto.password, user.password_hash.clone()).await? {
        return Err(AppError::invalid_credentials());
    }

    let token = TokenService::new_token(&state.db, user.id, TokenScope::Authentication).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthenticationTokenEnvelope {
            authentication_token: token,
        }),
    ))
}

/// Request a fresh activation token by email
#[utoipa::path(
    post,
    path = "/v1/tokens/activation",
    request_body = TokenRequestDto,
    responses(
        (status = 202, description = "Activation email queued", body = MessageEnvelope),
        (status = 422, description = "Unknown email or already activated"),
    ),
    tag = "Tokens"
)]
#[instrument(skip(state, dto))]
pub async fn create_activation_token(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<TokenRequestDto>,
) -> Result<(StatusCode, Json<MessageEnvelope>), AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let user = UserService::get_by_email(&state.db, &dto.email)
        .await?
        .ok_or_else(|| AppError::field_error("email", "no matching email address found"))?;

    if user.activated {
        return Err(AppError::field_error("email", "user has already been activated"));
    }

    let token = TokenService::new_token(&state.db, user.id, TokenScope::Activation).await?;

    let email = state.email.clone();
    state.background.spawn("activation_email", async move {
        email.send_activation(&user.email, &token.plaintext).await
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageEnvelope::new(
            "an email will be sent to you containing activation instructions",
        )),
    ))
}

/// Request a password-reset token by email
#[utoipa::path(
    post,
    path = "/v1/tokens/password-reset",
    request_body = TokenRequestDto,
    responses(
        (status = 202, description = "Password reset email queued", body = MessageEnvelope),
        (status = 422, description = "Unknown email or unactivated account"),
    ),
    tag = "Tokens"
)]
#[instrument(skip(state, dto))]
pub async fn create_password_reset_token(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<TokenRequestDto>,
) -> Result<(StatusCode, Json<MessageEnvelope>), AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let user = UserService::get_by_email(&state.db, &dto.email)
        .await?
        .ok_or_else(|| AppError::field_error("email", "no matching email address found"))?;

    if !user.activated {
        return Err(AppError::field_error("email", "user account must be activated"));
    }

    let token = TokenService::new_token(&state.db, user.id, TokenScope::PasswordReset).await?;

    let email = state.email.clone();
    state.background.spawn("password_reset_email", async move {
        email.send_password_reset(&user.email, &token.plaintext).await
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageEnvelope::new(
            "an email will be sent to you containing password reset instructions",
        )),
    ))
}
