use axum::{Json, extract::State, http::StatusCode};
use marquee_auth::TokenScope;
use marquee_core::{AppError, Validator};
use marquee_models::{
    ActivateUserDto, MessageEnvelope, RegisterUserDto, ResetPasswordDto, UserEnvelope,
};
use tracing::instrument;

use crate::metrics::track_user_registered;
use crate::modules::tokens::service::TokenService;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::password;
use crate::validator::StrictJson;

/// Register a new user
///
/// The account starts unactivated with `movies:read`. An activation token is
/// emailed in the background.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = RegisterUserDto,
    responses(
        (status = 201, description = "User registered", body = UserEnvelope),
        (status = 400, description = "Malformed body"),
        (status = 422, description = "Validation failed or email already registered"),
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<RegisterUserDto>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let password_hash = password::hash(dto.password).await?;
    let user = UserService::register(&state.db, &dto.name, &dto.email, &password_hash).await?;
    track_user_registered();

    let token = TokenService::new_token(&state.db, user.id, TokenScope::Activation).await?;

    let email = state.email.clone();
    let (to, name, user_id) = (user.email.clone(), user.name.clone(), user.id);
    state.background.spawn("welcome_email", async move {
        email.send_welcome(&to, &name, user_id, &token.plaintext).await
    });

    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

/// Activate a user account
#[utoipa::path(
    put,
    path = "/v1/users/activated",
    request_body = ActivateUserDto,
    responses(
        (status = 200, description = "User activated", body = UserEnvelope),
        (status = 409, description = "Edit conflict"),
        (status = 422, description = "Invalid or expired activation token"),
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn activate_user(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<ActivateUserDto>,
) -> Result<Json<UserEnvelope>, AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let mut user = UserService::get_for_token(&state.db, TokenScope::Activation, &dto.token)
        .await?
        .ok_or_else(|| AppError::field_error("token", "invalid or expired activation token"))?;

    user.activated = true;
    UserService::update(&state.db, &mut user).await?;
    TokenService::delete_all_for_user(&state.db, TokenScope::Activation, user.id).await?;

    Ok(Json(UserEnvelope { user }))
}

/// Set a new password with a password-reset token
#[utoipa::path(
    put,
    path = "/v1/users/password",
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password updated", body = MessageEnvelope),
        (status = 409, description = "Edit conflict"),
        (status = 422, description = "Invalid password or expired token"),
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user_password(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<ResetPasswordDto>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let mut user = UserService::get_for_token(&state.db, TokenScope::PasswordReset, &dto.token)
        .await?
        .ok_or_else(|| AppError::field_error("token", "invalid or expired password reset token"))?;

    user.password_hash = password::hash(dto.password).await?;
    UserService::update(&state.db, &mut user).await?;
    TokenService::delete_all_for_user(&state.db, TokenScope::PasswordReset, user.id).await?;

    Ok(Json(MessageEnvelope::new("your password was successfully reset")))
}
