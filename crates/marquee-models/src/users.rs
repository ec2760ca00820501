use chrono::{DateTime, Utc};
use marquee_auth::validate_plaintext;
use marquee_core::Validator;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::ValidateEmail;

pub const PASSWORD_MIN_BYTES: usize = 8;
/// bcrypt ignores everything past the 72nd byte.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// A registered account.
///
/// The password hash and row version never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub activated: bool,
    #[serde(skip)]
    pub version: i32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterUserDto {
    #[schema(example = "Alice Smith")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "pa55word")]
    pub password: String,
}

impl RegisterUserDto {
    pub fn validate(&self, v: &mut Validator) {
        validate_name(v, &self.name);
        validate_email(v, &self.email);
        validate_password_plaintext(v, &self.password);
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ActivateUserDto {
    #[schema(example = "Y3QMGX3PJ3WLRL2YRTQGQ6KRHU")]
    pub token: String,
}

impl ActivateUserDto {
    pub fn validate(&self, v: &mut Validator) {
        validate_plaintext(v, &self.token);
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ResetPasswordDto {
    pub password: String,
    pub token: String,
}

impl ResetPasswordDto {
    pub fn validate(&self, v: &mut Validator) {
        validate_password_plaintext(v, &self.password);
        validate_plaintext(v, &self.token);
    }
}

pub fn validate_name(v: &mut Validator, name: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(name.len() <= 500, "name", "must not be more than 500 bytes long");
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(email.validate_email(), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}
