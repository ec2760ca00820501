use marquee_core::Validator;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::users::{validate_email, validate_password_plaintext};

/// Login body for `POST /v1/tokens/authentication`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct CreateAuthenticationTokenDto {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "pa55word")]
    pub password: String,
}

impl CreateAuthenticationTokenDto {
    pub fn validate(&self, v: &mut Validator) {
        validate_email(v, &self.email);
        validate_password_plaintext(v, &self.password);
    }
}

/// Body for requesting a fresh activation or password-reset token by email.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct TokenRequestDto {
    #[schema(example = "alice@example.com")]
    pub email: String,
}

impl TokenRequestDto {
    pub fn validate(&self, v: &mut Validator) {
        validate_email(v, &self.email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_body_validation() {
        let dto: CreateAuthenticationTokenDto =
            serde_json::from_str(r#"{"email": "alice@example.com"}"#).unwrap();
        let mut v = Validator::new();
        dto.validate(&mut v);
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["password"], "must be provided");
    }

    #[test]
    fn test_token_request_requires_email() {
        let mut v = Validator::new();
        TokenRequestDto::default().validate(&mut v);
        assert_eq!(v.errors()["email"], "must be provided");
    }
}
