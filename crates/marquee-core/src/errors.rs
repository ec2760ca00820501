//! Application error type rendered as a JSON envelope.
//!
//! Every error leaves the API as `{"error": ...}` where the value is either a
//! message string or, for validation failures, a map of field name to message.
//! Server errors are logged with their full chain and replaced by a generic
//! message before they reach the client.

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::validator::FieldErrors;

/// Message returned to the client for any 5xx response.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub field_errors: Option<FieldErrors>,
    pub headers: HeaderMap,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            field_errors: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            anyhow!("the requested resource could not be found"),
        )
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            anyhow!("the {} method is not supported for this resource", method),
        )
    }

    pub fn failed_validation(field_errors: FieldErrors) -> Self {
        let mut err = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            anyhow!("request failed validation"),
        );
        err.field_errors = Some(field_errors);
        err
    }

    /// Shorthand for a single-field validation failure.
    pub fn field_error(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.to_string());
        Self::failed_validation(errors)
    }

    pub fn edit_conflict() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            anyhow!("unable to update the record due to an edit conflict, please try again"),
        )
    }

    pub fn rate_limit_exceeded() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, anyhow!("rate limit exceeded"))
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            anyhow!("invalid authentication credentials"),
        )
    }

    pub fn invalid_authentication_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            anyhow!("invalid or missing authentication token"),
        )
        .with_header(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))
    }

    pub fn authentication_required() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            anyhow!("you must be authenticated to access this resource"),
        )
    }

    pub fn inactive_account() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            anyhow!("your user account must be activated to access this resource"),
        )
    }

    pub fn not_permitted() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            anyhow!(
                "your user account doesn't have the necessary permissions to access this resource"
            ),
        )
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Unwraps into the underlying error for non-HTTP callers such as the CLI.
    ///
    /// Field errors are folded into the message.
    pub fn into_anyhow(self) -> Error {
        match self.field_errors {
            Some(fields) => {
                let detail = fields
                    .iter()
                    .map(|(field, message)| format!("{field}: {message}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.error.context(detail)
            }
            None => self.error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = if self.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "request failed");
            json!({ "error": SERVER_ERROR_MESSAGE })
        } else if let Some(fields) = &self.field_errors {
            json!({ "error": fields })
        } else {
            json!({ "error": self.error.to_string() })
        };

        let mut response = (self.status, Json(body)).into_response();
        response.headers_mut().extend(self.headers);
        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
