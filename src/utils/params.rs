//! Path and query-string helpers.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use marquee_core::{AppError, Validator};

/// A positive integer resource id taken from the `{id}` path segment.
///
/// Anything that is not an integer of at least 1 is answered with 404, the
/// same as an id that matches no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub i64);

impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found())?;

        parse_id(&raw).map(IdParam).ok_or_else(AppError::not_found)
    }
}

pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

pub fn read_string(value: Option<&str>, default: &str) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Splits a comma separated value; an absent or empty value yields `default`.
pub fn read_csv(value: Option<&str>, default: Vec<String>) -> Vec<String> {
    match value {
        Some(s) if !s.is_empty() => s.split(',').map(str::to_string).collect(),
        _ => default,
    }
}

/// Parses an integer, recording "must be an integer value" under `key` on failure.
pub fn read_int(value: Option<&str>, default: i64, key: &str, v: &mut Validator) -> i64 {
    match value {
        Some(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
        _ => default,
    }
}
