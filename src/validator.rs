//! Strict JSON request bodies.
//!
//! [`StrictJson`] accepts exactly one JSON value of at most 1 MiB whose keys
//! all belong to the target type. Every failure is a 400 with a message that
//! names what was wrong with the body.

use anyhow::anyhow;
use axum::extract::{FromRequest, Request};
use marquee_core::AppError;
use marquee_models::movies::InvalidRuntimeFormat;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|err| {
                let inner = err.into_inner();
                if inner
                    .downcast_ref::<http_body_util::LengthLimitError>()
                    .is_some()
                {
                    AppError::bad_request(anyhow!(
                        "body must not be larger than {} bytes",
                        MAX_BODY_BYTES
                    ))
                } else {
                    AppError::bad_request(anyhow!("failed to read request body: {}", inner))
                }
            })?;

        decode(&bytes).map(StrictJson)
    }
}

/// Decodes a single JSON value, rejecting trailing data.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.trim_ascii().is_empty() {
        return Err(AppError::bad_request(anyhow!("body must not be empty")));
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = T::deserialize(&mut de).map_err(describe)?;
    de.end().map_err(|_| {
        AppError::bad_request(anyhow!("body must only contain a single JSON value"))
    })?;

    Ok(value)
}

fn describe(err: serde_json::Error) -> AppError {
    let message = match err.classify() {
        Category::Syntax => format!(
            "body contains badly-formed JSON (at line {} column {})",
            err.line(),
            err.column()
        ),
        Category::Eof => "body contains badly-formed JSON".to_string(),
        Category::Data => {
            let location = format!(" at line {} column {}", err.line(), err.column());
            let text = err.to_string();
            let detail = text.strip_suffix(&location).unwrap_or(&text);

            if let Some(field) = unknown_field(detail) {
                format!("body contains unknown key \"{field}\"")
            } else if detail == InvalidRuntimeFormat.to_string() {
                detail.to_string()
            } else {
                format!("body contains incorrect JSON type ({detail})")
            }
        }
        Category::Io => format!("failed to read request body: {err}"),
    };

    AppError::bad_request(anyhow!(message))
}

fn unknown_field(detail: &str) -> Option<&str> {
    detail
        .strip_prefix("unknown field `")
        .and_then(|rest| rest.split('`').next())
}
