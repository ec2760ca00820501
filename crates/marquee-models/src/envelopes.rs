//! Named top-level wrappers for JSON responses.
//!
//! Every success body is an object with a single well-known key (or, for
//! lists, a key plus `metadata`), never a bare array or scalar.

use marquee_auth::Token;
use marquee_core::Metadata;
use serde::Serialize;
use utoipa::ToSchema;

use crate::movies::Movie;
use crate::users::User;

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieEnvelope {
    pub movie: Movie,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MoviesEnvelope {
    pub movies: Vec<Movie>,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageEnvelope {
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticationTokenEnvelope {
    pub authentication_token: Token,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthEnvelope {
    pub status: String,
    pub system_info: SystemInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movies_envelope_shape() {
        let envelope = MoviesEnvelope {
            movies: vec![],
            metadata: Metadata::default(),
        };
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"movies":[],"metadata":{}}"#
        );
    }

    #[test]
    fn test_health_envelope_shape() {
        let envelope = HealthEnvelope {
            status: "available".to_string(),
            system_info: SystemInfo {
                environment: "development".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "available");
        assert_eq!(value["system_info"]["environment"], "development");
    }
}
