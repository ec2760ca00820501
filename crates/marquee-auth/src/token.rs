//! Opaque, single-purpose tokens.
//!
//! A token is 16 bytes from the operating system's CSPRNG, encoded as
//! unpadded base32. That always yields a 26 character plaintext drawn from
//! `A-Z2-7`. The plaintext is shown to the client exactly once; storage only
//! ever sees its SHA-256 digest together with the owning user, the scope and
//! the expiry instant.

use chrono::{DateTime, Duration, Utc};
use data_encoding::BASE32_NOPAD;
use marquee_core::Validator;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// Length of every plaintext token.
pub const TOKEN_LENGTH: usize = 26;

const TOKEN_BYTES: usize = 16;

/// The single purpose a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TokenScope {
    Activation,
    Authentication,
    PasswordReset,
}

impl TokenScope {
    /// Value stored in the `tokens.scope` column.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenScope::Activation => "activation",
            TokenScope::Authentication => "authentication",
            TokenScope::PasswordReset => "password-reset",
        }
    }

    /// How long a freshly issued token of this scope stays valid.
    pub fn ttl(self) -> Duration {
        match self {
            TokenScope::Activation => Duration::days(3),
            TokenScope::Authentication => Duration::hours(24),
            TokenScope::PasswordReset => Duration::minutes(45),
        }
    }
}

impl std::fmt::Display for TokenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly issued token.
///
/// Serializes to `{"token": ..., "expiry": ...}`; the hash, owner and scope
/// stay server-side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Token {
    #[serde(rename = "token")]
    pub plaintext: String,
    #[serde(skip)]
    pub hash: Vec<u8>,
    #[serde(skip)]
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    #[serde(skip)]
    pub scope: TokenScope,
}

impl Token {
    /// Issues a token valid for the scope's default lifetime.
    pub fn generate(user_id: i64, scope: TokenScope) -> Self {
        Self::generate_with_ttl(user_id, scope.ttl(), scope)
    }

    pub fn generate_with_ttl(user_id: i64, ttl: Duration, scope: TokenScope) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let plaintext = BASE32_NOPAD.encode(&bytes);
        let hash = hash_plaintext(&plaintext);

        Self {
            plaintext,
            hash,
            user_id,
            expiry: Utc::now() + ttl,
            scope,
        }
    }
}

/// SHA-256 digest of a plaintext token, as stored in `tokens.hash`.
pub fn hash_plaintext(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// Records an error under `token` unless the plaintext is well-formed.
pub fn validate_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() == TOKEN_LENGTH,
        "token",
        "must be 26 bytes long",
    );
    v.check(
        plaintext
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b)),
        "token",
        "must only contain base32 characters",
    );
}
