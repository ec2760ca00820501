//! # Marquee Auth
//!
//! Stateful token and permission primitives for the Marquee API.
//!
//! - [`token`]: Opaque random tokens, their SHA-256 hashes, scopes and expiry
//! - [`permissions`]: The set of capability codes granted to a user
//!
//! Tokens are handed to the client once in plaintext. Only the hash is
//! persisted, so a leaked `tokens` table cannot be replayed against the API.
//!
//! # Example
//!
//! ```ignore
//! use marquee_auth::{Token, TokenScope};
//!
//! let token = Token::generate(user.id, TokenScope::Authentication);
//! store(&token.hash, token.user_id, token.expiry, token.scope).await?;
//! respond_with(token.plaintext);
//! ```

pub mod permissions;
pub mod token;

// Re-export commonly used types at crate root
pub use permissions::Permissions;
pub use token::{TOKEN_LENGTH, Token, TokenScope, hash_plaintext, validate_plaintext};
