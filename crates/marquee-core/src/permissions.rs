//! Permission codes for the Marquee API.
//!
//! Codes are matched exactly against the rows in the `permissions` table.
//!
//! # Example
//!
//! ```ignore
//! use marquee_core::permissions;
//!
//! if user_permissions.include(permissions::MOVIES_WRITE) {
//!     // Create movie
//! }
//! ```

/// Permission to read individual movies
pub const MOVIES_READ: &str = "movies:read";
/// Permission to create, update and delete movies
pub const MOVIES_WRITE: &str = "movies:write";

/// Codes granted to every newly registered user.
pub const DEFAULT_USER_PERMISSIONS: &[&str] = &[MOVIES_READ];
