//! # Marquee Core
//!
//! Core types, errors, and utilities for the Marquee API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`validator`]: Field-level validation error accumulator
//! - [`filters`]: Paging, sorting and response metadata for list endpoints
//! - [`password`]: Password hashing and verification
//! - [`permissions`]: Capability codes checked by the authorization layer
//!
//! # Example
//!
//! ```ignore
//! use marquee_core::{AppError, Validator};
//!
//! let mut v = Validator::new();
//! v.check(!title.is_empty(), "title", "must be provided");
//! v.into_result()?;
//! ```

pub mod errors;
pub mod filters;
pub mod password;
pub mod permissions;
pub mod validator;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use filters::{Filters, Metadata};
pub use password::{hash_password, verify_password};
pub use validator::{FieldErrors, Validator};
