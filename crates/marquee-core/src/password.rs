//! Password hashing with bcrypt.
//!
//! Only the hash is ever stored. A plaintext password exists solely inside the
//! request that carries it.

use anyhow::Context;
use bcrypt::{hash, verify};

use crate::errors::AppError;

pub const BCRYPT_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .context("failed to hash password")
        .map_err(AppError::internal)
}

/// Returns `Ok(false)` on a mismatch; errors only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .context("failed to verify password")
        .map_err(AppError::internal)
}
