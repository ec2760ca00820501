//! Async wrappers around bcrypt.
//!
//! Hashing at cost 12 takes a few hundred milliseconds of CPU, so it runs on
//! the blocking pool instead of a runtime worker.

use anyhow::Context;
use marquee_core::{AppError, hash_password, verify_password};

pub async fn hash(plaintext: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .context("password hashing task failed")?
}

pub async fn matches(plaintext: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash))
        .await
        .context("password verification task failed")?
}
