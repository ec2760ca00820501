//! Administrative operations backing the `marquee-cli` binary.

use anyhow::{Context, anyhow, bail};
use marquee_auth::Permissions;
use marquee_models::User;
use sqlx::PgPool;

use crate::modules::permissions::service::PermissionService;
use crate::modules::users::service::UserService;

/// Applies all pending migrations from `./migrations`.
pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("failed to run migrations")
}

async fn find_user(db: &PgPool, email: &str) -> anyhow::Result<User> {
    UserService::get_by_email(db, email)
        .await
        .map_err(|e| e.into_anyhow())?
        .ok_or_else(|| anyhow!("no user with email {email}"))
}

/// Grants `code` to the user with `email`. Returns false if they already held it.
pub async fn grant_permission(db: &PgPool, email: &str, code: &str) -> anyhow::Result<bool> {
    if !PermissionService::exists(db, code)
        .await
        .map_err(|e| e.into_anyhow())?
    {
        bail!("unknown permission code {code}");
    }

    let user = find_user(db, email).await?;
    let mut conn = db.acquire().await?;
    let added = PermissionService::add_for_user(&mut *conn, user.id, &[code])
        .await
        .map_err(|e| e.into_anyhow())?;

    Ok(added > 0)
}

pub async fn list_permissions(db: &PgPool, email: &str) -> anyhow::Result<Permissions> {
    let user = find_user(db, email).await?;
    PermissionService::get_all_for_user(db, user.id)
        .await
        .map_err(|e| e.into_anyhow())
}

/// Marks the user as activated without a token. Returns false if they already were.
pub async fn activate_user(db: &PgPool, email: &str) -> anyhow::Result<bool> {
    let mut user = find_user(db, email).await?;
    if user.activated {
        return Ok(false);
    }

    user.activated = true;
    UserService::update(db, &mut user)
        .await
        .map_err(|e| e.into_anyhow())?;
    Ok(true)
}
