use chrono::Utc;
use marquee_auth::{TokenScope, hash_plaintext};
use marquee_core::AppError;
use marquee_core::permissions::DEFAULT_USER_PERMISSIONS;
use marquee_db::{DbError, with_timeout};
use marquee_models::User;
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::permissions::service::PermissionService;

// `email` is citext; it is read back as text and compared as citext.
const USER_COLUMNS: &str =
    "id, created_at, name, email::text AS email, password_hash, activated, version";

fn duplicate_email(err: DbError) -> AppError {
    if err.is_unique_violation() && err.constraint() == Some("users_email_key") {
        AppError::field_error("email", "a user with this email address already exists")
    } else {
        err.into()
    }
}

pub struct UserService;

impl UserService {
    /// Inserts an unactivated user and grants the default permissions.
    ///
    /// Both writes share one transaction, so a user never exists without
    /// their initial grants.
    #[instrument(skip(db, password_hash))]
    pub async fn register(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let mut tx = with_timeout(db.begin()).await?;

        let user = with_timeout(
            sqlx::query_as::<_, User>(&format!(
                r#"
                INSERT INTO users (name, email, password_hash, activated)
                VALUES ($1, $2, $3, false)
                RETURNING {USER_COLUMNS}
                "#
            ))
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&mut *tx),
        )
        .await
        .map_err(duplicate_email)?;

        PermissionService::add_for_user(&mut tx, user.id, DEFAULT_USER_PERMISSIONS).await?;

        with_timeout(tx.commit()).await?;
        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn get_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = with_timeout(
            sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1::citext"
            ))
            .bind(email)
            .fetch_optional(db),
        )
        .await?;

        Ok(user)
    }

    /// Writes every mutable column back, guarded by the version `user` was read at.
    ///
    /// On success `user.version` is advanced to the stored value.
    #[instrument(skip(db, user), fields(user_id = user.id))]
    pub async fn update(db: &PgPool, user: &mut User) -> Result<(), AppError> {
        let version: Option<i32> = with_timeout(
            sqlx::query_scalar(
                r#"
                UPDATE users
                SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.activated)
            .bind(user.id)
            .bind(user.version)
            .fetch_optional(db),
        )
        .await
        .map_err(duplicate_email)?;

        user.version = version.ok_or_else(AppError::edit_conflict)?;
        Ok(())
    }

    /// Looks up the owner of an unexpired token with the given scope.
    ///
    /// Unknown, expired and wrong-scope tokens are indistinguishable.
    #[instrument(skip(db, plaintext))]
    pub async fn get_for_token(
        db: &PgPool,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<Option<User>, AppError> {
        let user = with_timeout(
            sqlx::query_as::<_, User>(
                r#"
                SELECT users.id, users.created_at, users.name, users.email::text AS email,
                       users.password_hash, users.activated, users.version
                FROM users
                INNER JOIN tokens ON users.id = tokens.user_id
                WHERE tokens.hash = $1 AND tokens.scope = $2 AND tokens.expiry > $3
                "#,
            )
            .bind(hash_plaintext(plaintext))
            .bind(scope.as_str())
            .bind(Utc::now())
            .fetch_optional(db),
        )
        .await?;

        Ok(user)
    }
}
