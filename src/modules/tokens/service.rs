use marquee_auth::{Token, TokenScope};
use marquee_core::AppError;
use marquee_db::with_timeout;
use sqlx::PgPool;
use tracing::instrument;

pub struct TokenService;

impl TokenService {
    /// Generates a token for `user_id` and persists its hash.
    #[instrument(skip(db))]
    pub async fn new_token(db: &PgPool, user_id: i64, scope: TokenScope) -> Result<Token, AppError> {
        let token = Token::generate(user_id, scope);
        Self::insert(db, &token).await?;
        Ok(token)
    }

    pub async fn insert(db: &PgPool, token: &Token) -> Result<(), AppError> {
        with_timeout(
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, user_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(db),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_all_for_user(
        db: &PgPool,
        scope: TokenScope,
        user_id: i64,
    ) -> Result<u64, AppError> {
        let result = with_timeout(
            sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
                .bind(scope.as_str())
                .bind(user_id)
                .execute(db),
        )
        .await?;

        Ok(result.rows_affected())
    }
}
