use marquee_auth::Permissions;
use marquee_core::AppError;
use marquee_db::with_timeout;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

pub struct PermissionService;

impl PermissionService {
    /// Every permission code granted to `user_id`.
    #[instrument(skip(db))]
    pub async fn get_all_for_user(db: &PgPool, user_id: i64) -> Result<Permissions, AppError> {
        let codes: Vec<String> = with_timeout(
            sqlx::query_scalar(
                r#"
                SELECT permissions.code
                FROM permissions
                INNER JOIN users_permissions ON users_permissions.permission_id = permissions.id
                WHERE users_permissions.user_id = $1
                ORDER BY permissions.code
                "#,
            )
            .bind(user_id)
            .fetch_all(db),
        )
        .await?;

        Ok(Permissions::new(codes))
    }

    /// Grants `codes` to `user_id`, returning how many grants were new.
    ///
    /// Unknown codes and grants the user already holds are skipped.
    #[instrument(skip(conn))]
    pub async fn add_for_user(
        conn: &mut PgConnection,
        user_id: i64,
        codes: &[&str],
    ) -> Result<u64, AppError> {
        let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();

        let result = with_timeout(
            sqlx::query(
                r#"
                INSERT INTO users_permissions (user_id, permission_id)
                SELECT $1, permissions.id FROM permissions WHERE permissions.code = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(codes)
            .execute(conn),
        )
        .await?;

        Ok(result.rows_affected())
    }

    /// True when `code` names a row in the `permissions` table.
    pub async fn exists(db: &PgPool, code: &str) -> Result<bool, AppError> {
        let exists: bool = with_timeout(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM permissions WHERE code = $1)")
                .bind(code)
                .fetch_one(db),
        )
        .await?;

        Ok(exists)
    }
}
