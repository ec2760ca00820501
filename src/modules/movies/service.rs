use marquee_core::{AppError, Filters, Metadata};
use marquee_db::with_timeout;
use marquee_models::{Movie, MovieInputDto};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

#[derive(Debug, FromRow)]
struct MovieRow {
    total_records: i64,
    #[sqlx(flatten)]
    movie: Movie,
}

pub struct MovieService;

impl MovieService {
    #[instrument(skip(db, dto))]
    pub async fn create(db: &PgPool, dto: MovieInputDto) -> Result<Movie, AppError> {
        let genres = dto.genres.unwrap_or_default();

        let movie = with_timeout(
            sqlx::query_as::<_, Movie>(
                r#"
                INSERT INTO movies (title, year, runtime, genres)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, title, year, runtime, genres, version
                "#,
            )
            .bind(dto.title)
            .bind(dto.year)
            .bind(dto.runtime)
            .bind(genres)
            .fetch_one(db),
        )
        .await?;

        Ok(movie)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: i64) -> Result<Movie, AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        with_timeout(
            sqlx::query_as::<_, Movie>(
                r#"
                SELECT id, created_at, title, year, runtime, genres, version
                FROM movies
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(db),
        )
        .await?
        .ok_or_else(AppError::not_found)
    }

    /// Writes `movie` back if the stored version still equals `expected_version`.
    ///
    /// On success `movie.version` holds the new stored version; otherwise the
    /// row is untouched and an edit conflict is returned.
    #[instrument(skip(db, movie), fields(movie_id = movie.id))]
    pub async fn update(
        db: &PgPool,
        movie: &mut Movie,
        expected_version: i32,
    ) -> Result<(), AppError> {
        let version: Option<i32> = with_timeout(
            sqlx::query_scalar(
                r#"
                UPDATE movies
                SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime)
            .bind(&movie.genres)
            .bind(movie.id)
            .bind(expected_version)
            .fetch_optional(db),
        )
        .await?;

        movie.version = version.ok_or_else(AppError::edit_conflict)?;
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        let result = with_timeout(
            sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(db),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    /// Lists movies matching `title` (full-text) and containing every genre in `genres`.
    ///
    /// The sort column is interpolated into the query text, so it is taken
    /// from the filter safelist only.
    #[instrument(skip(db))]
    pub async fn get_all(
        db: &PgPool,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), AppError> {
        let column = filters
            .sort_column()
            .ok_or_else(|| AppError::field_error("sort", "invalid sort value"))?;

        let query = format!(
            r#"
            SELECT count(*) OVER() AS total_records, id, created_at, title, year, runtime, genres, version
            FROM movies
            WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
            AND (genres @> $2 OR $2 = '{{}}')
            ORDER BY {column} {direction}, id ASC
            LIMIT $3 OFFSET $4
            "#,
            direction = filters.sort_direction(),
        );

        let rows = with_timeout(
            sqlx::query_as::<_, MovieRow>(&query)
                .bind(title)
                .bind(genres)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(db),
        )
        .await?;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let movies = rows.into_iter().map(|row| row.movie).collect();
        let metadata = Metadata::calculate(total_records, filters.page, filters.page_size);

        Ok((movies, metadata))
    }
}
