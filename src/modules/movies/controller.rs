use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use marquee_core::{AppError, Filters, Validator};
use marquee_models::movies::validate_movie;
use marquee_models::{
    MOVIE_SORT_SAFELIST, MessageEnvelope, Movie, MovieEnvelope, MovieInputDto, MoviesEnvelope,
    PatchMovieDto,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use crate::metrics::track_movie_created;
use crate::modules::movies::service::MovieService;
use crate::state::AppState;
use crate::utils::params::{IdParam, read_csv, read_int, read_string};
use crate::validator::StrictJson;

/// Header carrying the version a client last observed for a record.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMoviesQuery {
    /// Full-text match against the title
    pub title: Option<String>,
    /// Comma separated genres; a movie must have all of them
    pub genres: Option<String>,
    /// Page number, 1 to 10000 (default 1)
    pub page: Option<String>,
    /// Records per page, 1 to 100 (default 20)
    pub page_size: Option<String>,
    /// One of id, title, year, runtime, optionally prefixed with `-` for descending
    pub sort: Option<String>,
}

/// Rejects the write with 409 when the client's expected version is stale.
fn check_expected_version(headers: &HeaderMap, movie: &Movie) -> Result<(), AppError> {
    match headers.get(EXPECTED_VERSION_HEADER) {
        Some(expected) if expected.as_bytes() != movie.version.to_string().as_bytes() => {
            Err(AppError::edit_conflict())
        }
        _ => Ok(()),
    }
}

/// List movies
#[utoipa::path(
    get,
    path = "/v1/movies",
    params(ListMoviesQuery),
    responses(
        (status = 200, description = "Page of movies", body = MoviesEnvelope),
        (status = 401, description = "Authentication required"),
        (status = 422, description = "Invalid query parameters"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
    query: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> Result<Json<MoviesEnvelope>, AppError> {
    let Query(query) = query.map_err(AppError::bad_request)?;

    let mut v = Validator::new();
    let title = read_string(query.title.as_deref(), "");
    let genres = read_csv(query.genres.as_deref(), Vec::new());
    let filters = Filters {
        page: read_int(query.page.as_deref(), 1, "page", &mut v),
        page_size: read_int(query.page_size.as_deref(), 20, "page_size", &mut v),
        sort: read_string(query.sort.as_deref(), "id"),
        sort_safelist: MOVIE_SORT_SAFELIST,
    };
    filters.validate(&mut v);
    v.into_result()?;

    let (movies, metadata) = MovieService::get_all(&state.db, &title, &genres, &filters).await?;
    Ok(Json(MoviesEnvelope { movies, metadata }))
}

/// Create a movie
#[utoipa::path(
    post,
    path = "/v1/movies",
    request_body = MovieInputDto,
    responses(
        (status = 201, description = "Movie created", body = MovieEnvelope),
        (status = 400, description = "Malformed body"),
        (status = 403, description = "Missing movies:write"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
#[instrument(skip(state, dto))]
pub async fn create_movie(
    State(state): State<AppState>,
    StrictJson(dto): StrictJson<MovieInputDto>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let movie = MovieService::create(&state.db, dto).await?;
    track_movie_created();

    let location = HeaderValue::from_str(&format!("/v1/movies/{}", movie.id))
        .map_err(AppError::internal)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(MovieEnvelope { movie }),
    ))
}

/// Get a movie by id
#[utoipa::path(
    get,
    path = "/v1/movies/{id}",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie", body = MovieEnvelope),
        (status = 403, description = "Missing movies:read"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
#[instrument(skip(state))]
pub async fn show_movie(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MovieEnvelope>, AppError> {
    let movie = MovieService::get(&state.db, id).await?;
    Ok(Json(MovieEnvelope { movie }))
}

/// Replace a movie
#[utoipa::path(
    put,
    path = "/v1/movies/{id}",
    params(
        ("id" = i64, Path, description = "Movie id"),
        ("X-Expected-Version" = Option<String>, Header, description = "Version the client last read"),
    ),
    request_body = MovieInputDto,
    responses(
        (status = 200, description = "Movie replaced", body = MovieEnvelope),
        (status = 404, description = "Not found"),
        (status = 409, description = "Edit conflict"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
#[instrument(skip(state, headers, dto))]
pub async fn update_movie(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    headers: HeaderMap,
    StrictJson(dto): StrictJson<MovieInputDto>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let mut movie = MovieService::get(&state.db, id).await?;
    check_expected_version(&headers, &movie)?;

    let mut v = Validator::new();
    dto.validate(&mut v);
    v.into_result()?;

    let read_version = movie.version;
    dto.replace(&mut movie);
    MovieService::update(&state.db, &mut movie, read_version).await?;

    Ok(Json(MovieEnvelope { movie }))
}

/// Partially update a movie
///
/// Only the keys present in the body are changed.
#[utoipa::path(
    patch,
    path = "/v1/movies/{id}",
    params(
        ("id" = i64, Path, description = "Movie id"),
        ("X-Expected-Version" = Option<String>, Header, description = "Version the client last read"),
    ),
    request_body = PatchMovieDto,
    responses(
        (status = 200, description = "Movie updated", body = MovieEnvelope),
        (status = 404, description = "Not found"),
        (status = 409, description = "Edit conflict"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
#[instrument(skip(state, headers, dto))]
pub async fn patch_movie(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    headers: HeaderMap,
    StrictJson(dto): StrictJson<PatchMovieDto>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let mut movie = MovieService::get(&state.db, id).await?;
    check_expected_version(&headers, &movie)?;

    let read_version = movie.version;
    dto.apply(&mut movie);

    let mut v = Validator::new();
    validate_movie(&mut v, &movie);
    v.into_result()?;

    MovieService::update(&state.db, &mut movie, read_version).await?;

    Ok(Json(MovieEnvelope { movie }))
}

/// Delete a movie
#[utoipa::path(
    delete,
    path = "/v1/movies/{id}",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie deleted", body = MessageEnvelope),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
#[instrument(skip(state))]
pub async fn delete_movie(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MessageEnvelope>, AppError> {
    MovieService::delete(&state.db, id).await?;
    Ok(Json(MessageEnvelope::new("movie successfully deleted")))
}
