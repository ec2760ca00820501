mod common;

use axum::Router;
use axum::http::StatusCode;
use common::{create_reader, create_writer, raw_request, request, send, setup_app};
use serde_json::{Value, json};
use sqlx::PgPool;

async fn create_movie(app: &Router, token: &str, body: Value) -> Value {
    let response = send(app, request("POST", "/v1/movies", Some(token), Some(body))).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["movie"].clone()
}

fn heat() -> Value {
    json!({
        "title": "Heat",
        "year": 1995,
        "runtime": "170 mins",
        "genres": ["crime", "drama"]
    })
}

async fn stored_movie(pool: &PgPool, id: i64) -> (String, i32, i32) {
    sqlx::query_as("SELECT title, year, version FROM movies WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_movie(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;

    let response = send(&app, request("POST", "/v1/movies", Some(&token), Some(heat()))).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let movie = &response.body["movie"];
    let id = movie["id"].as_i64().unwrap();
    assert_eq!(
        response.headers.get("location").unwrap(),
        &format!("/v1/movies/{id}")
    );
    assert_eq!(movie["title"], "Heat");
    assert_eq!(movie["year"], 1995);
    assert_eq!(movie["runtime"], "170 mins");
    assert_eq!(movie["genres"], json!(["crime", "drama"]));
    assert_eq!(movie["version"], 1);
    assert!(movie.get("created_at").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_movie_validation(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;

    let body = json!({
        "title": "",
        "year": 1800,
        "runtime": "-5 mins",
        "genres": ["drama", "drama"]
    });
    let response = send(&app, request("POST", "/v1/movies", Some(&token), Some(body))).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &response.body["error"];
    assert_eq!(errors["title"], "must be provided");
    assert_eq!(errors["year"], "must be greater than 1888");
    assert_eq!(errors["runtime"], "must be a positive integer");
    assert_eq!(errors["genres"], "must not contain duplicate values");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_movie_invalid_runtime(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;

    let body = json!({ "title": "Heat", "year": 1995, "runtime": "170", "genres": ["crime"] });
    let response = send(&app, request("POST", "/v1/movies", Some(&token), Some(body))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid runtime format");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_show_movie(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let uri = format!("/v1/movies/{}", movie["id"]);

    let response = send(&app, request("GET", &uri, Some(&token), None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["movie"], movie);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_show_movie_invalid_ids_are_not_found(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_reader(&pool).await;

    for uri in ["/v1/movies/0", "/v1/movies/-1", "/v1/movies/abc", "/v1/movies/999999"] {
        let response = send(&app, request("GET", uri, Some(&token), None)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            response.body["error"],
            "the requested resource could not be found"
        );
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_movie_replaces_and_bumps_version(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let uri = format!("/v1/movies/{}", movie["id"]);

    let body = json!({
        "title": "Heat (Director's Cut)",
        "year": 1995,
        "runtime": "171 mins",
        "genres": ["crime"]
    });
    let response = send(&app, request("PUT", &uri, Some(&token), Some(body))).await;

    assert_eq!(response.status, StatusCode::OK);
    let updated = &response.body["movie"];
    assert_eq!(updated["title"], "Heat (Director's Cut)");
    assert_eq!(updated["runtime"], "171 mins");
    assert_eq!(updated["genres"], json!(["crime"]));
    assert_eq!(updated["version"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_patch_changes_only_present_fields(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let uri = format!("/v1/movies/{}", movie["id"]);

    let response = send(
        &app,
        request("PATCH", &uri, Some(&token), Some(json!({ "year": 2000 }))),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let patched = &response.body["movie"];
    assert_eq!(patched["year"], 2000);
    assert_eq!(patched["title"], "Heat");
    assert_eq!(patched["runtime"], "170 mins");
    assert_eq!(patched["genres"], json!(["crime", "drama"]));
    assert_eq!(patched["version"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_patch_validates_merged_movie(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let uri = format!("/v1/movies/{}", movie["id"]);

    let response = send(
        &app,
        request("PATCH", &uri, Some(&token), Some(json!({ "genres": [] }))),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["error"]["genres"],
        "must contain at least 1 genre"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_expected_version_conflicts_and_leaves_row(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let id = movie["id"].as_i64().unwrap();
    let uri = format!("/v1/movies/{id}");

    let mut stale = request("PATCH", &uri, Some(&token), Some(json!({ "title": "Ronin" })));
    stale
        .headers_mut()
        .insert("x-expected-version", "7".parse().unwrap());
    let response = send(&app, stale).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.body["error"],
        "unable to update the record due to an edit conflict, please try again"
    );
    assert_eq!(stored_movie(&pool, id).await, ("Heat".to_string(), 1995, 1));

    let mut current = request("PATCH", &uri, Some(&token), Some(json!({ "title": "Ronin" })));
    current
        .headers_mut()
        .insert("x-expected-version", "1".parse().unwrap());
    let response = send(&app, current).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(stored_movie(&pool, id).await, ("Ronin".to_string(), 1995, 2));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_updates_exactly_one_succeeds(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let id = movie["id"].as_i64().unwrap();
    let uri = format!("/v1/movies/{id}");

    let patch = |title: &str| {
        let mut req = request("PATCH", &uri, Some(&token), Some(json!({ "title": title })));
        req.headers_mut()
            .insert("x-expected-version", "1".parse().unwrap());
        req
    };

    let (a, b) = tokio::join!(send(&app, patch("A")), send(&app, patch("B")));
    let mut statuses = vec![a.status, b.status];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);
    assert_eq!(stored_movie(&pool, id).await.2, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_movie(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;
    let movie = create_movie(&app, &token, heat()).await;
    let uri = format!("/v1/movies/{}", movie["id"]);

    let response = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "movie successfully deleted");

    let response = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_missing_movie_with_malformed_body_is_bad_request(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;

    let response = send(
        &app,
        raw_request("PATCH", "/v1/movies/999999", Some(&token), "{\"title\":"),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_movies_filters_and_metadata(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_writer(&pool).await;

    for (title, year, genres) in [
        ("Black Panther", 2018, json!(["action", "adventure"])),
        ("The Breakfast Club", 1985, json!(["comedy", "drama"])),
        ("Deadpool", 2016, json!(["action", "comedy"])),
        ("Moana", 2016, json!(["animation", "adventure"])),
    ] {
        create_movie(
            &app,
            &token,
            json!({ "title": title, "year": year, "runtime": "100 mins", "genres": genres }),
        )
        .await;
    }

    let response = send(
        &app,
        request("GET", "/v1/movies?genres=action&sort=-year", Some(&token), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let titles: Vec<&str> = response.body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Black Panther", "Deadpool"]);

    let response = send(
        &app,
        request("GET", "/v1/movies?title=the+club", Some(&token), None),
    )
    .await;
    let movies = response.body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "The Breakfast Club");

    let response = send(
        &app,
        request("GET", "/v1/movies?page=2&page_size=3", Some(&token), None),
    )
    .await;
    assert_eq!(response.body["movies"].as_array().unwrap().len(), 1);
    assert_eq!(
        response.body["metadata"],
        json!({
            "current_page": 2,
            "page_size": 3,
            "first_page": 1,
            "last_page": 2,
            "total_records": 4
        })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_movies_empty_metadata(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_reader(&pool).await;

    let response = send(&app, request("GET", "/v1/movies", Some(&token), None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "movies": [], "metadata": {} }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_movies_rejects_bad_query(pool: PgPool) {
    let app = setup_app(pool.clone());
    let (_, token) = create_reader(&pool).await;

    let response = send(
        &app,
        request(
            "GET",
            "/v1/movies?page=x&page_size=1000&sort=-created_at",
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &response.body["error"];
    assert_eq!(errors["page"], "must be an integer value");
    assert_eq!(errors["page_size"], "must be a maximum of 100");
    assert_eq!(errors["sort"], "invalid sort value");
}
