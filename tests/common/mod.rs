#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use marquee::marquee_auth::TokenScope;
use marquee::marquee_config::{CorsConfig, EmailConfig, RateLimitConfig, ServerConfig};
use marquee::marquee_models::User;
use marquee::modules::permissions::service::PermissionService;
use marquee::modules::tokens::service::TokenService;
use marquee::modules::users::service::UserService;
use marquee::router::init_router;
use marquee::state::AppState;
use marquee::utils::password;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "pa55word-for-tests";

pub fn test_state(pool: PgPool, rate_limit: RateLimitConfig) -> AppState {
    AppState::new(
        pool,
        ServerConfig::default(),
        CorsConfig::default(),
        EmailConfig::default(),
        &rate_limit,
    )
    .unwrap()
}

/// Router for a state, as seen from a single client address.
pub fn app_for(state: AppState, client: SocketAddr) -> Router {
    init_router(state).layer(MockConnectInfo(client))
}

/// App with the rate limiter disabled.
pub fn setup_app(pool: PgPool) -> Router {
    app_for(
        test_state(pool, RateLimitConfig::disabled()),
        "127.0.0.1:40000".parse().unwrap(),
    )
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Inserts a user holding the default permissions plus `extra_permissions`.
pub async fn create_test_user(
    pool: &PgPool,
    email: &str,
    activated: bool,
    extra_permissions: &[&str],
) -> User {
    let hash = password::hash(TEST_PASSWORD.to_string()).await.unwrap();
    let mut user = UserService::register(pool, "Test User", email, &hash)
        .await
        .unwrap();

    if !extra_permissions.is_empty() {
        let mut conn = pool.acquire().await.unwrap();
        PermissionService::add_for_user(&mut conn, user.id, extra_permissions)
            .await
            .unwrap();
    }

    if activated {
        user.activated = true;
        UserService::update(pool, &mut user).await.unwrap();
    }
    user
}

pub async fn issue_token(pool: &PgPool, user_id: i64, scope: TokenScope) -> String {
    TokenService::new_token(pool, user_id, scope)
        .await
        .unwrap()
        .plaintext
}

/// Activated user with read and write access, plus an authentication token.
pub async fn create_writer(pool: &PgPool) -> (User, String) {
    let user = create_test_user(pool, &generate_unique_email(), true, &["movies:write"]).await;
    let token = issue_token(pool, user.id, TokenScope::Authentication).await;
    (user, token)
}

/// Activated user with only the default read access, plus an authentication token.
pub async fn create_reader(pool: &PgPool) -> (User, String) {
    let user = create_test_user(pool, &generate_unique_email(), true, &[]).await;
    let token = issue_token(pool, user.id, TokenScope::Authentication).await;
    (user, token)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn raw_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
