mod common;

use axum::Router;
use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, create_test_user, generate_unique_email, issue_token, request, send, setup_app,
};
use marquee::marquee_auth::TokenScope;
use serde_json::{Value, json};
use sqlx::PgPool;

async fn activate(app: &Router, token: &str) -> common::TestResponse {
    send(
        app,
        request(
            "PUT",
            "/v1/users/activated",
            None,
            Some(json!({ "token": token })),
        ),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> StatusCode {
    send(
        app,
        request(
            "POST",
            "/v1/tokens/authentication",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await
    .status
}

fn token_error(body: &Value) -> &Value {
    &body["error"]["token"]
}

#[sqlx::test(migrations = "./migrations")]
async fn test_activation_token_failures_are_uniform(pool: PgPool) {
    let app = setup_app(pool.clone());
    let user = create_test_user(&pool, &generate_unique_email(), false, &[]).await;

    let expired = issue_token(&pool, user.id, TokenScope::Activation).await;
    sqlx::query("UPDATE tokens SET expiry = NOW() - INTERVAL '1 second' WHERE user_id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let wrong_scope = issue_token(&pool, user.id, TokenScope::PasswordReset).await;
    let unknown = "ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string();

    for token in [expired, wrong_scope, unknown] {
        let response = activate(&app, &token).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            token_error(&response.body),
            "invalid or expired activation token"
        );
    }

    let activated: bool = sqlx::query_scalar("SELECT activated FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!activated);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_activation_rejects_malformed_token(pool: PgPool) {
    let app = setup_app(pool);

    let response = activate(&app, "abc").await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(token_error(&response.body), "must be 26 bytes long");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_activation_consumes_every_activation_token(pool: PgPool) {
    let app = setup_app(pool.clone());
    let user = create_test_user(&pool, &generate_unique_email(), false, &[]).await;
    let first = issue_token(&pool, user.id, TokenScope::Activation).await;
    let second = issue_token(&pool, user.id, TokenScope::Activation).await;

    let response = activate(&app, &first).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["activated"], true);

    let response = activate(&app, &second).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_request_activation_token(pool: PgPool) {
    let app = setup_app(pool.clone());
    let pending = create_test_user(&pool, &generate_unique_email(), false, &[]).await;
    let active = create_test_user(&pool, &generate_unique_email(), true, &[]).await;

    let cases = [
        (
            pending.email.clone(),
            StatusCode::ACCEPTED,
            json!("an email will be sent to you containing activation instructions"),
        ),
        (
            active.email.clone(),
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "email": "user has already been activated" }),
        ),
        (
            generate_unique_email(),
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "email": "no matching email address found" }),
        ),
    ];

    for (email, status, expected) in cases {
        let response = send(
            &app,
            request(
                "POST",
                "/v1/tokens/activation",
                None,
                Some(json!({ "email": email })),
            ),
        )
        .await;
        assert_eq!(response.status, status, "{email}");
        let actual = if status == StatusCode::ACCEPTED {
            &response.body["message"]
        } else {
            &response.body["error"]
        };
        assert_eq!(actual, &expected);
    }

    let issued: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM tokens WHERE user_id = $1 AND scope = 'activation'",
    )
    .bind(pending.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(issued, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_password_reset_requires_activated_account(pool: PgPool) {
    let app = setup_app(pool.clone());
    let pending = create_test_user(&pool, &generate_unique_email(), false, &[]).await;

    let response = send(
        &app,
        request(
            "POST",
            "/v1/tokens/password-reset",
            None,
            Some(json!({ "email": pending.email })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["error"]["email"],
        "user account must be activated"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_password_reset_flow(pool: PgPool) {
    let app = setup_app(pool.clone());
    let user = create_test_user(&pool, &generate_unique_email(), true, &[]).await;

    let response = send(
        &app,
        request(
            "POST",
            "/v1/tokens/password-reset",
            None,
            Some(json!({ "email": user.email })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let token = issue_token(&pool, user.id, TokenScope::PasswordReset).await;
    let body = json!({ "password": "a-brand-new-password", "token": token });

    let response = send(
        &app,
        request("PUT", "/v1/users/password", None, Some(body.clone())),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "your password was successfully reset"
    );

    assert_eq!(
        login(&app, &user.email, "a-brand-new-password").await,
        StatusCode::CREATED
    );
    assert_eq!(
        login(&app, &user.email, TEST_PASSWORD).await,
        StatusCode::UNAUTHORIZED
    );

    let response = send(&app, request("PUT", "/v1/users/password", None, Some(body))).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        token_error(&response.body),
        "invalid or expired password reset token"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_authentication_token_cannot_reset_password(pool: PgPool) {
    let app = setup_app(pool.clone());
    let user = create_test_user(&pool, &generate_unique_email(), true, &[]).await;
    let token = issue_token(&pool, user.id, TokenScope::Authentication).await;

    let response = send(
        &app,
        request(
            "PUT",
            "/v1/users/password",
            None,
            Some(json!({ "password": "a-brand-new-password", "token": token })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        token_error(&response.body),
        "invalid or expired password reset token"
    );
}
