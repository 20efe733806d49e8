#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use coursemart_api::auth::jwt::{generate_token, JwtConfig};
use coursemart_api::auth::password::hash_password;
use coursemart_api::config::ServerConfig;
use coursemart_api::router::build_app_router;
use coursemart_api::state::AppState;
use coursemart_core::course::CourseModule;
use coursemart_core::types::{Cents, DbId};
use coursemart_db::models::course::Course;
use coursemart_db::models::user::{CreateUser, User};
use coursemart_db::repositories::{CourseRepo, NewCourse, UserRepo};
use coursemart_payments::mock::MockGateway;
use coursemart_payments::PaymentConfig;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and the mock provider.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_env: "test".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            expiry_days: 7,
        },
        payments: PaymentConfig::mock(),
    }
}

/// Full application router over `pool`, with an unsigned mock gateway.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with_gateway(pool, MockGateway::new(None, true))
}

/// Full application router whose mock gateway requires signed webhooks.
pub fn build_signed_test_app(pool: PgPool, webhook_secret: &str) -> Router {
    build_app_with_gateway(pool, MockGateway::new(Some(webhook_secret.to_string()), false))
}

/// Full application router over `pool` with a caller-configured mock gateway.
pub fn build_app_with_gateway(pool: PgPool, gateway: MockGateway) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway: Arc::new(gateway),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with `role` and return it with a valid bearer token.
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    let token = generate_token(user.id, &user.role, &test_config().jwt).expect("token");
    (user, token)
}

/// Two modules: `m1` with lessons `l1`, `l2`; `m2` with lesson `l3`.
pub fn three_lesson_modules() -> Vec<CourseModule> {
    serde_json::from_value(json!([
        {
            "id": "m1",
            "title": "Getting started",
            "lessons": [
                { "id": "l1", "title": "Welcome", "duration_secs": 120,
                  "content": { "type": "video", "media_url": "videos/welcome.mp4" } },
                { "id": "l2", "title": "Setup", "duration_secs": 300,
                  "content": { "type": "text", "body": "Install the toolchain." } }
            ]
        },
        {
            "id": "m2",
            "title": "Going further",
            "lessons": [
                { "id": "l3", "title": "Quiz", "duration_secs": 60,
                  "content": { "type": "quiz", "questions": [
                      { "prompt": "2 + 2?", "options": ["3", "4"], "correct_option": 1 }
                  ] } }
            ]
        }
    ]))
    .expect("valid modules")
}

/// Insert a published course.
pub async fn create_course(
    pool: &PgPool,
    instructor_id: DbId,
    slug: &str,
    price_cents: Cents,
    category: Option<&str>,
) -> Course {
    let modules = three_lesson_modules();
    CourseRepo::create(
        pool,
        &NewCourse {
            instructor_id,
            title: "Course under test",
            slug,
            description: Some("A course used by integration tests"),
            thumbnail_url: None,
            category,
            level: "beginner",
            price_cents,
            status: "published",
            modules: &modules,
        },
    )
    .await
    .expect("course creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("valid request")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request("POST", uri, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request("PUT", uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request("DELETE", uri, Some(token))).await
}

/// POST a raw webhook body with an optional signature header.
pub async fn post_webhook(
    app: Router,
    body: &[u8],
    signature: Option<(&str, &str)>,
) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/checkout/webhook")
        .header("content-type", "application/json");
    if let Some((header, value)) = signature {
        builder = builder.header(header, value);
    }
    let request = builder
        .body(Body::from(body.to_vec()))
        .expect("valid request");
    send(app, request).await
}

/// Assert a status and return the parsed body.
pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
