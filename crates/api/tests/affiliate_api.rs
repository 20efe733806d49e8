//! HTTP-level integration tests for affiliate accounts and admin payouts.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get, get_auth, post_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_once_with_generated_code(pool: PgPool) {
    let (_, token) = common::create_user(&pool, "Partner", "student").await;
    let app = common::build_test_app(pool);

    let json = expect_json(
        post_auth(app.clone(), "/api/affiliate/register", &token).await,
        StatusCode::CREATED,
    )
    .await;
    let code = json["data"]["affiliate_code"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(json["data"]["commission_rate"], 10.0);
    assert_eq!(json["data"]["status"], "active");

    let response = post_auth(app.clone(), "/api/affiliate/register", &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let me = expect_json(get_auth(app, "/api/affiliate/me", &token).await, StatusCode::OK).await;
    assert_eq!(me["data"]["affiliate_code"], code);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_endpoints_without_registration(pool: PgPool) {
    let (_, token) = common::create_user(&pool, "Stranger", "student").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/affiliate/me", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/affiliate/sales", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_code_validation_follows_status(pool: PgPool) {
    let (_, token) = common::create_user(&pool, "Partner", "student").await;
    let (_, admin_token) = common::create_user(&pool, "Admin", "admin").await;
    let app = common::build_test_app(pool);

    let json = expect_json(
        post_auth(app.clone(), "/api/affiliate/register", &token).await,
        StatusCode::CREATED,
    )
    .await;
    let id = json["data"]["id"].as_i64().unwrap();
    let code = json["data"]["affiliate_code"].as_str().unwrap().to_lowercase();

    let check = expect_json(
        get(app.clone(), &format!("/api/affiliate/validate/{code}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(check["data"]["valid"], true);
    assert_eq!(check["data"]["commission_rate"], 10.0);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/admin/affiliates/{id}"),
        json!({ "status": "suspended" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let check = expect_json(
        get(app, &format!("/api/affiliate/validate/{code}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(check["data"]["valid"], false);
    assert!(check["data"].get("commission_rate").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_rate_change_and_payout(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (_, partner_token) = common::create_user(&pool, "Partner", "student").await;
    let (_, buyer_token) = common::create_user(&pool, "Buyer", "student").await;
    let (_, admin_token) = common::create_user(&pool, "Admin", "admin").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 20000, None).await;
    let app = common::build_test_app(pool);

    let json = expect_json(
        post_auth(app.clone(), "/api/affiliate/register", &partner_token).await,
        StatusCode::CREATED,
    )
    .await;
    let id = json["data"]["id"].as_i64().unwrap();
    let code = json["data"]["affiliate_code"].as_str().unwrap().to_string();
    let admin_uri = format!("/api/admin/affiliates/{id}");

    let response = put_json_auth(
        app.clone(),
        &admin_uri,
        json!({ "commission_rate": 150.0 }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.clone(),
        &admin_uri,
        json!({ "commission_rate": 25.0 }),
        &partner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let updated = expect_json(
        put_json_auth(app.clone(), &admin_uri, json!({ "commission_rate": 25.0 }), &admin_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["data"]["commission_rate"], 25.0);

    let purchase = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "credit", "affiliate_code": code }),
            &buyer_token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(purchase["data"]["commission_cents"], 5000);

    let sales = expect_json(
        get_auth(app.clone(), "/api/affiliate/sales", &partner_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(sales["data"].as_array().unwrap().len(), 1);
    assert_eq!(sales["data"][0]["status"], "approved");

    let payout = expect_json(
        post_auth(app.clone(), &format!("{admin_uri}/payout"), &admin_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(payout["data"]["amount_cents"], 5000);
    assert_eq!(payout["data"]["commissions_paid"], 1);

    let me = expect_json(get_auth(app.clone(), "/api/affiliate/me", &partner_token).await, StatusCode::OK).await;
    assert_eq!(me["data"]["pending_earnings_cents"], 0);
    assert_eq!(me["data"]["paid_earnings_cents"], 5000);
    assert_eq!(me["data"]["total_earnings_cents"], 5000);

    // Nothing left to pay.
    let payout = expect_json(
        post_auth(app.clone(), &format!("{admin_uri}/payout"), &admin_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(payout["data"]["amount_cents"], 0);

    let response = post_auth(app, "/api/admin/affiliates/999999/payout", &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
