//! HTTP-level integration tests for checkout, webhook reconciliation, and
//! the webhook ledger.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get_auth, post_auth, post_json_auth, post_webhook};
use coursemart_core::types::DbId;
use coursemart_db::repositories::{AffiliateRepo, CourseRepo, EnrollmentRepo, SaleRepo};
use coursemart_payments::mock::{MockGateway, SIGNATURE_HEADER};
use serde_json::json;
use sqlx::PgPool;

const AFFILIATE_CODE: &str = "REFER123";

fn webhook_body(transaction_id: &str, status: &str) -> Vec<u8> {
    json!({ "transaction_id": transaction_id, "status": status })
        .to_string()
        .into_bytes()
}

async fn ledger(pool: &PgPool) -> Vec<(String, Option<String>)> {
    sqlx::query_as("SELECT status, error FROM webhook_events ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}

async fn affiliate_sale_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM affiliate_sales")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn total_students(pool: &PgPool, course_id: DbId) -> i64 {
    CourseRepo::find_by_id(pool, course_id)
        .await
        .unwrap()
        .unwrap()
        .total_students
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_card_purchase_enrolls_and_pays_commission(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let (partner, _) = common::create_user(&pool, "Partner", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let affiliate = AffiliateRepo::create(&pool, partner.id, AFFILIATE_CODE, 10.0)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app,
            "/api/checkout/process",
            json!({
                "course_id": course.id,
                "payment_method": "credit",
                "affiliate_code": " refer123 ",
            }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(json["data"]["sale"]["status"], "completed");
    assert_eq!(json["data"]["sale"]["affiliate_code"], AFFILIATE_CODE);
    assert_eq!(json["data"]["payment"]["status"], "approved");
    assert_eq!(json["data"]["enrolled"], true);
    assert_eq!(json["data"]["commission_cents"], 2970);

    assert!(EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());
    assert_eq!(total_students(&pool, course.id).await, 1);

    let affiliate = AffiliateRepo::find_by_id(&pool, affiliate.id).await.unwrap().unwrap();
    assert_eq!(affiliate.total_sales, 1);
    assert_eq!(affiliate.total_earnings_cents, 2970);
    assert_eq!(affiliate.pending_earnings_cents, 2970);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_affiliate_code_is_dropped(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (_, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app,
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "credit", "affiliate_code": "NOPE" }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    assert!(json["data"]["sale"]["affiliate_code"].is_null());
    assert!(json["data"]["commission_cents"].is_null());
    assert_eq!(affiliate_sale_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pix_settles_once_through_webhook(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let (partner, _) = common::create_user(&pool, "Partner", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    AffiliateRepo::create(&pool, partner.id, AFFILIATE_CODE, 10.0)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "pix", "affiliate_code": AFFILIATE_CODE }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["sale"]["status"], "pending");
    assert_eq!(json["data"]["enrolled"], false);
    assert!(json["data"]["payment"]["pix"]["qr_code"].is_string());
    assert!(!EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());

    let tx = json["data"]["sale"]["transaction_id"].as_str().unwrap().to_string();
    let body = webhook_body(&tx, "approved");

    for _ in 0..2 {
        let ack = expect_json(post_webhook(app.clone(), &body, None).await, StatusCode::OK).await;
        assert_eq!(ack["received"], true);
    }

    let sale = SaleRepo::find_by_transaction_id(&pool, &tx).await.unwrap().unwrap();
    assert_eq!(sale.status, "completed");
    assert_eq!(EnrollmentRepo::count_for_pair(&pool, buyer.id, course.id).await.unwrap(), 1);
    assert_eq!(total_students(&pool, course.id).await, 1);
    assert_eq!(affiliate_sale_count(&pool).await, 1);

    let events = ledger(&pool).await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|(status, _)| status == "processed"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refund_cancels_unpaid_commission_and_keeps_access(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let (partner, _) = common::create_user(&pool, "Partner", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let affiliate = AffiliateRepo::create(&pool, partner.id, AFFILIATE_CODE, 10.0)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "credit", "affiliate_code": AFFILIATE_CODE }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let tx = json["data"]["sale"]["transaction_id"].as_str().unwrap().to_string();

    let response = post_webhook(app, &webhook_body(&tx, "refunded"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sale = SaleRepo::find_by_transaction_id(&pool, &tx).await.unwrap().unwrap();
    assert_eq!(sale.status, "refunded");
    assert!(EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());

    let affiliate = AffiliateRepo::find_by_id(&pool, affiliate.id).await.unwrap().unwrap();
    assert_eq!(affiliate.total_sales, 0);
    assert_eq!(affiliate.total_earnings_cents, 0);
    assert_eq!(affiliate.pending_earnings_cents, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_transaction_is_acknowledged_and_ignored(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_webhook(app, &webhook_body("mock_does_not_exist", "approved"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = ledger(&pool).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "ignored");
    assert_eq!(events[0].1.as_deref(), Some("Unknown transaction"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_webhook_is_acknowledged_and_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_webhook(app, b"not json at all", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = ledger(&pool).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "rejected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signed_webhooks(pool: PgPool) {
    let secret = "whsec_integration";
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_signed_test_app(pool.clone(), secret);

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "boleto" }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert!(json["data"]["payment"]["boleto_url"].is_string());
    let tx = json["data"]["sale"]["transaction_id"].as_str().unwrap().to_string();
    let body = webhook_body(&tx, "approved");

    let forged = "t=1700000000,v1=deadbeef";
    post_webhook(app.clone(), &body, Some((SIGNATURE_HEADER, forged))).await;
    post_webhook(app.clone(), &body, None).await;
    assert!(!EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());

    let signature = MockGateway::new(Some(secret.to_string()), false)
        .sign_webhook(&body)
        .unwrap();
    post_webhook(app, &body, Some((SIGNATURE_HEADER, &signature))).await;
    assert!(EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());

    let statuses: Vec<String> = ledger(&pool).await.into_iter().map(|(s, _)| s).collect();
    assert_eq!(statuses, ["rejected", "rejected", "processed"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_declined_card_records_failed_sale(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "declined", 10013, None).await;
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app,
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "credit" }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(json["data"]["sale"]["status"], "failed");
    assert_eq!(json["data"]["payment"]["status"], "rejected");
    assert_eq!(json["data"]["enrolled"], false);
    assert!(!EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());
    assert_eq!(total_students(&pool, course.id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_purchase_is_conflict_without_new_sale(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool.clone());
    let body = json!({ "course_id": course.id, "payment_method": "credit" });

    let response = post_json_auth(app.clone(), "/api/checkout/process", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = expect_json(
        post_json_auth(app, "/api/checkout/process", body, &token).await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(json["error"], "Already enrolled in this course");
    assert_eq!(
        SaleRepo::count_for_buyer_course(&pool, buyer.id, course.id).await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_checkout_input_errors(pool: PgPool) {
    let (creator, creator_token) = common::create_user(&pool, "Creator", "creator").await;
    let (_, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app.clone(),
        "/api/checkout/process",
        json!({ "course_id": course.id, "payment_method": "cheque" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        "/api/checkout/process",
        json!({ "course_id": 999_999, "payment_method": "credit" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let draft = expect_json(
        post_json_auth(
            app.clone(),
            "/api/courses",
            json!({
                "title": "Unreleased",
                "price_cents": 1000,
                "modules": [{ "id": "m1", "title": "M", "lessons": [
                    { "id": "l1", "title": "L", "content": { "type": "text", "body": "b" } }
                ] }]
            }),
            &creator_token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let response = post_json_auth(
        app,
        "/api/checkout/process",
        json!({ "course_id": draft["data"]["id"], "payment_method": "credit" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(sales, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hosted_session_settles_through_webhook(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (_, token) = common::create_user(&pool, "Buyer", "student").await;
    let (_, stranger_token) = common::create_user(&pool, "Stranger", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/create-checkout-session",
            json!({ "course_id": course.id }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let session_id = json["data"]["session_id"].as_str().unwrap().to_string();
    assert!(session_id.starts_with("cs_mock_"));
    assert!(json["data"]["url"].as_str().unwrap().contains(&session_id));

    let uri = format!("/api/checkout/session-status?session_id={session_id}");
    let status = expect_json(get_auth(app.clone(), &uri, &token).await, StatusCode::OK).await;
    assert_eq!(status["data"]["sale_status"], "pending");
    assert_eq!(status["data"]["enrolled"], false);

    let response = get_auth(app.clone(), &uri, &stranger_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    post_webhook(app.clone(), &webhook_body(&session_id, "approved"), None).await;

    let status = expect_json(get_auth(app, &uri, &token).await, StatusCode::OK).await;
    assert_eq!(status["data"]["sale_status"], "completed");
    assert_eq!(status["data"]["enrolled"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hosted_session_refund_keyed_by_underlying_payment(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/create-checkout-session",
            json!({ "course_id": course.id }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let session_id = json["data"]["session_id"].as_str().unwrap().to_string();

    let completed = json!({
        "transaction_id": session_id,
        "status": "approved",
        "payment_reference": "pi_mock_hosted"
    })
    .to_string()
    .into_bytes();
    post_webhook(app.clone(), &completed, None).await;

    let response = post_webhook(app, &webhook_body("pi_mock_hosted", "refunded"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sale = SaleRepo::find_by_transaction_id(&pool, &session_id).await.unwrap().unwrap();
    assert_eq!(sale.status, "refunded");
    assert_eq!(sale.payment_reference.as_deref(), Some("pi_mock_hosted"));
    assert!(EnrollmentRepo::exists(&pool, buyer.id, course.id).await.unwrap());

    let statuses: Vec<String> = ledger(&pool).await.into_iter().map(|(s, _)| s).collect();
    assert_eq!(statuses, ["processed", "processed"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sales_and_purchase_listings(pool: PgPool) {
    let (creator, creator_token) = common::create_user(&pool, "Creator", "creator").await;
    let (_, token) = common::create_user(&pool, "Buyer", "student").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool);

    post_json_auth(
        app.clone(),
        "/api/checkout/process",
        json!({ "course_id": course.id, "payment_method": "credit" }),
        &token,
    )
    .await;

    let purchases = expect_json(
        get_auth(app.clone(), "/api/checkout/purchases", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(purchases["data"].as_array().unwrap().len(), 1);
    assert_eq!(purchases["data"][0]["course_title"], "Course under test");

    let sales = expect_json(
        get_auth(app.clone(), "/api/checkout/sales", &creator_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(sales["data"].as_array().unwrap().len(), 1);

    let response = get_auth(app, "/api/checkout/sales", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lists_and_replays_ledger(pool: PgPool) {
    let (creator, _) = common::create_user(&pool, "Creator", "creator").await;
    let (buyer, token) = common::create_user(&pool, "Buyer", "student").await;
    let (_, admin_token) = common::create_user(&pool, "Admin", "admin").await;
    let course = common::create_course(&pool, creator.id, "rust-web", 29700, None).await;
    let app = common::build_test_app(pool.clone());

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/checkout/process",
            json!({ "course_id": course.id, "payment_method": "pix" }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let tx = json["data"]["sale"]["transaction_id"].as_str().unwrap().to_string();
    post_webhook(app.clone(), &webhook_body(&tx, "approved"), None).await;
    post_webhook(app.clone(), b"{}", None).await;

    let processed = expect_json(
        get_auth(app.clone(), "/api/admin/webhook-events?status=processed", &admin_token).await,
        StatusCode::OK,
    )
    .await;
    let events = processed["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["transaction_id"], tx.as_str());
    assert_eq!(events[0]["payment_status"], "approved");
    let processed_id = events[0]["id"].as_i64().unwrap();

    let replayed = expect_json(
        post_auth(
            app.clone(),
            &format!("/api/admin/webhook-events/{processed_id}/replay"),
            &admin_token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(replayed["data"]["status"], "processed");
    assert_eq!(EnrollmentRepo::count_for_pair(&pool, buyer.id, course.id).await.unwrap(), 1);
    assert_eq!(total_students(&pool, course.id).await, 1);

    let rejected = expect_json(
        get_auth(app.clone(), "/api/admin/webhook-events?status=rejected", &admin_token).await,
        StatusCode::OK,
    )
    .await;
    let rejected_id = rejected["data"][0]["id"].as_i64().unwrap();
    let response = post_auth(
        app.clone(),
        &format!("/api/admin/webhook-events/{rejected_id}/replay"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app.clone(), "/api/admin/webhook-events?status=bogus", &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app, "/api/admin/webhook-events", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
