//! Schema-level guarantees the application relies on.

use coursemart_db::models::user::CreateUser;
use coursemart_db::repositories::UserRepo;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_reaches_database(pool: PgPool) {
    coursemart_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_named_constraint(pool: PgPool) {
    let input = CreateUser {
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        password_hash: "x".to_string(),
        role: "student".to_string(),
    };
    UserRepo::create(&pool, &input).await.unwrap();

    let upper = CreateUser {
        email: "ANA@example.com".to_string(),
        ..input
    };
    let err = UserRepo::create(&pool, &upper).await.unwrap_err();
    match err {
        sqlx::Error::Database(db) => {
            assert_eq!(db.code().as_deref(), Some("23505"));
            assert_eq!(db.constraint(), Some("uq_users_email"));
        }
        other => panic!("expected database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn enrollment_pair_is_unique(pool: PgPool) {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ('Bia', 'bia@example.com', 'x', 'creator') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let course_id: i64 = sqlx::query_scalar(
        "INSERT INTO courses (instructor_id, title, slug, price_cents)
         VALUES ($1, 'Course', 'course', 100) RETURNING id",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let insert = "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2)";
    sqlx::query(insert).bind(id).bind(course_id).execute(&pool).await.unwrap();
    let err = sqlx::query(insert)
        .bind(id)
        .bind(course_id)
        .execute(&pool)
        .await
        .unwrap_err();
    let db = err.as_database_error().expect("database error");
    assert_eq!(db.constraint(), Some("uq_enrollments_user_course"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_is_bounded(pool: PgPool) {
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash) VALUES ('Caio', 'caio@example.com', 'x')
         RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let course_id: i64 = sqlx::query_scalar(
        "INSERT INTO courses (instructor_id, title, slug) VALUES ($1, 'T', 't') RETURNING id",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let err = sqlx::query(
        "INSERT INTO enrollments (user_id, course_id, progress) VALUES ($1, $2, 101)",
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&pool)
    .await
    .unwrap_err();
    let db = err.as_database_error().expect("database error");
    assert_eq!(db.constraint(), Some("ck_enrollments_progress"));
}
