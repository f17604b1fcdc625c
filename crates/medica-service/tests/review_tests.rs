//! Integration tests for POST /api/v1/doctors/{id}/reviews.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use medica_test_utils::{
    doctor_average_rating, seed_doctor, seed_review, TestMedicaServer, TestTokenBuilder,
    TEST_DOCTOR_USER_1, TEST_PATIENT_AMIRA, TEST_PATIENT_BRUNO, TEST_PATIENT_CHLOE,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

async fn post_review(
    server: &TestMedicaServer,
    token: &str,
    doctor_id: Uuid,
    body: Value,
) -> Result<reqwest::Response> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/v1/doctors/{}/reviews", server.url(), doctor_id))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?)
}

fn patient(user_id: Uuid) -> String {
    TestTokenBuilder::new().patient(user_id).sign()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_review_updates_average(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Cardiology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool.clone()).await?;

    let response = post_review(
        &server,
        &patient(TEST_PATIENT_AMIRA),
        doctor_id,
        json!({"rating": 5, "comment": "Excellent"}),
    )
    .await?;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await?;
    assert_eq!(body["average_rating"], 5.0);

    let body: Value = post_review(
        &server,
        &patient(TEST_PATIENT_BRUNO),
        doctor_id,
        json!({"rating": 4}),
    )
    .await?
    .json()
    .await?;
    assert_eq!(body["average_rating"], 4.5);

    let body: Value = post_review(
        &server,
        &patient(TEST_PATIENT_CHLOE),
        doctor_id,
        json!({"rating": 1}),
    )
    .await?
    .json()
    .await?;
    // 10 / 3 rounded to one decimal
    assert_eq!(body["average_rating"], 3.3);

    let stored = doctor_average_rating(&pool, doctor_id).await?;
    assert!((stored - 10.0 / 3.0).abs() < 1e-9);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ratings_four_five_three_average_exactly_four(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Neurology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool.clone()).await?;

    let mut last: Value = Value::Null;
    for (user_id, rating) in [
        (TEST_PATIENT_AMIRA, 4),
        (TEST_PATIENT_BRUNO, 5),
        (TEST_PATIENT_CHLOE, 3),
    ] {
        let response =
            post_review(&server, &patient(user_id), doctor_id, json!({"rating": rating})).await?;
        assert_eq!(response.status(), 201);
        last = response.json().await?;
    }

    assert_eq!(last["average_rating"], 4.0);
    assert_eq!(doctor_average_rating(&pool, doctor_id).await?, 4.0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_average_includes_existing_reviews(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Dermatology", 0.0).await?;
    seed_review(&pool, doctor_id, TEST_PATIENT_BRUNO, 2, "Rushed").await?;
    let server = TestMedicaServer::spawn(pool.clone()).await?;

    let body: Value = post_review(
        &server,
        &patient(TEST_PATIENT_AMIRA),
        doctor_id,
        json!({"rating": 4}),
    )
    .await?
    .json()
    .await?;

    assert_eq!(body["average_rating"], 3.0);
    assert!((doctor_average_rating(&pool, doctor_id).await? - 3.0).abs() < 1e-9);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_review_is_conflict(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Cardiology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool.clone()).await?;
    let token = patient(TEST_PATIENT_AMIRA);

    let first = post_review(&server, &token, doctor_id, json!({"rating": 5})).await?;
    assert_eq!(first.status(), 201);

    let second = post_review(&server, &token, doctor_id, json!({"rating": 1})).await?;
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await?;
    assert_eq!(body["error"]["message"], "You have already reviewed this doctor.");

    // The second rating must not leak into the average
    assert!((doctor_average_rating(&pool, doctor_id).await? - 5.0).abs() < 1e-9);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_duplicates_store_one_review(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Cardiology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool.clone()).await?;
    let token = patient(TEST_PATIENT_AMIRA);

    let (a, b) = tokio::join!(
        post_review(&server, &token, doctor_id, json!({"rating": 5})),
        post_review(&server, &token, doctor_id, json!({"rating": 3})),
    );
    let mut statuses = vec![a?.status().as_u16(), b?.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![201, 409]);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE doctor_id = $1")
        .bind(doctor_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rating_out_of_range_is_400(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Cardiology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool.clone()).await?;
    let token = patient(TEST_PATIENT_AMIRA);

    for rating in [json!(0), json!(6), json!(-3), json!("five")] {
        let response = post_review(&server, &token, doctor_id, json!({"rating": rating})).await?;
        assert_eq!(response.status(), 400, "rating {rating} should be rejected");
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_only_patients_may_review(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Cardiology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool).await?;

    let doctor_token = TestTokenBuilder::new().doctor(TEST_DOCTOR_USER_1).sign();
    let response = post_review(&server, &doctor_token, doctor_id, json!({"rating": 5})).await?;
    assert_eq!(response.status(), 403);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_review_of_unknown_doctor_is_404(pool: PgPool) -> Result<()> {
    let server = TestMedicaServer::spawn(pool).await?;

    let response = post_review(
        &server,
        &patient(TEST_PATIENT_AMIRA),
        Uuid::new_v4(),
        json!({"rating": 5}),
    )
    .await?;
    assert_eq!(response.status(), 404);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_invalid_tokens_are_rejected(pool: PgPool) -> Result<()> {
    let doctor_id = seed_doctor(&pool, "Cardiology", 0.0).await?;
    let server = TestMedicaServer::spawn(pool).await?;

    let tokens = [
        TestTokenBuilder::new()
            .patient(TEST_PATIENT_AMIRA)
            .expires_in(-600)
            .sign(),
        TestTokenBuilder::new()
            .patient(TEST_PATIENT_AMIRA)
            .signed_with("some-other-secret-that-is-long-enough")
            .sign(),
        TestTokenBuilder::new().with_raw_subject("amira").sign(),
        "not.a.jwt".to_string(),
    ];

    for token in tokens {
        let response = post_review(&server, &token, doctor_id, json!({"rating": 5})).await?;
        assert_eq!(response.status(), 401);
        assert!(response.headers().contains_key("www-authenticate"));
    }

    Ok(())
}
