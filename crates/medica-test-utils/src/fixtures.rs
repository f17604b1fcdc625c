//! Database fixtures.
//!
//! Rows are inserted with plain SQL so tests do not depend on the service
//! code paths they are exercising.

use sqlx::PgPool;
use uuid::Uuid;

/// Insert a medicine and return its id.
pub async fn seed_medicine(
    pool: &PgPool,
    name: &str,
    description: &str,
) -> Result<Uuid, anyhow::Error> {
    let (medicine_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO medicines (name, description) VALUES ($1, $2) RETURNING medicine_id",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(medicine_id)
}

/// Insert a pharmacy and return its id.
pub async fn seed_pharmacy(
    pool: &PgPool,
    name: &str,
    lat: f64,
    lng: f64,
    owner_user_id: Option<Uuid>,
) -> Result<Uuid, anyhow::Error> {
    let (pharmacy_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO pharmacies (owner_user_id, name, address, lat, lng)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING pharmacy_id
        "#,
    )
    .bind(owner_user_id)
    .bind(name)
    .bind(format!("{name} street"))
    .bind(lat)
    .bind(lng)
    .fetch_one(pool)
    .await?;
    Ok(pharmacy_id)
}

/// Set a stock quantity.
pub async fn seed_stock(
    pool: &PgPool,
    pharmacy_id: Uuid,
    medicine_id: Uuid,
    quantity: i32,
) -> Result<(), anyhow::Error> {
    sqlx::query(
        r#"
        INSERT INTO pharmacy_stock (pharmacy_id, medicine_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (pharmacy_id, medicine_id) DO UPDATE SET quantity = EXCLUDED.quantity
        "#,
    )
    .bind(pharmacy_id)
    .bind(medicine_id)
    .bind(quantity)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert a doctor profile owned by `user_id` and return the doctor id.
pub async fn seed_doctor_for_user(
    pool: &PgPool,
    user_id: Uuid,
    display_name: &str,
    specialty: &str,
    average_rating: f64,
) -> Result<Uuid, anyhow::Error> {
    let (doctor_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO doctor_profiles (user_id, display_name, specialty, bio, average_rating)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING doctor_id
        "#,
    )
    .bind(user_id)
    .bind(display_name)
    .bind(specialty)
    .bind(format!("{display_name} practises {specialty}."))
    .bind(average_rating)
    .fetch_one(pool)
    .await?;
    Ok(doctor_id)
}

/// Insert a doctor profile with a fresh user id and return the doctor id.
pub async fn seed_doctor(
    pool: &PgPool,
    specialty: &str,
    average_rating: f64,
) -> Result<Uuid, anyhow::Error> {
    let user_id = Uuid::new_v4();
    let name = format!("Dr {}", &user_id.simple().to_string()[..8]);
    seed_doctor_for_user(pool, user_id, &name, specialty, average_rating).await
}

/// Insert a review without touching the doctor's average.
pub async fn seed_review(
    pool: &PgPool,
    doctor_id: Uuid,
    patient_id: Uuid,
    rating: i32,
    comment: &str,
) -> Result<Uuid, anyhow::Error> {
    let (review_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO reviews (doctor_id, patient_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING review_id
        "#,
    )
    .bind(doctor_id)
    .bind(patient_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await?;
    Ok(review_id)
}

/// Current average rating stored on a doctor profile.
pub async fn doctor_average_rating(pool: &PgPool, doctor_id: Uuid) -> Result<f64, anyhow::Error> {
    let (rating,): (f64,) =
        sqlx::query_as("SELECT average_rating FROM doctor_profiles WHERE doctor_id = $1")
            .bind(doctor_id)
            .fetch_one(pool)
            .await?;
    Ok(rating)
}
