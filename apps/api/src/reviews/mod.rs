pub mod handlers;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::ReviewRow;

pub const DUPLICATE_REVIEW: &str = "You have already reviewed this company";

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.company_id, r.author_id, u.full_name AS author_name,
           r.rating, r.title, r.body, r.created_at
    FROM reviews r
    JOIN users u ON u.id = r.author_id
"#;

pub async fn list_for_company(pool: &PgPool, company_id: Uuid) -> Result<Vec<ReviewRow>, AppError> {
    let sql = format!("{REVIEW_SELECT} WHERE r.company_id = $1 ORDER BY r.created_at DESC");
    Ok(sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(company_id)
        .fetch_all(pool)
        .await?)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<ReviewRow>, AppError> {
    let sql = format!("{REVIEW_SELECT} WHERE r.id = $1");
    Ok(sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert(
    pool: &PgPool,
    company_id: Uuid,
    author_id: Uuid,
    rating: i16,
    title: &str,
    body: &str,
) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO reviews (id, company_id, author_id, rating, title, body)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(author_id)
    .bind(rating)
    .bind(title)
    .bind(body)
    .execute(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_REVIEW))?;
    Ok(id)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
