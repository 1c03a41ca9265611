use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::{CompanyRow, RatingSummary};

#[derive(Debug, Clone, Default)]
pub struct CompanyFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<CompanyRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies ORDER BY name ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<CompanyRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<CompanyRow, AppError> {
    find(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
}

pub async fn insert(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    fields: CompanyFields,
) -> Result<CompanyRow, AppError> {
    Ok(sqlx::query_as::<_, CompanyRow>(
        r#"
        INSERT INTO companies (id, owner_id, name, description, website, industry, size, location)
        VALUES ($1, $2, $3, COALESCE($4, ''), $5, COALESCE($6, ''), $7, COALESCE($8, ''))
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(name)
    .bind(fields.description)
    .bind(fields.website)
    .bind(fields.industry)
    .bind(fields.size)
    .bind(fields.location)
    .fetch_one(pool)
    .await?)
}

pub async fn update(pool: &PgPool, id: Uuid, fields: CompanyFields) -> Result<CompanyRow, AppError> {
    sqlx::query_as::<_, CompanyRow>(
        r#"
        UPDATE companies SET
            name        = COALESCE($2, name),
            description = COALESCE($3, description),
            website     = COALESCE($4, website),
            industry    = COALESCE($5, industry),
            size        = COALESCE($6, size),
            location    = COALESCE($7, location),
            updated_at  = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(fields.name)
    .bind(fields.description)
    .bind(fields.website)
    .bind(fields.industry)
    .bind(fields.size)
    .bind(fields.location)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
}

pub async fn set_logo_key(pool: &PgPool, id: Uuid, key: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE companies SET logo_key = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn rating_summary(pool: &PgPool, id: Uuid) -> Result<RatingSummary, AppError> {
    Ok(sqlx::query_as::<_, RatingSummary>(
        "SELECT AVG(rating)::FLOAT8 AS average_rating, COUNT(*) AS review_count FROM reviews WHERE company_id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?)
}
