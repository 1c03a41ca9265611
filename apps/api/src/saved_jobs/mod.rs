//! Bookmarks over the unified listing. A saved reference is either a database
//! job UUID or a scraped `_id`, stored as text.

pub mod handlers;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;

/// Saved references, most recently saved first.
pub async fn list_refs(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT job_ref FROM saved_jobs WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(r,)| r).collect())
}

/// Saving twice is a no-op.
pub async fn save(pool: &PgPool, user_id: Uuid, job_ref: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO saved_jobs (user_id, job_ref) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(job_ref)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove(pool: &PgPool, user_id: Uuid, job_ref: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_ref = $2")
        .bind(user_id)
        .bind(job_ref)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
