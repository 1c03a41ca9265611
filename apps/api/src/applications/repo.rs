use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, ApplicationView};

pub const DUPLICATE_APPLICATION: &str = "You have already applied to this job";

const VIEW_SELECT: &str = r#"
    SELECT a.id, a.job_id, j.title AS job_title, c.name AS company_name,
           a.applicant_id, u.full_name AS applicant_name, a.cover_letter,
           (a.resume_key IS NOT NULL) AS has_resume, a.status, a.created_at, a.updated_at
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN companies c ON c.id = j.company_id
    JOIN users u ON u.id = a.applicant_id
"#;

/// Inserts the application and bumps the job's counter in one transaction.
pub async fn insert(
    pool: &PgPool,
    job_id: Uuid,
    applicant_id: Uuid,
    cover_letter: &str,
    resume_key: Option<&str>,
) -> Result<ApplicationRow, AppError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, job_id, applicant_id, cover_letter, resume_key)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(applicant_id)
    .bind(cover_letter)
    .bind(resume_key)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_APPLICATION))?;

    sqlx::query("UPDATE jobs SET application_count = application_count + 1 WHERE id = $1")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<ApplicationRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<ApplicationRow, AppError> {
    find(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

pub async fn get_view(pool: &PgPool, id: Uuid) -> Result<ApplicationView, AppError> {
    let sql = format!("{VIEW_SELECT} WHERE a.id = $1");
    sqlx::query_as::<_, ApplicationView>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

pub async fn list_by_applicant(
    pool: &PgPool,
    applicant_id: Uuid,
) -> Result<Vec<ApplicationView>, AppError> {
    let sql = format!("{VIEW_SELECT} WHERE a.applicant_id = $1 ORDER BY a.created_at DESC");
    Ok(sqlx::query_as::<_, ApplicationView>(&sql)
        .bind(applicant_id)
        .fetch_all(pool)
        .await?)
}

pub async fn list_by_job(pool: &PgPool, job_id: Uuid) -> Result<Vec<ApplicationView>, AppError> {
    let sql = format!("{VIEW_SELECT} WHERE a.job_id = $1 ORDER BY a.created_at DESC");
    Ok(sqlx::query_as::<_, ApplicationView>(&sql)
        .bind(job_id)
        .fetch_all(pool)
        .await?)
}

pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<(), AppError> {
    sqlx::query("UPDATE applications SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    Ok(())
}
