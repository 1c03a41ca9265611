use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{DatabaseJob, JobStatus};

const JOB_SELECT: &str = r#"
    SELECT j.*, c.name AS company_name
    FROM jobs j
    JOIN companies c ON c.id = j.company_id
"#;

/// Fields supplied by an employer when posting a job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub city: String,
    pub remote: bool,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: String,
    pub job_type: String,
    pub experience_level: String,
    pub industry: String,
    pub hebrew_level: String,
    pub timeline: String,
    pub required_skills: Vec<String>,
    pub optional_skills: Vec<String>,
    pub benefits: Vec<String>,
    pub status: JobStatus,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub city: Option<String>,
    pub remote: Option<bool>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    pub hebrew_level: Option<String>,
    pub timeline: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub optional_skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
}

/// Every published job, newest first.
pub async fn list_published(pool: &PgPool) -> Result<Vec<DatabaseJob>, AppError> {
    let sql = format!(
        "{JOB_SELECT} WHERE j.status = 'published' ORDER BY COALESCE(j.published_at, j.created_at) DESC"
    );
    Ok(sqlx::query_as::<_, DatabaseJob>(&sql).fetch_all(pool).await?)
}

pub async fn list_by_poster(pool: &PgPool, user_id: Uuid) -> Result<Vec<DatabaseJob>, AppError> {
    let sql = format!("{JOB_SELECT} WHERE j.posted_by = $1 ORDER BY j.created_at DESC");
    Ok(sqlx::query_as::<_, DatabaseJob>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?)
}

pub async fn list_by_company(
    pool: &PgPool,
    company_id: Uuid,
    published_only: bool,
) -> Result<Vec<DatabaseJob>, AppError> {
    let sql = format!(
        "{JOB_SELECT} WHERE j.company_id = $1 AND ($2 = FALSE OR j.status = 'published') ORDER BY j.created_at DESC"
    );
    Ok(sqlx::query_as::<_, DatabaseJob>(&sql)
        .bind(company_id)
        .bind(published_only)
        .fetch_all(pool)
        .await?)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<DatabaseJob>, AppError> {
    let sql = format!("{JOB_SELECT} WHERE j.id = $1");
    Ok(sqlx::query_as::<_, DatabaseJob>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<DatabaseJob, AppError> {
    find(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

pub async fn insert(pool: &PgPool, job: NewJob) -> Result<DatabaseJob, AppError> {
    Ok(sqlx::query_as::<_, DatabaseJob>(
        r#"
        WITH inserted AS (
            INSERT INTO jobs
                (id, company_id, posted_by, title, description, short_description, city, remote,
                 salary_min, salary_max, currency, job_type, experience_level, industry,
                 hebrew_level, timeline, required_skills, optional_skills, benefits, status,
                 published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, CASE WHEN $20 = 'published' THEN NOW() END)
            RETURNING *
        )
        SELECT inserted.*, c.name AS company_name
        FROM inserted
        JOIN companies c ON c.id = inserted.company_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.company_id)
    .bind(job.posted_by)
    .bind(job.title)
    .bind(job.description)
    .bind(job.short_description)
    .bind(job.city)
    .bind(job.remote)
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.currency)
    .bind(job.job_type)
    .bind(job.experience_level)
    .bind(job.industry)
    .bind(job.hebrew_level)
    .bind(job.timeline)
    .bind(job.required_skills)
    .bind(job.optional_skills)
    .bind(job.benefits)
    .bind(job.status.as_str())
    .fetch_one(pool)
    .await?)
}

pub async fn update(pool: &PgPool, id: Uuid, changes: JobChanges) -> Result<DatabaseJob, AppError> {
    sqlx::query_as::<_, DatabaseJob>(
        r#"
        WITH updated AS (
            UPDATE jobs SET
                title             = COALESCE($2, title),
                description       = COALESCE($3, description),
                short_description = COALESCE($4, short_description),
                city              = COALESCE($5, city),
                remote            = COALESCE($6, remote),
                salary_min        = COALESCE($7, salary_min),
                salary_max        = COALESCE($8, salary_max),
                currency          = COALESCE($9, currency),
                job_type          = COALESCE($10, job_type),
                experience_level  = COALESCE($11, experience_level),
                industry          = COALESCE($12, industry),
                hebrew_level      = COALESCE($13, hebrew_level),
                timeline          = COALESCE($14, timeline),
                required_skills   = COALESCE($15, required_skills),
                optional_skills   = COALESCE($16, optional_skills),
                benefits          = COALESCE($17, benefits),
                updated_at        = NOW()
            WHERE id = $1
            RETURNING *
        )
        SELECT updated.*, c.name AS company_name
        FROM updated
        JOIN companies c ON c.id = updated.company_id
        "#,
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.short_description)
    .bind(changes.city)
    .bind(changes.remote)
    .bind(changes.salary_min)
    .bind(changes.salary_max)
    .bind(changes.currency)
    .bind(changes.job_type)
    .bind(changes.experience_level)
    .bind(changes.industry)
    .bind(changes.hebrew_level)
    .bind(changes.timeline)
    .bind(changes.required_skills)
    .bind(changes.optional_skills)
    .bind(changes.benefits)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// Publishing stamps `published_at` the first time only.
pub async fn set_status(pool: &PgPool, id: Uuid, status: JobStatus) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE jobs SET
            status       = $2,
            published_at = CASE WHEN $2 = 'published' THEN COALESCE(published_at, NOW()) ELSE published_at END,
            updated_at   = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn increment_views(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE jobs SET view_count = view_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
