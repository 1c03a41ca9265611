use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{UserRole, UserRow};

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: UserRole,
}

/// Profile fields a user may edit. `None` leaves the column unchanged.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hebrew_level: Option<String>,
    pub arrival_timeline: Option<String>,
}

pub async fn insert_user(pool: &PgPool, user: NewUser<'_>) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.full_name)
    .bind(user.role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "An account with this email already exists"))
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<UserRow, AppError> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

pub async fn mark_email_verified(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    changes: ProfileChanges,
) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET
            full_name        = COALESCE($2, full_name),
            phone            = COALESCE($3, phone),
            bio              = COALESCE($4, bio),
            skills           = COALESCE($5, skills),
            hebrew_level     = COALESCE($6, hebrew_level),
            arrival_timeline = COALESCE($7, arrival_timeline),
            updated_at       = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.full_name)
    .bind(changes.phone)
    .bind(changes.bio)
    .bind(changes.skills)
    .bind(changes.hebrew_level)
    .bind(changes.arrival_timeline)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

pub async fn set_resume_key(pool: &PgPool, id: Uuid, key: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET resume_key = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}
