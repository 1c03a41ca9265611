//! In-app notifications. Other modules call `notify`; users read them through
//! the handlers.

pub mod handlers;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::NotificationRow;

pub const KIND_NEW_APPLICATION: &str = "new_application";
pub const KIND_APPLICATION_STATUS: &str = "application_status";

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    kind: &str,
    message: &str,
    link: Option<&str>,
) -> Result<NotificationRow, AppError> {
    Ok(sqlx::query_as::<_, NotificationRow>(
        r#"
        INSERT INTO notifications (id, user_id, kind, message, link)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(kind)
    .bind(message)
    .bind(link)
    .fetch_one(pool)
    .await?)
}

/// Best effort: a failed notification never fails the request that caused it.
pub async fn notify(pool: &PgPool, user_id: Uuid, kind: &str, message: &str, link: Option<&str>) {
    if let Err(e) = insert(pool, user_id, kind, message, link).await {
        warn!("Could not notify user {user_id} ({kind}): {e}");
    }
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<NotificationRow>, AppError> {
    Ok(sqlx::query_as::<_, NotificationRow>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Returns false when the notification does not exist or belongs to someone else.
pub async fn mark_read(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
