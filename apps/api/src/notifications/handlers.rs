use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::notifications;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationList {
    pub unread_count: i64,
    pub items: Vec<NotificationRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// GET /api/v1/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<NotificationList>, AppError> {
    let items = notifications::list_for_user(&state.db, auth.id).await?;
    let unread_count = notifications::unread_count(&state.db, auth.id).await?;
    Ok(Json(NotificationList {
        unread_count,
        items,
    }))
}

/// PATCH /api/v1/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !notifications::mark_read(&state.db, id, auth.id).await? {
        return Err(AppError::NotFound(format!("Notification {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn handle_mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MarkedRead>, AppError> {
    let updated = notifications::mark_all_read(&state.db, auth.id).await?;
    Ok(Json(MarkedRead { updated }))
}
