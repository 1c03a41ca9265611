use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::companies::repo as companies_repo;
use crate::errors::AppError;
use crate::models::review::ReviewRow;
use crate::reviews;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub company_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub company_id: Uuid,
    pub rating: i16,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

pub fn validate_review(req: &CreateReviewRequest) -> Result<(), AppError> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".into()));
    }
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Review title is required".into()));
    }
    Ok(())
}

/// GET /api/v1/reviews?company_id=
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<ReviewRow>>, AppError> {
    Ok(Json(reviews::list_for_company(&state.db, query.company_id).await?))
}

/// POST /api/v1/reviews
pub async fn handle_create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewRow>), AppError> {
    validate_review(&req)?;
    let company = companies_repo::get(&state.db, req.company_id).await?;
    if company.owner_id == auth.id {
        return Err(AppError::Forbidden("You cannot review your own company".into()));
    }

    let id = reviews::insert(
        &state.db,
        company.id,
        auth.id,
        req.rating,
        req.title.trim(),
        req.body.trim(),
    )
    .await?;
    info!("Review {id} ({} stars) posted for company {}", req.rating, company.id);

    let review = reviews::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {id} not found")))?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// DELETE /api/v1/reviews/:id
pub async fn handle_delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let review = reviews::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {id} not found")))?;
    if review.author_id != auth.id && !auth.is_admin() {
        return Err(AppError::Forbidden("You can only delete your own reviews".into()));
    }
    reviews::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
