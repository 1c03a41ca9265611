use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::jobs::resolve_job;
use crate::models::job::Job;
use crate::saved_jobs;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveJobRequest {
    pub job_id: String,
}

/// GET /api/v1/saved-jobs
/// References that no longer resolve (closed or deleted jobs, scraped rows
/// gone after a dataset refresh) are skipped.
pub async fn handle_list_saved(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Job>>, AppError> {
    let refs = saved_jobs::list_refs(&state.db, auth.id).await?;
    let mut jobs = Vec::with_capacity(refs.len());
    for job_ref in refs {
        match resolve_job(&state, &job_ref).await? {
            Some(job) => jobs.push(job),
            None => debug!("Saved job {job_ref} no longer resolves"),
        }
    }
    Ok(Json(jobs))
}

/// POST /api/v1/saved-jobs
pub async fn handle_save_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SaveJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job_ref = req.job_id.trim();
    let job = resolve_job(&state, job_ref)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_ref} not found")))?;
    saved_jobs::save(&state.db, auth.id, job_ref).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// DELETE /api/v1/saved-jobs/:job_id
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_ref): Path<String>,
) -> Result<StatusCode, AppError> {
    if !saved_jobs::remove(&state.db, auth.id, &job_ref).await? {
        return Err(AppError::NotFound(format!("Job {job_ref} is not saved")));
    }
    Ok(StatusCode::NO_CONTENT)
}
