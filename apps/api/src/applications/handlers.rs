use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::repo;
use crate::auth::extractor::AuthUser;
use crate::email::{send_in_background, templates::application_status_email};
use crate::errors::AppError;
use crate::jobs::repo as jobs_repo;
use crate::models::application::{ApplicationStatus, ApplicationView};
use crate::models::job::{DatabaseJob, JobStatus};
use crate::models::user::UserRole;
use crate::notifications::{self, KIND_APPLICATION_STATUS, KIND_NEW_APPLICATION};
use crate::state::AppState;
use crate::users::repo as users_repo;

const MAX_COVER_LETTER_CHARS: usize = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    #[serde(default)]
    pub cover_letter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    raw.parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
}

fn ensure_job_employer(auth: &AuthUser, job: &DatabaseJob) -> Result<(), AppError> {
    if job.posted_by == auth.id || auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the employer who posted this job can manage its applications".into(),
        ))
    }
}

/// Employer-side transition check, including the withdraw exclusion.
pub fn check_employer_transition(
    current: ApplicationStatus,
    next: ApplicationStatus,
) -> Result<(), AppError> {
    if current.employer_can_move_to(next) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Cannot move an application from {current} to {next}"
        )))
    }
}

/// POST /api/v1/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    if auth.role != UserRole::JobSeeker {
        return Err(AppError::Forbidden("Only job seekers can apply to jobs".into()));
    }
    if req.cover_letter.chars().count() > MAX_COVER_LETTER_CHARS {
        return Err(AppError::Validation(format!(
            "Cover letter must be at most {MAX_COVER_LETTER_CHARS} characters"
        )));
    }

    let job = jobs_repo::find(&state.db, req.job_id)
        .await?
        .filter(|j| j.status == JobStatus::Published.as_str())
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let applicant = users_repo::get_by_id(&state.db, auth.id).await?;
    let row = repo::insert(
        &state.db,
        job.id,
        auth.id,
        req.cover_letter.trim(),
        applicant.resume_key.as_deref(),
    )
    .await?;
    info!("User {} applied to job {}", auth.id, job.id);

    notifications::notify(
        &state.db,
        job.posted_by,
        KIND_NEW_APPLICATION,
        &format!("{} applied to {}", applicant.full_name, job.title),
        Some(&format!("/jobs/{}/applications", job.id)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(repo::get_view(&state.db, row.id).await?)))
}

/// GET /api/v1/applications/mine
pub async fn handle_my_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    Ok(Json(repo::list_by_applicant(&state.db, auth.id).await?))
}

/// GET /api/v1/applications/job/:job_id
pub async fn handle_job_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let job = jobs_repo::get(&state.db, job_id).await?;
    ensure_job_employer(&auth, &job)?;
    Ok(Json(repo::list_by_job(&state.db, job_id).await?))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_application_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplicationStatusRequest>,
) -> Result<Json<ApplicationView>, AppError> {
    let application = repo::get(&state.db, id).await?;
    let job = jobs_repo::get(&state.db, application.job_id).await?;
    ensure_job_employer(&auth, &job)?;

    let current = parse_status(&application.status)?;
    check_employer_transition(current, req.status)?;
    repo::set_status(&state.db, id, req.status).await?;
    info!("Application {id} moved {current} -> {}", req.status);

    notifications::notify(
        &state.db,
        application.applicant_id,
        KIND_APPLICATION_STATUS,
        &format!("Your application for {} is now {}", job.title, req.status),
        Some("/applications"),
    )
    .await;
    if let Some(applicant) = users_repo::find_by_id(&state.db, application.applicant_id).await? {
        send_in_background(
            state.mailer.clone(),
            application_status_email(&applicant.email, &job.title, req.status.as_str()),
        );
    }

    Ok(Json(repo::get_view(&state.db, id).await?))
}

/// DELETE /api/v1/applications/:id
/// Withdraws the caller's own application. The row is kept.
pub async fn handle_withdraw_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError> {
    let application = repo::get(&state.db, id).await?;
    if application.applicant_id != auth.id {
        return Err(AppError::Forbidden(
            "You can only withdraw your own applications".into(),
        ));
    }
    let current = parse_status(&application.status)?;
    if current.is_final() {
        return Err(AppError::Validation(format!(
            "A {current} application can no longer be withdrawn"
        )));
    }
    repo::set_status(&state.db, id, ApplicationStatus::Withdrawn).await?;
    info!("Application {id} withdrawn by {}", auth.id);
    Ok(Json(repo::get_view(&state.db, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employer_transition_errors_are_validation() {
        assert!(check_employer_transition(ApplicationStatus::Pending, ApplicationStatus::Interview).is_ok());
        let err = check_employer_transition(ApplicationStatus::Rejected, ApplicationStatus::Accepted);
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_apply_request_cover_letter_optional() {
        let req: ApplyRequest =
            serde_json::from_str(&format!(r#"{{"job_id":"{}"}}"#, Uuid::nil())).unwrap();
        assert_eq!(req.cover_letter, "");
    }

    #[test]
    fn test_duplicate_message_is_stable() {
        assert_eq!(repo::DUPLICATE_APPLICATION, "You have already applied to this job");
    }
}
