use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::companies::ensure_company_owner;
use crate::errors::AppError;
use crate::jobs::filter::{filter_jobs, JobFilter};
use crate::jobs::pagination::{paginate, Page, PAGE_SIZE};
use crate::jobs::{load_listings, repo};
use crate::models::job::{DatabaseJob, Job, JobStatus};
use crate::models::user::UserRole;
use crate::scraped::normalizer::shorten;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub remote: bool,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub hebrew_level: String,
    pub timeline: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub optional_skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Publish immediately instead of saving a draft.
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJobRequest {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusRequest {
    pub status: JobStatus,
}

pub fn validate_salary(min: Option<i32>, max: Option<i32>) -> Result<(), AppError> {
    if min.is_some_and(|v| v < 0) || max.is_some_and(|v| v < 0) {
        return Err(AppError::Validation("Salary cannot be negative".into()));
    }
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(AppError::Validation(
                "Minimum salary cannot exceed maximum salary".into(),
            ));
        }
    }
    Ok(())
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn ensure_job_owner(auth: &AuthUser, job: &DatabaseJob) -> Result<(), AppError> {
    if job.posted_by == auth.id || auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("You can only manage your own job postings".into()))
    }
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Page<Job>>, AppError> {
    let jobs = load_listings(&state).await?;
    let matching = filter_jobs(&jobs, &filter);
    let page = paginate(&matching, paging.page.unwrap_or(1), PAGE_SIZE).map(Job::clone);
    Ok(Json(page))
}

/// GET /api/v1/jobs/:id
/// Accepts a database UUID or a scraped listing id. Drafts and closed jobs
/// are visible to their owner only.
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    viewer: Option<AuthUser>,
) -> Result<Json<Job>, AppError> {
    let Ok(uuid) = Uuid::parse_str(&id) else {
        return state
            .scraped
            .find(&id)
            .cloned()
            .map(|j| Json(Job::External(j)))
            .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")));
    };

    let job = repo::get(&state.db, uuid).await?;
    if job.status != JobStatus::Published.as_str() {
        let owner = viewer.is_some_and(|v| ensure_job_owner(&v, &job).is_ok());
        if !owner {
            return Err(AppError::NotFound(format!("Job {id} not found")));
        }
    } else {
        repo::increment_views(&state.db, uuid).await?;
    }
    Ok(Json(Job::Database(job)))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<DatabaseJob>), AppError> {
    auth.require_role(UserRole::Employer)?;
    require_text(&req.title, "Title")?;
    require_text(&req.description, "Description")?;
    validate_salary(req.salary_min, req.salary_max)?;

    let company = crate::companies::repo::get(&state.db, req.company_id).await?;
    ensure_company_owner(&auth, &company)?;

    let short_description = req
        .short_description
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| shorten(&req.description));
    let status = if req.publish {
        JobStatus::Published
    } else {
        JobStatus::Draft
    };

    let job = repo::insert(
        &state.db,
        repo::NewJob {
            company_id: company.id,
            posted_by: auth.id,
            title: req.title.trim().to_string(),
            description: req.description,
            short_description,
            city: req.city,
            remote: req.remote,
            salary_min: req.salary_min,
            salary_max: req.salary_max,
            currency: req.currency.unwrap_or_else(|| "ILS".to_string()),
            job_type: req.job_type.unwrap_or_else(|| "full-time".to_string()),
            experience_level: req.experience_level.unwrap_or_else(|| "mid".to_string()),
            industry: req.industry,
            hebrew_level: req.hebrew_level,
            timeline: req.timeline.unwrap_or_else(|| "now".to_string()),
            required_skills: req.required_skills,
            optional_skills: req.optional_skills,
            benefits: req.benefits,
            status,
        },
    )
    .await?;

    info!("Job {} created as {status} by {}", job.id, auth.id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PATCH /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<DatabaseJob>, AppError> {
    let existing = repo::get(&state.db, id).await?;
    ensure_job_owner(&auth, &existing)?;

    if let Some(title) = &req.title {
        require_text(title, "Title")?;
    }
    if let Some(description) = &req.description {
        require_text(description, "Description")?;
    }
    validate_salary(
        req.salary_min.or(existing.salary_min),
        req.salary_max.or(existing.salary_max),
    )?;

    let job = repo::update(
        &state.db,
        id,
        repo::JobChanges {
            title: req.title.map(|t| t.trim().to_string()),
            description: req.description,
            short_description: req.short_description,
            city: req.city,
            remote: req.remote,
            salary_min: req.salary_min,
            salary_max: req.salary_max,
            currency: req.currency,
            job_type: req.job_type,
            experience_level: req.experience_level,
            industry: req.industry,
            hebrew_level: req.hebrew_level,
            timeline: req.timeline,
            required_skills: req.required_skills,
            optional_skills: req.optional_skills,
            benefits: req.benefits,
        },
    )
    .await?;
    Ok(Json(job))
}

/// POST /api/v1/jobs/:id/status
pub async fn handle_set_job_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<JobStatusRequest>,
) -> Result<Json<DatabaseJob>, AppError> {
    let job = repo::get(&state.db, id).await?;
    ensure_job_owner(&auth, &job)?;

    let current: JobStatus = job
        .status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
    if !current.can_transition_to(req.status) {
        return Err(AppError::Validation(format!(
            "Cannot move a {current} job to {}",
            req.status
        )));
    }

    repo::set_status(&state.db, id, req.status).await?;
    info!("Job {id} moved {current} -> {}", req.status);
    Ok(Json(repo::get(&state.db, id).await?))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let job = repo::get(&state.db, id).await?;
    ensure_job_owner(&auth, &job)?;
    repo::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/jobs/mine
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DatabaseJob>>, AppError> {
    auth.require_role(UserRole::Employer)?;
    Ok(Json(repo::list_by_poster(&state.db, auth.id).await?))
}
