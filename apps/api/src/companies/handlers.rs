use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::companies::{ensure_company_owner, repo};
use crate::errors::AppError;
use crate::jobs::repo as jobs_repo;
use crate::models::company::{CompanyDetail, CompanyRow};
use crate::models::job::DatabaseJob;
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::storage::{self, IMAGE_CONTENT_TYPES};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
}

impl CompanyRequest {
    fn into_fields(self) -> repo::CompanyFields {
        repo::CompanyFields {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description,
            website: self.website.filter(|w| !w.trim().is_empty()),
            industry: self.industry,
            size: self.size,
            location: self.location,
        }
    }
}

/// GET /api/v1/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyRow>>, AppError> {
    Ok(Json(repo::list(&state.db).await?))
}

/// POST /api/v1/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<CompanyRow>), AppError> {
    auth.require_role(UserRole::Employer)?;
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Company name is required".into()))?
        .to_string();

    let company = repo::insert(&state.db, auth.id, &name, req.into_fields()).await?;
    info!("Company {} created by {}", company.id, auth.id);
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyDetail>, AppError> {
    let company = repo::get(&state.db, id).await?;
    let rating = repo::rating_summary(&state.db, id).await?;
    Ok(Json(CompanyDetail { company, rating }))
}

/// PATCH /api/v1/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CompanyRequest>,
) -> Result<Json<CompanyRow>, AppError> {
    let company = repo::get(&state.db, id).await?;
    ensure_company_owner(&auth, &company)?;
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Company name cannot be blank".into()));
    }
    Ok(Json(repo::update(&state.db, id, req.into_fields()).await?))
}

/// PUT /api/v1/companies/:id/logo
/// Multipart body with a single `file` image part.
pub async fn handle_upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CompanyRow>, AppError> {
    let company = repo::get(&state.db, id).await?;
    ensure_company_owner(&auth, &company)?;

    let upload = storage::read_file_field(&mut multipart, "file").await?;
    storage::validate_upload(&upload, IMAGE_CONTENT_TYPES)?;

    let key = storage::object_key("logos", id, upload.extension().as_deref());
    storage::upload_object(
        &state.s3,
        &state.config.s3_bucket,
        &key,
        upload.data,
        &upload.content_type,
    )
    .await?;
    repo::set_logo_key(&state.db, id, &key).await?;

    Ok(Json(repo::get(&state.db, id).await?))
}

/// GET /api/v1/companies/:id/jobs
/// Published jobs for everyone; the owner also sees drafts and closed jobs.
pub async fn handle_company_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    viewer: Option<AuthUser>,
) -> Result<Json<Vec<DatabaseJob>>, AppError> {
    let company = repo::get(&state.db, id).await?;
    let is_owner = viewer.is_some_and(|v| ensure_company_owner(&v, &company).is_ok());
    Ok(Json(
        jobs_repo::list_by_company(&state.db, id, !is_owner).await?,
    ))
}
