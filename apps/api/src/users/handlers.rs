use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::storage::{self, RESUME_CONTENT_TYPES};
use crate::users::repo::{self, ProfileChanges};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hebrew_level: Option<String>,
    pub arrival_timeline: Option<String>,
}

impl UpdateProfileRequest {
    fn into_changes(self) -> Result<ProfileChanges, AppError> {
        if self.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Full name cannot be blank".into()));
        }
        Ok(ProfileChanges {
            full_name: self.full_name.map(|n| n.trim().to_string()),
            phone: self.phone,
            bio: self.bio,
            skills: self.skills.map(|skills| {
                skills
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            hebrew_level: self.hebrew_level,
            arrival_timeline: self.arrival_timeline,
        })
    }
}

/// GET /api/v1/users/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(repo::get_by_id(&state.db, auth.id).await?.to_profile()))
}

/// PATCH /api/v1/users/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let user = repo::update_profile(&state.db, auth.id, req.into_changes()?).await?;
    Ok(Json(user.to_profile()))
}

/// PUT /api/v1/users/me/resume
/// Multipart body with a single `file` part (PDF, DOC or DOCX).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UserProfile>, AppError> {
    let upload = storage::read_file_field(&mut multipart, "file").await?;
    storage::validate_upload(&upload, RESUME_CONTENT_TYPES)?;

    let key = storage::object_key("resumes", auth.id, upload.extension().as_deref());
    storage::upload_object(
        &state.s3,
        &state.config.s3_bucket,
        &key,
        upload.data,
        &upload.content_type,
    )
    .await?;
    repo::set_resume_key(&state.db, auth.id, &key).await?;
    info!("Resume uploaded for user {}", auth.id);

    Ok(Json(repo::get_by_id(&state.db, auth.id).await?.to_profile()))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let user = repo::get_by_id(&state.db, id).await?;
    let profile = if auth.id == id || auth.is_admin() {
        user.to_profile()
    } else {
        user.to_public_profile()
    };
    Ok(Json(profile))
}
