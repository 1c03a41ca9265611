use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::extractor::AuthUser;
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::auth::verification::{
    consume_verification_token, issue_verification_token, verification_link,
};
use crate::email::{send_in_background, templates::verification_email};
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserRole, UserRow};
use crate::state::AppState;
use crate::users::repo::{self, NewUser};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let email = normalize_email(&req.email);
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !well_formed {
        return Err(AppError::Validation("A valid email address is required".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required".into()));
    }
    if req.role == UserRole::Admin {
        return Err(AppError::Forbidden("Admin accounts cannot self-register".into()));
    }
    Ok(())
}

async fn send_verification(state: &AppState, user: &UserRow) -> Result<(), AppError> {
    let token = issue_verification_token(&state.redis, user.id).await?;
    let link = verification_link(&state.config.app_base_url, &token);
    send_in_background(
        state.mailer.clone(),
        verification_email(&user.email, &user.full_name, &link),
    );
    Ok(())
}

/// Best-effort verification for a freshly committed account. Failures are
/// logged; the user can request a new link.
async fn verify_new_account(state: &AppState, user: &UserRow) {
    if let Err(e) = send_verification(state, user).await {
        warn!("Could not start email verification for user {}: {e}", user.id);
    }
}

fn role_of(user: &UserRow) -> Result<UserRole, AppError> {
    user.role
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&req)?;
    let email = normalize_email(&req.email);
    let password_hash = hash_password(&req.password)?;

    let user = repo::insert_user(
        &state.db,
        NewUser {
            email: &email,
            password_hash: &password_hash,
            full_name: req.full_name.trim(),
            role: req.role,
        },
    )
    .await?;
    info!("Registered {} account {}", user.role, user.id);

    verify_new_account(&state, &user).await;

    let token = state.tokens.issue(user.id, req.role)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.to_profile(),
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email);
    let user = repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!("Failed login for user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.issue(user.id, role_of(&user)?)?;
    Ok(Json(AuthResponse {
        token,
        user: user.to_profile(),
    }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = repo::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user.to_profile()))
}

/// POST /api/v1/auth/verify-email
pub async fn handle_verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let user_id = consume_verification_token(&state.redis, req.token.trim())
        .await?
        .ok_or_else(|| AppError::Validation("Verification link is invalid or has expired".into()))?;

    repo::mark_email_verified(&state.db, user_id).await?;
    let user = repo::get_by_id(&state.db, user_id).await?;
    info!("Email verified for user {user_id}");
    Ok(Json(user.to_profile()))
}

/// POST /api/v1/auth/resend-verification
pub async fn handle_resend_verification(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    let user = repo::get_by_id(&state.db, auth.id).await?;
    if user.email_verified {
        return Err(AppError::Conflict("Email is already verified".into()));
    }
    send_verification(&state, &user).await?;
    Ok(StatusCode::ACCEPTED)
}
