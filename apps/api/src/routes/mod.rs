pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::applications::handlers as apps;
use crate::auth::handlers as auth_h;
use crate::companies::handlers as comp;
use crate::jobs::handlers as job_h;
use crate::notifications::handlers as notif;
use crate::reviews::handlers as rev;
use crate::saved_jobs::handlers as saved;
use crate::state::AppState;
use crate::storage::MAX_UPLOAD_BYTES;
use crate::users::handlers as user_h;

/// Multipart framing on top of the largest accepted file.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth_h::handle_register))
        .route("/api/v1/auth/login", post(auth_h::handle_login))
        .route("/api/v1/auth/me", get(auth_h::handle_me))
        .route("/api/v1/auth/verify-email", post(auth_h::handle_verify_email))
        .route(
            "/api/v1/auth/resend-verification",
            post(auth_h::handle_resend_verification),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(job_h::handle_list_jobs).post(job_h::handle_create_job),
        )
        .route("/api/v1/jobs/mine", get(job_h::handle_my_jobs))
        .route(
            "/api/v1/jobs/:id",
            get(job_h::handle_get_job)
                .patch(job_h::handle_update_job)
                .delete(job_h::handle_delete_job),
        )
        .route("/api/v1/jobs/:id/status", post(job_h::handle_set_job_status))
        // Companies
        .route(
            "/api/v1/companies",
            get(comp::handle_list_companies).post(comp::handle_create_company),
        )
        .route(
            "/api/v1/companies/:id",
            get(comp::handle_get_company).patch(comp::handle_update_company),
        )
        .route("/api/v1/companies/:id/logo", put(comp::handle_upload_logo))
        .route("/api/v1/companies/:id/jobs", get(comp::handle_company_jobs))
        // Applications
        .route("/api/v1/applications", post(apps::handle_apply))
        .route("/api/v1/applications/mine", get(apps::handle_my_applications))
        .route(
            "/api/v1/applications/job/:job_id",
            get(apps::handle_job_applications),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(apps::handle_update_application_status),
        )
        .route(
            "/api/v1/applications/:id",
            delete(apps::handle_withdraw_application),
        )
        // Saved jobs
        .route(
            "/api/v1/saved-jobs",
            get(saved::handle_list_saved).post(saved::handle_save_job),
        )
        .route("/api/v1/saved-jobs/:job_id", delete(saved::handle_unsave_job))
        // Reviews
        .route(
            "/api/v1/reviews",
            get(rev::handle_list_reviews).post(rev::handle_create_review),
        )
        .route("/api/v1/reviews/:id", delete(rev::handle_delete_review))
        // Notifications
        .route(
            "/api/v1/notifications",
            get(notif::handle_list_notifications),
        )
        .route(
            "/api/v1/notifications/read-all",
            post(notif::handle_mark_all_read),
        )
        .route(
            "/api/v1/notifications/:id/read",
            patch(notif::handle_mark_read),
        )
        // Users
        .route(
            "/api/v1/users/me",
            get(user_h::handle_get_me).patch(user_h::handle_update_me),
        )
        .route("/api/v1/users/me/resume", put(user_h::handle_upload_resume))
        .route("/api/v1/users/:id", get(user_h::handle_get_user))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
