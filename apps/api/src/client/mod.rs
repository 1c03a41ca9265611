//! Typed REST client for the Habayta Jobs API.
//!
//! Every request goes through the same transport: the bearer token is
//! attached when present, connection failures and 5xx responses are retried
//! with a fixed delay (timeouts only for idempotent methods), and a 401
//! clears the stored token so the caller can send the user back to the
//! login screen.

pub mod error;
pub mod retry;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::applications::handlers::{ApplicationStatusRequest, ApplyRequest};
use crate::auth::handlers::{AuthResponse, LoginRequest, RegisterRequest, VerifyEmailRequest};
use crate::companies::handlers::CompanyRequest;
use crate::jobs::filter::{RemoteFilter, ALL_TIMELINES};
use crate::jobs::handlers::{CreateJobRequest, JobStatusRequest, UpdateJobRequest};
use crate::jobs::listing::ListingState;
use crate::jobs::pagination::Page;
use crate::models::application::{ApplicationStatus, ApplicationView};
use crate::models::company::{CompanyDetail, CompanyRow};
use crate::models::job::{DatabaseJob, Job, JobStatus};
use crate::models::review::ReviewRow;
use crate::models::user::UserProfile;
use crate::notifications::handlers::{MarkedRead, NotificationList};
use crate::reviews::handlers::CreateReviewRequest;
use crate::saved_jobs::handlers::SaveJobRequest;
use crate::users::handlers::UpdateProfileRequest;

pub use error::ClientError;
pub use retry::{retry, retry_when, RetryPolicy};

const API_PREFIX: &str = "/api/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A file for a multipart upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

enum Body {
    Empty,
    Json(Value),
    File(FileUpload),
}

impl Body {
    fn json<T: Serialize>(value: &T) -> Result<Self, ClientError> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }
}

/// Query parameters for the listing page. Inactive criteria are omitted.
pub fn listing_query(state: &ListingState) -> Vec<(&'static str, String)> {
    let filter = &state.filter;
    let mut query = Vec::new();
    if !filter.timeline.is_empty() && filter.timeline != ALL_TIMELINES {
        query.push(("timeline", filter.timeline.clone()));
    }
    for (key, value) in [
        ("location", &filter.location),
        ("industry", &filter.industry),
        ("hebrew_level", &filter.hebrew_level),
        ("search", &filter.search),
    ] {
        if !value.is_empty() {
            query.push((key, value.clone()));
        }
    }
    if filter.remote != RemoteFilter::Any {
        query.push(("remote", String::from(filter.remote)));
    }
    query.push(("page", state.current_page.max(1).to_string()));
    query
}

#[derive(Clone)]
pub struct HabaytaClient {
    http: Client,
    base_url: String,
    token: Arc<Mutex<Option<String>>>,
    retry: RetryPolicy,
}

impl HabaytaClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(Mutex::new(None)),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    async fn attempt(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: &Body,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method, self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(value),
            Body::File(file) => {
                let part = Part::bytes(file.data.to_vec())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.content_type)?;
                request.multipart(Form::new().part("file", part))
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("{path} returned 401, clearing session token");
            self.clear_token();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error::error_message(&text),
            });
        }
        Ok(response)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<Response, ClientError> {
        let body = &body;
        let sent = method.clone();
        retry_when(
            self.retry,
            |e: &ClientError| e.is_retryable_for(&sent),
            move || self.attempt(method.clone(), path, query, body),
        )
        .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<T, ClientError> {
        let response = self.send(method, path, &[], body).await?;
        decode(response).await
    }

    async fn call_empty(&self, method: Method, path: &str, body: Body) -> Result<(), ClientError> {
        self.send(method, path, &[], body).await?;
        Ok(())
    }

    // Auth

    /// Registers and keeps the returned session token.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self
            .call(Method::POST, "/auth/register", Body::json(req)?)
            .await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    /// Logs in and keeps the returned session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .call(Method::POST, "/auth/login", Body::json(&req)?)
            .await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    pub fn logout(&self) {
        self.clear_token();
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.call(Method::GET, "/auth/me", Body::Empty).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<UserProfile, ClientError> {
        let req = VerifyEmailRequest {
            token: token.to_string(),
        };
        self.call(Method::POST, "/auth/verify-email", Body::json(&req)?)
            .await
    }

    pub async fn resend_verification(&self) -> Result<(), ClientError> {
        self.call_empty(Method::POST, "/auth/resend-verification", Body::Empty)
            .await
    }

    // Jobs

    pub async fn list_jobs(&self, state: &ListingState) -> Result<Page<Job>, ClientError> {
        let query = listing_query(state);
        let response = self.send(Method::GET, "/jobs", &query, Body::Empty).await?;
        decode(response).await
    }

    /// Accepts a database UUID or a scraped listing id.
    pub async fn get_job(&self, id: &str) -> Result<Job, ClientError> {
        self.call(Method::GET, &format!("/jobs/{id}"), Body::Empty)
            .await
    }

    pub async fn create_job(&self, req: &CreateJobRequest) -> Result<DatabaseJob, ClientError> {
        self.call(Method::POST, "/jobs", Body::json(req)?).await
    }

    pub async fn update_job(
        &self,
        id: Uuid,
        req: &UpdateJobRequest,
    ) -> Result<DatabaseJob, ClientError> {
        self.call(Method::PATCH, &format!("/jobs/{id}"), Body::json(req)?)
            .await
    }

    pub async fn set_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
    ) -> Result<DatabaseJob, ClientError> {
        let req = JobStatusRequest { status };
        self.call(
            Method::POST,
            &format!("/jobs/{id}/status"),
            Body::json(&req)?,
        )
        .await
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<(), ClientError> {
        self.call_empty(Method::DELETE, &format!("/jobs/{id}"), Body::Empty)
            .await
    }

    pub async fn my_jobs(&self) -> Result<Vec<DatabaseJob>, ClientError> {
        self.call(Method::GET, "/jobs/mine", Body::Empty).await
    }

    // Companies

    pub async fn list_companies(&self) -> Result<Vec<CompanyRow>, ClientError> {
        self.call(Method::GET, "/companies", Body::Empty).await
    }

    pub async fn create_company(&self, req: &CompanyRequest) -> Result<CompanyRow, ClientError> {
        self.call(Method::POST, "/companies", Body::json(req)?).await
    }

    pub async fn get_company(&self, id: Uuid) -> Result<CompanyDetail, ClientError> {
        self.call(Method::GET, &format!("/companies/{id}"), Body::Empty)
            .await
    }

    pub async fn update_company(
        &self,
        id: Uuid,
        req: &CompanyRequest,
    ) -> Result<CompanyRow, ClientError> {
        self.call(Method::PATCH, &format!("/companies/{id}"), Body::json(req)?)
            .await
    }

    pub async fn upload_company_logo(
        &self,
        id: Uuid,
        file: FileUpload,
    ) -> Result<CompanyRow, ClientError> {
        self.call(Method::PUT, &format!("/companies/{id}/logo"), Body::File(file))
            .await
    }

    pub async fn company_jobs(&self, id: Uuid) -> Result<Vec<DatabaseJob>, ClientError> {
        self.call(Method::GET, &format!("/companies/{id}/jobs"), Body::Empty)
            .await
    }

    // Applications

    pub async fn apply(&self, job_id: Uuid, cover_letter: &str) -> Result<ApplicationView, ClientError> {
        let req = ApplyRequest {
            job_id,
            cover_letter: cover_letter.to_string(),
        };
        self.call(Method::POST, "/applications", Body::json(&req)?)
            .await
    }

    pub async fn my_applications(&self) -> Result<Vec<ApplicationView>, ClientError> {
        self.call(Method::GET, "/applications/mine", Body::Empty)
            .await
    }

    pub async fn job_applications(&self, job_id: Uuid) -> Result<Vec<ApplicationView>, ClientError> {
        self.call(
            Method::GET,
            &format!("/applications/job/{job_id}"),
            Body::Empty,
        )
        .await
    }

    pub async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationView, ClientError> {
        let req = ApplicationStatusRequest { status };
        self.call(
            Method::PATCH,
            &format!("/applications/{id}/status"),
            Body::json(&req)?,
        )
        .await
    }

    pub async fn withdraw_application(&self, id: Uuid) -> Result<ApplicationView, ClientError> {
        self.call(Method::DELETE, &format!("/applications/{id}"), Body::Empty)
            .await
    }

    // Saved jobs

    pub async fn saved_jobs(&self) -> Result<Vec<Job>, ClientError> {
        self.call(Method::GET, "/saved-jobs", Body::Empty).await
    }

    pub async fn save_job(&self, job_ref: &str) -> Result<Job, ClientError> {
        let req = SaveJobRequest {
            job_id: job_ref.to_string(),
        };
        self.call(Method::POST, "/saved-jobs", Body::json(&req)?)
            .await
    }

    pub async fn unsave_job(&self, job_ref: &str) -> Result<(), ClientError> {
        self.call_empty(Method::DELETE, &format!("/saved-jobs/{job_ref}"), Body::Empty)
            .await
    }

    // Reviews

    pub async fn company_reviews(&self, company_id: Uuid) -> Result<Vec<ReviewRow>, ClientError> {
        let query = [("company_id", company_id.to_string())];
        let response = self.send(Method::GET, "/reviews", &query, Body::Empty).await?;
        decode(response).await
    }

    pub async fn create_review(&self, req: &CreateReviewRequest) -> Result<ReviewRow, ClientError> {
        self.call(Method::POST, "/reviews", Body::json(req)?).await
    }

    pub async fn delete_review(&self, id: Uuid) -> Result<(), ClientError> {
        self.call_empty(Method::DELETE, &format!("/reviews/{id}"), Body::Empty)
            .await
    }

    // Notifications

    pub async fn notifications(&self) -> Result<NotificationList, ClientError> {
        self.call(Method::GET, "/notifications", Body::Empty).await
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> Result<(), ClientError> {
        self.call_empty(
            Method::PATCH,
            &format!("/notifications/{id}/read"),
            Body::Empty,
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<MarkedRead, ClientError> {
        self.call(Method::POST, "/notifications/read-all", Body::Json(json!({})))
            .await
    }

    // Users

    pub async fn my_profile(&self) -> Result<UserProfile, ClientError> {
        self.call(Method::GET, "/users/me", Body::Empty).await
    }

    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<UserProfile, ClientError> {
        self.call(Method::PATCH, "/users/me", Body::json(req)?).await
    }

    pub async fn upload_resume(&self, file: FileUpload) -> Result<UserProfile, ClientError> {
        self.call(Method::PUT, "/users/me/resume", Body::File(file))
            .await
    }

    pub async fn user_profile(&self, id: Uuid) -> Result<UserProfile, ClientError> {
        self.call(Method::GET, &format!("/users/{id}"), Body::Empty)
            .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        extract::{Query, State},
        http::{header::AUTHORIZATION, HeaderMap, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };

    use super::*;
    use crate::jobs::filter::{filter_jobs, tests::make_job, JobFilter};
    use crate::jobs::handlers::PageQuery;
    use crate::jobs::listing::ListingAction;
    use crate::jobs::pagination::paginate;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(10),
        }
    }

    async fn notifications_route(headers: HeaderMap) -> Result<Json<NotificationList>, AxumStatus> {
        let authorized = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some("Bearer good-token");
        if !authorized {
            return Err(AxumStatus::UNAUTHORIZED);
        }
        Ok(Json(NotificationList {
            unread_count: 2,
            items: Vec::new(),
        }))
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let base = spawn(Router::new().route("/api/v1/notifications", get(notifications_route))).await;
        let client = HabaytaClient::new(&base).unwrap().with_retry(fast_retry());
        client.set_token("good-token");

        let list = client.notifications().await.unwrap();
        assert_eq!(list.unread_count, 2);
        assert_eq!(client.token().as_deref(), Some("good-token"));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token() {
        let base = spawn(Router::new().route("/api/v1/notifications", get(notifications_route))).await;
        let client = HabaytaClient::new(&base).unwrap().with_retry(fast_retry());
        client.set_token("expired-token");

        let err = client.notifications().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert!(client.token().is_none());
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/v1/companies",
                get(|State(calls): State<Arc<AtomicUsize>>| async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AxumStatus::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(Vec::<CompanyRow>::new()))
                    }
                }),
            )
            .with_state(calls.clone());
        let base = spawn(router).await;
        let client = HabaytaClient::new(&base).unwrap().with_retry(fast_retry());

        let companies = client.list_companies().await.unwrap();
        assert!(companies.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_duplicate_application_not_retried_and_friendly() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/v1/applications",
                post(|State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (
                        AxumStatus::CONFLICT,
                        Json(json!({
                            "error": {
                                "code": "CONFLICT",
                                "message": "You have already applied to this job"
                            }
                        })),
                    )
                }),
            )
            .with_state(calls.clone());
        let base = spawn(router).await;
        let client = HabaytaClient::new(&base).unwrap().with_retry(fast_retry());

        let err = client.apply(Uuid::new_v4(), "Hello").await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), error::ALREADY_APPLIED_MESSAGE);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeouts_retry_only_idempotent_requests() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slow = |State(calls): State<Arc<AtomicUsize>>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(500)).await;
            AxumStatus::NO_CONTENT
        };
        let router = Router::new()
            .route("/api/v1/companies", get(slow))
            .route("/api/v1/applications", post(slow))
            .with_state(calls.clone());
        let base = spawn(router).await;
        let client = HabaytaClient::with_timeout(&base, Duration::from_millis(50))
            .unwrap()
            .with_retry(fast_retry());

        let err = client.apply(Uuid::new_v4(), "").await.unwrap_err();
        assert!(matches!(&err, ClientError::Http(e) if e.is_timeout()));
        assert_eq!(calls.swap(0, Ordering::SeqCst), 1);

        let err = client.list_companies().await.unwrap_err();
        assert!(matches!(&err, ClientError::Http(e) if e.is_timeout()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_surfaces_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HabaytaClient::new(&format!("http://{addr}"))
            .unwrap()
            .with_retry(fast_retry());
        let err = client.list_companies().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[test]
    fn test_listing_query_omits_inactive_criteria() {
        let state = ListingState::default();
        assert_eq!(listing_query(&state), vec![("page", "1".to_string())]);

        let state = state
            .reduce(ListingAction::SetSearch("engineer".into()))
            .reduce(ListingAction::SetRemote(RemoteFilter::Remote))
            .reduce(ListingAction::GoToPage(2));
        assert_eq!(
            listing_query(&state),
            vec![
                ("search", "engineer".to_string()),
                ("remote", "true".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_jobs_round_trips_listing_state() {
        let jobs: Vec<Job> = (0..40)
            .map(|i| {
                let title = if i % 2 == 0 { "QA Engineer" } else { "Nurse" };
                make_job(&format!("job-{i}"), title, "Acme", "")
            })
            .collect();
        let jobs = Arc::new(jobs);
        let router = Router::new()
            .route(
                "/api/v1/jobs",
                get(
                    |State(jobs): State<Arc<Vec<Job>>>,
                     Query(filter): Query<JobFilter>,
                     Query(paging): Query<PageQuery>| async move {
                        let matching = filter_jobs(&jobs, &filter);
                        Json(paginate(&matching, paging.page.unwrap_or(1), 15).map(Job::clone))
                    },
                ),
            )
            .with_state(jobs);
        let base = spawn(router).await;
        let client = HabaytaClient::new(&base).unwrap().with_retry(fast_retry());

        let state = ListingState::default()
            .reduce(ListingAction::SetSearch("engineer".into()))
            .reduce(ListingAction::GoToPage(2));
        let page = client.list_jobs(&state).await.unwrap();

        assert_eq!(page.total_items, 20);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 5);
        assert!(page.items.iter().all(|j| j.title() == "QA Engineer"));
    }
}
