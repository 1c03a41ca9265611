use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::state::AppState;

/// The caller identified by a valid `Authorization: Bearer <jwt>` header.
/// Rejects with 401 when the header is missing, malformed or expired.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.role == role || self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires the {role} role"
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let claims = state.tokens.verify(token).map_err(|e| {
            debug!("Rejected bearer token: {e:#}");
            AppError::Unauthorized
        })?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/auth/me");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_or_wrong_scheme() {
        assert_eq!(bearer_token(&parts_with(None)), None);
        assert_eq!(bearer_token(&parts_with(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer   "))), None);
    }

    #[test]
    fn test_require_role() {
        let employer = AuthUser {
            id: Uuid::new_v4(),
            role: UserRole::Employer,
        };
        assert!(employer.require_role(UserRole::Employer).is_ok());
        assert!(employer.require_role(UserRole::JobSeeker).is_err());

        let admin = AuthUser {
            id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(admin.require_role(UserRole::Employer).is_ok());
    }
}
