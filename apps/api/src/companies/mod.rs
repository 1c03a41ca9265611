pub mod handlers;
pub mod repo;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::company::CompanyRow;

pub fn ensure_company_owner(auth: &AuthUser, company: &CompanyRow) -> Result<(), AppError> {
    if company.owner_id == auth.id || auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You do not manage {}",
            company.name
        )))
    }
}
