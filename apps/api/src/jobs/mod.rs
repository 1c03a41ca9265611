//! Job postings: the unified listing, filtering and pagination over it, and
//! employer CRUD on database jobs.

pub mod filter;
pub mod handlers;
pub mod listing;
pub mod pagination;
pub mod repo;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{DatabaseJob, Job, JobStatus};
use crate::scraped::ScrapedCatalog;
use crate::state::AppState;

/// Every listing a job seeker can see: published database jobs (newest
/// first) followed by the scraped catalog (newest first).
pub async fn load_listings(state: &AppState) -> Result<Vec<Job>, AppError> {
    let published = repo::list_published(&state.db).await?;
    Ok(merge_listings(published, &state.scraped))
}

/// Database jobs keep their order and come first; the catalog follows.
pub fn merge_listings(published: Vec<DatabaseJob>, catalog: &ScrapedCatalog) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(published.len() + catalog.len());
    jobs.extend(published.into_iter().map(Job::Database));
    jobs.extend(catalog.jobs().iter().cloned().map(Job::External));
    jobs
}

/// Resolves a job reference to a visible listing. References are database
/// UUIDs or scraped `_id`s; unpublished database jobs do not resolve.
pub async fn resolve_job(state: &AppState, job_ref: &str) -> Result<Option<Job>, AppError> {
    if let Ok(id) = Uuid::parse_str(job_ref) {
        let job = repo::find(&state.db, id).await?;
        return Ok(job
            .filter(|j| j.status == JobStatus::Published.as_str())
            .map(Job::Database));
    }
    Ok(state.scraped.find(job_ref).cloned().map(Job::External))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::jobs::filter::tests::make_job;
    use crate::models::job::ExternalJob;

    fn database_job(title: &str) -> DatabaseJob {
        let now = Utc::now();
        DatabaseJob {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: "Wix".to_string(),
            posted_by: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            short_description: String::new(),
            city: "Tel Aviv".to_string(),
            remote: false,
            salary_min: None,
            salary_max: None,
            currency: "ILS".to_string(),
            job_type: "full-time".to_string(),
            experience_level: "mid".to_string(),
            industry: "tech".to_string(),
            hebrew_level: "basic".to_string(),
            timeline: "now".to_string(),
            required_skills: Vec::new(),
            optional_skills: Vec::new(),
            benefits: Vec::new(),
            status: JobStatus::Published.as_str().to_string(),
            application_count: 0,
            view_count: 0,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn external(id: &str) -> ExternalJob {
        match make_job(id, "Scraped", "Acme", "") {
            Job::External(job) => job,
            Job::Database(_) => unreachable!(),
        }
    }

    #[test]
    fn test_database_jobs_come_before_scraped_ones() {
        let catalog = ScrapedCatalog::new(vec![external("ext-1"), external("ext-2")]);
        let merged = merge_listings(vec![database_job("Newer"), database_job("Older")], &catalog);

        assert_eq!(merged.len(), 4);
        let titles: Vec<&str> = merged.iter().map(Job::title).collect();
        assert_eq!(titles, vec!["Newer", "Older", "Scraped", "Scraped"]);
        assert!(matches!(merged[1], Job::Database(_)));
        assert_eq!(merged[2].id(), "ext-1");
        assert_eq!(merged[3].id(), "ext-2");
    }

    #[test]
    fn test_empty_database_yields_catalog_only() {
        let catalog = ScrapedCatalog::new(vec![external("ext-1")]);
        let merged = merge_listings(Vec::new(), &catalog);
        assert_eq!(merged.len(), 1);
        assert!(matches!(merged[0], Job::External(_)));
    }
}
