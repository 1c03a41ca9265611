//! Listing filters: independent boolean predicates over the in-memory job list.

use serde::{Deserialize, Serialize};

use crate::models::job::Job;

/// Tri-state remote filter. Query values: "" (any), "true", "false".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RemoteFilter {
    #[default]
    Any,
    Remote,
    OnSite,
}

impl From<String> for RemoteFilter {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "remote" | "1" => RemoteFilter::Remote,
            "false" | "onsite" | "on-site" | "0" => RemoteFilter::OnSite,
            _ => RemoteFilter::Any,
        }
    }
}

impl From<RemoteFilter> for String {
    fn from(value: RemoteFilter) -> Self {
        match value {
            RemoteFilter::Any => String::new(),
            RemoteFilter::Remote => "true".to_string(),
            RemoteFilter::OnSite => "false".to_string(),
        }
    }
}

pub const ALL_TIMELINES: &str = "all";

/// Filter criteria from the listing page. Empty fields are inactive; the
/// timeline is inactive when "all".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobFilter {
    pub timeline: String,
    pub location: String,
    pub industry: String,
    pub hebrew_level: String,
    pub remote: RemoteFilter,
    pub search: String,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            timeline: ALL_TIMELINES.to_string(),
            location: String::new(),
            industry: String::new(),
            hebrew_level: String::new(),
            remote: RemoteFilter::Any,
            search: String::new(),
        }
    }
}

impl JobFilter {
    /// Evaluates the predicates in order, rejecting on the first failure.
    ///
    /// A non-empty search term is the last predicate evaluated: when present
    /// the job's result is the search match and the remote predicate is not
    /// consulted.
    pub fn matches(&self, job: &Job) -> bool {
        if !self.timeline.is_empty()
            && self.timeline != ALL_TIMELINES
            && job.timeline() != self.timeline
        {
            return false;
        }
        if !self.location.is_empty() && job.location() != self.location {
            return false;
        }
        if !self.industry.is_empty() && job.industry() != self.industry {
            return false;
        }
        if !self.hebrew_level.is_empty() && job.hebrew_level() != self.hebrew_level {
            return false;
        }

        let term = self.search.trim();
        if !term.is_empty() {
            let term = term.to_lowercase();
            return job.title().to_lowercase().contains(&term)
                || job.company_name().to_lowercase().contains(&term)
                || job.description().to_lowercase().contains(&term);
        }

        match self.remote {
            RemoteFilter::Any => true,
            RemoteFilter::Remote => job.is_remote(),
            RemoteFilter::OnSite => !job.is_remote(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == JobFilter::default()
    }
}

/// Jobs matching every active predicate, in input order.
pub fn filter_jobs<'a>(jobs: &'a [Job], filter: &JobFilter) -> Vec<&'a Job> {
    jobs.iter().filter(|job| filter.matches(job)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::job::ExternalJob;

    pub(crate) fn make_job(id: &str, title: &str, company: &str, description: &str) -> Job {
        Job::External(ExternalJob {
            id: id.to_string(),
            job_key: id.to_string(),
            source: "indeed".to_string(),
            title: title.to_string(),
            company_name: company.to_string(),
            location: "Tel Aviv".to_string(),
            remote: false,
            description: description.to_string(),
            short_description: String::new(),
            salary: "Competitive".to_string(),
            salary_min: None,
            salary_max: None,
            currency: "ILS".to_string(),
            job_type: "full-time".to_string(),
            industry: "tech".to_string(),
            timeline: "now".to_string(),
            hebrew_level: "basic".to_string(),
            url: None,
            published_at: None,
        })
    }

    fn with<F: FnOnce(&mut ExternalJob)>(mut job: Job, f: F) -> Job {
        if let Job::External(ref mut inner) = job {
            f(inner);
        }
        job
    }

    fn sample() -> Vec<Job> {
        vec![
            make_job("1", "Backend Engineer", "Wix", "Rust services"),
            with(make_job("2", "Accountant", "KPMG", "audit"), |j| {
                j.industry = "finance".into();
                j.location = "Jerusalem".into();
            }),
            with(make_job("3", "Support Agent", "Monday", "help customers"), |j| {
                j.remote = true;
                j.timeline = "3-months".into();
            }),
            make_job("4", "Designer", "Engineering Corp", "Figma"),
            make_job("5", "Nurse", "Sheba", "ward work for an ENGINEERed team"),
        ]
    }

    fn ids(jobs: &[&Job]) -> Vec<String> {
        jobs.iter().map(|j| j.id()).collect()
    }

    #[test]
    fn test_default_filter_returns_everything_in_order() {
        let jobs = sample();
        let filter = JobFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter_jobs(&jobs, &filter)), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_search_matches_title_company_or_description_case_insensitively() {
        let jobs = sample();
        let filter = JobFilter {
            search: "engineer".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_jobs(&jobs, &filter)), vec!["1", "4", "5"]);
    }

    #[test]
    fn test_location_and_industry_equality() {
        let jobs = sample();
        let filter = JobFilter {
            location: "Jerusalem".to_string(),
            industry: "finance".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_jobs(&jobs, &filter)), vec!["2"]);
    }

    #[test]
    fn test_timeline_all_is_inactive_but_specific_value_filters() {
        let jobs = sample();
        let filter = JobFilter {
            timeline: "3-months".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_jobs(&jobs, &filter)), vec!["3"]);
    }

    #[test]
    fn test_hebrew_level_equality() {
        let jobs = sample();
        let filter = JobFilter {
            hebrew_level: "fluent".to_string(),
            ..Default::default()
        };
        assert!(filter_jobs(&jobs, &filter).is_empty());
    }

    #[test]
    fn test_remote_filter_both_ways() {
        let jobs = sample();
        let remote = JobFilter {
            remote: RemoteFilter::Remote,
            ..Default::default()
        };
        assert_eq!(ids(&filter_jobs(&jobs, &remote)), vec!["3"]);

        let onsite = JobFilter {
            remote: RemoteFilter::OnSite,
            ..Default::default()
        };
        assert_eq!(ids(&filter_jobs(&jobs, &onsite)), vec!["1", "2", "4", "5"]);
    }

    #[test]
    fn test_search_takes_precedence_over_remote() {
        let jobs = sample();
        let filter = JobFilter {
            remote: RemoteFilter::Remote,
            search: "engineer".to_string(),
            ..Default::default()
        };
        // None of the search hits are remote; search decides on its own.
        assert_eq!(ids(&filter_jobs(&jobs, &filter)), vec!["1", "4", "5"]);
    }

    #[test]
    fn test_earlier_predicates_still_apply_with_search() {
        let jobs = sample();
        let filter = JobFilter {
            industry: "finance".to_string(),
            search: "engineer".to_string(),
            ..Default::default()
        };
        assert!(filter_jobs(&jobs, &filter).is_empty());
    }

    #[test]
    fn test_remote_filter_from_query_values() {
        assert_eq!(RemoteFilter::from(String::new()), RemoteFilter::Any);
        assert_eq!(RemoteFilter::from("true".to_string()), RemoteFilter::Remote);
        assert_eq!(RemoteFilter::from("false".to_string()), RemoteFilter::OnSite);
        assert_eq!(String::from(RemoteFilter::Remote), "true");
    }

    #[test]
    fn test_filter_deserializes_from_partial_json() {
        let filter: JobFilter = serde_json::from_str(r#"{"remote": "true"}"#).unwrap();
        assert_eq!(filter.timeline, "all");
        assert_eq!(filter.remote, RemoteFilter::Remote);
    }
}
