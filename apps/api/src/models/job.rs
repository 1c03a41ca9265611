use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Publication state of an employer-submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
        }
    }

    /// draft -> published | closed, published -> closed. Closed is final.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Draft, JobStatus::Published)
                | (JobStatus::Draft, JobStatus::Closed)
                | (JobStatus::Published, JobStatus::Closed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "published" => Ok(JobStatus::Published),
            "closed" => Ok(JobStatus::Closed),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// A job stored in Postgres, joined with its company's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DatabaseJob {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub city: String,
    pub remote: bool,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: String,
    pub job_type: String,
    pub experience_level: String,
    pub industry: String,
    pub hebrew_level: String,
    pub timeline: String,
    pub required_skills: Vec<String>,
    pub optional_skills: Vec<String>,
    pub benefits: Vec<String>,
    pub status: String,
    pub application_count: i32,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A listing synthesized from a scraped dataset at startup. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalJob {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_key: String,
    pub source: String,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub remote: bool,
    pub description: String,
    pub short_description: String,
    /// Display string, e.g. "₪22,000 – ₪30,000" or "Competitive".
    pub salary: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: String,
    pub job_type: String,
    pub industry: String,
    pub timeline: String,
    pub hebrew_level: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Every listing the board can show. Field differences between the two
/// sources are reconciled here and nowhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source_kind", rename_all = "snake_case")]
pub enum Job {
    Database(DatabaseJob),
    External(ExternalJob),
}

impl Job {
    pub fn id(&self) -> String {
        match self {
            Job::Database(j) => j.id.to_string(),
            Job::External(j) => j.id.clone(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Job::Database(j) => &j.title,
            Job::External(j) => &j.title,
        }
    }

    pub fn company_name(&self) -> &str {
        match self {
            Job::Database(j) => &j.company_name,
            Job::External(j) => &j.company_name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Job::Database(j) => &j.description,
            Job::External(j) => &j.description,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Job::Database(j) => &j.city,
            Job::External(j) => &j.location,
        }
    }

    pub fn industry(&self) -> &str {
        match self {
            Job::Database(j) => &j.industry,
            Job::External(j) => &j.industry,
        }
    }

    pub fn timeline(&self) -> &str {
        match self {
            Job::Database(j) => &j.timeline,
            Job::External(j) => &j.timeline,
        }
    }

    pub fn hebrew_level(&self) -> &str {
        match self {
            Job::Database(j) => &j.hebrew_level,
            Job::External(j) => &j.hebrew_level,
        }
    }

    pub fn is_remote(&self) -> bool {
        match self {
            Job::Database(j) => j.remote,
            Job::External(j) => j.remote,
        }
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Job::Database(j) => j.published_at.or(Some(j.created_at)),
            Job::External(j) => j.published_at,
        }
    }
}
