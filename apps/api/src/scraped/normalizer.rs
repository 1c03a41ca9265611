//! Scraped listing normalizer: raw external rows -> `ExternalJob`.
//!
//! Every input row produces exactly one output row. Missing or malformed
//! fields fall back to defaults; nothing is rejected and nothing is merged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::ExternalJob;
use crate::scraped::cities::translate_city;

/// One row of a scraped dataset, as written by the offline scraper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawScrapedJob {
    pub job_key: Option<String>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub currency: Option<String>,
    pub publish_date: Option<String>,
    pub url: Option<String>,
    pub job_type: Option<String>,
}

/// Keyword groups in priority order. The first group with any hit wins.
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "tech",
        &[
            "developer",
            "engineer",
            "software",
            "programmer",
            "devops",
            "full stack",
            "fullstack",
            "backend",
            "frontend",
            "data scientist",
            "cyber",
            "react",
            "python",
            "java",
            "מפתח",
            "מתכנת",
            "תוכנה",
        ],
    ),
    (
        "finance",
        &[
            "finance",
            "financial",
            "accountant",
            "accounting",
            "bookkeeping",
            "audit",
            "bank",
            "controller",
            "כספים",
            "חשבון",
        ],
    ),
    (
        "marketing",
        &[
            "marketing",
            "seo",
            "social media",
            "campaign",
            "brand",
            "copywriter",
            "שיווק",
        ],
    ),
    (
        "healthcare",
        &[
            "nurse",
            "doctor",
            "medical",
            "hospital",
            "clinic",
            "health",
            "pharma",
            "רופא",
            "אח/ות",
            "רפואה",
        ],
    ),
    (
        "education",
        &[
            "teacher",
            "teaching",
            "education",
            "tutor",
            "school",
            "instructor",
            "מורה",
            "הוראה",
        ],
    ),
];

pub const DEFAULT_INDUSTRY: &str = "tech";

const REMOTE_KEYWORDS: &[&str] = &["remote", "work from home", "מהבית", "מרחוק"];

const SHORT_DESCRIPTION_CHARS: usize = 200;
const SHEKEL: char = '₪';

/// Coarse keyword classifier over title + description. Ties go to list order.
pub fn classify_industry(title: &str, description: &str) -> &'static str {
    let haystack = format!("{title} {description}").to_lowercase();
    INDUSTRY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(industry, _)| *industry)
        .unwrap_or(DEFAULT_INDUSTRY)
}

/// Display string for an optional salary range. Non-positive bounds count as absent.
pub fn format_salary(min: Option<f64>, max: Option<f64>) -> String {
    let min = min.filter(|v| v.is_finite() && *v > 0.0);
    let max = max.filter(|v| v.is_finite() && *v > 0.0);
    match (min, max) {
        (Some(lo), Some(hi)) => format!(
            "{SHEKEL}{} – {SHEKEL}{}",
            group_thousands(lo),
            group_thousands(hi)
        ),
        (Some(lo), None) => format!("{SHEKEL}{}+", group_thousands(lo)),
        (None, Some(hi)) => format!("Up to {SHEKEL}{}", group_thousands(hi)),
        (None, None) => "Competitive".to_string(),
    }
}

/// 22000.4 -> "22,000"
fn group_thousands(value: f64) -> String {
    let digits = (value.round() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `{jobKey}_{source}_{publish date digits}_{index}`. The positional index
/// keeps IDs unique even when the natural key repeats.
pub fn synthesize_id(job_key: &str, source: &str, publish_date: &str, index: usize) -> String {
    let date_digits: String = publish_date.chars().filter(char::is_ascii_digit).collect();
    format!("{job_key}_{source}_{date_digits}_{index}")
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` and plain `YYYY-MM-DD`.
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn is_remote(city: &str, title: &str) -> bool {
    let haystack = format!("{city} {title}").to_lowercase();
    REMOTE_KEYWORDS.iter().any(|k| haystack.contains(k))
}

/// First 200 characters, with an ellipsis when truncated.
pub fn shorten(description: &str) -> String {
    if description.chars().count() <= SHORT_DESCRIPTION_CHARS {
        return description.to_string();
    }
    let cut: String = description.chars().take(SHORT_DESCRIPTION_CHARS).collect();
    format!("{}…", cut.trim_end())
}

/// Normalizes a single row. `index` is its position in the concatenated
/// input and `fallback_source` labels rows that carry no `source`.
pub fn normalize_row(raw: &RawScrapedJob, index: usize, fallback_source: &str) -> ExternalJob {
    let job_key = raw.job_key.clone().unwrap_or_default();
    let source = raw
        .source
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback_source.to_string());
    let title = raw.title.clone().unwrap_or_default();
    let description = raw.description.clone().unwrap_or_default();
    let publish_date = raw.publish_date.clone().unwrap_or_default();
    let raw_city = raw.city.as_deref().unwrap_or_default();

    ExternalJob {
        id: synthesize_id(&job_key, &source, &publish_date, index),
        industry: classify_industry(&title, &description).to_string(),
        location: translate_city(raw.city.as_deref()),
        remote: is_remote(raw_city, &title),
        short_description: shorten(&description),
        salary: format_salary(raw.min_salary, raw.max_salary),
        salary_min: raw.min_salary,
        salary_max: raw.max_salary,
        currency: raw.currency.clone().unwrap_or_else(|| "ILS".to_string()),
        job_type: raw
            .job_type
            .clone()
            .unwrap_or_else(|| "full-time".to_string()),
        timeline: "now".to_string(),
        hebrew_level: "fluent".to_string(),
        company_name: raw.company_name.clone().unwrap_or_default(),
        url: raw.url.clone(),
        published_at: parse_publish_date(&publish_date),
        job_key,
        source,
        title,
        description,
    }
}

/// Normalizes every `(row, fallback_source)` pair and orders the result
/// newest first. Rows without a usable date sort as the epoch.
pub fn normalize_all<'a, I>(rows: I) -> Vec<ExternalJob>
where
    I: IntoIterator<Item = (&'a RawScrapedJob, &'a str)>,
{
    let mut jobs: Vec<ExternalJob> = rows
        .into_iter()
        .enumerate()
        .map(|(index, (raw, source))| normalize_row(raw, index, source))
        .collect();

    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    jobs.sort_by(|a, b| {
        b.published_at
            .unwrap_or(epoch)
            .cmp(&a.published_at.unwrap_or(epoch))
    });
    jobs
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn raw(job_key: &str, title: &str, date: Option<&str>) -> RawScrapedJob {
        RawScrapedJob {
            job_key: Some(job_key.to_string()),
            source: Some("indeed".to_string()),
            title: Some(title.to_string()),
            company_name: Some("Acme".to_string()),
            city: Some("חיפה".to_string()),
            publish_date: date.map(String::from),
            ..Default::default()
        }
    }

    fn run(rows: &[RawScrapedJob]) -> Vec<ExternalJob> {
        normalize_all(rows.iter().map(|r| (r, "dataset")))
    }

    #[test]
    fn test_cardinality_is_preserved() {
        let rows = vec![
            raw("a", "Developer", Some("2025-01-01")),
            raw("a", "Developer", Some("2025-01-01")),
            RawScrapedJob::default(),
        ];
        assert_eq!(run(&rows).len(), 3);
    }

    #[test]
    fn test_ids_unique_under_colliding_job_keys() {
        let rows: Vec<_> = (0..50)
            .map(|_| raw("same-key", "QA Engineer", Some("2025-03-01T08:00:00Z")))
            .collect();
        let jobs = run(&rows);
        let ids: HashSet<_> = jobs.iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_synthesize_id_uses_date_digits_only() {
        assert_eq!(
            synthesize_id("k1", "indeed", "2025-03-01T08:15:00Z", 7),
            "k1_indeed_20250301081500_7"
        );
        assert_eq!(synthesize_id("", "indeed", "", 0), "_indeed__0");
    }

    #[test]
    fn test_salary_range_uses_en_dash() {
        let s = format_salary(Some(22000.0), Some(30000.0));
        assert_eq!(s, "₪22,000 – ₪30,000");
        assert!(s.contains('–'));
    }

    #[test]
    fn test_salary_floor_only() {
        assert_eq!(format_salary(Some(15000.0), None), "₪15,000+");
    }

    #[test]
    fn test_salary_ceiling_only() {
        assert_eq!(format_salary(None, Some(9500.0)), "Up to ₪9,500");
    }

    #[test]
    fn test_salary_competitive_fallback() {
        assert_eq!(format_salary(None, None), "Competitive");
        assert_eq!(format_salary(Some(0.0), Some(-1.0)), "Competitive");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
    }

    #[test]
    fn test_industry_first_group_wins() {
        // "software" (tech) and "bank" (finance) both hit; tech is listed first.
        assert_eq!(classify_industry("Software Engineer", "at a bank"), "tech");
        assert_eq!(classify_industry("Senior Accountant", "audit work"), "finance");
        assert_eq!(classify_industry("SEO Specialist", ""), "marketing");
        assert_eq!(classify_industry("Registered Nurse", ""), "healthcare");
        assert_eq!(classify_industry("מורה לאנגלית", ""), "education");
    }

    #[test]
    fn test_industry_defaults_to_tech() {
        assert_eq!(classify_industry("Warehouse Coordinator", "logistics"), "tech");
    }

    #[test]
    fn test_output_sorted_newest_first_with_missing_dates_last() {
        let rows = vec![
            raw("old", "Developer", Some("2024-01-01")),
            raw("none", "Developer", None),
            raw("new", "Developer", Some("2025-06-01T10:00:00Z")),
            raw("bad", "Developer", Some("not a date")),
        ];
        let keys: Vec<_> = run(&rows).into_iter().map(|j| j.job_key).collect();
        assert_eq!(keys, vec!["new", "old", "none", "bad"]);
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let job = normalize_row(&RawScrapedJob::default(), 3, "linkedin");
        assert_eq!(job.source, "linkedin");
        assert_eq!(job.location, "Israel");
        assert_eq!(job.salary, "Competitive");
        assert_eq!(job.industry, "tech");
        assert_eq!(job.title, "");
        assert!(job.published_at.is_none());
        assert_eq!(job.id, "_linkedin__3");
    }

    #[test]
    fn test_city_translated_and_remote_detected() {
        let mut row = raw("r", "Support Agent - עבודה מהבית", Some("2025-01-01"));
        row.city = Some("תל אביב".to_string());
        let job = normalize_row(&row, 0, "dataset");
        assert_eq!(job.location, "Tel Aviv");
        assert!(job.remote);
    }

    #[test]
    fn test_short_description_truncates_long_text() {
        let mut row = raw("r", "Developer", None);
        row.description = Some("x".repeat(500));
        let job = normalize_row(&row, 0, "dataset");
        assert_eq!(job.short_description.chars().count(), SHORT_DESCRIPTION_CHARS + 1);
        assert_eq!(job.description.len(), 500);
    }

    #[test]
    fn test_parse_publish_date_formats() {
        assert!(parse_publish_date("2025-03-01T08:15:00Z").is_some());
        assert!(parse_publish_date("2025-03-01T08:15:00").is_some());
        assert!(parse_publish_date("2025-03-01").is_some());
        assert!(parse_publish_date("").is_none());
    }
}
