//! Externally scraped job listings, bundled as static JSON and normalized
//! once at startup. The resulting catalog is read-only.

pub mod cities;
pub mod normalizer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::job::ExternalJob;
use crate::scraped::normalizer::{normalize_all, RawScrapedJob};

/// A dataset file's rows plus the source label used for rows without one.
pub struct RawDataset {
    pub label: String,
    pub rows: Vec<RawScrapedJob>,
}

/// Reads one dataset file: a JSON array of raw rows.
pub fn read_dataset(path: &Path) -> Result<RawDataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scraped dataset {}", path.display()))?;
    let rows: Vec<RawScrapedJob> = serde_json::from_str(&content)
        .with_context(|| format!("Scraped dataset {} is not a JSON array of jobs", path.display()))?;
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scraped")
        .to_string();
    Ok(RawDataset { label, rows })
}

/// Read-only catalog of normalized scraped jobs, newest first.
#[derive(Clone, Default)]
pub struct ScrapedCatalog {
    jobs: Arc<Vec<ExternalJob>>,
}

impl ScrapedCatalog {
    pub fn new(jobs: Vec<ExternalJob>) -> Self {
        Self {
            jobs: Arc::new(jobs),
        }
    }

    /// Loads every configured dataset, concatenating rows in configuration
    /// order before normalizing them as one list.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let datasets = paths
            .iter()
            .map(|p| read_dataset(p))
            .collect::<Result<Vec<_>>>()?;

        let rows = datasets
            .iter()
            .flat_map(|d| d.rows.iter().map(move |row| (row, d.label.as_str())));
        let jobs = normalize_all(rows);

        info!(
            "Loaded {} scraped jobs from {} dataset(s)",
            jobs.len(),
            datasets.len()
        );
        Ok(Self::new(jobs))
    }

    pub fn jobs(&self) -> &[ExternalJob] {
        &self.jobs
    }

    pub fn find(&self, id: &str) -> Option<&ExternalJob> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_dataset(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_concatenates_datasets_and_labels_sources() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_dataset(
            dir.path(),
            "indeed.json",
            r#"[{"jobKey": "k1", "title": "Developer", "publishDate": "2025-01-02"},
                {"jobKey": "k1", "title": "Developer", "publishDate": "2025-01-01"}]"#,
        );
        let b = write_dataset(
            dir.path(),
            "alljobs.json",
            r#"[{"jobKey": "k1", "source": "alljobs", "title": "Nurse"}]"#,
        );

        let catalog = ScrapedCatalog::load(&[a, b]).unwrap();
        assert_eq!(catalog.len(), 3);

        let ids: Vec<_> = catalog.jobs().iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["k1_indeed_20250102_0", "k1_indeed_20250101_1", "k1_alljobs__2"]
        );
        assert!(catalog.find("k1_alljobs__2").is_some());
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_load_fails_on_malformed_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_dataset(dir.path(), "bad.json", r#"{"not": "an array"}"#);
        assert!(ScrapedCatalog::load(&[bad]).is_err());
    }

    #[test]
    fn test_load_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScrapedCatalog::load(&[dir.path().join("nope.json")]).is_err());
    }

    #[test]
    fn test_bundled_dataset_parses() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/scraped_jobs.json");
        let catalog = ScrapedCatalog::load(&[path]).unwrap();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.jobs().iter().any(|j| j.location == "Jerusalem"));
    }
}
