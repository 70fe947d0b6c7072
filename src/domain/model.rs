use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use super::AppError;
use crate::utils::{file_name_from_url, strip_suffix_stem};

/// A single archive to materialize: where it comes from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    source_url: Url,
    destination_path: PathBuf,
}

impl DownloadTarget {
    /// Build a target whose file name is the last path segment of `source_url`.
    ///
    /// Returns `None` when the URL has no usable final segment.
    pub fn new(source_url: Url, download_dir: &Path) -> Option<Self> {
        let file_name = file_name_from_url(&source_url)?;
        Some(Self {
            destination_path: download_dir.join(file_name),
            source_url,
        })
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// File name used in progress reporting.
    pub fn file_name(&self) -> String {
        self.destination_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_url.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Destination already existed; nothing was requested.
    Skipped { path: PathBuf },
    Completed { path: PathBuf, bytes_written: u64 },
    Failed { url: Url, cause: AppError },
}

impl DownloadOutcome {
    /// Path of the file if it is present locally after this outcome.
    pub fn available_path(&self) -> Option<&Path> {
        match self {
            DownloadOutcome::Skipped { path } | DownloadOutcome::Completed { path, .. } => {
                Some(path)
            }
            DownloadOutcome::Failed { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DownloadOutcome::Skipped { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DownloadOutcome::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub discovered: usize,
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Ordered outcomes of one coordinator run.
#[derive(Debug, Clone, Default)]
pub struct DownloadSession {
    discovered: usize,
    outcomes: Vec<DownloadOutcome>,
    failure: Option<AppError>,
}

impl DownloadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that ended before any fetch began.
    pub fn failed(cause: AppError) -> Self {
        Self {
            failure: Some(cause),
            ..Self::default()
        }
    }

    pub(crate) fn set_discovered(&mut self, count: usize) {
        self.discovered = count;
    }

    pub(crate) fn record(&mut self, outcome: DownloadOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    /// Run-level failure, set only when the listing or the download
    /// directory could not be prepared.
    pub fn failure(&self) -> Option<&AppError> {
        self.failure.as_ref()
    }

    pub fn is_fatal(&self) -> bool {
        self.failure.is_some()
    }

    pub fn summary(&self) -> SessionSummary {
        let mut summary = SessionSummary {
            discovered: self.discovered,
            ..SessionSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome {
                DownloadOutcome::Skipped { .. } => summary.skipped += 1,
                DownloadOutcome::Completed { .. } => summary.completed += 1,
                DownloadOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// Paths present locally after the run, completed or pre-existing.
    pub fn available_paths(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.available_path().map(Path::to_path_buf))
            .collect()
    }

    /// Maps each available file's name, with `suffix` stripped, to its path.
    pub fn available_by_stem(&self, suffix: &str) -> BTreeMap<String, PathBuf> {
        self.available_paths()
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some((strip_suffix_stem(&name, suffix).to_string(), path))
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Url, &AppError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            DownloadOutcome::Failed { url, cause } => Some((url, cause)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_target_uses_url_basename() {
        let target = DownloadTarget::new(
            url("https://x.org/files/g_patent.tsv.zip"),
            Path::new("/data/latest"),
        )
        .unwrap();
        assert_eq!(
            target.destination_path(),
            Path::new("/data/latest/g_patent.tsv.zip")
        );
        assert_eq!(target.file_name(), "g_patent.tsv.zip");
    }

    #[test]
    fn test_target_without_file_name() {
        assert!(DownloadTarget::new(url("https://x.org/"), Path::new("out")).is_none());
    }

    #[test]
    fn test_summary_and_available_paths() {
        let mut session = DownloadSession::new();
        session.set_discovered(3);
        session.record(DownloadOutcome::Skipped {
            path: PathBuf::from("out/a.tsv.zip"),
        });
        session.record(DownloadOutcome::Failed {
            url: url("https://x.org/b.tsv.zip"),
            cause: AppError::Transfer("boom".into()),
        });
        session.record(DownloadOutcome::Completed {
            path: PathBuf::from("out/c.tsv.zip"),
            bytes_written: 10,
        });

        assert_eq!(
            session.summary(),
            SessionSummary {
                discovered: 3,
                skipped: 1,
                completed: 1,
                failed: 1,
            }
        );
        assert_eq!(
            session.available_paths(),
            vec![PathBuf::from("out/a.tsv.zip"), PathBuf::from("out/c.tsv.zip")]
        );
        assert_eq!(session.failures().count(), 1);
        assert!(!session.is_fatal());

        let by_stem = session.available_by_stem("tsv.zip");
        assert_eq!(by_stem.get("a"), Some(&PathBuf::from("out/a.tsv.zip")));
        assert_eq!(by_stem.get("c"), Some(&PathBuf::from("out/c.tsv.zip")));
    }

    #[test]
    fn test_failed_session_is_empty() {
        let session = DownloadSession::failed(AppError::Network("dns".into()));
        assert!(session.is_fatal());
        assert!(session.outcomes().is_empty());
        assert_eq!(session.summary(), SessionSummary::default());
    }
}
