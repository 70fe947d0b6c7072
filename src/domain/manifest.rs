use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{DownloadSession, SessionSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub url: String,
    pub cause: String,
}

/// Machine-readable record of one run, for downstream tooling.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub listing_url: String,
    pub download_dir: PathBuf,
    pub summary: SessionSummary,
    /// Set when the run ended before any fetch.
    pub fatal: Option<String>,
    pub available: Vec<PathBuf>,
    pub failures: Vec<FailureRecord>,
}

impl RunManifest {
    pub fn from_session(listing_url: &str, download_dir: &Path, session: &DownloadSession) -> Self {
        Self {
            listing_url: listing_url.to_string(),
            download_dir: download_dir.to_path_buf(),
            summary: session.summary(),
            fatal: session.failure().map(ToString::to_string),
            available: session.available_paths(),
            failures: session
                .failures()
                .map(|(url, cause)| FailureRecord {
                    url: url.to_string(),
                    cause: cause.to_string(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppError, DownloadOutcome};
    use url::Url;

    #[test]
    fn test_manifest_lists_available_and_failed_files() {
        let mut session = DownloadSession::new();
        session.set_discovered(2);
        session.record(DownloadOutcome::Completed {
            path: PathBuf::from("out/a.tsv.zip"),
            bytes_written: 3,
        });
        session.record(DownloadOutcome::Failed {
            url: Url::parse("https://x.org/b.tsv.zip").unwrap(),
            cause: AppError::Transfer("connection reset".into()),
        });

        let manifest = RunManifest::from_session("https://x.org/page", Path::new("out"), &session);
        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(json["summary"]["completed"], 1);
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["available"][0], "out/a.tsv.zip");
        assert_eq!(json["failures"][0]["url"], "https://x.org/b.tsv.zip");
        assert_eq!(
            json["failures"][0]["cause"],
            "Transfer error: connection reset"
        );
        assert!(json["fatal"].is_null());
    }

    #[test]
    fn test_manifest_records_fatal_failure() {
        let session = DownloadSession::failed(AppError::Network("timed out".into()));
        let manifest = RunManifest::from_session("https://x.org/page", Path::new("out"), &session);

        assert_eq!(manifest.fatal.as_deref(), Some("Network error: timed out"));
        assert!(manifest.available.is_empty());
    }
}
