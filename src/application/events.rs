//! Progress reporting seam.
//!
//! Components receive an `&dyn EventSink` instead of logging through global
//! state, so embedders can route events wherever they like.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::domain::{AppError, SessionSummary};

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Discovered(usize),
    Started(String),
    /// Percentage of the known total, emitted once per megabyte written.
    Progress { name: String, percent: f64 },
    Skipped(String),
    Completed { name: String, path: PathBuf, bytes: u64 },
    Failed { name: String, cause: AppError },
    /// The run ended before any fetch: listing or directory unavailable.
    RunFailed(AppError),
    Finished(SessionSummary),
}

pub trait EventSink: Send + Sync {
    fn on_discovered(&self, _count: usize) {}
    fn on_started(&self, _name: &str) {}
    fn on_progress(&self, _name: &str, _percent: f64) {}
    fn on_skipped(&self, _name: &str) {}
    fn on_completed(&self, _name: &str, _path: &Path, _bytes: u64) {}
    fn on_failed(&self, _name: &str, _cause: &AppError) {}
    fn on_run_failed(&self, _cause: &AppError) {}
    fn on_finished(&self, _summary: &SessionSummary) {}
}

/// Writes human-readable progress lines through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_discovered(&self, count: usize) {
        info!("Found {} archive files to download", count);
    }

    fn on_started(&self, name: &str) {
        info!("Downloading {}", name);
    }

    fn on_progress(&self, name: &str, percent: f64) {
        info!("Downloaded {:.1}% of {}", percent, name);
    }

    fn on_skipped(&self, name: &str) {
        info!("File {} already exists, skipping", name);
    }

    fn on_completed(&self, name: &str, _path: &Path, bytes: u64) {
        info!("Successfully downloaded {} ({} bytes)", name, bytes);
    }

    fn on_failed(&self, name: &str, cause: &AppError) {
        error!("Error downloading {}: {}", name, cause);
    }

    fn on_run_failed(&self, cause: &AppError) {
        error!("Run aborted: {}", cause);
    }

    fn on_finished(&self, summary: &SessionSummary) {
        info!(
            "Run finished: {} discovered, {} skipped, {} completed, {} failed",
            summary.discovered, summary.skipped, summary.completed, summary.failed
        );
    }
}

/// Forwards every event into a channel. Send errors mean the receiver is
/// gone and are ignored.
impl EventSink for mpsc::UnboundedSender<DownloadEvent> {
    fn on_discovered(&self, count: usize) {
        let _ = self.send(DownloadEvent::Discovered(count));
    }

    fn on_started(&self, name: &str) {
        let _ = self.send(DownloadEvent::Started(name.to_string()));
    }

    fn on_progress(&self, name: &str, percent: f64) {
        let _ = self.send(DownloadEvent::Progress {
            name: name.to_string(),
            percent,
        });
    }

    fn on_skipped(&self, name: &str) {
        let _ = self.send(DownloadEvent::Skipped(name.to_string()));
    }

    fn on_completed(&self, name: &str, path: &Path, bytes: u64) {
        let _ = self.send(DownloadEvent::Completed {
            name: name.to_string(),
            path: path.to_path_buf(),
            bytes,
        });
    }

    fn on_failed(&self, name: &str, cause: &AppError) {
        let _ = self.send(DownloadEvent::Failed {
            name: name.to_string(),
            cause: cause.clone(),
        });
    }

    fn on_run_failed(&self, cause: &AppError) {
        let _ = self.send(DownloadEvent::RunFailed(cause.clone()));
    }

    fn on_finished(&self, summary: &SessionSummary) {
        let _ = self.send(DownloadEvent::Finished(*summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_events() {
        let (sink, mut rx) = mpsc::unbounded_channel::<DownloadEvent>();

        sink.on_discovered(2);
        sink.on_skipped("a.tsv.zip");
        sink.on_failed("b.tsv.zip", &AppError::Transfer("reset".into()));

        assert_eq!(rx.try_recv().unwrap(), DownloadEvent::Discovered(2));
        assert_eq!(
            rx.try_recv().unwrap(),
            DownloadEvent::Skipped("a.tsv.zip".into())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            DownloadEvent::Failed {
                name: "b.tsv.zip".into(),
                cause: AppError::Transfer("reset".into()),
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel::<DownloadEvent>();
        drop(rx);
        tx.on_started("a.tsv.zip");
    }
}
