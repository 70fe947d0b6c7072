use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use super::events::EventSink;
use super::fetcher::FileFetcher;
use crate::{
    api::ApiClient,
    domain::{AppError, DownloadOutcome, DownloadSession, DownloadTarget},
};

/// Pause between successive fetches unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Discovers the archives on one listing page and fetches them one at a time.
#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
    fetcher: FileFetcher,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self {
            fetcher: FileFetcher::new(api_client.clone()),
            api_client,
        }
    }

    /// Run one session. Never returns an error: a listing or directory
    /// failure is reported through [`DownloadSession::failure`] with no
    /// outcomes, and per-file failures become [`DownloadOutcome::Failed`].
    pub async fn run(
        &self,
        listing_url: &Url,
        destination_dir: &Path,
        inter_request_delay: Duration,
        sink: &dyn EventSink,
    ) -> DownloadSession {
        let session = self
            .run_inner(listing_url, destination_dir, inter_request_delay, sink)
            .await;
        sink.on_finished(&session.summary());
        session
    }

    async fn run_inner(
        &self,
        listing_url: &Url,
        destination_dir: &Path,
        inter_request_delay: Duration,
        sink: &dyn EventSink,
    ) -> DownloadSession {
        if let Err(e) = tokio::fs::create_dir_all(destination_dir).await {
            let cause = AppError::Filesystem(format!(
                "Failed to create {}: {}",
                destination_dir.display(),
                e
            ));
            sink.on_run_failed(&cause);
            return DownloadSession::failed(cause);
        }

        let links = match self.api_client.discover(listing_url).await {
            Ok(links) => links,
            Err(e) => {
                let cause = AppError::Network(format!(
                    "Error fetching download links from {}: {}",
                    listing_url, e
                ));
                sink.on_run_failed(&cause);
                return DownloadSession::failed(cause);
            }
        };

        let links = unique_in_order(links);
        sink.on_discovered(links.len());

        let mut session = DownloadSession::new();
        session.set_discovered(links.len());
        // Destination path -> URL that claimed it. Distinct URLs sharing a
        // file name must not alias one local file.
        let mut claimed: HashMap<PathBuf, Url> = HashMap::new();

        for (index, url) in links.into_iter().enumerate() {
            if index > 0 && !inter_request_delay.is_zero() {
                tokio::time::sleep(inter_request_delay).await;
            }

            let outcome = match DownloadTarget::new(url.clone(), destination_dir) {
                Some(target) => match claimed.get(target.destination_path()) {
                    Some(owner) => {
                        let cause = AppError::Filesystem(format!(
                            "Destination {} already claimed by {}",
                            target.destination_path().display(),
                            owner
                        ));
                        sink.on_failed(&target.file_name(), &cause);
                        DownloadOutcome::Failed { url, cause }
                    }
                    None => {
                        claimed.insert(target.destination_path().to_path_buf(), url);
                        self.fetcher.fetch(&target, sink).await
                    }
                },
                None => {
                    let cause = AppError::Filesystem(format!("No file name in {}", url));
                    sink.on_failed(url.as_str(), &cause);
                    DownloadOutcome::Failed { url, cause }
                }
            };
            session.record(outcome);
        }

        session
    }
}

/// Drops repeated URLs, keeping the first occurrence.
fn unique_in_order(links: Vec<Url>) -> Vec<Url> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|url| {
            let first = seen.insert(url.clone());
            if !first {
                debug!("Ignoring duplicate link {}", url);
            }
            first
        })
        .collect()
}
