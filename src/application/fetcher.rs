use std::path::Path;

use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::events::EventSink;
use crate::{
    api::{client, ApiClient},
    domain::{AppError, DownloadOutcome, DownloadTarget},
    utils::{part_path, percent_of},
};

/// Bytes written per write call.
pub const CHUNK_SIZE: usize = 8192;

/// Progress is reported each time this many more bytes have been written.
pub const PROGRESS_INTERVAL: u64 = 1024 * 1024;

/// Downloads one target into its destination, never touching a file that
/// already exists there.
#[derive(Clone)]
pub struct FileFetcher {
    api_client: ApiClient,
}

impl FileFetcher {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    pub async fn fetch(&self, target: &DownloadTarget, sink: &dyn EventSink) -> DownloadOutcome {
        let name = target.file_name();
        let destination = target.destination_path();

        match tokio::fs::try_exists(destination).await {
            Ok(true) => {
                sink.on_skipped(&name);
                return DownloadOutcome::Skipped {
                    path: destination.to_path_buf(),
                };
            }
            Ok(false) => {}
            Err(e) => {
                return self.fail(target, &name, AppError::Filesystem(e.to_string()), sink);
            }
        }

        sink.on_started(&name);

        // Stream into a sibling file so an interrupted run never leaves a
        // truncated archive under the final name.
        let part = part_path(destination);
        let result = match self.download_to(target, &part, &name, sink).await {
            Ok(bytes_written) => tokio::fs::rename(&part, destination)
                .await
                .map(|_| bytes_written)
                .map_err(|e| {
                    AppError::Filesystem(format!(
                        "Failed to move {} into place: {}",
                        part.display(),
                        e
                    ))
                }),
            Err(cause) => Err(cause),
        };

        match result {
            Ok(bytes_written) => {
                sink.on_completed(&name, destination, bytes_written);
                DownloadOutcome::Completed {
                    path: destination.to_path_buf(),
                    bytes_written,
                }
            }
            Err(cause) => {
                if let Err(e) = tokio::fs::remove_file(&part).await {
                    debug!("No partial file to discard at {}: {}", part.display(), e);
                }
                self.fail(target, &name, cause, sink)
            }
        }
    }

    fn fail(
        &self,
        target: &DownloadTarget,
        name: &str,
        cause: AppError,
        sink: &dyn EventSink,
    ) -> DownloadOutcome {
        sink.on_failed(name, &cause);
        DownloadOutcome::Failed {
            url: target.source_url().clone(),
            cause,
        }
    }

    async fn download_to(
        &self,
        target: &DownloadTarget,
        part: &Path,
        name: &str,
        sink: &dyn EventSink,
    ) -> Result<u64, AppError> {
        let (total_size, stream) = self
            .api_client
            .download_file_stream(target.source_url())
            .await
            .map_err(|e| AppError::Transfer(e.to_string()))?;
        let stream = stream.boxed();

        let mut file = File::create(part)
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to create file: {}", e)))?;

        let written = match total_size.filter(|&total| total > 0) {
            Some(total) => copy_with_progress(stream, &mut file, total, name, sink).await?,
            None => write_whole_body(stream, &mut file).await?,
        };

        file.flush()
            .await
            .map_err(|e| AppError::Filesystem(format!("Write error: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to sync file: {}", e)))?;

        Ok(written)
    }
}

async fn copy_with_progress(
    mut stream: BoxStream<'static, client::Result<Bytes>>,
    file: &mut File,
    total: u64,
    name: &str,
    sink: &dyn EventSink,
) -> Result<u64, AppError> {
    let mut downloaded: u64 = 0;
    let mut next_report = PROGRESS_INTERVAL;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::Transfer(e.to_string()))?;
        for piece in chunk.chunks(CHUNK_SIZE) {
            file.write_all(piece)
                .await
                .map_err(|e| AppError::Filesystem(format!("Write error: {}", e)))?;
            downloaded += piece.len() as u64;

            if downloaded >= next_report {
                sink.on_progress(name, percent_of(downloaded, total));
                next_report = (downloaded / PROGRESS_INTERVAL + 1) * PROGRESS_INTERVAL;
            }
        }
    }

    Ok(downloaded)
}

/// Used when the server gives no length: the body is collected and written
/// in a single call, without percentage reporting.
async fn write_whole_body(
    stream: BoxStream<'static, client::Result<Bytes>>,
    file: &mut File,
) -> Result<u64, AppError> {
    let body = stream
        .try_fold(BytesMut::new(), |mut body, chunk| async move {
            body.extend_from_slice(&chunk);
            Ok::<_, client::ApiError>(body)
        })
        .await
        .map_err(|e| AppError::Transfer(e.to_string()))?;

    file.write_all(&body)
        .await
        .map_err(|e| AppError::Filesystem(format!("Write error: {}", e)))?;

    Ok(body.len() as u64)
}
