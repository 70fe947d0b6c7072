use thiserror::Error;

/// Failure taxonomy shared by the fetcher and the coordinator.
///
/// Payloads are rendered strings so outcomes and events stay `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The listing page could not be fetched. Fatal for the run.
    #[error("Network error: {0}")]
    Network(String),

    /// A single file's request or body stream failed.
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Local directory or file could not be created, written or renamed.
    #[error("Filesystem error: {0}")]
    Filesystem(String),
}
