pub mod error;
pub mod manifest;
pub mod model;

pub use error::AppError;
pub use manifest::RunManifest;
pub use model::{DownloadOutcome, DownloadSession, DownloadTarget, SessionSummary};
