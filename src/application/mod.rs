pub mod download_coordinator;
pub mod events;
pub mod fetcher;

pub use download_coordinator::{DownloadCoordinator, DEFAULT_DELAY};
pub use events::{DownloadEvent, EventSink, TracingSink};
pub use fetcher::FileFetcher;
