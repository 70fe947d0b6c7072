//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use clap::Parser;
use url::Url;

use crate::api::models::{ApiConfig, BROWSER_USER_AGENT, DEFAULT_SUFFIX};
use crate::application::DEFAULT_DELAY;

#[derive(Debug, Parser)]
#[command(name = "listing-downloader")]
#[command(about = "Download the archive files advertised on a listing page")]
#[command(version)]
pub struct Cli {
    /// Listing page to scrape for archive links
    #[arg(env = "LISTING_URL")]
    pub base_url: Url,

    /// Local directory to save files into (created if absent)
    #[arg(short, long, env = "LISTING_DOWNLOAD_DIR", default_value = "patent_data")]
    pub download_dir: PathBuf,

    /// Save into a `<month>_<year>` directory under the download directory
    #[arg(long)]
    pub release_subdir: bool,

    /// Seconds to wait between file requests
    #[arg(long, env = "LISTING_DELAY_SECONDS", default_value_t = DEFAULT_DELAY.as_secs_f64())]
    pub delay_seconds: f64,

    /// Only links whose path ends with this suffix are downloaded
    #[arg(short, long = "suffix", env = "LISTING_SUFFIX", default_value = DEFAULT_SUFFIX)]
    pub suffix_filter: String,

    /// User-Agent header sent with every request
    #[arg(long, env = "LISTING_USER_AGENT", default_value = BROWSER_USER_AGENT)]
    pub user_agent: String,

    /// Seconds allowed for establishing a connection
    #[arg(long, default_value_t = 30)]
    pub connect_timeout: u64,

    /// Seconds a transfer may stall between reads before it fails
    #[arg(long, default_value_t = 60)]
    pub read_timeout: u64,

    /// Write a JSON manifest of the run to this path
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub download_dir: PathBuf,
    pub delay: Duration,
    pub manifest: Option<PathBuf>,
    pub api: ApiConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid delay {0}: must be a non-negative number of seconds")]
    InvalidDelay(f64),
}

impl Cli {
    pub fn into_settings(self, today: NaiveDate) -> Result<Settings, ConfigError> {
        let delay = Duration::try_from_secs_f64(self.delay_seconds)
            .map_err(|_| ConfigError::InvalidDelay(self.delay_seconds))?;

        let download_dir = if self.release_subdir {
            self.download_dir.join(release_dir_name(today))
        } else {
            self.download_dir
        };

        Ok(Settings {
            base_url: self.base_url,
            download_dir,
            delay,
            manifest: self.manifest,
            api: ApiConfig {
                user_agent: self.user_agent,
                suffix_filter: self.suffix_filter,
                connect_timeout: Duration::from_secs(self.connect_timeout),
                read_timeout: Duration::from_secs(self.read_timeout),
                ..ApiConfig::default()
            },
        })
    }
}

/// Monthly release directory name, e.g. `7_2025`.
pub fn release_dir_name(date: NaiveDate) -> String {
    format!("{}_{}", date.month(), date.year())
}
