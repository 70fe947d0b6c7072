use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use listing_downloader::{
    api::ApiClient,
    application::{DownloadCoordinator, TracingSink},
    config::Cli,
    domain::RunManifest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before parsing, so env fallbacks see it)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "listing_downloader=debug"
    } else {
        "listing_downloader=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = cli.into_settings(chrono::Local::now().date_naive())?;
    let api_client = ApiClient::new(settings.api.clone()).context("Failed to build HTTP client")?;
    let coordinator = DownloadCoordinator::new(api_client);

    let session = coordinator
        .run(
            &settings.base_url,
            &settings.download_dir,
            settings.delay,
            &TracingSink,
        )
        .await;

    for path in session.available_paths() {
        println!("Downloaded: {}", path.display());
    }
    for (url, cause) in session.failures() {
        eprintln!("Failed: {} ({})", url, cause);
    }

    if let Some(path) = &settings.manifest {
        let manifest =
            RunManifest::from_session(settings.base_url.as_str(), &settings.download_dir, &session);
        let json = manifest.to_json().context("Failed to serialize manifest")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    }

    if let Some(cause) = session.failure() {
        anyhow::bail!("{}", cause);
    }

    Ok(())
}
