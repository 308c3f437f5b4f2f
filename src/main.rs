use anyhow::Context;
use bingwall::config::{AppConfig, Cli};
use bingwall::{logging, service};
use clap::Parser;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli).context("Failed to load configuration")?;

    let log_dir = config.file_log.then_some(config.log_dir.as_path());
    let _guard = logging::init(config.log_format, log_dir).context("Failed to initialize logging")?;

    info!(
        "Starting bingwall (locale: {}, download dir: {}, interval: {}s)",
        config.locale,
        config.download_dir.display(),
        config.scan_interval
    );

    let downloader = service::build_downloader(&config, cli.clear_store)
        .await
        .context("Failed to initialize downloader")?;

    let shutdown = service::shutdown_signal();
    service::run(&downloader, config.scan_interval, shutdown).await;

    Ok(())
}
