//! Wiring and the polling loop

use crate::config::AppConfig;
use crate::error::Result;
use crate::notify::{MailChannel, Notifier, WebhookChannel};
use crate::wallpaper::{
    Downloader, NullStore, SqliteStore, StorageKind, WallpaperClient, WallpaperStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Open the configured store and create its schema
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn WallpaperStore>> {
    let store: Arc<dyn WallpaperStore> = match config.storage {
        StorageKind::Sqlite => Arc::new(SqliteStore::open_in(&config.storage_dir).await?),
        StorageKind::None => {
            info!("Download records are disabled; every cycle downloads all images");
            Arc::new(NullStore)
        }
    };

    store.init().await?;
    Ok(store)
}

/// Build the notifier from the configured channels
pub fn build_notifier(config: &AppConfig) -> Result<Notifier> {
    let mut notifier = Notifier::disabled();

    if let Some(mail) = config.mail_config() {
        info!("Mail notifications enabled for {}", mail.recipient);
        notifier.add_channel(MailChannel::new(&mail)?);
    }

    if let Some(key) = &config.server_chan_key {
        info!("Webhook notifications enabled");
        notifier.add_channel(WebhookChannel::new(config.server_chan_url.clone(), key)?);
    }

    Ok(notifier)
}

/// Build the downloader and everything it depends on
pub async fn build_downloader(config: &AppConfig, clear_store: bool) -> Result<Downloader> {
    let store = open_store(config).await?;
    if clear_store {
        warn!("Clearing all download records");
        store.clear().await?;
    }

    let client = WallpaperClient::new(config.client_config())?;
    let notifier = build_notifier(config)?;

    Ok(Downloader::new(
        client,
        store,
        notifier,
        config.poll_request()?,
        config.download_dir.clone(),
    ))
}

/// Run cycles until the interval is zero or `shutdown` flips to true.
///
/// A shutdown request is honoured between cycles only; a running cycle
/// always completes. A dropped sender never ends the loop.
pub async fn run(downloader: &Downloader, scan_interval: u64, mut shutdown: watch::Receiver<bool>) {
    loop {
        if let Err(e) = downloader.run_cycle().await {
            error!("Cycle failed: {}", e);
        }

        if scan_interval == 0 {
            break;
        }
        if *shutdown.borrow() {
            info!("Shutdown requested, exiting");
            break;
        }

        info!("Waiting {} second(s) for the next cycle", scan_interval);
        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(scan_interval)) => {}
            Ok(()) = shutdown.changed() => {
                info!("Shutdown requested, exiting");
                break;
            }
        }
    }
}

/// Channel that flips to true on Ctrl-C
#[must_use]
pub fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received; finishing the current cycle");
                let _ = tx.send(true);
            }
            Err(e) => error!("Failed to listen for interrupt: {}", e),
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use ::config::Environment;
    use mockito::{Matcher, Server};

    fn test_config(dir: &tempfile::TempDir, base_url: String) -> AppConfig {
        let env = Environment::with_prefix("BINGWALL_TEST").source(Some(Default::default()));
        let mut config = AppConfig::load_with_env(&Cli::default(), env).unwrap();
        config.storage_dir = dir.path().join("storage");
        config.download_dir = dir.path().join("download");
        config.base_url = base_url;
        config.max_retries = 1;
        config.backoff_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_interval_zero_runs_one_cycle() {
        let mut server = Server::new_async().await;
        let archive = server
            .mock("GET", "/HPImageArchive.aspx")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"images": []}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = build_downloader(&test_config(&dir, server.url()), false)
            .await
            .unwrap();
        let (_tx, rx) = watch::channel(false);

        run(&downloader, 0, rx).await;

        archive.assert_async().await;
        assert!(dir.path().join("storage").join("bing.db").exists());
    }

    #[tokio::test]
    async fn test_shutdown_ends_the_wait() {
        let mut server = Server::new_async().await;
        let archive = server
            .mock("GET", "/HPImageArchive.aspx")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = build_downloader(&test_config(&dir, server.url()), false)
            .await
            .unwrap();
        let (tx, rx) = watch::channel(false);

        let stop = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(true).unwrap();
        };
        let finished = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(run(&downloader, 3600, rx), stop);
        })
        .await;

        assert!(finished.is_ok());
        archive.assert_async().await;
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_keeps_polling() {
        let mut server = Server::new_async().await;
        let archive = server
            .mock("GET", "/HPImageArchive.aspx")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"images": []}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = build_downloader(&test_config(&dir, server.url()), false)
            .await
            .unwrap();
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let finished =
            tokio::time::timeout(Duration::from_millis(300), run(&downloader, 3600, rx)).await;

        assert!(finished.is_err());
        archive.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_storage_needs_no_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir, "http://127.0.0.1:9".to_string());
        config.storage = StorageKind::None;

        let store = open_store(&config).await.unwrap();
        assert!(!store.exists("anything").await.unwrap());
        assert!(!dir.path().join("storage").exists());
    }

    #[test]
    fn test_webhook_channel_is_built_from_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir, "http://127.0.0.1:9".to_string());
        assert!(!build_notifier(&config).unwrap().is_enabled());

        config.server_chan_key = Some("SCKEY".to_string());
        assert!(build_notifier(&config).unwrap().is_enabled());
    }
}
