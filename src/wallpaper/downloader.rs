use super::client::WallpaperClient;
use super::path::wallpaper_path;
use super::store::WallpaperStore;
use super::types::{CycleReport, PollRequest, WallpaperRecord};
use crate::error::Result;
use crate::notify::{FAILURE_TITLE, Notifier, SUCCESS_TITLE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

/// Outcome of one candidate image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Already recorded
    Skipped,
    /// Downloaded and recorded at the given path
    Downloaded(PathBuf),
}

/// Runs polling cycles: fetch, dedup, download, record, notify
pub struct Downloader {
    client: WallpaperClient,
    store: Arc<dyn WallpaperStore>,
    notifier: Notifier,
    request: PollRequest,
    download_dir: PathBuf,
}

impl Downloader {
    pub fn new(
        client: WallpaperClient,
        store: Arc<dyn WallpaperStore>,
        notifier: Notifier,
        request: PollRequest,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            store,
            notifier,
            request,
            download_dir: download_dir.into(),
        }
    }

    /// Run one cycle. Fails only when the metadata fetch fails; item failures
    /// are counted in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let wallpapers = self.client.fetch(&self.request).await?;

        let mut report = CycleReport {
            fetched: wallpapers.len(),
            ..CycleReport::default()
        };

        for wallpaper in &wallpapers {
            match self.process(wallpaper).await {
                Ok(ItemOutcome::Skipped) => report.skipped += 1,
                Ok(ItemOutcome::Downloaded(_)) => report.downloaded += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "Failed to download wallpaper {}: {}",
                        wallpaper.digest(),
                        e
                    );
                    let content = format!("msg: {e}\ninfo: {}", wallpaper.detail_json());
                    self.notifier.notify(FAILURE_TITLE, &content).await;
                }
            }
        }

        info!(
            "Cycle finished: {} fetched, {} skipped, {} downloaded, {} failed",
            report.fetched, report.skipped, report.downloaded, report.failed
        );

        Ok(report)
    }

    /// Download and record one wallpaper unless it is already recorded
    pub async fn process(&self, wallpaper: &WallpaperRecord) -> Result<ItemOutcome> {
        if self.store.exists(&wallpaper.hash).await? {
            info!("Wallpaper exists: {}", wallpaper.digest());
            return Ok(ItemOutcome::Skipped);
        }

        let path = wallpaper_path(&self.download_dir, self.client.base_url(), wallpaper)?;
        debug!("Downloading {} to {}", wallpaper.url, path.display());

        let bytes = self.client.download(&wallpaper.url).await?;
        write_file(&path, &bytes).await?;
        info!(
            "Downloaded wallpaper {}, file: {}",
            wallpaper.digest(),
            path.display()
        );

        self.store.save(wallpaper).await?;
        debug!("Saved wallpaper record: {}", wallpaper.hash);

        self.notifier
            .notify(SUCCESS_TITLE, &wallpaper.detail_json())
            .await;

        Ok(ItemOutcome::Downloaded(path))
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        tokio::fs::create_dir_all(parent).await?;
        info!("Created directory: {}", parent.display());
    }

    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;

    Ok(())
}
