mod api_types;
mod client;
mod downloader;
mod path;
mod store;
mod types;


pub use client::{BING_BASE_URL, ClientConfig, WallpaperClient};
pub use downloader::{Downloader, ItemOutcome};
pub use path::{file_name_from_url, wallpaper_path};
pub use store::{
    DATABASE_FILE, NullStore, SqliteStore, StorageKind, StoredWallpaper, WallpaperStore,
};
pub use types::{CycleReport, Locale, PollRequest, Resolution, WallpaperRecord};
