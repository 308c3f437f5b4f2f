//! Local file layout: `<root>/<ZONE>/<YYYYMM>/<YYYYMMDD>_<name>`

use super::types::WallpaperRecord;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Image name carried in the `id` parameter, matched against the URL with the
/// archive host stripped off. The name never contains a path separator.
static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/th\?id=([\w.\-]+)&rf=").expect("Invalid file name regex")
});

static START_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("Invalid start date regex"));

/// Extract the image file name from an archive image URL served by `base_url`
pub fn file_name_from_url<'a>(base_url: &str, url: &'a str) -> Result<&'a str> {
    url.strip_prefix(base_url.trim_end_matches('/'))
        .and_then(|rest| FILE_NAME.captures(rest))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))
}

/// Derive where `wallpaper` is stored below `root`
pub fn wallpaper_path(
    root: &Path,
    base_url: &str,
    wallpaper: &WallpaperRecord,
) -> Result<PathBuf> {
    if !START_DATE.is_match(&wallpaper.start_date) {
        return Err(Error::Parse(format!(
            "invalid start date: {}",
            wallpaper.start_date
        )));
    }

    let name = file_name_from_url(base_url, &wallpaper.url)?;

    Ok(root
        .join(wallpaper.locale.zone())
        .join(wallpaper.month())
        .join(format!("{}_{name}", wallpaper.start_date)))
}
