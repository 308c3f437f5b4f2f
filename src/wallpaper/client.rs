use super::api_types::{ArchiveImage, ArchiveResponse};
use super::types::{Locale, PollRequest, WallpaperRecord};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::retry::{RetryPolicy, retry};
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const BING_BASE_URL: &str = "https://www.bing.com";
const ARCHIVE_ENDPOINT: &str = "/HPImageArchive.aspx";

/// Timeouts and retry policies of the archive client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Timeout of one metadata request
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Timeout of one image request
    pub download_timeout: Duration,
    pub download_retry: RetryPolicy,
    /// Reject entries with any missing descriptive field
    pub strict: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BING_BASE_URL.to_string(),
            timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
            download_timeout: Duration::from_millis(10_000),
            download_retry: RetryPolicy::default(),
            strict: false,
        }
    }
}

/// Client for the image archive endpoint
pub struct WallpaperClient {
    http: HttpClient,
    config: ClientConfig,
}

impl WallpaperClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config.base_url.clone())?,
            config,
        })
    }

    /// Host image URLs must be served from
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Fetch the metadata of the images selected by `request`
    pub async fn fetch(&self, request: &PollRequest) -> Result<Vec<WallpaperRecord>> {
        let params = Self::query(request);
        debug!("Fetching archive: {:?}", params);

        let body = retry("fetch archive", &self.config.retry, || {
            self.http
                .get_json(ARCHIVE_ENDPOINT, &params, self.config.timeout)
        })
        .await?;

        let records = self.parse_archive(body, request.locale)?;
        info!(
            "Fetched {} wallpaper(s) from archive (locale: {}, offset: {})",
            records.len(),
            request.locale,
            request.offset_days()
        );

        Ok(records)
    }

    /// Download one image body
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        retry("download image", &self.config.download_retry, || {
            self.http.get_bytes(url, self.config.download_timeout)
        })
        .await
    }

    fn query(request: &PollRequest) -> Vec<(&'static str, String)> {
        let (width, height) = request.resolution.dimensions();

        vec![
            ("format", "js".to_string()),
            ("idx", request.offset_days().to_string()),
            ("n", request.count().to_string()),
            ("nc", chrono::Utc::now().timestamp_millis().to_string()),
            ("pid", "hp".to_string()),
            ("ensearch", request.locale.ensearch().to_string()),
            ("quiz", "1".to_string()),
            ("og", "1".to_string()),
            ("uhd", "1".to_string()),
            ("uhdwidth", width.to_string()),
            ("uhdheight", height.to_string()),
        ]
    }

    fn parse_archive(
        &self,
        body: serde_json::Value,
        locale: Locale,
    ) -> Result<Vec<WallpaperRecord>> {
        let response: ArchiveResponse = serde_json::from_value(body)
            .map_err(|e| Error::Parse(format!("archive response: {e}")))?;

        response
            .images
            .into_iter()
            .map(|entry| self.to_record(entry, locale))
            .collect()
    }

    fn to_record(&self, mut entry: serde_json::Value, locale: Locale) -> Result<WallpaperRecord> {
        let image = ArchiveImage::deserialize(&entry)
            .map_err(|e| Error::Parse(format!("archive entry: {e}")))?;

        if self.config.strict {
            require("copyright", image.copyright.as_ref())?;
            require("title", image.title.as_ref())?;
        }
        let start_date = require("startdate", image.startdate)?;
        let hash = require("hsh", image.hsh)?;
        let url = self.absolute_url(&require("url", image.url)?);

        if let Some(fields) = entry.as_object_mut() {
            fields.insert("url".to_string(), url.clone().into());
            fields.insert("zone".to_string(), locale.zone().into());
        }

        Ok(WallpaperRecord {
            start_date,
            url,
            copyright: image.copyright.unwrap_or_default(),
            hash,
            locale,
            title: image.title,
            raw: entry,
        })
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.http.url(url)
        }
    }
}

fn require<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::Parse(format!("missing field '{field}'")))
}
