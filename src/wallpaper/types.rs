use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Regional variant of the archive to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[serde(alias = "CN", alias = "zh")]
    Cn,
    #[default]
    #[serde(alias = "EN")]
    En,
}

impl Locale {
    /// Zone label stored with each record and used as the top-level download folder
    #[must_use]
    pub const fn zone(self) -> &'static str {
        match self {
            Self::Cn => "CN",
            Self::En => "EN",
        }
    }

    /// Value of the `ensearch` query parameter
    #[must_use]
    pub const fn ensearch(self) -> u8 {
        match self {
            Self::Cn => 0,
            Self::En => 1,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.zone())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "cn" | "zh" => Ok(Self::Cn),
            _ => Err(format!("Unknown locale: {s}")),
        }
    }
}

/// Requested image size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// 1920x1080
    Fhd1609,
    /// 1920x1200
    Fhd1610,
    /// 2560x1440
    Qhd1609,
    /// 2560x1600
    Qhd1610,
    /// 3840x2160
    #[default]
    Uhd1609,
    /// 3840x2400
    Uhd1610,
}

impl Resolution {
    /// Width and height in pixels
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Fhd1609 => (1920, 1080),
            Self::Fhd1610 => (1920, 1200),
            Self::Qhd1609 => (2560, 1440),
            Self::Qhd1610 => (2560, 1600),
            Self::Uhd1609 => (3840, 2160),
            Self::Uhd1610 => (3840, 2400),
        }
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fhd1609" | "1920x1080" => Ok(Self::Fhd1609),
            "fhd1610" | "1920x1200" => Ok(Self::Fhd1610),
            "qhd1609" | "2560x1440" => Ok(Self::Qhd1609),
            "qhd1610" | "2560x1600" => Ok(Self::Qhd1610),
            "uhd1609" | "3840x2160" => Ok(Self::Uhd1609),
            "uhd1610" | "3840x2400" => Ok(Self::Uhd1610),
            _ => Err(format!("Unknown resolution: {s}")),
        }
    }
}

/// Which slice of the archive to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequest {
    offset_days: u8,
    count: u8,
    pub locale: Locale,
    pub resolution: Resolution,
}

impl PollRequest {
    /// The archive only serves the last eight days
    pub const MAX_OFFSET: u8 = 7;
    pub const MAX_COUNT: u8 = 8;

    pub fn new(offset_days: u8, count: u8, locale: Locale) -> Result<Self> {
        if offset_days > Self::MAX_OFFSET {
            return Err(Error::Config(format!(
                "offset must be within 0..={}, got {offset_days}",
                Self::MAX_OFFSET
            )));
        }
        if count == 0 || count > Self::MAX_COUNT {
            return Err(Error::Config(format!(
                "count must be within 1..={}, got {count}",
                Self::MAX_COUNT
            )));
        }

        Ok(Self {
            offset_days,
            count,
            locale,
            resolution: Resolution::default(),
        })
    }

    #[must_use]
    pub const fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub const fn offset_days(&self) -> u8 {
        self.offset_days
    }

    #[must_use]
    pub const fn count(&self) -> u8 {
        self.count
    }
}

impl Default for PollRequest {
    fn default() -> Self {
        Self {
            offset_days: 0,
            count: Self::MAX_COUNT,
            locale: Locale::default(),
            resolution: Resolution::default(),
        }
    }
}

/// Metadata of one archive image, as recorded after a successful download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallpaperRecord {
    /// First day the image was shown, `YYYYMMDD`
    pub start_date: String,
    /// Absolute image URL
    pub url: String,
    pub copyright: String,
    /// Content hash assigned by the archive; unique key
    pub hash: String,
    pub locale: Locale,
    pub title: Option<String>,
    /// The archive entry as received, with absolute `url` and injected `zone`
    pub raw: serde_json::Value,
}

impl WallpaperRecord {
    /// `YYYYMM` part of the start date
    #[must_use]
    pub fn month(&self) -> &str {
        self.start_date.get(..6).unwrap_or(&self.start_date)
    }

    /// Raw metadata as a JSON string, used for the store and notifications
    #[must_use]
    pub fn detail_json(&self) -> String {
        self.raw.to_string()
    }

    /// Short description for log lines
    #[must_use]
    pub fn digest(&self) -> String {
        format!(
            "[date: {}, hsh: {}, title: {}, url: {}]",
            self.start_date,
            self.hash,
            self.title.as_deref().unwrap_or(""),
            self.url
        )
    }
}

/// Summary of one polling cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
}
