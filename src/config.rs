//! Startup configuration: defaults, optional file, `BING_*` environment
//! variables and CLI flags, in increasing order of precedence.

use crate::error::{Error, Result};
use crate::logging::LogFormat;
use crate::notify::{MailConfig, SERVER_CHAN_URL};
use crate::retry::RetryPolicy;
use crate::wallpaper::{BING_BASE_URL, ClientConfig, Locale, PollRequest, Resolution, StorageKind};
use clap::Parser;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "BING";

/// Command line flags; every setting falls back to the config file and `BING_*` env vars
#[derive(Debug, Default, Parser)]
#[command(name = "bingwall", version, about = "Download the Bing image of the day", long_about = None)]
pub struct Cli {
    /// Config file (TOML, YAML, JSON, INI)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the database file [env: BING_STORAGE_DIR]
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Download record store: sqlite or none [env: BING_STORAGE]
    #[arg(long)]
    pub storage: Option<String>,

    /// Directory images are written to [env: BING_DOWNLOAD_DIR]
    #[arg(long)]
    pub download_dir: Option<String>,

    /// Seconds between cycles, 0 runs once [env: BING_SCAN_INTERVAL]
    #[arg(long)]
    pub scan_interval: Option<u64>,

    /// Archive locale: en or cn [env: BING_LOCALE]
    #[arg(long)]
    pub locale: Option<String>,

    /// Image size, e.g. uhd1609 or 1920x1080 [env: BING_RESOLUTION]
    #[arg(long)]
    pub resolution: Option<String>,

    /// Days back from today to start at, 0-7 [env: BING_OFFSET]
    #[arg(long)]
    pub offset: Option<u8>,

    /// Number of images to request, 1-8 [env: BING_COUNT]
    #[arg(long)]
    pub count: Option<u8>,

    /// Attempts per metadata request [env: BING_MAX_RETRIES]
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Metadata request timeout in milliseconds [env: BING_TIMEOUT_MS]
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Attempts per image download [env: BING_DOWNLOAD_MAX_RETRIES]
    #[arg(long)]
    pub download_max_retries: Option<u32>,

    /// Image download timeout in milliseconds [env: BING_DOWNLOAD_TIMEOUT_MS]
    #[arg(long)]
    pub download_timeout_ms: Option<u64>,

    /// Reject archive entries with missing descriptive fields
    #[arg(long)]
    pub strict_metadata: bool,

    /// Also write logs to rolling files in the log directory
    #[arg(long)]
    pub file_log: bool,

    /// Directory for log files [env: BING_LOG_DIR]
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Log output format: text or json [env: BING_LOG_FORMAT]
    #[arg(long)]
    pub log_format: Option<String>,

    /// Address notified on success or failure [env: BING_NOTIFY_MAIL]
    #[arg(long)]
    pub notify_mail: Option<String>,

    /// Account sending notification mails [env: BING_MY_NOTIFY_MAIL]
    #[arg(long)]
    pub my_notify_mail: Option<String>,

    /// Password or token of the sending account [env: BING_MY_NOTIFY_PASS]
    #[arg(long)]
    pub my_notify_pass: Option<String>,

    /// Display name of the sending account [env: BING_MY_NOTIFY_NAME]
    #[arg(long)]
    pub my_notify_name: Option<String>,

    /// ServerChan key for webhook notifications [env: BING_SERVER_CHAN_KEY]
    #[arg(long)]
    pub server_chan_key: Option<String>,

    /// Delete all download records before the first cycle
    #[arg(long)]
    pub clear_store: bool,
}

impl Cli {
    fn apply_overrides(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>> {
        Ok(builder
            .set_override_option("storage_dir", self.storage_dir.clone())?
            .set_override_option("storage", self.storage.clone())?
            .set_override_option("download_dir", self.download_dir.clone())?
            .set_override_option("scan_interval", self.scan_interval)?
            .set_override_option("locale", self.locale.clone())?
            .set_override_option("resolution", self.resolution.clone())?
            .set_override_option("offset", self.offset.map(u64::from))?
            .set_override_option("count", self.count.map(u64::from))?
            .set_override_option("max_retries", self.max_retries.map(u64::from))?
            .set_override_option("timeout_ms", self.timeout_ms)?
            .set_override_option(
                "download_max_retries",
                self.download_max_retries.map(u64::from),
            )?
            .set_override_option("download_timeout_ms", self.download_timeout_ms)?
            .set_override_option("strict_metadata", self.strict_metadata.then_some(true))?
            .set_override_option("file_log", self.file_log.then_some(true))?
            .set_override_option("log_dir", self.log_dir.clone())?
            .set_override_option("log_format", self.log_format.clone())?
            .set_override_option("notify_mail", self.notify_mail.clone())?
            .set_override_option("my_notify_mail", self.my_notify_mail.clone())?
            .set_override_option("my_notify_pass", self.my_notify_pass.clone())?
            .set_override_option("my_notify_name", self.my_notify_name.clone())?
            .set_override_option("server_chan_key", self.server_chan_key.clone())?)
    }
}

/// Settings resolved once at startup and passed to every collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage_dir: PathBuf,
    pub storage: StorageKind,
    pub download_dir: PathBuf,
    /// Seconds between cycles; 0 runs a single cycle
    pub scan_interval: u64,

    pub locale: Locale,
    pub resolution: Resolution,
    pub offset: u8,
    pub count: u8,
    pub base_url: String,
    pub strict_metadata: bool,

    pub max_retries: u32,
    pub backoff_ms: u64,
    pub timeout_ms: u64,
    pub download_max_retries: u32,
    pub download_backoff_ms: u64,
    pub download_timeout_ms: u64,

    pub file_log: bool,
    pub log_dir: PathBuf,
    pub log_format: LogFormat,

    pub notify_mail: Option<String>,
    pub my_notify_mail: Option<String>,
    pub my_notify_pass: Option<String>,
    pub my_notify_name: String,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub server_chan_key: Option<String>,
    pub server_chan_url: String,
}

impl AppConfig {
    /// Resolve configuration from the CLI, its config file and the process environment
    pub fn load(cli: &Cli) -> Result<Self> {
        Self::load_with_env(
            cli,
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true),
        )
    }

    pub(crate) fn load_with_env(cli: &Cli, env: Environment) -> Result<Self> {
        let mut builder = Self::defaults()?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        builder = cli.apply_overrides(builder.add_source(env))?;

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("storage_dir", "storage")?
            .set_default("storage", "sqlite")?
            .set_default("download_dir", "download")?
            .set_default("scan_interval", 0_i64)?
            .set_default("locale", "en")?
            .set_default("resolution", "uhd1609")?
            .set_default("offset", 0_i64)?
            .set_default("count", 8_i64)?
            .set_default("base_url", BING_BASE_URL)?
            .set_default("strict_metadata", false)?
            .set_default("max_retries", 3_i64)?
            .set_default("backoff_ms", 1000_i64)?
            .set_default("timeout_ms", 5000_i64)?
            .set_default("download_max_retries", 3_i64)?
            .set_default("download_backoff_ms", 1000_i64)?
            .set_default("download_timeout_ms", 10_000_i64)?
            .set_default("file_log", false)?
            .set_default("log_dir", "log")?
            .set_default("log_format", "text")?
            .set_default("my_notify_name", "Robot")?
            .set_default("server_chan_url", SERVER_CHAN_URL)?)
    }

    /// Check ranges and that mail notifications have credentials
    pub fn validate(&self) -> Result<()> {
        self.poll_request()?;

        if self.notify_mail.is_some()
            && (self.my_notify_mail.is_none() || self.my_notify_pass.is_none())
        {
            return Err(Error::Config(
                "my_notify_mail and my_notify_pass are required when notify_mail is set"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_request(&self) -> Result<PollRequest> {
        Ok(PollRequest::new(self.offset, self.count, self.locale)?
            .with_resolution(self.resolution))
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            retry: RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_ms)),
            download_timeout: Duration::from_millis(self.download_timeout_ms),
            download_retry: RetryPolicy::new(
                self.download_max_retries,
                Duration::from_millis(self.download_backoff_ms),
            ),
            strict: self.strict_metadata,
        }
    }

    /// Mail settings, when a recipient is configured
    #[must_use]
    pub fn mail_config(&self) -> Option<MailConfig> {
        let recipient = self.notify_mail.clone()?;

        Some(MailConfig {
            sender: self.my_notify_mail.clone()?,
            sender_name: self.my_notify_name.clone(),
            password: self.my_notify_pass.clone()?,
            recipient,
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
        })
    }
}
