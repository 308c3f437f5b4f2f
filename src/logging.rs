use serde::Deserialize;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Log file name inside the log directory; rotated daily
pub const LOG_FILE: &str = "bing.log";

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber.
///
/// Logs go to stdout and, when `log_dir` is given, also to a daily rolling
/// file there. The returned guard flushes the file writer and must be held
/// until exit.
pub fn init(format: LogFormat, log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Text => fmt::layer().with_timer(ChronoLocal::rfc_3339()).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_timer(ChronoLocal::rfc_3339())
            .boxed(),
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(ChronoLocal::rfc_3339())
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(guard)
}
