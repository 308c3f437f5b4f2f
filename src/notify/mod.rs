mod mail;
mod webhook;

pub use mail::{MailChannel, MailConfig, SmtpServer};
pub use webhook::{SERVER_CHAN_URL, WebhookChannel};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

pub const SUCCESS_TITLE: &str = "Bing Wallpaper Download SUCCESS";
pub const FAILURE_TITLE: &str = "Bing Wallpaper Download ERROR";

/// One way of delivering a notification
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Channel identifier used in log lines
    fn name(&self) -> &'static str;

    async fn send(&self, title: &str, content: &str) -> Result<()>;
}

/// Best-effort fan-out over the configured channels
#[derive(Clone, Default)]
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
}

impl Notifier {
    /// A notifier with no channels
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Add a channel
    pub fn add_channel<C: NotifyChannel + 'static>(&mut self, channel: C) {
        self.channels.push(Arc::new(channel));
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Send to every channel; failures are logged and never returned
    pub async fn notify(&self, title: &str, content: &str) {
        for channel in &self.channels {
            match channel.send(title, content).await {
                Ok(()) => debug!("Sent '{}' via {}", title, channel.name()),
                Err(e) => error!("Failed to notify via {}: {}", channel.name(), e),
            }
        }
    }
}
