use super::NotifyChannel;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

pub const SERVER_CHAN_URL: &str = "https://sc.ftqq.com";

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// ServerChan style webhook: `GET {base}/{key}.send?text=..&desp=..`
pub struct WebhookChannel {
    http: HttpClient,
    key: String,
}

impl WebhookChannel {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            key: key.into(),
        })
    }
}

#[async_trait]
impl NotifyChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, title: &str, content: &str) -> Result<()> {
        let endpoint = format!("/{}.send", self.key);

        self.http
            .get_ok(
                &endpoint,
                &[("text", title), ("desp", content)],
                WEBHOOK_TIMEOUT,
            )
            .await
            .map_err(|e| Error::Notify(e.to_string()))
    }
}
