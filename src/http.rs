use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("bingwall/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper shared by the archive client and the webhook channel
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build full URL from endpoint
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Execute GET request with query parameters and parse the body as JSON
    pub async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| Error::BadResponse {
            status: 200,
            message: format!("invalid JSON: {e}"),
        })
    }

    /// Execute GET request against an absolute URL and return the raw body
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Bytes> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let response = Self::check_status(response).await?;

        Ok(response.bytes().await?)
    }

    /// Execute GET request with query parameters, discarding the body
    pub async fn get_ok(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<()> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let message = response.text().await.unwrap_or_default();

            return Err(Error::BadResponse {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = HttpClient::new("https://www.bing.com/").unwrap();
        assert_eq!(
            client.url("/HPImageArchive.aspx"),
            "https://www.bing.com/HPImageArchive.aspx"
        );
        assert_eq!(client.base_url(), "https://www.bing.com");
    }

    #[tokio::test]
    async fn test_non_ok_status_is_bad_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("nope")
            .create_async()
            .await;

        let client = HttpClient::new(server.url()).unwrap();
        let err = client
            .get_bytes(&client.url("/missing"), Duration::from_secs(5))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, Error::BadResponse { status: 404, ref message } if message == "nope"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = HttpClient::new(server.url()).unwrap();
        let err = client
            .get_json("/data", &[("n", "1".to_string())], Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(err, Error::BadResponse { status: 200, .. }));
    }
}
