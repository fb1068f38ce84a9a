use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

const USER_AGENT: &str = concat!("bods_attention/", env!("CARGO_PKG_VERSION"));
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// A plain reqwest client with a download timeout.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Builds the client with the default timeout. If the configured client
    /// cannot be built, logs the error and uses reqwest's defaults.
    pub fn new() -> Self {
        Self::with_timeout(DOWNLOAD_TIMEOUT).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build configured HTTP client, using defaults");
            Self(reqwest::Client::new())
        })
    }

    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self(client))
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
