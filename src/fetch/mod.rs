mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Downloads `url` with `client`, failing on non-success statuses.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let start = std::time::Instant::now();
    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?.to_vec();

    let elapsed = start.elapsed();
    if elapsed.as_secs() > 30 {
        warn!(elapsed_secs = elapsed.as_secs(), "Catalogue download was slow");
    }
    debug!(bytes = bytes.len(), "Download complete");
    Ok(bytes)
}

/// Loads bytes from an `http(s)` URL or a local file path.
#[tracing::instrument(skip(client), fields(source = %source))]
pub async fn read_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_bytes(client, source).await
    } else {
        std::fs::read(source).with_context(|| format!("Failed to read {source}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_source_local_file() {
        let path = std::env::temp_dir().join("bods_attention_read_source.bin");
        std::fs::write(&path, b"abc").unwrap();

        let bytes = read_source(&BasicClient::new(), path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(bytes, b"abc");
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_read_source_missing_file() {
        let err = read_source(&BasicClient::default(), "/nonexistent/catalogue.zip")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalogue.zip"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        assert!(fetch_bytes(&BasicClient::new(), "not a url").await.is_err());
    }
}
