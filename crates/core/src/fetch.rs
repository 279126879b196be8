//! Page retrieval from URLs, files, and stdin.
//!
//! These are thin I/O wrappers around the pipeline. A failure here means
//! the page is unreadable; the pipeline is simply not invoked for it.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::{Result, TrailmarkError};

/// HTTP client configuration for fetching walk pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 15, user_agent: "Mozilla/5.0 (compatible; Trailmark/0.1)".to_string() }
    }
}

/// Fetches HTML content from a URL.
///
/// Non-success HTTP statuses are reported as errors rather than returning
/// an error page body.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    use std::time::Duration;

    use reqwest::Client;
    use url::Url;

    let parsed_url = Url::parse(url).map_err(|e| TrailmarkError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(TrailmarkError::InvalidUrl(format!(
            "URL must use http:// or https://, got {}",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(TrailmarkError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-GB,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TrailmarkError::Timeout { timeout: config.timeout }
            } else {
                TrailmarkError::HttpError(e)
            }
        })?
        .error_for_status()?;

    let content = response.text().await?;

    Ok(content)
}

/// Reads content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(TrailmarkError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(TrailmarkError::from)
    }
}

/// Reads all of standard input.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(TrailmarkError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 15);
        assert!(config.user_agent.contains("Trailmark"));
    }

    #[test]
    fn test_fetch_config_partial_json() {
        let config: FetchConfig = serde_json::from_str(r#"{"timeout": 40}"#).unwrap();
        assert_eq!(config.timeout, 40);
        assert!(config.user_agent.contains("Trailmark"));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_fetch_url_invalid() {
        let config = FetchConfig::default();
        let result = std::thread::spawn(move || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(fetch_url("not-a-url", &config))
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(TrailmarkError::InvalidUrl(_))));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_fetch_url_rejects_non_http_scheme() {
        let config = FetchConfig::default();
        let result = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(fetch_url("ftp://example.com/walk.html", &config));

        assert!(matches!(result, Err(TrailmarkError::InvalidUrl(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(TrailmarkError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.html");
        fs::write(&path, "<h1>Coral Beaches</h1>").unwrap();

        let content = fetch_file(path.to_str().unwrap()).unwrap();
        assert!(content.contains("Coral Beaches"));
    }
}
