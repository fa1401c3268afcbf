//! Page input from URLs, files, and stdin.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{PlainpageError, Result};

/// HTTP client settings for fetching pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Plainpage/0.3; +https://github.com/plainpage/plainpage)".to_string(),
        }
    }
}

/// Where page HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Url(String),
    File(PathBuf),
    Stdin,
}

impl Input {
    /// `-` is stdin, `http(s)://` is a URL, anything else a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Reads the page.
    pub async fn read(&self, config: &FetchConfig) -> Result<String> {
        match self {
            Self::Url(url) => fetch_url(url, config).await,
            Self::File(path) => fetch_file(path),
            Self::Stdin => fetch_stdin(),
        }
    }
}

/// Fetches a page with a GET request, following redirects.
///
/// Non-success statuses are errors; a consent wall or a 404 page is not
/// something worth cleaning.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| PlainpageError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(PlainpageError::InvalidUrl(format!(
            "unsupported scheme {}, expected http or https",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(PlainpageError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PlainpageError::Timeout { timeout: config.timeout }
            } else {
                PlainpageError::HttpError(e)
            }
        })?
        .error_for_status()?;

    tracing::debug!(url, status = %response.status(), "fetched page");
    Ok(response.text().await?)
}

/// Reads a page from a local file.
pub fn fetch_file(path: impl Into<PathBuf>) -> Result<String> {
    let path_buf = path.into();

    if !path_buf.exists() {
        Err(PlainpageError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(PlainpageError::from)
    }
}

/// Reads a page from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(PlainpageError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("Plainpage"));
    }

    #[test]
    fn test_input_from_arg() {
        assert_eq!(Input::from_arg("-"), Input::Stdin);
        assert_eq!(Input::from_arg("https://example.com"), Input::Url("https://example.com".to_string()));
        assert_eq!(Input::from_arg("page.html"), Input::File(PathBuf::from("page.html")));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let config = FetchConfig::default();
        let result = fetch_url("not-a-url", &config).await;
        assert!(matches!(result, Err(PlainpageError::InvalidUrl(_))));

        let result = fetch_url("ftp://example.com/page", &config).await;
        assert!(matches!(result, Err(PlainpageError::InvalidUrl(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(PlainpageError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_input_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p>hi</p>").unwrap();

        let html = Input::File(path).read(&FetchConfig::default()).await.unwrap();
        assert_eq!(html, "<p>hi</p>");
    }
}
