use crate::error::{AppError, Result};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Where a dataset lives: a file on disk or a remote URL.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(Url),
}

impl DataSource {
    /// Anything with a `scheme://` prefix is treated as a URL, everything else as a path.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if !source.contains("://") {
            return Ok(DataSource::Local(PathBuf::from(source)));
        }

        let url = Url::parse(source)
            .map_err(|e| AppError::Config(format!("Invalid dataset URL '{}': {}", source, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(DataSource::Remote(url)),
            other => Err(AppError::Config(format!(
                "Unsupported dataset URL scheme '{}' in '{}'",
                other, source
            ))),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("bikeshare-dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Read the raw text of a dataset. A single attempt; failures are fatal to the caller.
    pub async fn fetch(&self, source: &DataSource) -> Result<String> {
        let content = match source {
            DataSource::Local(path) => {
                debug!("Reading dataset from {}", path.display());
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    AppError::Load(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
            DataSource::Remote(url) => self.download(url).await?,
        };

        info!("Fetched {} bytes from {}", content.len(), source);
        Ok(content)
    }

    async fn download(&self, url: &Url) -> Result<String> {
        debug!("Downloading dataset from {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Load(format!(
                "Request to {} failed with status {}",
                url, status
            )));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_path() {
        assert_eq!(
            DataSource::parse("data/hour.csv").unwrap(),
            DataSource::Local(PathBuf::from("data/hour.csv"))
        );
    }

    #[test]
    fn test_parse_remote_url() {
        let source = DataSource::parse("https://example.com/data/bsn.csv").unwrap();
        match source {
            DataSource::Remote(url) => {
                assert_eq!(url.host_str(), Some("example.com"));
                assert_eq!(url.path(), "/data/bsn.csv");
            }
            other => panic!("Expected remote source, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = DataSource::parse("ftp://example.com/hour.csv").unwrap_err();
        assert!(err.to_string().contains("Unsupported dataset URL scheme"));
    }

    #[test]
    fn test_display() {
        let source = DataSource::parse("https://example.com/hour.csv").unwrap();
        assert_eq!(source.to_string(), "https://example.com/hour.csv");
    }
}
