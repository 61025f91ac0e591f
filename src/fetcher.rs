use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::fetch_error::FetchError;

/// Where station spreadsheets are served from
#[derive(Clone, Debug)]
pub enum ResourceFetcher {
    /// Files inside a local directory
    Directory(PathBuf),
    /// Files below a remote base URL (must end with '/')
    Remote { client: reqwest::Client, base_url: Url },
}

impl ResourceFetcher {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        ResourceFetcher::Directory(dir.into())
    }

    pub fn remote(base_url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ResourceFetcher::Remote { client, base_url })
    }

    /// Human readable origin for logs
    pub fn describe(&self) -> String {
        match self {
            ResourceFetcher::Directory(dir) => dir.display().to_string(),
            ResourceFetcher::Remote { base_url, .. } => base_url.to_string(),
        }
    }

    /// Fetch the raw bytes of one resource
    #[instrument(skip(self), fields(origin = %self.describe()))]
    pub async fn fetch(&self, resource: &str) -> Result<Vec<u8>, FetchError> {
        match self {
            ResourceFetcher::Directory(dir) => {
                let path = dir.join(resource);
                debug!("Reading {}", path.display());
                tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
            ResourceFetcher::Remote { client, base_url } => {
                // join() percent-encodes the accented file names
                let url = base_url
                    .join(resource)
                    .map_err(|e| FetchError::InvalidUrl(format!("{resource}: {e}")))?;
                debug!("Sending HTTP request to {}", url);

                let response = client.get(url).send().await?;
                let status = response.status();
                debug!("Received HTTP response with status: {}", status);

                if status.is_success() {
                    let bytes = response.bytes().await?;
                    debug!("Downloaded {resource} ({} bytes)", bytes.len());
                    Ok(bytes.to_vec())
                } else if status.as_u16() == 404 {
                    Err(FetchError::NotFound(resource.to_string()))
                } else {
                    Err(FetchError::Status {
                        status: status.as_u16(),
                        resource: resource.to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_directory() {
        let fetcher = ResourceFetcher::directory("data");
        assert_eq!(fetcher.describe(), "data");
    }

    #[test]
    fn test_describe_remote() {
        let url = Url::parse("https://example.org/static/").unwrap();
        let fetcher = ResourceFetcher::remote(url, Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.describe(), "https://example.org/static/");
    }

    #[test]
    fn test_url_join_encodes_accents() {
        let base = Url::parse("https://example.org/static/").unwrap();
        let url = base.join("H55-Río_Antisana_AC_Nivel_de_agua-Mensual.xlsx").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/static/H55-R%C3%ADo_Antisana_AC_Nivel_de_agua-Mensual.xlsx"
        );
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let fetcher = ResourceFetcher::directory("/nonexistent/antisana");
        let err = fetcher.fetch("missing.xlsx").await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.to_string().contains("missing.xlsx"));
    }
}
