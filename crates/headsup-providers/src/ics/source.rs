//! Where ICS data comes from: a local file or an HTTP(S) feed.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Request timeout for calendar feeds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A calendar location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcsSource {
    File(PathBuf),
    Http(Url),
}

impl IcsSource {
    /// Interprets a configured source string.
    ///
    /// `http://` and `https://` (and `webcal://`, read as `https://`) are feeds;
    /// anything else is a file path, with a leading `~/` expanded to the home
    /// directory.
    pub fn parse(source: &str) -> ProviderResult<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ProviderError::configuration("calendar source is empty"));
        }

        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(source).map_err(|e| {
                ProviderError::configuration(format!("invalid calendar URL: {source}")).with_source(e)
            })?;
            return Ok(Self::Http(url));
        }
        if let Some(rest) = lower.strip_prefix("webcal://") {
            let tail = &source[source.len() - rest.len()..];
            let url = Url::parse(&format!("https://{tail}")).map_err(|e| {
                ProviderError::configuration(format!("invalid calendar URL: {source}")).with_source(e)
            })?;
            return Ok(Self::Http(url));
        }

        Ok(Self::File(expand_home(source)))
    }
}

impl fmt::Display for IcsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Reads the raw calendar text from an [`IcsSource`].
#[derive(Debug, Clone)]
pub struct IcsFetcher {
    client: Client,
}

impl IcsFetcher {
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("headsup/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetches the calendar text.
    pub async fn fetch(&self, source: &IcsSource) -> ProviderResult<String> {
        match source {
            IcsSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                let message = format!("failed to read {}: {e}", path.display());
                let err = if e.kind() == std::io::ErrorKind::NotFound
                    || e.kind() == std::io::ErrorKind::PermissionDenied
                {
                    ProviderError::access_denied(message)
                } else {
                    ProviderError::io(message)
                };
                err.with_source(e)
            }),
            IcsSource::Http(url) => self.get(url).await,
        }
    }

    async fn get(&self, url: &Url) -> ProviderResult<String> {
        trace!(%url, "Fetching calendar feed");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("request failed: {e}")))?;

        let status = response.status();
        trace!(%status, "Received response");
        match status {
            s if s.is_success() => response
                .text()
                .await
                .map_err(|e| ProviderError::network(format!("failed to read response: {e}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Err(
                ProviderError::access_denied(format!("calendar feed refused access ({status})")),
            ),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(ProviderError::rate_limited("too many requests to calendar feed"))
            }
            s if s.is_server_error() => Err(ProviderError::server(format!("server error ({s})"))),
            s => {
                warn!(status = %s, "Unexpected response status");
                Err(ProviderError::invalid_data(format!("unexpected status {s}")))
            }
        }
    }
}
