use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use yst_common::platform::PlatformError;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Failed to resolve release version: {0}")]
    VersionResolution(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: Url, status: StatusCode },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {}ms", after.as_millis())]
    Timeout { url: Url, after: Duration },

    #[error("Gave up on {url} after {limit} redirects")]
    TooManyRedirects { url: Url, limit: u32 },

    #[error("Redirect from {url} has no usable Location header")]
    InvalidRedirect { url: Url },

    #[error("Downloaded file is empty: {}", path.display())]
    EmptyArtifact { path: PathBuf },

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Splits a reqwest failure into timeout vs. any other transport failure.
    pub(crate) fn from_request(url: &Url, after: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.clone(),
                after,
            }
        } else {
            Self::Transport {
                url: url.clone(),
                source,
            }
        }
    }

    /// Connection-level failures that a fresh attempt may not hit again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}
