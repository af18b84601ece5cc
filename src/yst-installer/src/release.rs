//! Picks the release to install: the latest published tag when the release API answers,
//! otherwise the version pinned in the local package metadata.
use crate::config::InstallerConfig;
use crate::errors::InstallError;
use crate::retry::{retry_notice, RetryBudget, Sleeper};
use crate::utils::{print_message, TagColor};
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use yst_common::asset::ReleaseVersion;
use yst_common::warning_message;

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    Latest,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: ReleaseVersion,
    pub source: VersionSource,
}

/// Reads the version pinned in a `package.json`-style descriptor. A missing, unreadable, or
/// malformed file yields `baseline` instead of an error.
pub fn read_fallback_version(path: &Path, baseline: &ReleaseVersion) -> ReleaseVersion {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "package metadata unreadable");
            return baseline.clone();
        }
    };

    match serde_json::from_str::<PackageManifest>(&contents) {
        Ok(PackageManifest {
            version: Some(version),
        }) if !version.trim().is_empty() => ReleaseVersion::from_package_version(&version),
        Ok(_) => {
            debug!(path = %path.display(), "package metadata has no version");
            baseline.clone()
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "package metadata malformed");
            baseline.clone()
        }
    }
}

pub struct VersionResolver {
    client: Client,
    latest_url: Url,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl VersionResolver {
    pub fn new(config: &InstallerConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build release API client")?;

        Ok(Self {
            client,
            latest_url: config.latest_release_url()?,
            timeout: config.metadata_timeout(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            sleeper,
        })
    }

    /// Always yields a version. The latest release wins; `fallback` is used once the lookup
    /// has definitively failed.
    pub async fn resolve(&self, fallback: &ReleaseVersion) -> ResolvedVersion {
        match self.fetch_latest().await {
            Ok(version) => {
                info!(%version, "resolved latest release");
                print_message("VERSION", &format!("Latest release: {version}"), TagColor::Green);
                ResolvedVersion {
                    version,
                    source: VersionSource::Latest,
                }
            }
            Err(err) => {
                warn!(error = %err, %fallback, "latest release lookup failed, using packaged version");
                warning_message!("Could not fetch the latest release: {err}");
                print_message(
                    "FALLBACK",
                    &format!("Using packaged version: {fallback}"),
                    TagColor::Yellow,
                );
                ResolvedVersion {
                    version: fallback.clone(),
                    source: VersionSource::Fallback,
                }
            }
        }
    }

    /// Queries the release API, retrying connection failures, timeouts, and 5xx responses
    /// with a fixed delay. Any other non-200 status or an unparsable body fails at once.
    pub async fn fetch_latest(&self) -> Result<ReleaseVersion, InstallError> {
        let mut budget = RetryBudget::new(self.retry_delay, self.max_retries);

        loop {
            let err = match self.fetch_once().await {
                Ok(version) => return Ok(version),
                Err(err) if Self::is_retryable(&err) => err,
                Err(err) => return Err(err),
            };

            let remaining = budget.remaining();
            let Some(delay) = budget.next_delay() else {
                return Err(err);
            };

            warn!(error = %err, remaining, "release lookup failed, retrying");
            warning_message!("{}", retry_notice("Release lookup", &err, delay, remaining));
            self.sleeper.sleep(delay).await;
        }
    }

    async fn fetch_once(&self) -> Result<ReleaseVersion, InstallError> {
        debug!(url = %self.latest_url, "querying latest release");

        let response = self
            .client
            .get(self.latest_url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| InstallError::from_request(&self.latest_url, self.timeout, err))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(InstallError::HttpStatus {
                url: self.latest_url.clone(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| InstallError::from_request(&self.latest_url, self.timeout, err))?;

        let release: LatestRelease = serde_json::from_slice(&body).map_err(|err| {
            InstallError::VersionResolution(format!("malformed release metadata: {err}"))
        })?;

        let tag = release.tag_name.trim();
        if tag.is_empty() {
            return Err(InstallError::VersionResolution(
                "release metadata has an empty tag_name".to_string(),
            ));
        }

        Ok(ReleaseVersion::new(tag))
    }

    fn is_retryable(err: &InstallError) -> bool {
        match err {
            InstallError::HttpStatus { status, .. } => status.is_server_error(),
            other => other.is_transient(),
        }
    }
}
