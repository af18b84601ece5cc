use crate::config::InstallerConfig;
use crate::errors::InstallError;
use crate::retry::{retry_notice, RetryBudget, Sleeper};
use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, Response, StatusCode};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;
use yst_common::warning_message;

const REDIRECT_STATUSES: [StatusCode; 5] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

enum Attempt {
    Complete(u64),
    Redirect(Url),
}

/// Fetches a single release asset onto disk.
///
/// Each attempt streams into a hidden temporary file next to the destination; the file only
/// replaces the destination after it has been flushed and closed, and is deleted whenever the
/// attempt fails, redirects, or is dropped.
pub struct Downloader {
    client: Client,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    max_redirects: u32,
    show_progress: bool,
    sleeper: Arc<dyn Sleeper>,
}

impl Downloader {
    pub fn new(config: &InstallerConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::none())
            .connect_timeout(config.download_timeout())
            .build()
            .context("Failed to build download client")?;

        Ok(Self {
            client,
            timeout: config.download_timeout(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            max_redirects: config.max_redirects,
            show_progress: true,
            sleeper,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Downloads `url` to `dest`, returning the number of bytes written.
    ///
    /// Redirects are followed up to the configured hop limit without spending retries.
    /// Connection failures and timeouts are retried from scratch; any other non-200 status
    /// fails immediately.
    pub async fn download(&self, url: &Url, dest: &Path) -> Result<u64, InstallError> {
        let mut current = url.clone();
        let mut redirects = 0u32;
        let mut budget = RetryBudget::new(self.retry_delay, self.max_retries);

        loop {
            let err = match self.attempt(&current, dest).await {
                Ok(Attempt::Complete(bytes)) => {
                    info!(url = %current, bytes, dest = %dest.display(), "download complete");
                    return Ok(bytes);
                }
                Ok(Attempt::Redirect(next)) => {
                    redirects += 1;
                    if redirects > self.max_redirects {
                        return Err(InstallError::TooManyRedirects {
                            url: url.clone(),
                            limit: self.max_redirects,
                        });
                    }
                    debug!(from = %current, to = %next, redirects, "following redirect");
                    current = next;
                    continue;
                }
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            let remaining = budget.remaining();
            let Some(delay) = budget.next_delay() else {
                return Err(err);
            };

            warn!(error = %err, remaining, "download attempt failed, retrying");
            warning_message!("{}", retry_notice("Download", &err, delay, remaining));
            self.sleeper.sleep(delay).await;
        }
    }

    async fn attempt(&self, url: &Url, dest: &Path) -> Result<Attempt, InstallError> {
        let dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let prefix = format!(
            ".{}.",
            dest.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        );

        let staging = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|err| InstallError::io("create temporary file in", dir, err))?;
        let (file, staging_path) = staging.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let response = self.send(url).await?;
        let status = response.status();

        if REDIRECT_STATUSES.contains(&status) {
            let next = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|location| url.join(location).ok())
                .ok_or_else(|| InstallError::InvalidRedirect { url: url.clone() })?;
            return Ok(Attempt::Redirect(next));
        }

        if status != StatusCode::OK {
            return Err(InstallError::HttpStatus {
                url: url.clone(),
                status,
            });
        }

        let progress = self.progress_bar(response.content_length());
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        loop {
            let chunk = match timeout(self.timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(err))) => {
                    progress.abandon();
                    return Err(InstallError::from_request(url, self.timeout, err));
                }
                Ok(None) => break,
                Err(_) => {
                    progress.abandon();
                    return Err(InstallError::Timeout {
                        url: url.clone(),
                        after: self.timeout,
                    });
                }
            };

            file.write_all(&chunk)
                .await
                .map_err(|err| InstallError::io("write", staging_path.to_path_buf(), err))?;
            written += chunk.len() as u64;
            progress.inc(chunk.len() as u64);
        }

        file.flush()
            .await
            .map_err(|err| InstallError::io("flush", staging_path.to_path_buf(), err))?;
        file.sync_all()
            .await
            .map_err(|err| InstallError::io("sync", staging_path.to_path_buf(), err))?;
        drop(file.into_std().await);

        staging_path
            .persist(dest)
            .map_err(|err| InstallError::io("move download into", dest, err.error))?;

        progress.finish_with_message("Download complete");
        Ok(Attempt::Complete(written))
    }

    async fn send(&self, url: &Url) -> Result<Response, InstallError> {
        match timeout(self.timeout, self.client.get(url.clone()).send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(InstallError::from_request(url, self.timeout, err)),
            Err(_) => Err(InstallError::Timeout {
                url: url.clone(),
                after: self.timeout,
            }),
        }
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pb
            }
            None => ProgressBar::new_spinner(),
        }
    }
}
