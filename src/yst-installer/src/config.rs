use anyhow::{Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use yst_common::asset::{ReleaseRepository, ReleaseVersion};
use yst_common::constants::{
    BASELINE_VERSION, GITHUB_API_BASE, GITHUB_DOWNLOAD_BASE, INSTALLER_USER_AGENT, REPO_NAME,
    REPO_OWNER, TOOL_NAME,
};
use yst_common::layout::InstallLayout;

pub const CONFIG_FILE_NAME: &str = "yst-installer.toml";
pub const ENV_PREFIX: &str = "YST_INSTALLER";
pub const PACKAGE_METADATA_FILE_NAME: &str = "package.json";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct InstallerConfig {
    pub repo_owner: String,
    pub repo_name: String,
    pub tool_name: String,

    pub api_base: String,
    pub download_base: String,
    pub user_agent: String,

    pub metadata_timeout_ms: u64,
    pub download_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_redirects: u32,

    #[serde(default)]
    pub install_root: Option<PathBuf>,
    #[serde(default)]
    pub package_metadata: Option<PathBuf>,
    pub fallback_version: String,

    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            repo_owner: REPO_OWNER.to_string(),
            repo_name: REPO_NAME.to_string(),
            tool_name: TOOL_NAME.to_string(),

            api_base: GITHUB_API_BASE.to_string(),
            download_base: GITHUB_DOWNLOAD_BASE.to_string(),
            user_agent: INSTALLER_USER_AGENT.to_string(),

            metadata_timeout_ms: 10_000,
            download_timeout_ms: 60_000,
            max_retries: 3,
            retry_delay_ms: 2_000,
            max_redirects: 5,

            install_root: None,
            package_metadata: None,
            fallback_version: BASELINE_VERSION.to_string(),

            sentry_dsn: None,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Layers hardcoded defaults, an optional `yst-installer.toml` in the install root, and
    /// `YST_INSTALLER_*` environment variables, in that order of precedence.
    pub fn load(root: Option<&Path>) -> Result<InstallerConfig> {
        let defaults = InstallerConfig::default();
        let mut builder = RConfig::builder();

        builder = builder
            .set_default("repo_owner", defaults.repo_owner)?
            .set_default("repo_name", defaults.repo_name)?
            .set_default("tool_name", defaults.tool_name)?
            .set_default("api_base", defaults.api_base)?
            .set_default("download_base", defaults.download_base)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("metadata_timeout_ms", defaults.metadata_timeout_ms as i64)?
            .set_default("download_timeout_ms", defaults.download_timeout_ms as i64)?
            .set_default("max_retries", defaults.max_retries as i64)?
            .set_default("retry_delay_ms", defaults.retry_delay_ms as i64)?
            .set_default("max_redirects", defaults.max_redirects as i64)?
            .set_default("fallback_version", defaults.fallback_version)?;

        let root = root
            .map(Path::to_path_buf)
            .or_else(|| InstallLayout::from_env().map(|layout| layout.root().to_path_buf()))
            .unwrap_or_else(InstallLayout::default_root);
        let config_file = root.join(CONFIG_FILE_NAME);

        builder = builder
            .add_source(
                File::from(config_file.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let mut config: InstallerConfig = builder
            .build()?
            .try_deserialize()
            .with_context(|| format!("failed to parse config ({})", config_file.display()))?;

        if config.install_root.is_none() {
            config.install_root = Some(root);
        }

        Ok(config)
    }
}

impl InstallerConfig {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn layout(&self) -> InstallLayout {
        match &self.install_root {
            Some(root) => InstallLayout::new(root),
            None => InstallLayout::new(InstallLayout::default_root()),
        }
    }

    pub fn repository(&self) -> Result<ReleaseRepository> {
        ReleaseRepository::new(
            &self.repo_owner,
            &self.repo_name,
            &self.tool_name,
            &self.download_base,
        )
    }

    /// `<api-base>/repos/<owner>/<repo>/releases/latest`
    pub fn latest_release_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot carry a path: {}", self.api_base))?
            .pop_if_empty()
            .extend([
                "repos",
                self.repo_owner.as_str(),
                self.repo_name.as_str(),
                "releases",
                "latest",
            ]);
        Ok(url)
    }

    pub fn package_metadata_path(&self) -> PathBuf {
        self.package_metadata
            .clone()
            .unwrap_or_else(|| self.layout().root().join(PACKAGE_METADATA_FILE_NAME))
    }

    pub fn baseline_version(&self) -> ReleaseVersion {
        ReleaseVersion::new(self.fallback_version.as_str())
    }
}
