use crate::config::InstallerConfig;
use crate::download::Downloader;
use crate::errors::InstallError;
use crate::release::{read_fallback_version, ResolvedVersion, VersionResolver, VersionSource};
use crate::retry::Sleeper;
use crate::utils::{format_size_mb, print_message, print_status, print_title, TagColor};
use anyhow::Result;
use colored::Colorize;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use yst_common::asset::{AssetDescriptor, ReleaseRepository, ReleaseVersion};
use yst_common::constants::{DATA_DIR_NAME, NPX_COMMAND};
use yst_common::layout::InstallLayout;
use yst_common::platform::{Os, PlatformTarget};
use yst_common::success_message;

/// Everything decided before any bytes are written.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub platform: PlatformTarget,
    pub version: ResolvedVersion,
    pub asset: AssetDescriptor,
    pub destination: PathBuf,
}

#[derive(Debug, Clone)]
pub struct InstalledBinary {
    pub path: PathBuf,
    pub size: u64,
    pub platform: PlatformTarget,
    pub version: ReleaseVersion,
    pub source: VersionSource,
}

/// A terminal installation error, together with the platform if it had been resolved.
#[derive(Debug)]
pub struct InstallFailure {
    pub error: InstallError,
    pub platform: Option<PlatformTarget>,
}

impl InstallFailure {
    fn new(error: impl Into<InstallError>, platform: Option<PlatformTarget>) -> Self {
        Self {
            error: error.into(),
            platform,
        }
    }
}

impl Display for InstallFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for InstallFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct Installer {
    config: InstallerConfig,
    layout: InstallLayout,
    repository: ReleaseRepository,
    resolver: VersionResolver,
    downloader: Downloader,
    platform: Option<PlatformTarget>,
}

impl Installer {
    pub fn new(config: InstallerConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        Ok(Self {
            layout: config.layout(),
            repository: config.repository()?,
            resolver: VersionResolver::new(&config, sleeper.clone())?,
            downloader: Downloader::new(&config, sleeper)?,
            config,
            platform: None,
        })
    }

    /// Installs for `platform` instead of the host.
    pub fn with_platform(mut self, platform: PlatformTarget) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.downloader = self.downloader.with_progress(show_progress);
        self
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn repository(&self) -> &ReleaseRepository {
        &self.repository
    }

    /// Resolves platform, version, and asset location. Only the platform step can fail.
    pub async fn plan(&self) -> Result<InstallPlan, InstallFailure> {
        let platform = match self.platform {
            Some(platform) => platform,
            None => PlatformTarget::resolve().map_err(|err| InstallFailure::new(err, None))?,
        };
        print_message("PLATFORM", &platform.to_string(), TagColor::Cyan);

        let fallback = read_fallback_version(
            &self.config.package_metadata_path(),
            &self.config.baseline_version(),
        );
        let version = self.resolver.resolve(&fallback).await;

        let asset = self.repository.locate(&platform, &version.version);
        let destination = self.layout.binary_path(&asset.local_file_name);

        Ok(InstallPlan {
            platform,
            version,
            asset,
            destination,
        })
    }

    /// Executes the full pipeline:
    /// - Resolves the platform and the release version
    /// - Downloads the release asset into `<root>/bin`
    /// - Marks it executable on POSIX hosts and checks it is not empty
    pub async fn run(&self) -> Result<InstalledBinary, InstallFailure> {
        let plan = self.plan().await?;
        let platform = plan.platform;
        let fail = |error: InstallError| InstallFailure::new(error, Some(platform));

        let bin_dir = self.layout.bin_dir();
        tokio::fs::create_dir_all(&bin_dir)
            .await
            .map_err(|err| fail(InstallError::io("create directory", &bin_dir, err)))?;

        print_message("DOWNLOADING", plan.asset.url.as_str(), TagColor::Blue);
        print_message(
            "TARGET",
            &plan.destination.display().to_string(),
            TagColor::Blue,
        );

        self.downloader
            .download(&plan.asset.url, &plan.destination)
            .await
            .map_err(fail)?;

        make_executable(&plan.destination).map_err(fail)?;
        let size = verify_artifact(&plan.destination).map_err(fail)?;

        info!(
            path = %plan.destination.display(),
            size,
            version = %plan.version.version,
            "installed binary"
        );

        Ok(InstalledBinary {
            path: plan.destination,
            size,
            platform,
            version: plan.version.version,
            source: plan.version.source,
        })
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, Permissions::from_mode(0o755))
        .map_err(|err| InstallError::io("set permissions on", path, err))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}

/// A zero-byte file is removed and reported; the HTTP layer does not catch that case.
fn verify_artifact(path: &Path) -> Result<u64, InstallError> {
    let metadata =
        std::fs::metadata(path).map_err(|err| InstallError::io("inspect", path, err))?;

    if metadata.len() == 0 {
        if let Err(err) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %err, "failed to remove empty download");
        }
        return Err(InstallError::EmptyArtifact {
            path: path.to_path_buf(),
        });
    }

    Ok(metadata.len())
}

pub fn print_summary(installed: &InstalledBinary) {
    success_message!("yst-mcp installed successfully!");
    print_status(
        "INFO",
        "Install path",
        &installed.path.display().to_string(),
        TagColor::Cyan,
    );
    print_status(
        "INFO",
        "File size",
        &format_size_mb(installed.size),
        TagColor::Cyan,
    );
    let source = match installed.source {
        VersionSource::Latest => "latest release",
        VersionSource::Fallback => "packaged fallback",
    };
    print_status(
        "INFO",
        "Version",
        &format!("{} ({source})", installed.version),
        TagColor::Cyan,
    );
}

pub fn print_next_steps(platform: &PlatformTarget) {
    print_title("Next Steps");

    if platform.os == Os::Windows {
        println!(
            "- {} the Playwright browser driver is required on first use.",
            "Windows users:".bold().yellow()
        );
        println!("  Run in PowerShell:\n");
        println!("  {}", "python -m pip install playwright".cyan());
        println!("  {}\n", "python -m playwright install chromium".cyan());
        println!(
            "  Python 3.10+ is required: {}\n",
            "https://www.python.org/downloads/".cyan()
        );
    } else {
        println!("- If the login browser does not open, install the Playwright driver:");
        println!(
            "  {}\n",
            "pip install playwright && playwright install chromium".cyan()
        );
    }

    println!("- Usage:");
    println!("  {}\n", NPX_COMMAND.cyan());

    println!("- Claude Desktop configuration:");
    println!(
        "  {}\n",
        r#"claude mcp add-json yst_mcp -s user '{"type":"stdio","command":"npx","args":["-y","@xuzan/yst-mcp"],"env":{}}'"#
            .cyan()
    );

    let data_root = dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("~").join(DATA_DIR_NAME));
    println!("- Data locations:");
    println!(
        "  {:<50} (login credentials)",
        data_root.join("data").join("cookies.json").display()
    );
    println!(
        "  {:<50} (browser session)",
        data_root.join("data").join("browser_profile").display()
    );
    println!("  {:<50} (report output)\n", data_root.join("output").display());
}
