use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use yst_common::{error_message, info_message};
use yst_installer::config::{ConfigLoader, InstallerConfig};
use yst_installer::installer::{print_next_steps, print_summary, InstallFailure, Installer};
use yst_installer::logging::setup_logging;
use yst_installer::report::print_failure;
use yst_installer::retry::TokioSleeper;
use yst_installer::sentry::Sentry;
use yst_installer::types::{InstallArgs, InstallerCli, InstallerCommand};
use yst_installer::utils::{print_banner, print_message, TagColor};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = InstallerCli::parse();

    // Returned rather than `process::exit`, so the guard flushes the log file on the way out.
    let _log_guard = match setup_logging(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            error_message!("Failed to set up logging: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let command = cli
        .command
        .unwrap_or_else(|| InstallerCommand::Install(InstallArgs::default()));

    match command {
        InstallerCommand::Install(args) => match run_install(&args).await {
            Ok(code) => code,
            Err(err) => {
                error_message!("{err:#}");
                ExitCode::FAILURE
            }
        },
        InstallerCommand::Locate(args) => match run_locate(&args).await {
            Ok(code) => code,
            Err(err) => {
                error_message!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn load_config(args: &InstallArgs) -> Result<InstallerConfig> {
    let mut config = ConfigLoader::load(args.root.as_deref())?;
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    Ok(config)
}

async fn run_install(args: &InstallArgs) -> Result<ExitCode> {
    print_banner();

    let config = load_config(args)?;
    let _sentry_guard = Sentry::setup(config.sentry_dsn.as_deref());
    let installer = Installer::new(config, Arc::new(TokioSleeper))?;

    // The run future is dropped before exiting so an in-flight temporary file is removed.
    let outcome = tokio::select! {
        result = installer.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(Ok(installed)) => {
            print_summary(&installed);
            print_next_steps(&installed.platform);
            Ok(ExitCode::SUCCESS)
        }
        Some(Err(failure)) => {
            report_failure(&installer, &failure);
            Ok(ExitCode::FAILURE)
        }
        None => {
            info!("installation cancelled");
            error_message!("Installation cancelled");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_failure(installer: &Installer, failure: &InstallFailure) {
    error!(error = %failure.error, platform = ?failure.platform, "installation failed");

    if let Some(platform) = &failure.platform {
        Sentry::add_tag("platform", &platform.to_string());
    }
    Sentry::capture_message(
        &format!("Installation failed: {}", failure.error),
        sentry::Level::Error,
    );

    print_failure(failure, installer.repository(), installer.layout());
}

async fn run_locate(args: &InstallArgs) -> Result<ExitCode> {
    let config = load_config(args)?;
    let installer = Installer::new(config, Arc::new(TokioSleeper))?.with_progress(false);

    let plan = match installer.plan().await {
        Ok(plan) => plan,
        Err(failure) => {
            print_failure(&failure, installer.repository(), installer.layout());
            return Ok(ExitCode::FAILURE);
        }
    };

    info_message!("Resolved install target:");
    print_message("ASSET", &plan.asset.asset_name, TagColor::Cyan);
    print_message("URL", plan.asset.url.as_str(), TagColor::Cyan);
    print_message(
        "DESTINATION",
        &plan.destination.display().to_string(),
        TagColor::Cyan,
    );
    Ok(ExitCode::SUCCESS)
}
