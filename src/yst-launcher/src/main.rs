use anyhow::{Context, Result};
use colored::Colorize;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use yst_common::constants::{NPX_COMMAND, TOOL_NAME};
use yst_common::error_message;
use yst_common::layout::{host_binary_file_name, InstallLayout};
use yst_launcher::{binary_path, launch, LaunchError};

const LOG_ENV_VAR: &str = "YST_LAUNCHER_LOG";

// stdout belongs to the child (an MCP stdio server); everything here goes to stderr.
fn main() {
    setup_logging();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    let path = match locate_binary() {
        Ok(path) => path,
        Err(err) => {
            error_message!("{err:#}");
            std::process::exit(1);
        }
    };

    match launch(&path, &args) {
        Ok(code) => std::process::exit(code),
        Err(err @ LaunchError::BinaryMissing { .. }) => {
            error_message!("{err}");
            eprintln!("Reinstall to download it again:");
            eprintln!("  {}", NPX_COMMAND.cyan());
            std::process::exit(1);
        }
        Err(err) => {
            error_message!("{err}");
            std::process::exit(1);
        }
    }
}

fn locate_binary() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the launcher executable")?;
    let launcher_dir = exe
        .parent()
        .context("Launcher executable has no parent directory")?;

    let layout = InstallLayout::from_env();
    Ok(binary_path(
        layout.as_ref(),
        launcher_dir,
        &host_binary_file_name(TOOL_NAME),
    ))
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
