use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "yst-installer",
    version,
    about = "Downloads and installs the yst_mcp binary"
)]
pub struct InstallerCli {
    #[command(subcommand)]
    pub command: Option<InstallerCommand>,

    /// Print debug diagnostics to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Also write diagnostics to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum InstallerCommand {
    /// Download the latest release for this platform into `<root>/bin` (default)
    Install(InstallArgs),
    /// Print the platform, release, and download URL that `install` would use
    Locate(InstallArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct InstallArgs {
    /// Package root; the binary is installed to `<root>/bin`
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Retries for transient network failures
    #[arg(long)]
    pub retries: Option<u32>,
}
