pub mod config;
pub mod download;
pub mod errors;
pub mod installer;
pub mod logging;
pub mod release;
pub mod report;
pub mod retry;
pub mod sentry;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, InstallerConfig};
pub use errors::InstallError;
pub use installer::{InstallFailure, InstalledBinary, Installer};
