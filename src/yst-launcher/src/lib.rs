//! Locates the installed `yst_mcp` binary and runs it in place of the launcher process.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;
use yst_common::layout::InstallLayout;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("yst_mcp binary not found at {}", path.display())]
    BinaryMissing { path: PathBuf },

    #[error("Failed to start {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the binary is expected: `<root>/bin` when an install root is configured, otherwise
/// next to the launcher itself.
pub fn binary_path(layout: Option<&InstallLayout>, launcher_dir: &Path, file_name: &str) -> PathBuf {
    match layout {
        Some(layout) => layout.binary_path(file_name),
        None => launcher_dir.join(file_name),
    }
}

/// Maps a child's exit status onto the launcher's own exit code. A child killed by a signal
/// yields `128 + signal`, as a shell reports it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Runs `path` with `args`, inheriting stdio and environment, and waits for it to exit.
pub fn launch(path: &Path, args: &[OsString]) -> Result<i32, LaunchError> {
    if !path.is_file() {
        return Err(LaunchError::BinaryMissing {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), args = args.len(), "spawning");

    let status = Command::new(path)
        .args(args)
        .status()
        .map_err(|source| LaunchError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(?status, "child exited");
    Ok(exit_code(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_binary_next_to_launcher() {
        let path = binary_path(None, Path::new("/opt/yst/bin"), "yst_mcp");
        assert_eq!(path, PathBuf::from("/opt/yst/bin/yst_mcp"));
    }

    #[test]
    fn test_binary_under_configured_root() {
        let layout = InstallLayout::new("/srv/yst");
        let path = binary_path(Some(&layout), Path::new("/opt/yst/bin"), "yst_mcp");
        assert_eq!(path, PathBuf::from("/srv/yst/bin/yst_mcp"));
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yst_mcp");

        let err = launch(&path, &[]).unwrap_err();
        assert!(matches!(err, LaunchError::BinaryMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_forwarding() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        // wait(2) encoding: exit code in the high byte
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // SIGTERM
        assert_eq!(exit_code(ExitStatus::from_raw(15)), 143);
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_forwards_arguments() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yst_mcp");
        std::fs::write(&path, "#!/bin/sh\n[ \"$1\" = \"--stdio\" ] && exit 4\nexit 9\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(launch(&path, &["--stdio".into()]).unwrap(), 4);
        assert_eq!(launch(&path, &[]).unwrap(), 9);
    }
}
