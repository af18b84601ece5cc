use crate::constants::{DEFAULT_ROOT_DIR_NAME, INSTALL_ROOT_ENV_VAR};
use crate::platform::Os;
use std::path::{Path, PathBuf};

/// `<tool>` on POSIX, `<tool>.exe` on Windows.
pub fn binary_file_name(tool_name: &str, os: Os) -> String {
    if os.is_windows() {
        format!("{tool_name}.exe")
    } else {
        tool_name.to_string()
    }
}

/// Binary file name for the host, without requiring the host to be a supported target.
pub fn host_binary_file_name(tool_name: &str) -> String {
    if cfg!(windows) {
        format!("{tool_name}.exe")
    } else {
        tool_name.to_string()
    }
}

/// Fixed on-disk layout of an installation: `<root>/bin/<binary>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var_os(INSTALL_ROOT_ENV_VAR)
            .filter(|root| !root.is_empty())
            .map(Self::new)
    }

    /// The package root the running executable belongs to, i.e. the parent of the directory
    /// holding it. Falls back to a directory under the platform data dir.
    pub fn default_root() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(DEFAULT_ROOT_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn binary_path(&self, file_name: &str) -> PathBuf {
        self.bin_dir().join(file_name)
    }
}
