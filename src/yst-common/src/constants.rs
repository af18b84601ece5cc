pub const REPO_OWNER: &str = "Xuzan9396";
pub const REPO_NAME: &str = "yst_mcp";
pub const TOOL_NAME: &str = "yst_mcp";

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const GITHUB_DOWNLOAD_BASE: &str = "https://github.com";
pub const INSTALLER_USER_AGENT: &str = "yst-mcp-installer";

/// Used when neither the release API nor the packaged metadata yields a version.
pub const BASELINE_VERSION: &str = "v1.0.0";

/// Overrides the install root for both the installer and the launcher.
pub const INSTALL_ROOT_ENV_VAR: &str = "YST_INSTALLER_INSTALL_ROOT";

/// Directory under the user's home that the wrapped binary keeps its state in.
pub const DATA_DIR_NAME: &str = ".yst_mcp";

/// Fallback install root name under the platform data directory.
pub const DEFAULT_ROOT_DIR_NAME: &str = "yst-mcp";

pub const NPX_COMMAND: &str = "npx -y @xuzan/yst-mcp";
