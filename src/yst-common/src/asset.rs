use crate::layout::binary_file_name;
use crate::platform::PlatformTarget;
use anyhow::{ensure, Context, Result};
use std::fmt::{self, Display, Formatter};
use url::Url;

/// A release tag such as `v1.4.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Turns a bare package version (`1.4.0`) into a release tag (`v1.4.0`).
    pub fn from_package_version(version: &str) -> Self {
        let version = version.trim();
        if version.starts_with('v') {
            Self(version.to_string())
        } else {
            Self(format!("v{version}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ReleaseVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReleaseVersion {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Where a single platform build of a release lives and what it is called once installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub url: Url,
    pub asset_name: String,
    pub local_file_name: String,
}

/// Identity of the repository whose releases carry the wrapped binary.
#[derive(Debug, Clone)]
pub struct ReleaseRepository {
    owner: String,
    name: String,
    tool_name: String,
    download_base: Url,
}

impl ReleaseRepository {
    pub fn new(owner: &str, name: &str, tool_name: &str, download_base: &str) -> Result<Self> {
        let download_base = Url::parse(download_base)
            .with_context(|| format!("Invalid download base URL: {download_base}"))?;
        ensure!(
            !download_base.cannot_be_a_base(),
            "Download base URL cannot carry a path: {download_base}"
        );

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            tool_name: tool_name.to_string(),
            download_base,
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// `<tool>_<os>_<arch>`, with `.exe` appended for Windows only.
    pub fn asset_name(&self, target: &PlatformTarget) -> String {
        let suffix = if target.os.is_windows() { ".exe" } else { "" };
        format!("{}_{}_{}{}", self.tool_name, target.os, target.arch, suffix)
    }

    pub fn locate(&self, target: &PlatformTarget, version: &ReleaseVersion) -> AssetDescriptor {
        let asset_name = self.asset_name(target);
        let url = self.repo_url(&["releases", "download", version.as_str(), &asset_name]);

        AssetDescriptor {
            url,
            asset_name,
            local_file_name: binary_file_name(&self.tool_name, target.os),
        }
    }

    /// The human-facing listing of the newest release.
    pub fn releases_page(&self) -> Url {
        self.repo_url(&["releases", "latest"])
    }

    fn repo_url(&self, tail: &[&str]) -> Url {
        let mut url = self.download_base.clone();
        // cannot fail: `new` rejects cannot-be-a-base URLs
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([self.owner.as_str(), self.name.as_str()])
                .extend(tail);
        }
        url
    }
}
