use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }
}

impl Display for Os {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl Display for Arch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("Unsupported operating system: {0}")]
    UnsupportedPlatform(String),
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),
}

/// The operating system and CPU architecture pair used to name release assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Classifies the host this binary was built for.
    pub fn resolve() -> Result<Self, PlatformError> {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps raw `std::env::consts` identifiers onto release naming. Unknown values are
    /// returned verbatim in the error so they can be reported.
    pub fn from_raw(raw_os: &str, raw_arch: &str) -> Result<Self, PlatformError> {
        let os = match raw_os {
            "macos" => Os::Darwin,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            other => return Err(PlatformError::UnsupportedPlatform(other.to_string())),
        };

        let arch = match raw_arch {
            "x86_64" => Arch::Amd64,
            "aarch64" => Arch::Arm64,
            other => return Err(PlatformError::UnsupportedArchitecture(other.to_string())),
        };

        Ok(Self { os, arch })
    }
}

impl Display for PlatformTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::macos_intel("macos", "x86_64", Os::Darwin, Arch::Amd64)]
    #[case::macos_apple_silicon("macos", "aarch64", Os::Darwin, Arch::Arm64)]
    #[case::linux_amd64("linux", "x86_64", Os::Linux, Arch::Amd64)]
    #[case::linux_arm64("linux", "aarch64", Os::Linux, Arch::Arm64)]
    #[case::windows_amd64("windows", "x86_64", Os::Windows, Arch::Amd64)]
    #[case::windows_arm64("windows", "aarch64", Os::Windows, Arch::Arm64)]
    fn test_supported_pairs(
        #[case] raw_os: &str,
        #[case] raw_arch: &str,
        #[case] os: Os,
        #[case] arch: Arch,
    ) {
        let target = PlatformTarget::from_raw(raw_os, raw_arch).unwrap();
        assert_eq!(target, PlatformTarget::new(os, arch));
    }

    #[rstest]
    #[case::freebsd("freebsd", "x86_64")]
    #[case::android("android", "aarch64")]
    #[case::empty("", "x86_64")]
    fn test_unsupported_os(#[case] raw_os: &str, #[case] raw_arch: &str) {
        assert_eq!(
            PlatformTarget::from_raw(raw_os, raw_arch),
            Err(PlatformError::UnsupportedPlatform(raw_os.to_string()))
        );
    }

    #[rstest]
    #[case::x86("linux", "x86")]
    #[case::arm32("linux", "arm")]
    #[case::riscv("macos", "riscv64")]
    fn test_unsupported_arch(#[case] raw_os: &str, #[case] raw_arch: &str) {
        assert_eq!(
            PlatformTarget::from_raw(raw_os, raw_arch),
            Err(PlatformError::UnsupportedArchitecture(raw_arch.to_string()))
        );
    }

    #[test]
    fn test_unsupported_os_is_reported_before_arch() {
        let err = PlatformTarget::from_raw("plan9", "mips").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operating system: plan9");
    }

    #[test]
    fn test_display_uses_release_identifiers() {
        let target = PlatformTarget::new(Os::Darwin, Arch::Arm64);
        assert_eq!(target.to_string(), "darwin arm64");
    }
}
