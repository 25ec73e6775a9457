// src/provision/platform.rs

use std::fmt;

use crate::errors::{Result, TunnelError};

/// Operating systems we can fetch binaries for, named the way the upstream
/// release assets name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

/// The `{os, arch}` pair selecting artifact URLs for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    /// Platform of the running process.
    pub fn detect() -> Result<Self> {
        Self::from_rust_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's `target_os` / `target_arch` names onto the supported set.
    ///
    /// Release-asset spellings (`darwin`, `amd64`, `arm64`) are accepted too.
    pub fn from_rust_names(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || TunnelError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let os_key = match os {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::Darwin,
            _ => return Err(unsupported()),
        };
        let arch_key = match arch {
            "x86_64" | "amd64" => Arch::Amd64,
            "aarch64" | "arm64" => Arch::Arm64,
            _ => return Err(unsupported()),
        };

        Ok(Self {
            os: os_key,
            arch: arch_key,
        })
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rust_names() {
        let p = PlatformKey::from_rust_names("macos", "aarch64").unwrap();
        assert_eq!(p.os, Os::Darwin);
        assert_eq!(p.arch, Arch::Arm64);
        assert_eq!(p.to_string(), "darwin/arm64");

        let p = PlatformKey::from_rust_names("linux", "x86_64").unwrap();
        assert_eq!(p.to_string(), "linux/amd64");
    }

    #[test]
    fn rejects_unsupported_os_and_arch() {
        match PlatformKey::from_rust_names("windows", "x86_64") {
            Err(TunnelError::UnsupportedPlatform { os, .. }) => assert_eq!(os, "windows"),
            other => panic!("expected UnsupportedPlatform, got {other:?}"),
        }
        assert!(matches!(
            PlatformKey::from_rust_names("linux", "riscv64"),
            Err(TunnelError::UnsupportedPlatform { .. })
        ));
    }
}
