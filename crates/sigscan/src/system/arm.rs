//! ARM / AArch64 capability detection

use std::fmt::{self, Display};

/// Instruction set extensions reported by the OS
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Extensions {
    /// Advanced SIMD
    pub neon: bool,
}

/// Capability snapshot for the ARM family
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// detected extensions
    pub extensions: Extensions,
}

impl SystemInfo {
    pub(super) fn detect() -> Self {
        Self {
            extensions: Extensions {
                neon: detect_neon(),
            },
        }
    }
}

// on linux this reads the hwcap auxiliary vector
#[cfg(target_arch = "aarch64")]
fn detect_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

// runtime detection is unstable on 32-bit arm, so go by what the build targets
#[cfg(target_arch = "arm")]
fn detect_neon() -> bool {
    cfg!(target_feature = "neon")
}

impl Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "platform: arm")?;
        writeln!(f, "neon: {}", self.extensions.neon)
    }
}
