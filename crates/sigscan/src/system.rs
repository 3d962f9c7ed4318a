//! Process-wide snapshot of the CPU's vector capabilities

#[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
mod arm;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

use std::sync::OnceLock;

#[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
pub use arm::{Extensions, SystemInfo};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use x86::{Extensions, SystemInfo};

static SYSTEM: OnceLock<SystemInfo> = OnceLock::new();

/// Get the capability snapshot of the running CPU
///
/// Detection runs on first access only. Every later call returns the same instance.
pub fn system() -> &'static SystemInfo {
    SYSTEM.get_or_init(|| {
        let info = SystemInfo::detect();
        tracing::debug!(%info, "detected cpu capabilities");
        info
    })
}

#[cfg(test)]
mod tests {
    use std::{ptr, thread};

    use super::*;

    #[test]
    fn snapshot_is_shared() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| system() as *const SystemInfo as usize))
            .collect();

        let first = system() as *const SystemInfo;
        for handle in handles {
            assert!(ptr::eq(handle.join().unwrap() as *const SystemInfo, first));
        }
    }

    #[test]
    fn display_lists_extensions() {
        let text = system().to_string();

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        assert!(text.contains("avx2:"));
        #[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
        assert!(text.contains("neon:"));
    }
}
