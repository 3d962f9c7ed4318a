//! x86 / x86_64 capability detection

#[cfg(target_arch = "x86")]
use std::arch::x86::{__cpuid, has_cpuid};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::__cpuid;
use std::fmt::{self, Display};

/// Instruction set extensions reported by the CPU (and enabled by the OS)
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Extensions {
    pub sse: bool,
    pub sse2: bool,
    pub sse3: bool,
    pub ssse3: bool,
    pub sse41: bool,
    pub sse42: bool,
    pub avx: bool,
    pub avx2: bool,
    pub avx512f: bool,
    pub avx512bw: bool,
    pub popcnt: bool,
    pub bmi: bool,
}

/// Capability snapshot for the x86 family
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// vendor id, e.g. `GenuineIntel`. empty when unavailable
    pub cpu_vendor: String,
    /// processor brand string. empty when unavailable
    pub cpu_brand: String,
    /// detected extensions
    pub extensions: Extensions,
}

impl SystemInfo {
    pub(super) fn detect() -> Self {
        #[cfg(target_arch = "x86")]
        {
            if !has_cpuid() {
                return Self::default();
            }
        }

        let (cpu_vendor, cpu_brand) = cpu_strings();

        let extensions = Extensions {
            sse: is_x86_feature_detected!("sse"),
            sse2: is_x86_feature_detected!("sse2"),
            sse3: is_x86_feature_detected!("sse3"),
            ssse3: is_x86_feature_detected!("ssse3"),
            sse41: is_x86_feature_detected!("sse4.1"),
            sse42: is_x86_feature_detected!("sse4.2"),
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
            avx512f: is_x86_feature_detected!("avx512f"),
            avx512bw: is_x86_feature_detected!("avx512bw"),
            popcnt: is_x86_feature_detected!("popcnt"),
            bmi: is_x86_feature_detected!("bmi1"),
        };

        Self {
            cpu_vendor,
            cpu_brand,
            extensions,
        }
    }
}

#[allow(unused_unsafe)]
fn cpu_strings() -> (String, String) {
    let to_string = |regs: &[u32]| {
        let bytes: Vec<u8> = regs.iter().flat_map(|r| r.to_le_bytes()).collect();
        String::from_utf8_lossy(&bytes)
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_owned()
    };

    // SAFETY: cpuid is available, checked by the caller on 32-bit targets
    let leaf0 = unsafe { __cpuid(0) };
    // vendor is stored in ebx, edx, ecx order
    let vendor = to_string(&[leaf0.ebx, leaf0.edx, leaf0.ecx]);

    // SAFETY: same as above
    let max_extended = unsafe { __cpuid(0x8000_0000) }.eax;
    let brand = if max_extended >= 0x8000_0004 {
        let regs: Vec<u32> = (0x8000_0002..=0x8000_0004)
            .flat_map(|leaf| {
                // SAFETY: leaf is within the reported extended range
                let r = unsafe { __cpuid(leaf) };
                [r.eax, r.ebx, r.ecx, r.edx]
            })
            .collect();

        to_string(&regs)
    } else {
        String::new()
    };

    (vendor, brand)
}

impl Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ext = &self.extensions;

        writeln!(f, "platform: x86")?;
        writeln!(f, "cpu_vendor: {}", self.cpu_vendor)?;
        writeln!(f, "cpu_brand: {}", self.cpu_brand)?;

        let flags = [
            ("sse", ext.sse),
            ("sse2", ext.sse2),
            ("sse3", ext.sse3),
            ("ssse3", ext.ssse3),
            ("sse41", ext.sse41),
            ("sse42", ext.sse42),
            ("avx", ext.avx),
            ("avx2", ext.avx2),
            ("avx512f", ext.avx512f),
            ("avx512bw", ext.avx512bw),
            ("popcnt", ext.popcnt),
            ("bmi", ext.bmi),
        ];

        for (name, present) in flags {
            writeln!(f, "{name}: {present}")?;
        }

        Ok(())
    }
}
