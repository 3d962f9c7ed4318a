//! Backend selection and range segmentation

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Alignment, ScanContext};
use crate::{options::Backends, system::SystemInfo};

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
/// Map an (alignment, pair anchor, vector verification) triple to one
/// compiled specialization of a backend's `find`
macro_rules! specialization {
    ($find:ident, $alignment:expr, $pair:expr, $veccmp:expr) => {{
        let scanner: $crate::scan::backends::ScanFn = match ($alignment, $pair, $veccmp) {
            ($crate::scan::Alignment::X1, true, true) => $find::<false, true, true>,
            ($crate::scan::Alignment::X1, true, false) => $find::<false, true, false>,
            ($crate::scan::Alignment::X1, false, true) => $find::<false, false, true>,
            ($crate::scan::Alignment::X1, false, false) => $find::<false, false, false>,
            ($crate::scan::Alignment::X16, _, true) => $find::<true, false, true>,
            ($crate::scan::Alignment::X16, _, false) => $find::<true, false, false>,
        };

        scanner
    }};
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx2;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx512;
#[cfg(target_arch = "aarch64")]
mod neon;
pub(crate) mod scalar;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod sse;
#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
mod vector;

/// A scanning routine
///
/// # Safety
/// `begin..end` must be readable and the cpu must support the routine's instructions
pub(crate) type ScanFn =
    for<'c, 's> unsafe fn(*const u8, *const u8, &'c ScanContext<'s>) -> Option<*const u8>;

/// Instruction set used by a scan
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanMode {
    /// byte by byte
    Single,
    /// 16 byte SSE2 vectors
    Sse,
    /// 32 byte AVX2 vectors
    Avx2,
    /// 64 byte AVX-512 (F + BW) vectors
    Avx512,
    /// 16 byte NEON vectors
    Neon,
}

impl ScanMode {
    /// Bytes compared per step
    pub const fn vector_size(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Sse | Self::Neon => 16,
            Self::Avx2 => 32,
            Self::Avx512 => 64,
        }
    }

    /// Whether this mode is compiled in and the cpu supports it
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    pub fn is_supported(self, info: &SystemInfo) -> bool {
        let ext = &info.extensions;

        match self {
            Self::Single => true,
            Self::Sse => ext.sse2,
            Self::Avx2 => ext.avx2,
            Self::Avx512 => ext.avx512f && ext.avx512bw,
            Self::Neon => false,
        }
    }

    /// Whether this mode is compiled in and the cpu supports it
    #[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
    pub fn is_supported(self, info: &SystemInfo) -> bool {
        match self {
            Self::Single => true,
            Self::Neon => cfg!(target_arch = "aarch64") && info.extensions.neon,
            Self::Sse | Self::Avx2 | Self::Avx512 => false,
        }
    }
}

/// Widest first
const PRECEDENCE: [ScanMode; 4] = [
    ScanMode::Avx512,
    ScanMode::Avx2,
    ScanMode::Sse,
    ScanMode::Neon,
];

/// Pick the widest allowed mode the cpu supports, falling back to [`ScanMode::Single`]
pub(crate) fn select(info: &SystemInfo, backends: &Backends) -> ScanMode {
    let mode = PRECEDENCE
        .into_iter()
        .find(|&mode| backends.allows(mode) && mode.is_supported(info))
        .unwrap_or(ScanMode::Single);

    debug!(%mode, "selected scan backend");

    mode
}

/// Get the routine for `mode` specialized to the context's configuration
// 32-bit arm only has the scalar routine, which needs none of the flags
#[cfg_attr(target_arch = "arm", allow(unused_variables))]
pub(crate) fn resolve(mode: ScanMode, alignment: Alignment, pair: bool, veccmp: bool) -> ScanFn {
    match mode {
        ScanMode::Single => scalar::find,
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        ScanMode::Sse => sse::resolve(alignment, pair, veccmp),
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        ScanMode::Avx2 => avx2::resolve(alignment, pair, veccmp),
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        ScanMode::Avx512 => avx512::resolve(alignment, pair, veccmp),
        #[cfg(target_arch = "aarch64")]
        ScanMode::Neon => neon::resolve(alignment, pair, veccmp),
        // not compiled for this architecture
        _ => scalar::find,
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
/// A scan range split so full-width vector loads never leave it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segments {
    /// memory for the candidates before the first chunk
    pub(crate) head: Range<*const u8>,
    /// chunk base addresses, `width` apart
    pub(crate) body: Range<*const u8>,
    /// memory for the candidates after the last chunk
    pub(crate) tail: Range<*const u8>,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
/// Split `[begin, end)` for `width` byte vectors
///
/// Body chunks start at `width` aligned addresses. A chunk at `p` covers the
/// candidates `p..p + width`, and reads at most `p + access` where `access`
/// accounts for the anchor loads and the verification of the last lane.
/// Every candidate belongs to exactly one segment.
///
/// # Safety
/// `begin..end` must be a single range (pointer arithmetic stays in bounds)
pub(crate) unsafe fn segment_scan(
    begin: *const u8,
    end: *const u8,
    signature_len: usize,
    width: usize,
    veccmp: bool,
) -> Segments {
    let len = end.addr() - begin.addr();
    let access = if veccmp {
        2 * width - 1
    } else {
        width - 1 + signature_len
    };

    let lead = (width - begin.addr() % width) % width;

    if len < lead + access {
        return Segments {
            head: begin..end,
            body: end..end,
            tail: end..end,
        };
    }

    let chunks = (len - lead - access) / width + 1;

    // SAFETY: every offset is at most len
    unsafe {
        let body_start = begin.add(lead);
        let body_end = body_start.add(chunks * width);
        // head matches may run into body memory, but not past end
        let head_end = begin.add((lead + signature_len - 1).min(len));

        Segments {
            head: begin..head_end,
            body: body_start..body_end,
            tail: body_end..end,
        }
    }
}
