//! NEON pattern scanning backend

use std::arch::aarch64::{
    uint8x16_t, vandq_u8, vceqq_u8, vdupq_n_u8, vget_lane_u64, vld1q_u8, vreinterpret_u64_u8,
    vreinterpretq_u16_u8, vshrn_n_u16,
};

use super::{vector::Vector, ScanFn};
use crate::scan::{Alignment, ScanContext};

impl Vector for uint8x16_t {
    const BYTES: usize = 16;
    // neon has no movemask; the narrowing shift below leaves 4 bits per lane
    const STRIDE: u32 = 4;
    const FULL: u64 = 0x1111_1111_1111_1111;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { vdupq_n_u8(byte) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { vld1q_u8(ptr) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { vld1q_u8(ptr) }
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        unsafe { vandq_u8(self, other) }
    }

    #[inline(always)]
    unsafe fn movemask_eq(self, other: Self) -> u64 {
        unsafe {
            let eq = vceqq_u8(self, other);
            // lane i ends up in bits 4i..4i + 4, keep the lowest of them
            let narrowed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(eq));
            vget_lane_u64::<0>(vreinterpret_u64_u8(narrowed)) & Self::FULL
        }
    }
}

/// Find the first occurrence of a pattern using NEON instructions
///
/// # Safety
///
/// * `begin..end` is a single readable range
///
/// * Currently running CPU supports NEON
#[target_feature(enable = "neon")]
unsafe fn find<const ALIGNED: bool, const PAIR: bool, const VECCMP: bool>(
    begin: *const u8,
    end: *const u8,
    context: &ScanContext<'_>,
) -> Option<*const u8> {
    // SAFETY: this function is only called if the CPU supports NEON
    unsafe { super::vector::find::<uint8x16_t, ALIGNED, PAIR, VECCMP>(begin, end, context) }
}

pub(super) fn resolve(alignment: Alignment, pair: bool, veccmp: bool) -> ScanFn {
    specialization!(find, alignment, pair, veccmp)
}
