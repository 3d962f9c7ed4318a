//! SSE2 pattern scanning backend

#[cfg(target_arch = "x86")]
use std::arch::x86::{
    __m128i, _mm_and_si128, _mm_cmpeq_epi8, _mm_load_si128, _mm_loadu_si128, _mm_movemask_epi8,
    _mm_set1_epi8,
};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m128i, _mm_and_si128, _mm_cmpeq_epi8, _mm_load_si128, _mm_loadu_si128, _mm_movemask_epi8,
    _mm_set1_epi8,
};

use super::{vector::Vector, ScanFn};
use crate::scan::{Alignment, ScanContext};

impl Vector for __m128i {
    const BYTES: usize = 16;
    const STRIDE: u32 = 1;
    const FULL: u64 = 0xFFFF;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { _mm_loadu_si128(ptr.cast()) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm_load_si128(ptr.cast()) }
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        unsafe { _mm_and_si128(self, other) }
    }

    #[inline(always)]
    unsafe fn movemask_eq(self, other: Self) -> u64 {
        unsafe { _mm_movemask_epi8(_mm_cmpeq_epi8(self, other)) as u16 as u64 }
    }
}

/// Find the first occurrence of a pattern using SSE2 instructions
///
/// # Safety
///
/// * `begin..end` is a single readable range
///
/// * Currently running CPU supports SSE2
#[target_feature(enable = "sse2")]
unsafe fn find<const ALIGNED: bool, const PAIR: bool, const VECCMP: bool>(
    begin: *const u8,
    end: *const u8,
    context: &ScanContext<'_>,
) -> Option<*const u8> {
    // SAFETY: safe to call as long as the safety conditions were met for this function
    unsafe { super::vector::find::<__m128i, ALIGNED, PAIR, VECCMP>(begin, end, context) }
}

pub(super) fn resolve(alignment: Alignment, pair: bool, veccmp: bool) -> ScanFn {
    specialization!(find, alignment, pair, veccmp)
}
