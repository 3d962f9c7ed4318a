//! AVX2 pattern scanning backend

#[cfg(target_arch = "x86")]
use std::arch::x86::{
    __m256i, _mm256_and_si256, _mm256_cmpeq_epi8, _mm256_load_si256, _mm256_loadu_si256,
    _mm256_movemask_epi8, _mm256_set1_epi8,
};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m256i, _mm256_and_si256, _mm256_cmpeq_epi8, _mm256_load_si256, _mm256_loadu_si256,
    _mm256_movemask_epi8, _mm256_set1_epi8,
};

use super::{vector::Vector, ScanFn};
use crate::scan::{Alignment, ScanContext};

impl Vector for __m256i {
    const BYTES: usize = 32;
    const STRIDE: u32 = 1;
    const FULL: u64 = 0xFFFF_FFFF;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm256_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { _mm256_loadu_si256(ptr.cast()) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm256_load_si256(ptr.cast()) }
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        unsafe { _mm256_and_si256(self, other) }
    }

    #[inline(always)]
    unsafe fn movemask_eq(self, other: Self) -> u64 {
        unsafe { _mm256_movemask_epi8(_mm256_cmpeq_epi8(self, other)) as u32 as u64 }
    }
}

/// Find the first occurrence of a pattern using AVX2 instructions
///
/// # Safety
///
/// * `begin..end` is a single readable range
///
/// * Currently running CPU supports AVX2
#[target_feature(enable = "avx2")]
unsafe fn find<const ALIGNED: bool, const PAIR: bool, const VECCMP: bool>(
    begin: *const u8,
    end: *const u8,
    context: &ScanContext<'_>,
) -> Option<*const u8> {
    // SAFETY: this function is only called if the CPU supports AVX2
    unsafe { super::vector::find::<__m256i, ALIGNED, PAIR, VECCMP>(begin, end, context) }
}

pub(super) fn resolve(alignment: Alignment, pair: bool, veccmp: bool) -> ScanFn {
    specialization!(find, alignment, pair, veccmp)
}
