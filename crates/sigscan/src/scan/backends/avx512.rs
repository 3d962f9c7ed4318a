//! AVX-512 pattern scanning backend

#[cfg(target_arch = "x86")]
use std::arch::x86::{
    __m512i, _mm512_and_si512, _mm512_cmpeq_epi8_mask, _mm512_load_si512, _mm512_loadu_si512,
    _mm512_set1_epi8,
};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m512i, _mm512_and_si512, _mm512_cmpeq_epi8_mask, _mm512_load_si512, _mm512_loadu_si512,
    _mm512_set1_epi8,
};

use super::{vector::Vector, ScanFn};
use crate::scan::{Alignment, ScanContext};

impl Vector for __m512i {
    const BYTES: usize = 64;
    const STRIDE: u32 = 1;
    const FULL: u64 = u64::MAX;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm512_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { _mm512_loadu_si512(ptr.cast()) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm512_load_si512(ptr.cast()) }
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        unsafe { _mm512_and_si512(self, other) }
    }

    // the compare writes a mask register directly, no movemask needed
    #[inline(always)]
    unsafe fn movemask_eq(self, other: Self) -> u64 {
        unsafe { _mm512_cmpeq_epi8_mask(self, other) }
    }
}

/// Find the first occurrence of a pattern using AVX-512 instructions
///
/// # Safety
///
/// * `begin..end` is a single readable range
///
/// * Currently running CPU supports AVX-512F and AVX-512BW
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn find<const ALIGNED: bool, const PAIR: bool, const VECCMP: bool>(
    begin: *const u8,
    end: *const u8,
    context: &ScanContext<'_>,
) -> Option<*const u8> {
    // SAFETY: this function is only called if the CPU supports AVX-512F and AVX-512BW
    unsafe { super::vector::find::<__m512i, ALIGNED, PAIR, VECCMP>(begin, end, context) }
}

pub(super) fn resolve(alignment: Alignment, pair: bool, veccmp: bool) -> ScanFn {
    specialization!(find, alignment, pair, veccmp)
}
