//! The vectorized search shared by every SIMD backend

use super::{scalar, segment_scan};
use crate::scan::ScanContext;

/// Operations a SIMD register type needs for the search
///
/// Every method is `#[inline(always)]` in the implementations so it gets
/// compiled with the `target_feature`s of the backend function calling it.
pub(super) trait Vector: Copy {
    /// lanes (bytes) per vector
    const BYTES: usize;
    /// bits per lane in a [`Vector::movemask_eq`] result. only the lowest one is ever set
    const STRIDE: u32;
    /// [`Vector::movemask_eq`] result when every lane matched
    const FULL: u64;

    unsafe fn splat(byte: u8) -> Self;
    unsafe fn load_unaligned(ptr: *const u8) -> Self;
    unsafe fn load_aligned(ptr: *const u8) -> Self;
    unsafe fn and(self, other: Self) -> Self;
    /// Compare lanes for equality and compress the result into a bitmask
    unsafe fn movemask_eq(self, other: Self) -> u64;
}

/// Bitmask of the lanes a match may start at under `stride` alignment
#[inline(always)]
fn lane_mask<V: Vector>(stride: usize) -> u64 {
    (0..V::BYTES)
        .step_by(stride)
        .fold(0, |mask, lane| mask | 1u64 << (lane as u32 * V::STRIDE))
}

/// Find the first occurrence of the context's signature in `[begin, end)`
///
/// * `ALIGNED` - filter candidates with the alignment lane mask
/// * `PAIR` - also filter on the element after the anchor
/// * `VECCMP` - the signature fits in one vector and is verified with one compare
///
/// # Safety
///
/// * `begin..end` is a single readable range
///
/// * The running cpu supports the instructions `V` is implemented with
#[inline(always)]
pub(super) unsafe fn find<V: Vector, const ALIGNED: bool, const PAIR: bool, const VECCMP: bool>(
    begin: *const u8,
    end: *const u8,
    context: &ScanContext<'_>,
) -> Option<*const u8> {
    let signature = context.signature();
    let anchor = context.anchor();

    // SAFETY: instruction support is upheld by the caller, all loads stay
    // within the segments computed for this vector width
    unsafe {
        let first = V::splat(context.anchor_byte());
        let second = if PAIR {
            V::splat(context.pair_byte())
        } else {
            first
        };

        let (bytes, mask) = if VECCMP {
            let block = context.verify_block();
            (
                V::load_aligned(block.bytes.0.as_ptr()),
                V::load_aligned(block.mask.0.as_ptr()),
            )
        } else {
            (first, first)
        };

        let lanes = lane_mask::<V>(context.alignment().stride());

        let segments = segment_scan(begin, end, signature.len(), V::BYTES, VECCMP);

        if let Some(found) = scalar::find(segments.head.start, segments.head.end, context) {
            return Some(found);
        }

        let mut chunk = segments.body.start;
        while chunk < segments.body.end {
            let mut hits = V::load_unaligned(chunk.add(anchor)).movemask_eq(first);

            if ALIGNED {
                hits &= lanes;
            } else if PAIR {
                hits &= V::load_unaligned(chunk.add(anchor + 1)).movemask_eq(second);
            }

            while hits != 0 {
                let lane = (hits.trailing_zeros() / V::STRIDE) as usize;
                let candidate = chunk.add(lane);

                let found = if VECCMP {
                    // wildcards are zero in both mask and bytes
                    V::load_unaligned(candidate).and(mask).movemask_eq(bytes) == V::FULL
                } else {
                    scalar::matches(candidate, signature)
                };

                if found {
                    return Some(candidate);
                }

                hits &= hits - 1;
            }

            chunk = chunk.add(V::BYTES);
        }

        scalar::find(segments.tail.start, segments.tail.end, context)
    }
}
