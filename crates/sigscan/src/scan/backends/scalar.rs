//! Scalar pattern scanning backend

use std::slice;

use crate::{scan::ScanContext, signature::Signature};

/// Find the first occurrence of the context's signature in `[begin, end)`
/// one byte at a time
///
/// Only candidates whose whole signature fits before `end` are considered.
///
/// # Safety
///
/// * `begin..end` is a single readable range
pub unsafe fn find(
    begin: *const u8,
    end: *const u8,
    context: &ScanContext<'_>,
) -> Option<*const u8> {
    let signature = context.signature();
    let size = end.addr() - begin.addr();

    let last = size.checked_sub(signature.len())?;
    let stride = context.alignment().stride();
    let anchor = context.anchor();
    let anchor_byte = context.anchor_byte();

    let mut offset = (stride - begin.addr() % stride) % stride;

    while offset <= last {
        // SAFETY: offset <= size - len, so the whole candidate is in range
        unsafe {
            let candidate = begin.add(offset);

            if *candidate.add(anchor) == anchor_byte && matches(candidate, signature) {
                return Some(candidate);
            }
        }

        offset += stride;
    }

    None
}

/// Check the full signature at `candidate`
///
/// # Safety
///
/// * `candidate` is readable for `signature.len()` bytes
#[inline]
pub unsafe fn matches(candidate: *const u8, signature: &Signature) -> bool {
    // SAFETY: upheld by the caller
    let data = unsafe { slice::from_raw_parts(candidate, signature.len()) };
    signature.matches(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Alignment;

    fn scan(data: &[u8], pattern: &str, alignment: Alignment) -> Option<usize> {
        let signature = Signature::parse(pattern).unwrap();
        let context = ScanContext::new(&signature, alignment);
        let range = data.as_ptr_range();

        // SAFETY: slice range is readable
        unsafe { find(range.start, range.end, &context) }.map(|p| p.addr() - range.start.addr())
    }

    #[test]
    fn finds_first() {
        let data = [0x10, 0x22, 0x33, 0x22, 0x99];
        assert_eq!(scan(&data, "22 ??", Alignment::X1), Some(1));
        assert_eq!(scan(&data, "?? 99", Alignment::X1), Some(3));
        assert_eq!(scan(&data, "22 99", Alignment::X1), Some(3));
        assert_eq!(scan(&data, "22 10", Alignment::X1), None);
    }

    #[test]
    fn signature_longer_than_range() {
        assert_eq!(scan(&[0x22], "22 ??", Alignment::X1), None);
        assert_eq!(scan(&[], "22", Alignment::X1), None);
    }

    #[test]
    fn trailing_wildcard_must_fit() {
        let data = [0x00, 0x00, 0x22];
        assert_eq!(scan(&data, "22 ??", Alignment::X1), None);
    }

    #[repr(C, align(16))]
    struct Aligned([u8; 48]);

    #[test]
    fn honors_alignment() {
        let mut buf = Aligned([0; 48]);
        buf.0[5] = 0xAB;
        buf.0[32] = 0xAB;

        assert_eq!(scan(&buf.0, "AB", Alignment::X1), Some(5));
        assert_eq!(scan(&buf.0, "AB", Alignment::X16), Some(32));
        assert_eq!(scan(&buf.0[1..], "AB", Alignment::X16), Some(31));
    }
}
