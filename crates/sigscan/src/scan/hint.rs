//! Anchor selection for x86-64 machine code

use crate::signature::Signature;

/// Bytes frequently seen in x86-64 code, most frequent first
const COMMON_X86_64: [u8; 32] = [
    0x00, 0xFF, 0x48, 0x89, 0x8B, 0x24, 0x0F, 0xE8, 0x4C, 0x44, 0x83, 0x8D, 0x85, 0x01, 0x74,
    0xC3, 0xCC, 0x90, 0xC0, 0x75, 0x41, 0x45, 0x49, 0x4D, 0x08, 0x10, 0x20, 0x40, 0xEB, 0x84,
    0x33, 0xC7,
];

fn weight(byte: u8) -> usize {
    COMMON_X86_64
        .iter()
        .position(|&common| common == byte)
        .map_or(0, |rank| COMMON_X86_64.len() - rank)
}

/// Index of the adjacent exact pair least likely to occur in x86-64 code
///
/// Ties go to the earliest pair. `None` when no two exact elements are adjacent.
pub(super) fn rarest_pair(signature: &Signature) -> Option<usize> {
    signature
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let a = pair[0].byte()?;
            let b = pair[1].byte()?;
            Some((i, weight(a) + weight(b)))
        })
        .min_by_key(|&(i, score)| (score, i))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_least_common_pair() {
        let sig = Signature::parse("48 8B 05 ?? 00 00").unwrap();
        assert_eq!(rarest_pair(&sig), Some(1));
    }

    #[test]
    fn ties_go_first() {
        let sig = Signature::parse("5A 5B 5C").unwrap();
        assert_eq!(rarest_pair(&sig), Some(0));
    }

    #[test]
    fn no_adjacent_pair() {
        let sig = Signature::parse("48 ?? 8B ?? 05").unwrap();
        assert_eq!(rarest_pair(&sig), None);
    }
}
