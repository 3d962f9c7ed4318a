//! Every backend the host supports must agree with the scalar matcher

use sigscan::{
    system, Alignment, Backends, ScanContext, ScanMode, ScanOptions, Signature,
};
use strum::IntoEnumIterator;

#[repr(C, align(64))]
struct Buf<const N: usize>([u8; N]);

fn host_modes() -> Vec<ScanMode> {
    ScanMode::iter()
        .filter(|mode| mode.is_supported(system()))
        .collect()
}

fn options(mode: ScanMode, alignment: Alignment) -> ScanOptions {
    ScanOptions {
        alignment,
        backends: Backends::only(mode),
        ..Default::default()
    }
}

/// Run `pattern` over `data` with every host backend, checking they all agree
fn find_everywhere(data: &[u8], pattern: &str, alignment: Alignment) -> Option<usize> {
    let signature = Signature::parse(pattern).unwrap();

    let scalar = ScanContext::with_options(&signature, &options(ScanMode::Single, alignment))
        .unwrap()
        .find(data);

    for mode in host_modes() {
        let context = ScanContext::with_options(&signature, &options(mode, alignment)).unwrap();
        assert_eq!(context.mode(), mode);
        assert_eq!(
            context.find(data),
            scalar,
            "{mode} disagrees on {pattern} with {alignment}"
        );
    }

    scalar
}

#[test]
fn scalar_is_always_available() {
    assert!(host_modes().contains(&ScanMode::Single));
}

#[test]
fn short_wildcard_pattern() {
    let data = [0x10, 0x22, 0x33, 0x22, 0x99];
    assert_eq!(find_everywhere(&data, "22 ??", Alignment::X1), Some(1));
}

#[test]
fn missing_pattern() {
    let data = [0u8; 64];
    assert_eq!(find_everywhere(&data, "01", Alignment::X1), None);
}

#[test]
fn empty_range() {
    assert_eq!(find_everywhere(&[], "01", Alignment::X1), None);
    assert_eq!(find_everywhere(&[], "01", Alignment::X16), None);
}

#[test]
fn long_signature_at_the_end() {
    let mut buf = Buf([0u8; 512]);
    let tail: Vec<u8> = (0..100u8).map(|i| i.wrapping_mul(7).wrapping_add(3)).collect();
    buf.0[412..].copy_from_slice(&tail);

    let pattern = Signature::from_bytes(&tail).unwrap().to_string();
    assert_eq!(find_everywhere(&buf.0, &pattern, Alignment::X1), Some(412));

    // same bytes but starting at an odd offset so every head/body split is hit
    for start in 1..70 {
        let found = find_everywhere(&buf.0[start..], &pattern, Alignment::X1);
        assert_eq!(found, Some(412 - start));
    }
}

#[test]
fn wildcards_past_the_widest_vector() {
    let mut buf = Buf([0xCCu8; 384]);
    buf.0[200] = 0x48;
    buf.0[201] = 0x8B;
    buf.0[280] = 0xE8;

    // 81 elements, too long for single vector verification on any backend
    let mut pattern = String::from("48 8B");
    pattern.push_str(&" ??".repeat(78));
    pattern.push_str(" E8");

    assert_eq!(find_everywhere(&buf.0, &pattern, Alignment::X1), Some(200));

    buf.0[280] = 0xE9;
    assert_eq!(find_everywhere(&buf.0, &pattern, Alignment::X1), None);
}

#[test]
fn leading_wildcards() {
    let mut buf = Buf([0u8; 256]);
    buf.0[150] = 0x5A;
    buf.0[151] = 0x7E;

    assert_eq!(find_everywhere(&buf.0, "?? ?? ?? 5A 7E", Alignment::X1), Some(147));
    // a match can not start before the range
    assert_eq!(find_everywhere(&buf.0[149..], "?? ?? ?? 5A 7E", Alignment::X1), None);
}

#[test]
fn aligned_match_wins_over_earlier_unaligned_one() {
    let mut buf = Buf([0u8; 256]);
    buf.0[37] = 0xAB;
    buf.0[38] = 0xCD;
    buf.0[96] = 0xAB;
    buf.0[97] = 0xCD;

    assert_eq!(find_everywhere(&buf.0, "AB CD", Alignment::X1), Some(37));
    assert_eq!(find_everywhere(&buf.0, "AB CD", Alignment::X16), Some(96));

    // offsets are relative to the slice, alignment to the address
    assert_eq!(find_everywhere(&buf.0[5..], "AB CD", Alignment::X16), Some(91));
}

#[test]
fn aligned_with_anchor_inside_signature() {
    let mut buf = Buf([0u8; 256]);
    buf.0[128] = 0x11;
    buf.0[129] = 0x22;
    buf.0[130] = 0x33;
    buf.0[67] = 0x22;
    buf.0[68] = 0x33;

    assert_eq!(find_everywhere(&buf.0, "?? 22 33", Alignment::X1), Some(66));
    assert_eq!(find_everywhere(&buf.0, "?? 22 33", Alignment::X16), Some(128));
}

#[test]
fn overridden_anchor_finds_the_same_match() {
    let mut buf = Buf([0u8; 256]);
    buf.0[100..106].copy_from_slice(&[0x48, 0x8B, 0x05, 0x11, 0x00, 0x00]);
    let signature = Signature::parse("48 8B 05 ?? 00 00").unwrap();

    for mode in host_modes() {
        for anchor in [0, 1, 2, 4, 5] {
            let options = ScanOptions {
                anchor: Some(anchor),
                ..options(mode, Alignment::X1)
            };

            let context = ScanContext::with_options(&signature, &options).unwrap();
            assert_eq!(context.find(&buf.0), Some(100), "{mode} anchor {anchor}");
        }
    }
}

#[test]
fn find_iter_reports_overlapping_matches() {
    let buf = Buf([0x90u8; 128]);
    let signature = Signature::parse("90 90 90").unwrap();

    for mode in host_modes() {
        let context =
            ScanContext::with_options(&signature, &options(mode, Alignment::X1)).unwrap();
        let found: Vec<usize> = context.find_iter(&buf.0).collect();

        assert_eq!(found, (0..126).collect::<Vec<_>>(), "{mode}");

        let context =
            ScanContext::with_options(&signature, &options(mode, Alignment::X16)).unwrap();
        let found: Vec<usize> = context.find_iter(&buf.0).collect();

        assert_eq!(found, [0, 16, 32, 48, 64, 80, 96, 112], "{mode}");
    }
}
