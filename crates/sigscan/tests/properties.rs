use proptest::{prelude::*, proptest, sample::Index};
use sigscan::{
    find_all_pattern, find_pattern, system, Alignment, Backends, Element, ScanContext, ScanMode,
    ScanOptions, Signature,
};
use strum::IntoEnumIterator;

fn naive(data: &[u8], needle: &[u8], alignment: Alignment) -> Option<usize> {
    let base = data.as_ptr().addr();

    data.windows(needle.len())
        .enumerate()
        .find(|&(i, window)| alignment.accepts(base + i) && window == needle)
        .map(|(i, _)| i)
}

/// Small alphabet so random data is full of partial matches
fn bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..max_len)
}

fn elements() -> impl Strategy<Value = Vec<Option<u8>>> {
    prop::collection::vec(prop::option::weighted(0.7, 0u8..4), 1..90)
        .prop_filter("needs an exact byte", |e| e.iter().any(Option::is_some))
}

fn alignment() -> impl Strategy<Value = Alignment> {
    prop_oneof![Just(Alignment::X1), Just(Alignment::X16)]
}

/// Copy `needle` into `data` at a position picked by `at`, if it fits
fn plant(data: &mut [u8], needle: &[u8], at: Index) {
    if needle.len() <= data.len() {
        let start = at.index(data.len() - needle.len() + 1);
        data[start..start + needle.len()].copy_from_slice(needle);
    }
}

fn host_contexts<'s>(signature: &'s Signature, alignment: Alignment) -> Vec<ScanContext<'s>> {
    ScanMode::iter()
        .filter(|mode| mode.is_supported(system()))
        .map(|mode| {
            let options = ScanOptions {
                alignment,
                backends: Backends::only(mode),
                ..Default::default()
            };

            ScanContext::with_options(signature, &options).unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn exact_signature_matches_naive_search(
        mut data in bytes(400),
        needle in prop::collection::vec(0u8..4, 1..90),
        at in any::<Index>(),
        alignment in alignment(),
    ) {
        plant(&mut data, &needle, at);
        let signature = Signature::from_bytes(&needle).unwrap();
        let expected = naive(&data, &needle, alignment);

        for context in host_contexts(&signature, alignment) {
            prop_assert_eq!(context.find(&data), expected, "{}", context.mode());
        }
    }

    #[test]
    fn wildcard_matches_are_real_and_first(
        mut data in bytes(400),
        elements in elements(),
        at in any::<Index>(),
        alignment in alignment(),
    ) {
        let concrete: Vec<u8> = elements.iter().map(|e| e.unwrap_or(0)).collect();
        plant(&mut data, &concrete, at);

        let signature = Signature::new(elements.iter().copied()).unwrap();
        let base = data.as_ptr().addr();

        let expected = (0..data.len())
            .find(|&i| alignment.accepts(base + i) && signature.matches(&data[i..]));

        for context in host_contexts(&signature, alignment) {
            let found = context.find(&data);
            prop_assert_eq!(found, expected, "{}", context.mode());

            if let Some(offset) = found {
                let window = &data[offset..offset + signature.len()];
                for (element, &byte) in signature.iter().zip(window) {
                    prop_assert!(element.matches(byte));
                }
            }
        }
    }

    #[test]
    fn anchor_choice_does_not_change_the_result(
        mut data in bytes(300),
        elements in elements(),
        at in any::<Index>(),
    ) {
        let concrete: Vec<u8> = elements.iter().map(|e| e.unwrap_or(1)).collect();
        plant(&mut data, &concrete, at);

        let signature = Signature::new(elements.iter().copied()).unwrap();
        let expected = find_pattern(&data, &signature, Alignment::X1);

        for (anchor, element) in signature.iter().enumerate() {
            if *element == Element::Wildcard {
                continue;
            }

            let options = ScanOptions { anchor: Some(anchor), ..Default::default() };
            let context = ScanContext::with_options(&signature, &options).unwrap();
            prop_assert_eq!(context.find(&data), expected, "anchor {}", anchor);
        }
    }

    #[test]
    fn repeated_scans_agree(data in bytes(300), elements in elements()) {
        let signature = Signature::new(elements.iter().copied()).unwrap();
        let context = ScanContext::new(&signature, Alignment::X1);

        prop_assert_eq!(context.find(&data), context.find(&data));
        prop_assert_eq!(
            find_all_pattern(&data, &signature, Alignment::X1),
            find_all_pattern(&data, &signature, Alignment::X1)
        );
    }

    #[test]
    fn aligned_matches_sit_on_16_byte_addresses(data in bytes(400), elements in elements()) {
        let signature = Signature::new(elements.iter().copied()).unwrap();
        let base = data.as_ptr().addr();

        for offset in find_all_pattern(&data, &signature, Alignment::X16) {
            prop_assert_eq!((base + offset) % 16, 0);
        }
    }
}
