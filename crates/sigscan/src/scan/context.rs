use std::fmt;

use tracing::trace;

use super::{
    backends::{self, ScanFn, ScanMode},
    hint, Alignment, Matches, Scan, ScanHint,
};
use crate::{options::ScanOptions, signature::Signature, system::system};

/// Errors raised while building a [`ScanContext`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Anchor override does not point at an exact element
    #[error("anchor index {0} does not reference a concrete byte of the signature")]
    InvalidAnchor(usize),
}

/// Widest vector any backend verifies with
pub(crate) const MAX_VECTOR: usize = 64;

#[derive(Clone)]
#[repr(C, align(64))]
pub(crate) struct Block(pub(crate) [u8; MAX_VECTOR]);

/// The head of the signature laid out for one vector compare.
/// Wildcards are zero in `bytes` and `mask`, exact bytes have `0xFF` in `mask`.
#[derive(Clone)]
pub(crate) struct VerifyBlock {
    pub(crate) bytes: Block,
    pub(crate) mask: Block,
}

impl VerifyBlock {
    fn new(signature: &Signature) -> Self {
        let mut block = Self {
            bytes: Block([0; MAX_VECTOR]),
            mask: Block([0; MAX_VECTOR]),
        };

        for (i, element) in signature.iter().take(MAX_VECTOR).enumerate() {
            if let Some(byte) = element.byte() {
                block.bytes.0[i] = byte;
                block.mask.0[i] = 0xFF;
            }
        }

        block
    }
}

/// Everything derived from a signature that a search needs
///
/// Built once per search and read-only afterwards. The backend is resolved at
/// construction, so one context can be reused for many ranges.
#[derive(Clone)]
pub struct ScanContext<'a> {
    signature: &'a Signature,
    alignment: Alignment,
    anchor: usize,
    pair: bool,
    vector_size: usize,
    verify: VerifyBlock,
    mode: ScanMode,
    scanner: ScanFn,
}

impl fmt::Debug for ScanContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanContext")
            .field("signature", &format_args!("{}", self.signature))
            .field("alignment", &self.alignment)
            .field("anchor", &self.anchor)
            .field("pair", &self.pair)
            .field("vector_size", &self.vector_size)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<'a> ScanContext<'a> {
    /// Build a context with default options
    pub fn new(signature: &'a Signature, alignment: Alignment) -> Self {
        let (anchor, pair) = default_anchor(signature, alignment);
        Self::build(signature, alignment, anchor, pair, &ScanOptions::aligned(alignment))
    }

    /// Build a context from [`ScanOptions`]
    pub fn with_options(
        signature: &'a Signature,
        options: &ScanOptions,
    ) -> Result<Self, ContextError> {
        let alignment = options.alignment;

        let (anchor, pair) = match options.anchor {
            Some(anchor) => {
                if !signature.get(anchor).is_some_and(|e| e.is_exact()) {
                    return Err(ContextError::InvalidAnchor(anchor));
                }

                (anchor, has_pair(signature, alignment, anchor))
            }

            None if options.hint == ScanHint::X86_64 && alignment == Alignment::X1 => {
                match hint::rarest_pair(signature) {
                    Some(anchor) => (anchor, true),
                    None => default_anchor(signature, alignment),
                }
            }

            None => default_anchor(signature, alignment),
        };

        Ok(Self::build(signature, alignment, anchor, pair, options))
    }

    fn build(
        signature: &'a Signature,
        alignment: Alignment,
        anchor: usize,
        pair: bool,
        options: &ScanOptions,
    ) -> Self {
        let mode = backends::select(system(), &options.backends);
        let vector_size = mode.vector_size();
        let veccmp = signature.len() <= vector_size;

        let scanner = backends::resolve(mode, alignment, pair, veccmp);

        trace!(
            %signature, %alignment, anchor, pair, %mode, veccmp,
            "built scan context"
        );

        Self {
            signature,
            alignment,
            anchor,
            pair,
            vector_size,
            verify: VerifyBlock::new(signature),
            mode,
            scanner,
        }
    }

    /// Find the first match in `data`, as an offset
    pub fn find(&self, data: &[u8]) -> Option<usize> {
        let range = data.as_ptr_range();

        // SAFETY: a slice is readable from start to end
        let scan = unsafe { self.find_raw(range.start, range.end) }?;

        Some(scan.addr.addr() - range.start.addr())
    }

    /// Find the first match in `[begin, end)`
    ///
    /// # Safety
    ///
    /// * `begin..end` is a single readable range in this address space
    ///
    /// * `begin <= end`
    pub unsafe fn find_raw(&self, begin: *const u8, end: *const u8) -> Option<Scan> {
        debug_assert!(begin <= end, "scan range is reversed");

        // SAFETY: the resolver only hands out backends the cpu supports,
        // and the range is upheld by the caller
        let addr = unsafe { (self.scanner)(begin, end, self) }?;

        Some(Scan { addr })
    }

    /// Iterate over every match offset in `data`
    pub fn find_iter<'c, 'd>(&'c self, data: &'d [u8]) -> Matches<'c, 'a, 'd> {
        Matches::new(self, data)
    }

    /// The signature being searched for
    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    /// The alignment matches must satisfy
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Index of the element used as primary filter
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Whether the element after the anchor is also used as filter
    pub fn has_pair(&self) -> bool {
        self.pair
    }

    /// The backend chosen for this context
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Vector width of the chosen backend in bytes
    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub(crate) fn anchor_byte(&self) -> u8 {
        self.signature[self.anchor].byte().unwrap_or_default()
    }

    pub(crate) fn pair_byte(&self) -> u8 {
        self.signature
            .get(self.anchor + 1)
            .and_then(|e| e.byte())
            .unwrap_or_default()
    }

    pub(crate) fn verify_block(&self) -> &VerifyBlock {
        &self.verify
    }
}

fn default_anchor(signature: &Signature, alignment: Alignment) -> (usize, bool) {
    let anchor = signature.first_exact();
    (anchor, has_pair(signature, alignment, anchor))
}

// with a stricter alignment the lane mask already thins out candidates
fn has_pair(signature: &Signature, alignment: Alignment, anchor: usize) -> bool {
    alignment == Alignment::X1
        && signature
            .get(anchor + 1)
            .is_some_and(|element| element.is_exact())
}
