//! This module allows one to scan memory for signatures

mod backends;
mod context;
mod hint;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{options::ScanOptions, signature::Signature};

pub use backends::ScanMode;
pub use context::{ContextError, ScanContext};

/// Constraint on the address of a match
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// any address
    #[default]
    #[strum(serialize = "x1")]
    X1,
    /// addresses divisible by 16
    #[strum(serialize = "x16")]
    X16,
}

impl Alignment {
    /// Distance between two addresses satisfying this alignment
    pub const fn stride(self) -> usize {
        match self {
            Self::X1 => 1,
            Self::X16 => 16,
        }
    }

    /// Whether `addr` satisfies this alignment
    pub const fn accepts(self, addr: usize) -> bool {
        addr % self.stride() == 0
    }
}

/// What kind of data is being scanned
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScanHint {
    /// nothing known; anchor on the first exact byte
    #[default]
    #[strum(serialize = "generic")]
    Generic,
    /// x86-64 machine code; anchor on the rarest adjacent byte pair
    #[strum(serialize = "x86_64")]
    X86_64,
}

/// The result of a raw scan
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scan {
    /// the address of a found match
    pub addr: *const u8,
}

unsafe impl Send for Scan {}
unsafe impl Sync for Scan {}

impl Scan {
    /// Read a `T` at `addr + offset`
    ///
    /// # Safety
    /// `addr + offset` must be readable for `size_of::<T>()` bytes and hold a valid `T`
    pub unsafe fn read<T: Copy>(&self, offset: usize) -> T {
        // SAFETY: upheld by the caller
        unsafe { self.addr.add(offset).cast::<T>().read_unaligned() }
    }

    /// Resolve a 32-bit displacement stored at `addr + offset`
    ///
    /// The displacement is relative to the end of the field, as used by
    /// `call rel32`, `jmp rel32` and rip-relative operands.
    ///
    /// # Safety
    /// `addr + offset` must be readable for 4 bytes
    pub unsafe fn rel(&self, offset: usize) -> *const u8 {
        // SAFETY: upheld by the caller
        let disp = unsafe { self.read::<i32>(offset) };
        self.addr.wrapping_add(offset + 4).wrapping_offset(disp as isize)
    }
}

impl Display for Scan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scan {{ addr: 0x{:X} }}", self.addr.addr())
    }
}

/// Iterator over every match offset in a slice
///
/// Created by [`ScanContext::find_iter`]. Overlapping matches are reported.
#[derive(Debug)]
pub struct Matches<'c, 's, 'd> {
    context: &'c ScanContext<'s>,
    data: &'d [u8],
    pos: usize,
}

impl<'c, 's, 'd> Matches<'c, 's, 'd> {
    pub(crate) fn new(context: &'c ScanContext<'s>, data: &'d [u8]) -> Self {
        Self {
            context,
            data,
            pos: 0,
        }
    }
}

impl Iterator for Matches<'_, '_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.pos..)?;

        let Some(offset) = self.context.find(rest) else {
            self.pos = self.data.len() + 1;
            return None;
        };

        let found = self.pos + offset;
        self.pos = found + 1;

        Some(found)
    }
}

/// Find the first occurrence of `signature` in `data`
///
/// Returns the offset of the match.
///
/// # Example
///
/// ```rust
/// use sigscan::{find_pattern, Alignment, Signature};
///
/// let binary = [0xab, 0xec, 0x48, 0x89, 0x5c, 0x24, 0xee, 0x48, 0x89, 0x6c];
/// let signature = Signature::parse("48 89 ?? 24").unwrap();
///
/// assert_eq!(find_pattern(&binary, &signature, Alignment::X1), Some(2));
/// ```
pub fn find_pattern(data: &[u8], signature: &Signature, alignment: Alignment) -> Option<usize> {
    ScanContext::new(signature, alignment).find(data)
}

/// Find the first occurrence of `signature` in `data` with custom options
pub fn find_pattern_with(
    data: &[u8],
    signature: &Signature,
    options: &ScanOptions,
) -> Result<Option<usize>, ContextError> {
    let context = ScanContext::with_options(signature, options)?;
    Ok(context.find(data))
}

/// Find every occurrence of `signature` in `data`
///
/// # Example
///
/// ```rust
/// use sigscan::{find_all_pattern, Alignment, Signature};
///
/// let signature = Signature::parse("22").unwrap();
/// let found = find_all_pattern(&[0x22, 0x10, 0x22], &signature, Alignment::X1);
///
/// assert_eq!(found, [0, 2]);
/// ```
pub fn find_all_pattern(data: &[u8], signature: &Signature, alignment: Alignment) -> Vec<usize> {
    ScanContext::new(signature, alignment)
        .find_iter(data)
        .collect()
}

/// Find the first occurrence of `signature` in `[begin, end)`
///
/// # Safety
///
/// * `begin..end` is a single readable range in this address space
///
/// * `begin <= end`
pub unsafe fn find_pattern_raw(
    begin: *const u8,
    end: *const u8,
    signature: &Signature,
    alignment: Alignment,
) -> Option<Scan> {
    // SAFETY: upheld by the caller
    unsafe { ScanContext::new(signature, alignment).find_raw(begin, end) }
}

/// Resolve the 32-bit displacement at `data[at..at + 4]`
///
/// Returns the target as an offset in `data`'s coordinates, which may lie
/// outside of `data`. `None` if the field is out of bounds or the target
/// would be negative.
pub fn resolve_rel32(data: &[u8], at: usize) -> Option<usize> {
    let field = data.get(at..at.checked_add(4)?)?;
    let disp = i32::from_le_bytes(field.try_into().ok()?);

    (at + 4).checked_add_signed(disp as isize)
}
