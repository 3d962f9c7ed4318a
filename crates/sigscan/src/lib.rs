//! Byte signature scanning library
//!
//! Finds the first (or every) occurrence of a byte signature with wildcards
//! inside a memory range, using the widest vector instruction set the running
//! CPU supports.
//!
//! ```rust
//! use sigscan::{find_pattern, Alignment, Signature};
//!
//! let data = [0x10, 0x22, 0x33, 0x22, 0x99];
//! let signature: Signature = "22 ??".parse().unwrap();
//!
//! assert_eq!(find_pattern(&data, &signature, Alignment::X1), Some(1));
//! ```
//!
//! # Note about memory
//! The raw pointer entry points assume the whole `[begin, end)` range is
//! readable. The engine never reads outside of it, but it also never checks
//! page protections; that is the caller's job.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "arm",
    target_arch = "aarch64"
)))]
compile_error!("unsupported architecture: only x86, x86_64, arm and aarch64 are supported");

pub mod options;
pub mod scan;
pub mod signature;
pub mod system;

pub use options::{Backends, OptionsError, ScanOptions};
pub use scan::{
    find_all_pattern, find_pattern, find_pattern_raw, find_pattern_with, resolve_rel32,
    Alignment, ContextError, Matches, Scan, ScanContext, ScanHint, ScanMode,
};
pub use signature::{Element, Signature, SignatureError};
pub use system::{system, SystemInfo};

/// Errors surfaced while preparing a scan
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The signature could not be built
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// The scan context could not be built
    #[error(transparent)]
    Context(#[from] ContextError),
    /// Scan options could not be loaded
    #[error(transparent)]
    Options(#[from] OptionsError),
}
