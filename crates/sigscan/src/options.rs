//! Scan options, optionally loaded from a TOML file

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::scan::{Alignment, ScanHint, ScanMode};

/// Errors for loading or saving [`ScanOptions`]
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// Reading or writing the file failed
    #[error("failed to access {path}")]
    Io {
        /// file that was accessed
        path: PathBuf,
        /// underlying error
        #[source]
        source: io::Error,
    },
    /// File contents are not valid options
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    /// Options could not be serialized
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

/// Which vector backends the resolver may pick
///
/// A backend that is enabled here is still only used when the CPU supports it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backends {
    /// 16 byte SSE backend
    pub sse: bool,
    /// 32 byte AVX2 backend
    pub avx2: bool,
    /// 64 byte AVX-512 backend
    pub avx512: bool,
    /// 16 byte NEON backend
    pub neon: bool,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            sse: true,
            avx2: true,
            avx512: true,
            neon: true,
        }
    }
}

impl Backends {
    /// Only allow the scalar matcher
    pub const fn scalar_only() -> Self {
        Self {
            sse: false,
            avx2: false,
            avx512: false,
            neon: false,
        }
    }

    /// Only allow `mode` (and the scalar matcher)
    pub const fn only(mode: ScanMode) -> Self {
        let mut backends = Self::scalar_only();
        match mode {
            ScanMode::Single => (),
            ScanMode::Sse => backends.sse = true,
            ScanMode::Avx2 => backends.avx2 = true,
            ScanMode::Avx512 => backends.avx512 = true,
            ScanMode::Neon => backends.neon = true,
        }

        backends
    }

    /// Whether `mode` is allowed
    pub const fn allows(&self, mode: ScanMode) -> bool {
        match mode {
            ScanMode::Single => true,
            ScanMode::Sse => self.sse,
            ScanMode::Avx2 => self.avx2,
            ScanMode::Avx512 => self.avx512,
            ScanMode::Neon => self.neon,
        }
    }
}

/// Options for building a [`ScanContext`](crate::ScanContext)
///
/// ```toml
/// alignment = "x16"
/// hint = "x86_64"
///
/// [backends]
/// avx512 = false
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// constraint on match addresses
    pub alignment: Alignment,
    /// hint about the scanned data, used to pick the anchor
    pub hint: ScanHint,
    /// force the anchor to this signature index. must be an exact element
    pub anchor: Option<usize>,
    /// allowed vector backends
    pub backends: Backends,
}

impl ScanOptions {
    /// Options with the given alignment and defaults for everything else
    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment,
            ..Default::default()
        }
    }

    /// Parse options from a TOML string
    pub fn from_toml(data: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(data)?)
    }

    /// Load options from a TOML file
    ///
    /// A missing file yields the default options.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_owned(),
            source,
        })?;

        Self::from_toml(&data)
    }

    /// Save options as TOML to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OptionsError> {
        let path = path.as_ref();
        let serialized = toml::to_string_pretty(self)?;

        fs::write(path, serialized).map_err(|source| OptionsError::Io {
            path: path.to_owned(),
            source,
        })
    }
}
