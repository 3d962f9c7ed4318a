//! Byte signatures made of exact bytes and wildcards

use std::{
    fmt::{self, Display},
    ops::Deref,
    str::FromStr,
};

/// Errors raised while building a [`Signature`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Signature has no exact element, so nothing can anchor a search
    #[error("signature must contain at least one non-wildcard byte")]
    InvalidSignature,
    /// Malformed IDA-style pattern
    #[error("pattern is invalid. pattern must be a-f, A-F, 0-9, or ?? or ? for wildcards")]
    Pattern,
    /// Malformed `x`/`?` mask
    #[error("mask is invalid. mask must be x or ? for wildcards")]
    Mask,
    /// Mask and data lengths differ
    #[error("mask is not the same length as the data")]
    MaskLen,
}

/// A single signature element
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// Matches exactly this byte
    Exact(u8),
    /// Matches any byte
    Wildcard,
}

impl Element {
    /// Whether `byte` satisfies this element
    #[inline]
    pub fn matches(self, byte: u8) -> bool {
        match self {
            Self::Exact(b) => b == byte,
            Self::Wildcard => true,
        }
    }

    /// The concrete byte, if any
    #[inline]
    pub fn byte(self) -> Option<u8> {
        match self {
            Self::Exact(b) => Some(b),
            Self::Wildcard => None,
        }
    }

    /// `true` for [`Element::Exact`]
    #[inline]
    pub fn is_exact(self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

impl From<u8> for Element {
    fn from(value: u8) -> Self {
        Self::Exact(value)
    }
}

impl From<Option<u8>> for Element {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Self::Wildcard, Self::Exact)
    }
}

/// An immutable byte signature
///
/// Always holds at least one [`Element::Exact`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    elements: Box<[Element]>,
}

impl Signature {
    /// Create a signature from its elements
    ///
    /// # Example
    ///
    /// ```rust
    /// use sigscan::{Element, Signature};
    ///
    /// let sig = Signature::new([Element::Exact(0x48), Element::Wildcard]).unwrap();
    /// assert_eq!(sig.len(), 2);
    /// ```
    pub fn new<I>(elements: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        let elements: Box<[Element]> = elements.into_iter().map(Into::into).collect();

        if !elements.iter().any(|e| e.is_exact()) {
            return Err(SignatureError::InvalidSignature);
        }

        Ok(Self { elements })
    }

    /// Parse an IDA-style signature
    ///
    /// # Example
    ///
    /// ```rust
    /// use sigscan::Signature;
    ///
    /// Signature::parse("48 89 ?? 24 ?? 48 89 6c").unwrap();
    /// Signature::parse("48 89 ? 24 ? 48 89 6c").unwrap();
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, SignatureError> {
        let char_to_byte = |c: char| match c {
            'a'..='f' => c as u8 - b'a' + 0xA,
            'A'..='F' => c as u8 - b'A' + 0xA,
            _ => c as u8 - b'0',
        };

        let mut elements = Vec::new();
        let mut pattern = pattern.chars().peekable();

        while let Some(sym) = pattern.next() {
            match sym {
                ' ' => (),

                '?' => {
                    elements.push(Element::Wildcard);
                    pattern.next_if_eq(&'?');
                }

                _ => {
                    // a lone trailing digit means the pattern got out of sync
                    let Some(next_sym) = pattern.next() else {
                        return Err(SignatureError::Pattern);
                    };

                    if !sym.is_ascii_hexdigit() || !next_sym.is_ascii_hexdigit() {
                        return Err(SignatureError::Pattern);
                    }

                    elements.push(Element::Exact(
                        char_to_byte(sym) << 4 | char_to_byte(next_sym),
                    ));
                }
            }
        }

        Self::new(elements)
    }

    /// Signature matching `data` exactly
    pub fn from_bytes(data: &[u8]) -> Result<Self, SignatureError> {
        Self::new(data.iter().copied())
    }

    /// Signature from `data` and a mask where `x` is a known byte and `?` a wildcard
    ///
    /// # Example
    ///
    /// ```rust
    /// use sigscan::Signature;
    ///
    /// let sig = Signature::from_masked(&[0x48, 0x00, 0x89], "x?x").unwrap();
    /// assert_eq!(sig.to_string(), "48 ?? 89");
    /// ```
    pub fn from_masked(data: &[u8], mask: &str) -> Result<Self, SignatureError> {
        if mask.len() != data.len() {
            return Err(SignatureError::MaskLen);
        }

        let elements = data
            .iter()
            .zip(mask.chars())
            .map(|(&byte, sym)| match sym {
                'x' => Ok(Element::Exact(byte)),
                '?' => Ok(Element::Wildcard),
                _ => Err(SignatureError::Mask),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(elements)
    }

    /// Index of the first exact element
    pub fn first_exact(&self) -> usize {
        // the constructor guarantees one exists
        self.elements
            .iter()
            .position(|e| e.is_exact())
            .unwrap_or_default()
    }

    /// Whether `data` starts with this signature
    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() >= self.elements.len()
            && self
                .elements
                .iter()
                .zip(data)
                .all(|(e, &byte)| e.matches(byte))
    }
}

impl Deref for Signature {
    type Target = [Element];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Signature {
    type Error = SignatureError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = SignatureError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }

            match element {
                Element::Exact(b) => write!(f, "{b:02X}")?,
                Element::Wildcard => f.write_str("??")?,
            }
        }

        Ok(())
    }
}
