//! Borrowed string and bytes views.
//!
//! `StringHolder` and `BytesHolder` are distinct types so that a value can
//! carry "string" and "bytes" as separate kinds even though both are a
//! read-only view over a contiguous byte range. The backing storage is owned
//! elsewhere (usually the [`Arena`](crate::Arena)) and must outlive `'a`.

use std::fmt;

/// A read-only view over UTF-8 text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringHolder<'a> {
    value: &'a str,
}

impl<'a> StringHolder<'a> {
    /// Wrap a borrowed string.
    pub fn new(value: &'a str) -> Self {
        Self { value }
    }

    /// The viewed text.
    pub fn value(&self) -> &'a str {
        self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<'a> From<&'a str> for StringHolder<'a> {
    fn from(value: &'a str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for StringHolder<'_> {
    fn as_ref(&self) -> &str {
        self.value
    }
}

impl fmt::Display for StringHolder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value)
    }
}

/// A read-only view over binary data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BytesHolder<'a> {
    value: &'a [u8],
}

impl<'a> BytesHolder<'a> {
    /// Wrap a borrowed byte slice.
    pub fn new(value: &'a [u8]) -> Self {
        Self { value }
    }

    /// The viewed bytes.
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<'a> From<&'a [u8]> for BytesHolder<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::new(value)
    }
}

impl AsRef<[u8]> for BytesHolder<'_> {
    fn as_ref(&self) -> &[u8] {
        self.value
    }
}

impl fmt::Display for BytesHolder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.escape_ascii())
    }
}
