//! Byte View Module
//!
//! Immutable snapshot of a cached value's bytes.

use std::borrow::Cow;
use std::sync::Arc;

// == Byte View ==
/// An immutable view over cached bytes.
///
/// Cloning is cheap (the backing buffer is shared, never copied) and the
/// buffer is never handed out by reference, so callers cannot mutate cached
/// data. Byte values support arbitrary payloads, not just UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view owning a copy-free snapshot of `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    // == Length ==
    /// Returns the number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the view holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == To Vec ==
    /// Returns a defensive copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    // == As String ==
    /// Returns the bytes as a string, replacing invalid UTF-8.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}
