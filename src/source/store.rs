//! Buffer byte storage keyed by buffer index.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use smallvec::SmallVec;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use crate::util::{Error, Result};

/// Where a buffer's bytes came from.
///
/// Declaration order is lookup precedence: embedded data shadows an
/// external file, which shadows inline data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferOrigin {
    /// The container's own BIN chunk.
    Embedded,
    /// A file next to the asset.
    External,
    /// A base64 `data:` URI inside the document.
    Inline,
}

impl BufferOrigin {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::External => "external",
            Self::Inline => "inline",
        }
    }
}

impl fmt::Display for BufferOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owned buffer bytes: heap memory or a read-only file mapping.
pub enum BufferBytes {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

impl Deref for BufferBytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v,
            #[cfg(feature = "mmap")]
            Self::Mapped(m) => m,
        }
    }
}

impl From<Vec<u8>> for BufferBytes {
    fn from(v: Vec<u8>) -> Self {
        Self::Owned(v)
    }
}

impl fmt::Debug for BufferBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owned(v) => write!(f, "Owned({} bytes)", v.len()),
            #[cfg(feature = "mmap")]
            Self::Mapped(m) => write!(f, "Mapped({} bytes)", m.len()),
        }
    }
}

/// Bytes of one buffer tagged with their origin.
#[derive(Debug)]
pub struct SourcedBuffer {
    pub origin: BufferOrigin,
    pub bytes: BufferBytes,
}

/// Resolves buffer bytes regardless of physical origin.
///
/// Each buffer index maps to its sources kept in precedence order, so a
/// lookup is the first entry and no merge happens at read time. Sources of
/// different origins for the same index coexist; storing again under the
/// same origin replaces the previous bytes.
#[derive(Debug, Default)]
pub struct DataStore {
    buffers: HashMap<usize, SmallVec<[SourcedBuffer; 1]>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes for `(origin, index)`. Last write wins.
    pub fn store(&mut self, origin: BufferOrigin, index: usize, bytes: impl Into<BufferBytes>) {
        let bytes = bytes.into();
        tracing::debug!(index, %origin, len = bytes.len(), "Storing buffer");

        let sources = self.buffers.entry(index).or_default();
        match sources.binary_search_by_key(&origin, |s| s.origin) {
            Ok(pos) => sources[pos].bytes = bytes,
            Err(pos) => sources.insert(pos, SourcedBuffer { origin, bytes }),
        }
    }

    /// Bytes for buffer `index` from the highest-precedence origin.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.resolve(index).map(|s| &*s.bytes)
    }

    /// Origin that answers [`get`](Self::get) for `index`.
    pub fn origin(&self, index: usize) -> Option<BufferOrigin> {
        self.resolve(index).map(|s| s.origin)
    }

    /// Bytes stored under one specific origin, ignoring precedence.
    pub fn get_from(&self, origin: BufferOrigin, index: usize) -> Option<&[u8]> {
        self.buffers
            .get(&index)?
            .iter()
            .find(|s| s.origin == origin)
            .map(|s| &*s.bytes)
    }

    fn resolve(&self, index: usize) -> Option<&SourcedBuffer> {
        self.buffers.get(&index)?.first()
    }

    /// Size in bytes of buffer `index`.
    pub fn buffer_len(&self, index: usize) -> Option<usize> {
        self.get(index).map(<[u8]>::len)
    }

    /// Byte range `[offset, offset + length)` of buffer `index`.
    ///
    /// Absent when the buffer is missing, when `length` is zero, or when
    /// the range runs past the end of the buffer.
    pub fn slice(&self, index: usize, offset: usize, length: usize) -> Option<&[u8]> {
        if length == 0 {
            return None;
        }
        let bytes = self.get(index)?;
        let end = offset.checked_add(length)?;
        bytes.get(offset..end)
    }

    /// Like [`slice`](Self::slice) but reports why the range is unavailable.
    pub fn slice_checked(&self, index: usize, offset: usize, length: usize) -> Result<&[u8]> {
        let bytes = self.get(index).ok_or(Error::MissingBuffer(index))?;
        offset
            .checked_add(length)
            .and_then(|end| bytes.get(offset..end))
            .ok_or(Error::OutOfBounds {
                buffer: index,
                offset,
                length,
                available: bytes.len(),
            })
    }

    /// Drop every source for `index`.
    pub fn remove(&mut self, index: usize) -> bool {
        self.buffers.remove(&index).is_some()
    }

    /// True when any origin holds bytes for `index`.
    pub fn contains(&self, index: usize) -> bool {
        self.resolve(index).is_some()
    }

    /// Number of buffer indices with data.
    pub fn len(&self) -> usize {
        self.buffers.values().filter(|s| !s.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer indices with data, ascending.
    pub fn indices(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .buffers
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(&i, _)| i)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}
