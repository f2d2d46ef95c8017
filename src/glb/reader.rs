//! GLB container reader.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use super::format::*;
use crate::source::{BufferOrigin, DataStore};
use crate::util::{Error, Result};

/// Parsing strictness.
///
/// Non-strict (the default) tolerates unknown second-chunk types and
/// chunk padding discrepancies so that trailing extension data or sloppy
/// exporters do not abort loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub strict: bool,
}

impl ParseOptions {
    pub const STRICT: Self = Self { strict: true };
    pub const LENIENT: Self = Self { strict: false };
}

/// Kind of a chunk, derived from its type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Json,
    Bin,
    /// Any other tag; kept as opaque data.
    Unknown(u32),
}

impl ChunkKind {
    pub const fn from_tag(tag: u32) -> Self {
        match tag {
            CHUNK_JSON => Self::Json,
            CHUNK_BIN => Self::Bin,
            other => Self::Unknown(other),
        }
    }

    pub const fn tag(self) -> u32 {
        match self {
            Self::Json => CHUNK_JSON,
            Self::Bin => CHUNK_BIN,
            Self::Unknown(tag) => tag,
        }
    }
}

/// One chunk of a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Length as declared in the chunk header.
    pub length: u32,
    pub kind: ChunkKind,
    /// Content bytes actually present. Equal to `length` bytes unless the
    /// file ended inside the chunk's alignment padding.
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(kind: ChunkKind, data: Vec<u8>) -> Self {
        Self { length: data.len() as u32, kind, data }
    }

    /// Bytes this chunk occupies in the container (sub-header + declared length).
    #[inline]
    pub fn span(&self) -> usize {
        CHUNK_HEADER_SIZE + self.length as usize
    }

    #[inline]
    pub fn is_json(&self) -> bool {
        self.kind == ChunkKind::Json
    }

    #[inline]
    pub fn is_bin(&self) -> bool {
        self.kind == ChunkKind::Bin
    }
}

/// A parsed GLB container: header, JSON chunk and optional second chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub magic: [u8; 4],
    pub version: u32,
    /// Total length declared in the header.
    pub length: u32,
    pub json: Chunk,
    /// BIN chunk, or an opaque chunk of unknown type in lenient mode.
    pub second: Option<Chunk>,
}

impl Container {
    /// Parse a container with default (lenient) options.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        parse(bytes)
    }

    /// Read and parse a container from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, ParseOptions::default())
    }

    /// Read and parse a container from disk with explicit options.
    pub fn open_opts(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::from_io(path, e))?;
        parse_with(&bytes, options)
    }

    /// JSON text with trailing space padding stripped.
    pub fn json_text(&self) -> &str {
        // Validated as UTF-8 during parsing; hand-built containers fall back to "".
        let end = self
            .json
            .data
            .iter()
            .rposition(|&b| b != JSON_PADDING)
            .map_or(0, |i| i + 1);
        std::str::from_utf8(&self.json.data[..end]).unwrap_or_default()
    }

    /// Parse the JSON chunk into a generic document value.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(self.json_text()).map_err(|e| Error::InvalidJson(e.to_string()))
    }

    /// True when a BIN chunk is present.
    #[inline]
    pub fn has_binary(&self) -> bool {
        self.second.as_ref().is_some_and(Chunk::is_bin)
    }

    /// BIN chunk content, if present.
    pub fn binary(&self) -> Option<&[u8]> {
        self.second
            .as_ref()
            .filter(|c| c.is_bin())
            .map(|c| c.data.as_slice())
    }

    /// Second chunk of unknown type, kept as opaque data.
    pub fn opaque(&self) -> Option<&Chunk> {
        self.second.as_ref().filter(|c| !c.is_bin())
    }

    /// Register the BIN chunk as embedded data for buffer 0.
    ///
    /// A document buffer without a URI refers to this chunk. Returns false
    /// when the container has no BIN chunk.
    pub fn register(&self, store: &mut DataStore) -> bool {
        match self.binary() {
            Some(bin) => {
                store.store(BufferOrigin::Embedded, 0, bin.to_vec());
                true
            }
            None => false,
        }
    }

    /// Check magic, version, chunk ordering and length arithmetic.
    pub fn validate(&self, strict: bool) -> Result<()> {
        validate(self, strict)
    }
}

/// Parse a container with default (lenient) options.
pub fn parse(bytes: &[u8]) -> Result<Container> {
    parse_with(bytes, ParseOptions::default())
}

/// Parse a container.
///
/// Reads the 12-byte header, the mandatory JSON chunk and, if bytes remain
/// inside the declared length, a second chunk. In strict mode a second
/// chunk must be BIN and its declared length must be fully present.
#[tracing::instrument(skip_all, fields(len = bytes.len(), strict = options.strict))]
pub fn parse_with(bytes: &[u8], options: ParseOptions) -> Result<Container> {
    if bytes.len() < GLB_MAGIC.len() {
        return Err(Error::Truncated { expected: HEADER_SIZE, actual: bytes.len() });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&bytes[0..4]);
    if &magic != GLB_MAGIC {
        return Err(Error::InvalidMagic(magic));
    }

    if bytes.len() < HEADER_SIZE {
        return Err(Error::Truncated { expected: HEADER_SIZE, actual: bytes.len() });
    }

    let version = LittleEndian::read_u32(&bytes[VERSION_OFFSET..]);
    if version != GLB_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let length = LittleEndian::read_u32(&bytes[LENGTH_OFFSET..]);
    let declared = length as usize;
    if bytes.len() < declared {
        return Err(Error::Truncated { expected: declared, actual: bytes.len() });
    }
    if declared < HEADER_SIZE + CHUNK_HEADER_SIZE {
        return Err(Error::LengthMismatch {
            declared,
            computed: HEADER_SIZE + CHUNK_HEADER_SIZE,
        });
    }

    // Bytes past the declared length are not part of the container.
    let data = &bytes[..declared];
    let mut pos = HEADER_SIZE;

    let (json_len, json_tag) = read_chunk_header(data, pos)?;
    if json_tag != CHUNK_JSON {
        return Err(Error::FirstChunkNotJson(json_tag));
    }
    pos += CHUNK_HEADER_SIZE;

    let json_end = pos + json_len as usize;
    if json_end > data.len() {
        return Err(Error::Truncated { expected: json_end, actual: data.len() });
    }
    let json_data = data[pos..json_end].to_vec();
    if let Err(e) = std::str::from_utf8(&json_data) {
        return Err(Error::InvalidJson(e.to_string()));
    }
    let json = Chunk { length: json_len, kind: ChunkKind::Json, data: json_data };
    pos = json_end;

    let second = if pos < data.len() {
        read_second_chunk(data, pos, options)?
    } else {
        None
    };

    tracing::debug!(
        version,
        length,
        json_len,
        second = ?second.as_ref().map(|c| (chunk_type_name(c.kind.tag()), c.length)),
        "Parsed GLB container"
    );

    Ok(Container { magic, version, length, json, second })
}

fn read_chunk_header(data: &[u8], pos: usize) -> Result<(u32, u32)> {
    let end = pos + CHUNK_HEADER_SIZE;
    if end > data.len() {
        return Err(Error::Truncated { expected: end, actual: data.len() });
    }
    Ok((
        LittleEndian::read_u32(&data[pos..]),
        LittleEndian::read_u32(&data[pos + 4..]),
    ))
}

fn read_second_chunk(data: &[u8], pos: usize, options: ParseOptions) -> Result<Option<Chunk>> {
    let remaining = data.len() - pos;
    if remaining < CHUNK_HEADER_SIZE {
        // Too short to hold a chunk header: stray alignment bytes.
        if options.strict {
            return Err(Error::Truncated { expected: pos + CHUNK_HEADER_SIZE, actual: data.len() });
        }
        tracing::warn!(remaining, "Ignoring trailing bytes after JSON chunk");
        return Ok(None);
    }

    let (chunk_len, tag) = read_chunk_header(data, pos)?;
    let kind = ChunkKind::from_tag(tag);
    match kind {
        ChunkKind::Bin => {}
        ChunkKind::Json => return Err(Error::UnexpectedChunk(tag)),
        ChunkKind::Unknown(_) if options.strict => return Err(Error::UnexpectedChunk(tag)),
        ChunkKind::Unknown(_) => {
            tracing::warn!(chunk = %chunk_type_name(tag), "Keeping unknown second chunk as opaque data");
        }
    }

    let start = pos + CHUNK_HEADER_SIZE;
    let available = data.len() - start;
    let declared = chunk_len as usize;
    if available < declared {
        // A shortfall within the alignment padding is tolerated when lenient.
        let shortfall = declared - available;
        if options.strict {
            return Err(Error::ChunkPadding { chunk: 1, declared, actual: available });
        }
        if shortfall >= CHUNK_ALIGNMENT {
            return Err(Error::Truncated { expected: start + declared, actual: data.len() });
        }
        tracing::warn!(declared, available, "Chunk shorter than declared length");
    }

    let end = start + declared.min(available);
    Ok(Some(Chunk { length: chunk_len, kind, data: data[start..end].to_vec() }))
}

/// Check a container's magic, version, chunk ordering and length arithmetic.
///
/// The sum of the header and every chunk's sub-header plus declared length
/// must not exceed the declared total. Strict mode additionally requires the
/// sum to match exactly, every chunk's content to match its declared length,
/// chunk lengths to be 4-byte aligned, and the second chunk to be BIN.
pub fn validate(container: &Container, strict: bool) -> Result<()> {
    if &container.magic != GLB_MAGIC {
        return Err(Error::InvalidMagic(container.magic));
    }
    if container.version != GLB_VERSION {
        return Err(Error::UnsupportedVersion(container.version));
    }
    if !container.json.is_json() {
        return Err(Error::FirstChunkNotJson(container.json.kind.tag()));
    }
    if let Some(second) = &container.second {
        match second.kind {
            ChunkKind::Bin => {}
            ChunkKind::Json => return Err(Error::UnexpectedChunk(CHUNK_JSON)),
            ChunkKind::Unknown(tag) if strict => return Err(Error::UnexpectedChunk(tag)),
            ChunkKind::Unknown(_) => {}
        }
    }

    let declared = container.length as usize;
    let computed = HEADER_SIZE
        + container.json.span()
        + container.second.as_ref().map_or(0, Chunk::span);
    if computed > declared || (strict && computed != declared) {
        return Err(Error::LengthMismatch { declared, computed });
    }

    let chunks = std::iter::once(&container.json).chain(container.second.as_ref());
    for (index, chunk) in chunks.enumerate() {
        let declared = chunk.length as usize;
        let actual = chunk.data.len();
        if declared != actual {
            if strict {
                return Err(Error::ChunkPadding { chunk: index, declared, actual });
            }
            tracing::warn!(chunk = index, declared, actual, "Tolerating chunk padding mismatch");
        } else if strict && declared % CHUNK_ALIGNMENT != 0 {
            return Err(Error::ChunkPadding { chunk: index, declared, actual: padded_len(actual) });
        }
    }

    Ok(())
}
