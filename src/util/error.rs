//! Error types for glbkit.

use std::path::PathBuf;
use thiserror::Error;

/// Validation stage that produced an error.
///
/// Useful when reporting malformed assets: the stage tells which check
/// rejected the input without matching on every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Magic,
    Version,
    Chunk,
    Length,
    Bounds,
    Source,
    Validation,
}

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Magic => "magic",
            Self::Version => "version",
            Self::Chunk => "chunk",
            Self::Length => "length",
            Self::Bounds => "bounds",
            Self::Source => "source",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for glbkit operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Format ===

    /// First four bytes are not the `glTF` tag
    #[error("Invalid GLB file: expected glTF magic bytes, got {0:02x?}")]
    InvalidMagic([u8; 4]),

    /// Container version other than 2
    #[error("Unsupported GLB version: {0}")]
    UnsupportedVersion(u32),

    /// Fewer bytes than the header or a chunk declares
    #[error("Truncated GLB: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The chunk after the header is not the JSON chunk
    #[error("First chunk must be JSON, got type 0x{0:08x}")]
    FirstChunkNotJson(u32),

    /// Second chunk has a type other than BIN (strict mode only)
    #[error("Unexpected chunk type 0x{0:08x}")]
    UnexpectedChunk(u32),

    /// Header + chunk arithmetic disagrees with the declared total length
    #[error("Length mismatch: header declares {declared} bytes, chunks need {computed}")]
    LengthMismatch { declared: usize, computed: usize },

    /// Declared chunk length differs from its content (strict mode only)
    #[error("Chunk {chunk} padding mismatch: declared {declared} bytes, content {actual}")]
    ChunkPadding { chunk: usize, declared: usize, actual: usize },

    /// JSON chunk is not valid UTF-8 JSON
    #[error("Invalid JSON chunk: {0}")]
    InvalidJson(String),

    // === Bounds ===

    /// Requested byte range exceeds the buffer
    #[error("Range [{offset}, {offset}+{length}) out of bounds for buffer {buffer} ({available} bytes)")]
    OutOfBounds { buffer: usize, offset: usize, length: usize, available: usize },

    /// No data registered for the buffer index
    #[error("Buffer {0} has no data")]
    MissingBuffer(usize),

    /// Accessor references a buffer view that does not exist
    #[error("Buffer view {0} not found")]
    MissingBufferView(usize),

    // === Source ===

    /// External buffer file does not exist
    #[error("File not found: {0}")]
    SourceNotFound(PathBuf),

    /// External buffer file cannot be read
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// URI is not a usable `data:` or relative file URI
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Payload of a base64 data URI failed to decode
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Validation ===

    /// Keyframe times are not strictly ascending
    #[error("Keyframe times not strictly ascending at index {index}")]
    NotAscending { index: usize },

    /// Sampler output count does not match the interpolation mode
    #[error("Sampler output length mismatch: expected {expected}, got {actual}")]
    OutputLength { expected: usize, actual: usize },

    /// Component/shape/interpolation combination not supported
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    Invalid(String),
}

impl Error {
    /// Create a generic validation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create an unsupported type error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedType(msg.into())
    }

    /// Map an I/O failure on `path` to the matching source error.
    pub fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::SourceNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(e),
        }
    }

    /// Stage that rejected the input.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidMagic(_) => Stage::Magic,
            Self::UnsupportedVersion(_) => Stage::Version,
            Self::FirstChunkNotJson(_)
            | Self::UnexpectedChunk(_)
            | Self::ChunkPadding { .. }
            | Self::InvalidJson(_) => Stage::Chunk,
            Self::Truncated { .. } | Self::LengthMismatch { .. } => Stage::Length,
            Self::OutOfBounds { .. } | Self::MissingBuffer(_) | Self::MissingBufferView(_) => {
                Stage::Bounds
            }
            Self::SourceNotFound(_)
            | Self::PermissionDenied(_)
            | Self::InvalidDataUri(_)
            | Self::InvalidBase64(_)
            | Self::Io(_) => Stage::Source,
            Self::NotAscending { .. }
            | Self::OutputLength { .. }
            | Self::UnsupportedType(_)
            | Self::Invalid(_) => Stage::Validation,
        }
    }

    /// Bad magic, version, chunk ordering or truncation.
    pub fn is_format(&self) -> bool {
        matches!(
            self.stage(),
            Stage::Magic | Stage::Version | Stage::Chunk | Stage::Length
        )
    }

    /// Accessor or slice request exceeding available bytes.
    pub fn is_bounds(&self) -> bool {
        self.stage() == Stage::Bounds
    }

    /// Unreadable file or malformed inline data.
    pub fn is_source(&self) -> bool {
        self.stage() == Stage::Source
    }

    pub fn is_validation(&self) -> bool {
        self.stage() == Stage::Validation
    }
}

/// Result type alias for glbkit operations.
pub type Result<T> = std::result::Result<T, Error>;
