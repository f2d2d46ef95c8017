//! GLB container constants.

/// Magic bytes at the start of a GLB file.
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// The only supported container version.
pub const GLB_VERSION: u32 = 2;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 4;

/// Offset of the declared total length in the header.
pub const LENGTH_OFFSET: usize = 8;

/// Size of each chunk header (length + type).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Chunk type tag for the JSON chunk ("JSON" read as u32 LE).
pub const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Chunk type tag for the binary chunk ("BIN\0" read as u32 LE).
pub const CHUNK_BIN: u32 = 0x004E_4942;

/// Chunk data is aligned to 4 bytes.
pub const CHUNK_ALIGNMENT: usize = 4;

/// JSON chunks are padded with spaces.
pub const JSON_PADDING: u8 = 0x20;

/// BIN chunks are padded with zeros.
pub const BIN_PADDING: u8 = 0x00;

/// Round a chunk length up to the chunk alignment.
#[inline]
pub const fn padded_len(len: usize) -> usize {
    (len + CHUNK_ALIGNMENT - 1) & !(CHUNK_ALIGNMENT - 1)
}

/// Human-readable name of a chunk type tag.
pub fn chunk_type_name(tag: u32) -> String {
    match tag {
        CHUNK_JSON => "JSON".to_string(),
        CHUNK_BIN => "BIN".to_string(),
        other => {
            let bytes = other.to_le_bytes();
            if bytes.iter().all(|b| b.is_ascii_graphic() || *b == 0) {
                String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_string()
            } else {
                format!("0x{:08x}", other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(GLB_MAGIC, b"glTF");
        assert_eq!(u32::from_le_bytes(*GLB_MAGIC), 0x4654_6C67);
    }

    #[test]
    fn test_chunk_tags() {
        assert_eq!(CHUNK_JSON.to_le_bytes(), *b"JSON");
        assert_eq!(CHUNK_BIN.to_le_bytes(), *b"BIN\0");
        assert_eq!(chunk_type_name(CHUNK_JSON), "JSON");
        assert_eq!(chunk_type_name(CHUNK_BIN), "BIN");
        assert_eq!(chunk_type_name(u32::from_le_bytes(*b"EXT1")), "EXT1");
        assert_eq!(chunk_type_name(0xFFFF_FFFF), "0xffffffff");
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(27), 28);
    }
}
