//! GLB container writer.
//!
//! Assembles a JSON document and an optional second chunk into container
//! bytes. JSON is padded with spaces and BIN with zeros to 4-byte alignment;
//! the padding is counted in each chunk's declared length.

use super::format::*;
use super::reader::{Chunk, ChunkKind, Container};
use crate::util::{Error, Result};

/// Builder for GLB container bytes.
#[derive(Clone, Debug)]
pub struct GlbBuilder {
    json: String,
    second: Option<(u32, Vec<u8>)>,
}

impl GlbBuilder {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into(), second: None }
    }

    /// Attach a BIN chunk.
    pub fn with_binary(self, data: Vec<u8>) -> Self {
        self.with_chunk(CHUNK_BIN, data)
    }

    /// Attach a second chunk with an arbitrary type tag.
    pub fn with_chunk(mut self, tag: u32, data: Vec<u8>) -> Self {
        self.second = Some((tag, data));
        self
    }

    /// Build the container in memory.
    pub fn container(&self) -> Result<Container> {
        let json = pad(self.json.as_bytes().to_vec(), JSON_PADDING);
        let json = Chunk::new(ChunkKind::Json, json);

        let second = self.second.as_ref().map(|(tag, data)| {
            let fill = if *tag == CHUNK_JSON { JSON_PADDING } else { BIN_PADDING };
            Chunk::new(ChunkKind::from_tag(*tag), pad(data.clone(), fill))
        });

        let total = HEADER_SIZE + json.span() + second.as_ref().map_or(0, Chunk::span);
        let length = u32::try_from(total)
            .map_err(|_| Error::invalid(format!("container of {} bytes exceeds u32 length", total)))?;

        Ok(Container {
            magic: *GLB_MAGIC,
            version: GLB_VERSION,
            length,
            json,
            second,
        })
    }

    /// Build container bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        Ok(write(&self.container()?))
    }
}

fn pad(mut data: Vec<u8>, fill: u8) -> Vec<u8> {
    data.resize(padded_len(data.len()), fill);
    data
}

/// Serialize a container exactly as its fields describe.
///
/// Declared lengths are written as-is; no padding is added, so a parsed
/// container re-serializes to its original bytes.
pub fn write(container: &Container) -> Vec<u8> {
    let mut out = Vec::with_capacity(container.length as usize);
    out.extend_from_slice(&container.magic);
    out.extend_from_slice(&container.version.to_le_bytes());
    out.extend_from_slice(&container.length.to_le_bytes());
    for chunk in std::iter::once(&container.json).chain(container.second.as_ref()) {
        out.extend_from_slice(&chunk.length.to_le_bytes());
        out.extend_from_slice(&chunk.kind.tag().to_le_bytes());
        out.extend_from_slice(&chunk.data);
    }
    out
}

impl Container {
    /// Serialize back to container bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        write(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::parse;

    #[test]
    fn test_build_json_only() {
        let json = r#"{"asset":{"version":"2.0"}}"#;
        let bytes = GlbBuilder::new(json).build().unwrap();
        assert_eq!(bytes.len(), 12 + 8 + 28);
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 48);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 28);
        assert_eq!(bytes[47], b' ');
    }

    #[test]
    fn test_bin_padding() {
        let c = GlbBuilder::new("{}").with_binary(vec![1, 2, 3]).container().unwrap();
        let bin = c.second.unwrap();
        assert_eq!(bin.length, 4);
        assert_eq!(bin.data, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_reserialize() {
        let bytes = GlbBuilder::new(r#"{"buffers":[{"byteLength":5}]}"#)
            .with_binary(vec![5; 5])
            .build()
            .unwrap();
        let c = parse(&bytes).unwrap();
        assert_eq!(c.to_bytes(), bytes);
    }
}
