//! I/O-performing loads into a [`DataStore`].

use std::fs::File;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use super::store::{BufferBytes, BufferOrigin, DataStore};
use super::uri::{is_data_uri, resolve_path, DataUri};
use crate::util::{Error, Result};

/// Options for loading external buffer files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Memory-map external files instead of reading them into memory.
    pub use_mmap: bool,
    /// Reject files larger than this many bytes.
    pub max_file_size: Option<u64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            use_mmap: cfg!(feature = "mmap"),
            max_file_size: None,
        }
    }
}

impl DataStore {
    /// Read `uri` relative to `base_path` and store it as external data.
    pub fn load_external(&mut self, index: usize, uri: &str, base_path: impl AsRef<Path>) -> Result<()> {
        self.load_external_opts(index, uri, base_path, LoadOptions::default())
    }

    /// [`load_external`](Self::load_external) with explicit options.
    #[tracing::instrument(skip(self, base_path, options), fields(use_mmap = options.use_mmap))]
    pub fn load_external_opts(
        &mut self,
        index: usize,
        uri: &str,
        base_path: impl AsRef<Path>,
        options: LoadOptions,
    ) -> Result<()> {
        let path = resolve_path(uri, base_path.as_ref())?;
        let bytes = read_file(&path, options)?;
        tracing::debug!(index, path = %path.display(), len = bytes.len(), "Loaded external buffer");
        self.store(BufferOrigin::External, index, bytes);
        Ok(())
    }

    /// Decode a base64 `data:` URI and store it as inline data.
    pub fn load_inline(&mut self, index: usize, data_uri: &str) -> Result<()> {
        let uri = DataUri::parse(data_uri)?;
        let bytes = uri.decode()?;
        tracing::debug!(index, mime = uri.mime, len = bytes.len(), "Decoded inline buffer");
        self.store(BufferOrigin::Inline, index, bytes);
        Ok(())
    }

    /// Load a document buffer URI: `data:` URIs inline, anything else from disk.
    pub fn load_uri(&mut self, index: usize, uri: &str, base_path: impl AsRef<Path>) -> Result<()> {
        if is_data_uri(uri) {
            self.load_inline(index, uri)
        } else {
            self.load_external(index, uri, base_path)
        }
    }
}

fn read_file(path: &Path, options: LoadOptions) -> Result<BufferBytes> {
    let file = File::open(path).map_err(|e| Error::from_io(path, e))?;
    let size = file.metadata().map_err(|e| Error::from_io(path, e))?.len();

    if let Some(max) = options.max_file_size {
        if size > max {
            return Err(Error::invalid(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                size,
                max
            )));
        }
    }

    #[cfg(feature = "mmap")]
    {
        if options.use_mmap && size > 0 {
            // Safety: mapped read-only; the store never hands out mutable access.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::from_io(path, e))?;
            return Ok(BufferBytes::Mapped(mmap));
        }
    }

    let mut file = file;
    let mut buf = Vec::with_capacity(size as usize);
    std::io::Read::read_to_end(&mut file, &mut buf).map_err(|e| Error::from_io(path, e))?;
    Ok(BufferBytes::Owned(buf))
}
