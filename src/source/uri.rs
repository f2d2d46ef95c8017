//! Buffer URI parsing: `data:` URIs and relative file references.

use std::path::{Component, Path, PathBuf};

use base64::Engine;

use crate::util::{Error, Result};

/// A parsed `data:<mime>;base64,<payload>` URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Media type, possibly empty (`data:;base64,...`).
    pub mime: &'a str,
    /// Base64 text after the comma.
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse the `data:` grammar. Only base64 payloads are supported.
    pub fn parse(uri: &'a str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidDataUri(truncate(uri)))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUri(format!("missing ',' in {}", truncate(uri))))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidDataUri(format!("not base64-encoded: {}", truncate(uri))))?;
        Ok(Self { mime, payload })
    }

    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.payload.trim())
            .map_err(|e| Error::InvalidBase64(e.to_string()))
    }
}

/// True when `uri` is an inline `data:` URI.
#[inline]
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// Resolve a relative buffer URI under `base`.
///
/// Percent-escapes are decoded and a `file://` prefix is accepted. URIs with
/// any other scheme are rejected: fetching remote bytes is the caller's job.
/// The result never leaves `base`: absolute paths and `..` segments that
/// climb above it are errors.
pub fn resolve_path(uri: &str, base: &Path) -> Result<PathBuf> {
    let uri = uri.strip_prefix("file://").unwrap_or(uri);
    if let Some(scheme) = scheme(uri) {
        return Err(Error::InvalidDataUri(format!("unsupported scheme {:?} in {}", scheme, uri)));
    }
    let decoded = percent_decode(uri)?;
    let relative = Path::new(&decoded);
    if relative.is_absolute() {
        return Err(Error::InvalidDataUri(format!("absolute path {}", decoded)));
    }
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::InvalidDataUri(format!("path escapes base: {}", decoded)))?;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidDataUri(format!("absolute path {}", decoded)));
            }
        }
    }
    Ok(base.join(relative))
}

/// URI scheme, if any. Single letters are Windows drive prefixes, not schemes.
fn scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let valid = scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn percent_decode(s: &str) -> Result<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| Error::InvalidDataUri(format!("bad percent escape in {}", s)))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| Error::InvalidDataUri(e.to_string()))
}

fn truncate(uri: &str) -> String {
    const MAX: usize = 48;
    match uri.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &uri[..end]),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri() {
        let uri = DataUri::parse("data:application/octet-stream;base64,AAECAw==").unwrap();
        assert_eq!(uri.mime, "application/octet-stream");
        assert_eq!(uri.decode().unwrap(), vec![0, 1, 2, 3]);

        let uri = DataUri::parse("data:;base64,").unwrap();
        assert_eq!(uri.mime, "");
        assert!(uri.decode().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(matches!(DataUri::parse("buffer.bin"), Err(Error::InvalidDataUri(_))));
        assert!(matches!(DataUri::parse("data:application/octet-stream"), Err(Error::InvalidDataUri(_))));
        assert!(matches!(DataUri::parse("data:text/plain,hello"), Err(Error::InvalidDataUri(_))));
    }

    #[test]
    fn test_invalid_base64() {
        let uri = DataUri::parse("data:application/gltf-buffer;base64,@@@").unwrap();
        assert!(matches!(uri.decode(), Err(Error::InvalidBase64(_))));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/assets/model");
        assert_eq!(resolve_path("mesh.bin", base).unwrap(), base.join("mesh.bin"));
        assert_eq!(resolve_path("my%20mesh.bin", base).unwrap(), base.join("my mesh.bin"));
        assert_eq!(resolve_path("file://mesh.bin", base).unwrap(), base.join("mesh.bin"));
        assert!(matches!(resolve_path("https://x/y.bin", base), Err(Error::InvalidDataUri(_))));
        assert!(matches!(resolve_path("bad%zz.bin", base), Err(Error::InvalidDataUri(_))));
        assert!(!is_data_uri("mesh.bin"));
    }

    #[test]
    fn test_resolve_path_stays_under_base() {
        let base = Path::new("/assets/model");
        for uri in ["/etc/x", "../../x", "../x", "sub/../../x", "%2Fetc%2Fx", "..%2F..%2Fx", "file:///etc/x"] {
            assert!(
                matches!(resolve_path(uri, base), Err(Error::InvalidDataUri(_))),
                "{} should be rejected",
                uri
            );
        }
        assert_eq!(resolve_path("sub/../mesh.bin", base).unwrap(), base.join("sub/../mesh.bin"));
        assert_eq!(resolve_path("./mesh.bin", base).unwrap(), base.join("./mesh.bin"));
        assert!(resolve_path("sub/mesh.bin", base).unwrap().starts_with(base));
    }
}
