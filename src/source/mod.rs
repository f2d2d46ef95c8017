//! Data source resolution.
//!
//! Answers "bytes for buffer N" and "byte range of buffer N" regardless of
//! whether the bytes live in the container's BIN chunk, an external file or
//! an inline `data:` URI. Nothing here knows about accessors or views.

mod store;
mod uri;
mod loader;

pub use store::*;
pub use uri::*;
pub use loader::*;
