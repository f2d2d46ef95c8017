//! GLB binary container.
//!
//! GLB wraps a glTF JSON document and an optional binary payload.
//! All integers are little-endian.
//!
//! ## File Structure
//!
//! ```text
//! +------------------+
//! | Magic: "glTF"    |  4 bytes
//! +------------------+
//! | Version (2)      |  4 bytes (u32 LE)
//! +------------------+
//! | Total length     |  4 bytes (u32 LE)
//! +------------------+
//! | JSON chunk       |  length u32, type "JSON", data (space padded)
//! +------------------+
//! | BIN chunk        |  length u32, type "BIN\0", data (zero padded), optional
//! +------------------+
//! ```

mod format;
mod reader;
mod writer;

pub use format::*;
pub use reader::*;
pub use writer::*;
