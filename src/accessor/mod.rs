//! Accessor and buffer view decoding.
//!
//! Turns `(accessor, bufferView)` metadata plus bytes resolved through a
//! [`DataStore`](crate::source::DataStore) into typed numeric sequences:
//! - [`Accessor`] / [`BufferView`] / [`Sparse`] - Plain metadata records
//! - [`decode`] / [`apply_sparse`] - Dense decode and sparse overlay
//! - [`AccessorReader`] - Resolves views by index and applies sparse data
//! - [`Decoded`] - Typed result with glam conversions
//! - [`AccessorCache`] - Shared cache of decoded accessors

mod types;
mod data;
mod decode;
mod cache;

pub use types::*;
pub use data::*;
pub use decode::*;
pub use cache::*;
