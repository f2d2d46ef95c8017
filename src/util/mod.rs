//! Utility types and functions for glbkit.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ComponentType`] / [`Component`] - Numeric component encodings
//! - [`AccessorType`] / [`ElementType`] - Element shapes (SCALAR..MAT4)
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod component;
mod shape;
mod error;
mod math;

pub use component::*;
pub use shape::*;
pub use error::*;
pub use math::*;
