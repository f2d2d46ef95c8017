//! Keyframe animation sampling.
//!
//! - [`Sampler`] - Keyframe times, values and an [`Interpolation`] mode
//! - [`Keyframe`] - Value arithmetic for f32, glam vectors, quaternions and morph weights
//! - [`Channel`] - Binds a shared sampler to one node property
//! - [`Timeline`] - Named set of channels with a duration

mod interpolation;
mod sampler;
mod channel;

pub use interpolation::*;
pub use sampler::*;
pub use channel::*;
