//! # glbkit
//!
//! Binary data access for glTF 2.0 assets: the GLB container, buffer
//! sources, accessor decoding and keyframe animation sampling.
//!
//! JSON is handed out as text (or a `serde_json::Value`); mapping it into
//! records is left to the caller, who builds [`accessor::Accessor`] and
//! [`accessor::BufferView`] values from it.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (component and shape tables, errors, math)
//! - [`glb`] - GLB container parsing, validation and writing
//! - [`source`] - Buffer bytes from embedded, external and inline sources
//! - [`accessor`] - Typed decoding of accessors, including sparse data
//! - [`animation`] - Samplers, channels and timelines
//!
//! ## Example
//!
//! ```ignore
//! use glbkit::prelude::*;
//!
//! let container = Container::open("model.glb")?;
//! let mut store = DataStore::new();
//! container.register(&mut store);
//!
//! let views = vec![BufferView::new(0, 0, 48)];
//! let reader = AccessorReader::new(&views, &store);
//! let times = reader.read(&Accessor::new(0, ComponentType::Float32, AccessorType::Scalar, 4))?;
//! let moves = reader.read(&Accessor::new(0, ComponentType::Float32, AccessorType::Vec3, 4).with_offset(16))?;
//!
//! let sampler = Sampler::<Vec3>::from_decoded(&times, &moves, Interpolation::Linear)?;
//! let timeline = Timeline::with_channels("bounce", vec![Channel::translation(0, sampler.into())]);
//! for sample in timeline.sample(0.5) {
//!     println!("node {} -> {:?}", sample.node, sample.value);
//! }
//! ```

pub mod util;
pub mod glb;
pub mod source;
pub mod accessor;
pub mod animation;

// Re-export commonly used types
pub use util::{AccessorType, ComponentType, Error, Result};
pub use glb::{Container, GlbBuilder};
pub use source::DataStore;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{AccessorType, ComponentType, ElementType, Error, Result, Stage};
    pub use crate::util::{Quat, Vec2, Vec3, Vec4};
    pub use crate::glb::{Container, GlbBuilder, ParseOptions};
    pub use crate::source::{BufferOrigin, DataStore, LoadOptions};
    pub use crate::accessor::{Accessor, AccessorCache, AccessorReader, BufferView, Decoded, Sparse};
    pub use crate::animation::{Channel, ChannelValue, Interpolation, Sampler, TargetProperty, Timeline};
}
