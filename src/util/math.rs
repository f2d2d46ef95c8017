//! Math type re-exports and componentwise bounds.
//!
//! Decoded accessor data converts into `glam` types; accessor `min`/`max`
//! metadata is checked with [`Bounds`].

pub use glam::{Mat2, Mat3, Mat4, Quat, UVec4, Vec2, Vec3, Vec4};

use smallvec::SmallVec;
use std::fmt;

/// Componentwise min/max over accessor elements.
///
/// Up to four components (a `VEC4`) are stored inline; matrices spill to the heap.
#[derive(Clone, PartialEq)]
pub struct Bounds {
    pub min: SmallVec<[f64; 4]>,
    pub max: SmallVec<[f64; 4]>,
}

impl Bounds {
    /// Empty bounds (inverted, will expand on first element).
    pub fn empty(num_components: usize) -> Self {
        Self {
            min: smallvec::smallvec![f64::INFINITY; num_components],
            max: smallvec::smallvec![f64::NEG_INFINITY; num_components],
        }
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.min.len()
    }

    /// True until the first element is added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(&self.max).any(|(lo, hi)| lo > hi)
    }

    /// Expand to include one element.
    pub fn expand_by_element(&mut self, element: &[f64]) {
        for ((lo, hi), &v) in self.min.iter_mut().zip(self.max.iter_mut()).zip(element) {
            *lo = lo.min(v);
            *hi = hi.max(v);
        }
    }

    /// True when every component of `self` lies within `outer` (with tolerance).
    pub fn within(&self, outer_min: &[f64], outer_max: &[f64], tolerance: f64) -> bool {
        self.min.len() == outer_min.len()
            && self.max.len() == outer_max.len()
            && self.min.iter().zip(outer_min).all(|(v, o)| *v >= o - tolerance)
            && self.max.iter().zip(outer_max).all(|(v, o)| *v <= o + tolerance)
    }
}

impl fmt::Debug for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounds({:?} - {:?})", self.min.as_slice(), self.max.as_slice())
    }
}
