//! Interpolation modes and keyframe value arithmetic.

use std::fmt;

use crate::accessor::Decoded;
use crate::util::{Error, Quat, Result, Vec2, Vec3, Vec4};

/// How a sampler blends between keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Componentwise linear blend.
    #[default]
    Linear,
    /// Hold the previous keyframe until the next one.
    Step,
    /// Cubic Hermite spline; outputs are `[in-tangent, value, out-tangent]` per keyframe.
    CubicSpline,
}

impl Interpolation {
    /// Format name as stored in the document.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Step => "STEP",
            Self::CubicSpline => "CUBICSPLINE",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "LINEAR" => Ok(Self::Linear),
            "STEP" => Ok(Self::Step),
            "CUBICSPLINE" => Ok(Self::CubicSpline),
            other => Err(Error::unsupported(format!("interpolation {:?}", other))),
        }
    }

    /// Output values stored per keyframe.
    #[inline]
    pub const fn output_multiplier(self) -> usize {
        match self {
            Self::Linear | Self::Step => 1,
            Self::CubicSpline => 3,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value that can be animated: added, subtracted and scaled componentwise.
///
/// Quaternions are treated as plain 4-vectors; renormalization is left to
/// whoever composes the transform.
pub trait Keyframe: Clone + fmt::Debug + Send + Sync {
    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn scale(&self, s: f32) -> Self;

    /// Extract `count` values from a decoded sampler output accessor.
    fn from_output(output: &Decoded, count: usize) -> Result<Vec<Self>>;

    /// Component count for variable-length values; `None` for fixed-size types.
    #[inline]
    fn arity(&self) -> Option<usize> {
        None
    }

    /// `self + f * (other - self)`
    #[inline]
    fn lerp(&self, other: &Self, f: f32) -> Self {
        self.add(&other.sub(self).scale(f))
    }
}

/// Cubic Hermite blend between `v1` and `v2` with tangents scaled by the
/// interval length `h`.
pub fn hermite<T: Keyframe>(v1: &T, out1: &T, v2: &T, in2: &T, f: f32, h: f32) -> T {
    let f2 = f * f;
    let f3 = f2 * f;
    v1.scale(2.0 * f3 - 3.0 * f2 + 1.0)
        .add(&out1.scale((f3 - 2.0 * f2 + f) * h))
        .add(&v2.scale(-2.0 * f3 + 3.0 * f2))
        .add(&in2.scale((f3 - f2) * h))
}

fn check_count<T>(values: Vec<T>, count: usize) -> Result<Vec<T>> {
    if values.len() != count {
        return Err(Error::OutputLength { expected: count, actual: values.len() });
    }
    Ok(values)
}

impl Keyframe for f32 {
    #[inline]
    fn add(&self, other: &Self) -> Self {
        self + other
    }

    #[inline]
    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    #[inline]
    fn scale(&self, s: f32) -> Self {
        self * s
    }

    fn from_output(output: &Decoded, count: usize) -> Result<Vec<Self>> {
        check_count(output.to_scalars()?, count)
    }
}

macro_rules! impl_keyframe_glam {
    ($ty:ty, $convert:ident) => {
        impl Keyframe for $ty {
            #[inline]
            fn add(&self, other: &Self) -> Self {
                *self + *other
            }

            #[inline]
            fn sub(&self, other: &Self) -> Self {
                *self - *other
            }

            #[inline]
            fn scale(&self, s: f32) -> Self {
                *self * s
            }

            fn from_output(output: &Decoded, count: usize) -> Result<Vec<Self>> {
                check_count(output.$convert()?, count)
            }
        }
    };
}

impl_keyframe_glam!(Vec2, to_vec2);
impl_keyframe_glam!(Vec3, to_vec3);
impl_keyframe_glam!(Vec4, to_vec4);

impl Keyframe for Quat {
    #[inline]
    fn add(&self, other: &Self) -> Self {
        Quat::from_vec4(Vec4::from(*self) + Vec4::from(*other))
    }

    #[inline]
    fn sub(&self, other: &Self) -> Self {
        Quat::from_vec4(Vec4::from(*self) - Vec4::from(*other))
    }

    #[inline]
    fn scale(&self, s: f32) -> Self {
        Quat::from_vec4(Vec4::from(*self) * s)
    }

    fn from_output(output: &Decoded, count: usize) -> Result<Vec<Self>> {
        check_count(output.to_quats()?, count)
    }
}

/// Morph target weights: one value per target.
impl Keyframe for Vec<f32> {
    fn add(&self, other: &Self) -> Self {
        self.iter().zip(other).map(|(a, b)| a + b).collect()
    }

    fn sub(&self, other: &Self) -> Self {
        self.iter().zip(other).map(|(a, b)| a - b).collect()
    }

    fn scale(&self, s: f32) -> Self {
        self.iter().map(|a| a * s).collect()
    }

    #[inline]
    fn arity(&self) -> Option<usize> {
        Some(self.len())
    }

    /// Scalar output split evenly into `count` groups.
    fn from_output(output: &Decoded, count: usize) -> Result<Vec<Self>> {
        let flat = output.to_scalars()?;
        if count == 0 {
            return match flat.len() {
                0 => Ok(Vec::new()),
                n => Err(Error::OutputLength { expected: 0, actual: n }),
            };
        }
        if flat.is_empty() || flat.len() % count != 0 {
            return Err(Error::OutputLength { expected: count, actual: flat.len() });
        }
        let targets = flat.len() / count;
        Ok(flat.chunks_exact(targets).map(<[f32]>::to_vec).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::ComponentData;
    use crate::util::{AccessorType, ComponentType};

    #[test]
    fn test_names() {
        for mode in [Interpolation::Linear, Interpolation::Step, Interpolation::CubicSpline] {
            assert_eq!(Interpolation::from_name(mode.name()).unwrap(), mode);
        }
        assert!(Interpolation::from_name("SLERP").is_err());
        assert_eq!(Interpolation::default(), Interpolation::Linear);
        assert_eq!(Interpolation::CubicSpline.output_multiplier(), 3);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(Keyframe::lerp(&0.0f32, &10.0, 0.5), 5.0);
        assert_eq!(Keyframe::lerp(&Vec3::ZERO, &Vec3::new(2.0, 4.0, 6.0), 0.5), Vec3::new(1.0, 2.0, 3.0));
        let q = Keyframe::lerp(&Quat::IDENTITY, &Quat::from_xyzw(1.0, 0.0, 0.0, 0.0), 0.5);
        // Componentwise, not renormalized.
        assert_eq!(Vec4::from(q), Vec4::new(0.5, 0.0, 0.0, 0.5));
        assert_eq!(Keyframe::lerp(&vec![0.0f32, 1.0], &vec![1.0, 0.0], 0.25), vec![0.25, 0.75]);
    }

    #[test]
    fn test_hermite_basis() {
        // Zero tangents at f = 0.5: weights (0.5, 0, 0.5, 0).
        let v = hermite(&2.0f32, &0.0, &6.0, &0.0, 0.5, 1.0);
        assert_eq!(v, 4.0);
        // Endpoints reproduce the keyframe values.
        assert_eq!(hermite(&2.0f32, &5.0, &6.0, &-3.0, 0.0, 2.0), 2.0);
        assert_eq!(hermite(&2.0f32, &5.0, &6.0, &-3.0, 1.0, 2.0), 6.0);
    }

    #[test]
    fn test_hermite_tangent_scaling() {
        // out1 weight at f=0.5 is 0.125 * h.
        let h1 = hermite(&0.0f32, &1.0, &0.0, &0.0, 0.5, 1.0);
        let h4 = hermite(&0.0f32, &1.0, &0.0, &0.0, 0.5, 4.0);
        assert_eq!(h1, 0.125);
        assert_eq!(h4, 0.5);
    }

    #[test]
    fn test_weights_from_output() {
        let d = Decoded::new(
            AccessorType::Scalar,
            ComponentType::Float32,
            ComponentData::F32(vec![0.0, 1.0, 0.5, 0.5, 1.0, 0.0]),
        );
        let w = <Vec<f32>>::from_output(&d, 3).unwrap();
        assert_eq!(w, vec![vec![0.0, 1.0], vec![0.5, 0.5], vec![1.0, 0.0]]);
        assert!(<Vec<f32>>::from_output(&d, 4).is_err());
        assert!(f32::from_output(&d, 5).is_err());
    }

    #[test]
    fn test_weights_zero_count() {
        let d = Decoded::new(AccessorType::Scalar, ComponentType::Float32, ComponentData::F32(vec![0.5, 0.5]));
        assert!(matches!(
            <Vec<f32>>::from_output(&d, 0),
            Err(Error::OutputLength { expected: 0, actual: 2 })
        ));
        let empty = Decoded::new(AccessorType::Scalar, ComponentType::Float32, ComponentData::F32(vec![]));
        assert!(<Vec<f32>>::from_output(&empty, 0).unwrap().is_empty());
    }

    #[test]
    fn test_arity() {
        assert_eq!(1.0f32.arity(), None);
        assert_eq!(Vec3::ONE.arity(), None);
        assert_eq!(vec![0.0f32; 3].arity(), Some(3));
    }
}
