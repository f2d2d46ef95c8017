//! Accessor shapes and element types.

use super::{ComponentType, Error, Result};
use std::fmt;

/// Shape of one accessor element: scalar, vector or matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub const ALL: [Self; 7] = [
        Self::Scalar,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Mat2,
        Self::Mat3,
        Self::Mat4,
    ];

    /// Number of components per element.
    #[inline]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Format name as stored in the document (`"VEC3"` etc).
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "SCALAR" => Ok(Self::Scalar),
            "VEC2" => Ok(Self::Vec2),
            "VEC3" => Ok(Self::Vec3),
            "VEC4" => Ok(Self::Vec4),
            "MAT2" => Ok(Self::Mat2),
            "MAT3" => Ok(Self::Mat3),
            "MAT4" => Ok(Self::Mat4),
            other => Err(Error::unsupported(format!("accessor type {:?}", other))),
        }
    }

    /// Matrices are stored column-major; no transposition happens on decode.
    #[inline]
    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }
}

impl fmt::Display for AccessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ElementType combines a [`ComponentType`] with an [`AccessorType`].
///
/// For example, a position attribute is Float32 with shape Vec3 (12 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    pub component: ComponentType,
    pub shape: AccessorType,
}

impl ElementType {
    #[inline]
    pub const fn new(component: ComponentType, shape: AccessorType) -> Self {
        Self { component, shape }
    }

    /// Component width x component count.
    #[inline]
    pub const fn num_bytes(&self) -> usize {
        self.component.num_bytes() * self.shape.num_components()
    }

    #[inline]
    pub const fn num_components(&self) -> usize {
        self.shape.num_components()
    }

    pub const SCALARF: Self = Self::new(ComponentType::Float32, AccessorType::Scalar);
    pub const VEC2F: Self = Self::new(ComponentType::Float32, AccessorType::Vec2);
    pub const VEC3F: Self = Self::new(ComponentType::Float32, AccessorType::Vec3);
    pub const VEC4F: Self = Self::new(ComponentType::Float32, AccessorType::Vec4);
    pub const MAT4F: Self = Self::new(ComponentType::Float32, AccessorType::Mat4);
    pub const INDEX_U16: Self = Self::new(ComponentType::Uint16, AccessorType::Scalar);
    pub const INDEX_U32: Self = Self::new(ComponentType::Uint32, AccessorType::Scalar);
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shape == AccessorType::Scalar {
            write!(f, "{}", self.component)
        } else {
            write!(f, "{}[{}]", self.component, self.shape)
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
