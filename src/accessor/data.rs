//! Decoded accessor data.

use crate::util::{
    AccessorType, Bounds, Component, ComponentType, Error, Mat2, Mat3, Mat4, Quat, Result, Vec2,
    Vec3, Vec4,
};

/// Flat component storage, one variant per component type.
///
/// Normalized integer accessors decode straight to `F32`.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

/// Apply `$body` to the inner vector of any variant.
macro_rules! with_components {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ComponentData::I8($v) => $body,
            ComponentData::U8($v) => $body,
            ComponentData::I16($v) => $body,
            ComponentData::U16($v) => $body,
            ComponentData::U32($v) => $body,
            ComponentData::F32($v) => $body,
        }
    };
}

impl ComponentData {
    /// `len` zero components of the given type.
    pub fn zeroed(component_type: ComponentType, len: usize) -> Self {
        match component_type {
            ComponentType::Int8 => Self::I8(vec![0; len]),
            ComponentType::Uint8 => Self::U8(vec![0; len]),
            ComponentType::Int16 => Self::I16(vec![0; len]),
            ComponentType::Uint16 => Self::U16(vec![0; len]),
            ComponentType::Uint32 => Self::U32(vec![0; len]),
            ComponentType::Float32 => Self::F32(vec![0.0; len]),
        }
    }

    /// Number of components (not elements).
    pub fn len(&self) -> usize {
        with_components!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type of the components.
    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::I8(_) => ComponentType::Int8,
            Self::U8(_) => ComponentType::Uint8,
            Self::I16(_) => ComponentType::Int16,
            Self::U16(_) => ComponentType::Uint16,
            Self::U32(_) => ComponentType::Uint32,
            Self::F32(_) => ComponentType::Float32,
        }
    }

    /// Numeric conversion to f32 (no rescaling).
    pub fn to_f32(&self) -> Vec<f32> {
        with_components!(self, v => v.iter().map(|c| c.to_f32()).collect())
    }

    fn to_f64(&self) -> Vec<f64> {
        with_components!(self, v => v.iter().map(|c| c.to_f32() as f64).collect())
    }

    /// Overwrite components `[dst, dst + width)` with `src[src_at..src_at + width]`.
    pub(crate) fn copy_range(&mut self, dst: usize, src: &Self, src_at: usize, width: usize) -> Result<()> {
        fn copy<T: Copy>(d: &mut [T], dst: usize, s: &[T], src_at: usize, width: usize) {
            d[dst..dst + width].copy_from_slice(&s[src_at..src_at + width]);
        }
        match (self, src) {
            (Self::I8(d), Self::I8(s)) => copy(d, dst, s, src_at, width),
            (Self::U8(d), Self::U8(s)) => copy(d, dst, s, src_at, width),
            (Self::I16(d), Self::I16(s)) => copy(d, dst, s, src_at, width),
            (Self::U16(d), Self::U16(s)) => copy(d, dst, s, src_at, width),
            (Self::U32(d), Self::U32(s)) => copy(d, dst, s, src_at, width),
            (Self::F32(d), Self::F32(s)) => copy(d, dst, s, src_at, width),
            (d, s) => {
                return Err(Error::unsupported(format!(
                    "cannot copy {} components into {}",
                    s.component_type(),
                    d.component_type()
                )))
            }
        }
        Ok(())
    }
}

/// A decoded accessor: `count` elements of `shape`, flattened.
///
/// Matrices stay column-major as stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub shape: AccessorType,
    /// Encoding in the buffer (before any normalization).
    pub source_type: ComponentType,
    pub data: ComponentData,
}

impl Decoded {
    pub fn new(shape: AccessorType, source_type: ComponentType, data: ComponentData) -> Self {
        Self { shape, source_type, data }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.shape.num_components()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// In-memory size of the decoded components.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.data.len() * self.data.component_type().num_bytes()
    }

    /// Borrow the components when stored as f32 (float or normalized).
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            ComponentData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// All components as f32.
    pub fn to_f32(&self) -> Vec<f32> {
        self.data.to_f32()
    }

    /// Components of element `index` as f32.
    pub fn element_f32(&self, index: usize) -> Option<Vec<f32>> {
        let n = self.shape.num_components();
        let start = index.checked_mul(n)?;
        if start + n > self.data.len() {
            return None;
        }
        let element: Vec<f32> =
            with_components!(&self.data, v => v[start..start + n].iter().map(|c| c.to_f32()).collect());
        Some(element)
    }

    fn expect_shape(&self, shape: AccessorType) -> Result<()> {
        if self.shape != shape {
            return Err(Error::unsupported(format!("expected {} elements, got {}", shape, self.shape)));
        }
        Ok(())
    }

    fn chunks<T>(&self, shape: AccessorType, f: impl Fn(&[f32]) -> T) -> Result<Vec<T>> {
        self.expect_shape(shape)?;
        Ok(self.to_f32().chunks_exact(shape.num_components()).map(f).collect())
    }

    pub fn to_scalars(&self) -> Result<Vec<f32>> {
        self.expect_shape(AccessorType::Scalar)?;
        Ok(self.to_f32())
    }

    pub fn to_vec2(&self) -> Result<Vec<Vec2>> {
        self.chunks(AccessorType::Vec2, Vec2::from_slice)
    }

    pub fn to_vec3(&self) -> Result<Vec<Vec3>> {
        self.chunks(AccessorType::Vec3, Vec3::from_slice)
    }

    pub fn to_vec4(&self) -> Result<Vec<Vec4>> {
        self.chunks(AccessorType::Vec4, Vec4::from_slice)
    }

    /// VEC4 elements as `(x, y, z, w)` quaternions, not renormalized.
    pub fn to_quats(&self) -> Result<Vec<Quat>> {
        self.chunks(AccessorType::Vec4, |c| Quat::from_xyzw(c[0], c[1], c[2], c[3]))
    }

    pub fn to_mat2(&self) -> Result<Vec<Mat2>> {
        self.chunks(AccessorType::Mat2, Mat2::from_cols_slice)
    }

    pub fn to_mat3(&self) -> Result<Vec<Mat3>> {
        self.chunks(AccessorType::Mat3, Mat3::from_cols_slice)
    }

    pub fn to_mat4(&self) -> Result<Vec<Mat4>> {
        self.chunks(AccessorType::Mat4, Mat4::from_cols_slice)
    }

    /// Unsigned scalar data as indices.
    pub fn to_indices(&self) -> Result<Vec<u32>> {
        self.expect_shape(AccessorType::Scalar)?;
        match &self.data {
            ComponentData::U8(v) => Ok(v.iter().filter_map(|c| c.to_index()).collect()),
            ComponentData::U16(v) => Ok(v.iter().filter_map(|c| c.to_index()).collect()),
            ComponentData::U32(v) => Ok(v.clone()),
            other => Err(Error::unsupported(format!(
                "{} data cannot be used as indices",
                other.component_type()
            ))),
        }
    }

    /// Componentwise min/max over all elements.
    pub fn bounds(&self) -> Bounds {
        let n = self.shape.num_components();
        let mut bounds = Bounds::empty(n);
        for element in self.data.to_f64().chunks_exact(n) {
            bounds.expand_by_element(element);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec3s(values: Vec<f32>) -> Decoded {
        Decoded::new(AccessorType::Vec3, ComponentType::Float32, ComponentData::F32(values))
    }

    #[test]
    fn test_len() {
        let d = vec3s(vec![0.0; 9]);
        assert_eq!(d.len(), 3);
        assert_eq!(d.data.len(), 9);
        assert!(!d.is_empty());
    }

    #[test]
    fn test_typed_views() {
        let d = vec3s(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(d.to_vec3().unwrap(), vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert!(d.to_vec4().is_err());
        assert_eq!(d.element_f32(1).unwrap(), vec![1.0, 0.0, 0.0]);
        assert!(d.element_f32(3).is_none());
    }

    #[test]
    fn test_matrix_column_major() {
        let cols: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let d = Decoded::new(AccessorType::Mat4, ComponentType::Float32, ComponentData::F32(cols));
        let m = d.to_mat4().unwrap()[0];
        assert_eq!(m.x_axis, Vec4::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(m.w_axis, Vec4::new(12.0, 13.0, 14.0, 15.0));
    }

    #[test]
    fn test_indices() {
        let d = Decoded::new(AccessorType::Scalar, ComponentType::Uint16, ComponentData::U16(vec![0, 1, 2]));
        assert_eq!(d.to_indices().unwrap(), vec![0, 1, 2]);

        let d = Decoded::new(AccessorType::Scalar, ComponentType::Int16, ComponentData::I16(vec![0]));
        assert!(d.to_indices().is_err());
    }

    #[test]
    fn test_bounds() {
        let d = vec3s(vec![0.0, -1.0, 2.0, 1.0, 3.0, -2.0]);
        let b = d.bounds();
        assert_eq!(b.min.as_slice(), &[0.0, -1.0, -2.0]);
        assert_eq!(b.max.as_slice(), &[1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_copy_range() {
        let mut d = ComponentData::zeroed(ComponentType::Uint8, 6);
        d.copy_range(3, &ComponentData::U8(vec![7, 8, 9]), 0, 3).unwrap();
        assert_eq!(d, ComponentData::U8(vec![0, 0, 0, 7, 8, 9]));
        assert!(d.copy_range(0, &ComponentData::F32(vec![1.0]), 0, 1).is_err());
    }
}
