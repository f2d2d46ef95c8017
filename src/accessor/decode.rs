//! Accessor decoding: dense reads and sparse overlay.

use super::data::{ComponentData, Decoded};
use super::types::{Accessor, AccessorStorage, BufferView};
use crate::source::DataStore;
use crate::util::{Component, ComponentType, Error, Result};

/// Decode the dense data of an accessor.
///
/// `view` must be the buffer view the accessor references (ignored for
/// zero-filled accessors). Elements start at the absolute offset and advance
/// by the view's stride, or by the element size when tightly packed. Each
/// component is read little-endian; normalized integers are rescaled to f32.
///
/// The scanned region must fit both the view and the buffer held by `store`.
pub fn decode(accessor: &Accessor, view: Option<&BufferView>, store: &DataStore) -> Result<Decoded> {
    let width = accessor.shape.num_components();

    let view = match accessor.storage {
        AccessorStorage::Zeroed => return Ok(zeroed(accessor)),
        AccessorStorage::View(index) => view.ok_or(Error::MissingBufferView(index))?,
    };

    if accessor.count == 0 {
        return Ok(zeroed(accessor));
    }

    let element_size = accessor.element_byte_size();
    let stride = view.stride_for(element_size);
    let bytes = store.get(view.buffer).ok_or(Error::MissingBuffer(view.buffer))?;

    let start = accessor.absolute_offset(view);
    let span = (accessor.count - 1)
        .checked_mul(stride)
        .and_then(|s| s.checked_add(element_size));
    let limit = bytes.len().min(view.end());
    let region = match span.and_then(|span| start.checked_add(span)) {
        Some(end) if end <= limit => &bytes[start..end],
        _ => {
            return Err(Error::OutOfBounds {
                buffer: view.buffer,
                offset: start,
                length: span.unwrap_or(usize::MAX),
                available: limit,
            })
        }
    };

    let count = accessor.count;
    let normalized = accessor.normalized;
    let data = match accessor.component_type {
        ComponentType::Int8 => finish(read_components::<i8>(region, count, width, stride), normalized, ComponentData::I8),
        ComponentType::Uint8 => finish(read_components::<u8>(region, count, width, stride), normalized, ComponentData::U8),
        ComponentType::Int16 => finish(read_components::<i16>(region, count, width, stride), normalized, ComponentData::I16),
        ComponentType::Uint16 => finish(read_components::<u16>(region, count, width, stride), normalized, ComponentData::U16),
        ComponentType::Uint32 => finish(read_components::<u32>(region, count, width, stride), normalized, ComponentData::U32),
        ComponentType::Float32 => ComponentData::F32(read_components::<f32>(region, count, width, stride)),
    };

    tracing::trace!(
        element = %accessor.element_type(),
        count,
        start,
        stride,
        normalized,
        "Decoded accessor"
    );

    Ok(Decoded::new(accessor.shape, accessor.component_type, data))
}

/// Decode into a concrete component type.
///
/// Fails with `UnsupportedType` when `T` does not match the accessor's
/// component type or the accessor is normalized.
pub fn decode_typed<T: Component>(accessor: &Accessor, view: Option<&BufferView>, store: &DataStore) -> Result<Vec<T>> {
    if accessor.component_type != T::COMPONENT_TYPE || (accessor.normalized && T::COMPONENT_TYPE.is_integer()) {
        return Err(Error::unsupported(format!(
            "cannot read {}{} accessor as {}",
            if accessor.normalized { "normalized " } else { "" },
            accessor.component_type,
            T::COMPONENT_TYPE
        )));
    }
    let decoded = decode(accessor, view, store)?;
    let values = match decoded.data {
        ComponentData::I8(v) => bytemuck::allocation::try_cast_vec(v).ok(),
        ComponentData::U8(v) => bytemuck::allocation::try_cast_vec(v).ok(),
        ComponentData::I16(v) => bytemuck::allocation::try_cast_vec(v).ok(),
        ComponentData::U16(v) => bytemuck::allocation::try_cast_vec(v).ok(),
        ComponentData::U32(v) => bytemuck::allocation::try_cast_vec(v).ok(),
        ComponentData::F32(v) => bytemuck::allocation::try_cast_vec(v).ok(),
    };
    values.ok_or_else(|| Error::unsupported(format!("component cast to {}", T::COMPONENT_TYPE)))
}

fn zeroed(accessor: &Accessor) -> Decoded {
    let len = accessor.count * accessor.shape.num_components();
    let storage_type = if accessor.normalized {
        ComponentType::Float32
    } else {
        accessor.component_type
    };
    Decoded::new(accessor.shape, accessor.component_type, ComponentData::zeroed(storage_type, len))
}

fn read_components<T: Component>(region: &[u8], count: usize, width: usize, stride: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(count * width);
    for element in 0..count {
        let base = element * stride;
        for c in 0..width {
            out.push(T::read_le(&region[base + c * T::SIZE..]));
        }
    }
    out
}

fn finish<T: Component>(values: Vec<T>, normalized: bool, wrap: fn(Vec<T>) -> ComponentData) -> ComponentData {
    if normalized {
        ComponentData::F32(values.into_iter().map(Component::normalize).collect())
    } else {
        wrap(values)
    }
}

/// Overlay sparse replacements onto dense data.
///
/// Replacements are applied in ascending index order. A repeated index is
/// not an error: the later entry wins.
pub fn apply_sparse(base: &mut Decoded, indices: &Decoded, values: &Decoded) -> Result<()> {
    let targets = indices.to_indices()?;
    if values.shape != base.shape {
        return Err(Error::unsupported(format!(
            "sparse values are {} but accessor is {}",
            values.shape, base.shape
        )));
    }
    if values.len() != targets.len() {
        return Err(Error::invalid(format!(
            "sparse has {} indices but {} values",
            targets.len(),
            values.len()
        )));
    }

    // Stable sort keeps duplicates in declaration order.
    let mut order: Vec<usize> = (0..targets.len()).collect();
    order.sort_by_key(|&k| targets[k]);
    if order.windows(2).any(|w| targets[w[0]] == targets[w[1]]) {
        tracing::warn!("Sparse accessor has duplicate indices; last value wins");
    }

    let width = base.shape.num_components();
    let count = base.len();
    for k in order {
        let target = targets[k] as usize;
        if target >= count {
            return Err(Error::invalid(format!("sparse index {} >= accessor count {}", target, count)));
        }
        base.data.copy_range(target * width, &values.data, k * width, width)?;
    }
    Ok(())
}

/// Decodes accessors against a document's buffer views and a data store.
#[derive(Clone, Copy)]
pub struct AccessorReader<'a> {
    views: &'a [BufferView],
    store: &'a DataStore,
}

impl<'a> AccessorReader<'a> {
    pub fn new(views: &'a [BufferView], store: &'a DataStore) -> Self {
        Self { views, store }
    }

    pub fn view(&self, index: usize) -> Result<&'a BufferView> {
        self.views.get(index).ok_or(Error::MissingBufferView(index))
    }

    /// Dense data only.
    pub fn dense(&self, accessor: &Accessor) -> Result<Decoded> {
        let view = accessor.buffer_view().map(|i| self.view(i)).transpose()?;
        decode(accessor, view, self.store)
    }

    /// Dense data with the sparse overlay applied, if any.
    pub fn read(&self, accessor: &Accessor) -> Result<Decoded> {
        let mut decoded = self.dense(accessor)?;
        if let Some(sparse) = &accessor.sparse {
            let indices = self.dense(&sparse.indices_accessor()?)?;
            let values = self.dense(&sparse.values_accessor(accessor))?;
            apply_sparse(&mut decoded, &indices, &values)?;
            tracing::trace!(count = sparse.count, "Applied sparse overlay");
        }
        Ok(decoded)
    }

    /// Decode and check the result against the accessor's `min`/`max`.
    pub fn read_checked(&self, accessor: &Accessor) -> Result<Decoded> {
        let decoded = self.read(accessor)?;
        check_bounds(accessor, &decoded)?;
        Ok(decoded)
    }
}

/// Check decoded data against the accessor's declared `min`/`max`.
pub fn check_bounds(accessor: &Accessor, decoded: &Decoded) -> Result<()> {
    const TOLERANCE: f64 = 1e-4;

    let (Some(min), Some(max)) = (&accessor.min, &accessor.max) else {
        return Ok(());
    };
    let n = accessor.shape.num_components();
    if min.len() != n || max.len() != n {
        return Err(Error::invalid(format!(
            "min/max have {}/{} components, {} expected",
            min.len(),
            max.len(),
            n
        )));
    }
    if decoded.is_empty() {
        return Ok(());
    }
    let actual = decoded.bounds();
    if !actual.within(min, max, TOLERANCE) {
        return Err(Error::invalid(format!(
            "decoded {:?} outside declared min {:?} max {:?}",
            actual, min, max
        )));
    }
    Ok(())
}

impl Accessor {
    /// Check decoded data against this accessor's declared `min`/`max`.
    pub fn check_bounds(&self, decoded: &Decoded) -> Result<()> {
        check_bounds(self, decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{Sparse, SparseIndices, SparseValues};
    use crate::source::BufferOrigin;
    use crate::util::{AccessorType, Vec2};

    fn store_with(bytes: Vec<u8>) -> DataStore {
        let mut store = DataStore::new();
        store.store(BufferOrigin::Embedded, 0, bytes);
        store
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        let mut out = Vec::new();
        for v in values {
            v.write_le(&mut out);
        }
        out
    }

    #[test]
    fn test_vec3_float() {
        let values = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let store = store_with(f32_bytes(&values));
        let view = BufferView::new(0, 0, 36);
        let accessor = Accessor::new(0, ComponentType::Float32, AccessorType::Vec3, 3);

        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.as_f32().unwrap(), &values);
    }

    #[test]
    fn test_float_scalars_identity() {
        let values: Vec<f32> = (0..32).map(|i| i as f32 * 0.37 - 4.0).collect();
        let store = store_with(f32_bytes(&values));
        let view = BufferView::new(0, 0, values.len() * 4);
        let accessor = Accessor::new(0, ComponentType::Float32, AccessorType::Scalar, values.len());
        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert_eq!(d.to_scalars().unwrap(), values);
    }

    #[test]
    fn test_strided() {
        // Interleaved: [pos u16 x2][pad u16 x2] per vertex.
        let mut bytes = Vec::new();
        for (a, b) in [(1u16, 2u16), (3, 4), (5, 6)] {
            a.write_le(&mut bytes);
            b.write_le(&mut bytes);
            bytes.extend_from_slice(&[0xEE; 4]);
        }
        let store = store_with(bytes);
        let view = BufferView::new(0, 0, 24).with_stride(8);
        let accessor = Accessor::new(0, ComponentType::Uint16, AccessorType::Vec2, 3);
        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert_eq!(d.data, ComponentData::U16(vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_offsets() {
        let mut bytes = vec![0xAA; 6];
        bytes.extend(f32_bytes(&[7.0, 8.0]));
        let store = store_with(bytes);
        let view = BufferView::new(0, 2, 12);
        let accessor = Accessor::new(0, ComponentType::Float32, AccessorType::Scalar, 2).with_offset(4);
        assert_eq!(accessor.absolute_offset(&view), 6);
        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert_eq!(d.to_f32(), vec![7.0, 8.0]);
    }

    #[test]
    fn test_normalized() {
        let store = store_with(vec![0, 255, 128, 0x80, 0x7F, 0]);
        let view = BufferView::new(0, 0, 6);

        let accessor = Accessor::new(0, ComponentType::Uint8, AccessorType::Vec3, 1).normalized();
        let d = decode(&accessor, Some(&view), &store).unwrap();
        let v = d.as_f32().unwrap();
        assert_eq!(v[0], 0.0);
        assert_eq!(v[1], 1.0);
        assert!((v[2] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(d.source_type, ComponentType::Uint8);

        let accessor = Accessor::new(0, ComponentType::Int8, AccessorType::Vec3, 1)
            .with_offset(3)
            .normalized();
        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert_eq!(d.as_f32().unwrap(), &[-1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_signed_16() {
        let mut bytes = Vec::new();
        for v in [-32767i16, 32767, 0, -1] {
            v.write_le(&mut bytes);
        }
        let store = store_with(bytes);
        let view = BufferView::new(0, 0, 8);
        let accessor = Accessor::new(0, ComponentType::Int16, AccessorType::Vec4, 1);
        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert_eq!(d.data, ComponentData::I16(vec![-32767, 32767, 0, -1]));

        let d = decode(&accessor.clone().normalized(), Some(&view), &store).unwrap();
        assert_eq!(&d.as_f32().unwrap()[..3], &[-1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_all_component_types() {
        let store = store_with(vec![1u8; 64]);
        let view = BufferView::new(0, 0, 64);
        for ct in ComponentType::ALL {
            for shape in AccessorType::ALL {
                let accessor = Accessor::new(0, ct, shape, 1);
                let d = decode(&accessor, Some(&view), &store).unwrap();
                assert_eq!(d.len(), 1);
                assert_eq!(d.data.component_type(), ct);
                assert_eq!(d.data.len(), shape.num_components());
            }
        }
    }

    #[test]
    fn test_count_zero() {
        let store = DataStore::new();
        let view = BufferView::new(0, 0, 4);
        let accessor = Accessor::new(0, ComponentType::Float32, AccessorType::Vec3, 0);
        let d = decode(&accessor, Some(&view), &store).unwrap();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let store = store_with(vec![0u8; 32]);
        let accessor = Accessor::new(0, ComponentType::Float32, AccessorType::Vec3, 3);

        // View claims more than the buffer holds.
        let view = BufferView::new(0, 0, 36);
        let err = decode(&accessor, Some(&view), &store).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { available: 32, .. }));
        assert!(err.is_bounds());

        // Stride pushes the last element past the view.
        let view = BufferView::new(0, 0, 32).with_stride(16);
        assert!(decode(&accessor, Some(&view), &store).unwrap_err().is_bounds());
    }

    #[test]
    fn test_missing_sources() {
        let store = DataStore::new();
        let view = BufferView::new(3, 0, 4);
        let accessor = Accessor::new(5, ComponentType::Float32, AccessorType::Scalar, 1);
        assert!(matches!(decode(&accessor, Some(&view), &store), Err(Error::MissingBuffer(3))));
        assert!(matches!(decode(&accessor, None, &store), Err(Error::MissingBufferView(5))));
    }

    #[test]
    fn test_zeroed() {
        let store = DataStore::new();
        let accessor = Accessor::zeroed(ComponentType::Uint16, AccessorType::Vec2, 4);
        let d = decode(&accessor, None, &store).unwrap();
        assert_eq!(d.data, ComponentData::U16(vec![0; 8]));

        let d = decode(&accessor.normalized(), None, &store).unwrap();
        assert_eq!(d.data, ComponentData::F32(vec![0.0; 8]));
    }

    #[test]
    fn test_decode_typed() {
        let mut bytes = Vec::new();
        for v in [3u16, 1, 2] {
            v.write_le(&mut bytes);
        }
        let store = store_with(bytes);
        let view = BufferView::new(0, 0, 6);
        let accessor = Accessor::new(0, ComponentType::Uint16, AccessorType::Scalar, 3);
        assert_eq!(decode_typed::<u16>(&accessor, Some(&view), &store).unwrap(), vec![3, 1, 2]);
        assert!(decode_typed::<u32>(&accessor, Some(&view), &store).is_err());
        assert!(decode_typed::<u16>(&accessor.normalized(), Some(&view), &store).is_err());
    }

    fn sparse_fixture(indices: &[u8], values: &[f32]) -> (Vec<BufferView>, DataStore) {
        let mut bytes = indices.to_vec();
        bytes.resize(8, 0);
        bytes.extend(f32_bytes(values));
        let views = vec![
            BufferView::new(0, 0, indices.len().max(1)),
            BufferView::new(0, 8, values.len() * 4),
        ];
        (views, store_with(bytes))
    }

    fn sparse(count: usize) -> Sparse {
        Sparse {
            count,
            indices: SparseIndices { buffer_view: 0, byte_offset: 0, component_type: ComponentType::Uint8 },
            values: SparseValues { buffer_view: 1, byte_offset: 0 },
        }
    }

    #[test]
    fn test_sparse_over_zeroed() {
        let (views, store) = sparse_fixture(&[4, 1], &[10.0, 20.0, 30.0, 40.0]);
        let accessor = Accessor::zeroed(ComponentType::Float32, AccessorType::Vec2, 6).with_sparse(sparse(2));
        let reader = AccessorReader::new(&views, &store);

        let dense = reader.dense(&accessor).unwrap();
        assert_eq!(dense.to_f32(), vec![0.0; 12]);

        let d = reader.read(&accessor).unwrap();
        assert_eq!(
            d.to_vec2().unwrap(),
            vec![
                Vec2::ZERO,
                Vec2::new(30.0, 40.0),
                Vec2::ZERO,
                Vec2::ZERO,
                Vec2::new(10.0, 20.0),
                Vec2::ZERO,
            ]
        );
    }

    #[test]
    fn test_sparse_duplicates_last_wins() {
        let (views, store) = sparse_fixture(&[2, 0, 2], &[1.0, 2.0, 3.0]);
        let accessor = Accessor::zeroed(ComponentType::Float32, AccessorType::Scalar, 4).with_sparse(sparse(3));
        let d = AccessorReader::new(&views, &store).read(&accessor).unwrap();
        assert_eq!(d.to_f32(), vec![2.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_sparse_index_out_of_range() {
        let (views, store) = sparse_fixture(&[9], &[1.0]);
        let accessor = Accessor::zeroed(ComponentType::Float32, AccessorType::Scalar, 4).with_sparse(sparse(1));
        let err = AccessorReader::new(&views, &store).read(&accessor).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_check_bounds() {
        let store = store_with(f32_bytes(&[1.0, 5.0, 3.0]));
        let views = vec![BufferView::new(0, 0, 12)];
        let reader = AccessorReader::new(&views, &store);

        let ok = Accessor::new(0, ComponentType::Float32, AccessorType::Scalar, 3).with_bounds(vec![1.0], vec![5.0]);
        assert!(reader.read_checked(&ok).is_ok());

        let tight = ok.clone().with_bounds(vec![2.0], vec![5.0]);
        assert!(reader.read_checked(&tight).unwrap_err().is_validation());

        let wrong_len = ok.with_bounds(vec![0.0, 0.0], vec![9.0, 9.0]);
        assert!(reader.read_checked(&wrong_len).is_err());
    }
}
