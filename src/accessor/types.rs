//! Buffer view and accessor records.
//!
//! These are plain metadata: they reference buffers by index and never own
//! bytes. Building them from document JSON is the caller's job.

use crate::source::DataStore;
use crate::util::{AccessorType, ComponentType, ElementType, Error, Result};

/// Minimum and maximum allowed vertex attribute stride.
pub const MIN_BYTE_STRIDE: usize = 4;
pub const MAX_BYTE_STRIDE: usize = 252;

/// GPU usage hint of a buffer view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferTarget {
    /// Vertex attributes.
    ArrayBuffer = 34962,
    /// Primitive indices.
    ElementArrayBuffer = 34963,
}

impl BufferTarget {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            34962 => Ok(Self::ArrayBuffer),
            34963 => Ok(Self::ElementArrayBuffer),
            other => Err(Error::unsupported(format!("buffer view target {}", other))),
        }
    }
}

/// A sub-range of a buffer, optionally strided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Distance between element starts; `None` or 0 means tightly packed.
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
}

impl BufferView {
    pub fn new(buffer: usize, byte_offset: usize, byte_length: usize) -> Self {
        Self { buffer, byte_offset, byte_length, byte_stride: None, target: None }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.byte_stride = Some(stride);
        self
    }

    pub fn with_target(mut self, target: BufferTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// One past the last byte of the view within its buffer.
    #[inline]
    pub fn end(&self) -> usize {
        self.byte_offset.saturating_add(self.byte_length)
    }

    /// Stride to advance by for elements of `element_size` bytes.
    #[inline]
    pub fn stride_for(&self, element_size: usize) -> usize {
        match self.byte_stride {
            Some(stride) if stride > 0 => stride,
            _ => element_size,
        }
    }

    /// The view's bytes.
    pub fn bytes<'a>(&self, store: &'a DataStore) -> Result<&'a [u8]> {
        store.slice_checked(self.buffer, self.byte_offset, self.byte_length)
    }

    /// Check the view against the size of the buffer it references.
    pub fn validate(&self, buffer_len: usize) -> Result<()> {
        if self.byte_length == 0 {
            return Err(Error::invalid("buffer view has zero byteLength"));
        }
        if self.byte_offset.checked_add(self.byte_length).map_or(true, |end| end > buffer_len) {
            return Err(Error::OutOfBounds {
                buffer: self.buffer,
                offset: self.byte_offset,
                length: self.byte_length,
                available: buffer_len,
            });
        }
        if let Some(stride) = self.byte_stride {
            if !(MIN_BYTE_STRIDE..=MAX_BYTE_STRIDE).contains(&stride) {
                return Err(Error::invalid(format!(
                    "byteStride {} outside {}..={}",
                    stride, MIN_BYTE_STRIDE, MAX_BYTE_STRIDE
                )));
            }
            if stride % 4 != 0 {
                tracing::warn!(stride, buffer = self.buffer, "byteStride is not a multiple of 4");
            }
        }
        Ok(())
    }
}

/// Where an accessor's dense data comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessorStorage {
    /// Elements are read from this buffer view.
    View(usize),
    /// No buffer view: every element is zero until a sparse overlay.
    Zeroed,
}

/// Index half of a sparse overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseIndices {
    pub buffer_view: usize,
    pub byte_offset: usize,
    /// One of the unsigned types.
    pub component_type: ComponentType,
}

/// Value half of a sparse overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseValues {
    pub buffer_view: usize,
    pub byte_offset: usize,
}

/// Replacement of specific elements on top of the dense data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
}

impl Sparse {
    /// Scalar accessor reading the element indices.
    pub fn indices_accessor(&self) -> Result<Accessor> {
        let ct = self.indices.component_type;
        if !ct.is_index() {
            return Err(Error::unsupported(format!("sparse index component type {}", ct)));
        }
        Ok(Accessor::new(self.indices.buffer_view, ct, AccessorType::Scalar, self.count)
            .with_offset(self.indices.byte_offset))
    }

    /// Accessor reading replacement values with the base accessor's layout.
    pub fn values_accessor(&self, base: &Accessor) -> Accessor {
        Accessor {
            storage: AccessorStorage::View(self.values.buffer_view),
            byte_offset: self.values.byte_offset,
            count: self.count,
            sparse: None,
            min: None,
            max: None,
            ..base.clone()
        }
    }
}

/// How to interpret a byte range as a typed array.
#[derive(Clone, Debug, PartialEq)]
pub struct Accessor {
    pub storage: AccessorStorage,
    /// Offset relative to the buffer view start.
    pub byte_offset: usize,
    pub component_type: ComponentType,
    /// Rescale integer components into [-1, 1] / [0, 1].
    pub normalized: bool,
    pub count: usize,
    pub shape: AccessorType,
    pub sparse: Option<Sparse>,
    pub min: Option<Vec<f64>>,
    pub max: Option<Vec<f64>>,
}

impl Accessor {
    /// Accessor over a buffer view.
    pub fn new(buffer_view: usize, component_type: ComponentType, shape: AccessorType, count: usize) -> Self {
        Self {
            storage: AccessorStorage::View(buffer_view),
            byte_offset: 0,
            component_type,
            normalized: false,
            count,
            shape,
            sparse: None,
            min: None,
            max: None,
        }
    }

    /// Accessor with no buffer view (all zero before sparse overlay).
    pub fn zeroed(component_type: ComponentType, shape: AccessorType, count: usize) -> Self {
        Self {
            storage: AccessorStorage::Zeroed,
            ..Self::new(0, component_type, shape, count)
        }
    }

    pub fn with_offset(mut self, byte_offset: usize) -> Self {
        self.byte_offset = byte_offset;
        self
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    pub fn with_sparse(mut self, sparse: Sparse) -> Self {
        self.sparse = Some(sparse);
        self
    }

    pub fn with_bounds(mut self, min: Vec<f64>, max: Vec<f64>) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Buffer view index, if the accessor has one.
    #[inline]
    pub fn buffer_view(&self) -> Option<usize> {
        match self.storage {
            AccessorStorage::View(view) => Some(view),
            AccessorStorage::Zeroed => None,
        }
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        ElementType::new(self.component_type, self.shape)
    }

    /// Component width x component count.
    #[inline]
    pub fn element_byte_size(&self) -> usize {
        self.element_type().num_bytes()
    }

    /// Bytes covered when tightly packed.
    #[inline]
    pub fn byte_length(&self) -> usize {
        self.element_byte_size() * self.count
    }

    /// Offset of the first element within the buffer.
    #[inline]
    pub fn absolute_offset(&self, view: &BufferView) -> usize {
        view.byte_offset + self.byte_offset
    }
}

/// Free-function form of [`Accessor::element_byte_size`].
#[inline]
pub fn element_byte_size(accessor: &Accessor) -> usize {
    accessor.element_byte_size()
}

/// Free-function form of [`Accessor::absolute_offset`].
#[inline]
pub fn absolute_offset(accessor: &Accessor, view: &BufferView) -> usize {
    accessor.absolute_offset(view)
}
