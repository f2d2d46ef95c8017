//! Component types - the fixed-width numeric encodings of accessor data.

use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use std::fmt;

use super::{Error, Result};

/// Numeric encoding of a single accessor component.
///
/// Discriminants are the format's `componentType` codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ComponentType {
    /// Signed 8-bit integer
    Int8 = 5120,
    /// Unsigned 8-bit integer
    Uint8 = 5121,
    /// Signed 16-bit integer
    Int16 = 5122,
    /// Unsigned 16-bit integer
    Uint16 = 5123,
    /// Unsigned 32-bit integer
    Uint32 = 5125,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 5126,
}

impl ComponentType {
    /// All component types, in code order.
    pub const ALL: [Self; 6] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Uint32,
        Self::Float32,
    ];

    /// Returns the size in bytes of one component.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Uint32 | Self::Float32 => 4,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
        }
    }

    /// The format's numeric `componentType` code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Parse from the format's numeric code.
    ///
    /// 5124 (signed 32-bit) is defined by the format family but is not a
    /// valid accessor component type, so it is rejected like any other code.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            5120 => Ok(Self::Int8),
            5121 => Ok(Self::Uint8),
            5122 => Ok(Self::Int16),
            5123 => Ok(Self::Uint16),
            5125 => Ok(Self::Uint32),
            5126 => Ok(Self::Float32),
            other => Err(Error::unsupported(format!("component type {}", other))),
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32)
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Float32)
    }

    /// Valid types for sparse and primitive indices.
    #[inline]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for ComponentType {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        Self::from_code(code)
    }
}

// === Component trait for typed little-endian reads ===

/// Rust types that back a [`ComponentType`].
pub trait Component: Pod + Zeroable + Copy + Default + PartialOrd + fmt::Debug {
    /// The corresponding ComponentType enum value.
    const COMPONENT_TYPE: ComponentType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Read one value from the first `SIZE` bytes, little-endian.
    fn read_le(bytes: &[u8]) -> Self;

    /// Append the little-endian encoding of this value.
    fn write_le(self, out: &mut Vec<u8>);

    /// Rescale an integer into `[-1, 1]` (signed) or `[0, 1]` (unsigned).
    /// Floats pass through.
    fn normalize(self) -> f32;

    /// Plain numeric conversion without rescaling.
    fn to_f32(self) -> f32;

    /// Index conversion. Only meaningful for unsigned types.
    fn to_index(self) -> Option<u32>;
}

impl Component for i8 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Int8;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    #[inline]
    fn normalize(self) -> f32 {
        (self as f32 / i8::MAX as f32).max(-1.0)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_index(self) -> Option<u32> {
        None
    }
}

impl Component for u8 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Uint8;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    #[inline]
    fn normalize(self) -> f32 {
        self as f32 / u8::MAX as f32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_index(self) -> Option<u32> {
        Some(self as u32)
    }
}

impl Component for i16 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Int16;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_i16(bytes)
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn normalize(self) -> f32 {
        (self as f32 / i16::MAX as f32).max(-1.0)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_index(self) -> Option<u32> {
        None
    }
}

impl Component for u16 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Uint16;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_u16(bytes)
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn normalize(self) -> f32 {
        self as f32 / u16::MAX as f32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_index(self) -> Option<u32> {
        Some(self as u32)
    }
}

impl Component for u32 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Uint32;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_u32(bytes)
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn normalize(self) -> f32 {
        // Divide in f64: u32::MAX is not representable in f32.
        (self as f64 / u32::MAX as f64) as f32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_index(self) -> Option<u32> {
        Some(self)
    }
}

impl Component for f32 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Float32;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn normalize(self) -> f32 {
        self
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_index(self) -> Option<u32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_sizes() {
        let widths: Vec<usize> = ComponentType::ALL.iter().map(|c| c.num_bytes()).collect();
        assert_eq!(widths, vec![1, 1, 2, 2, 4, 4]);
        assert_eq!(<f32 as Component>::SIZE, 4);
        assert_eq!(<i16 as Component>::SIZE, 2);
    }

    #[test]
    fn test_component_codes() {
        for ct in ComponentType::ALL {
            assert_eq!(ComponentType::from_code(ct.code()).unwrap(), ct);
        }
        assert!(ComponentType::from_code(5124).is_err());
        assert!(ComponentType::from_code(0).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(255u8.normalize(), 1.0);
        assert_eq!(0u8.normalize(), 0.0);
        assert_eq!(127i8.normalize(), 1.0);
        assert_eq!((-127i8).normalize(), -1.0);
        assert_eq!((-128i8).normalize(), -1.0);
        assert_eq!(u16::MAX.normalize(), 1.0);
        assert_eq!(i16::MIN.normalize(), -1.0);
        assert_eq!(u32::MAX.normalize(), 1.0);
        assert_eq!(0.25f32.normalize(), 0.25);
    }

    #[test]
    fn test_read_le() {
        assert_eq!(u16::read_le(&[0x34, 0x12]), 0x1234);
        assert_eq!(i16::read_le(&[0xFF, 0xFF]), -1);
        assert_eq!(u32::read_le(&[1, 0, 0, 0]), 1);
        assert_eq!(f32::read_le(&1.5f32.to_le_bytes()), 1.5);
        assert_eq!(i8::read_le(&[0x80]), -128);
    }
}
