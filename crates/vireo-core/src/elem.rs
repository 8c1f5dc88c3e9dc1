//! Element types and their host-side numeric representations.

use std::fmt;

/// Declared element type of one schema attribute.
///
/// Scalar kinds occupy one storage slot per instance; vector kinds
/// occupy one slot per lane. The device backend declares which element
/// types it can allocate; the host mirror additionally requires a
/// [`HostScalar`] equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElemType {
    /// 16-bit float. Device-only: there is no stable host equivalent.
    F16,
    /// 32-bit float.
    F32,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// Two-lane f32 vector.
    Vec2,
    /// Three-lane f32 vector.
    Vec3,
    /// Four-lane f32 vector.
    Vec4,
}

impl ElemType {
    /// Number of storage slots this element type occupies per instance.
    pub fn lanes(&self) -> u32 {
        match self {
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            _ => 1,
        }
    }

    /// The host-side numeric representation of this element type.
    ///
    /// Returns `None` when the type has no host equivalent ([`ElemType::F16`]);
    /// declaring such an attribute fails with
    /// [`SpecError::UnsupportedType`](crate::error::SpecError::UnsupportedType).
    pub fn host_scalar(&self) -> Option<HostScalar> {
        match self {
            Self::F16 => None,
            Self::F32 | Self::Vec2 | Self::Vec3 | Self::Vec4 => Some(HostScalar::F32),
            Self::I8 | Self::I16 | Self::I32 => Some(HostScalar::I32),
            Self::U8 | Self::U16 | Self::U32 => Some(HostScalar::U32),
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        };
        write!(f, "{s}")
    }
}

/// Host-side numeric representation of an element type.
///
/// Host mirror storage is uniform f32 slots; the host scalar determines
/// how values are quantized on write (floats pass through, integer
/// kinds round, unsigned kinds additionally clamp at zero).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostScalar {
    /// Values pass through unchanged.
    F32,
    /// Values are rounded to the nearest integer.
    I32,
    /// Values are rounded and clamped at zero.
    U32,
}

impl HostScalar {
    /// Quantize a raw value into this scalar's representable range.
    pub fn quantize(&self, v: f32) -> f32 {
        match self {
            Self::F32 => v,
            Self::I32 => v.round(),
            Self::U32 => v.round().max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_match_vector_width() {
        assert_eq!(ElemType::F32.lanes(), 1);
        assert_eq!(ElemType::I8.lanes(), 1);
        assert_eq!(ElemType::Vec2.lanes(), 2);
        assert_eq!(ElemType::Vec3.lanes(), 3);
        assert_eq!(ElemType::Vec4.lanes(), 4);
    }

    #[test]
    fn f16_has_no_host_scalar() {
        assert_eq!(ElemType::F16.host_scalar(), None);
        assert_eq!(ElemType::F32.host_scalar(), Some(HostScalar::F32));
        assert_eq!(ElemType::U16.host_scalar(), Some(HostScalar::U32));
    }

    #[test]
    fn quantize_rounds_and_clamps() {
        assert_eq!(HostScalar::F32.quantize(1.4), 1.4);
        assert_eq!(HostScalar::I32.quantize(1.4), 1.0);
        assert_eq!(HostScalar::I32.quantize(-1.6), -2.0);
        assert_eq!(HostScalar::U32.quantize(-3.0), 0.0);
    }
}
