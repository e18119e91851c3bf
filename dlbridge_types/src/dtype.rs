//! Scalar element types of the internal tensor library
//!
//! Provides the closed enumeration of element kinds a tensor can hold,
//! the raw-tag decoding used at FFI seams, string parsing, and the
//! [`Element`] trait linking Rust element types to their tag.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element kind of a tensor
///
/// Exactly one scalar type per tensor. The discriminants double as the
/// raw tags accepted by [`ScalarType::from_tag`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Unsigned 8-bit integer
    Byte = 0,
    /// Signed 8-bit integer
    Char = 1,
    /// Signed 16-bit integer
    Short = 2,
    /// Signed 32-bit integer
    Int = 3,
    /// Signed 64-bit integer
    Long = 4,
    /// IEEE 754 binary16
    Half = 5,
    /// IEEE 754 binary32
    Float = 6,
    /// IEEE 754 binary64
    Double = 7,
}

impl ScalarType {
    /// Number of scalar types. As a tag it is the invalid sentinel.
    pub const NUM_OPTIONS: u8 = 8;

    /// All scalar types in tag order
    pub const ALL: [ScalarType; 8] = [
        ScalarType::Byte,
        ScalarType::Char,
        ScalarType::Short,
        ScalarType::Int,
        ScalarType::Long,
        ScalarType::Half,
        ScalarType::Float,
        ScalarType::Double,
    ];

    /// Decode a raw tag
    ///
    /// Returns `None` for [`ScalarType::NUM_OPTIONS`] and anything above it.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ScalarType::Byte),
            1 => Some(ScalarType::Char),
            2 => Some(ScalarType::Short),
            3 => Some(ScalarType::Int),
            4 => Some(ScalarType::Long),
            5 => Some(ScalarType::Half),
            6 => Some(ScalarType::Float),
            7 => Some(ScalarType::Double),
            _ => None,
        }
    }

    /// Raw tag of this scalar type
    #[inline]
    pub const fn tag(&self) -> u8 {
        *self as u8
    }

    /// Size in bytes of a single element
    #[inline]
    pub const fn element_size(&self) -> usize {
        match self {
            ScalarType::Byte | ScalarType::Char => 1,
            ScalarType::Short | ScalarType::Half => 2,
            ScalarType::Int | ScalarType::Float => 4,
            ScalarType::Long | ScalarType::Double => 8,
        }
    }

    /// Check if this is a floating point type
    #[inline]
    pub const fn is_floating_point(&self) -> bool {
        matches!(
            self,
            ScalarType::Half | ScalarType::Float | ScalarType::Double
        )
    }

    /// Parse from string (e.g., "float32", "f32", "uint8", "byte")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "uint8" | "u8" | "byte" => Some(ScalarType::Byte),
            "int8" | "i8" | "char" => Some(ScalarType::Char),
            "int16" | "i16" | "short" => Some(ScalarType::Short),
            "int32" | "i32" | "int" => Some(ScalarType::Int),
            "int64" | "i64" | "long" => Some(ScalarType::Long),
            "float16" | "f16" | "half" => Some(ScalarType::Half),
            "float32" | "f32" | "float" => Some(ScalarType::Float),
            "float64" | "f64" | "double" => Some(ScalarType::Double),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Byte => "uint8",
            ScalarType::Char => "int8",
            ScalarType::Short => "int16",
            ScalarType::Int => "int32",
            ScalarType::Long => "int64",
            ScalarType::Half => "float16",
            ScalarType::Float => "float32",
            ScalarType::Double => "float64",
        };
        write!(f, "{}", name)
    }
}

/// Raw IEEE 754 binary16 value
///
/// Only the bit pattern is stored; no arithmetic is provided.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Half(pub u16);

impl Half {
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Half(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> u16 {
        self.0
    }
}

/// Rust types that can be stored in a tensor
pub trait Element: Pod {
    /// Scalar type tag for this element type
    const SCALAR_TYPE: ScalarType;
}

impl Element for u8 {
    const SCALAR_TYPE: ScalarType = ScalarType::Byte;
}

impl Element for i8 {
    const SCALAR_TYPE: ScalarType = ScalarType::Char;
}

impl Element for i16 {
    const SCALAR_TYPE: ScalarType = ScalarType::Short;
}

impl Element for i32 {
    const SCALAR_TYPE: ScalarType = ScalarType::Int;
}

impl Element for i64 {
    const SCALAR_TYPE: ScalarType = ScalarType::Long;
}

impl Element for Half {
    const SCALAR_TYPE: ScalarType = ScalarType::Half;
}

impl Element for f32 {
    const SCALAR_TYPE: ScalarType = ScalarType::Float;
}

impl Element for f64 {
    const SCALAR_TYPE: ScalarType = ScalarType::Double;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(ScalarType::Byte.element_size(), 1);
        assert_eq!(ScalarType::Char.element_size(), 1);
        assert_eq!(ScalarType::Short.element_size(), 2);
        assert_eq!(ScalarType::Half.element_size(), 2);
        assert_eq!(ScalarType::Int.element_size(), 4);
        assert_eq!(ScalarType::Float.element_size(), 4);
        assert_eq!(ScalarType::Long.element_size(), 8);
        assert_eq!(ScalarType::Double.element_size(), 8);
    }

    #[test]
    fn test_element_size_matches_rust_type() {
        assert_eq!(std::mem::size_of::<u8>(), u8::SCALAR_TYPE.element_size());
        assert_eq!(std::mem::size_of::<i16>(), i16::SCALAR_TYPE.element_size());
        assert_eq!(std::mem::size_of::<Half>(), Half::SCALAR_TYPE.element_size());
        assert_eq!(std::mem::size_of::<f64>(), f64::SCALAR_TYPE.element_size());
    }

    #[test]
    fn test_tag_roundtrip() {
        for scalar in ScalarType::ALL {
            assert_eq!(ScalarType::from_tag(scalar.tag()), Some(scalar));
        }
    }

    #[test]
    fn test_sentinel_tag_rejected() {
        assert_eq!(ScalarType::from_tag(ScalarType::NUM_OPTIONS), None);
        assert_eq!(ScalarType::from_tag(u8::MAX), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(ScalarType::parse("float32"), Some(ScalarType::Float));
        assert_eq!(ScalarType::parse("F32"), Some(ScalarType::Float));
        assert_eq!(ScalarType::parse("byte"), Some(ScalarType::Byte));
        assert_eq!(ScalarType::parse("half"), Some(ScalarType::Half));
        assert_eq!(ScalarType::parse("long"), Some(ScalarType::Long));
        assert_eq!(ScalarType::parse("bfloat16"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ScalarType::Float.to_string(), "float32");
        assert_eq!(ScalarType::Byte.to_string(), "uint8");
        assert_eq!(ScalarType::Char.to_string(), "int8");
    }

    #[test]
    fn test_display_parses_back() {
        for scalar in ScalarType::ALL {
            assert_eq!(ScalarType::parse(&scalar.to_string()), Some(scalar));
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        for scalar in ScalarType::ALL {
            let json = serde_json::to_string(&scalar).unwrap();
            let recovered: ScalarType = serde_json::from_str(&json).unwrap();
            assert_eq!(recovered, scalar);
        }
        assert_eq!(serde_json::to_string(&ScalarType::Double).unwrap(), "\"double\"");
    }

    #[test]
    fn test_half_is_pod() {
        let values = [Half::from_bits(0x3c00), Half::from_bits(0xc000)];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        assert_eq!(bytes.len(), 4);
        assert_eq!(u16::from_ne_bytes([bytes[0], bytes[1]]), 0x3c00);
        assert_eq!(values[1].to_bits(), 0xc000);
    }

    #[test]
    fn test_is_floating_point() {
        let floats: Vec<_> = ScalarType::ALL
            .into_iter()
            .filter(|s| s.is_floating_point())
            .collect();
        assert_eq!(floats, vec![ScalarType::Half, ScalarType::Float, ScalarType::Double]);
    }
}
