//! Scalar type mapping between dlbridge and DLPack
//!
//! The mapping is a strict bijection over eight rows:
//!
//! | ScalarType | code     | bits |
//! |------------|----------|------|
//! | Byte       | kDLUInt  | 8    |
//! | Char       | kDLInt   | 8    |
//! | Short      | kDLInt   | 16   |
//! | Int        | kDLInt   | 32   |
//! | Long       | kDLInt   | 64   |
//! | Half       | kDLFloat | 16   |
//! | Float      | kDLFloat | 32   |
//! | Double     | kDLFloat | 64   |
//!
//! No widening or coercion is performed in either direction.

use dlbridge_types::ScalarType;

use super::ffi::DLDataType;
use super::type_code::{self, FLOAT, INT, UINT};
use crate::error::{BridgeError, BridgeResult};

/// Convert a scalar type to its DLPack data type (lanes is always 1)
pub const fn to_dl_dtype(scalar_type: ScalarType) -> DLDataType {
    let (code, bits) = match scalar_type {
        ScalarType::Byte => (UINT, 8),
        ScalarType::Char => (INT, 8),
        ScalarType::Short => (INT, 16),
        ScalarType::Int => (INT, 32),
        ScalarType::Long => (INT, 64),
        ScalarType::Half => (FLOAT, 16),
        ScalarType::Float => (FLOAT, 32),
        ScalarType::Double => (FLOAT, 64),
    };
    DLDataType::new(code, bits, 1)
}

/// Decode a raw scalar type tag received across an FFI seam
///
/// The `NUM_OPTIONS` sentinel and anything above it are rejected.
pub fn scalar_type_from_tag(tag: u8) -> BridgeResult<ScalarType> {
    ScalarType::from_tag(tag).ok_or_else(|| {
        if tag == ScalarType::NUM_OPTIONS {
            BridgeError::unsupported_scalar_type("NumOptions is not a valid ScalarType")
        } else {
            BridgeError::unsupported_scalar_type(format!("unknown scalar type tag {}", tag))
        }
    })
}

/// Convert a DLPack data type back to a scalar type
///
/// Lanes are checked before code and bits.
pub fn scalar_type_from_dl(dtype: DLDataType) -> BridgeResult<ScalarType> {
    if dtype.lanes != 1 {
        return Err(BridgeError::UnsupportedLaneCount(dtype.lanes));
    }

    let scalar_type = match (dtype.code, dtype.bits) {
        (UINT, 8) => ScalarType::Byte,
        (INT, 8) => ScalarType::Char,
        (INT, 16) => ScalarType::Short,
        (INT, 32) => ScalarType::Int,
        (INT, 64) => ScalarType::Long,
        (FLOAT, 16) => ScalarType::Half,
        (FLOAT, 32) => ScalarType::Float,
        (FLOAT, 64) => ScalarType::Double,
        (code @ (INT | UINT | FLOAT), bits) => {
            return Err(BridgeError::unsupported_scalar_type(format!(
                "{} bits {}",
                type_code::name(code),
                bits
            )));
        }
        (code, _) => {
            return Err(BridgeError::unsupported_scalar_type(format!(
                "type code {}",
                code
            )));
        }
    };

    log::trace!(
        "dlpack dtype (code={}, bits={}) -> {}",
        dtype.code,
        dtype.bits,
        scalar_type
    );
    Ok(scalar_type)
}
