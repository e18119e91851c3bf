//! Unified error handling for dlbridge
//!
//! Every conversion surfaces its failure immediately through
//! [`BridgeError`]; no component catches another's error.

use dlbridge_types::{Backend, ScalarType};
use thiserror::Error;

/// Main error type for dlbridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Scalar type tag or (code, bits) pair outside the supported table
    #[error("Unsupported scalar type: {detail}")]
    UnsupportedScalarType { detail: String },

    /// Vectorized element types are not supported
    #[error("Unsupported lane count {0}: only lanes == 1 is supported")]
    UnsupportedLaneCount(u16),

    /// Device type other than CPU or GPU
    #[error("Unsupported device type: {0}")]
    UnsupportedDeviceType(i32),

    /// Descriptor views into a buffer at a non-zero byte offset
    #[error("Unsupported byte offset {0}: only byte_offset == 0 is accepted")]
    UnsupportedByteOffset(u64),

    /// Device index does not fit the exchange format's device id
    #[error("Device index {0} is out of range for a DLPack device id")]
    DeviceIndexOutOfRange(i64),

    /// Malformed descriptor or tensor metadata
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Type registry has no tensor type for the pair
    #[error("No tensor type registered for backend '{backend}' and scalar type '{scalar_type}'")]
    UnregisteredType {
        backend: Backend,
        scalar_type: ScalarType,
    },

    /// Element access to memory the host cannot read
    #[error("Device access error: {0}")]
    DeviceAccess(String),

    /// Data length does not match the requested shape
    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Configuration parsing or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create an `UnsupportedScalarType` error
    pub fn unsupported_scalar_type<S: Into<String>>(detail: S) -> Self {
        BridgeError::UnsupportedScalarType {
            detail: detail.into(),
        }
    }

    /// Create an `InvalidDescriptor` error
    pub fn invalid_descriptor<S: Into<String>>(msg: S) -> Self {
        BridgeError::InvalidDescriptor(msg.into())
    }

    /// Create a `Config` error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BridgeError::Config(msg.into())
    }
}

/// Convenience type alias for Results using BridgeError
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

impl From<serde_yaml::Error> for BridgeError {
    fn from(err: serde_yaml::Error) -> Self {
        BridgeError::Config(format!("YAML parse error: {}", err))
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Config(format!("TOML parse error: {}", err))
    }
}
