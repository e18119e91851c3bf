//! # dlbridge core
//!
//! Zero-copy conversion between tensors and the DLPack exchange format.
//!
//! - **Export** reads a tensor through [`TensorView`] and builds a DLPack
//!   descriptor aliasing its buffer, with freshly owned shape and strides.
//! - **Import** reads a DLPack descriptor and builds a tensor view over the
//!   same buffer through an injected [`TypeRegistry`].
//!
//! Only the metadata is translated: element types, devices, shape and
//! strides. Tensor data is never copied, and its lifetime across the
//! library boundary is the caller's responsibility.
//!
//! ## Quick Start
//!
//! ```rust
//! use dlbridge_core::{DLConverter, StridedRegistry, StridedTensor};
//!
//! let converter = DLConverter::new(StridedRegistry::default());
//! let a = StridedTensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//!
//! let exported = converter.to_dlpack(&a).unwrap();
//! assert_eq!(exported.shape(), &[2, 2]);
//!
//! // SAFETY: `a` owns the buffer and outlives `b`.
//! let b = unsafe { converter.from_dlpack(exported.dl_tensor()).unwrap() };
//! assert!(a.equal(&b).unwrap());
//! ```

pub mod config;
pub mod converter;
pub mod dlpack;
pub mod error;
pub mod tensor;

pub use config::{BridgeConfig, ByteOffsetPolicy, DeviceIndexPolicy, ExportConfig, ImportConfig};
pub use converter::DLConverter;
pub use dlpack::{DLDataType, DLDevice, DLManagedTensor, DLTensor, ExportedTensor};
pub use error::{BridgeError, BridgeResult};
pub use tensor::{StridedRegistry, StridedTensor, TensorView, TypeRegistry};

pub use dlbridge_types::{Backend, Device, Element, Half, ScalarType};
