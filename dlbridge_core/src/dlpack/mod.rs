//! DLPack tensor exchange protocol
//!
//! Translates between dlbridge tensors and the DLPack exchange format so
//! buffers can be shared with other tensor libraries without copying.
//!
//! # Layout
//!
//! - [`dtype`]: `ScalarType` ⇄ `DLDataType`
//! - [`device`]: `Device` ⇄ `DLDevice`
//! - [`array`]: owned copies of shape / strides metadata
//! - [`export`]: tensor → [`ExportedTensor`] / `DLManagedTensor`
//! - [`import`]: `DLTensor` → tensor view through a [`TypeRegistry`](crate::tensor::TypeRegistry)
//!
//! # Usage
//!
//! ```rust,ignore
//! use dlbridge_core::dlpack::{to_dlpack, from_dlpack};
//!
//! let exported = to_dlpack(&tensor, &ExportConfig::default())?;
//! let view = unsafe { from_dlpack(exported.dl_tensor(), &registry, &ImportConfig::default())? };
//! ```

pub mod array;
pub mod device;
pub mod dtype;
pub mod export;
mod ffi;
pub mod import;

pub use array::to_dl_int64_array;
pub use device::{device_from_dl, to_dl_device};
pub use dtype::{scalar_type_from_dl, scalar_type_from_tag, to_dl_dtype};
pub use export::{to_dlpack, ExportedTensor};
pub use ffi::{DLDataType, DLDevice, DLManagedTensor, DLManagedTensorDeleter, DLTensor};
pub use import::{from_dlpack, from_dlpack_managed};

/// DLPack device type codes
pub mod device_type {
    /// CPU device
    pub const CPU: i32 = 1;
    /// CUDA GPU
    pub const GPU: i32 = 2;
    /// Pinned CUDA host memory
    pub const CPU_PINNED: i32 = 3;
    /// OpenCL
    pub const OPENCL: i32 = 4;
    /// Vulkan GPU
    pub const VULKAN: i32 = 7;
    /// Metal GPU
    pub const METAL: i32 = 8;
    /// Verilog simulator buffer
    pub const VPI: i32 = 9;
    /// ROCm GPU
    pub const ROCM: i32 = 10;

    /// Every device type code this crate knows about
    pub const KNOWN: [i32; 8] = [CPU, GPU, CPU_PINNED, OPENCL, VULKAN, METAL, VPI, ROCM];
}

/// DLPack data type codes
pub mod type_code {
    /// Signed integer
    pub const INT: u8 = 0;
    /// Unsigned integer
    pub const UINT: u8 = 1;
    /// IEEE floating point
    pub const FLOAT: u8 = 2;

    /// Human-readable name of a type code
    pub fn name(code: u8) -> &'static str {
        match code {
            INT => "kDLInt",
            UINT => "kDLUInt",
            FLOAT => "kDLFloat",
            _ => "unknown",
        }
    }
}
