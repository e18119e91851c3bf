//! DLPack FFI definitions
//!
//! These structs match the DLPack C header exactly for ABI compatibility.
//! See: <https://github.com/dmlc/dlpack/blob/main/include/dlpack/dlpack.h>

use bytemuck::{Pod, Zeroable};
use std::ffi::c_void;
use std::os::raw::c_int;

use super::{device_type, type_code};

/// DLPack device specification
///
/// Identifies where tensor data resides. `device_type` stays a raw code so
/// that any value written by a foreign producer is representable.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DLDevice {
    /// Device type (kDLCPU=1, kDLGPU=2, etc.)
    pub device_type: i32,
    /// Device index (e.g., GPU 0, 1, 2...)
    pub device_id: i32,
}

impl DLDevice {
    #[inline]
    pub const fn new(device_type: i32, device_id: i32) -> Self {
        Self {
            device_type,
            device_id,
        }
    }

    /// Create a CPU device
    #[inline]
    pub const fn cpu() -> Self {
        Self::new(device_type::CPU, 0)
    }

    /// Create a GPU device
    #[inline]
    pub const fn gpu(device_id: i32) -> Self {
        Self::new(device_type::GPU, device_id)
    }

    #[inline]
    pub const fn is_cpu(&self) -> bool {
        self.device_type == device_type::CPU
    }

    #[inline]
    pub const fn is_gpu(&self) -> bool {
        self.device_type == device_type::GPU
    }
}

/// DLPack data type specification
///
/// Describes the element type of a tensor.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DLDataType {
    /// Type category:
    /// - 0 = int
    /// - 1 = uint
    /// - 2 = float
    pub code: u8,
    /// Number of bits per element (8, 16, 32, 64)
    pub bits: u8,
    /// Number of lanes (1 for scalars, >1 for vectorized types)
    pub lanes: u16,
}

impl DLDataType {
    #[inline]
    pub const fn new(code: u8, bits: u8, lanes: u16) -> Self {
        Self { code, bits, lanes }
    }

    pub const U8: Self = Self::new(type_code::UINT, 8, 1);
    pub const I8: Self = Self::new(type_code::INT, 8, 1);
    pub const I16: Self = Self::new(type_code::INT, 16, 1);
    pub const I32: Self = Self::new(type_code::INT, 32, 1);
    pub const I64: Self = Self::new(type_code::INT, 64, 1);
    pub const F16: Self = Self::new(type_code::FLOAT, 16, 1);
    pub const F32: Self = Self::new(type_code::FLOAT, 32, 1);
    pub const F64: Self = Self::new(type_code::FLOAT, 64, 1);
}

/// DLPack tensor structure
///
/// Core tensor metadata without ownership semantics.
/// This struct is ABI-compatible with the DLPack C definition.
#[repr(C)]
#[derive(Debug)]
pub struct DLTensor {
    /// Pointer to the tensor data (aliased, never owned)
    ///
    /// For GPU tensors, this is a device pointer.
    pub data: *mut c_void,

    /// Device where data resides
    pub device: DLDevice,

    /// Number of dimensions
    pub ndim: c_int,

    /// Data type of elements
    pub dtype: DLDataType,

    /// Shape of the tensor, `ndim` elements
    pub shape: *mut i64,

    /// Strides of the tensor in number of elements, `ndim` elements
    ///
    /// NULL means compact row-major.
    pub strides: *mut i64,

    /// Byte offset from data pointer
    pub byte_offset: u64,
}

impl Default for DLTensor {
    fn default() -> Self {
        Self {
            data: std::ptr::null_mut(),
            device: DLDevice::default(),
            ndim: 0,
            dtype: DLDataType::default(),
            shape: std::ptr::null_mut(),
            strides: std::ptr::null_mut(),
            byte_offset: 0,
        }
    }
}

/// Deleter function type for DLManagedTensor
pub type DLManagedTensorDeleter = unsafe extern "C" fn(*mut DLManagedTensor);

/// DLPack managed tensor with ownership
///
/// Wraps a DLTensor with a deleter callback. The consumer must call the
/// deleter exactly once when it is done with the tensor.
#[repr(C)]
pub struct DLManagedTensor {
    /// The tensor metadata
    pub dl_tensor: DLTensor,

    /// Opaque pointer to the producer's context
    pub manager_ctx: *mut c_void,

    /// Deleter function
    ///
    /// Frees the producer's context and the DLManagedTensor itself.
    pub deleter: Option<DLManagedTensorDeleter>,
}

impl Default for DLManagedTensor {
    fn default() -> Self {
        Self {
            dl_tensor: DLTensor::default(),
            manager_ctx: std::ptr::null_mut(),
            deleter: None,
        }
    }
}

// Safety: the envelope holds only metadata it owns plus an aliased data
// pointer whose synchronization is the producer's and consumer's concern.
unsafe impl Send for DLManagedTensor {}
