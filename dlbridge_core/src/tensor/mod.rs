//! Interface to the host tensor library
//!
//! The converter never reaches into a tensor implementation directly. It
//! reads tensors through [`TensorView`] and builds new views through an
//! injected [`TypeRegistry`], so any tensor library (or a test fake) can
//! sit on the other side.
//!
//! [`StridedTensor`] and [`StridedRegistry`] are a small reference
//! implementation of both traits.

mod strided;

pub use strided::{StridedRegistry, StridedTensor};

use std::ffi::c_void;

use dlbridge_types::{Device, ScalarType};

use crate::error::{BridgeError, BridgeResult};

/// Read access to a tensor's metadata and raw data pointer
pub trait TensorView {
    /// Pointer to the first element
    fn data_ptr(&self) -> *mut c_void;

    /// Per-dimension sizes
    fn sizes(&self) -> &[i64];

    /// Per-dimension strides, in elements
    fn strides(&self) -> &[i64];

    fn scalar_type(&self) -> ScalarType;

    /// Backend classification of the storage
    fn device(&self) -> Device;

    /// True device index, when the library can report one
    fn device_index(&self) -> Option<i64> {
        None
    }

    /// Number of dimensions
    fn dim(&self) -> usize {
        self.sizes().len()
    }
}

/// Factory for tensor views over foreign buffers
///
/// Passed explicitly to import; there is no process-wide registry.
pub trait TypeRegistry {
    type Tensor;

    /// Build a tensor view aliasing `data` without copying it
    ///
    /// Fails with `UnregisteredType` when no tensor type exists for
    /// (`device.backend`, `scalar_type`).
    ///
    /// # Safety
    ///
    /// `data` must address a buffer laid out by `sizes` and `strides` with
    /// elements of `scalar_type`, and it must outlive the returned tensor.
    unsafe fn tensor_from_blob(
        &self,
        device: Device,
        scalar_type: ScalarType,
        data: *mut c_void,
        sizes: &[i64],
        strides: &[i64],
    ) -> BridgeResult<Self::Tensor>;
}

impl<R: TypeRegistry + ?Sized> TypeRegistry for &R {
    type Tensor = R::Tensor;

    unsafe fn tensor_from_blob(
        &self,
        device: Device,
        scalar_type: ScalarType,
        data: *mut c_void,
        sizes: &[i64],
        strides: &[i64],
    ) -> BridgeResult<Self::Tensor> {
        (**self).tensor_from_blob(device, scalar_type, data, sizes, strides)
    }
}

/// Compute contiguous (row-major) strides in elements
///
/// Zero-sized dimensions count as 1. Fails with `InvalidDescriptor` when a
/// stride does not fit in `i64`.
pub fn contiguous_strides(sizes: &[i64]) -> BridgeResult<Vec<i64>> {
    let ndim = sizes.len();
    if ndim == 0 {
        return Ok(vec![]);
    }

    let mut strides = vec![1i64; ndim];
    for i in (0..ndim - 1).rev() {
        strides[i] = strides[i + 1].checked_mul(sizes[i + 1].max(1)).ok_or_else(|| {
            BridgeError::invalid_descriptor(format!("strides for sizes {:?} overflow", sizes))
        })?;
    }
    Ok(strides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_strides() {
        assert_eq!(contiguous_strides(&[3, 4]).unwrap(), vec![4, 1]);
        assert_eq!(contiguous_strides(&[2, 3, 4]).unwrap(), vec![12, 4, 1]);
        assert_eq!(contiguous_strides(&[5]).unwrap(), vec![1]);
        assert!(contiguous_strides(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_contiguous_strides_zero_sized_dim() {
        assert_eq!(contiguous_strides(&[2, 0, 3]).unwrap(), vec![3, 3, 1]);
    }

    #[test]
    fn test_contiguous_strides_overflow() {
        assert!(matches!(
            contiguous_strides(&[0, 1 << 40, 1 << 40]),
            Err(BridgeError::InvalidDescriptor(_))
        ));
        assert!(contiguous_strides(&[i64::MAX, 2, 1]).is_ok());
    }
}
