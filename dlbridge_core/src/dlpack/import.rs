//! DLPack import - build tensor views from DLPack descriptors
//!
//! The resulting tensor aliases the descriptor's data buffer. Keeping that
//! buffer alive for the tensor's lifetime is the caller's job.

use std::borrow::Cow;
use std::ffi::c_void;

use super::device::device_from_dl;
use super::dtype::scalar_type_from_dl;
use super::ffi::{DLManagedTensor, DLTensor};
use crate::config::{ByteOffsetPolicy, ImportConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::tensor::{contiguous_strides, TypeRegistry};

/// Import a DLPack tensor through `registry`
///
/// Checks run in order: device, dtype (lanes first), then the descriptor's
/// pointers and byte offset. Null strides are read as compact row-major.
///
/// # Safety
///
/// The caller must ensure:
/// - `dl_tensor.shape` (and `strides`, when non-null) point to `ndim` valid elements
/// - `dl_tensor.data` addresses a buffer matching the descriptor
/// - the buffer outlives the returned tensor
pub unsafe fn from_dlpack<R: TypeRegistry + ?Sized>(
    dl_tensor: &DLTensor,
    registry: &R,
    config: &ImportConfig,
) -> BridgeResult<R::Tensor> {
    let device = device_from_dl(dl_tensor.device)?;
    let scalar_type = scalar_type_from_dl(dl_tensor.dtype)?;

    let ndim = usize::try_from(dl_tensor.ndim).map_err(|_| {
        BridgeError::invalid_descriptor(format!("negative ndim {}", dl_tensor.ndim))
    })?;

    if dl_tensor.data.is_null() {
        return Err(BridgeError::invalid_descriptor("data pointer is null"));
    }

    let data = match (dl_tensor.byte_offset, config.byte_offset) {
        (0, _) => dl_tensor.data,
        (offset, ByteOffsetPolicy::Reject) => {
            return Err(BridgeError::UnsupportedByteOffset(offset));
        }
        (offset, ByteOffsetPolicy::Apply) => {
            let offset = usize::try_from(offset).map_err(|_| {
                BridgeError::invalid_descriptor(format!(
                    "byte offset {} exceeds address space",
                    offset
                ))
            })?;
            (dl_tensor.data as *mut u8).wrapping_add(offset) as *mut c_void
        }
    };

    let sizes: &[i64] = if ndim == 0 {
        &[]
    } else if dl_tensor.shape.is_null() {
        return Err(BridgeError::invalid_descriptor("shape pointer is null"));
    } else {
        std::slice::from_raw_parts(dl_tensor.shape, ndim)
    };

    let strides: Cow<'_, [i64]> = if ndim == 0 {
        Cow::Borrowed(&[])
    } else if dl_tensor.strides.is_null() {
        Cow::Owned(contiguous_strides(sizes)?)
    } else {
        Cow::Borrowed(std::slice::from_raw_parts(dl_tensor.strides, ndim))
    };

    log::debug!(
        "importing DLPack tensor: {} {} sizes={:?} strides={:?}",
        device,
        scalar_type,
        sizes,
        strides
    );

    registry.tensor_from_blob(device, scalar_type, data, sizes, &strides)
}

/// Import the tensor inside a `DLManagedTensor`
///
/// The deleter is not called; the managed tensor must outlive the
/// returned view, and releasing it stays with the caller.
///
/// # Safety
///
/// Same contract as [`from_dlpack`], and `managed` must be null or point
/// to a valid `DLManagedTensor`.
pub unsafe fn from_dlpack_managed<R: TypeRegistry + ?Sized>(
    managed: *const DLManagedTensor,
    registry: &R,
    config: &ImportConfig,
) -> BridgeResult<R::Tensor> {
    if managed.is_null() {
        return Err(BridgeError::invalid_descriptor("DLManagedTensor pointer is null"));
    }
    from_dlpack(&(*managed).dl_tensor, registry, config)
}
