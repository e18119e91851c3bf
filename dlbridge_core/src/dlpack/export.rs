//! DLPack export - convert tensors to DLPack descriptors
//!
//! The descriptor aliases the tensor's data pointer and owns fresh copies
//! of its shape and strides. Ownership of those two arrays follows one of
//! two contracts:
//!
//! - **Scoped**: [`ExportedTensor`] keeps the arrays and frees them on drop.
//!   The borrowed `&DLTensor` is valid for as long as the `ExportedTensor`.
//! - **Handed off**: [`ExportedTensor::into_managed`] moves the arrays into
//!   a `DLManagedTensor`. The consumer must call its deleter exactly once.
//!
//! Neither contract owns or frees the data buffer.

use std::ffi::c_void;
use std::os::raw::c_int;

use dlbridge_types::Device;

use super::array::to_dl_int64_array;
use super::device::to_dl_device;
use super::dtype::to_dl_dtype;
use super::ffi::{DLDataType, DLDevice, DLManagedTensor, DLTensor};
use crate::config::{DeviceIndexPolicy, ExportConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::tensor::TensorView;

/// A DLPack descriptor together with the shape and strides it points to
pub struct ExportedTensor {
    dl_tensor: DLTensor,
    shape: Box<[i64]>,
    strides: Box<[i64]>,
}

// Safety: the shape and strides are owned heap arrays; the aliased data
// pointer is never dereferenced by this type.
unsafe impl Send for ExportedTensor {}

impl std::fmt::Debug for ExportedTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedTensor")
            .field("data", &self.dl_tensor.data)
            .field("device", &self.dl_tensor.device)
            .field("dtype", &self.dl_tensor.dtype)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .finish()
    }
}

impl ExportedTensor {
    /// The DLPack descriptor, valid while `self` is alive
    #[inline]
    pub fn dl_tensor(&self) -> &DLTensor {
        &self.dl_tensor
    }

    #[inline]
    pub fn data_ptr(&self) -> *mut c_void {
        self.dl_tensor.data
    }

    #[inline]
    pub fn device(&self) -> DLDevice {
        self.dl_tensor.device
    }

    #[inline]
    pub fn dtype(&self) -> DLDataType {
        self.dl_tensor.dtype
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The descriptor's own shape array
    #[inline]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// The descriptor's own strides array
    #[inline]
    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    /// Hand the descriptor across the library boundary
    ///
    /// The returned pointer is never null. The consumer must call its
    /// `deleter` exactly once; the deleter frees the shape, the strides and
    /// the envelope, and leaves the data buffer alone.
    pub fn into_managed(self) -> *mut DLManagedTensor {
        let ExportedTensor {
            dl_tensor,
            shape,
            strides,
        } = self;

        // Moving the boxes does not move their heap arrays, so the
        // descriptor's pointers stay valid.
        let context = Box::new(ManagerContext { shape, strides });
        let managed = Box::new(DLManagedTensor {
            dl_tensor,
            manager_ctx: Box::into_raw(context) as *mut c_void,
            deleter: Some(dlpack_deleter),
        });
        Box::into_raw(managed)
    }
}

/// Context stored in `DLManagedTensor::manager_ctx`
struct ManagerContext {
    shape: Box<[i64]>,
    strides: Box<[i64]>,
}

/// Deleter installed by [`ExportedTensor::into_managed`]
unsafe extern "C" fn dlpack_deleter(managed: *mut DLManagedTensor) {
    if managed.is_null() {
        return;
    }

    // SAFETY: `managed` was created by `Box::into_raw` in `into_managed`.
    let managed = Box::from_raw(managed);
    if !managed.manager_ctx.is_null() {
        // SAFETY: manager_ctx was created by `Box::into_raw(context)`.
        drop(Box::from_raw(managed.manager_ctx as *mut ManagerContext));
    }
}

/// Resolve the device written into the descriptor
fn export_device<T: TensorView + ?Sized>(tensor: &T, policy: DeviceIndexPolicy) -> Device {
    let device = tensor.device();
    let index = match policy {
        DeviceIndexPolicy::Zero => 0,
        DeviceIndexPolicy::FromTensor => match tensor.device_index() {
            Some(index) => index,
            None => {
                if device.is_cuda() {
                    log::warn!(
                        "tensor on {} reports no device index, exporting device id 0",
                        device
                    );
                }
                0
            }
        },
    };
    Device::new(device.backend, index)
}

/// Build a DLPack descriptor for `tensor`
///
/// The data pointer is aliased, never copied; `byte_offset` is always 0
/// because `data_ptr()` already addresses the first element. Nothing is
/// allocated unless every check passes.
pub fn to_dlpack<T: TensorView + ?Sized>(
    tensor: &T,
    config: &ExportConfig,
) -> BridgeResult<ExportedTensor> {
    let sizes = tensor.sizes();
    let strides = tensor.strides();
    if sizes.len() != strides.len() {
        return Err(BridgeError::invalid_descriptor(format!(
            "tensor has {} sizes but {} strides",
            sizes.len(),
            strides.len()
        )));
    }
    let ndim = c_int::try_from(sizes.len()).map_err(|_| {
        BridgeError::invalid_descriptor(format!("{} dimensions exceed c_int", sizes.len()))
    })?;

    let device = to_dl_device(export_device(tensor, config.device_index))?;
    let dtype = to_dl_dtype(tensor.scalar_type());

    let mut shape = to_dl_int64_array(sizes);
    let mut strides = to_dl_int64_array(strides);

    let dl_tensor = DLTensor {
        data: tensor.data_ptr(),
        device,
        ndim,
        dtype,
        shape: shape.as_mut_ptr(),
        strides: strides.as_mut_ptr(),
        byte_offset: 0,
    };

    log::debug!(
        "exported {} tensor {:?} on device ({}, {}) to DLPack",
        tensor.scalar_type(),
        sizes,
        device.device_type,
        device.device_id
    );

    Ok(ExportedTensor {
        dl_tensor,
        shape,
        strides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlpack::{device_type, type_code};
    use crate::tensor::StridedTensor;
    use dlbridge_types::ScalarType;

    fn sample() -> StridedTensor {
        StridedTensor::from_vec((0..12).map(|i| i as f32).collect(), &[3, 4]).unwrap()
    }

    #[test]
    fn test_to_dlpack_cpu() {
        let tensor = sample();
        let exported = to_dlpack(&tensor, &ExportConfig::default()).unwrap();
        let dl = exported.dl_tensor();

        assert_eq!(dl.data, tensor.data_ptr());
        assert_eq!(dl.ndim, 2);
        assert_eq!(dl.device, DLDevice::new(device_type::CPU, 0));
        assert_eq!(dl.dtype, DLDataType::new(type_code::FLOAT, 32, 1));
        assert_eq!(dl.byte_offset, 0);

        // SAFETY: shape and strides point at `ndim` elements owned by `exported`.
        unsafe {
            assert_eq!(std::slice::from_raw_parts(dl.shape, 2), &[3, 4]);
            assert_eq!(std::slice::from_raw_parts(dl.strides, 2), &[4, 1]);
        }
    }

    #[test]
    fn test_arrays_are_not_aliased() {
        let tensor = sample();
        let exported = to_dlpack(&tensor, &ExportConfig::default()).unwrap();
        assert_ne!(exported.dl_tensor().shape as *const i64, tensor.sizes().as_ptr());
        assert_ne!(exported.dl_tensor().strides as *const i64, tensor.strides().as_ptr());
    }

    #[test]
    fn test_arrays_survive_source_mutation() {
        let mut tensor = sample();
        let exported = to_dlpack(&tensor, &ExportConfig::default()).unwrap();

        tensor.set_sizes_and_strides(&[12], &[1]).unwrap();
        drop(tensor);

        assert_eq!(exported.shape(), &[3, 4]);
        assert_eq!(exported.strides(), &[4, 1]);
        // SAFETY: shape points at `ndim` elements owned by `exported`.
        unsafe {
            assert_eq!(std::slice::from_raw_parts(exported.dl_tensor().shape, 2), &[3, 4]);
        }
    }

    #[test]
    fn test_device_index_zero_policy() {
        let tensor = StridedTensor::from_vec_on(vec![1.0f64, 2.0], &[2], Device::cuda(3)).unwrap();
        let exported = to_dlpack(&tensor, &ExportConfig::default()).unwrap();
        assert_eq!(exported.device(), DLDevice::gpu(0));
    }

    #[test]
    fn test_device_index_from_tensor_policy() {
        let tensor = StridedTensor::from_vec_on(vec![1.0f64, 2.0], &[2], Device::cuda(3)).unwrap();
        let config = ExportConfig {
            device_index: DeviceIndexPolicy::FromTensor,
        };
        let exported = to_dlpack(&tensor, &config).unwrap();
        assert_eq!(exported.device(), DLDevice::gpu(3));
    }

    #[test]
    fn test_scalar_tensor() {
        let tensor = StridedTensor::from_vec(vec![7i64], &[]).unwrap();
        let exported = to_dlpack(&tensor, &ExportConfig::default()).unwrap();
        assert_eq!(exported.dl_tensor().ndim, 0);
        assert_eq!(exported.ndim(), 0);
        assert_eq!(exported.dtype(), to_dl_dtype(ScalarType::Long));
    }

    #[test]
    fn test_managed_deleter() {
        let tensor = sample();
        let managed = to_dlpack(&tensor, &ExportConfig::default())
            .unwrap()
            .into_managed();
        assert!(!managed.is_null());

        // SAFETY: managed was created by into_managed and is freed once below.
        unsafe {
            let dl = &(*managed).dl_tensor;
            assert_eq!(dl.data, tensor.data_ptr());
            assert_eq!(std::slice::from_raw_parts(dl.shape, 2), &[3, 4]);
            assert!(!(*managed).manager_ctx.is_null());

            let deleter = (*managed).deleter.expect("deleter installed");
            deleter(managed);
        }

        // The data buffer is untouched by the deleter.
        assert_eq!(tensor.get::<f32>(&[2, 3]).unwrap(), 11.0);
    }

    #[test]
    fn test_deleter_accepts_null() {
        // SAFETY: the deleter ignores null pointers.
        unsafe { dlpack_deleter(std::ptr::null_mut()) };
    }
}
