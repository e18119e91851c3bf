//! Device mapping between dlbridge and DLPack

use dlbridge_types::{Backend, Device};

use super::device_type;
use super::ffi::DLDevice;
use crate::error::{BridgeError, BridgeResult};

/// Convert a device to its DLPack device
///
/// CUDA maps to `kDLGPU`, everything else to `kDLCPU`; the index passes
/// through unchanged.
pub fn to_dl_device(device: Device) -> BridgeResult<DLDevice> {
    let device_id =
        i32::try_from(device.index).map_err(|_| BridgeError::DeviceIndexOutOfRange(device.index))?;
    let kind = if device.is_cuda() {
        device_type::GPU
    } else {
        device_type::CPU
    };
    Ok(DLDevice::new(kind, device_id))
}

/// Convert a DLPack device back to a device
///
/// Only `kDLCPU` and `kDLGPU` are accepted, and a GPU ordinal must be
/// non-negative.
pub fn device_from_dl(dl_device: DLDevice) -> BridgeResult<Device> {
    let backend = match dl_device.device_type {
        device_type::CPU => Backend::Cpu,
        device_type::GPU if dl_device.device_id < 0 => {
            return Err(BridgeError::DeviceIndexOutOfRange(i64::from(dl_device.device_id)));
        }
        device_type::GPU => Backend::Cuda,
        other => return Err(BridgeError::UnsupportedDeviceType(other)),
    };
    log::trace!(
        "dlpack device (type={}, id={}) -> {}",
        dl_device.device_type,
        dl_device.device_id,
        backend
    );
    Ok(Device::new(backend, i64::from(dl_device.device_id)))
}
