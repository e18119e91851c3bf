//! Shared test utilities for dlbridge_core integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::c_void;

use dlbridge_core::{BridgeResult, Device, Element, Half, ScalarType, StridedTensor, TypeRegistry};

/// A row-major 3x4 tensor of `scalar_type` holding 0..12 on `device`
pub fn sample_tensor(scalar_type: ScalarType, device: Device) -> StridedTensor {
    fn build<T: Element>(data: impl Iterator<Item = T>, device: Device) -> StridedTensor {
        StridedTensor::from_vec_on(data.collect(), &[3, 4], device).expect("sample tensor")
    }

    match scalar_type {
        ScalarType::Byte => build(0..12u8, device),
        ScalarType::Char => build((0..12i8).map(|v| -v), device),
        ScalarType::Short => build((0..12i16).map(|v| v * 300), device),
        ScalarType::Int => build((0..12i32).map(|v| v << 20), device),
        ScalarType::Long => build((0..12i64).map(|v| v << 40), device),
        ScalarType::Half => build((0..12u16).map(|v| Half::from_bits(0x3c00 + v)), device),
        ScalarType::Float => build((0..12).map(|v| v as f32 * 0.5), device),
        ScalarType::Double => build((0..12).map(|v| v as f64 * 0.25), device),
    }
}

/// Arguments of one `tensor_from_blob` call
#[derive(Clone, Debug, PartialEq)]
pub struct BlobCall {
    pub device: Device,
    pub scalar_type: ScalarType,
    pub data: usize,
    pub sizes: Vec<i64>,
    pub strides: Vec<i64>,
}

/// Registry fake that records every call and returns the arguments
#[derive(Default)]
pub struct RecordingRegistry {
    pub calls: RefCell<Vec<BlobCall>>,
}

impl TypeRegistry for RecordingRegistry {
    type Tensor = BlobCall;

    unsafe fn tensor_from_blob(
        &self,
        device: Device,
        scalar_type: ScalarType,
        data: *mut c_void,
        sizes: &[i64],
        strides: &[i64],
    ) -> BridgeResult<BlobCall> {
        let call = BlobCall {
            device,
            scalar_type,
            data: data as usize,
            sizes: sizes.to_vec(),
            strides: strides.to_vec(),
        };
        self.calls.borrow_mut().push(call.clone());
        Ok(call)
    }
}
