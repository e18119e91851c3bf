//! Reference strided tensor and type registry
//!
//! Every buffer lives in host-addressable memory. The device is carried
//! as placement metadata, and element reads are refused for non-CPU
//! tensors.

use std::collections::HashSet;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

use dlbridge_types::{Backend, Device, Element, ScalarType};

use super::{contiguous_strides, TensorView, TypeRegistry};
use crate::error::{BridgeError, BridgeResult};

/// Backing memory of a tensor
///
/// Owned storage is a `u64` word buffer so every element type is
/// naturally aligned. Borrowed storage aliases a foreign blob.
struct Storage {
    ptr: NonNull<u8>,
    /// Word count of an owned buffer, `None` when borrowed
    owned_words: Option<usize>,
}

impl Storage {
    fn owned(nbytes: usize) -> Self {
        let words = nbytes.div_ceil(8).max(1);
        let buffer: Box<[u64]> = vec![0u64; words].into_boxed_slice();
        let raw = Box::into_raw(buffer) as *mut u64;
        Self {
            // SAFETY: Box::into_raw never returns null.
            ptr: unsafe { NonNull::new_unchecked(raw as *mut u8) },
            owned_words: Some(words),
        }
    }

    fn borrowed(ptr: NonNull<u8>) -> Self {
        Self {
            ptr,
            owned_words: None,
        }
    }

    fn capacity_bytes(&self) -> Option<usize> {
        self.owned_words.map(|words| words * 8)
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        if let Some(words) = self.owned_words {
            // SAFETY: ptr and words come from `Box::into_raw` in `Storage::owned`.
            unsafe {
                let slice =
                    std::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr() as *mut u64, words);
                drop(Box::from_raw(slice));
            }
        }
    }
}

// Safety: owned storage is a plain heap buffer. Borrowed storage is only
// created through `TypeRegistry::tensor_from_blob`, whose caller vouches
// for the foreign buffer.
unsafe impl Send for Storage {}
unsafe impl Sync for Storage {}

/// Strided tensor over shared storage
///
/// Clones share storage; metadata is per-instance.
#[derive(Clone)]
pub struct StridedTensor {
    storage: Arc<Storage>,
    sizes: Vec<i64>,
    strides: Vec<i64>,
    scalar_type: ScalarType,
    device: Device,
}

impl std::fmt::Debug for StridedTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedTensor")
            .field("data", &self.storage.ptr)
            .field("sizes", &self.sizes)
            .field("strides", &self.strides)
            .field("scalar_type", &self.scalar_type)
            .field("device", &self.device)
            .finish()
    }
}

fn to_i64_sizes(shape: &[usize]) -> BridgeResult<Vec<i64>> {
    shape
        .iter()
        .map(|&d| {
            i64::try_from(d)
                .map_err(|_| BridgeError::invalid_descriptor(format!("dimension {} too large", d)))
        })
        .collect()
}

fn numel_of(shape: &[usize]) -> BridgeResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| BridgeError::invalid_descriptor(format!("shape {:?} overflows", shape)))
}

impl StridedTensor {
    /// Create a contiguous CPU tensor from row-major data
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> BridgeResult<Self> {
        Self::from_vec_on(data, shape, Device::cpu())
    }

    /// Create a contiguous tensor from row-major data placed on `device`
    pub fn from_vec_on<T: Element>(
        data: Vec<T>,
        shape: &[usize],
        device: Device,
    ) -> BridgeResult<Self> {
        let expected = numel_of(shape)?;
        if data.len() != expected {
            return Err(BridgeError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let bytes: &[u8] = bytemuck::cast_slice(&data);
        let storage = Storage::owned(bytes.len());
        // SAFETY: the owned buffer holds at least `bytes.len()` bytes and
        // does not overlap `data`.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), storage.ptr.as_ptr(), bytes.len());
        }

        let sizes = to_i64_sizes(shape)?;
        Ok(Self {
            storage: Arc::new(storage),
            strides: contiguous_strides(&sizes)?,
            sizes,
            scalar_type: T::SCALAR_TYPE,
            device,
        })
    }

    /// Create a zero-filled contiguous CPU tensor
    pub fn zeros(shape: &[usize], scalar_type: ScalarType) -> BridgeResult<Self> {
        let numel = numel_of(shape)?;
        let nbytes = numel.checked_mul(scalar_type.element_size()).ok_or_else(|| {
            BridgeError::invalid_descriptor(format!("shape {:?} overflows", shape))
        })?;
        let sizes = to_i64_sizes(shape)?;
        Ok(Self {
            storage: Arc::new(Storage::owned(nbytes)),
            strides: contiguous_strides(&sizes)?,
            sizes,
            scalar_type,
            device: Device::cpu(),
        })
    }

    /// Total number of elements
    pub fn numel(&self) -> i64 {
        self.sizes.iter().product()
    }

    /// Check if the layout is contiguous row-major
    pub fn is_contiguous(&self) -> bool {
        contiguous_strides(&self.sizes).map_or(false, |strides| strides == self.strides)
    }

    /// Check if both tensors alias the same first element
    pub fn shares_data_with(&self, other: &StridedTensor) -> bool {
        self.storage.ptr == other.storage.ptr
    }

    /// Replace the view's sizes and strides in place
    ///
    /// For owned storage the new view must stay within the buffer.
    pub fn set_sizes_and_strides(&mut self, sizes: &[i64], strides: &[i64]) -> BridgeResult<()> {
        if sizes.len() != strides.len() {
            return Err(BridgeError::invalid_descriptor(format!(
                "{} sizes but {} strides",
                sizes.len(),
                strides.len()
            )));
        }
        if sizes.iter().any(|&d| d < 0) {
            return Err(BridgeError::invalid_descriptor(format!(
                "negative size in {:?}",
                sizes
            )));
        }
        if let Some(capacity) = self.storage.capacity_bytes() {
            let elem = self.scalar_type.element_size() as i64;
            let in_bounds = match view_extent(sizes, strides)? {
                None => true,
                Some((lo, hi)) => {
                    lo >= 0
                        && hi
                            .checked_add(1)
                            .and_then(|end| end.checked_mul(elem))
                            .map_or(false, |end| end <= capacity as i64)
                }
            };
            if !in_bounds {
                return Err(BridgeError::invalid_descriptor(format!(
                    "view {:?}/{:?} exceeds storage of {} bytes",
                    sizes, strides, capacity
                )));
            }
        }
        self.sizes = sizes.to_vec();
        self.strides = strides.to_vec();
        Ok(())
    }

    fn check_host(&self) -> BridgeResult<()> {
        if self.device.is_cpu() {
            Ok(())
        } else {
            Err(BridgeError::DeviceAccess(format!(
                "cannot read elements of a tensor on {}",
                self.device
            )))
        }
    }

    fn check_element<T: Element>(&self) -> BridgeResult<()> {
        if T::SCALAR_TYPE == self.scalar_type {
            Ok(())
        } else {
            Err(BridgeError::unsupported_scalar_type(format!(
                "tensor holds {}, requested {}",
                self.scalar_type,
                T::SCALAR_TYPE
            )))
        }
    }

    fn byte_ptr_at(&self, element_offset: i64) -> *const u8 {
        let elem = self.scalar_type.element_size() as isize;
        // SAFETY: offsets come from in-bounds indices over a validated view.
        unsafe { self.storage.ptr.as_ptr().offset(element_offset as isize * elem) }
    }

    /// Element offsets of every logical position in row-major order
    fn offsets(&self) -> Vec<i64> {
        let numel = self.numel().max(0) as usize;
        let mut out = Vec::with_capacity(numel);
        if numel == 0 {
            return out;
        }

        let ndim = self.sizes.len();
        let mut index = vec![0i64; ndim];
        for _ in 0..numel {
            out.push(index.iter().zip(&self.strides).map(|(i, s)| i * s).sum());
            for d in (0..ndim).rev() {
                index[d] += 1;
                if index[d] < self.sizes[d] {
                    break;
                }
                index[d] = 0;
            }
        }
        out
    }

    /// Read one element
    pub fn get<T: Element>(&self, index: &[usize]) -> BridgeResult<T> {
        self.check_host()?;
        self.check_element::<T>()?;
        if index.len() != self.sizes.len() {
            return Err(BridgeError::invalid_descriptor(format!(
                "expected {} indices, got {}",
                self.sizes.len(),
                index.len()
            )));
        }

        let mut offset = 0i64;
        for (d, (&i, &size)) in index.iter().zip(&self.sizes).enumerate() {
            if i as i64 >= size {
                return Err(BridgeError::invalid_descriptor(format!(
                    "index {} out of range for dimension {} of size {}",
                    i, d, size
                )));
            }
            offset += i as i64 * self.strides[d];
        }

        // SAFETY: index is in bounds, so the element lies inside the view.
        Ok(unsafe { (self.byte_ptr_at(offset) as *const T).read_unaligned() })
    }

    /// Copy all elements out in row-major order
    pub fn to_vec<T: Element>(&self) -> BridgeResult<Vec<T>> {
        self.check_host()?;
        self.check_element::<T>()?;
        Ok(self
            .offsets()
            .into_iter()
            // SAFETY: offsets enumerate positions inside the view.
            .map(|offset| unsafe { (self.byte_ptr_at(offset) as *const T).read_unaligned() })
            .collect())
    }

    /// Check element-wise equality of type, shape and values
    pub fn equal(&self, other: &StridedTensor) -> BridgeResult<bool> {
        self.check_host()?;
        other.check_host()?;
        if self.scalar_type != other.scalar_type || self.sizes != other.sizes {
            return Ok(false);
        }

        let elem = self.scalar_type.element_size();
        let equal = self
            .offsets()
            .into_iter()
            .zip(other.offsets())
            .all(|(a, b)| {
                // SAFETY: both offsets address elements inside their views.
                unsafe {
                    std::slice::from_raw_parts(self.byte_ptr_at(a), elem)
                        == std::slice::from_raw_parts(other.byte_ptr_at(b), elem)
                }
            });
        Ok(equal)
    }
}

/// Lowest and highest element offsets a view can reach
///
/// `None` for an empty view. Sizes must be non-negative.
fn view_extent(sizes: &[i64], strides: &[i64]) -> BridgeResult<Option<(i64, i64)>> {
    if sizes.iter().any(|&d| d == 0) {
        return Ok(None);
    }
    let overflow = || {
        BridgeError::invalid_descriptor(format!("view {:?}/{:?} overflows", sizes, strides))
    };
    let mut lo = 0i64;
    let mut hi = 0i64;
    for (&size, &stride) in sizes.iter().zip(strides) {
        let reach = (size - 1).checked_mul(stride).ok_or_else(overflow)?;
        if reach < 0 {
            lo = lo.checked_add(reach).ok_or_else(overflow)?;
        } else {
            hi = hi.checked_add(reach).ok_or_else(overflow)?;
        }
    }
    Ok(Some((lo, hi)))
}

impl TensorView for StridedTensor {
    fn data_ptr(&self) -> *mut c_void {
        self.storage.ptr.as_ptr() as *mut c_void
    }

    fn sizes(&self) -> &[i64] {
        &self.sizes
    }

    fn strides(&self) -> &[i64] {
        &self.strides
    }

    fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    fn device(&self) -> Device {
        self.device
    }

    fn device_index(&self) -> Option<i64> {
        Some(self.device.index)
    }
}

/// Registry of the (backend, scalar type) pairs [`StridedTensor`] can view
#[derive(Clone, Debug)]
pub struct StridedRegistry {
    registered: HashSet<(Backend, ScalarType)>,
}

impl Default for StridedRegistry {
    /// Registers every backend and scalar type
    fn default() -> Self {
        let mut registry = Self::empty();
        for backend in Backend::ALL {
            registry.register_backend(backend);
        }
        registry
    }
}

impl StridedRegistry {
    /// Registry with no types
    pub fn empty() -> Self {
        Self {
            registered: HashSet::new(),
        }
    }

    /// Registry with the CPU types only
    pub fn cpu_only() -> Self {
        let mut registry = Self::empty();
        registry.register_backend(Backend::Cpu);
        registry
    }

    pub fn register(&mut self, backend: Backend, scalar_type: ScalarType) -> &mut Self {
        self.registered.insert((backend, scalar_type));
        self
    }

    /// Register every scalar type on `backend`
    pub fn register_backend(&mut self, backend: Backend) -> &mut Self {
        for scalar_type in ScalarType::ALL {
            self.register(backend, scalar_type);
        }
        self
    }

    pub fn is_registered(&self, backend: Backend, scalar_type: ScalarType) -> bool {
        self.registered.contains(&(backend, scalar_type))
    }
}

impl TypeRegistry for StridedRegistry {
    type Tensor = StridedTensor;

    unsafe fn tensor_from_blob(
        &self,
        device: Device,
        scalar_type: ScalarType,
        data: *mut c_void,
        sizes: &[i64],
        strides: &[i64],
    ) -> BridgeResult<StridedTensor> {
        if !self.is_registered(device.backend, scalar_type) {
            return Err(BridgeError::UnregisteredType {
                backend: device.backend,
                scalar_type,
            });
        }
        if sizes.len() != strides.len() {
            return Err(BridgeError::invalid_descriptor(format!(
                "{} sizes but {} strides",
                sizes.len(),
                strides.len()
            )));
        }
        if sizes.iter().any(|&d| d < 0) {
            return Err(BridgeError::invalid_descriptor(format!(
                "negative size in {:?}",
                sizes
            )));
        }
        let ptr = NonNull::new(data as *mut u8)
            .ok_or_else(|| BridgeError::invalid_descriptor("data pointer is null"))?;

        log::trace!(
            "tensor_from_blob: {} {} sizes={:?} strides={:?}",
            device,
            scalar_type,
            sizes,
            strides
        );
        Ok(StridedTensor {
            storage: Arc::new(Storage::borrowed(ptr)),
            sizes: sizes.to_vec(),
            strides: strides.to_vec(),
            scalar_type,
            device,
        })
    }
}
