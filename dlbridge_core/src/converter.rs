//! Descriptor converter
//!
//! [`DLConverter`] bundles a type registry with a [`BridgeConfig`] so
//! callers convert in both directions without threading either through
//! every call.

use crate::config::BridgeConfig;
use crate::dlpack::{self, DLManagedTensor, DLTensor, ExportedTensor};
use crate::error::BridgeResult;
use crate::tensor::{TensorView, TypeRegistry};

/// Converts tensors to and from DLPack descriptors
#[derive(Clone, Debug, Default)]
pub struct DLConverter<R> {
    registry: R,
    config: BridgeConfig,
}

impl<R: TypeRegistry> DLConverter<R> {
    /// Create a converter with the default configuration
    pub fn new(registry: R) -> Self {
        Self::with_config(registry, BridgeConfig::default())
    }

    pub fn with_config(registry: R, config: BridgeConfig) -> Self {
        Self { registry, config }
    }

    #[inline]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Export `tensor` as a scoped DLPack descriptor
    pub fn to_dlpack<T: TensorView + ?Sized>(&self, tensor: &T) -> BridgeResult<ExportedTensor> {
        dlpack::to_dlpack(tensor, &self.config.export)
    }

    /// Export `tensor` as a `DLManagedTensor` for another library
    ///
    /// The receiver must call the deleter exactly once.
    pub fn to_dlpack_managed<T: TensorView + ?Sized>(
        &self,
        tensor: &T,
    ) -> BridgeResult<*mut DLManagedTensor> {
        Ok(self.to_dlpack(tensor)?.into_managed())
    }

    /// Import a DLPack descriptor as a tensor view
    ///
    /// # Safety
    ///
    /// See [`dlpack::from_dlpack`].
    pub unsafe fn from_dlpack(&self, dl_tensor: &DLTensor) -> BridgeResult<R::Tensor> {
        dlpack::from_dlpack(dl_tensor, &self.registry, &self.config.import)
    }

    /// Import the tensor inside a `DLManagedTensor` without consuming it
    ///
    /// # Safety
    ///
    /// See [`dlpack::from_dlpack_managed`].
    pub unsafe fn from_dlpack_managed(
        &self,
        managed: *const DLManagedTensor,
    ) -> BridgeResult<R::Tensor> {
        dlpack::from_dlpack_managed(managed, &self.registry, &self.config.import)
    }
}
