//! Device classification for tensor placement
//!
//! Defines where tensor data resides (host memory or CUDA accelerator
//! memory) together with the device index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a tensor's storage resides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Host memory
    #[default]
    Cpu,
    /// CUDA accelerator memory
    Cuda,
}

impl Backend {
    /// Both backends
    pub const ALL: [Backend; 2] = [Backend::Cpu, Backend::Cuda];

    /// Check if this backend lives in accelerator memory
    #[inline]
    pub const fn is_cuda(&self) -> bool {
        matches!(self, Backend::Cuda)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Cpu => write!(f, "cpu"),
            Backend::Cuda => write!(f, "cuda"),
        }
    }
}

/// Backend paired with a device index
///
/// The index is only meaningful for accelerator memory; host memory
/// always uses index 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Device {
    /// Backend classification
    pub backend: Backend,
    /// Device index (GPU number for CUDA, 0 for CPU)
    pub index: i64,
}

impl Device {
    /// CPU device constant
    pub const CPU: Device = Device {
        backend: Backend::Cpu,
        index: 0,
    };

    /// Create a CPU device
    #[inline]
    pub const fn cpu() -> Self {
        Self::CPU
    }

    /// Create a CUDA device with given index
    #[inline]
    pub const fn cuda(index: i64) -> Self {
        Device {
            backend: Backend::Cuda,
            index,
        }
    }

    /// Create a device on `backend`, normalizing the CPU index to 0
    #[inline]
    pub const fn new(backend: Backend, index: i64) -> Self {
        match backend {
            Backend::Cpu => Self::CPU,
            Backend::Cuda => Self::cuda(index),
        }
    }

    /// Check if device is CPU
    #[inline]
    pub const fn is_cpu(&self) -> bool {
        matches!(self.backend, Backend::Cpu)
    }

    /// Check if device is CUDA
    #[inline]
    pub const fn is_cuda(&self) -> bool {
        self.backend.is_cuda()
    }

    /// Get CUDA device index, or None for CPU
    #[inline]
    pub const fn cuda_index(&self) -> Option<i64> {
        if self.is_cuda() {
            Some(self.index)
        } else {
            None
        }
    }

    /// Parse device from string (e.g., "cpu", "cuda", "cuda:0", "gpu:1")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        match s.as_str() {
            "cpu" => Some(Device::cpu()),
            "cuda" | "gpu" => Some(Device::cuda(0)),
            _ if s.starts_with("cuda:") || s.starts_with("gpu:") => {
                let idx_str = s.split(':').nth(1)?;
                let idx: i64 = idx_str.parse().ok()?;
                if idx < 0 {
                    return None;
                }
                Some(Device::cuda(idx))
            }
            _ => None,
        }
    }
}

impl From<Backend> for Device {
    fn from(backend: Backend) -> Self {
        Device::new(backend, 0)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backend {
            Backend::Cpu => write!(f, "cpu"),
            Backend::Cuda => write!(f, "cuda:{}", self.index),
        }
    }
}

// Serialized as a string ("cpu", "cuda:0", "cuda:1", ...)
impl Serialize for Device {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Device::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid device: {}", s)))
    }
}
