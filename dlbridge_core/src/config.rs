//! Converter configuration
//!
//! Typed configuration for DLPack export and import. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! # Example dlbridge.toml
//!
//! ```toml
//! [export]
//! # zero: always emit device id 0 (default)
//! # from_tensor: use the tensor's own device index when it reports one
//! device_index = "zero"
//!
//! [import]
//! # reject: refuse descriptors with byte_offset != 0 (default)
//! # apply: add byte_offset to the data pointer
//! byte_offset = "reject"
//! ```

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which device id export writes into the descriptor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceIndexPolicy {
    /// Always emit device id 0
    #[default]
    Zero,
    /// Use the tensor's reported device index, falling back to 0
    FromTensor,
}

/// How import treats a non-zero `byte_offset`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOffsetPolicy {
    /// Fail with `UnsupportedByteOffset`
    #[default]
    Reject,
    /// Advance the data pointer by `byte_offset`
    Apply,
}

/// Export section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub device_index: DeviceIndexPolicy,
}

/// Import section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub byte_offset: ByteOffsetPolicy,
}

/// Top-level converter configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub export: ExportConfig,
    pub import: ImportConfig,
}

impl BridgeConfig {
    /// Load config from a file (format picked by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents)),
        }
    }

    /// Parse config from TOML string
    pub fn from_toml(contents: &str) -> BridgeResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Parse config from YAML string
    pub fn from_yaml(contents: &str) -> BridgeResult<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Serialize config as TOML
    pub fn to_toml(&self) -> BridgeResult<String> {
        toml::to_string(self)
            .map_err(|e| BridgeError::config(format!("Failed to serialize TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_preserve_documented_behavior() {
        let config = BridgeConfig::default();
        assert_eq!(config.export.device_index, DeviceIndexPolicy::Zero);
        assert_eq!(config.import.byte_offset, ByteOffsetPolicy::Reject);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[export]
device_index = "from_tensor"

[import]
byte_offset = "apply"
"#;
        let config = BridgeConfig::from_toml(toml).unwrap();
        assert_eq!(config.export.device_index, DeviceIndexPolicy::FromTensor);
        assert_eq!(config.import.byte_offset, ByteOffsetPolicy::Apply);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
export:
  device_index: from_tensor
"#;
        let config = BridgeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.export.device_index, DeviceIndexPolicy::FromTensor);
        assert_eq!(config.import.byte_offset, ByteOffsetPolicy::Reject);
    }

    #[test]
    fn test_empty_sources() {
        assert_eq!(BridgeConfig::from_toml("").unwrap(), BridgeConfig::default());
        assert_eq!(BridgeConfig::from_yaml("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = BridgeConfig::from_toml("[export]\ndevice_index = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = BridgeConfig {
            export: ExportConfig {
                device_index: DeviceIndexPolicy::FromTensor,
            },
            import: ImportConfig {
                byte_offset: ByteOffsetPolicy::Apply,
            },
        };
        let text = config.to_toml().unwrap();
        assert_eq!(BridgeConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("dlbridge.toml");
        std::fs::write(&toml_path, "[import]\nbyte_offset = \"apply\"\n").unwrap();
        let config = BridgeConfig::from_file(&toml_path).unwrap();
        assert_eq!(config.import.byte_offset, ByteOffsetPolicy::Apply);

        let yaml_path = dir.path().join("dlbridge.yml");
        std::fs::write(&yaml_path, "export:\n  device_index: from_tensor\n").unwrap();
        let config = BridgeConfig::from_file(&yaml_path).unwrap();
        assert_eq!(config.export.device_index, DeviceIndexPolicy::FromTensor);
    }

    #[test]
    fn test_from_file_without_extension_tries_both() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "import:\n  byte_offset: apply").unwrap();
        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.import.byte_offset, ByteOffsetPolicy::Apply);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
