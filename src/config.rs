//! Miner configuration
//!
//! Read from a JSON file; every field is optional and command-line flags
//! override what the file sets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::{EngineError, KernelKind, ShareTarget};

/// Default difficulty in leading zero bits
pub const DEFAULT_TARGET_BITS: u32 = 16;

/// Default nonces per `scan` call between stop-flag checks
pub const DEFAULT_CHUNK_SIZE: u32 = 1 << 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error(transparent)]
    Kernel(#[from] EngineError),

    #[error("chunk_size must be positive")]
    ZeroChunk,
}

/// Miner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Kernel name, or `None`/`"auto"` for the best one available
    pub kernel: Option<String>,
    /// Worker threads (default: number of CPU cores)
    pub threads: Option<usize>,
    /// Difficulty in leading zero bits
    pub target_bits: u32,
    /// Nonces per engine call between stop checks
    pub chunk_size: u32,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            kernel: None,
            threads: None,
            target_bits: DEFAULT_TARGET_BITS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl MinerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kernel_kind()?;
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunk);
        }
        Ok(())
    }

    /// Kernel to run, resolving `auto` against the current CPU
    pub fn kernel_kind(&self) -> Result<KernelKind, EngineError> {
        match self.kernel.as_deref() {
            None | Some("auto") => Ok(KernelKind::best()),
            Some(name) => name.parse(),
        }
    }

    pub fn target(&self) -> ShareTarget {
        ShareTarget::leading_zero_bits(self.target_bits)
    }
}

/// Get default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("scanhash").join("config.json")
}

/// Get default config file path
#[cfg(not(feature = "cli"))]
pub fn default_config_path() -> PathBuf {
    PathBuf::from("scanhash.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = MinerConfig::from_json(r#"{ "threads": 3 }"#).unwrap();
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.target_bits, DEFAULT_TARGET_BITS);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.kernel_kind().unwrap(), KernelKind::best());
    }

    #[test]
    fn test_named_kernel() {
        let config = MinerConfig::from_json(r#"{ "kernel": "portable4" }"#).unwrap();
        assert_eq!(config.kernel_kind().unwrap(), KernelKind::Portable4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            MinerConfig::from_json(r#"{ "kernel": "gpu" }"#),
            Err(ConfigError::Kernel(EngineError::UnknownKernel(_)))
        ));
        assert!(matches!(
            MinerConfig::from_json(r#"{ "chunk_size": 0 }"#),
            Err(ConfigError::ZeroChunk)
        ));
        assert!(matches!(
            MinerConfig::from_json("not json"),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_target_from_bits() {
        let config = MinerConfig {
            target_bits: 8,
            ..MinerConfig::default()
        };
        assert_eq!(config.target().ceiling(), 0x00FF_FFFF);
    }

    #[test]
    fn test_save_and_load() {
        let path =
            std::env::temp_dir().join(format!("scanhash-config-{}.json", std::process::id()));
        let config = MinerConfig {
            kernel: Some("scalar".to_string()),
            threads: Some(2),
            target_bits: 12,
            chunk_size: 1024,
        };
        config.save(&path).unwrap();
        assert_eq!(MinerConfig::load(&path).unwrap(), config);
        fs::remove_file(&path).unwrap();

        assert_eq!(MinerConfig::load_or_default(&path).unwrap(), MinerConfig::default());
    }
}
