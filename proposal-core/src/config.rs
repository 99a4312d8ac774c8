// SPDX-License-Identifier: GPL-3.0-only

//! Product configuration
//!
//! The `storage` section of a product definition: which volumes a product
//! proposes, how they are sized and which defaults apply to the rest of the
//! settings. A [`ProductConfig`] is loaded once and never changes; the volume
//! templates are computed at load time and live inside it.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use proposal_types::DiskSize;

use crate::error::{ConfigError, Result};
use crate::templates::VolumeTemplates;

/// A size written either as a byte count or as a human string ("5 GiB")
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Bytes(u64),
    Text(String),
}

impl SizeValue {
    /// Parsed size, or `None` (with a warning) when it cannot be parsed
    pub fn to_size(&self, context: &str) -> Option<DiskSize> {
        match self {
            Self::Bytes(bytes) => Some(DiskSize::b(*bytes)),
            Self::Text(text) => match DiskSize::parse(text) {
                Ok(size) => Some(size),
                Err(error) => {
                    warn!(%context, value = %text, %error, "ignoring unparsable size");
                    None
                }
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    pub method: Option<String>,
    pub pbkd_function: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub auto: bool,
    pub min: Option<SizeValue>,
    pub max: Option<SizeValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubvolumeConfig {
    Path(String),
    Full {
        path: String,
        #[serde(default = "default_copy_on_write")]
        copy_on_write: bool,
        /// Comma separated list of architectures
        #[serde(default)]
        archs: Option<String>,
    },
}

fn default_copy_on_write() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BtrfsConfig {
    pub snapshots: bool,
    pub read_only: bool,
    pub default_subvolume: String,
    pub subvolumes: Vec<SubvolumeConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AutoSizeConfig {
    pub base_min: Option<SizeValue>,
    pub base_max: Option<SizeValue>,
    /// Either a percentage ("250%") or a size
    pub snapshots_increment: Option<SizeValue>,
    pub min_fallback_for: Vec<String>,
    pub max_fallback_for: Vec<String>,
    pub adjust_by_ram: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    pub required: bool,
    pub filesystems: Vec<String>,
    pub snapshots_configurable: bool,
    pub auto_size: AutoSizeConfig,
}

/// Template entry of `storage.volume_templates`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Mount path; empty for the generic template
    pub mount_path: String,
    pub filesystem: Option<String>,
    pub mount_options: Vec<String>,
    pub size: SizeConfig,
    pub btrfs: BtrfsConfig,
    pub outline: OutlineConfig,
}

/// The `storage` section of the product configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub lvm: bool,
    pub space_policy: Option<String>,
    /// Mount paths proposed by default, on top of the required ones
    pub volumes: Vec<String>,
    pub encryption: EncryptionConfig,
    pub volume_templates: Vec<TemplateConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductDocument {
    #[serde(default)]
    storage: StorageConfig,
}

/// Immutable product configuration snapshot
#[derive(Debug, Clone, Default)]
pub struct ProductConfig {
    storage: StorageConfig,
    templates: VolumeTemplates,
}

impl ProductConfig {
    pub fn new(storage: StorageConfig) -> Self {
        let templates = VolumeTemplates::build(&storage);
        Self { storage, templates }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let document: ProductDocument = toml::from_str(text)?;
        Ok(Self::new(document.storage))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: ProductDocument = serde_json::from_str(text)?;
        Ok(Self::new(document.storage))
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loading product configuration");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&raw),
            Some("json") => Self::from_json_str(&raw),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn templates(&self) -> &VolumeTemplates {
        &self.templates
    }
}
