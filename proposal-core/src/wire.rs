// SPDX-License-Identifier: GPL-3.0-only

//! Declarative wire format of the proposal settings
//!
//! Decoding is lenient: a value with an unexpected shape is dropped with a
//! warning and the rest of the document is still used. Only invalid JSON
//! syntax is an error. The shorthand forms (size `"auto"` or `{min, max}`,
//! filesystem name or `{btrfs: {...}}`, target keyword or `{kind: device}`)
//! are decoded here into explicit variants, so the conversions never look at
//! raw JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use proposal_types::DiskSize;

/// Installation target, as a bare keyword or with its device(s)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTarget {
    /// `"disk"`, `"newLvmVg"` or `"reusedLvmVg"`
    Keyword(String),
    Device(WireDevice),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireDevice {
    Disk(String),
    NewLvmVg(Vec<String>),
    ReusedLvmVg(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBoot {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub configure: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEncryption {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pbkd_function: Option<String>,
}

/// Single-key action object, e.g. `{"forceDelete": "/dev/sda1"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireSpaceAction {
    ForceDelete(String),
    Delete(String),
    Resize(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSpace {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<WireSpaceAction>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMount {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBtrfs {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireFilesystem {
    Name(String),
    Btrfs { btrfs: WireBtrfs },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireSize {
    /// `"auto"`
    Keyword(String),
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<DiskSize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<DiskSize>,
    },
}

impl WireSize {
    pub fn auto() -> Self {
        Self::Keyword("auto".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireLocation {
    NewPartition(String),
    NewVg(String),
    Device(String),
    Filesystem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireVolumeTarget {
    /// `"default"`
    Keyword(String),
    Location(WireLocation),
}

impl WireVolumeTarget {
    pub fn default_target() -> Self {
        Self::Keyword("default".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVolume {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mount: Option<WireMount>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<WireFilesystem>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub size: Option<WireSize>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub target: Option<WireVolumeTarget>,
}

impl WireVolume {
    pub fn mount_path(&self) -> Option<&str> {
        self.mount.as_ref().and_then(|mount| mount.path.as_deref())
    }
}

/// Proposal settings as exchanged with clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSettings {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub target: Option<WireTarget>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub boot: Option<WireBoot>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub encryption: Option<WireEncryption>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub space: Option<WireSpace>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<WireVolume>>,
}

/// Decode a settings document.
///
/// A document that is valid JSON but not an object decodes as `{}`.
pub fn settings_from_json_str(text: &str) -> Result<WireSettings, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    settings_from_value(value)
}

pub fn settings_from_value(value: Value) -> Result<WireSettings, serde_json::Error> {
    if !value.is_object() {
        warn!(%value, "settings document is not an object, using an empty one");
        return Ok(WireSettings::default());
    }
    serde_json::from_value(value)
}

pub fn settings_to_json_string(settings: &WireSettings) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(settings)
}

/// Deserialize a value, or `None` (with a warning) when it has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_or_warn(value))
}

/// Like [`lenient`] for lists, dropping only the malformed elements
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(decode_or_warn).collect())),
        other => {
            warn!(value = %other, "ignoring malformed wire value, expected a list");
            Ok(None)
        }
    }
}

fn decode_or_warn<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }

    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            warn!(%value, %error, "ignoring malformed wire value");
            None
        }
    }
}
