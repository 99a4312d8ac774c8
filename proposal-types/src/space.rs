// SPDX-License-Identifier: GPL-3.0-only

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How to make room for the new system on existing devices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacePolicy {
    /// Keep all existing partitions
    #[default]
    Keep,
    /// Delete everything on the installation devices
    Delete,
    /// Shrink existing partitions as needed
    Resize,
    /// Use the explicit per-device actions
    Custom,
}

impl SpacePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Delete => "delete",
            Self::Resize => "resize",
            Self::Custom => "custom",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "keep" => Some(Self::Keep),
            "delete" => Some(Self::Delete),
            "resize" => Some(Self::Resize),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Action to perform on an existing device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceAction {
    /// Delete if the proposal needs the space
    Delete,
    /// Always delete
    ForceDelete,
    /// Shrink if the proposal needs the space
    Resize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSettings {
    pub policy: SpacePolicy,

    /// Per-device actions, only meaningful for [`SpacePolicy::Custom`]
    pub actions: BTreeMap<String, SpaceAction>,
}

impl SpaceSettings {
    pub fn with_policy(policy: SpacePolicy) -> Self {
        Self {
            policy,
            actions: BTreeMap::new(),
        }
    }
}
