// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Btrfs options of a volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtrfsSettings {
    /// Whether snapshots are enabled
    pub snapshots: bool,

    /// Whether the root subvolume is mounted read-only
    pub read_only: bool,

    /// Default subvolume (empty for the top-level one)
    pub default_subvolume: String,

    pub subvolumes: Vec<SubvolumeSpec>,
}

/// Subvolume to create below the default subvolume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubvolumeSpec {
    pub path: String,
    pub copy_on_write: bool,

    /// Architectures the subvolume applies to (empty = all)
    pub archs: Vec<String>,
}

impl SubvolumeSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            copy_on_write: true,
            archs: Vec::new(),
        }
    }
}
