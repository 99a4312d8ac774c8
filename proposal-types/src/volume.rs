// SPDX-License-Identifier: GPL-3.0-only

//! Volume model
//!
//! A [`Volume`] is the resolved description of one mount point: which
//! filesystem to create, how big it may grow and where it should live. Its
//! [`VolumeOutline`] carries the product policy for that mount point and
//! never changes after the product configuration is loaded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BtrfsSettings, DiskSize, FilesystemType};

/// Product policy for a mount path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeOutline {
    /// Whether the volume must always be part of the proposal
    pub required: bool,

    /// Filesystems the volume may be formatted with, in preference order
    pub filesystems: Vec<FilesystemType>,

    pub snapshots_configurable: bool,

    /// Extra space reserved for snapshots, as an absolute size
    pub snapshots_size: Option<DiskSize>,

    /// Extra space reserved for snapshots, as a percentage of the base size
    pub snapshots_percentage: Option<u32>,

    pub adjust_by_ram: bool,

    pub base_min_size: DiskSize,

    pub base_max_size: DiskSize,
}

impl Default for VolumeOutline {
    fn default() -> Self {
        Self {
            required: false,
            filesystems: Vec::new(),
            snapshots_configurable: false,
            snapshots_size: None,
            snapshots_percentage: None,
            adjust_by_ram: false,
            base_min_size: DiskSize::zero(),
            base_max_size: DiskSize::Unlimited,
        }
    }
}

impl VolumeOutline {
    /// Whether reserving snapshot space changes the automatic size limits
    pub fn snapshots_affect_sizes(&self, snapshots: bool) -> bool {
        if !snapshots && !self.snapshots_configurable {
            return false;
        }

        self.snapshots_size.is_some_and(|size| !size.is_zero())
            || self.snapshots_percentage.is_some_and(|pct| pct != 0)
    }

    pub fn allows_filesystem(&self, fs_type: FilesystemType) -> bool {
        self.filesystems.contains(&fs_type)
    }
}

/// Kind of location requested for a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTarget {
    Default,
    NewPartition,
    NewVg,
    Device,
    Filesystem,
}

/// Where a volume is placed
///
/// Every variant other than `Default` names the device it refers to, so a
/// device without a target (or the reverse) cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", content = "device", rename_all = "snake_case")]
pub enum VolumeLocation {
    /// Let the proposal decide
    #[default]
    Default,

    /// New partition on the given disk
    NewPartition(String),

    /// New dedicated volume group on the given disk
    NewVg(String),

    /// Existing block device, reformatted
    Device(String),

    /// Existing filesystem, mounted as-is
    Filesystem(String),
}

impl VolumeLocation {
    pub fn target(&self) -> VolumeTarget {
        match self {
            Self::Default => VolumeTarget::Default,
            Self::NewPartition(_) => VolumeTarget::NewPartition,
            Self::NewVg(_) => VolumeTarget::NewVg,
            Self::Device(_) => VolumeTarget::Device,
            Self::Filesystem(_) => VolumeTarget::Filesystem,
        }
    }

    pub fn device(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::NewPartition(device)
            | Self::NewVg(device)
            | Self::Device(device)
            | Self::Filesystem(device) => Some(device),
        }
    }

    /// Whether the volume reuses an existing device instead of creating one
    pub fn reuses_device(&self) -> bool {
        matches!(self, Self::Device(_) | Self::Filesystem(_))
    }
}

/// Resolved description of a mount point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Mount path (empty for the generic volume)
    pub mount_path: String,

    pub mount_options: Vec<String>,

    pub fs_type: Option<FilesystemType>,

    /// Whether min/max are computed by the proposal instead of set by the user
    pub auto_size: bool,

    pub min_size: DiskSize,

    pub max_size: DiskSize,

    pub btrfs: BtrfsSettings,

    pub location: VolumeLocation,

    pub outline: VolumeOutline,

    /// Mount paths whose min size falls back to this volume when they are absent
    pub min_size_fallback_for: Vec<String>,

    /// Mount paths whose max size falls back to this volume when they are absent
    pub max_size_fallback_for: Vec<String>,
}

impl Volume {
    pub fn new(mount_path: impl Into<String>) -> Self {
        Self {
            mount_path: mount_path.into(),
            mount_options: Vec::new(),
            fs_type: None,
            auto_size: false,
            min_size: DiskSize::zero(),
            max_size: DiskSize::Unlimited,
            btrfs: BtrfsSettings::default(),
            location: VolumeLocation::Default,
            outline: VolumeOutline::default(),
            min_size_fallback_for: Vec::new(),
            max_size_fallback_for: Vec::new(),
        }
    }

    /// Whether the proposal is able to compute the size limits of this volume
    pub fn auto_size_supported(&self) -> bool {
        self.outline.adjust_by_ram
            || !self.min_size_fallback_for.is_empty()
            || !self.max_size_fallback_for.is_empty()
            || self.outline.snapshots_affect_sizes(self.btrfs.snapshots)
    }

    /// Switch to automatic sizes, taking the bounds from the outline.
    ///
    /// Returns false (and leaves the volume untouched) if auto size is not
    /// supported.
    pub fn use_auto_size(&mut self) -> bool {
        if !self.auto_size_supported() {
            return false;
        }

        self.auto_size = true;
        self.min_size = self.outline.base_min_size;
        self.max_size = self.outline.base_max_size;
        true
    }

    pub fn use_fixed_size(&mut self, min_size: DiskSize, max_size: DiskSize) {
        self.auto_size = false;
        self.min_size = min_size;
        self.max_size = max_size;
    }

    /// Whether the volume is mounted at the given path, ignoring lexical noise
    pub fn mounted_at(&self, path: &str) -> bool {
        clean_path(&self.mount_path) == clean_path(path)
    }

    pub fn is_generic(&self) -> bool {
        self.mount_path.is_empty()
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.is_generic() {
            "<generic>"
        } else {
            &self.mount_path
        };
        let fs = self.fs_type.map(|fs| fs.as_str()).unwrap_or("<none>");
        if self.auto_size {
            write!(f, "{path} ({fs}, auto size)")
        } else {
            write!(f, "{path} ({fs}, {} - {})", self.min_size, self.max_size)
        }
    }
}

/// Lexically clean a path: collapse separators, drop `.` and resolve `..`.
///
/// Relative names like "swap" are kept relative; the empty path stays empty.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_volume() -> Volume {
        let mut volume = Volume::new("/");
        volume.outline.base_min_size = DiskSize::gib(5);
        volume.outline.base_max_size = DiskSize::gib(20);
        volume
    }

    #[test]
    fn clean_path_normalizes_lexically() {
        assert_eq!(clean_path("/var//log/"), "/var/log");
        assert_eq!(clean_path("/var/./lib/../log"), "/var/log");
        assert_eq!(clean_path("/.."), "/");
        assert_eq!(clean_path("swap"), "swap");
        assert_eq!(clean_path(""), "");
    }

    #[test]
    fn mounted_at_ignores_lexical_noise() {
        let volume = Volume::new("/home");
        assert!(volume.mounted_at("/home/"));
        assert!(volume.mounted_at("//home"));
        assert!(!volume.mounted_at("/home2"));
    }

    #[test]
    fn location_exposes_target_and_device() {
        let location = VolumeLocation::NewVg("/dev/sda".to_string());
        assert_eq!(location.target(), VolumeTarget::NewVg);
        assert_eq!(location.device(), Some("/dev/sda"));
        assert!(!location.reuses_device());

        assert_eq!(VolumeLocation::Default.device(), None);
        assert!(VolumeLocation::Filesystem("/dev/sdb1".to_string()).reuses_device());
    }

    #[test]
    fn location_serializes_adjacently_tagged() {
        let json = serde_json::to_value(VolumeLocation::Device("/dev/sdb1".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"target": "device", "device": "/dev/sdb1"}));

        let json = serde_json::to_value(VolumeLocation::Default).unwrap();
        assert_eq!(json, serde_json::json!({"target": "default"}));
    }

    #[test]
    fn auto_size_needs_adaptive_outline() {
        let mut volume = root_volume();
        assert!(!volume.auto_size_supported());
        assert!(!volume.use_auto_size());
        assert!(!volume.auto_size);

        volume.outline.adjust_by_ram = true;
        assert!(volume.use_auto_size());
        assert!(volume.auto_size);
        assert_eq!(volume.min_size, DiskSize::gib(5));
        assert_eq!(volume.max_size, DiskSize::gib(20));
    }

    #[test]
    fn fallback_links_enable_auto_size() {
        let mut volume = root_volume();
        volume.min_size_fallback_for = vec!["/home".to_string()];
        assert!(volume.auto_size_supported());
    }

    #[test]
    fn snapshots_affect_sizes_only_when_relevant() {
        let mut outline = VolumeOutline::default();
        outline.snapshots_percentage = Some(250);
        assert!(!outline.snapshots_affect_sizes(false));
        assert!(outline.snapshots_affect_sizes(true));

        outline.snapshots_configurable = true;
        assert!(outline.snapshots_affect_sizes(false));

        outline.snapshots_percentage = Some(0);
        outline.snapshots_size = Some(DiskSize::zero());
        assert!(!outline.snapshots_affect_sizes(true));
    }

    #[test]
    fn fixed_size_clears_auto_size() {
        let mut volume = root_volume();
        volume.outline.adjust_by_ram = true;
        volume.use_auto_size();
        volume.use_fixed_size(DiskSize::gib(1), DiskSize::Unlimited);

        assert!(!volume.auto_size);
        assert_eq!(volume.min_size, DiskSize::gib(1));
        assert_eq!(volume.max_size, DiskSize::Unlimited);
    }
}
