// SPDX-License-Identifier: GPL-3.0-only

//! Settings consumed by the partitioning engine
//!
//! These mirror what the engine understands, which is flatter than
//! [`proposal_types::ProposalSettings`]: each volume carries its own size
//! rules and the space policy is already expanded into per-device actions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use proposal_types::{
    DiskSize, EncryptionMethod, FilesystemType, PbkdFunction, SpaceAction, SubvolumeSpec,
};

/// How the engine makes room when actions alone are not enough
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceStrategy {
    /// Resize the biggest partitions first, following the explicit actions
    #[default]
    BiggerResize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSpaceSettings {
    pub strategy: SpaceStrategy,
    pub actions: BTreeMap<String, SpaceAction>,
}

/// How physical volumes are allocated for a new volume group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VgStrategy {
    /// Only create physical volumes as big as needed
    UseNeeded,
    /// Use all the space of the candidate devices
    UseAvailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LvmSettings {
    pub enabled: bool,
    pub strategy: Option<VgStrategy>,
    /// Allow volumes to request their own dedicated volume group
    pub separate_vgs: bool,
    /// Allow reusing an existing volume group
    pub vg_reuse: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapReuse {
    #[default]
    None,
    Candidate,
    Any,
}

/// Engine view of one volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub mount_point: String,

    /// Whether the volume is part of the requested layout
    pub proposed: bool,
    /// Whether the engine may drop the volume to make it fit
    pub proposed_configurable: bool,

    pub fs_type: Option<FilesystemType>,
    pub fs_types: Vec<FilesystemType>,
    /// Comma separated mount options
    pub mount_options: String,

    pub weight: u32,
    pub adjust_by_ram: bool,
    pub ignore_fallback_sizes: bool,
    pub ignore_snapshots_sizes: bool,
    pub ignore_adjust_by_ram: bool,

    pub min_size: DiskSize,
    pub max_size: DiskSize,
    pub max_size_lvm: DiskSize,

    /// Mount point whose sizes are added to this volume when it is not proposed
    pub fallback_for_min_size: Option<String>,
    pub fallback_for_max_size: Option<String>,
    pub fallback_for_max_size_lvm: Option<String>,

    pub snapshots: bool,
    pub snapshots_configurable: bool,
    pub snapshots_size: Option<DiskSize>,
    pub snapshots_percentage: Option<u32>,

    pub subvolumes: Vec<SubvolumeSpec>,
    pub btrfs_default_subvolume: String,
    pub btrfs_read_only: bool,

    /// Disk to create the volume on
    pub device: Option<String>,
    /// Name of the dedicated volume group, if any
    pub separate_vg_name: Option<String>,
    /// Existing device to reuse
    pub reuse_name: Option<String>,
    /// Whether the reused device is formatted
    pub reformat: bool,
}

impl VolumeSpec {
    pub fn new(mount_point: impl Into<String>) -> Self {
        Self {
            mount_point: mount_point.into(),
            proposed: true,
            proposed_configurable: false,
            fs_type: None,
            fs_types: Vec::new(),
            mount_options: String::new(),
            weight: 0,
            adjust_by_ram: false,
            ignore_fallback_sizes: false,
            ignore_snapshots_sizes: false,
            ignore_adjust_by_ram: false,
            min_size: DiskSize::zero(),
            max_size: DiskSize::Unlimited,
            max_size_lvm: DiskSize::Unlimited,
            fallback_for_min_size: None,
            fallback_for_max_size: None,
            fallback_for_max_size_lvm: None,
            snapshots: false,
            snapshots_configurable: false,
            snapshots_size: None,
            snapshots_percentage: None,
            subvolumes: Vec::new(),
            btrfs_default_subvolume: String::new(),
            btrfs_read_only: false,
            device: None,
            separate_vg_name: None,
            reuse_name: None,
            reformat: false,
        }
    }

    pub fn reuses_device(&self) -> bool {
        self.reuse_name.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Devices the engine may allocate new partitions on
    pub candidate_devices: Vec<String>,
    pub root_device: Option<String>,

    /// Whether partitions needed for booting are proposed
    pub boot: bool,
    pub lvm: LvmSettings,

    pub encryption_password: Option<String>,
    pub encryption_method: Option<EncryptionMethod>,
    pub encryption_pbkdf: Option<PbkdFunction>,

    pub space: EngineSpaceSettings,
    pub swap_reuse: SwapReuse,
    pub volumes: Vec<VolumeSpec>,
}

impl EngineSettings {
    pub fn volume(&self, mount_point: &str) -> Option<&VolumeSpec> {
        self.volumes
            .iter()
            .find(|spec| spec.mount_point == mount_point)
    }

    pub fn proposed_volumes(&self) -> impl Iterator<Item = &VolumeSpec> {
        self.volumes.iter().filter(|spec| spec.proposed)
    }
}
