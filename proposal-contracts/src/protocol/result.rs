// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use proposal_types::{DiskSize, FilesystemType, Issue};

use super::{DeviceGraph, EngineSettings};

/// Device the engine plans to create for a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDevice {
    pub mount_point: String,
    /// Device the volume ends up on, when already known
    pub name: Option<String>,
    pub fs_type: Option<FilesystemType>,
    pub min_size: DiskSize,
    pub max_size: DiskSize,
}

/// Outcome of a proposal attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult {
    /// Settings as adjusted by the engine while proposing
    pub settings: EngineSettings,
    pub planned_devices: Vec<PlannedDevice>,
    /// Device graph after applying the proposal
    pub graph: DeviceGraph,
    /// Human-readable descriptions of the actions to perform
    pub actions: Vec<String>,
    /// Set when no valid layout could be computed
    pub failed: bool,
    pub issues: Vec<Issue>,
}

impl EngineResult {
    pub fn planned_device(&self, mount_point: &str) -> Option<&PlannedDevice> {
        self.planned_devices
            .iter()
            .find(|device| device.mount_point == mount_point)
    }

    pub fn succeeded(&self) -> bool {
        !self.failed
    }
}
