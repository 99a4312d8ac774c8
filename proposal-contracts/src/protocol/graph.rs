// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use proposal_types::DiskSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Disk,
    Partition,
    LvmVg,
    LvmLv,
    MdRaid,
}

/// Block device in a [`DeviceGraph`] snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDevice {
    pub name: String,
    pub size: DiskSize,
    pub kind: DeviceKind,

    /// Device this one lives on (the disk of a partition, the VG of an LV)
    #[serde(default)]
    pub parent: Option<String>,

    /// Whether the content of the device can be shrunk
    #[serde(default)]
    pub shrinkable: bool,
}

impl GraphDevice {
    pub fn new(name: impl Into<String>, kind: DeviceKind, size: DiskSize) -> Self {
        Self {
            name: name.into(),
            size,
            kind,
            parent: None,
            shrinkable: false,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn shrinkable(mut self, shrinkable: bool) -> Self {
        self.shrinkable = shrinkable;
        self
    }
}

/// Snapshot of the block devices of a system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGraph {
    pub devices: Vec<GraphDevice>,
}

impl DeviceGraph {
    pub fn new(devices: Vec<GraphDevice>) -> Self {
        Self { devices }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&GraphDevice> {
        self.devices.iter().find(|device| device.name == name)
    }

    /// Partitions living directly on the named device, in graph order
    pub fn partitions_of(&self, name: &str) -> Vec<&GraphDevice> {
        self.devices
            .iter()
            .filter(|device| device.kind == DeviceKind::Partition)
            .filter(|device| device.parent.as_deref() == Some(name))
            .collect()
    }

    /// Whether the named device exists and can be shrunk
    pub fn supports_shrinking(&self, name: &str) -> bool {
        self.find_by_name(name)
            .is_some_and(|device| device.shrinkable)
    }

    pub fn disks(&self) -> impl Iterator<Item = &GraphDevice> {
        self.devices
            .iter()
            .filter(|device| device.kind == DeviceKind::Disk)
    }

    pub fn remove(&mut self, name: &str) -> Option<GraphDevice> {
        let index = self.devices.iter().position(|device| device.name == name)?;
        Some(self.devices.remove(index))
    }

    pub fn push(&mut self, device: GraphDevice) {
        self.devices.push(device);
    }
}
