// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Target of the installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceSettings {
    /// Install on a disk, partitioning it as needed
    Disk { name: Option<String> },

    /// Create a new LVM volume group over the candidate devices
    NewLvmVg { candidate_pv_devices: Vec<String> },

    /// Install into an existing LVM volume group
    ReusedLvmVg { name: Option<String> },
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::Disk { name: None }
    }
}

impl DeviceSettings {
    pub fn disk(name: impl Into<String>) -> Self {
        Self::Disk {
            name: Some(name.into()),
        }
    }

    pub fn new_lvm_vg<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NewLvmVg {
            candidate_pv_devices: devices.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the settings still lack the device(s) to install on.
    ///
    /// A reused volume group is never considered under-specified.
    pub fn is_unresolved(&self) -> bool {
        match self {
            Self::Disk { name } => name.is_none(),
            Self::NewLvmVg {
                candidate_pv_devices,
            } => candidate_pv_devices.is_empty(),
            Self::ReusedLvmVg { .. } => false,
        }
    }

    /// Fill an under-specified target with the given device
    pub fn select(&mut self, device: &str) {
        match self {
            Self::Disk { name } => *name = Some(device.to_string()),
            Self::NewLvmVg {
                candidate_pv_devices,
            } => *candidate_pv_devices = vec![device.to_string()],
            Self::ReusedLvmVg { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_targets() {
        assert!(DeviceSettings::default().is_unresolved());
        assert!(!DeviceSettings::disk("/dev/sda").is_unresolved());
        assert!(DeviceSettings::new_lvm_vg(Vec::<String>::new()).is_unresolved());
        assert!(!DeviceSettings::ReusedLvmVg { name: None }.is_unresolved());
    }

    #[test]
    fn select_fills_the_target() {
        let mut disk = DeviceSettings::default();
        disk.select("/dev/vda");
        assert_eq!(disk, DeviceSettings::disk("/dev/vda"));

        let mut lvm = DeviceSettings::new_lvm_vg(Vec::<String>::new());
        lvm.select("/dev/vda");
        assert_eq!(lvm, DeviceSettings::new_lvm_vg(["/dev/vda"]));
    }
}
