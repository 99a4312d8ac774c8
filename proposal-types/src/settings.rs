// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use crate::{BootSettings, DeviceSettings, EncryptionSettings, SpaceSettings, Volume};

/// Aggregate settings of a storage proposal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSettings {
    pub device: DeviceSettings,
    pub boot: BootSettings,
    pub encryption: EncryptionSettings,
    pub space: SpaceSettings,
    pub volumes: Vec<Volume>,
}

impl ProposalSettings {
    /// Device used for booting when no explicit boot device is set
    pub fn default_boot_device(&self) -> Option<&str> {
        match &self.device {
            DeviceSettings::Disk { name } => name.as_deref(),
            DeviceSettings::NewLvmVg {
                candidate_pv_devices,
            } => candidate_pv_devices.first().map(String::as_str),
            DeviceSettings::ReusedLvmVg { .. } => None,
        }
    }

    pub fn boot_device(&self) -> Option<&str> {
        self.boot
            .device
            .as_deref()
            .or_else(|| self.default_boot_device())
    }

    /// Devices the new system is installed on
    pub fn target_devices(&self) -> Vec<&str> {
        match &self.device {
            DeviceSettings::Disk { name } => name.as_deref().into_iter().collect(),
            DeviceSettings::NewLvmVg {
                candidate_pv_devices,
            } => candidate_pv_devices.iter().map(String::as_str).collect(),
            DeviceSettings::ReusedLvmVg { .. } => Vec::new(),
        }
    }

    /// Every device touched by the proposal: boot device, target devices and
    /// the explicit devices of volumes that create new devices.
    ///
    /// Order is preserved and duplicates are dropped.
    pub fn installation_devices(&self) -> Vec<&str> {
        let volume_devices = self
            .volumes
            .iter()
            .filter(|volume| !volume.location.reuses_device())
            .filter_map(|volume| volume.location.device());

        let mut devices: Vec<&str> = Vec::new();
        for device in self
            .boot_device()
            .into_iter()
            .chain(self.target_devices())
            .chain(volume_devices)
        {
            if !devices.contains(&device) {
                devices.push(device);
            }
        }
        devices
    }

    pub fn volume(&self, mount_path: &str) -> Option<&Volume> {
        self.volumes
            .iter()
            .find(|volume| volume.mounted_at(mount_path))
    }

    pub fn volume_mut(&mut self, mount_path: &str) -> Option<&mut Volume> {
        self.volumes
            .iter_mut()
            .find(|volume| volume.mounted_at(mount_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolumeLocation;

    fn volume_at(path: &str, location: VolumeLocation) -> Volume {
        let mut volume = Volume::new(path);
        volume.location = location;
        volume
    }

    #[test]
    fn boot_device_prefers_explicit_setting() {
        let mut settings = ProposalSettings {
            device: DeviceSettings::new_lvm_vg(["/dev/sdb", "/dev/sdc"]),
            ..Default::default()
        };
        assert_eq!(settings.default_boot_device(), Some("/dev/sdb"));
        assert_eq!(settings.boot_device(), Some("/dev/sdb"));

        settings.boot.device = Some("/dev/sda".to_string());
        assert_eq!(settings.boot_device(), Some("/dev/sda"));
    }

    #[test]
    fn reused_vg_has_no_target_devices() {
        let settings = ProposalSettings {
            device: DeviceSettings::ReusedLvmVg {
                name: Some("system".to_string()),
            },
            ..Default::default()
        };
        assert!(settings.target_devices().is_empty());
        assert_eq!(settings.boot_device(), None);
    }

    #[test]
    fn installation_devices_are_ordered_and_unique() {
        let settings = ProposalSettings {
            device: DeviceSettings::new_lvm_vg(["/dev/sda", "/dev/sdb"]),
            boot: BootSettings {
                configure: true,
                device: Some("/dev/sdb".to_string()),
            },
            volumes: vec![
                volume_at("/", VolumeLocation::Default),
                volume_at("/home", VolumeLocation::NewPartition("/dev/sdc".to_string())),
                volume_at("/srv", VolumeLocation::NewVg("/dev/sda".to_string())),
                volume_at("/data", VolumeLocation::Filesystem("/dev/sdd1".to_string())),
                volume_at("/var", VolumeLocation::Device("/dev/sde1".to_string())),
            ],
            ..Default::default()
        };

        assert_eq!(
            settings.installation_devices(),
            vec!["/dev/sdb", "/dev/sda", "/dev/sdc"]
        );
    }

    #[test]
    fn volume_lookup_cleans_paths() {
        let settings = ProposalSettings {
            volumes: vec![Volume::new("/home"), Volume::new("swap")],
            ..Default::default()
        };
        assert!(settings.volume("/home/").is_some());
        assert!(settings.volume("swap").is_some());
        assert!(settings.volume("/srv").is_none());
    }
}
