// SPDX-License-Identifier: GPL-3.0-only

use proposal_types::{
    DeviceSettings, FilesystemType, ProposalSettings, SpaceAction, SpacePolicy, Volume,
    VolumeLocation,
};

use crate::wire::{
    WireBoot, WireBtrfs, WireDevice, WireEncryption, WireFilesystem, WireLocation, WireMount,
    WireSettings, WireSize, WireSpace, WireSpaceAction, WireTarget, WireVolume, WireVolumeTarget,
};

pub fn settings_to_wire(settings: &ProposalSettings) -> WireSettings {
    WireSettings {
        target: Some(device_to_wire(&settings.device)),
        boot: Some(WireBoot {
            configure: Some(settings.boot.configure),
            device: settings.boot.device.clone(),
        }),
        encryption: Some(WireEncryption {
            password: settings.encryption.password.clone(),
            method: settings.encryption.method.map(|method| method.id().to_string()),
            pbkd_function: settings
                .encryption
                .pbkd_function
                .map(|function| function.value().to_string()),
        }),
        space: Some(WireSpace {
            policy: Some(settings.space.policy.as_str().to_string()),
            actions: (settings.space.policy == SpacePolicy::Custom).then(|| {
                settings
                    .space
                    .actions
                    .iter()
                    .map(|(device, action)| action_to_wire(device, *action))
                    .collect()
            }),
        }),
        volumes: Some(settings.volumes.iter().map(volume_to_wire).collect()),
    }
}

pub fn volume_to_wire(volume: &Volume) -> WireVolume {
    WireVolume {
        mount: Some(WireMount {
            path: Some(volume.mount_path.clone()),
            options: Some(volume.mount_options.clone()),
        }),
        filesystem: volume.fs_type.map(|fs_type| filesystem_to_wire(fs_type, volume)),
        size: Some(size_to_wire(volume)),
        target: Some(location_to_wire(&volume.location)),
    }
}

fn device_to_wire(device: &DeviceSettings) -> WireTarget {
    match device {
        DeviceSettings::Disk { name: None } => WireTarget::Keyword("disk".to_string()),
        DeviceSettings::Disk { name: Some(name) } => WireTarget::Device(WireDevice::Disk(name.clone())),
        DeviceSettings::NewLvmVg {
            candidate_pv_devices,
        } if candidate_pv_devices.is_empty() => WireTarget::Keyword("newLvmVg".to_string()),
        DeviceSettings::NewLvmVg {
            candidate_pv_devices,
        } => WireTarget::Device(WireDevice::NewLvmVg(candidate_pv_devices.clone())),
        DeviceSettings::ReusedLvmVg { name: None } => {
            WireTarget::Keyword("reusedLvmVg".to_string())
        }
        DeviceSettings::ReusedLvmVg { name: Some(name) } => {
            WireTarget::Device(WireDevice::ReusedLvmVg(name.clone()))
        }
    }
}

fn action_to_wire(device: &str, action: SpaceAction) -> WireSpaceAction {
    let device = device.to_string();
    match action {
        SpaceAction::ForceDelete => WireSpaceAction::ForceDelete(device),
        SpaceAction::Delete => WireSpaceAction::Delete(device),
        SpaceAction::Resize => WireSpaceAction::Resize(device),
    }
}

fn filesystem_to_wire(fs_type: FilesystemType, volume: &Volume) -> WireFilesystem {
    if fs_type.is_btrfs() {
        WireFilesystem::Btrfs {
            btrfs: WireBtrfs {
                snapshots: Some(volume.btrfs.snapshots),
            },
        }
    } else {
        WireFilesystem::Name(fs_type.as_str().to_string())
    }
}

fn size_to_wire(volume: &Volume) -> WireSize {
    if volume.auto_size {
        return WireSize::auto();
    }

    WireSize::Range {
        min: Some(volume.min_size),
        max: (!volume.max_size.is_unlimited()).then_some(volume.max_size),
    }
}

fn location_to_wire(location: &VolumeLocation) -> WireVolumeTarget {
    let location = match location {
        VolumeLocation::Default => return WireVolumeTarget::default_target(),
        VolumeLocation::NewPartition(device) => WireLocation::NewPartition(device.clone()),
        VolumeLocation::NewVg(device) => WireLocation::NewVg(device.clone()),
        VolumeLocation::Device(device) => WireLocation::Device(device.clone()),
        VolumeLocation::Filesystem(device) => WireLocation::Filesystem(device.clone()),
    };
    WireVolumeTarget::Location(location)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ProductConfig;
    use crate::conversions::settings_from_wire;
    use crate::wire::settings_from_value;
    use proposal_types::{DiskSize, EncryptionMethod};

    const PRODUCT: &str = r#"
        [storage]
        volumes = ["/", "swap"]

        [[storage.volume_templates]]
        mount_path = "/"
        filesystem = "btrfs"
        size = { auto = true }
        btrfs = { snapshots = true }
        outline = { required = true, filesystems = ["btrfs", "xfs"], snapshots_configurable = true, auto_size = { base_min = "5 GiB", base_max = "20 GiB", snapshots_increment = "250%" } }

        [[storage.volume_templates]]
        mount_path = "swap"
        filesystem = "swap"
        size = { min = "1 GiB", max = "2 GiB" }
        outline = { filesystems = ["swap"] }
    "#;

    fn config() -> ProductConfig {
        ProductConfig::from_toml_str(PRODUCT).expect("parse product")
    }

    #[test]
    fn serializes_settings_shorthands() {
        let mut settings = crate::reader::read(&config());
        settings.device = DeviceSettings::new_lvm_vg(["/dev/sda"]);
        settings.encryption.method = Some(EncryptionMethod::Luks2);
        settings.volumes[1].location = VolumeLocation::NewPartition("/dev/sdb".to_string());

        let json = serde_json::to_value(settings_to_wire(&settings)).expect("serialize settings");
        assert_eq!(
            json,
            json!({
                "target": {"newLvmVg": ["/dev/sda"]},
                "boot": {"configure": true},
                "encryption": {"method": "luks2"},
                "space": {"policy": "keep"},
                "volumes": [
                    {
                        "mount": {"path": "/", "options": []},
                        "filesystem": {"btrfs": {"snapshots": true}},
                        "size": "auto",
                        "target": "default"
                    },
                    {
                        "mount": {"path": "swap", "options": []},
                        "filesystem": "swap",
                        "size": {"min": 1073741824, "max": 2147483648u64},
                        "target": {"newPartition": "/dev/sdb"}
                    }
                ]
            })
        );
    }

    #[test]
    fn space_actions_only_for_custom_policy() {
        let mut settings = ProposalSettings::default();
        settings
            .space
            .actions
            .insert("/dev/sda1".to_string(), SpaceAction::ForceDelete);

        settings.space.policy = SpacePolicy::Delete;
        let wire = settings_to_wire(&settings);
        assert_eq!(wire.space.and_then(|space| space.actions), None);

        settings.space.policy = SpacePolicy::Custom;
        let wire = settings_to_wire(&settings);
        assert_eq!(
            wire.space.and_then(|space| space.actions),
            Some(vec![WireSpaceAction::ForceDelete("/dev/sda1".to_string())])
        );
    }

    #[test]
    fn unlimited_max_is_omitted() {
        let mut volume = Volume::new("/home");
        volume.use_fixed_size(DiskSize::gib(10), DiskSize::Unlimited);
        assert_eq!(
            volume_to_wire(&volume).size,
            Some(WireSize::Range {
                min: Some(DiskSize::gib(10)),
                max: None
            })
        );
    }

    #[test]
    fn wire_roundtrip_preserves_settings() {
        let config = config();
        let wire = settings_from_value(json!({
            "target": {"disk": "/dev/vda"},
            "boot": {"configure": false},
            "encryption": {"password": "notsecret", "method": "luks1", "pbkdFunction": "pbkdf2"},
            "space": {"policy": "custom", "actions": [{"delete": "/dev/vda3"}]},
            "volumes": [
                {"mount": {"path": "/", "options": ["compress=zstd"]}, "filesystem": "xfs", "size": {"min": "8 GiB"}},
                {"mount": {"path": "/srv"}, "filesystem": "ext4", "target": {"device": "/dev/vdb1"}}
            ]
        }))
        .expect("decode wire settings");

        let settings = settings_from_wire(&wire, &config);
        let encoded = serde_json::to_string(&settings_to_wire(&settings)).expect("encode");
        let decoded = crate::wire::settings_from_json_str(&encoded).expect("decode");
        let again = settings_from_wire(&decoded, &config);

        assert_eq!(again, settings);
    }
}
