// SPDX-License-Identifier: GPL-3.0-only

//! Wire settings to [`ProposalSettings`]
//!
//! The wire document is a sparse overlay on the product defaults: absent
//! sections keep the default value, and required volumes are always kept.

use tracing::{debug, warn};

use proposal_types::{
    BootSettings, DeviceSettings, DiskSize, EncryptionMethod, EncryptionSettings,
    FilesystemType, PbkdFunction, ProposalSettings, SpaceAction, SpacePolicy, SpaceSettings,
    Volume, VolumeLocation,
};

use crate::ProductConfig;
use crate::reader;
use crate::wire::{
    WireBoot, WireDevice, WireEncryption, WireFilesystem, WireLocation, WireSettings, WireSize,
    WireSpace, WireSpaceAction, WireTarget, WireVolume, WireVolumeTarget,
};

pub fn settings_from_wire(wire: &WireSettings, config: &ProductConfig) -> ProposalSettings {
    let mut settings = reader::read(config);

    if let Some(device) = wire.target.as_ref().and_then(device_from_wire) {
        debug!(?device, "target from wire");
        settings.device = device;
    }
    if let Some(boot) = &wire.boot {
        apply_boot(&mut settings.boot, boot);
    }
    if let Some(encryption) = &wire.encryption {
        apply_encryption(&mut settings.encryption, encryption);
    }
    if let Some(space) = &wire.space {
        apply_space(&mut settings.space, space);
    }

    if let Some(wire_volumes) = wire.volumes.as_deref().filter(|volumes| !volumes.is_empty()) {
        let volumes = volumes_from_wire(wire_volumes, config);
        let missing_required: Vec<Volume> = settings
            .volumes
            .into_iter()
            .filter(|default| default.outline.required)
            .filter(|default| !volumes.iter().any(|volume| volume.mounted_at(&default.mount_path)))
            .collect();

        settings.volumes = missing_required.into_iter().chain(volumes).collect();
    }

    settings
}

/// Resolve one wire volume against the product templates.
///
/// Returns `None` when the volume has no mount path.
pub fn volume_from_wire(wire: &WireVolume, config: &ProductConfig) -> Option<Volume> {
    let Some(mount_path) = wire.mount_path() else {
        warn!(?wire, "ignoring volume without mount path");
        return None;
    };

    let mut volume = config.templates().for_path(mount_path);

    if let Some(options) = wire.mount.as_ref().and_then(|mount| mount.options.as_ref()) {
        volume.mount_options = options.clone();
    }
    if let Some(filesystem) = &wire.filesystem {
        apply_filesystem(&mut volume, filesystem);
    }
    if let Some(size) = &wire.size {
        apply_size(&mut volume, size);
    }
    if let Some(target) = &wire.target {
        apply_location(&mut volume, target);
    }

    debug!(%volume, "volume from wire");
    Some(volume)
}

fn volumes_from_wire(wire_volumes: &[WireVolume], config: &ProductConfig) -> Vec<Volume> {
    let mut volumes: Vec<Volume> = Vec::new();
    for volume in wire_volumes
        .iter()
        .filter_map(|wire| volume_from_wire(wire, config))
    {
        if volumes.iter().any(|known| known.mounted_at(&volume.mount_path)) {
            warn!(mount_path = %volume.mount_path, "ignoring duplicated volume");
            continue;
        }
        volumes.push(volume);
    }
    volumes
}

fn device_from_wire(target: &WireTarget) -> Option<DeviceSettings> {
    match target {
        WireTarget::Keyword(keyword) => match keyword.as_str() {
            "disk" => Some(DeviceSettings::Disk { name: None }),
            "newLvmVg" => Some(DeviceSettings::NewLvmVg {
                candidate_pv_devices: Vec::new(),
            }),
            "reusedLvmVg" => Some(DeviceSettings::ReusedLvmVg { name: None }),
            other => {
                warn!(target = %other, "ignoring unknown target");
                None
            }
        },
        WireTarget::Device(WireDevice::Disk(name)) => Some(DeviceSettings::disk(name.clone())),
        WireTarget::Device(WireDevice::NewLvmVg(devices)) => {
            Some(DeviceSettings::new_lvm_vg(devices.iter().cloned()))
        }
        WireTarget::Device(WireDevice::ReusedLvmVg(name)) => Some(DeviceSettings::ReusedLvmVg {
            name: Some(name.clone()),
        }),
    }
}

fn apply_boot(boot: &mut BootSettings, wire: &WireBoot) {
    if let Some(configure) = wire.configure {
        boot.configure = configure;
    }
    if let Some(device) = &wire.device {
        boot.device = non_empty(device);
    }
}

fn apply_encryption(encryption: &mut EncryptionSettings, wire: &WireEncryption) {
    if let Some(password) = &wire.password {
        encryption.password = non_empty(password);
    }
    if let Some(id) = &wire.method {
        match EncryptionMethod::find(id) {
            Some(method) => encryption.method = Some(method),
            None => warn!(method = %id, "ignoring unknown encryption method"),
        }
    }
    if let Some(value) = &wire.pbkd_function {
        match PbkdFunction::find(value) {
            Some(function) => encryption.pbkd_function = Some(function),
            None => warn!(pbkd_function = %value, "ignoring unknown PBKD function"),
        }
    }
}

fn apply_space(space: &mut SpaceSettings, wire: &WireSpace) {
    if let Some(name) = &wire.policy {
        match SpacePolicy::parse(name) {
            Some(policy) => space.policy = policy,
            None => warn!(policy = %name, "ignoring unknown space policy"),
        }
    }
    let Some(actions) = &wire.actions else {
        return;
    };
    if space.policy != SpacePolicy::Custom {
        debug!(policy = space.policy.as_str(), "ignoring space actions outside the custom policy");
        return;
    }
    space.actions = actions
        .iter()
        .map(|action| match action {
            WireSpaceAction::ForceDelete(device) => (device.clone(), SpaceAction::ForceDelete),
            WireSpaceAction::Delete(device) => (device.clone(), SpaceAction::Delete),
            WireSpaceAction::Resize(device) => (device.clone(), SpaceAction::Resize),
        })
        .collect();
}

fn apply_filesystem(volume: &mut Volume, wire: &WireFilesystem) {
    let (fs_type, snapshots) = match wire {
        WireFilesystem::Name(name) => match FilesystemType::parse(name) {
            Some(fs_type) => (fs_type, None),
            None => {
                warn!(mount_path = %volume.mount_path, filesystem = %name, "ignoring unknown filesystem");
                return;
            }
        },
        WireFilesystem::Btrfs { btrfs } => (FilesystemType::Btrfs, btrfs.snapshots),
    };

    if !volume.outline.allows_filesystem(fs_type) {
        warn!(mount_path = %volume.mount_path, filesystem = %fs_type, "filesystem not allowed for volume");
        return;
    }
    volume.fs_type = Some(fs_type);

    if let Some(snapshots) = snapshots {
        if volume.outline.snapshots_configurable {
            volume.btrfs.snapshots = snapshots;
        } else {
            warn!(mount_path = %volume.mount_path, "snapshots are not configurable for volume");
        }
    }
}

fn apply_size(volume: &mut Volume, wire: &WireSize) {
    match wire {
        WireSize::Keyword(keyword) if keyword == "auto" => {
            if !volume.use_auto_size() {
                warn!(mount_path = %volume.mount_path, "auto size not supported for volume");
            }
        }
        WireSize::Keyword(keyword) => {
            warn!(mount_path = %volume.mount_path, size = %keyword, "ignoring unknown size");
        }
        WireSize::Range { min: Some(min), max } => {
            volume.use_fixed_size(*min, max.unwrap_or(DiskSize::Unlimited));
        }
        WireSize::Range { min: None, .. } => {
            warn!(mount_path = %volume.mount_path, "ignoring size without min");
        }
    }
}

fn apply_location(volume: &mut Volume, wire: &WireVolumeTarget) {
    volume.location = match wire {
        WireVolumeTarget::Keyword(keyword) if keyword == "default" => VolumeLocation::Default,
        WireVolumeTarget::Keyword(keyword) => {
            warn!(mount_path = %volume.mount_path, target = %keyword, "ignoring unknown volume target");
            return;
        }
        WireVolumeTarget::Location(location) => match location {
            WireLocation::NewPartition(device) => VolumeLocation::NewPartition(device.clone()),
            WireLocation::NewVg(device) => VolumeLocation::NewVg(device.clone()),
            WireLocation::Device(device) => VolumeLocation::Device(device.clone()),
            WireLocation::Filesystem(device) => VolumeLocation::Filesystem(device.clone()),
        },
    };
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
