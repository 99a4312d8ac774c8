// SPDX-License-Identifier: GPL-3.0-only

//! [`ProposalSettings`] to engine settings
//!
//! Besides flattening the volumes, this expands the space policy into
//! per-device actions, which needs the device graph the engine will work on.

use std::collections::BTreeMap;

use tracing::debug;

use proposal_contracts::{
    DeviceGraph, EngineSettings, EngineSpaceSettings, LvmSettings, SpaceStrategy, SwapReuse,
    VgStrategy, VolumeSpec,
};
use proposal_types::{
    DeviceSettings, ProposalSettings, SpaceAction, SpacePolicy, Volume, VolumeLocation, clean_path,
};

use crate::ProductConfig;

const VOLUME_WEIGHT: u32 = 100;

pub fn settings_to_engine(
    settings: &ProposalSettings,
    config: &ProductConfig,
    graph: &DeviceGraph,
) -> EngineSettings {
    let boot_device = settings.boot_device().map(String::from);

    let (candidate_devices, lvm) = match &settings.device {
        DeviceSettings::Disk { .. } => (boot_device.iter().cloned().collect(), LvmSettings::default()),
        DeviceSettings::NewLvmVg {
            candidate_pv_devices,
        } => (candidate_pv_devices.clone(), new_vg_lvm()),
        DeviceSettings::ReusedLvmVg { .. } => (Vec::new(), new_vg_lvm()),
    };

    let engine = EngineSettings {
        candidate_devices,
        root_device: boot_device,
        boot: settings.boot.configure,
        lvm,
        encryption_password: settings.encryption.password.clone(),
        encryption_method: settings.encryption.method,
        encryption_pbkdf: settings.encryption.pbkd_function,
        space: EngineSpaceSettings {
            strategy: SpaceStrategy::BiggerResize,
            actions: space_actions(settings, graph),
        },
        swap_reuse: SwapReuse::None,
        volumes: volume_specs(settings, config),
    };

    debug!(
        candidates = ?engine.candidate_devices,
        actions = engine.space.actions.len(),
        volumes = engine.volumes.len(),
        "engine settings"
    );
    engine
}

/// Space actions for the installation devices, according to the policy
pub fn space_actions(
    settings: &ProposalSettings,
    graph: &DeviceGraph,
) -> BTreeMap<String, SpaceAction> {
    let actions: BTreeMap<String, SpaceAction> = match settings.space.policy {
        SpacePolicy::Keep => BTreeMap::new(),
        SpacePolicy::Delete => uniform_actions(settings, graph, SpaceAction::ForceDelete),
        SpacePolicy::Resize => uniform_actions(settings, graph, SpaceAction::Resize),
        SpacePolicy::Custom => settings.space.actions.clone(),
    };

    actions
        .into_iter()
        .filter(|(device, action)| {
            *action != SpaceAction::Resize || graph.supports_shrinking(device)
        })
        .collect()
}

fn uniform_actions(
    settings: &ProposalSettings,
    graph: &DeviceGraph,
    action: SpaceAction,
) -> BTreeMap<String, SpaceAction> {
    settings
        .installation_devices()
        .into_iter()
        .flat_map(|device| affected_devices(device, graph))
        .map(|device| (device, action))
        .collect()
}

/// Partitions of a device, or the device itself when it has none.
///
/// A device missing from the graph yields nothing: the engine cannot act on
/// it, and the missing device is already reported as a proposal issue.
fn affected_devices(name: &str, graph: &DeviceGraph) -> Vec<String> {
    if graph.find_by_name(name).is_none() {
        return Vec::new();
    }

    let partitions = graph.partitions_of(name);
    if partitions.is_empty() {
        vec![name.to_string()]
    } else {
        partitions
            .into_iter()
            .map(|partition| partition.name.clone())
            .collect()
    }
}

fn new_vg_lvm() -> LvmSettings {
    LvmSettings {
        enabled: true,
        strategy: Some(VgStrategy::UseNeeded),
        separate_vgs: true,
        vg_reuse: false,
    }
}

fn volume_specs(settings: &ProposalSettings, config: &ProductConfig) -> Vec<VolumeSpec> {
    let proposed = settings.volumes.iter().map(volume_spec);
    let disabled = config
        .templates()
        .with_mount_path()
        .filter(|template| settings.volume(&template.mount_path).is_none())
        .map(|template| VolumeSpec {
            proposed: false,
            ..volume_spec(template)
        });

    let mut specs: Vec<VolumeSpec> = proposed.chain(disabled).collect();

    if let DeviceSettings::Disk { name: Some(disk) } = &settings.device {
        for spec in specs
            .iter_mut()
            .filter(|spec| spec.proposed && !spec.reuses_device() && spec.device.is_none())
        {
            spec.device = Some(disk.clone());
        }
    }

    for spec in &mut specs {
        let max_fallback = fallback_volume(settings, &spec.mount_point, |v| &v.max_size_fallback_for);
        spec.fallback_for_min_size =
            fallback_volume(settings, &spec.mount_point, |v| &v.min_size_fallback_for);
        spec.fallback_for_max_size_lvm = max_fallback.clone();
        spec.fallback_for_max_size = max_fallback;
    }

    specs
}

/// Engine view of a volume
pub fn volume_spec(volume: &Volume) -> VolumeSpec {
    let outline = &volume.outline;
    let (min_size, max_size) = if volume.auto_size {
        (outline.base_min_size, outline.base_max_size)
    } else {
        (volume.min_size, volume.max_size)
    };

    let mut spec = VolumeSpec {
        proposed_configurable: !outline.required,
        fs_type: volume.fs_type,
        fs_types: outline.filesystems.clone(),
        mount_options: volume.mount_options.join(","),
        weight: VOLUME_WEIGHT,
        adjust_by_ram: outline.adjust_by_ram,
        ignore_fallback_sizes: !volume.auto_size,
        ignore_snapshots_sizes: !volume.auto_size,
        ignore_adjust_by_ram: !volume.auto_size,
        min_size,
        max_size,
        max_size_lvm: max_size,
        snapshots: volume.btrfs.snapshots,
        snapshots_configurable: outline.snapshots_configurable,
        snapshots_size: outline.snapshots_size,
        snapshots_percentage: outline.snapshots_percentage,
        subvolumes: volume.btrfs.subvolumes.clone(),
        btrfs_default_subvolume: volume.btrfs.default_subvolume.clone(),
        btrfs_read_only: volume.btrfs.read_only,
        ..VolumeSpec::new(volume.mount_path.clone())
    };

    match &volume.location {
        VolumeLocation::Default => {}
        VolumeLocation::NewPartition(device) => spec.device = Some(device.clone()),
        VolumeLocation::NewVg(device) => {
            spec.device = Some(device.clone());
            spec.separate_vg_name = Some(separate_vg_name(&volume.mount_path));
        }
        VolumeLocation::Device(device) => {
            spec.reuse_name = Some(device.clone());
            spec.reformat = true;
        }
        VolumeLocation::Filesystem(device) => {
            spec.reuse_name = Some(device.clone());
            spec.reformat = false;
        }
    }

    spec
}

/// Name of the dedicated volume group of a mount path ("/var/lib" gives "vg-var_lib")
pub fn separate_vg_name(mount_path: &str) -> String {
    match mount_path.strip_prefix('/').unwrap_or(mount_path) {
        "" => "vg-root".to_string(),
        path => format!("vg-{}", path.replace('/', "_")),
    }
}

/// Mount path of the first volume whose fallback list contains the path
fn fallback_volume<F>(settings: &ProposalSettings, mount_path: &str, list: F) -> Option<String>
where
    F: Fn(&Volume) -> &Vec<String>,
{
    let path = clean_path(mount_path);
    settings
        .volumes
        .iter()
        .find(|volume| list(volume).iter().any(|entry| clean_path(entry) == path))
        .map(|volume| volume.mount_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposal_contracts::{DeviceKind, GraphDevice};
    use proposal_types::{DiskSize, FilesystemType};

    const PRODUCT: &str = r#"
        [storage]
        volumes = ["/", "swap"]

        [[storage.volume_templates]]
        mount_path = "/"
        filesystem = "btrfs"
        mount_options = ["compress=zstd", "noatime"]
        size = { auto = true }
        btrfs = { snapshots = true, default_subvolume = "@" }
        outline = { required = true, filesystems = ["btrfs", "ext4"], auto_size = { base_min = "5 GiB", base_max = "20 GiB", min_fallback_for = ["/home"], max_fallback_for = ["/home"] } }

        [[storage.volume_templates]]
        mount_path = "/home"
        filesystem = "xfs"
        size = { min = "10 GiB" }
        outline = { filesystems = ["xfs"] }

        [[storage.volume_templates]]
        mount_path = "swap"
        filesystem = "swap"
        size = { min = "1 GiB", max = "2 GiB" }
        outline = { filesystems = ["swap"] }
    "#;

    fn config() -> ProductConfig {
        ProductConfig::from_toml_str(PRODUCT).expect("parse product")
    }

    fn graph() -> DeviceGraph {
        DeviceGraph::new(vec![
            GraphDevice::new("/dev/sda", DeviceKind::Disk, DiskSize::gib(100)),
            GraphDevice::new("/dev/sda1", DeviceKind::Partition, DiskSize::gib(50))
                .with_parent("/dev/sda")
                .shrinkable(true),
            GraphDevice::new("/dev/sda2", DeviceKind::Partition, DiskSize::gib(50))
                .with_parent("/dev/sda"),
            GraphDevice::new("/dev/sdb", DeviceKind::Disk, DiskSize::gib(200)),
        ])
    }

    fn settings(device: DeviceSettings, policy: SpacePolicy) -> ProposalSettings {
        let mut settings = crate::reader::read(&config());
        settings.device = device;
        settings.space.policy = policy;
        settings
    }

    #[test]
    fn delete_policy_expands_to_partitions_or_whole_disks() {
        let settings = settings(
            DeviceSettings::new_lvm_vg(["/dev/sda", "/dev/sdb"]),
            SpacePolicy::Delete,
        );
        let actions = space_actions(&settings, &graph());

        assert_eq!(
            actions,
            BTreeMap::from([
                ("/dev/sda1".to_string(), SpaceAction::ForceDelete),
                ("/dev/sda2".to_string(), SpaceAction::ForceDelete),
                ("/dev/sdb".to_string(), SpaceAction::ForceDelete),
            ])
        );
    }

    #[test]
    fn resize_policy_skips_non_shrinkable_devices() {
        let settings = settings(DeviceSettings::disk("/dev/sda"), SpacePolicy::Resize);
        let actions = space_actions(&settings, &graph());
        assert_eq!(
            actions,
            BTreeMap::from([("/dev/sda1".to_string(), SpaceAction::Resize)])
        );
    }

    #[test]
    fn custom_policy_drops_unsupported_resizes() {
        let mut settings = settings(DeviceSettings::disk("/dev/sda"), SpacePolicy::Custom);
        settings.space.actions = BTreeMap::from([
            ("/dev/sda1".to_string(), SpaceAction::ForceDelete),
            ("/dev/sda2".to_string(), SpaceAction::Resize),
        ]);

        assert_eq!(
            space_actions(&settings, &graph()),
            BTreeMap::from([("/dev/sda1".to_string(), SpaceAction::ForceDelete)])
        );
    }

    #[test]
    fn keep_policy_and_unknown_devices_yield_nothing() {
        let settings_keep = settings(DeviceSettings::disk("/dev/sda"), SpacePolicy::Keep);
        assert!(space_actions(&settings_keep, &graph()).is_empty());

        let settings_missing = settings(DeviceSettings::disk("/dev/nvme0n1"), SpacePolicy::Delete);
        assert!(space_actions(&settings_missing, &graph()).is_empty());
    }

    #[test]
    fn disk_target_assigns_device_to_proposed_volumes() {
        let mut settings = settings(DeviceSettings::disk("/dev/sda"), SpacePolicy::Keep);
        settings.volumes[1].location = VolumeLocation::Filesystem("/dev/sdb1".to_string());

        let engine = settings_to_engine(&settings, &config(), &graph());
        assert!(!engine.lvm.enabled);
        assert_eq!(engine.candidate_devices, vec!["/dev/sda"]);
        assert_eq!(engine.root_device.as_deref(), Some("/dev/sda"));
        assert_eq!(engine.swap_reuse, SwapReuse::None);
        assert_eq!(engine.space.strategy, SpaceStrategy::BiggerResize);

        let root = engine.volume("/").expect("root spec");
        assert_eq!(root.device.as_deref(), Some("/dev/sda"));

        let swap = engine.volume("swap").expect("swap spec");
        assert_eq!(swap.device, None);
        assert_eq!(swap.reuse_name.as_deref(), Some("/dev/sdb1"));
        assert!(!swap.reformat);

        let home = engine.volume("/home").expect("home spec");
        assert!(!home.proposed);
        assert_eq!(home.device, None);
    }

    #[test]
    fn new_vg_target_enables_lvm() {
        let settings = settings(
            DeviceSettings::new_lvm_vg(["/dev/sdb", "/dev/sda"]),
            SpacePolicy::Keep,
        );
        let engine = settings_to_engine(&settings, &config(), &graph());

        assert_eq!(
            engine.lvm,
            LvmSettings {
                enabled: true,
                strategy: Some(VgStrategy::UseNeeded),
                separate_vgs: true,
                vg_reuse: false,
            }
        );
        assert_eq!(engine.candidate_devices, vec!["/dev/sdb", "/dev/sda"]);
        assert_eq!(engine.root_device.as_deref(), Some("/dev/sdb"));
        assert_eq!(engine.volume("/").and_then(|v| v.device.clone()), None);
    }

    #[test]
    fn reused_vg_has_no_candidates() {
        let settings = settings(
            DeviceSettings::ReusedLvmVg {
                name: Some("system".to_string()),
            },
            SpacePolicy::Keep,
        );
        let engine = settings_to_engine(&settings, &config(), &graph());
        assert!(engine.lvm.enabled);
        assert!(engine.candidate_devices.is_empty());
        assert_eq!(engine.root_device, None);
    }

    #[test]
    fn volume_spec_follows_auto_size() {
        let config = config();
        let mut root = config.templates().for_path("/");
        let spec = volume_spec(&root);

        assert_eq!(spec.mount_options, "compress=zstd,noatime");
        assert!(!spec.proposed_configurable);
        assert_eq!(spec.fs_type, Some(FilesystemType::Btrfs));
        assert_eq!(spec.weight, 100);
        assert!(!spec.ignore_fallback_sizes);
        assert!(!spec.ignore_snapshots_sizes);
        assert!(!spec.ignore_adjust_by_ram);
        assert_eq!(spec.min_size, DiskSize::gib(5));
        assert_eq!(spec.max_size_lvm, DiskSize::gib(20));
        assert_eq!(spec.btrfs_default_subvolume, "@");

        root.use_fixed_size(DiskSize::gib(30), DiskSize::gib(40));
        let spec = volume_spec(&root);
        assert!(spec.ignore_fallback_sizes);
        assert!(spec.ignore_snapshots_sizes);
        assert!(spec.ignore_adjust_by_ram);
        assert_eq!(spec.min_size, DiskSize::gib(30));
        assert_eq!(spec.max_size, DiskSize::gib(40));
        assert_eq!(spec.max_size_lvm, DiskSize::gib(40));
    }

    #[test]
    fn fallbacks_point_to_the_declaring_volume() {
        let settings = settings(DeviceSettings::disk("/dev/sda"), SpacePolicy::Keep);
        let engine = settings_to_engine(&settings, &config(), &graph());

        let home = engine.volume("/home").expect("home spec");
        assert_eq!(home.fallback_for_min_size.as_deref(), Some("/"));
        assert_eq!(home.fallback_for_max_size.as_deref(), Some("/"));
        assert_eq!(home.fallback_for_max_size_lvm.as_deref(), Some("/"));
        assert_eq!(engine.volume("swap").and_then(|v| v.fallback_for_min_size.clone()), None);
    }

    #[test]
    fn new_vg_location_names_the_group() {
        let mut volume = Volume::new("/var/lib");
        volume.location = VolumeLocation::NewVg("/dev/sdb".to_string());
        let spec = volume_spec(&volume);
        assert_eq!(spec.device.as_deref(), Some("/dev/sdb"));
        assert_eq!(spec.separate_vg_name.as_deref(), Some("vg-var_lib"));

        volume.location = VolumeLocation::Device("/dev/sdc1".to_string());
        let spec = volume_spec(&volume);
        assert_eq!(spec.reuse_name.as_deref(), Some("/dev/sdc1"));
        assert!(spec.reformat);

        assert_eq!(separate_vg_name("/"), "vg-root");
    }
}
