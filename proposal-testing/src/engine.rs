//! Partitioning engine simulated over a [`DeviceGraph`]
//!
//! Good enough to drive the guided strategy end to end: it validates the
//! device names it is given, makes room following the space actions, sizes
//! every proposed volume the way a real engine does (fallbacks, snapshots,
//! RAM) and allocates them greedily. With LVM enabled every volume becomes a
//! logical volume of a single group; without candidate devices the existing
//! volume groups are reused.

use std::collections::BTreeMap;

use tracing::debug;

use proposal_contracts::{
    DeviceGraph, DeviceKind, EngineError, EngineResult, EngineSettings, GraphDevice,
    PartitioningEngine, PlannedDevice, VgStrategy, VolumeSpec,
};
use proposal_types::{
    DiskSize, EncryptionMethod, FilesystemType, Issue, IssueSeverity, IssueSource, SpaceAction,
    clean_path,
};

pub const BOOT_PARTITION_SIZE: DiskSize = DiskSize::mib(512);
const DEFAULT_RAM_SIZE: DiskSize = DiskSize::gib(4);
const SYSTEM_VG: &str = "/dev/system";

pub struct SimulatedEngine {
    graph: DeviceGraph,
    unavailable: Vec<String>,
    ram_size: DiskSize,
    probe_error: Option<EngineError>,
}

impl SimulatedEngine {
    pub fn new(graph: DeviceGraph) -> Self {
        Self {
            graph,
            unavailable: Vec::new(),
            ram_size: DEFAULT_RAM_SIZE,
            probe_error: None,
        }
    }

    /// Disks present in the graph but never offered for installation
    pub fn with_unavailable(mut self, devices: impl IntoIterator<Item = String>) -> Self {
        self.unavailable.extend(devices);
        self
    }

    pub fn with_ram_size(mut self, ram_size: DiskSize) -> Self {
        self.ram_size = ram_size;
        self
    }

    /// Make every probe fail with `error`
    pub fn with_probe_error(mut self, error: EngineError) -> Self {
        self.probe_error = Some(error);
        self
    }

    /// Sizes of a proposed volume, including what the engine adds on top
    /// of the requested ones
    pub fn volume_sizes(&self, spec: &VolumeSpec, settings: &EngineSettings) -> (DiskSize, DiskSize) {
        let lvm = settings.lvm.enabled;
        let mut min = spec.min_size;
        let mut max = if lvm { spec.max_size_lvm } else { spec.max_size };

        if !spec.ignore_fallback_sizes {
            let mount_point = clean_path(&spec.mount_point);
            let points_here =
                |target: &Option<String>| target.as_deref().map(clean_path) == Some(mount_point.clone());

            for other in settings.volumes.iter().filter(|other| !other.proposed) {
                if points_here(&other.fallback_for_min_size) {
                    min = min + other.min_size;
                }
                let (target, size) = if lvm {
                    (&other.fallback_for_max_size_lvm, other.max_size_lvm)
                } else {
                    (&other.fallback_for_max_size, other.max_size)
                };
                if points_here(target) {
                    max = max + size;
                }
            }
        }

        if spec.snapshots && !spec.ignore_snapshots_sizes {
            if let Some(percentage) = spec.snapshots_percentage {
                min = min + percent(min, percentage);
                max = max + percent(max, percentage);
            } else if let Some(size) = spec.snapshots_size {
                min = min + size;
                max = max + size;
            }
        }

        if spec.adjust_by_ram && !spec.ignore_adjust_by_ram {
            min = min.max(self.ram_size);
            max = max.max(self.ram_size);
        }

        (min, max.max(min))
    }
}

impl PartitioningEngine for SimulatedEngine {
    fn probe(&self) -> Result<DeviceGraph, EngineError> {
        match &self.probe_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.graph.clone()),
        }
    }

    fn available_devices(&self, graph: &DeviceGraph) -> Vec<String> {
        graph
            .disks()
            .filter(|disk| !self.unavailable.contains(&disk.name))
            .map(|disk| disk.name.clone())
            .collect()
    }

    fn propose(
        &self,
        settings: &EngineSettings,
        graph: &DeviceGraph,
    ) -> Result<EngineResult, EngineError> {
        check_devices(settings, graph)?;

        let targets = target_devices(settings, graph);
        if targets.is_empty() {
            return Ok(unfeasible(
                settings,
                graph,
                "No device to allocate the volumes on",
                None,
            ));
        }

        let requirements: Vec<Requirement> = settings
            .proposed_volumes()
            .filter(|spec| !spec.reuses_device())
            .map(|spec| {
                let (min, max) = self.volume_sizes(spec, settings);
                Requirement {
                    mount_point: spec.mount_point.clone(),
                    fs_type: spec.fs_type.or_else(|| spec.fs_types.first().copied()),
                    device: spec.device.clone(),
                    min,
                    max,
                }
            })
            .collect();

        let boot_device = boot_device(settings, graph);
        let required = requirements
            .iter()
            .fold(DiskSize::zero(), |total, requirement| total + requirement.min)
            + if boot_device.is_some() {
                BOOT_PARTITION_SIZE
            } else {
                DiskSize::zero()
            };

        let mut plan = Plan::new(graph);
        plan.make_space(settings, &targets, required);

        let available = DiskSize::b(plan.total_free(&targets));
        if available < required {
            debug!(%required, %available, "not enough space");
            return Ok(unfeasible(
                settings,
                graph,
                "Not enough space to allocate the requested volumes",
                Some(format!("{required} needed, {available} available")),
            ));
        }

        if let Some(device) = &boot_device {
            plan.create_partition(device, bytes(BOOT_PARTITION_SIZE), "for booting".to_string());
        }

        let targets = if settings.lvm.enabled && !is_volume_group(graph, &targets) {
            let needed = requirements
                .iter()
                .fold(DiskSize::zero(), |total, requirement| total + requirement.min);
            vec![plan.create_volume_group(&targets, needed, settings.lvm.strategy)]
        } else {
            targets
        };

        let Some(allocations) = plan.allocate(&requirements, &targets) else {
            return Ok(unfeasible(
                settings,
                graph,
                "Not enough space to allocate the requested volumes",
                Some("the volumes do not fit on their devices".to_string()),
            ));
        };

        let mut planned_devices = Vec::new();
        for (requirement, allocation) in requirements.iter().zip(allocations) {
            let name = plan.create_volume(requirement, &allocation);
            if settings.encryption_password.is_some() {
                let method = settings.encryption_method.unwrap_or(EncryptionMethod::Luks2);
                plan.actions.push(format!("Encrypt {name} with {}", method.id()));
            }
            planned_devices.push(PlannedDevice {
                mount_point: requirement.mount_point.clone(),
                name: Some(name),
                fs_type: requirement.fs_type,
                min_size: requirement.min,
                max_size: requirement.max,
            });
        }

        for spec in settings.proposed_volumes().filter(|spec| spec.reuses_device()) {
            planned_devices.push(plan.reuse(spec));
        }

        let mut settings = settings.clone();
        settings.space.actions = plan.applied;

        Ok(EngineResult {
            settings,
            planned_devices,
            graph: plan.graph,
            actions: plan.actions,
            failed: false,
            issues: Vec::new(),
        })
    }
}

struct Requirement {
    mount_point: String,
    fs_type: Option<FilesystemType>,
    device: Option<String>,
    min: DiskSize,
    max: DiskSize,
}

/// Where a volume goes and how big it ends up
struct Allocation {
    device: String,
    size: u64,
}

/// Device graph being modified while proposing
struct Plan {
    graph: DeviceGraph,
    actions: Vec<String>,
    applied: BTreeMap<String, SpaceAction>,
}

impl Plan {
    fn new(graph: &DeviceGraph) -> Self {
        Self {
            graph: graph.clone(),
            actions: Vec::new(),
            applied: BTreeMap::new(),
        }
    }

    fn free(&self, name: &str) -> u64 {
        let Some(device) = self.graph.find_by_name(name) else {
            return 0;
        };
        let used: u64 = self
            .graph
            .devices
            .iter()
            .filter(|child| child.parent.as_deref() == Some(name))
            .map(|child| bytes(child.size))
            .sum();
        bytes(device.size).saturating_sub(used)
    }

    fn total_free(&self, targets: &[String]) -> u64 {
        targets.iter().map(|target| self.free(target)).sum()
    }

    /// Apply forced deletions, then deletions and resizes while short of space
    fn make_space(&mut self, settings: &EngineSettings, targets: &[String], required: DiskSize) {
        let actions = &settings.space.actions;
        let short = |plan: &Plan| DiskSize::b(plan.total_free(targets)) < required;

        for (device, _) in actions
            .iter()
            .filter(|(_, action)| **action == SpaceAction::ForceDelete)
        {
            self.delete(device, SpaceAction::ForceDelete);
        }

        for (device, _) in actions
            .iter()
            .filter(|(_, action)| **action == SpaceAction::Delete)
        {
            if !short(self) {
                break;
            }
            self.delete(device, SpaceAction::Delete);
        }

        for (device, _) in actions
            .iter()
            .filter(|(_, action)| **action == SpaceAction::Resize)
        {
            let missing = bytes(required).saturating_sub(self.total_free(targets));
            if missing == 0 {
                break;
            }
            self.shrink(device, missing);
        }
    }

    fn delete(&mut self, name: &str, action: SpaceAction) {
        let Some(device) = self.graph.find_by_name(name).cloned() else {
            debug!(device = name, "skipping action on unknown device");
            return;
        };

        let children: Vec<String> = self
            .graph
            .devices
            .iter()
            .filter(|child| child.parent.as_deref() == Some(name))
            .map(|child| child.name.clone())
            .collect();

        for child in &children {
            self.graph.remove(child);
        }
        if device.kind == DeviceKind::Disk {
            self.actions.push(format!("Delete content of {name}"));
        } else {
            self.graph.remove(name);
            self.actions.push(format!("Delete {name}"));
        }
        self.applied.insert(name.to_string(), action);
    }

    fn shrink(&mut self, name: &str, missing: u64) {
        let Some(device) = self
            .graph
            .devices
            .iter_mut()
            .find(|device| device.name == name && device.shrinkable)
        else {
            return;
        };

        let size = bytes(device.size);
        let reclaimed = (size / 2).min(missing);
        device.size = DiskSize::b(size - reclaimed);
        self.actions.push(format!(
            "Shrink {name} from {} to {}",
            DiskSize::b(size),
            device.size
        ));
        self.applied.insert(name.to_string(), SpaceAction::Resize);
    }

    fn create_partition(&mut self, disk: &str, size: u64, purpose: String) -> String {
        let name = next_partition_name(&self.graph, disk);
        self.graph.push(
            GraphDevice::new(name.clone(), DeviceKind::Partition, DiskSize::b(size)).with_parent(disk),
        );
        self.actions.push(format!(
            "Create partition {name} ({}) {purpose}",
            DiskSize::b(size)
        ));
        name
    }

    /// Physical volumes on the target disks and a group spanning them
    fn create_volume_group(
        &mut self,
        disks: &[String],
        needed: DiskSize,
        strategy: Option<VgStrategy>,
    ) -> String {
        let mut missing = bytes(needed);
        let mut vg_size = 0;

        for disk in disks {
            let free = self.free(disk);
            let size = match strategy {
                Some(VgStrategy::UseAvailable) => free,
                _ => free.min(missing),
            };
            if size == 0 {
                continue;
            }
            self.create_partition(disk, size, "as LVM physical volume".to_string());
            missing = missing.saturating_sub(size);
            vg_size += size;
        }

        self.graph.push(GraphDevice::new(
            SYSTEM_VG,
            DeviceKind::LvmVg,
            DiskSize::b(vg_size),
        ));
        self.actions.push(format!(
            "Create volume group {SYSTEM_VG} ({})",
            DiskSize::b(vg_size)
        ));
        SYSTEM_VG.to_string()
    }

    /// Place every volume at its minimum size, then grow them in order
    fn allocate(&self, requirements: &[Requirement], targets: &[String]) -> Option<Vec<Allocation>> {
        let mut free: BTreeMap<String, u64> = BTreeMap::new();
        let mut allocations = Vec::new();

        for requirement in requirements {
            let min = bytes(requirement.min);
            let candidates: Vec<&String> = match &requirement.device {
                Some(device) if targets.contains(device) => vec![device],
                _ => targets.iter().collect(),
            };

            let device = candidates.into_iter().find(|device| {
                *free
                    .entry((*device).clone())
                    .or_insert_with(|| self.free(device))
                    >= min
            })?;

            if let Some(space) = free.get_mut(device) {
                *space -= min;
            }
            allocations.push(Allocation {
                device: device.clone(),
                size: min,
            });
        }

        for (requirement, allocation) in requirements.iter().zip(allocations.iter_mut()) {
            let Some(space) = free.get_mut(&allocation.device) else {
                continue;
            };
            let extra = match requirement.max {
                DiskSize::Unlimited => *space,
                DiskSize::Bytes(max) => max.saturating_sub(allocation.size).min(*space),
            };
            allocation.size += extra;
            *space -= extra;
        }

        Some(allocations)
    }

    fn create_volume(&mut self, requirement: &Requirement, allocation: &Allocation) -> String {
        let purpose = match requirement.fs_type {
            Some(fs_type) => format!("for {} with {}", requirement.mount_point, fs_type.as_str()),
            None => format!("for {}", requirement.mount_point),
        };

        let is_vg = self
            .graph
            .find_by_name(&allocation.device)
            .is_some_and(|device| device.kind == DeviceKind::LvmVg);
        if !is_vg {
            return self.create_partition(&allocation.device, allocation.size, purpose);
        }

        let name = format!(
            "{}/{}",
            allocation.device,
            logical_volume_name(&requirement.mount_point)
        );
        self.graph.push(
            GraphDevice::new(name.clone(), DeviceKind::LvmLv, DiskSize::b(allocation.size))
                .with_parent(allocation.device.clone()),
        );
        self.actions.push(format!(
            "Create logical volume {name} ({}) {purpose}",
            DiskSize::b(allocation.size)
        ));
        name
    }

    fn reuse(&mut self, spec: &VolumeSpec) -> PlannedDevice {
        let name = spec.reuse_name.clone().unwrap_or_default();
        let size = self
            .graph
            .find_by_name(&name)
            .map(|device| device.size)
            .unwrap_or_default();

        let action = match (spec.reformat, spec.fs_type) {
            (true, Some(fs_type)) => {
                format!("Format {name} for {} with {}", spec.mount_point, fs_type.as_str())
            }
            (true, None) => format!("Format {name} for {}", spec.mount_point),
            (false, _) => format!("Mount {name} at {}", spec.mount_point),
        };
        self.actions.push(action);

        PlannedDevice {
            mount_point: spec.mount_point.clone(),
            name: Some(name),
            fs_type: spec.fs_type,
            min_size: size,
            max_size: size,
        }
    }
}

/// Every device named in the settings must exist
fn check_devices(settings: &EngineSettings, graph: &DeviceGraph) -> Result<(), EngineError> {
    let named = settings.candidate_devices.iter().chain(
        settings
            .proposed_volumes()
            .flat_map(|spec| spec.device.iter().chain(spec.reuse_name.iter())),
    );

    for name in named {
        if graph.find_by_name(name).is_none() {
            return Err(EngineError::not_found(format!("Device {name} not found")));
        }
    }
    Ok(())
}

fn target_devices(settings: &EngineSettings, graph: &DeviceGraph) -> Vec<String> {
    let mut targets = settings.candidate_devices.clone();
    for device in settings
        .proposed_volumes()
        .filter(|spec| !spec.reuses_device())
        .filter_map(|spec| spec.device.as_ref())
    {
        if !targets.contains(device) {
            targets.push(device.clone());
        }
    }

    if targets.is_empty() && settings.lvm.enabled {
        targets = graph
            .devices
            .iter()
            .filter(|device| device.kind == DeviceKind::LvmVg)
            .map(|device| device.name.clone())
            .collect();
    }
    targets
}

fn is_volume_group(graph: &DeviceGraph, targets: &[String]) -> bool {
    targets.iter().all(|target| {
        graph
            .find_by_name(target)
            .is_some_and(|device| device.kind == DeviceKind::LvmVg)
    })
}

fn boot_device(settings: &EngineSettings, graph: &DeviceGraph) -> Option<String> {
    if !settings.boot {
        return None;
    }
    settings
        .root_device
        .as_deref()
        .and_then(|name| graph.find_by_name(name))
        .filter(|device| device.kind == DeviceKind::Disk)
        .map(|device| device.name.clone())
}

fn unfeasible(
    settings: &EngineSettings,
    graph: &DeviceGraph,
    description: &str,
    details: Option<String>,
) -> EngineResult {
    EngineResult {
        settings: settings.clone(),
        planned_devices: Vec::new(),
        graph: graph.clone(),
        actions: Vec::new(),
        failed: true,
        issues: vec![Issue {
            description: description.to_string(),
            details,
            source: IssueSource::System,
            severity: IssueSeverity::Error,
        }],
    }
}

fn next_partition_name(graph: &DeviceGraph, disk: &str) -> String {
    let separator = if disk.ends_with(|c: char| c.is_ascii_digit()) {
        "p"
    } else {
        ""
    };
    let prefix = format!("{disk}{separator}");
    let index = graph
        .partitions_of(disk)
        .iter()
        .filter_map(|partition| partition.name.strip_prefix(&prefix)?.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("{prefix}{index}")
}

fn logical_volume_name(mount_point: &str) -> String {
    match mount_point.trim_matches('/') {
        "" => "root".to_string(),
        path => path.replace('/', "_"),
    }
}

fn percent(size: DiskSize, percentage: u32) -> DiskSize {
    match size {
        DiskSize::Bytes(bytes) => DiskSize::b(bytes.saturating_mul(u64::from(percentage)) / 100),
        DiskSize::Unlimited => DiskSize::Unlimited,
    }
}

fn bytes(size: DiskSize) -> u64 {
    size.bytes().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposal_contracts::{EngineErrorKind, LvmSettings};

    fn graph() -> DeviceGraph {
        DeviceGraph::new(vec![
            GraphDevice::new("/dev/sda", DeviceKind::Disk, DiskSize::gib(100)),
            GraphDevice::new("/dev/sda1", DeviceKind::Partition, DiskSize::gib(60))
                .with_parent("/dev/sda")
                .shrinkable(true),
            GraphDevice::new("/dev/sda2", DeviceKind::Partition, DiskSize::gib(30))
                .with_parent("/dev/sda"),
            GraphDevice::new("/dev/nvme0n1", DeviceKind::Disk, DiskSize::gib(20)),
        ])
    }

    fn spec(mount_point: &str, min: DiskSize, max: DiskSize) -> VolumeSpec {
        VolumeSpec {
            min_size: min,
            max_size: max,
            max_size_lvm: max,
            fs_type: Some(FilesystemType::Ext4),
            ..VolumeSpec::new(mount_point)
        }
    }

    fn settings(candidate: &str, volumes: Vec<VolumeSpec>) -> EngineSettings {
        EngineSettings {
            candidate_devices: vec![candidate.to_string()],
            root_device: Some(candidate.to_string()),
            volumes,
            ..Default::default()
        }
    }

    #[test]
    fn unknown_candidates_are_not_found() {
        let engine = SimulatedEngine::new(graph());
        let error = engine
            .propose(&settings("/dev/sdz", Vec::new()), &graph())
            .expect_err("unknown device");
        assert_eq!(error.kind, EngineErrorKind::NotFound);
    }

    #[test]
    fn only_available_disks_are_offered() {
        let engine = SimulatedEngine::new(graph()).with_unavailable(["/dev/sda".to_string()]);
        assert_eq!(engine.available_devices(&graph()), vec!["/dev/nvme0n1"]);
    }

    #[test]
    fn fills_an_empty_disk() {
        let engine = SimulatedEngine::new(graph());
        let mut settings = settings(
            "/dev/nvme0n1",
            vec![
                spec("/", DiskSize::gib(5), DiskSize::Unlimited),
                spec("swap", DiskSize::gib(1), DiskSize::gib(2)),
            ],
        );
        settings.boot = true;

        let result = engine.propose(&settings, &graph()).expect("propose");
        assert!(result.succeeded());
        assert_eq!(
            result.actions,
            vec![
                "Create partition /dev/nvme0n1p1 (512.00 MiB) for booting",
                "Create partition /dev/nvme0n1p2 (18.50 GiB) for / with ext4",
                "Create partition /dev/nvme0n1p3 (1.00 GiB) for swap with ext4",
            ]
        );
        assert_eq!(
            result.planned_device("/").and_then(|d| d.name.as_deref()),
            Some("/dev/nvme0n1p2")
        );
    }

    #[test]
    fn deletes_and_resizes_only_while_needed() {
        let engine = SimulatedEngine::new(graph());
        let mut settings = settings("/dev/sda", vec![spec("/", DiskSize::gib(30), DiskSize::gib(30))]);
        settings.boot = false;
        settings.space.actions = BTreeMap::from([
            ("/dev/sda1".to_string(), SpaceAction::Resize),
            ("/dev/sda2".to_string(), SpaceAction::Delete),
        ]);

        let result = engine.propose(&settings, &graph()).expect("propose");
        assert!(result.succeeded());
        assert_eq!(
            result.settings.space.actions,
            BTreeMap::from([("/dev/sda2".to_string(), SpaceAction::Delete)])
        );
        assert!(result.graph.find_by_name("/dev/sda2").is_none());
        assert_eq!(
            result.graph.find_by_name("/dev/sda1").map(|d| d.size),
            Some(DiskSize::gib(60))
        );

        settings.volumes = vec![spec("/", DiskSize::gib(60), DiskSize::gib(60))];
        let result = engine.propose(&settings, &graph()).expect("propose");
        assert!(result.succeeded());
        assert_eq!(
            result.graph.find_by_name("/dev/sda1").map(|d| d.size),
            Some(DiskSize::gib(40))
        );
        assert_eq!(
            result.settings.space.actions.get("/dev/sda1"),
            Some(&SpaceAction::Resize)
        );
    }

    #[test]
    fn reports_missing_space_as_issue() {
        let engine = SimulatedEngine::new(graph());
        let settings = settings("/dev/sda", vec![spec("/", DiskSize::gib(50), DiskSize::gib(50))]);

        let result = engine.propose(&settings, &graph()).expect("propose");
        assert!(result.failed);
        assert!(result.actions.is_empty());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].source, IssueSource::System);
        assert_eq!(result.graph, graph());
    }

    #[test]
    fn sizes_include_fallbacks_snapshots_and_ram() {
        let engine = SimulatedEngine::new(graph()).with_ram_size(DiskSize::gib(16));

        let mut root = spec("/", DiskSize::gib(10), DiskSize::gib(20));
        root.snapshots = true;
        root.snapshots_percentage = Some(100);
        let mut home = spec("/home", DiskSize::gib(5), DiskSize::Unlimited);
        home.proposed = false;
        home.fallback_for_min_size = Some("/".to_string());
        home.fallback_for_max_size = Some("/".to_string());
        let mut swap = spec("swap", DiskSize::gib(1), DiskSize::gib(2));
        swap.adjust_by_ram = true;

        let settings = settings("/dev/sda", vec![root.clone(), home, swap.clone()]);
        assert_eq!(
            engine.volume_sizes(&root, &settings),
            (DiskSize::gib(30), DiskSize::Unlimited)
        );
        assert_eq!(
            engine.volume_sizes(&swap, &settings),
            (DiskSize::gib(16), DiskSize::gib(16))
        );

        root.ignore_fallback_sizes = true;
        root.ignore_snapshots_sizes = true;
        assert_eq!(
            engine.volume_sizes(&root, &settings),
            (DiskSize::gib(10), DiskSize::gib(20))
        );
    }

    #[test]
    fn lvm_volumes_live_in_a_new_group() {
        let engine = SimulatedEngine::new(graph());
        let mut settings = settings(
            "/dev/nvme0n1",
            vec![
                spec("/", DiskSize::gib(5), DiskSize::gib(10)),
                spec("/var/lib", DiskSize::gib(2), DiskSize::gib(2)),
            ],
        );
        settings.boot = false;
        settings.lvm = LvmSettings {
            enabled: true,
            strategy: Some(VgStrategy::UseNeeded),
            separate_vgs: true,
            vg_reuse: false,
        };

        let result = engine.propose(&settings, &graph()).expect("propose");
        assert!(result.succeeded());
        assert_eq!(
            result.graph.find_by_name(SYSTEM_VG).map(|vg| vg.size),
            Some(DiskSize::gib(7))
        );
        assert_eq!(
            result.planned_device("/var/lib").and_then(|d| d.name.as_deref()),
            Some("/dev/system/var_lib")
        );
    }

    #[test]
    fn reused_devices_are_planned_with_their_size() {
        let engine = SimulatedEngine::new(graph());
        let mut srv = spec("/srv", DiskSize::zero(), DiskSize::Unlimited);
        srv.reuse_name = Some("/dev/sda2".to_string());
        let mut settings = settings("/dev/nvme0n1", vec![spec("/", DiskSize::gib(5), DiskSize::gib(5)), srv]);
        settings.boot = false;

        let result = engine.propose(&settings, &graph()).expect("propose");
        let planned = result.planned_device("/srv").expect("planned /srv");
        assert_eq!(planned.min_size, DiskSize::gib(30));
        assert!(result.actions.contains(&"Mount /dev/sda2 at /srv".to_string()));
    }

    #[test]
    fn probe_errors_are_returned() {
        let engine = SimulatedEngine::new(graph())
            .with_probe_error(EngineError::new(EngineErrorKind::Unavailable, "no udev"));
        assert!(engine.probe().is_err());
    }
}
