use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use proposal_contracts::{DeviceGraph, DeviceKind, GraphDevice};
use proposal_core::{ProductConfig, WireSettings};
use proposal_types::DiskSize;

use crate::engine::SimulatedEngine;
use crate::errors::{Result, TestingError};

/// Simulated system: the disks, partitions and volume groups the engine sees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Memory of the simulated machine, for RAM-adjusted volumes
    pub ram_size: Option<DiskSize>,
    #[serde(default)]
    pub disks: Vec<DiskSpec>,
    #[serde(default)]
    pub volume_groups: Vec<VolumeGroupSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSpec {
    pub name: String,
    pub size: DiskSize,
    /// Whether the disk may be offered as installation device
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub partitions: Vec<PartitionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub name: String,
    pub size: DiskSize,
    #[serde(default)]
    pub shrinkable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeGroupSpec {
    pub name: String,
    pub size: DiskSize,
}

fn default_available() -> bool {
    true
}

impl LabSpec {
    pub fn device_graph(&self) -> DeviceGraph {
        let mut devices = Vec::new();
        for disk in &self.disks {
            devices.push(GraphDevice::new(disk.name.clone(), DeviceKind::Disk, disk.size));
            devices.extend(disk.partitions.iter().map(|partition| {
                GraphDevice::new(partition.name.clone(), DeviceKind::Partition, partition.size)
                    .with_parent(disk.name.clone())
                    .shrinkable(partition.shrinkable)
            }));
        }
        devices.extend(
            self.volume_groups
                .iter()
                .map(|vg| GraphDevice::new(vg.name.clone(), DeviceKind::LvmVg, vg.size)),
        );
        DeviceGraph::new(devices)
    }

    /// Engine simulating this system
    pub fn engine(&self) -> SimulatedEngine {
        let mut engine = SimulatedEngine::new(self.device_graph()).with_unavailable(
            self.disks
                .iter()
                .filter(|disk| !disk.available)
                .map(|disk| disk.name.clone()),
        );
        if let Some(ram_size) = self.ram_size {
            engine = engine.with_ram_size(ram_size);
        }
        engine
    }
}

pub fn workspace_root() -> PathBuf {
    if let Ok(value) = std::env::var("PROPOSAL_TESTING_WORKSPACE_ROOT") {
        return PathBuf::from(value);
    }

    if let Ok(current_dir) = std::env::current_dir()
        && current_dir.join("resources/lab-specs").exists()
    {
        return current_dir;
    }

    let manifest_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    if manifest_root.join("resources/lab-specs").exists() {
        return manifest_root;
    }

    PathBuf::from(".")
}

pub fn specs_root() -> PathBuf {
    workspace_root().join("resources/lab-specs")
}

pub fn products_root() -> PathBuf {
    workspace_root().join("resources/products")
}

pub fn spec_path_for_name(spec_name: &str) -> PathBuf {
    specs_root().join(format!("{}.toml", spec_name))
}

pub fn product_path_for_name(product_name: &str) -> PathBuf {
    products_root().join(format!("{}.toml", product_name))
}

/// Load a lab spec by name, or from a path when `spec` points to a file
pub fn load(spec: &str) -> Result<LabSpec> {
    let path = Path::new(spec);
    if path.is_file() {
        return load_from_path(spec, path);
    }
    load_by_name(spec)
}

pub fn load_by_name(spec_name: &str) -> Result<LabSpec> {
    let path = spec_path_for_name(spec_name);
    if !path.exists() {
        return Err(TestingError::SpecNotFound {
            spec_name: spec_name.to_string(),
        });
    }
    load_from_path(spec_name, &path)
}

fn load_from_path(spec_name: &str, path: &Path) -> Result<LabSpec> {
    let raw = fs::read_to_string(path).map_err(|error| TestingError::SpecInvalid {
        spec_name: spec_name.to_string(),
        reason: error.to_string(),
    })?;

    let spec: LabSpec = toml::from_str(&raw).map_err(|error| TestingError::SpecInvalid {
        spec_name: spec_name.to_string(),
        reason: error.to_string(),
    })?;

    validate(&spec)?;
    Ok(spec)
}

pub fn load_product(product_name: &str) -> Result<ProductConfig> {
    let path = product_path_for_name(product_name);
    if !path.exists() {
        return Err(TestingError::ProductNotFound {
            product_name: product_name.to_string(),
        });
    }
    Ok(ProductConfig::load(path)?)
}

/// Settings document in the wire format
pub fn load_settings(path: &Path) -> Result<WireSettings> {
    let raw = fs::read_to_string(path).map_err(|error| TestingError::SettingsIo {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    proposal_core::settings_from_json_str(&raw).map_err(|error| TestingError::SettingsInvalid {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

pub fn validate(spec: &LabSpec) -> Result<()> {
    let invalid = |reason: String| TestingError::SpecInvalid {
        spec_name: spec.name.clone(),
        reason,
    };

    if spec.name.is_empty() {
        return Err(TestingError::SpecInvalid {
            spec_name: "<unknown>".to_string(),
            reason: "name must not be empty".to_string(),
        });
    }

    let mut names: Vec<&str> = Vec::new();
    for disk in &spec.disks {
        names.push(&disk.name);
        names.extend(disk.partitions.iter().map(|partition| partition.name.as_str()));

        let used = disk
            .partitions
            .iter()
            .fold(DiskSize::zero(), |total, partition| total + partition.size);
        if used > disk.size {
            return Err(invalid(format!(
                "partitions of {} exceed the disk size",
                disk.name
            )));
        }
    }
    names.extend(spec.volume_groups.iter().map(|vg| vg.name.as_str()));

    for (index, name) in names.iter().enumerate() {
        if names[..index].contains(name) {
            return Err(invalid(format!("device {name} is declared twice")));
        }
    }

    Ok(())
}
