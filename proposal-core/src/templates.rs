// SPDX-License-Identifier: GPL-3.0-only

//! Volume templates
//!
//! One default [`Volume`] per configured mount path. Paths without a
//! template are served by the configured generic template (empty mount
//! path) or, failing that, by a built-in generic volume.

use tracing::warn;

use proposal_types::{
    BtrfsSettings, DiskSize, FilesystemType, SubvolumeSpec, Volume, VolumeOutline, clean_path,
};

use crate::config::{
    BtrfsConfig, OutlineConfig, SizeValue, StorageConfig, SubvolumeConfig, TemplateConfig,
};

#[derive(Debug, Clone, Default)]
pub struct VolumeTemplates {
    templates: Vec<Volume>,
}

impl VolumeTemplates {
    pub fn build(storage: &StorageConfig) -> Self {
        let mut templates: Vec<Volume> = Vec::new();
        for config in &storage.volume_templates {
            let volume = template_from_config(config);
            if templates
                .iter()
                .any(|known| known.mount_path == volume.mount_path)
            {
                warn!(mount_path = %volume.mount_path, "ignoring duplicated volume template");
                continue;
            }
            templates.push(volume);
        }

        Self { templates }
    }

    /// Template for the given mount path.
    ///
    /// The returned volume always carries the requested mount path.
    pub fn for_path(&self, mount_path: &str) -> Volume {
        let mut volume = self
            .find(mount_path)
            .or_else(|| self.find(""))
            .cloned()
            .unwrap_or_else(generic_volume);
        volume.mount_path = mount_path.to_string();
        volume
    }

    /// Template configured for exactly this (cleaned) mount path
    pub fn find(&self, mount_path: &str) -> Option<&Volume> {
        let path = clean_path(mount_path);
        self.templates
            .iter()
            .find(|template| template.mount_path == path)
    }

    /// All templates in configuration order, including the generic one
    pub fn all(&self) -> &[Volume] {
        &self.templates
    }

    /// Templates for actual mount paths, in configuration order
    pub fn with_mount_path(&self) -> impl Iterator<Item = &Volume> {
        self.templates
            .iter()
            .filter(|template| !template.is_generic())
    }

    pub fn required(&self) -> impl Iterator<Item = &Volume> {
        self.with_mount_path()
            .filter(|template| template.outline.required)
    }
}

/// Built-in template for paths nobody configured
fn generic_volume() -> Volume {
    let mut volume = Volume::new("");
    volume.fs_type = Some(FilesystemType::Ext4);
    volume.outline.filesystems = FilesystemType::ALL.to_vec();
    volume
}

fn template_from_config(config: &TemplateConfig) -> Volume {
    let mount_path = clean_path(&config.mount_path);
    let mut volume = Volume::new(mount_path.clone());

    volume.outline = outline_from_config(&config.outline, &mount_path);
    volume.mount_options = config.mount_options.clone();
    volume.btrfs = btrfs_from_config(&config.btrfs);
    volume.min_size_fallback_for = clean_paths(&config.outline.auto_size.min_fallback_for);
    volume.max_size_fallback_for = clean_paths(&config.outline.auto_size.max_fallback_for);

    volume.fs_type = config
        .filesystem
        .as_deref()
        .and_then(|name| parse_filesystem(name, &mount_path))
        .or_else(|| volume.outline.filesystems.first().copied())
        .or(Some(FilesystemType::Ext4));

    if !(config.size.auto && volume.use_auto_size()) {
        let min = size_or(config.size.min.as_ref(), &mount_path, DiskSize::zero());
        let max = size_or(config.size.max.as_ref(), &mount_path, DiskSize::Unlimited);
        volume.use_fixed_size(min, max);
    }

    volume
}

fn outline_from_config(config: &OutlineConfig, mount_path: &str) -> VolumeOutline {
    let auto_size = &config.auto_size;
    let mut outline = VolumeOutline {
        required: config.required,
        filesystems: config
            .filesystems
            .iter()
            .filter_map(|name| parse_filesystem(name, mount_path))
            .collect(),
        snapshots_configurable: config.snapshots_configurable,
        adjust_by_ram: auto_size.adjust_by_ram,
        base_min_size: size_or(auto_size.base_min.as_ref(), mount_path, DiskSize::zero()),
        base_max_size: size_or(auto_size.base_max.as_ref(), mount_path, DiskSize::Unlimited),
        ..Default::default()
    };

    match &auto_size.snapshots_increment {
        Some(SizeValue::Text(text)) if text.trim().ends_with('%') => {
            match text.trim().trim_end_matches('%').trim().parse::<u32>() {
                Ok(percentage) => outline.snapshots_percentage = Some(percentage),
                Err(_) => warn!(%mount_path, value = %text, "ignoring unparsable snapshots increment"),
            }
        }
        Some(increment) => outline.snapshots_size = increment.to_size(mount_path),
        None => {}
    }

    outline
}

fn btrfs_from_config(config: &BtrfsConfig) -> BtrfsSettings {
    BtrfsSettings {
        snapshots: config.snapshots,
        read_only: config.read_only,
        default_subvolume: config.default_subvolume.clone(),
        subvolumes: config.subvolumes.iter().map(subvolume_from_config).collect(),
    }
}

fn subvolume_from_config(config: &SubvolumeConfig) -> SubvolumeSpec {
    match config {
        SubvolumeConfig::Path(path) => SubvolumeSpec::new(path.clone()),
        SubvolumeConfig::Full {
            path,
            copy_on_write,
            archs,
        } => SubvolumeSpec {
            path: path.clone(),
            copy_on_write: *copy_on_write,
            archs: archs
                .as_deref()
                .map(|archs| {
                    archs
                        .split(',')
                        .map(str::trim)
                        .filter(|arch| !arch.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        },
    }
}

fn parse_filesystem(name: &str, mount_path: &str) -> Option<FilesystemType> {
    let fs_type = FilesystemType::parse(name);
    if fs_type.is_none() {
        warn!(%mount_path, filesystem = %name, "ignoring unknown filesystem");
    }
    fs_type
}

fn size_or(value: Option<&SizeValue>, mount_path: &str, default: DiskSize) -> DiskSize {
    value
        .and_then(|value| value.to_size(mount_path))
        .unwrap_or(default)
}

fn clean_paths(paths: &[String]) -> Vec<String> {
    paths.iter().map(|path| clean_path(path)).collect()
}
