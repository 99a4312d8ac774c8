// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;

use tracing::debug;

use proposal_contracts::{EngineResult, VolumeSpec};
use proposal_types::{ProposalSettings, Volume, clean_path};

/// Settings reflecting what the engine actually proposed.
///
/// The original settings are kept except for the effective space actions,
/// the computed sizes of auto-sized volumes and the fallback relations.
pub fn settings_from_engine(result: &EngineResult, original: &ProposalSettings) -> ProposalSettings {
    let mut settings = original.clone();
    settings.space.actions = result.settings.space.actions.clone();

    let min_fallbacks = fallback_index(&result.settings.volumes, |spec| {
        spec.fallback_for_min_size.as_deref()
    });
    let max_fallbacks = fallback_index(&result.settings.volumes, |spec| {
        spec.fallback_for_max_size.as_deref()
    });

    for volume in &mut settings.volumes {
        if volume.auto_size {
            apply_planned_sizes(volume, result);
        }

        let path = clean_path(&volume.mount_path);
        volume.min_size_fallback_for = min_fallbacks.get(&path).cloned().unwrap_or_default();
        volume.max_size_fallback_for = max_fallbacks.get(&path).cloned().unwrap_or_default();
    }

    settings
}

fn apply_planned_sizes(volume: &mut Volume, result: &EngineResult) {
    let Some(planned) = result
        .planned_devices
        .iter()
        .find(|planned| volume.mounted_at(&planned.mount_point))
    else {
        return;
    };

    debug!(
        mount_path = %volume.mount_path,
        min = %planned.min_size.to_human_string_with_bytes(),
        max = %planned.max_size.to_human_string_with_bytes(),
        "sizes computed by the engine"
    );
    volume.min_size = planned.min_size;
    volume.max_size = planned.max_size;
}

/// Mount paths of all specs keyed by the volume they fall back to
fn fallback_index<F>(specs: &[VolumeSpec], target: F) -> HashMap<String, Vec<String>>
where
    F: Fn(&VolumeSpec) -> Option<&str>,
{
    let mut index: HashMap<String, Vec<String>> = HashMap::new();
    for spec in specs {
        if let Some(target) = target(spec) {
            index
                .entry(clean_path(target))
                .or_default()
                .push(spec.mount_point.clone());
        }
    }
    index
}
