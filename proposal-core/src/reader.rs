// SPDX-License-Identifier: GPL-3.0-only

use tracing::{debug, warn};

use proposal_types::{
    BootSettings, DeviceSettings, EncryptionMethod, EncryptionSettings, PbkdFunction,
    ProposalSettings, SpacePolicy, SpaceSettings, Volume,
};

use crate::ProductConfig;

/// Default proposal settings of a product
pub fn read(config: &ProductConfig) -> ProposalSettings {
    let storage = config.storage();

    let device = if storage.lvm {
        DeviceSettings::NewLvmVg {
            candidate_pv_devices: Vec::new(),
        }
    } else {
        DeviceSettings::Disk { name: None }
    };

    let encryption = EncryptionSettings {
        password: None,
        method: storage.encryption.method.as_deref().and_then(|id| {
            let method = EncryptionMethod::find(id);
            if method.is_none() {
                warn!(method = %id, "ignoring unknown encryption method");
            }
            method
        }),
        pbkd_function: storage.encryption.pbkd_function.as_deref().and_then(|value| {
            let function = PbkdFunction::find(value);
            if function.is_none() {
                warn!(pbkd_function = %value, "ignoring unknown PBKD function");
            }
            function
        }),
    };

    let policy = match storage.space_policy.as_deref() {
        None => SpacePolicy::Keep,
        Some(name) => SpacePolicy::parse(name).unwrap_or_else(|| {
            warn!(policy = %name, "ignoring unknown space policy");
            SpacePolicy::Keep
        }),
    };

    let settings = ProposalSettings {
        device,
        boot: BootSettings::default(),
        encryption,
        space: SpaceSettings::with_policy(policy),
        volumes: default_volumes(config),
    };
    debug!(volumes = settings.volumes.len(), "read default settings");
    settings
}

/// Required templates first, then the volumes the product proposes
fn default_volumes(config: &ProductConfig) -> Vec<Volume> {
    let templates = config.templates();
    let mut volumes: Vec<Volume> = templates.required().cloned().collect();

    for path in &config.storage().volumes {
        if volumes.iter().any(|volume| volume.mounted_at(path)) {
            continue;
        }
        volumes.push(templates.for_path(path));
    }

    volumes
}
