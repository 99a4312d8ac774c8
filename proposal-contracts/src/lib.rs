// SPDX-License-Identifier: GPL-3.0-only

pub mod protocol;
pub mod traits;

pub use proposal_types::SpaceAction;
pub use protocol::{
    DeviceGraph, DeviceKind, EngineError, EngineErrorKind, EngineResult, EngineSettings,
    EngineSpaceSettings, GraphDevice, LvmSettings, PlannedDevice, SpaceStrategy, SwapReuse,
    VgStrategy, VolumeSpec,
};
pub use traits::PartitioningEngine;
