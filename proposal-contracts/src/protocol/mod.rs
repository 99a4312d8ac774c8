// SPDX-License-Identifier: GPL-3.0-only

pub mod error;
pub mod graph;
pub mod result;
pub mod settings;

pub use error::{EngineError, EngineErrorKind};
pub use graph::{DeviceGraph, DeviceKind, GraphDevice};
pub use result::{EngineResult, PlannedDevice};
pub use settings::{
    EngineSettings, EngineSpaceSettings, LvmSettings, SpaceStrategy, SwapReuse, VgStrategy,
    VolumeSpec,
};
