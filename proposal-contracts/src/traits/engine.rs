// SPDX-License-Identifier: GPL-3.0-only

use crate::{DeviceGraph, EngineError, EngineResult, EngineSettings};

/// External service computing concrete layouts.
///
/// Every call works on a caller-provided graph snapshot; the engine keeps no
/// state between calls.
pub trait PartitioningEngine: Send + Sync {
    /// Snapshot of the devices currently present in the system
    fn probe(&self) -> Result<DeviceGraph, EngineError>;

    /// Names of the devices that can be used for installation, in
    /// preference order
    fn available_devices(&self, graph: &DeviceGraph) -> Vec<String>;

    fn propose(
        &self,
        settings: &EngineSettings,
        graph: &DeviceGraph,
    ) -> Result<EngineResult, EngineError>;
}
