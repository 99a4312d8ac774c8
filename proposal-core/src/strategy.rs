// SPDX-License-Identifier: GPL-3.0-only

//! Guided proposal strategy
//!
//! Completes an under-specified target with the first available device, runs
//! the engine once and turns its answer into a [`Proposal`]. Nothing is kept
//! between calls: every calculation works on its own copy of the settings and
//! its own device graph snapshot.

use std::fmt;

use tracing::{debug, info, warn};

use proposal_contracts::{EngineError, EngineResult, PartitioningEngine};
use proposal_types::{Issue, ProposalSettings, Volume};

use crate::ProductConfig;
use crate::conversions::{settings_from_engine, settings_to_engine};

/// Why a proposal could not be calculated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The target is under-specified and there is no device to pick
    NoTargetDevice,
    /// The engine could not be used
    Engine(EngineError),
    /// The engine found no layout for the settings
    Unfeasible,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTargetDevice => f.write_str("no target device"),
            Self::Engine(error) => write!(f, "engine error: {error}"),
            Self::Unfeasible => f.write_str("unfeasible settings"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalState {
    Success {
        /// Settings with the sizes computed by the engine
        settings: ProposalSettings,
        result: EngineResult,
    },
    Failed {
        reason: FailureReason,
        engine_issues: Vec<Issue>,
    },
}

/// Outcome of one calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    input: ProposalSettings,
    available_devices: Vec<String>,
    state: ProposalState,
}

impl Proposal {
    pub fn state(&self) -> &ProposalState {
        &self.state
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.state, ProposalState::Success { .. })
    }

    /// Engine-derived settings on success, the requested ones otherwise
    pub fn settings(&self) -> &ProposalSettings {
        match &self.state {
            ProposalState::Success { settings, .. } => settings,
            ProposalState::Failed { .. } => &self.input,
        }
    }

    /// Requested settings, after completing the target
    pub fn input(&self) -> &ProposalSettings {
        &self.input
    }

    pub fn available_devices(&self) -> &[String] {
        &self.available_devices
    }

    pub fn result(&self) -> Option<&EngineResult> {
        match &self.state {
            ProposalState::Success { result, .. } => Some(result),
            ProposalState::Failed { .. } => None,
        }
    }

    /// Actions the engine plans to perform (none unless successful)
    pub fn actions(&self) -> &[String] {
        self.result()
            .map(|result| result.actions.as_slice())
            .unwrap_or_default()
    }

    pub fn issues(&self) -> Vec<Issue> {
        let (reason, engine_issues) = match &self.state {
            ProposalState::Success { result, .. } => return result.issues.clone(),
            ProposalState::Failed {
                reason,
                engine_issues,
            } => (reason, engine_issues),
        };

        let mut issues = Vec::new();
        let unresolved = self.input.device.is_unresolved();
        let missing = self.missing_devices();

        if unresolved {
            issues.push(Issue::config_error("No device selected for installation"));
        }
        if !missing.is_empty() {
            let description = if missing.len() == 1 {
                "The following selected device is not found in the system"
            } else {
                "The following selected devices are not found in the system"
            };
            issues.push(Issue::config_error(format!(
                "{description}: {}",
                missing.join(", ")
            )));
        }
        if !unresolved && missing.is_empty() {
            let issue = Issue::config_error(
                "Cannot accommodate the required file systems for installation",
            );
            issues.push(match reason {
                FailureReason::Engine(error) => issue.with_details(error.message.clone()),
                _ => issue,
            });
        }

        issues.extend(engine_issues.iter().cloned());
        issues
    }

    /// Installation devices the engine does not know about
    fn missing_devices(&self) -> Vec<&str> {
        self.input
            .installation_devices()
            .into_iter()
            .filter(|device| !self.available_devices.iter().any(|known| known == device))
            .collect()
    }
}

pub trait ProposalStrategy: Send + Sync {
    fn calculate(&self, settings: &ProposalSettings) -> Proposal;
}

pub struct GuidedStrategy<'a, E: PartitioningEngine + ?Sized> {
    config: &'a ProductConfig,
    engine: &'a E,
}

impl<'a, E: PartitioningEngine + ?Sized> GuidedStrategy<'a, E> {
    pub fn new(config: &'a ProductConfig, engine: &'a E) -> Self {
        Self { config, engine }
    }

    /// Template volumes, for clients offering new mount points
    pub fn volume_templates(&self) -> Vec<Volume> {
        self.config.templates().all().to_vec()
    }
}

impl<E: PartitioningEngine + ?Sized> ProposalStrategy for GuidedStrategy<'_, E> {
    fn calculate(&self, settings: &ProposalSettings) -> Proposal {
        let mut input = settings.clone();

        let graph = match self.engine.probe() {
            Ok(graph) => graph,
            Err(error) => {
                warn!(%error, "failed to probe devices");
                return failed(input, Vec::new(), FailureReason::Engine(error), Vec::new());
            }
        };
        let available_devices = self.engine.available_devices(&graph);
        debug!(?available_devices, "available devices");

        if input.device.is_unresolved() {
            let Some(device) = available_devices.first().cloned() else {
                warn!("no device available for installation");
                return failed(
                    input,
                    available_devices,
                    FailureReason::NoTargetDevice,
                    Vec::new(),
                );
            };
            info!(%device, "selected installation device");
            input.device.select(&device);
        }

        let engine_settings = settings_to_engine(&input, self.config, &graph);
        match self.engine.propose(&engine_settings, &graph) {
            Err(error) => {
                warn!(%error, "engine failed to calculate the proposal");
                failed(input, available_devices, FailureReason::Engine(error), Vec::new())
            }
            Ok(result) if result.failed => {
                info!(issues = result.issues.len(), "proposal is not feasible");
                failed(input, available_devices, FailureReason::Unfeasible, result.issues)
            }
            Ok(result) => {
                info!(actions = result.actions.len(), "proposal calculated");
                let settings = settings_from_engine(&result, &input);
                Proposal {
                    input,
                    available_devices,
                    state: ProposalState::Success { settings, result },
                }
            }
        }
    }
}

fn failed(
    input: ProposalSettings,
    available_devices: Vec<String>,
    reason: FailureReason,
    engine_issues: Vec<Issue>,
) -> Proposal {
    Proposal {
        input,
        available_devices,
        state: ProposalState::Failed {
            reason,
            engine_issues,
        },
    }
}
