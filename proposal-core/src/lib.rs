// SPDX-License-Identifier: GPL-3.0-only

//! Resolution core of the installer storage proposal
//!
//! Turns a product configuration and a sparse settings document into
//! complete [`proposal_types::ProposalSettings`], converts those to and from
//! the settings of a [`proposal_contracts::PartitioningEngine`] and drives
//! the engine through the [`GuidedStrategy`].
//!
//! ```text
//! wire JSON -> settings_from_wire -> ProposalSettings -> settings_to_engine
//!     -> engine -> settings_from_engine -> ProposalSettings -> settings_to_wire
//! ```

pub mod config;
pub mod conversions;
pub mod error;
pub mod reader;
pub mod strategy;
pub mod templates;
pub mod wire;

pub use config::{ProductConfig, StorageConfig};
pub use conversions::{
    settings_from_engine, settings_from_wire, settings_to_engine, settings_to_wire,
    volume_from_wire,
};
pub use error::{ConfigError, Result};
pub use reader::read;
pub use strategy::{FailureReason, GuidedStrategy, Proposal, ProposalState, ProposalStrategy};
pub use templates::VolumeTemplates;
pub use wire::{WireSettings, settings_from_json_str, settings_to_json_string};
