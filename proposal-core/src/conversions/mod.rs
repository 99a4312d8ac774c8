// SPDX-License-Identifier: GPL-3.0-only

//! Conversions between the wire format, [`proposal_types::ProposalSettings`]
//! and the engine settings

pub mod from_engine;
pub mod from_wire;
pub mod to_engine;
pub mod to_wire;

pub use from_engine::settings_from_engine;
pub use from_wire::{settings_from_wire, volume_from_wire};
pub use to_engine::{settings_to_engine, space_actions, volume_spec};
pub use to_wire::{settings_to_wire, volume_to_wire};
