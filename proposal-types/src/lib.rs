// SPDX-License-Identifier: GPL-3.0-only

//! Domain model of the installer storage proposal
//!
//! This crate defines the settings a storage proposal is resolved into.
//! They are used throughout the stack:
//!
//! - **proposal-core**: Builds these settings from product configuration and
//!   wire documents, and converts them to and from engine settings
//! - **proposal-contracts**: Engine results refer to [`DiskSize`] and
//!   [`FilesystemType`] directly
//! - **proposal-testing**: Prints these types from the lab CLI
//!
//! ## Structure
//!
//! - [`ProposalSettings`] is the aggregate root: device, boot, encryption,
//!   space and the ordered [`Volume`] list
//! - [`Volume`] is one resolved mount point, constrained by its
//!   [`VolumeOutline`]
//! - [`Issue`] is the user-facing diagnostic of a proposal attempt

pub mod btrfs;
pub mod device;
pub mod encryption;
pub mod filesystem;
pub mod issue;
pub mod settings;
pub mod size;
pub mod space;
pub mod volume;

pub use btrfs::{BtrfsSettings, SubvolumeSpec};
pub use device::DeviceSettings;
pub use encryption::{BootSettings, EncryptionMethod, EncryptionSettings, PbkdFunction};
pub use filesystem::FilesystemType;
pub use issue::{Issue, IssueSeverity, IssueSource};
pub use settings::ProposalSettings;
pub use size::DiskSize;
pub use space::{SpaceAction, SpacePolicy, SpaceSettings};
pub use volume::{Volume, VolumeLocation, VolumeOutline, VolumeTarget, clean_path};
