// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use thiserror::Error;

/// Errors loading the product configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML product configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON product configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported product configuration format: {0}")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
