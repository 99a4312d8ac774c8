use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestingError {
    #[error("spec not found for '{spec_name}' in resources/lab-specs")]
    SpecNotFound { spec_name: String },
    #[error("invalid spec '{spec_name}': {reason}")]
    SpecInvalid { spec_name: String, reason: String },
    #[error("product not found for '{product_name}' in resources/products")]
    ProductNotFound { product_name: String },
    #[error("invalid product configuration: {0}")]
    Product(#[from] proposal_core::ConfigError),
    #[error("settings io error for {path:?}: {reason}")]
    SettingsIo { path: PathBuf, reason: String },
    #[error("invalid settings document {path:?}: {reason}")]
    SettingsInvalid { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, TestingError>;
