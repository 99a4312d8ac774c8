use serde_json::Value;

use proposal_core::{ProductConfig, WireSettings, settings_from_wire};
use proposal_testing::{LabSpec, spec};
use proposal_types::ProposalSettings;

pub fn product(name: &str) -> ProductConfig {
    spec::load_product(name).unwrap_or_else(|error| panic!("load product {name}: {error}"))
}

pub fn lab(name: &str) -> LabSpec {
    spec::load_by_name(name).unwrap_or_else(|error| panic!("load lab spec {name}: {error}"))
}

pub fn wire(value: Value) -> WireSettings {
    proposal_core::wire::settings_from_value(value).expect("decode wire settings")
}

/// Settings resolved from a wire document against a product
pub fn resolve(product_name: &str, value: Value) -> ProposalSettings {
    settings_from_wire(&wire(value), &product(product_name))
}
