//! Bundled example model used by the `mrp` demonstration.

use crate::value::{config::ConfigError, mrp::MrpSpec};

/// Six-state MRP with rewards `[-1, -2, -2, 10, 1, 0]` and `gamma = 0.5`.
pub const SIX_STATE_MRP_YAML: &str = include_str!("../data/six_state.mrp.yaml");

/// State chain `s1 -> s2 -> s3 -> s6` through the six-state MRP.
pub const SIX_STATE_CHAIN: [&str; 4] = ["s1", "s2", "s3", "s6"];

pub fn six_state_mrp_spec() -> Result<MrpSpec, ConfigError> {
    MrpSpec::from_yaml_str(SIX_STATE_MRP_YAML)
}
