//! Bundled five-state student MDP and the two policies compared in the `mdp` demonstration.

use crate::{CompiledMdp, CompiledPolicy, MdpError, MdpSpec, PolicySpec};

pub const STUDENT_MDP_YAML: &str = include_str!("../data/student.mdp.yaml");
pub const RANDOM_POLICY_YAML: &str = include_str!("../data/random.policy.yaml");
pub const BIASED_POLICY_YAML: &str = include_str!("../data/biased.policy.yaml");

/// State and action whose occupancy the demonstration compares across policies.
pub const OCCUPANCY_TARGET: (&str, &str) = ("s4", "drift");

pub fn student_mdp() -> Result<CompiledMdp, MdpError> {
    let spec: MdpSpec = serde_yaml::from_str(STUDENT_MDP_YAML)?;
    spec.compile()
}

/// Every acting state splits its mass evenly between its two actions.
pub fn random_policy(mdp: &CompiledMdp) -> Result<CompiledPolicy, MdpError> {
    let spec: PolicySpec = serde_yaml::from_str(RANDOM_POLICY_YAML)?;
    spec.compile(mdp)
}

pub fn biased_policy(mdp: &CompiledMdp) -> Result<CompiledPolicy, MdpError> {
    let spec: PolicySpec = serde_yaml::from_str(BIASED_POLICY_YAML)?;
    spec.compile(mdp)
}
