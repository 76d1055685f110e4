use std::collections::HashSet;

use bellkit_core::{ActionId, StateKey};

use crate::{CompiledMdp, MdpError, PolicySpec, compiled::sample_cdf};

#[derive(Debug, Clone)]
/// Stochastic policy resolved against a compiled MDP.
///
/// Rows follow the MDP's action enumeration order, which fixes the order of the
/// inverse-CDF walk during sampling.
pub struct CompiledPolicy {
    name: Option<String>,
    rows: Vec<PolicyRow>,
}

#[derive(Debug, Clone)]
struct PolicyRow {
    probs: Vec<f64>,
    cdf: Vec<f64>,
}

impl PolicyRow {
    fn from_probs(probs: Vec<f64>) -> Self {
        let cdf = probs
            .iter()
            .scan(0.0_f64, |cumulative, p| {
                *cumulative += p;
                Some(*cumulative)
            })
            .collect();
        PolicyRow { probs, cdf }
    }
}

impl CompiledPolicy {
    pub(crate) fn from_spec(
        spec: &PolicySpec,
        mdp: &CompiledMdp,
        tolerance: f64,
    ) -> Result<Self, MdpError> {
        let mut probs: Vec<Vec<f64>> = (0..mdp.state_count())
            .map(|s| vec![0.0; mdp.num_actions(StateKey::from(s)).unwrap_or(0)])
            .collect();
        let mut seen = HashSet::with_capacity(spec.entries.len());

        for entry in &spec.entries {
            let state = mdp
                .state_key(&entry.state)
                .ok_or_else(|| MdpError::PolicyUnknownState {
                    state: entry.state.clone(),
                })?;
            let action = mdp.action_key(state, &entry.action).ok_or_else(|| {
                MdpError::PolicyUnknownAction {
                    state: entry.state.clone(),
                    action: entry.action.clone(),
                }
            })?;

            if !seen.insert((state, action)) {
                return Err(MdpError::PolicyDuplicateEntry {
                    state: entry.state.clone(),
                    action: entry.action.clone(),
                });
            }
            if !entry.prob.is_finite() || !(0.0..=1.0).contains(&entry.prob) {
                return Err(MdpError::PolicyInvalidProbability {
                    state: entry.state.clone(),
                    action: entry.action.clone(),
                    value: entry.prob,
                });
            }

            probs[state.index()][action.index()] = entry.prob;
        }

        // Every state with actions must distribute its full mass.
        for (s, row) in probs.iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(MdpError::PolicyProbabilitySum {
                    state: mdp
                        .state_id(StateKey::from(s))
                        .unwrap_or_default()
                        .to_string(),
                    sum,
                    tolerance,
                });
            }
        }

        Ok(CompiledPolicy {
            name: spec.name.clone(),
            rows: probs.into_iter().map(PolicyRow::from_probs).collect(),
        })
    }

    /// Equal probability over the actions of every state.
    pub fn uniform(mdp: &CompiledMdp) -> Self {
        let rows = (0..mdp.state_count())
            .map(|s| {
                let n = mdp.num_actions(StateKey::from(s)).unwrap_or(0);
                PolicyRow::from_probs(vec![1.0 / n as f64; n])
            })
            .collect();
        CompiledPolicy {
            name: Some("uniform".to_string()),
            rows,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    /// Probability of choosing `action` in `state`, `0.0` for unknown pairs.
    pub fn prob(&self, state: StateKey, action: ActionId) -> f64 {
        self.rows
            .get(state.index())
            .and_then(|row| row.probs.get(action.index()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Select an action for `state` by walking its CDF with a uniform sample in `[0, 1)`.
    pub fn sample_action(&self, state: StateKey, sample: f64) -> Option<ActionId> {
        let row = self.rows.get(state.index())?;
        sample_cdf(&row.cdf, sample).map(ActionId::from)
    }
}

#[cfg(test)]
mod tests {
    use bellkit_core::{ActionId, StateKey};

    use crate::{CompiledPolicy, MdpBuilder, MdpError, PolicyBuilder};

    fn two_action_mdp() -> crate::CompiledMdp {
        let mut builder = MdpBuilder::new();
        builder.add_state("a", false).add_state("end", true);
        builder
            .add_action("a", "left", 0.0)
            .and_then(|b| b.add_outcome("a", "left", "end", 1.0))
            .and_then(|b| b.add_action("a", "right", 1.0))
            .and_then(|b| b.add_outcome("a", "right", "end", 1.0))
            .expect("builder lookups succeed");
        builder.compile().expect("valid mdp")
    }

    #[test]
    fn unlisted_actions_default_to_zero() {
        let mdp = two_action_mdp();
        let mut policy = PolicyBuilder::new();
        policy.set_prob("a", "right", 1.0);
        let policy = policy.compile(&mdp).expect("row sums to one");

        let a = StateKey::from(0);
        assert_eq!(policy.prob(a, ActionId::from(0)), 0.0);
        assert_eq!(policy.prob(a, ActionId::from(1)), 1.0);
        assert_eq!(policy.sample_action(a, 0.0), Some(ActionId::from(1)));
        assert_eq!(policy.sample_action(StateKey::from(1), 0.5), None);
    }

    #[test]
    fn rows_must_sum_to_one() {
        let mdp = two_action_mdp();
        let mut policy = PolicyBuilder::new();
        policy.set_prob("a", "left", 0.3);

        let err = policy.compile(&mdp).expect_err("row sums to 0.3");
        assert!(matches!(err, MdpError::PolicyProbabilitySum { .. }));
    }

    #[test]
    fn tolerant_compile_falls_back_to_last_action_with_mass() {
        let mdp = two_action_mdp();
        let mut policy = PolicyBuilder::new();
        policy.set_prob("a", "left", 0.3);
        let policy = policy
            .build_spec()
            .compile_with_tolerance(&mdp, 1.0)
            .expect("tolerance admits the short row");

        let a = StateKey::from(0);
        assert_eq!(policy.sample_action(a, 0.1), Some(ActionId::from(0)));
        assert_eq!(policy.sample_action(a, 0.9), Some(ActionId::from(0)));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mdp = two_action_mdp();

        let mut unknown_state = PolicyBuilder::new();
        unknown_state.set_prob("missing", "left", 1.0);
        assert!(matches!(
            unknown_state.compile(&mdp),
            Err(MdpError::PolicyUnknownState { .. })
        ));

        let mut unknown_action = PolicyBuilder::new();
        unknown_action.set_prob("a", "up", 1.0);
        assert!(matches!(
            unknown_action.compile(&mdp),
            Err(MdpError::PolicyUnknownAction { .. })
        ));

        let mut duplicate = PolicyBuilder::new();
        duplicate.set_prob("a", "left", 0.5).set_prob("a", "left", 0.5);
        assert!(matches!(
            duplicate.compile(&mdp),
            Err(MdpError::PolicyDuplicateEntry { .. })
        ));

        let mut negative = PolicyBuilder::new();
        negative.set_prob("a", "left", -0.5).set_prob("a", "right", 1.5);
        assert!(matches!(
            negative.compile(&mdp),
            Err(MdpError::PolicyInvalidProbability { .. })
        ));
    }

    #[test]
    fn uniform_policy_splits_mass_evenly() {
        let mdp = two_action_mdp();
        let policy = CompiledPolicy::uniform(&mdp);

        assert_eq!(policy.name(), Some("uniform"));
        assert_eq!(policy.prob(StateKey::from(0), ActionId::from(1)), 0.5);
        assert_eq!(policy.sample_action(StateKey::from(1), 0.0), None);
    }
}
