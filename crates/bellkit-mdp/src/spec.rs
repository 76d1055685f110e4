use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CompiledMdp, CompiledPolicy, MdpError, compiled::PROB_TOLERANCE};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Serializable MDP schema used for YAML IO and validation.
pub struct MdpSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// All state declarations in the model, in enumeration order.
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single state declaration in the MDP schema.
pub struct StateSpec {
    /// Unique state id.
    pub id: String,
    /// Whether this state is terminal (defaults to `false` if omitted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<bool>,
    /// Available actions from this state, in enumeration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A named action, its immediate reward, and its stochastic outcomes.
pub struct ActionSpec {
    pub id: String,
    /// Reward for taking this action in its state (defaults to `0.0`).
    #[serde(default)]
    pub reward: f64,
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Probability of moving to `next` after taking an action.
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
}

impl MdpSpec {
    /// Validate schema invariants using the crate default tolerance.
    pub fn validate(&self) -> Result<(), MdpError> {
        self.validate_with_tolerance(PROB_TOLERANCE)
    }

    /// Validate ids, transitions, and probability constraints.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> Result<(), MdpError> {
        if self.states.is_empty() {
            return Err(MdpError::NoStates);
        }

        // State ids must be unique.
        let mut ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !ids.insert(state.id.as_str()) {
                return Err(MdpError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }

        for state in &self.states {
            let terminal = state.terminal.unwrap_or(false);
            let actions = state.actions.as_deref().unwrap_or(&[]);

            if terminal && !actions.is_empty() {
                return Err(MdpError::TerminalStateHasActions {
                    state: state.id.clone(),
                });
            }

            let mut action_ids = HashSet::with_capacity(actions.len());
            for action in actions {
                if !action_ids.insert(action.id.as_str()) {
                    return Err(MdpError::DuplicateActionId {
                        state: state.id.clone(),
                        action: action.id.clone(),
                    });
                }

                if !action.reward.is_finite() {
                    return Err(MdpError::InvalidReward {
                        state: state.id.clone(),
                        action: action.id.clone(),
                        value: action.reward,
                    });
                }

                if action.outcomes.is_empty() {
                    return Err(MdpError::EmptyOutcomes {
                        state: state.id.clone(),
                        action: action.id.clone(),
                    });
                }

                let mut targets = HashSet::with_capacity(action.outcomes.len());
                let mut sum = 0.0_f64;
                for (i, outcome) in action.outcomes.iter().enumerate() {
                    if !outcome.prob.is_finite() || outcome.prob < 0.0 {
                        return Err(MdpError::InvalidProbability {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            outcome_index: i,
                            value: outcome.prob,
                        });
                    }

                    if !ids.contains(outcome.next.as_str()) {
                        return Err(MdpError::UnknownNextState {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        });
                    }

                    // (state, action, next) is a key; listing it twice is ambiguous.
                    if !targets.insert(outcome.next.as_str()) {
                        return Err(MdpError::DuplicateOutcome {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        });
                    }

                    sum += outcome.prob;
                }

                if (sum - 1.0).abs() > tolerance {
                    return Err(MdpError::ProbabilitySum {
                        state: state.id.clone(),
                        action: action.id.clone(),
                        sum,
                        tolerance,
                    });
                }
            }
        }

        Ok(())
    }

    /// Compile this spec into the runtime representation.
    pub fn compile(&self) -> Result<CompiledMdp, MdpError> {
        CompiledMdp::from_spec(self, PROB_TOLERANCE)
    }

    /// Compile with a custom probability-sum tolerance.
    ///
    /// A loose tolerance admits outcome rows that sum to less than one; sampling then
    /// falls back to the last outcome with non-zero mass when a draw exceeds the row total.
    pub fn compile_with_tolerance(&self, tolerance: f64) -> Result<CompiledMdp, MdpError> {
        CompiledMdp::from_spec(self, tolerance)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Serializable stochastic policy: `(state, action) -> probability`.
///
/// Pairs that are not listed have probability zero.
pub struct PolicySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entries: Vec<PolicyEntrySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEntrySpec {
    pub state: String,
    pub action: String,
    pub prob: f64,
}

impl PolicySpec {
    /// Resolve this policy against `mdp`, requiring each acting state to sum to one.
    pub fn compile(&self, mdp: &CompiledMdp) -> Result<CompiledPolicy, MdpError> {
        CompiledPolicy::from_spec(self, mdp, PROB_TOLERANCE)
    }

    /// Resolve this policy with a custom probability-sum tolerance.
    pub fn compile_with_tolerance(
        &self,
        mdp: &CompiledMdp,
        tolerance: f64,
    ) -> Result<CompiledPolicy, MdpError> {
        CompiledPolicy::from_spec(self, mdp, tolerance)
    }
}
