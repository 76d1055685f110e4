use std::collections::HashMap;

use bellkit_core::{ActionId, Mrp, StateKey};

use crate::{CompiledPolicy, MdpError, MdpSpec};

/// Floating point tolerance used when validating probability sums.
pub(crate) const PROB_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
/// Runtime form of an MDP with resolved state references and precomputed CDFs.
pub struct CompiledMdp {
    states: Vec<StateRec>,
    state_ids: Vec<String>,
    state_id_to_key: HashMap<String, StateKey>,
    start_candidates: Vec<StateKey>,
}

#[derive(Debug, Clone)]
struct StateRec {
    terminal: bool,
    actions: Vec<ActionRec>,
}

#[derive(Debug, Clone)]
struct ActionRec {
    id: String,
    reward: f64,
    outcomes: Vec<OutcomeRec>,
    cdf: Vec<f64>,
}

#[derive(Debug, Clone)]
struct OutcomeRec {
    next: StateKey,
    prob: f64,
}

impl CompiledMdp {
    /// Compile and validate a spec into a fast runtime representation.
    pub(crate) fn from_spec(spec: &MdpSpec, tolerance: f64) -> Result<Self, MdpError> {
        spec.validate_with_tolerance(tolerance)?;

        let mut state_id_to_key = HashMap::with_capacity(spec.states.len());
        let mut state_ids = Vec::with_capacity(spec.states.len());

        for (idx, state) in spec.states.iter().enumerate() {
            let key = StateKey::from(idx);
            state_id_to_key.insert(state.id.clone(), key);
            state_ids.push(state.id.clone());
        }

        let mut states = Vec::with_capacity(spec.states.len());
        let mut start_candidates = Vec::new();
        for (idx, state) in spec.states.iter().enumerate() {
            let terminal = state.terminal.unwrap_or(false);
            if !terminal {
                start_candidates.push(StateKey::from(idx));
            }

            let mut actions = Vec::new();
            for action in state.actions.as_deref().unwrap_or(&[]) {
                let mut outcomes = Vec::with_capacity(action.outcomes.len());
                let mut cdf = Vec::with_capacity(action.outcomes.len());
                let mut cumulative = 0.0_f64;

                for outcome in &action.outcomes {
                    cumulative += outcome.prob;
                    cdf.push(cumulative);
                    let next = state_id_to_key.get(&outcome.next).copied().ok_or_else(|| {
                        MdpError::UnknownNextState {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        }
                    })?;

                    outcomes.push(OutcomeRec {
                        next,
                        prob: outcome.prob,
                    });
                }

                actions.push(ActionRec {
                    id: action.id.clone(),
                    reward: action.reward,
                    outcomes,
                    cdf,
                });
            }

            states.push(StateRec { terminal, actions });
        }

        Ok(Self {
            states,
            state_ids,
            state_id_to_key,
            start_candidates,
        })
    }

    /// Return the number of compiled states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Check whether a state is terminal.
    pub fn is_terminal(&self, key: StateKey) -> Option<bool> {
        self.states.get(key.index()).map(|state| state.terminal)
    }

    /// Non-terminal states in declaration order; episodes start from one of these.
    pub fn start_candidates(&self) -> &[StateKey] {
        &self.start_candidates
    }

    /// Return the number of actions available from a state.
    pub fn num_actions(&self, key: StateKey) -> Option<usize> {
        self.states
            .get(key.index())
            .map(|state| state.actions.len())
    }

    /// Convert a state key back to its original string id.
    pub fn state_id(&self, key: StateKey) -> Option<&str> {
        self.state_ids.get(key.index()).map(String::as_str)
    }

    /// Convert a string id into a compiled state key.
    pub fn state_key(&self, id: &str) -> Option<StateKey> {
        self.state_id_to_key.get(id).copied()
    }

    /// Original string id of an action.
    pub fn action_id(&self, state: StateKey, action: ActionId) -> Option<&str> {
        self.action(state, action).map(|a| a.id.as_str())
    }

    /// Position of the action named `id` within `state`'s action list.
    pub fn action_key(&self, state: StateKey, id: &str) -> Option<ActionId> {
        self.states
            .get(state.index())?
            .actions
            .iter()
            .position(|a| a.id == id)
            .map(ActionId::from)
    }

    /// Immediate reward of `(state, action)`, `0.0` for unknown pairs.
    pub fn reward(&self, state: StateKey, action: ActionId) -> f64 {
        self.action(state, action).map_or(0.0, |a| a.reward)
    }

    /// Probability of `(state, action) -> next`, `0.0` for unlisted triples.
    pub fn transition_prob(&self, state: StateKey, action: ActionId, next: StateKey) -> f64 {
        self.action(state, action)
            .and_then(|a| a.outcomes.iter().find(|o| o.next == next))
            .map_or(0.0, |o| o.prob)
    }

    fn action(&self, state: StateKey, action: ActionId) -> Option<&ActionRec> {
        self.states.get(state.index())?.actions.get(action.index())
    }

    /// Sample the successor of `(state, action)` using a uniform sample in `[0, 1)`.
    ///
    /// Returns `None` for terminal or unknown states, unknown actions, and rows
    /// without probability mass.
    pub fn sample_next(&self, state: StateKey, action: ActionId, sample: f64) -> Option<StateKey> {
        let rec = self.states.get(state.index())?;
        if rec.terminal {
            return None;
        }

        let action = rec.actions.get(action.index())?;
        let chosen = sample_cdf(&action.cdf, sample)?;
        Some(action.outcomes[chosen].next)
    }

    /// Collapse this MDP under `policy` into the equivalent Markov reward process.
    ///
    /// `P[s][s'] = sum_a pi(a|s) * P(s'|s,a)` and `R[s] = sum_a pi(a|s) * R(s,a)`.
    /// Terminal states and states without actions become absorbing with zero reward.
    pub fn induced_mrp(&self, policy: &CompiledPolicy, gamma: f64) -> Result<Mrp, MdpError> {
        if policy.state_count() != self.state_count() {
            return Err(MdpError::PolicyMismatch {
                policy_states: policy.state_count(),
                mdp_states: self.state_count(),
            });
        }

        let n = self.state_count();
        let mut transitions = vec![vec![0.0; n]; n];
        let mut rewards = vec![0.0; n];

        for (s, state) in self.states.iter().enumerate() {
            let key = StateKey::from(s);
            if state.terminal || state.actions.is_empty() {
                transitions[s][s] = 1.0;
                continue;
            }

            for (a, action) in state.actions.iter().enumerate() {
                let pi = policy.prob(key, ActionId::from(a));
                rewards[s] += pi * action.reward;
                for outcome in &action.outcomes {
                    transitions[s][outcome.next.index()] += pi * outcome.prob;
                }
            }
        }

        let mrp = Mrp::new(transitions, rewards, gamma)?.with_labels(self.state_ids.clone())?;
        Ok(mrp)
    }
}

/// Inverse-CDF lookup: the first entry whose cumulative mass exceeds `sample`.
///
/// When rounding or an under-filled row leaves `sample` above the total mass, the last
/// entry with non-zero mass is chosen. Returns `None` if no entry has mass.
pub(crate) fn sample_cdf(cdf: &[f64], sample: f64) -> Option<usize> {
    let chosen = cdf.partition_point(|p| *p <= sample);
    if chosen < cdf.len() {
        return Some(chosen);
    }

    let mut previous = 0.0;
    let mut fallback = None;
    for (idx, &cumulative) in cdf.iter().enumerate() {
        if cumulative > previous {
            fallback = Some(idx);
        }
        previous = cumulative;
    }
    fallback
}
