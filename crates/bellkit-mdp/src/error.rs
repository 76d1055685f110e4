use bellkit_core::ValueError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for MDP and policy loading, validation, compilation, and sampling.
pub enum MdpError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("MDP must declare at least one state")]
    NoStates,

    #[error("duplicate state id '{id}'")]
    DuplicateStateId { id: String },

    #[error("duplicate action id '{action}' in state '{state}'")]
    DuplicateActionId { state: String, action: String },

    #[error("state '{state}' is terminal and cannot declare actions")]
    TerminalStateHasActions { state: String },

    #[error("outcome in state '{state}', action '{action}' references unknown next state '{next}'")]
    UnknownNextState {
        state: String,
        action: String,
        next: String,
    },

    #[error("state '{state}', action '{action}' lists next state '{next}' more than once")]
    DuplicateOutcome {
        state: String,
        action: String,
        next: String,
    },

    #[error(
        "invalid probability in state '{state}', action '{action}', outcome {outcome_index}: {value}"
    )]
    InvalidProbability {
        state: String,
        action: String,
        outcome_index: usize,
        value: f64,
    },

    #[error("invalid reward in state '{state}', action '{action}': {value}")]
    InvalidReward {
        state: String,
        action: String,
        value: f64,
    },

    #[error(
        "probability sum for state '{state}', action '{action}' must be within {tolerance} of 1.0, got {sum}"
    )]
    ProbabilitySum {
        state: String,
        action: String,
        sum: f64,
        tolerance: f64,
    },

    #[error("state '{state}' action '{action}' must contain at least one outcome")]
    EmptyOutcomes { state: String, action: String },

    #[error("policy references unknown state '{state}'")]
    PolicyUnknownState { state: String },

    #[error("policy references unknown action '{action}' in state '{state}'")]
    PolicyUnknownAction { state: String, action: String },

    #[error("policy lists state '{state}', action '{action}' more than once")]
    PolicyDuplicateEntry { state: String, action: String },

    #[error("invalid policy probability for state '{state}', action '{action}': {value}")]
    PolicyInvalidProbability {
        state: String,
        action: String,
        value: f64,
    },

    #[error(
        "policy probabilities for state '{state}' must be within {tolerance} of 1.0, got {sum}"
    )]
    PolicyProbabilitySum {
        state: String,
        sum: f64,
        tolerance: f64,
    },

    #[error("policy covers {policy_states} states but the MDP has {mdp_states}")]
    PolicyMismatch {
        policy_states: usize,
        mdp_states: usize,
    },

    #[error("MDP has no non-terminal state to start an episode from")]
    NoStartCandidates,

    #[error("builder referenced unknown state '{state}'")]
    BuilderUnknownState { state: String },

    #[error("builder referenced unknown action '{action}' in state '{state}'")]
    BuilderUnknownAction { state: String, action: String },
}
