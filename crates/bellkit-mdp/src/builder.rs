use crate::{
    ActionSpec, CompiledMdp, CompiledPolicy, MdpError, MdpSpec, OutcomeSpec, PolicyEntrySpec,
    PolicySpec, StateSpec,
};

#[derive(Debug, Clone, Default)]
/// Struct to build MDPs
pub struct MdpBuilder {
    states: Vec<StateSpec>,
}

impl MdpBuilder {
    /// Create a new MDPBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new state
    /// Terminal flag if this state ends an episode
    pub fn add_state(&mut self, id: impl Into<String>, terminal: bool) -> &mut Self {
        self.states.push(StateSpec {
            id: id.into(),
            terminal: Some(terminal),
            actions: Some(Vec::new()),
        });
        self
    }

    /// Add an action with its immediate reward to a state
    pub fn add_action(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl Into<String>,
        reward: f64,
    ) -> Result<&mut Self, MdpError> {
        let state_id = state_id.as_ref();
        let action_id = action_id.into();

        let state = self
            .states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| MdpError::BuilderUnknownState {
                state: state_id.to_string(),
            })?;

        let actions = state.actions.get_or_insert_with(Vec::new);
        actions.push(ActionSpec {
            id: action_id,
            reward,
            outcomes: Vec::new(),
        });

        Ok(self)
    }

    /// Add an outcome to an action
    /// Action can be stochastic so each successor gets its own probability
    pub fn add_outcome(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl AsRef<str>,
        next: impl Into<String>,
        prob: f64,
    ) -> Result<&mut Self, MdpError> {
        let state_id = state_id.as_ref();
        let action_id = action_id.as_ref();

        let state = self
            .states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| MdpError::BuilderUnknownState {
                state: state_id.to_string(),
            })?;

        let actions = state.actions.get_or_insert_with(Vec::new);
        let action = actions
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or_else(|| MdpError::BuilderUnknownAction {
                state: state_id.to_string(),
                action: action_id.to_string(),
            })?;

        action.outcomes.push(OutcomeSpec {
            next: next.into(),
            prob,
        });

        Ok(self)
    }

    pub fn build_spec(self) -> Result<MdpSpec, MdpError> {
        let spec = MdpSpec {
            version: Some(1),
            states: self.states,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<CompiledMdp, MdpError> {
        let spec = self.build_spec()?;
        spec.compile()
    }
}

#[derive(Debug, Clone, Default)]
/// Struct to build policies entry by entry
pub struct PolicyBuilder {
    name: Option<String>,
    entries: Vec<PolicyEntrySpec>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Set the probability of choosing `action_id` in `state_id`
    /// References are resolved when the policy is compiled against an MDP
    pub fn set_prob(
        &mut self,
        state_id: impl Into<String>,
        action_id: impl Into<String>,
        prob: f64,
    ) -> &mut Self {
        self.entries.push(PolicyEntrySpec {
            state: state_id.into(),
            action: action_id.into(),
            prob,
        });
        self
    }

    pub fn build_spec(self) -> PolicySpec {
        PolicySpec {
            version: Some(1),
            name: self.name,
            entries: self.entries,
        }
    }

    pub fn compile(self, mdp: &CompiledMdp) -> Result<CompiledPolicy, MdpError> {
        self.build_spec().compile(mdp)
    }
}
