use serde::{Deserialize, Serialize};

use crate::value::ids::{ActionId, StateKey};

/// One sampled transition `(state, action, reward, next_state)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub state: StateKey,
    pub action: ActionId,
    pub reward: f64,
    pub next_state: StateKey,
}

impl Step {
    pub fn new(state: StateKey, action: ActionId, reward: f64, next_state: StateKey) -> Self {
        Step {
            state,
            action,
            reward,
            next_state,
        }
    }

    /// Whether this step took `action` in `state`.
    pub fn matches(&self, state: StateKey, action: ActionId) -> bool {
        self.state == state && self.action == action
    }
}

/// An ordered trajectory of steps.
///
/// `terminated` is `true` when the last step entered a terminal state and `false`
/// when sampling stopped for any other reason (step limit, dead end).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    steps: Vec<Step>,
    terminated: bool,
}

impl Episode {
    pub fn new(steps: Vec<Step>, terminated: bool) -> Self {
        Episode { steps, terminated }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Append a step to the end of the trajectory.
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Mark whether the trajectory reached a terminal state.
    pub fn set_terminated(&mut self, terminated: bool) {
        self.terminated = terminated;
    }

    /// Discounted sum of the rewards collected from `start_index` to the end.
    pub fn discounted_return(&self, start_index: usize, gamma: f64) -> f64 {
        self.steps
            .iter()
            .skip(start_index)
            .rev()
            .fold(0.0, |g, step| step.reward + gamma * g)
    }
}

impl From<Vec<Step>> for Episode {
    fn from(steps: Vec<Step>) -> Self {
        Episode::new(steps, false)
    }
}
