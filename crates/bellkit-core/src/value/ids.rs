use serde::{Deserialize, Serialize};

/// Dense index of a state inside a model's state table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(usize);

impl StateKey {
    /// Return the underlying state index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for StateKey {
    /// Allow for explicit conversion from usize to StateKey.
    fn from(value: usize) -> Self {
        StateKey(value)
    }
}

/// Index of an action within the action list of its state.
///
/// Action ids are local to a state: `(s1, ActionId(0))` and `(s2, ActionId(0))`
/// name different actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(usize);

impl ActionId {
    /// Get the position of the action in its state's action list.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ActionId {
    /// Allow for explicit conversion from usize to ActionId.
    fn from(value: usize) -> Self {
        ActionId(value)
    }
}
