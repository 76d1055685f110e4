use serde::Serialize;

use crate::value::{episode::Episode, error::ValueError, ids::StateKey};

/// Running mean of the returns observed for one state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisitStats {
    visits: u64,
    value: f64,
}

impl VisitStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve how many returns have been folded into the estimate.
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Current estimate, `0.0` until the first visit.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Fold one observed return in with `V <- V + (G - V) / N`.
    pub fn record(&mut self, observed_return: f64) {
        self.visits += 1;
        self.value += (observed_return - self.value) / self.visits as f64;
    }
}

/// Value and visit-count tables indexed by state.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    stats: Vec<VisitStats>,
}

impl ValueTable {
    /// Create a table with every state unvisited and valued at zero.
    pub fn new(state_count: usize) -> Self {
        ValueTable {
            stats: vec![VisitStats::new(); state_count],
        }
    }

    pub fn state_count(&self) -> usize {
        self.stats.len()
    }

    pub fn stats(&self, state: StateKey) -> Option<&VisitStats> {
        self.stats.get(state.index())
    }

    pub fn value(&self, state: StateKey) -> Option<f64> {
        self.stats(state).map(VisitStats::value)
    }

    pub fn visits(&self, state: StateKey) -> Option<u64> {
        self.stats(state).map(VisitStats::visits)
    }

    /// All current estimates in state order.
    pub fn values(&self) -> Vec<f64> {
        self.stats.iter().map(VisitStats::value).collect()
    }

    /// Record a single return for `state`.
    pub fn record(&mut self, state: StateKey, observed_return: f64) -> Result<(), ValueError> {
        let state_count = self.stats.len();
        let stats = self
            .stats
            .get_mut(state.index())
            .ok_or(ValueError::StateOutOfRange { state, state_count })?;
        stats.record(observed_return);
        Ok(())
    }

    /// Every-visit Monte Carlo update from one episode.
    ///
    /// Walks the steps backward accumulating `G <- reward + gamma * G` and records `G`
    /// for the state of every step, so repeated states are updated once per occurrence.
    /// The episode is checked against the table size before anything is recorded.
    pub fn update(&mut self, episode: &Episode, gamma: f64) -> Result<(), ValueError> {
        let state_count = self.stats.len();
        if let Some(step) = episode
            .steps()
            .iter()
            .find(|step| step.state.index() >= state_count)
        {
            return Err(ValueError::StateOutOfRange {
                state: step.state,
                state_count,
            });
        }

        let mut g = 0.0;
        for step in episode.steps().iter().rev() {
            g = step.reward + gamma * g;
            self.stats[step.state.index()].record(g);
        }
        Ok(())
    }

    /// Serializable view of the table.
    pub fn snapshot(&self) -> ValueTableSnapshot {
        ValueTableSnapshot {
            states: self
                .stats
                .iter()
                .enumerate()
                .map(|(state, stats)| StateValueSnapshot {
                    state,
                    visits: stats.visits,
                    value: stats.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueTableSnapshot {
    pub states: Vec<StateValueSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateValueSnapshot {
    pub state: usize,
    pub visits: u64,
    pub value: f64,
}
