use serde::Serialize;

use crate::value::{
    episode::Episode,
    ids::{ActionId, StateKey},
};

/// Per-time-step visit tallies for one target `(state, action)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyCounts {
    total_times: Vec<u64>,
    occur_times: Vec<u64>,
}

impl OccupancyCounts {
    /// Count, for each `t < horizon`, how many episodes have a step at time `t` and how
    /// many of those steps take `action` in `state`.
    ///
    /// Steps at `t >= horizon` are not counted.
    pub fn tally(
        episodes: &[Episode],
        state: StateKey,
        action: ActionId,
        horizon: usize,
    ) -> Self {
        let mut total_times = vec![0; horizon];
        let mut occur_times = vec![0; horizon];

        for episode in episodes {
            for (t, step) in episode.steps().iter().take(horizon).enumerate() {
                total_times[t] += 1;
                if step.matches(state, action) {
                    occur_times[t] += 1;
                }
            }
        }

        OccupancyCounts {
            total_times,
            occur_times,
        }
    }

    pub fn horizon(&self) -> usize {
        self.total_times.len()
    }

    pub fn total_times(&self) -> &[u64] {
        &self.total_times
    }

    pub fn occur_times(&self) -> &[u64] {
        &self.occur_times
    }

    /// `(1 - gamma) * sum_t gamma^t * occur_times[t] / total_times[t]`.
    ///
    /// Time steps no episode reached contribute nothing.
    pub fn measure(&self, gamma: f64) -> f64 {
        let rho = self
            .total_times
            .iter()
            .zip(&self.occur_times)
            .enumerate()
            .rev()
            .filter(|(_, (total, _))| **total > 0)
            .map(|(t, (&total, &occur))| gamma.powi(t as i32) * occur as f64 / total as f64)
            .sum::<f64>();
        (1.0 - gamma) * rho
    }
}

/// Estimate the discounted occupancy measure of `(state, action)` from sampled episodes.
pub fn occupancy(
    episodes: &[Episode],
    state: StateKey,
    action: ActionId,
    horizon: usize,
    gamma: f64,
) -> f64 {
    OccupancyCounts::tally(episodes, state, action, horizon).measure(gamma)
}
