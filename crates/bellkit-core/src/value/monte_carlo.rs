use tracing::debug;

use crate::value::{episode::Episode, error::ValueError, stats::ValueTable};

/// Run every-visit Monte Carlo over a batch of episodes, updating `table` in place.
///
/// Episodes are applied in order. An episode naming a state outside the table stops the
/// batch with [`ValueError::StateOutOfRange`]; episodes before it stay applied.
pub fn every_visit_monte_carlo(
    episodes: &[Episode],
    table: &mut ValueTable,
    gamma: f64,
) -> Result<(), ValueError> {
    for episode in episodes {
        table.update(episode, gamma)?;
    }

    debug!(
        episodes = episodes.len(),
        states = table.state_count(),
        gamma,
        "applied every-visit monte carlo batch"
    );
    Ok(())
}
