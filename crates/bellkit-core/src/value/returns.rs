use crate::value::ids::StateKey;

/// Discounted return of a state chain read from `start_index` to its end.
///
/// Folds backward with `G <- reward(s) + gamma * G`, so the result equals
/// `sum_k gamma^k * reward(chain[start_index + k])` without computing powers of gamma.
/// A `start_index` at or past the end of the chain yields `0.0`.
///
/// # Panics
///
/// Panics if a state in the chain has no entry in `rewards`.
pub fn compute_return(chain: &[StateKey], rewards: &[f64], gamma: f64, start_index: usize) -> f64 {
    chain
        .iter()
        .skip(start_index)
        .rev()
        .fold(0.0, |g, state| rewards[state.index()] + gamma * g)
}
