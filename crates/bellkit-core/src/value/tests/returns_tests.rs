use crate::value::{ids::StateKey, returns::compute_return};

const SIX_STATE_REWARDS: [f64; 6] = [-1.0, -2.0, -2.0, 10.0, 1.0, 0.0];

fn chain(indices: &[usize]) -> Vec<StateKey> {
    indices.iter().copied().map(StateKey::from).collect()
}

#[test]
fn six_state_chain_return_matches_backward_fold() {
    let g = compute_return(&chain(&[0, 1, 2, 5]), &SIX_STATE_REWARDS, 0.5, 0);

    // -1 + 0.5 * (-2 + 0.5 * (-2 + 0.5 * 0))
    assert!((g - -2.5).abs() < 1e-12);
}

#[test]
fn start_index_skips_leading_states() {
    let g = compute_return(&chain(&[0, 1, 2, 5]), &SIX_STATE_REWARDS, 0.5, 2);
    assert!((g - -2.0).abs() < 1e-12);
}

#[test]
fn start_index_at_last_element_returns_its_reward() {
    let g = compute_return(&chain(&[0, 1, 3]), &SIX_STATE_REWARDS, 0.9, 2);
    assert!((g - 10.0).abs() < 1e-12);
}

#[test]
fn start_index_past_end_returns_zero() {
    let g = compute_return(&chain(&[0, 1]), &SIX_STATE_REWARDS, 0.5, 2);
    assert_eq!(g, 0.0);
}

#[test]
fn undiscounted_return_is_plain_sum() {
    let g = compute_return(&chain(&[3, 4, 3]), &SIX_STATE_REWARDS, 1.0, 0);
    assert!((g - 21.0).abs() < 1e-12);
}
