use crate::value::{
    episode::{Episode, Step},
    error::ValueError,
    ids::{ActionId, StateKey},
    monte_carlo::every_visit_monte_carlo,
    stats::ValueTable,
};

fn step(state: usize, reward: f64, next: usize) -> Step {
    Step::new(
        StateKey::from(state),
        ActionId::from(0),
        reward,
        StateKey::from(next),
    )
}

#[test]
fn every_visit_updates_each_occurrence() {
    // s0 is visited twice; returns at those steps are 1 + 0.5 * (2 + 0.5 * 4) = 3 and 4.
    let episode = Episode::new(vec![step(0, 1.0, 1), step(1, 2.0, 0), step(0, 4.0, 2)], true);
    let mut table = ValueTable::new(3);

    table.update(&episode, 0.5).expect("states in range");

    assert_eq!(table.visits(StateKey::from(0)), Some(2));
    assert_eq!(table.visits(StateKey::from(1)), Some(1));
    assert_eq!(table.visits(StateKey::from(2)), Some(0));
    assert!((table.value(StateKey::from(0)).unwrap_or_default() - 3.5).abs() < 1e-12);
    assert!((table.value(StateKey::from(1)).unwrap_or_default() - 4.0).abs() < 1e-12);
    assert_eq!(table.value(StateKey::from(2)), Some(0.0));
}

#[test]
fn batch_matches_mean_of_observed_returns() {
    let episodes = vec![
        Episode::new(vec![step(1, -3.0, 0), step(0, -2.0, 2)], true),
        Episode::new(vec![step(1, -1.0, 2)], true),
        Episode::new(vec![step(0, 5.0, 2)], false),
    ];
    let mut table = ValueTable::new(3);

    every_visit_monte_carlo(&episodes, &mut table, 0.9).expect("states in range");

    // s1 returns: -3 + 0.9 * -2 = -4.8 and -1.
    let s1 = table.value(StateKey::from(1)).unwrap_or_default();
    assert!((s1 - (-4.8 + -1.0) / 2.0).abs() < 1e-12);
    // s0 returns: -2 and 5.
    let s0 = table.value(StateKey::from(0)).unwrap_or_default();
    assert!((s0 - 1.5).abs() < 1e-12);
}

#[test]
fn out_of_range_state_leaves_table_untouched() {
    let episode = Episode::new(vec![step(0, 1.0, 1), step(7, 1.0, 1)], false);
    let mut table = ValueTable::new(2);

    let err = table.update(&episode, 0.5).expect_err("state 7 is out of range");

    assert!(matches!(
        err,
        ValueError::StateOutOfRange { state_count: 2, .. }
    ));
    assert_eq!(table, ValueTable::new(2));
}

#[test]
fn empty_episode_is_a_no_op() {
    let mut table = ValueTable::new(2);
    table.update(&Episode::default(), 0.5).expect("nothing to record");
    assert_eq!(table.values(), vec![0.0, 0.0]);
}

#[test]
fn snapshot_lists_every_state() {
    let mut table = ValueTable::new(2);
    table.record(StateKey::from(1), 2.0).expect("in range");

    let snapshot = table.snapshot();
    assert_eq!(snapshot.states.len(), 2);
    assert_eq!(snapshot.states[1].visits, 1);
    assert_eq!(snapshot.states[1].value, 2.0);
}

#[test]
fn first_state_estimate_equals_episode_return() {
    let episode = Episode::new(vec![step(0, 1.0, 1), step(1, -2.0, 2), step(2, 8.0, 2)], true);
    let mut table = ValueTable::new(3);
    table.update(&episode, 0.9).expect("states in range");

    let expected = episode.discounted_return(0, 0.9);
    assert!((expected - (1.0 - 1.8 + 0.81 * 8.0)).abs() < 1e-12);
    assert!((table.value(StateKey::from(0)).unwrap_or_default() - expected).abs() < 1e-12);
    assert!((episode.discounted_return(2, 0.9) - 8.0).abs() < 1e-12);
}
