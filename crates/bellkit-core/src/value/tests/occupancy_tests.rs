use crate::value::{
    episode::{Episode, Step},
    ids::{ActionId, StateKey},
    occupancy::{OccupancyCounts, occupancy},
};

fn step(state: usize, action: usize) -> Step {
    Step::new(
        StateKey::from(state),
        ActionId::from(action),
        0.0,
        StateKey::from(state),
    )
}

fn episodes() -> Vec<Episode> {
    vec![
        Episode::new(vec![step(0, 1), step(1, 0), step(0, 1)], false),
        Episode::new(vec![step(0, 0)], true),
    ]
}

#[test]
fn tally_counts_per_time_step() {
    let counts = OccupancyCounts::tally(&episodes(), StateKey::from(0), ActionId::from(1), 4);

    assert_eq!(counts.horizon(), 4);
    assert_eq!(counts.total_times(), &[2, 1, 1, 0]);
    assert_eq!(counts.occur_times(), &[1, 0, 1, 0]);
}

#[test]
fn measure_skips_unvisited_time_steps() {
    let rho = occupancy(&episodes(), StateKey::from(0), ActionId::from(1), 4, 0.5);

    // (1 - 0.5) * (1/2 + 0.25 * 1/1)
    assert!((rho - 0.375).abs() < 1e-12);
    assert!(rho.is_finite());
}

#[test]
fn steps_past_horizon_are_ignored() {
    let counts = OccupancyCounts::tally(&episodes(), StateKey::from(0), ActionId::from(1), 1);
    assert_eq!(counts.total_times(), &[2]);
    assert_eq!(counts.occur_times(), &[1]);
}

#[test]
fn no_episodes_yields_zero() {
    let rho = occupancy(&[], StateKey::from(0), ActionId::from(0), 10, 0.5);
    assert_eq!(rho, 0.0);
}

#[test]
fn pair_taken_at_every_step_saturates() {
    let always = vec![Episode::new(vec![step(0, 0); 50], false)];
    let rho = occupancy(&always, StateKey::from(0), ActionId::from(0), 50, 0.5);

    // 1 - gamma^50
    assert!((rho - 1.0).abs() < 1e-12);
}
