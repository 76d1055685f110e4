use bellkit_core::{ValueTable, every_visit_monte_carlo, occupancy};
use bellkit_mdp::{
    CompiledPolicy, MdpError, MdpSpec, PolicySpec, SeededSource, TrajectorySampler, demo,
    seeded_source,
};

const VALID_MDP_YAML: &str = r#"
version: 1
states:
  - id: s0
    terminal: false
    actions:
      - id: a0
        reward: 1.0
        outcomes:
          - next: s1
            prob: 0.7
          - next: s0
            prob: 0.3
      - id: a1
        reward: -0.2
        outcomes:
          - next: s2
            prob: 1.0
  - id: s1
    terminal: true
  - id: s2
    terminal: false
    actions: []
"#;

#[test]
fn yaml_parse_and_compile_success() {
    let spec: MdpSpec = serde_yaml::from_str(VALID_MDP_YAML).expect("valid yaml");
    let compiled = spec.compile().expect("compile should succeed");

    assert_eq!(compiled.state_count(), 3);
    let s0 = compiled.state_key("s0").expect("s0 exists");
    let s1 = compiled.state_key("s1").expect("s1 exists");
    let a0 = compiled.action_key(s0, "a0").expect("a0 exists");

    assert_eq!(compiled.state_id(s0), Some("s0"));
    assert_eq!(compiled.action_id(s0, a0), Some("a0"));
    assert_eq!(compiled.reward(s0, a0), 1.0);
    assert_eq!(compiled.transition_prob(s0, a0, s1), 0.7);
    let s2 = compiled.state_key("s2").expect("s2 exists");
    assert_eq!(compiled.transition_prob(s0, a0, s2), 0.0);
    assert_eq!(compiled.is_terminal(s1), Some(true));
    assert_eq!(compiled.start_candidates().len(), 2);
}

#[test]
fn validation_fails_for_probability_sum() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        reward: 1.0
        outcomes:
          - next: s0
            prob: 0.9
"#;

    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");
    assert!(matches!(err, MdpError::ProbabilitySum { .. }));

    // A loose tolerance admits the short row.
    let compiled = spec
        .compile_with_tolerance(0.2)
        .expect("tolerance covers the gap");
    assert_eq!(compiled.state_count(), 1);
}

#[test]
fn validation_fails_for_unknown_state_reference() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: missing
            prob: 1.0
"#;

    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");

    assert!(matches!(err, MdpError::UnknownNextState { .. }));
}

#[test]
fn validation_fails_for_repeated_outcome() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 0.5
          - next: s0
            prob: 0.5
"#;

    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");

    assert!(matches!(err, MdpError::DuplicateOutcome { .. }));
}

#[test]
fn validation_fails_for_terminal_state_with_actions() {
    let yaml = r#"
states:
  - id: s0
    terminal: true
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 1.0
"#;

    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");

    assert!(matches!(err, MdpError::TerminalStateHasActions { .. }));
}

#[test]
fn empty_model_is_rejected() {
    let spec: MdpSpec = serde_yaml::from_str("states: []").expect("valid syntax");
    assert!(matches!(spec.compile(), Err(MdpError::NoStates)));
}

#[test]
fn sampling_is_deterministic_for_fixed_seed() {
    let mdp = demo::student_mdp().expect("bundled mdp compiles");
    let policy = demo::random_policy(&mdp).expect("bundled policy compiles");
    let sampler = TrajectorySampler::new(&mdp, &policy).expect("compatible");

    let run_a = sampler.sample(&mut seeded_source(0), 20, 100);
    let run_b = sampler.sample(&mut seeded_source(0), 20, 100);

    assert_eq!(run_a, run_b);
    assert!(run_a.iter().all(|e| e.len() <= 21));
    for episode in &run_a {
        let first = episode.steps().first().expect("start state is non-terminal");
        assert_ne!(mdp.state_id(first.state), Some("s5"));
    }
}

#[test]
fn induced_mrp_matches_hand_derived_table() {
    let mdp = demo::student_mdp().expect("bundled mdp compiles");
    let policy = demo::random_policy(&mdp).expect("bundled policy compiles");
    let mrp = mdp.induced_mrp(&policy, 0.5).expect("policy rows are complete");

    let expected_rows = [
        [0.5, 0.5, 0.0, 0.0, 0.0],
        [0.5, 0.0, 0.5, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.5, 0.5],
        [0.0, 0.1, 0.2, 0.2, 0.5],
        [0.0, 0.0, 0.0, 0.0, 1.0],
    ];
    for (i, row) in expected_rows.iter().enumerate() {
        for (j, p) in row.iter().enumerate() {
            let got = mrp.transitions()[(i, j)];
            assert!((got - p).abs() < 1e-12, "P[{i}][{j}] = {got}, expected {p}");
        }
    }
    let expected_rewards = [-0.5, -1.5, -1.0, 5.5, 0.0];
    for (got, want) in mrp.rewards().iter().zip(expected_rewards) {
        assert!((got - want).abs() < 1e-12);
    }

    let values = mrp.solve().expect("gamma < 1");
    let s1 = mrp.state_key("s1").expect("labels carry over");
    assert!((values[s1.index()] - -1.2256).abs() < 1e-3);
    assert!(mrp.bellman_residual(&values).expect("dimensions match") < 1e-10);
}

#[test]
fn monte_carlo_estimates_converge_to_analytic_values() {
    let mdp = demo::student_mdp().expect("bundled mdp compiles");
    let policy = demo::random_policy(&mdp).expect("bundled policy compiles");
    let analytic = mdp
        .induced_mrp(&policy, 0.5)
        .and_then(|mrp| mrp.solve().map_err(MdpError::from))
        .expect("analytic solve succeeds");

    let sampler = TrajectorySampler::new(&mdp, &policy).expect("compatible");
    let episodes = sampler.sample(&mut seeded_source(2024), 20, 50_000);

    let mut table = ValueTable::new(mdp.state_count());
    every_visit_monte_carlo(&episodes, &mut table, 0.5).expect("states in range");

    for (state, (estimate, exact)) in table.values().iter().zip(&analytic).enumerate() {
        assert!(
            (estimate - exact).abs() < 0.15,
            "state {state}: monte carlo {estimate}, analytic {exact}"
        );
    }
}

#[test]
fn occupancy_is_bounded_and_tracks_policy_preference() {
    let mdp = demo::student_mdp().expect("bundled mdp compiles");
    let random = demo::random_policy(&mdp).expect("bundled policy compiles");
    let biased = demo::biased_policy(&mdp).expect("bundled policy compiles");
    let (state_id, action_id) = demo::OCCUPANCY_TARGET;
    let state = mdp.state_key(state_id).expect("target state exists");
    let action = mdp.action_key(state, action_id).expect("target action exists");

    let mut source = seeded_source(0);
    let rho = |policy: &CompiledPolicy, source: &mut SeededSource| {
        let sampler = TrajectorySampler::new(&mdp, policy).expect("compatible");
        let episodes = sampler.sample(source, 1000, 1000);
        occupancy(&episodes, state, action, 1000, 0.5)
    };
    let rho_random = rho(&random, &mut source);
    let rho_biased = rho(&biased, &mut source);

    for value in [rho_random, rho_biased] {
        assert!((0.0..=1.0).contains(&value));
    }
    assert!(rho_biased > rho_random);
}

#[test]
fn policy_yaml_round_trips_through_compile() {
    let mdp = demo::student_mdp().expect("bundled mdp compiles");
    let spec: PolicySpec = serde_yaml::from_str(demo::BIASED_POLICY_YAML).expect("valid yaml");
    let yaml = serde_yaml::to_string(&spec).expect("serializable");
    let reparsed: PolicySpec = serde_yaml::from_str(&yaml).expect("valid yaml");

    let policy = reparsed.compile(&mdp).expect("valid policy");
    assert_eq!(policy.name(), Some("biased"));
    let s4 = mdp.state_key("s4").expect("s4 exists");
    let drift = mdp.action_key(s4, "drift").expect("drift exists");
    assert_eq!(policy.prob(s4, drift), 0.9);
}
