use std::path::PathBuf;

use bellkit_core::{ValueTable, every_visit_monte_carlo};
use bellkit_mdp::{
    CompiledPolicy, TrajectorySampler, compile_yaml, describe_episode, load_policy_yaml,
    seeded_source,
};

fn main() {
    let mut args = std::env::args().skip(1);
    let mdp_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/bellkit-mdp/data/student.mdp.yaml"));

    let mdp = compile_yaml(&mdp_path).expect("failed to compile MDP YAML");
    let policy = match args.next() {
        Some(path) => load_policy_yaml(path)
            .and_then(|spec| spec.compile(&mdp))
            .expect("failed to compile policy YAML"),
        None => CompiledPolicy::uniform(&mdp),
    };

    let sampler = TrajectorySampler::new(&mdp, &policy).expect("policy does not fit MDP");
    let episodes = sampler.sample(&mut seeded_source(12345), 20, 1000);

    for episode in episodes.iter().take(3) {
        println!("{}", describe_episode(&mdp, episode));
    }

    let mut table = ValueTable::new(mdp.state_count());
    every_visit_monte_carlo(&episodes, &mut table, 0.5).expect("episode states are in range");
    for (idx, value) in table.values().iter().enumerate() {
        let state = bellkit_core::StateKey::from(idx);
        println!("{}={value:.6}", mdp.state_id(state).unwrap_or("?"));
    }
}
