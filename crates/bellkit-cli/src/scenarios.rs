use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use bellkit_core::{
    EvaluationConfig, MrpSpec, StateKey, ValueTable, ValueTableSnapshot, demo as mrp_demo,
    every_visit_monte_carlo, occupancy,
};
use bellkit_mdp::{
    CompiledMdp, CompiledPolicy, TrajectorySampler, compile_yaml, demo as mdp_demo,
    describe_episode, load_policy_yaml, seeded_source,
};
use serde::Serialize;
use tracing::info;

/// Episodes sampled up front to show what trajectories look like.
const PREVIEW_EPISODES: usize = 5;

#[derive(Debug, Serialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Report {
    Mrp(MrpReport),
    Mdp(MdpReport),
}

#[derive(Debug, Serialize)]
pub struct LabeledValue {
    pub state: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct MrpReport {
    pub gamma: f64,
    pub chain: Vec<String>,
    pub start_index: usize,
    pub chain_return: f64,
    pub values: Vec<LabeledValue>,
}

#[derive(Debug, Serialize)]
pub struct OccupancyReport {
    pub policy: String,
    pub state: String,
    pub action: String,
    pub rho: f64,
}

#[derive(Debug, Serialize)]
pub struct MdpReport {
    pub config: EvaluationConfig,
    pub policy: String,
    pub analytic: Vec<LabeledValue>,
    pub preview: Vec<String>,
    pub monte_carlo: ValueTableSnapshot,
    pub occupancy: Vec<OccupancyReport>,
}

pub struct MrpOptions {
    pub model: Option<PathBuf>,
    pub chain: Option<Vec<String>>,
    pub start_index: usize,
}

pub struct MdpOptions {
    pub model: Option<PathBuf>,
    pub policy: Option<PathBuf>,
    pub compare_policy: Option<PathBuf>,
    pub target_state: Option<String>,
    pub target_action: Option<String>,
}

/// Return of one chain plus the closed-form value of every state.
pub fn run_mrp(options: MrpOptions) -> anyhow::Result<MrpReport> {
    let spec = match &options.model {
        Some(path) => MrpSpec::load_yaml(path)
            .with_context(|| format!("loading MRP {}", path.display()))?,
        None => mrp_demo::six_state_mrp_spec()?,
    };
    let mrp = spec.compile()?;

    let chain = options.chain.unwrap_or_else(|| {
        mrp_demo::SIX_STATE_CHAIN
            .iter()
            .map(|label| label.to_string())
            .collect()
    });
    let keys = chain
        .iter()
        .map(|label| mrp.state_key(label))
        .collect::<Result<Vec<_>, _>>()?;
    let chain_return = mrp.compute_return(&keys, options.start_index)?;
    info!(
        "return of chain {} from index {}: {chain_return}",
        chain.join(" -> "),
        options.start_index
    );

    let values: Vec<LabeledValue> = mrp
        .solve()?
        .into_iter()
        .enumerate()
        .map(|(i, value)| LabeledValue {
            state: mrp.label(StateKey::from(i)).unwrap_or("?").to_string(),
            value,
        })
        .collect();
    for v in &values {
        info!("MRP value V({}) = {:.6}", v.state, v.value);
    }

    Ok(MrpReport {
        gamma: mrp.gamma(),
        chain,
        start_index: options.start_index,
        chain_return,
        values,
    })
}

/// Analytic solve of the policy-induced MRP, sampled previews, every-visit Monte Carlo,
/// and the occupancy of one `(state, action)` pair under each policy.
pub fn run_mdp(config: &EvaluationConfig, options: MdpOptions) -> anyhow::Result<MdpReport> {
    let bundled = options.model.is_none();
    let mdp = match &options.model {
        Some(path) => {
            compile_yaml(path).with_context(|| format!("loading MDP {}", path.display()))?
        }
        None => mdp_demo::student_mdp()?,
    };

    let policy = match &options.policy {
        Some(path) => load_policy(&mdp, path)?,
        None if bundled => mdp_demo::random_policy(&mdp)?,
        None => CompiledPolicy::uniform(&mdp),
    };
    let compare = match &options.compare_policy {
        Some(path) => Some(load_policy(&mdp, path)?),
        None if bundled => Some(mdp_demo::biased_policy(&mdp)?),
        None => None,
    };
    let policy_name = policy.name().unwrap_or("policy").to_string();

    let mrp = mdp.induced_mrp(&policy, config.gamma)?;
    let analytic: Vec<LabeledValue> = mrp
        .solve()?
        .into_iter()
        .enumerate()
        .map(|(i, value)| LabeledValue {
            state: mdp.state_id(StateKey::from(i)).unwrap_or("?").to_string(),
            value,
        })
        .collect();
    for v in &analytic {
        info!("analytic V({}) = {:.6} under {policy_name}", v.state, v.value);
    }

    let mut source = seeded_source(config.seed);
    let sampler = TrajectorySampler::new(&mdp, &policy)?;

    let preview: Vec<String> = sampler
        .sample(&mut source, config.max_steps, PREVIEW_EPISODES)
        .iter()
        .map(|episode| describe_episode(&mdp, episode))
        .collect();
    for (i, line) in preview.iter().enumerate() {
        info!("episode {}: {line}", i + 1);
    }

    let episodes = sampler.sample(&mut source, config.max_steps, config.episodes);
    let mut table = ValueTable::new(mdp.state_count());
    every_visit_monte_carlo(&episodes, &mut table, config.gamma)?;
    for (i, value) in table.values().iter().enumerate() {
        let key = StateKey::from(i);
        info!(
            "monte carlo V({}) = {value:.6} over {} visits",
            mdp.state_id(key).unwrap_or("?"),
            table.visits(key).unwrap_or(0)
        );
    }

    let (default_state, default_action) = mdp_demo::OCCUPANCY_TARGET;
    let target_state = options
        .target_state
        .unwrap_or_else(|| default_state.to_string());
    let target_action = options
        .target_action
        .unwrap_or_else(|| default_action.to_string());
    let state = mdp
        .state_key(&target_state)
        .ok_or_else(|| anyhow!("occupancy target state '{target_state}' not found"))?;
    let action = mdp.action_key(state, &target_action).ok_or_else(|| {
        anyhow!("occupancy target action '{target_action}' not found in '{target_state}'")
    })?;

    let mut occupancy_reports = Vec::new();
    for candidate in std::iter::once(&policy).chain(compare.as_ref()) {
        let sampler = TrajectorySampler::new(&mdp, candidate)?;
        let episodes = sampler.sample(
            &mut source,
            config.occupancy_max_steps,
            config.occupancy_episodes,
        );
        let rho = occupancy(
            &episodes,
            state,
            action,
            config.occupancy_max_steps,
            config.gamma,
        );
        let name = candidate.name().unwrap_or("policy").to_string();
        info!("occupancy of ({target_state}, {target_action}) under {name}: {rho:.6}");
        occupancy_reports.push(OccupancyReport {
            policy: name,
            state: target_state.clone(),
            action: target_action.clone(),
            rho,
        });
    }

    Ok(MdpReport {
        config: config.clone(),
        policy: policy_name,
        analytic,
        preview,
        monte_carlo: table.snapshot(),
        occupancy: occupancy_reports,
    })
}

fn load_policy(mdp: &CompiledMdp, path: &Path) -> anyhow::Result<CompiledPolicy> {
    let policy = load_policy_yaml(path)
        .and_then(|spec| spec.compile(mdp))
        .with_context(|| format!("loading policy {}", path.display()))?;
    Ok(policy)
}
