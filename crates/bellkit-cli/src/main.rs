use std::{fs, path::PathBuf};

use anyhow::Context;
use bellkit_core::EvaluationConfig;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scenarios;

use scenarios::{MdpOptions, MrpOptions, Report};

#[derive(Parser)]
#[command(name = "bellkit")]
#[command(about = "Returns, Bellman values, Monte Carlo estimates, and occupancy for small MRPs/MDPs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Evaluation config YAML (defaults to the bundled config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the config seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Write a JSON report of the results to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discounted return of a state chain and analytic values of an MRP
    Mrp {
        /// MRP YAML (defaults to the bundled six-state model)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Comma separated state labels, e.g. s1,s2,s3,s6
        #[arg(long, value_delimiter = ',')]
        chain: Option<Vec<String>>,
        #[arg(long, default_value_t = 0)]
        start_index: usize,
    },
    /// Analytic values, sampled episodes, Monte Carlo values, and occupancy of an MDP
    Mdp {
        /// MDP YAML (defaults to the bundled student MDP)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Policy YAML evaluated against the MDP
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Second policy YAML whose occupancy is compared with the first
        #[arg(long)]
        compare_policy: Option<PathBuf>,
        #[arg(long)]
        target_state: Option<String>,
        #[arg(long)]
        target_action: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<EvaluationConfig> {
    let mut config = match &cli.config {
        Some(path) => EvaluationConfig::from_yaml_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EvaluationConfig::from_default_yaml()?,
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    let report = match cli.command {
        Commands::Mrp {
            model,
            chain,
            start_index,
        } => Report::Mrp(scenarios::run_mrp(MrpOptions {
            model,
            chain,
            start_index,
        })?),
        Commands::Mdp {
            model,
            policy,
            compare_policy,
            target_state,
            target_action,
        } => Report::Mdp(scenarios::run_mdp(
            &config,
            MdpOptions {
                model,
                policy,
                compare_policy,
                target_state,
                target_action,
            },
        )?),
    };

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    Ok(())
}
