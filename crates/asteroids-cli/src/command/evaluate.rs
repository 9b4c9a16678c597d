use std::path::PathBuf;

use anyhow::ensure;
use asteroids_evaluator::{
    agent::NeuralAgent,
    observation::OBSERVATION_SIZE,
    simulation::{run_simulation, run_simulation_with_rng},
};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;
use tracing::info;

use crate::{
    schema::evaluation_report::EvaluationReport,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Network file written by `train`
    #[arg(long, default_value = "weights.bin")]
    weights: PathBuf,
    /// Games to play and average [default: 3]
    #[arg(long)]
    runs: Option<usize>,
    /// Tick cap per game [default: 3600]
    #[arg(long)]
    max_ticks: Option<usize>,
    /// Output activation above which a button is pressed
    #[arg(long, default_value_t = NeuralAgent::DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file overriding simulation and fitness parameters
    #[arg(long)]
    sim_config: Option<PathBuf>,
    /// Write the JSON result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        weights,
        runs,
        max_ticks,
        threshold,
        seed,
        sim_config,
        output,
    } = arg;

    let network = util::read_network_file(weights)?;
    ensure!(
        network.input_size() == OBSERVATION_SIZE && network.output_size() == 5,
        "network {} does not map {OBSERVATION_SIZE} observations to 5 actions",
        util::format_layers(network.layers())
    );
    info!(
        "Loaded network {} from {}",
        util::format_layers(network.layers()),
        weights.display()
    );

    let sim_config = util::load_sim_config(sim_config.as_deref(), *max_ticks, *runs)?;
    let layers = network.layers().to_vec();
    let agent = NeuralAgent::with_threshold(network, *threshold);

    let result = match seed {
        Some(seed) => {
            run_simulation_with_rng(&agent, &sim_config, &mut Pcg64Mcg::seed_from_u64(*seed))
        }
        None => run_simulation(&agent, &sim_config),
    };
    info!(
        "Score: {:.1} | Ticks: {:.1} | Fitness: {:.1} (mean of {} runs)",
        result.score,
        result.ticks,
        result.fitness,
        sim_config.num_runs.max(1)
    );

    let report = EvaluationReport {
        weights_path: weights.clone(),
        layers,
        threshold: *threshold,
        sim_config,
        result,
    };
    Output::save_json(&report, output.clone())?;

    Ok(())
}
