use std::{path::PathBuf, time::Instant};

use anyhow::ensure;
use asteroids_evaluator::{
    agent::NeuralAgent,
    network::Network,
    observation::OBSERVATION_SIZE,
    simulation::run_simulation,
};
use asteroids_training::genetic::{GaConfig, GeneticAlgorithm};
use chrono::Utc;
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;
use tracing::info;

use crate::{
    schema::training_report::{GenerationRecord, TrainingReport},
    util::{self, LayerWidths, Output},
};

const OUTPUT_COUNT: usize = 5;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of generations to train
    #[arg(long, default_value_t = 200)]
    generations: usize,
    /// Population size
    #[arg(long, default_value_t = 300)]
    population: usize,
    /// Parallel evaluations (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// Games per genome evaluation, averaged [default: 3]
    #[arg(long)]
    runs: Option<usize>,
    /// Tick cap per game [default: 3600]
    #[arg(long)]
    max_ticks: Option<usize>,
    /// Hidden layer widths, comma-separated (e.g. 16 or 20,10)
    #[arg(long, default_value = "16")]
    hidden: LayerWidths,
    /// Output file for the best-ever network
    #[arg(long, default_value = "weights.bin")]
    output: PathBuf,
    /// Seed for the genetic algorithm (games are always freshly seeded)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file overriding simulation and fitness parameters
    #[arg(long)]
    sim_config: Option<PathBuf>,
    /// Write a JSON training report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        generations,
        population,
        workers,
        runs,
        max_ticks,
        hidden,
        output,
        seed,
        sim_config,
        report,
    } = arg;
    ensure!(*generations > 0, "at least one generation is required");
    ensure!(*population > 0, "population must not be empty");

    let sim_config = util::load_sim_config(sim_config.as_deref(), *max_ticks, *runs)?;

    let layers: Vec<usize> = [OBSERVATION_SIZE]
        .into_iter()
        .chain(hidden.0.iter().copied())
        .chain([OUTPUT_COUNT])
        .collect();
    let mut network = Network::new(&layers);
    info!(
        "Network: {} ({} parameters)",
        util::format_layers(&layers),
        network.param_count()
    );

    let defaults = GaConfig::new(network.param_count());
    let config = GaConfig {
        population_size: *population,
        elite_count: defaults.elite_count.min(*population),
        workers: if *workers > 0 {
            *workers
        } else {
            defaults.workers
        },
        ..defaults
    };
    let seed = seed.unwrap_or_else(rand::random);
    info!(
        "Population: {}, Generations: {generations}, Workers: {}, Runs/eval: {}, Seed: {seed}",
        config.population_size, config.workers, sim_config.num_runs
    );

    let mut ga = GeneticAlgorithm::new(config, Pcg64Mcg::seed_from_u64(seed));
    let mut history = Vec::with_capacity(*generations);
    for generation in 0..*generations {
        let start = Instant::now();
        ga.evolve(|genome| {
            let mut network = Network::new(&layers);
            network.set_params(genome);
            let agent = NeuralAgent::new(network);
            run_simulation(&agent, &sim_config).fitness
        });
        let elapsed = start.elapsed();

        let Some(stats) = ga.fitness_stats() else {
            continue;
        };
        let best_ever_fitness = ga.best_ever().fitness();
        info!(
            "Gen {:3} | Best: {:8.1} | BestEver: {:8.1} | Avg: {:8.1} | Time: {:.1}s",
            generation + 1,
            stats.max,
            best_ever_fitness,
            stats.mean,
            elapsed.as_secs_f64()
        );
        history.push(GenerationRecord {
            generation: generation + 1,
            fitness: stats,
            best_ever_fitness,
            elapsed_secs: elapsed.as_secs_f64(),
        });
    }

    network.set_params(ga.best_ever().genome());
    util::write_network_file(&network, output)?;
    info!("Best fitness: {:.1}", ga.best_ever().fitness());
    info!("Weights saved to {}", output.display());

    if let Some(path) = report {
        let report = TrainingReport {
            trained_at: Utc::now(),
            weights_path: output.clone(),
            layers,
            generations: *generations,
            population: *population,
            seed,
            sim_config,
            final_fitness: history.last().map_or(0.0, |r| r.fitness.max),
            best_ever_fitness: ga.best_ever().fitness(),
            history,
        };
        Output::save_json(&report, Some(path.clone()))?;
        info!("Training report saved to {}", path.display());
    }

    Ok(())
}
