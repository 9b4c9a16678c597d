use std::path::PathBuf;

use asteroids_evaluator::simulation::SimConfig;
use asteroids_training::stats::DescriptiveStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub weights_path: PathBuf,
    pub layers: Vec<usize>,
    pub generations: usize,
    pub population: usize,
    pub seed: u64,
    pub sim_config: SimConfig,
    /// Top fitness of the last evaluated generation.
    pub final_fitness: f64,
    pub best_ever_fitness: f64,
    pub history: Vec<GenerationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub fitness: DescriptiveStats,
    pub best_ever_fitness: f64,
    pub elapsed_secs: f64,
}
