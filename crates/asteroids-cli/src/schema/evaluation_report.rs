use std::path::PathBuf;

use asteroids_evaluator::simulation::{SimConfig, SimResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub weights_path: PathBuf,
    pub layers: Vec<usize>,
    pub threshold: f64,
    pub sim_config: SimConfig,
    pub result: SimResult,
}
