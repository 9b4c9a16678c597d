//! Neural control and fitness evaluation for the asteroids simulation.
//!
//! This crate holds everything between a flat genome and a fitness score:
//!
//! 1. **Network** ([`network`]) - a fixed-topology feed-forward network whose parameters
//!    are exactly the genome evolved by `asteroids-training`.
//! 2. **Observation** ([`observation`]) - a 40-value, wrap-aware, normalized view of the
//!    world that feeds the network.
//! 3. **Agent** ([`agent`]) - thresholds network outputs into the five control buttons.
//! 4. **Simulation** ([`simulation`]) - plays headless games with an agent and turns the
//!    outcome into a scalar fitness.
//!
//! # Architecture
//!
//! ```text
//! Simulation (fitness for training)
//!     ↓ asks
//! Agent (which buttons this tick?)
//!     ↓ runs
//! Network (observation → 5 outputs in (0, 1))
//!     ↑ reads
//! Observation (World → 40 floats)
//! ```
//!
//! # Example
//!
//! ```
//! use asteroids_evaluator::{
//!     agent::NeuralAgent,
//!     network::Network,
//!     observation::OBSERVATION_SIZE,
//!     simulation::{SimConfig, run_simulation},
//! };
//!
//! let agent = NeuralAgent::new(Network::new(&[OBSERVATION_SIZE, 8, 5]));
//! let config = SimConfig { max_ticks: 60, num_runs: 1, ..SimConfig::default() };
//! let result = run_simulation(&agent, &config);
//! assert_eq!(result.ticks, 60.0);
//! ```

pub mod agent;
pub mod network;
pub mod observation;
pub mod simulation;
