//! Training system that evolves network genomes with a genetic algorithm.
//!
//! The crate is independent of the game: a genome is a plain `Vec<f64>` and fitness comes
//! from a caller-supplied closure. The CLI wires it to `asteroids-evaluator` by building a
//! network from each genome and playing headless games with it.
//!
//! # How Training Works
//!
//! 1. **Population** - random genomes drawn from `N(0, 0.5)`
//! 2. **Evaluation** - every genome is scored once per generation, in parallel
//! 3. **Selection** - elites are kept, parents are picked by tournament
//! 4. **Reproduction** - blend crossover and Gaussian mutation produce the rest
//! 5. **Repeat** - the best-ever genome is kept across generations for export
//!
//! # Modules
//!
//! - [`genetic`] - [`GeneticAlgorithm`](genetic::GeneticAlgorithm) and its configuration
//! - [`genome`] - crossover, mutation and initialization operators
//! - [`stats`] - fitness summaries for progress reporting
//!
//! # Current Limitations
//!
//! - **Fixed parameters**: mutation rate and scale stay constant over a run
//! - **Noisy fitness**: each evaluation plays freshly seeded games, so elites are
//!   re-scored every generation and their fitness can drop

pub mod genetic;
pub mod genome;
pub mod stats;
