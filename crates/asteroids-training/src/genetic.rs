//! Genetic algorithm evolving flat network genomes.
//!
//! [`GeneticAlgorithm`] owns a population of [`Individual`]s and advances it one generation
//! per [`evolve`](GeneticAlgorithm::evolve) call. The caller supplies the fitness function;
//! this module knows nothing about networks or games.
//!
//! # Algorithm Overview
//!
//! Each generation:
//!
//! 1. **Evaluate Fitness** - every individual is scored exactly once, on up to
//!    `workers` threads at a time
//! 2. **Rank** - individuals are sorted by fitness, best first
//! 3. **Track Best-Ever** - the top individual is copied into the best-ever slot on the
//!    first generation, and afterwards only when it is strictly better
//! 4. **Elitism** - the top `elite_count` individuals are copied verbatim, fitness included
//! 5. **Reproduction** - every other slot gets a child: a tournament-selected parent,
//!    blended with a second tournament winner with probability `crossover_rate`, then
//!    Gaussian-mutated (see [`genome`](crate::genome)). Children start with fitness 0
//!
//! ## Tournament Selection
//!
//! Draws `tournament_size` individuals uniformly with replacement and keeps the first one
//! with the highest fitness.
//!
//! # Parallelization
//!
//! Evaluation uses `min(workers, population)` scoped threads that claim individuals from a
//! shared counter, so at most `workers` evaluations are in flight. All of them finish
//! before ranking starts. A panic inside the fitness function is re-raised on the calling
//! thread.
//!
//! # Ranking of NaN
//!
//! A NaN fitness ranks like negative infinity, both when sorting and in tournaments.
//!
//! # Example
//!
//! ```
//! use asteroids_training::genetic::{GaConfig, GeneticAlgorithm};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64Mcg;
//!
//! let config = GaConfig {
//!     population_size: 30,
//!     elite_count: 3,
//!     ..GaConfig::new(4)
//! };
//! let mut ga = GeneticAlgorithm::new(config, Pcg64Mcg::seed_from_u64(0));
//! for _ in 0..20 {
//!     // maximize -(x - 1)² summed over genes
//!     ga.evolve(|genome| -genome.iter().map(|x| (x - 1.0).powi(2)).sum::<f64>());
//! }
//! assert_eq!(ga.generation(), 20);
//! assert!(ga.best_ever().fitness() > -4.0);
//! ```

use std::{
    cmp::Ordering,
    num::NonZero,
    panic,
    sync::atomic::{self, AtomicUsize},
    thread,
};

use rand::Rng;
use tracing::debug;

use crate::{genome, stats::DescriptiveStats};

const INITIAL_SIGMA: f64 = 0.5;

/// Parameters of the genetic algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    pub population_size: usize,
    /// Length of every genome.
    pub genome_size: usize,
    /// Per-gene probability of Gaussian mutation.
    pub mutation_rate: f64,
    /// Standard deviation of the mutation noise.
    pub mutation_scale: f64,
    /// Individuals copied unchanged into the next generation. Must not exceed the
    /// population size.
    pub elite_count: usize,
    /// Contestants per tournament. Must be at least 1.
    pub tournament_size: usize,
    /// Probability that a child blends two parents instead of cloning one.
    pub crossover_rate: f64,
    /// Maximum concurrent fitness evaluations.
    pub workers: usize,
}

impl GaConfig {
    /// Default parameters for genomes of `genome_size` genes, with one worker per
    /// available CPU.
    #[must_use]
    pub fn new(genome_size: usize) -> Self {
        Self {
            population_size: 300,
            genome_size,
            mutation_rate: 0.10,
            mutation_scale: 0.3,
            elite_count: 20,
            tournament_size: 5,
            crossover_rate: 0.3,
            workers: thread::available_parallelism().map_or(1, NonZero::get),
        }
    }
}

/// A genome and the fitness it scored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Individual {
    genome: Vec<f64>,
    fitness: f64,
}

impl Individual {
    #[must_use]
    pub fn new(genome: Vec<f64>, fitness: f64) -> Self {
        Self { genome, fitness }
    }

    #[must_use]
    pub fn genome(&self) -> &[f64] {
        &self.genome
    }

    /// The last evaluated fitness, or 0 for a child not yet evaluated.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}

#[derive(Debug, Clone)]
pub struct GeneticAlgorithm<R> {
    config: GaConfig,
    population: Vec<Individual>,
    generation: usize,
    best_ever: Individual,
    fitness_stats: Option<DescriptiveStats>,
    rng: R,
}

impl<R> GeneticAlgorithm<R>
where
    R: Rng,
{
    /// Creates a random initial population with genes drawn from `N(0, 0.5)`.
    ///
    /// # Panics
    ///
    /// Panics if `elite_count` exceeds `population_size`.
    pub fn new(config: GaConfig, mut rng: R) -> Self {
        assert!(
            config.elite_count <= config.population_size,
            "elite count must not exceed the population size"
        );
        let population = (0..config.population_size)
            .map(|_| {
                Individual::new(
                    genome::random(&mut rng, INITIAL_SIGMA, config.genome_size),
                    0.0,
                )
            })
            .collect();
        Self {
            config,
            population,
            generation: 0,
            best_ever: Individual::default(),
            fitness_stats: None,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The current population.
    ///
    /// Right after [`evolve`](Self::evolve) this is the new generation: elites first with
    /// their fitness, then unevaluated children.
    #[must_use]
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Number of completed [`evolve`](Self::evolve) calls.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// A copy of the best individual ever evaluated. Zero before the first generation.
    #[must_use]
    pub fn best_ever(&self) -> &Individual {
        &self.best_ever
    }

    /// Fitness statistics of the most recently evaluated generation.
    ///
    /// `None` before the first [`evolve`](Self::evolve) call or for an empty population.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        self.fitness_stats
    }

    /// Runs one generation: evaluate, rank, track best-ever, then breed the replacement.
    pub fn evolve<F>(&mut self, evaluate: F)
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        evaluate_population(&mut self.population, self.config.workers, &evaluate);
        self.population
            .sort_by(|a, b| compare_fitness(b.fitness, a.fitness));
        self.fitness_stats =
            DescriptiveStats::new(self.population.iter().map(Individual::fitness));

        if let Some(top) = self.population.first()
            && (self.generation == 0 || top.fitness > self.best_ever.fitness)
        {
            self.best_ever = top.clone();
        }

        let config = &self.config;
        let mut next = Vec::with_capacity(config.population_size);
        next.extend_from_slice(&self.population[..config.elite_count]);
        while next.len() < config.population_size {
            let p1 = tournament_select(&self.population, config.tournament_size, &mut self.rng);
            let mut child = if self.rng.random::<f64>() < config.crossover_rate {
                let p2 =
                    tournament_select(&self.population, config.tournament_size, &mut self.rng);
                genome::blend_crossover(&p1.genome, &p2.genome, &mut self.rng)
            } else {
                p1.genome.clone()
            };
            genome::mutate(
                &mut child,
                config.mutation_rate,
                config.mutation_scale,
                &mut self.rng,
            );
            next.push(Individual::new(child, 0.0));
        }

        self.population = next;
        self.generation += 1;
        debug!(
            generation = self.generation,
            best = self.fitness_stats.map(|s| s.max),
            best_ever = self.best_ever.fitness,
            "generation evolved"
        );
    }
}

/// Scores every individual exactly once on `min(workers, len)` scoped threads.
fn evaluate_population<F>(population: &mut [Individual], workers: usize, evaluate: &F)
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let individuals: &[Individual] = population;
    let workers = workers.clamp(1, individuals.len().max(1));
    let next_index = AtomicUsize::new(0);

    let scores: Vec<(usize, f64)> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(|| {
                    let mut scores = vec![];
                    loop {
                        let i = next_index.fetch_add(1, atomic::Ordering::Relaxed);
                        let Some(individual) = individuals.get(i) else {
                            break;
                        };
                        scores.push((i, evaluate(&individual.genome)));
                    }
                    scores
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    });

    for (i, fitness) in scores {
        population[i].fitness = fitness;
    }
}

fn compare_fitness(a: f64, b: f64) -> Ordering {
    let rank = |f: f64| if f.is_nan() { f64::NEG_INFINITY } else { f };
    rank(a).total_cmp(&rank(b))
}

/// Draws `tournament_size` individuals with replacement and returns the first fittest.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0, "tournament size must be at least 1");
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..tournament_size {
        let contender = &population[rng.random_range(0..population.len())];
        if compare_fitness(contender.fitness, best.fitness).is_gt() {
            best = contender;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn small_config(workers: usize) -> GaConfig {
        GaConfig {
            population_size: 20,
            elite_count: 4,
            workers,
            ..GaConfig::new(10)
        }
    }

    fn sphere(genome: &[f64]) -> f64 {
        -genome.iter().map(|x| (x - 1.0).powi(2)).sum::<f64>()
    }

    #[test]
    fn test_initial_genomes_are_distinct() {
        let ga = GeneticAlgorithm::new(small_config(1), Pcg64Mcg::seed_from_u64(1));
        let population = ga.population();
        assert_eq!(population.len(), 20);
        assert!(population.iter().all(|ind| ind.genome().len() == 10));
        assert_ne!(population[0].genome(), population[1].genome());
    }

    #[test]
    fn test_each_individual_evaluated_once() {
        for workers in [1, 3, 20, 64] {
            let mut ga = GeneticAlgorithm::new(small_config(workers), Pcg64Mcg::seed_from_u64(2));
            let calls = AtomicUsize::new(0);
            ga.evolve(|genome| {
                calls.fetch_add(1, atomic::Ordering::Relaxed);
                sphere(genome)
            });
            assert_eq!(calls.load(atomic::Ordering::Relaxed), 20, "workers = {workers}");
        }
    }

    #[test]
    fn test_elites_survive_verbatim() {
        let mut ga = GeneticAlgorithm::new(small_config(4), Pcg64Mcg::seed_from_u64(3));
        let mut expected: Vec<Individual> = ga
            .population()
            .iter()
            .map(|ind| Individual::new(ind.genome().to_vec(), sphere(ind.genome())))
            .collect();
        expected.sort_by(|a, b| compare_fitness(b.fitness, a.fitness));

        ga.evolve(sphere);

        assert_eq!(&ga.population()[..4], &expected[..4]);
        assert!(ga.population()[4..].iter().all(|ind| ind.fitness() == 0.0));
        assert_eq!(ga.population().len(), 20);
        assert_eq!(ga.best_ever(), &expected[0]);
    }

    #[test]
    fn test_best_ever_is_monotonic_and_improves() {
        let mut ga = GeneticAlgorithm::new(small_config(2), Pcg64Mcg::seed_from_u64(4));
        let mut previous = f64::NEG_INFINITY;
        let mut first = None;
        for _ in 0..40 {
            ga.evolve(sphere);
            let best = ga.best_ever().fitness();
            assert!(best >= previous);
            first.get_or_insert(best);
            previous = best;
        }
        assert!(previous > first.unwrap());
        assert_eq!(ga.generation(), 40);
    }

    #[test]
    fn test_fitness_stats_cover_evaluated_generation() {
        let mut ga = GeneticAlgorithm::new(small_config(1), Pcg64Mcg::seed_from_u64(5));
        assert!(ga.fitness_stats().is_none());
        ga.evolve(sphere);
        let stats = ga.fitness_stats().unwrap();
        assert_eq!(stats.max, ga.best_ever().fitness());
        assert_eq!(stats.max, ga.population()[0].fitness());
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
    }

    #[test]
    #[should_panic(expected = "evaluation failed")]
    fn test_evaluation_panic_propagates() {
        let mut ga = GeneticAlgorithm::new(small_config(3), Pcg64Mcg::seed_from_u64(6));
        ga.evolve(|_| panic!("evaluation failed"));
    }

    #[test]
    #[should_panic(expected = "elite count")]
    fn test_rejects_too_many_elites() {
        let config = GaConfig {
            elite_count: 21,
            ..small_config(1)
        };
        let _ = GeneticAlgorithm::new(config, Pcg64Mcg::seed_from_u64(7));
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let population: Vec<Individual> = (0..10)
            .map(|i| Individual::new(vec![f64::from(i)], f64::from(i)))
            .collect();
        let mut rng = Pcg64Mcg::seed_from_u64(8);
        let winner = tournament_select(&population, 200, &mut rng);
        assert_eq!(winner.fitness(), 9.0);
    }

    #[test]
    fn test_tournament_of_one_is_uniform() {
        let population: Vec<Individual> = (0..10)
            .map(|i| Individual::new(vec![f64::from(i)], f64::from(i)))
            .collect();
        let mut rng = Pcg64Mcg::seed_from_u64(21);
        let mut wins = [0_usize; 10];
        for _ in 0..10_000 {
            let winner = tournament_select(&population, 1, &mut rng);
            let index = population
                .iter()
                .position(|p| std::ptr::eq(p, winner))
                .unwrap();
            wins[index] += 1;
        }
        assert!(
            wins.iter().all(|&w| (800..1200).contains(&w)),
            "wins: {wins:?}"
        );
    }

    #[test]
    fn test_tournament_draws_with_replacement() {
        // The weaker individual only wins when it is drawn twice.
        let population = [Individual::new(vec![0.0], 0.0), Individual::new(vec![1.0], 1.0)];
        let mut rng = Pcg64Mcg::seed_from_u64(22);
        let weak_wins = (0..4000)
            .filter(|_| tournament_select(&population, 2, &mut rng).fitness() == 0.0)
            .count();
        assert!((800..1200).contains(&weak_wins), "weak wins: {weak_wins}");
    }

    #[test]
    fn test_nan_ranks_last() {
        assert!(compare_fitness(f64::NAN, -1e300).is_lt());
        assert!(compare_fitness(1.0, f64::NAN).is_gt());
    }
}
