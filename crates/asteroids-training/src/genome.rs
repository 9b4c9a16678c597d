//! Genome operations for the genetic algorithm.
//!
//! A genome is a flat `Vec<f64>` of network parameters. These functions implement the
//! initialization, crossover and mutation steps used by
//! [`GeneticAlgorithm`](crate::genetic::GeneticAlgorithm).
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws every gene from `N(0, sigma)`
//! - **Crossover**: [`blend_crossover`] interpolates each gene between the two parents
//! - **Mutation**: [`mutate`] adds Gaussian noise to a random subset of genes
//!
//! ## Blend Crossover
//!
//! Each child gene is `α·a + (1 − α)·b` with a fresh `α ∈ [0, 1)` per gene, so the child
//! always lies between its parents. Genes are never swapped wholesale: neighbouring
//! weights of a network only make sense together, and interpolation keeps both parents'
//! structure roughly intact.
//!
//! ## Gaussian Mutation
//!
//! Genes are unbounded. Each one is perturbed with probability `rate` by `N(0, scale)`
//! noise; the others are left bit-for-bit unchanged.

use rand::Rng;
use rand_distr::StandardNormal;

/// Creates a genome by applying a function to each index.
///
/// # Examples
///
/// ```
/// use asteroids_training::genome;
///
/// let genome = genome::from_fn(|i| i as f64 * 0.5, 4);
/// assert_eq!(genome, vec![0.0, 0.5, 1.0, 1.5]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f64>
where
    F: FnMut(usize) -> f64,
{
    let mut genes = Vec::with_capacity(len);
    for i in 0..len {
        genes.push(f(i));
    }
    genes
}

/// Generates a genome with every gene drawn from `N(0, sigma)`.
pub fn random<R>(rng: &mut R, sigma: f64, len: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.sample::<f64, _>(StandardNormal) * sigma, len)
}

/// Blends two parents gene by gene with an independent `α ∈ [0, 1)` for each gene.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn blend_crossover<R>(a: &[f64], b: &[f64], rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len(), "parents must have the same length");
    from_fn(
        |i| {
            let alpha = rng.random::<f64>();
            alpha * a[i] + (1.0 - alpha) * b[i]
        },
        a.len(),
    )
}

/// Applies Gaussian mutation in place.
///
/// For each gene, with probability `rate`, adds a sample from `N(0, scale)`.
pub fn mutate<R>(genome: &mut [f64], rate: f64, scale: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for gene in genome {
        if rng.random::<f64>() < rate {
            *gene += rng.sample::<f64, _>(StandardNormal) * scale;
        }
    }
}
