//! Fixed-topology feed-forward network with flat parameter storage.
//!
//! A [`Network`] maps an input vector through one or more fully connected transitions.
//! Hidden transitions use `tanh`; the last transition uses the logistic sigmoid so every
//! output lies in `(0, 1)` and can be thresholded into a button press.
//!
//! # Parameter Layout
//!
//! All weights live in one flat array, transition by transition. Within a transition of
//! shape `in × out` the weight from input `i` to output `j` sits at `offset + i * out + j`.
//! Biases are stored the same way, one block of `out` values per transition.
//!
//! The genome handled by the genetic algorithm is exactly [`Network::params`]: every weight
//! followed by every bias.
//!
//! # Persistence
//!
//! [`Network::save`] writes `(layers, weights, biases)` as a postcard record.
//! [`Network::load`] reads it back and rejects records whose array lengths disagree with
//! the layer widths. There is no version field.

use std::io::{self, Read, Write};

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SaveNetworkError {
    #[display("failed to encode network")]
    Encode(postcard::Error),
    #[display("failed to write network")]
    Io(io::Error),
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadNetworkError {
    #[display("failed to read network")]
    Io(io::Error),
    #[display("failed to decode network")]
    Decode(postcard::Error),
    #[display("network needs at least 2 layers, found {count}")]
    TooFewLayers { count: usize },
    #[display("{kind} count mismatch: layers need {expected}, found {actual}")]
    ParamCountMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("parameter count of layers {layers:?} overflows usize")]
    ParamCountOverflow { layers: Vec<usize> },
}

#[derive(Serialize)]
struct NetworkRecordRef<'a> {
    layers: &'a [usize],
    weights: &'a [f64],
    biases: &'a [f64],
}

#[derive(Deserialize)]
struct NetworkRecord {
    layers: Vec<usize>,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<usize>,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Network {
    /// Creates a network with every weight and bias set to zero.
    ///
    /// # Panics
    ///
    /// Panics if `layers` has fewer than two entries or its parameter count overflows
    /// `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use asteroids_evaluator::network::Network;
    ///
    /// let net = Network::new(&[3, 4, 2]);
    /// assert_eq!(net.param_count(), 3 * 4 + 4 * 2 + 4 + 2);
    /// assert_eq!(net.forward(&[1.0, -1.0, 0.5]), vec![0.5, 0.5]);
    /// ```
    #[must_use]
    pub fn new(layers: &[usize]) -> Self {
        assert!(
            layers.len() >= 2,
            "network needs at least an input and an output layer"
        );
        let Some((weight_count, bias_count)) = param_counts(layers) else {
            panic!("parameter count of layers {layers:?} overflows usize");
        };
        Self {
            layers: layers.to_vec(),
            weights: vec![0.0; weight_count],
            biases: vec![0.0; bias_count],
        }
    }

    /// Creates a network whose parameters are drawn i.i.d. from `N(0, sigma)`.
    #[must_use]
    pub fn random<R>(layers: &[usize], rng: &mut R, sigma: f64) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut network = Self::new(layers);
        for p in network.weights.iter_mut().chain(&mut network.biases) {
            *p = rng.sample::<f64, _>(StandardNormal) * sigma;
        }
        network
    }

    /// Builds a network from its three stored arrays, validating their shapes.
    pub fn from_parts(
        layers: Vec<usize>,
        weights: Vec<f64>,
        biases: Vec<f64>,
    ) -> Result<Self, LoadNetworkError> {
        if layers.len() < 2 {
            return Err(LoadNetworkError::TooFewLayers {
                count: layers.len(),
            });
        }
        let Some((weight_count, bias_count)) = param_counts(&layers) else {
            return Err(LoadNetworkError::ParamCountOverflow { layers });
        };
        if weights.len() != weight_count {
            return Err(LoadNetworkError::ParamCountMismatch {
                kind: "weight",
                expected: weight_count,
                actual: weights.len(),
            });
        }
        if biases.len() != bias_count {
            return Err(LoadNetworkError::ParamCountMismatch {
                kind: "bias",
                expected: bias_count,
                actual: biases.len(),
            });
        }
        Ok(Self {
            layers,
            weights,
            biases,
        })
    }

    #[must_use]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers[0]
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Runs a forward pass.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from the input layer width.
    #[must_use]
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.input_size(),
            "input length must match the input layer"
        );

        let transitions = self.layers.len() - 1;
        let mut current = input.to_vec();
        let mut weight_offset = 0;
        let mut bias_offset = 0;

        for (l, shape) in self.layers.windows(2).enumerate() {
            let (in_size, out_size) = (shape[0], shape[1]);
            let weights = &self.weights[weight_offset..][..in_size * out_size];
            let biases = &self.biases[bias_offset..][..out_size];
            let is_output = l == transitions - 1;

            let next = (0..out_size)
                .map(|j| {
                    let sum = biases[j]
                        + current
                            .iter()
                            .enumerate()
                            .map(|(i, x)| x * weights[i * out_size + j])
                            .sum::<f64>();
                    if is_output { sigmoid(sum) } else { sum.tanh() }
                })
                .collect();

            weight_offset += in_size * out_size;
            bias_offset += out_size;
            current = next;
        }
        current
    }

    /// Total number of weights plus biases.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Returns all weights followed by all biases.
    #[must_use]
    pub fn params(&self) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.param_count());
        params.extend_from_slice(&self.weights);
        params.extend_from_slice(&self.biases);
        params
    }

    /// Overwrites every parameter from a flat genome laid out like [`params`](Self::params).
    ///
    /// # Panics
    ///
    /// Panics if `params.len()` differs from [`param_count`](Self::param_count).
    pub fn set_params(&mut self, params: &[f64]) {
        assert_eq!(
            params.len(),
            self.param_count(),
            "genome length must match the parameter count"
        );
        let (weights, biases) = params.split_at(self.weights.len());
        self.weights.copy_from_slice(weights);
        self.biases.copy_from_slice(biases);
    }

    pub fn save<W>(&self, mut writer: W) -> Result<(), SaveNetworkError>
    where
        W: Write,
    {
        let record = NetworkRecordRef {
            layers: &self.layers,
            weights: &self.weights,
            biases: &self.biases,
        };
        let bytes = postcard::to_allocvec(&record).map_err(SaveNetworkError::Encode)?;
        writer.write_all(&bytes).map_err(SaveNetworkError::Io)?;
        writer.flush().map_err(SaveNetworkError::Io)?;
        Ok(())
    }

    /// Reads a network written by [`save`](Self::save).
    ///
    /// The whole stream is consumed. Nothing is returned unless the record decodes and
    /// its shape is valid.
    pub fn load<R>(mut reader: R) -> Result<Self, LoadNetworkError>
    where
        R: Read,
    {
        let mut bytes = vec![];
        reader
            .read_to_end(&mut bytes)
            .map_err(LoadNetworkError::Io)?;
        let record: NetworkRecord = postcard::from_bytes(&bytes).map_err(LoadNetworkError::Decode)?;
        Self::from_parts(record.layers, record.weights, record.biases)
    }
}

/// Weight and bias counts for `layers`, or `None` if either overflows.
fn param_counts(layers: &[usize]) -> Option<(usize, usize)> {
    layers.windows(2).try_fold((0_usize, 0_usize), |(w, b), shape| {
        let w = shape[0].checked_mul(shape[1])?.checked_add(w)?;
        let b = b.checked_add(shape[1])?;
        Some((w, b))
    })
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
