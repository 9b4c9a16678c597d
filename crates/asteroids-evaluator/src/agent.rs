//! Controllers that turn an observation into an action.

use asteroids_engine::AiAction;

use crate::{network::Network, observation::Observation};

/// Decides the control input for one tick.
pub trait Agent {
    fn act(&self, observation: &Observation) -> AiAction;
}

impl<A> Agent for &A
where
    A: Agent + ?Sized,
{
    fn act(&self, observation: &Observation) -> AiAction {
        (**self).act(observation)
    }
}

/// An agent that presses each button whose network output is strictly above a threshold.
///
/// The five outputs map, in order, to rotate left, rotate right, thrust, shoot and
/// hyperspace.
#[derive(Debug, Clone)]
pub struct NeuralAgent {
    network: Network,
    threshold: f64,
}

impl NeuralAgent {
    pub const DEFAULT_THRESHOLD: f64 = 0.5;

    /// Wraps `network` with the default threshold of 0.5.
    ///
    /// # Panics
    ///
    /// Panics if the network does not produce exactly five outputs.
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self::with_threshold(network, Self::DEFAULT_THRESHOLD)
    }

    #[must_use]
    pub fn with_threshold(network: Network, threshold: f64) -> Self {
        assert_eq!(network.output_size(), 5, "agent networks have five outputs");
        Self { network, threshold }
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Agent for NeuralAgent {
    fn act(&self, observation: &Observation) -> AiAction {
        let outputs = self.network.forward(observation);
        let mut flags = [false; 5];
        for (flag, y) in flags.iter_mut().zip(outputs) {
            *flag = y > self.threshold;
        }
        AiAction::from_flags(flags)
    }
}

#[cfg(test)]
mod tests {
    use crate::observation::OBSERVATION_SIZE;

    use super::*;

    #[test]
    fn test_zero_network_presses_nothing() {
        let agent = NeuralAgent::new(Network::new(&[OBSERVATION_SIZE, 16, 5]));
        assert_eq!(
            agent.act(&[0.3; OBSERVATION_SIZE]),
            AiAction::default()
        );
    }

    #[test]
    fn test_biases_select_buttons() {
        let mut network = Network::new(&[OBSERVATION_SIZE, 5]);
        let mut params = network.params();
        let bias_start = params.len() - 5;
        // thrust and shoot
        params[bias_start + 2] = 3.0;
        params[bias_start + 3] = 3.0;
        params[bias_start + 4] = -3.0;
        network.set_params(&params);

        let action = NeuralAgent::new(network).act(&[0.0; OBSERVATION_SIZE]);
        assert_eq!(
            action,
            AiAction {
                thrust: true,
                shoot: true,
                ..AiAction::default()
            }
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let network = Network::new(&[OBSERVATION_SIZE, 5]);
        let low = NeuralAgent::with_threshold(network.clone(), 0.49);
        let action = low.act(&[0.0; OBSERVATION_SIZE]);
        assert!(action.rotate_left && action.rotate_right && action.hyperspace);

        let exact = NeuralAgent::with_threshold(network, 0.5);
        assert_eq!(exact.act(&[0.0; OBSERVATION_SIZE]), AiAction::default());
    }
}
