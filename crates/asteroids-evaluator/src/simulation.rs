//! Headless play-throughs that score an agent.
//!
//! [`run_simulation`] plays `num_runs` independent games with a fresh [`World`] each, up to
//! `max_ticks` ticks or until the last life is lost, and averages score, ticks and fitness.
//!
//! # Fitness
//!
//! ```text
//! fitness = score × score_weight + ticks × survival_bonus + shaping
//! ```
//!
//! Shaping reward accumulates every tick, read from the observation taken before the step:
//!
//! - closing speed toward the nearest asteroid, when positive, × `approach_weight`
//! - a fired shot: `-shot_penalty` when line-of-fire quality is below 0.3, otherwise +2
//! - `hit_bonus` whenever the score went up during the tick
//! - `-1.5 × urgency` when threat urgency exceeds 0.3 and the agent is not thrusting
//!
//! A shot is detected by the player bullet count growing across the step. Bullets expiring
//! in the same tick can hide a shot.

use asteroids_engine::{AiAction, World};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    agent::Agent,
    observation::{self, Observation},
};

const CLOSING_SPEED: usize = 35;
const LINE_OF_FIRE: usize = 36;
const THREAT: usize = 38;

const AIMED_THRESHOLD: f64 = 0.3;
const AIMED_SHOT_BONUS: f64 = 2.0;
const THREAT_THRESHOLD: f64 = 0.3;
const THREAT_PENALTY: f64 = 1.5;

/// Parameters of a headless evaluation.
///
/// Deserializing fills any missing field from [`SimConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub max_ticks: usize,
    /// Runs to average over; values below 1 are treated as 1.
    pub num_runs: usize,
    pub score_weight: f64,
    pub survival_bonus: f64,
    pub approach_weight: f64,
    pub hit_bonus: f64,
    pub shot_penalty: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_ticks: 3600,
            num_runs: 3,
            score_weight: 3.0,
            survival_bonus: 0.05,
            approach_weight: 0.2,
            hit_bonus: 20.0,
            shot_penalty: 3.0,
        }
    }
}

/// Outcome of one run, or the mean over several.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimResult {
    pub score: f64,
    pub ticks: f64,
    pub fitness: f64,
}

/// Plays `config.num_runs` games seeded from the thread-local RNG.
pub fn run_simulation<A>(agent: &A, config: &SimConfig) -> SimResult
where
    A: Agent + ?Sized,
{
    run_simulation_with_rng(agent, config, &mut rand::rng())
}

/// Plays `config.num_runs` games, drawing one world seed per run from `rng`.
pub fn run_simulation_with_rng<A, R>(agent: &A, config: &SimConfig, rng: &mut R) -> SimResult
where
    A: Agent + ?Sized,
    R: Rng + ?Sized,
{
    let runs = config.num_runs.max(1);
    let mut total = SimResult::default();
    for run in 0..runs {
        let seed = rng.random::<u64>();
        let result = run_episode(agent, config, seed);
        debug!(
            run,
            seed,
            score = result.score,
            ticks = result.ticks,
            fitness = result.fitness,
            "simulation run finished"
        );
        total.score += result.score;
        total.ticks += result.ticks;
        total.fitness += result.fitness;
    }

    #[expect(clippy::cast_precision_loss)]
    let runs = runs as f64;
    SimResult {
        score: total.score / runs,
        ticks: total.ticks / runs,
        fitness: total.fitness / runs,
    }
}

/// Plays a single game on a world built from `seed`.
pub fn run_episode<A>(agent: &A, config: &SimConfig, seed: u64) -> SimResult
where
    A: Agent + ?Sized,
{
    let mut world = World::new(seed);
    let mut shaping = 0.0;
    let mut ticks = config.max_ticks;

    for tick in 0..config.max_ticks {
        if world.is_game_over() {
            ticks = tick;
            break;
        }

        let obs = observation::extract(&world);
        let action = agent.act(&obs);
        let bullets_before = world.bullet_count();
        let score_before = world.score();

        world.step(action);

        shaping += tick_shaping(
            config,
            &obs,
            action,
            world.bullet_count() > bullets_before,
            world.score() > score_before,
        );

        world.clear_sound_queue();
    }

    #[expect(clippy::cast_precision_loss)]
    let ticks = ticks as f64;
    let score = f64::from(world.score());
    SimResult {
        score,
        ticks,
        fitness: score * config.score_weight + ticks * config.survival_bonus + shaping,
    }
}

/// Shaping reward for one tick, from the observation the agent acted on.
fn tick_shaping(
    config: &SimConfig,
    obs: &Observation,
    action: AiAction,
    shot_fired: bool,
    scored: bool,
) -> f64 {
    let mut shaping = 0.0;
    if obs[CLOSING_SPEED] > 0.0 {
        shaping += obs[CLOSING_SPEED] * config.approach_weight;
    }
    if shot_fired {
        if obs[LINE_OF_FIRE] < AIMED_THRESHOLD {
            shaping -= config.shot_penalty;
        } else {
            shaping += AIMED_SHOT_BONUS;
        }
    }
    if scored {
        shaping += config.hit_bonus;
    }
    if obs[THREAT] > THREAT_THRESHOLD && !action.thrust {
        shaping -= obs[THREAT] * THREAT_PENALTY;
    }
    shaping
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{
        agent::NeuralAgent,
        network::Network,
        observation::OBSERVATION_SIZE,
    };

    struct Scripted(AiAction);

    impl Agent for Scripted {
        fn act(&self, _observation: &Observation) -> AiAction {
            self.0
        }
    }

    #[test]
    fn test_zero_network_survives_short_run() {
        let agent = NeuralAgent::new(Network::new(&[OBSERVATION_SIZE, 16, 5]));
        let config = SimConfig {
            max_ticks: 60,
            num_runs: 1,
            ..SimConfig::default()
        };
        let result = run_simulation(&agent, &config);
        assert!(result.ticks > 0.0);
        assert_eq!(result.ticks, 60.0);
        assert_eq!(result.score, 0.0);
        // Outputs sit exactly at the threshold, so the ship idles and shaping can only
        // subtract.
        assert!(result.fitness <= result.ticks * config.survival_bonus + 1e-9);
    }

    #[test]
    fn test_zero_runs_behaves_like_one() {
        let agent = Scripted(AiAction::default());
        let config = SimConfig {
            max_ticks: 30,
            num_runs: 0,
            ..SimConfig::default()
        };
        let result = run_simulation(&agent, &config);
        assert_eq!(result.ticks, 30.0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let agent = Scripted(AiAction {
            thrust: true,
            shoot: true,
            rotate_left: true,
            ..AiAction::default()
        });
        let config = SimConfig {
            max_ticks: 1200,
            num_runs: 2,
            ..SimConfig::default()
        };
        let a = run_simulation_with_rng(&agent, &config, &mut Pcg64Mcg::seed_from_u64(9));
        let b = run_simulation_with_rng(&agent, &config, &mut Pcg64Mcg::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_episode_ends_when_lives_run_out() {
        // Jumping every tick eventually hits the 1-in-16 fatal hyperspace roll.
        let agent = Scripted(AiAction {
            hyperspace: true,
            ..AiAction::default()
        });
        let config = SimConfig {
            max_ticks: 100_000,
            ..SimConfig::default()
        };
        let result = run_episode(&agent, &config, 4);
        assert!(result.ticks < 100_000.0);
        assert!(result.ticks > 0.0);
    }

    #[test]
    fn test_threat_penalty_applies_while_invulnerable() {
        let config = SimConfig::default();
        let mut obs = [0.0; OBSERVATION_SIZE];
        obs[6] = 1.0;
        obs[THREAT] = 0.8;

        let idle = tick_shaping(&config, &obs, AiAction::default(), false, false);
        assert!((idle + 0.8 * THREAT_PENALTY).abs() < 1e-12);

        let thrusting = AiAction {
            thrust: true,
            ..AiAction::default()
        };
        assert_eq!(tick_shaping(&config, &obs, thrusting, false, false), 0.0);
    }

    #[test]
    fn test_tick_shaping_rewards() {
        let config = SimConfig::default();
        let mut obs = [0.0; OBSERVATION_SIZE];
        obs[CLOSING_SPEED] = 0.5;
        obs[LINE_OF_FIRE] = 0.9;
        let shaping = tick_shaping(&config, &obs, AiAction::default(), true, true);
        let expected = 0.5 * config.approach_weight + AIMED_SHOT_BONUS + config.hit_bonus;
        assert!((shaping - expected).abs() < 1e-12);

        obs[LINE_OF_FIRE] = 0.1;
        obs[CLOSING_SPEED] = -0.5;
        let wild = tick_shaping(&config, &obs, AiAction::default(), true, false);
        assert!((wild + config.shot_penalty).abs() < 1e-12);
    }

    #[test]
    fn test_idle_invulnerable_ship_is_penalized_for_threats() {
        // An idle ship never moves, shoots or scores and stays invulnerable for all
        // 120 ticks, so whatever shaping is left is the threat penalty.
        let config = SimConfig {
            max_ticks: 120,
            num_runs: 1,
            ..SimConfig::default()
        };
        let survival = 120.0 * config.survival_bonus;
        let penalized = (0..300)
            .filter(|&seed| {
                let result = run_episode(&Scripted(AiAction::default()), &config, seed);
                assert_eq!(result.ticks, 120.0);
                assert_eq!(result.score, 0.0);
                assert!(result.fitness <= survival + 1e-9);
                result.fitness < survival - 1e-9
            })
            .count();
        assert!(penalized > 0);
    }

    #[test]
    fn test_partial_config_json_keeps_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "max_ticks": 600 }"#).unwrap();
        assert_eq!(
            config,
            SimConfig {
                max_ticks: 600,
                ..SimConfig::default()
            }
        );
    }
}
