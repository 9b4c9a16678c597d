//! Fixed-length numeric observation of the world from the player's point of view.
//!
//! [`extract`] turns any [`WorldView`] into a 40-element [`Observation`]. Positions are
//! wrap-aware: every relative offset is the shortest signed delta on the torus (see
//! [`wrap_delta`]). Distances are normalized by half the screen diagonal, velocities by the
//! player's max speed, and angles by π.
//!
//! # Layout
//!
//! ```text
//!  0-1   player x, y                      [-1, 1]
//!  2-3   player vx, vy                    / max speed
//!  4-5   sin(angle), cos(angle)
//!  6     invulnerable                     0 or 1
//!  7     bullets in flight                / max bullets
//!  8-27  5 nearest asteroids × (dx, dy, dvx, dvy), zero-filled
//! 28-30  saucer present, dx, dy
//! 31-32  nearest saucer bullet dx, dy
//! 33     lives                            / 5
//! 34     lead angle error to the nearest asteroid
//! 35     closing speed toward the nearest asteroid
//! 36     best line-of-fire quality        [0, 1]
//! 37     nearest asteroid distance
//! 38     collision threat urgency         [0, 1]
//! 39     dodge angle error
//! ```
//!
//! Indices 34-37 are zero when there are no asteroids. Index 39 is zero when index 38 is.

use std::f64::consts::{PI, TAU};

use arrayvec::ArrayVec;
use asteroids_engine::{
    BULLET_SPEED, Body, MAX_PLAYER_BULLETS, MAX_SPEED, PLAYER_RADIUS, SCREEN_HEIGHT,
    SCREEN_WIDTH, Vec2, World,
};

pub const OBSERVATION_SIZE: usize = 40;

pub type Observation = [f64; OBSERVATION_SIZE];

const NEAREST_ASTEROIDS: usize = 5;
const ASTEROID_SLOTS: usize = 8;
const LIVES_SCALE: f64 = 5.0;

const MIN_RELATIVE_SPEED_SQ: f64 = 0.01;
const ASTEROID_THREAT_WINDOW: f64 = 120.0;
const ASTEROID_THREAT_MARGIN: f64 = 2.0;
const ASTEROID_URGENCY_SCALE: f64 = 30.0;
const BULLET_THREAT_WINDOW: f64 = 90.0;
const BULLET_THREAT_RADIUS: f64 = PLAYER_RADIUS * 3.0;
const BULLET_URGENCY_SCALE: f64 = 20.0;

/// Read-only access to the parts of a world the extractor needs.
///
/// Implemented for [`World`]; tests implement it for hand-built scenes.
pub trait WorldView {
    fn player_position(&self) -> Vec2;
    fn player_velocity(&self) -> Vec2;
    fn player_angle(&self) -> f64;
    fn player_invulnerable(&self) -> bool;
    fn bullet_count(&self) -> usize;
    fn lives(&self) -> u32;
    fn asteroid_bodies(&self) -> impl Iterator<Item = Body> + '_;
    fn saucer_body(&self) -> Option<Body>;
    fn saucer_bullet_bodies(&self) -> impl Iterator<Item = Body> + '_;
}

impl WorldView for World {
    fn player_position(&self) -> Vec2 {
        self.player().map(|p| p.body.position).unwrap_or_default()
    }

    fn player_velocity(&self) -> Vec2 {
        self.player().map(|p| p.body.velocity).unwrap_or_default()
    }

    fn player_angle(&self) -> f64 {
        self.player().map_or(0.0, |p| p.angle)
    }

    fn player_invulnerable(&self) -> bool {
        self.player().is_some_and(|p| p.invulnerable)
    }

    fn bullet_count(&self) -> usize {
        World::bullet_count(self)
    }

    fn lives(&self) -> u32 {
        World::lives(self)
    }

    fn asteroid_bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.asteroids().iter().map(|a| a.body)
    }

    fn saucer_body(&self) -> Option<Body> {
        self.saucer().map(|s| s.body)
    }

    fn saucer_bullet_bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.saucer_bullets().iter().map(|b| b.body)
    }
}

/// Shortest signed delta from `a` to `b` on an axis of length `size` that wraps around.
///
/// The result lies in `(-size/2, size/2]`.
///
/// # Examples
///
/// ```
/// use asteroids_evaluator::observation::wrap_delta;
///
/// assert_eq!(wrap_delta(10.0, 790.0, 800.0), -20.0);
/// assert_eq!(wrap_delta(790.0, 10.0, 800.0), 20.0);
/// assert_eq!(wrap_delta(100.0, 300.0, 800.0), 200.0);
/// ```
#[must_use]
pub fn wrap_delta(a: f64, b: f64, size: f64) -> f64 {
    let d = (b - a).rem_euclid(size);
    if d > size / 2.0 { d - size } else { d }
}

/// Wraps an angle into `[-π, π]`.
#[must_use]
pub fn normalize_angle(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

fn half_diagonal() -> f64 {
    SCREEN_WIDTH.hypot(SCREEN_HEIGHT) / 2.0
}

fn wrapped_offset(from: Vec2, to: Vec2) -> Vec2 {
    Vec2::new(
        wrap_delta(from.x, to.x, SCREEN_WIDTH),
        wrap_delta(from.y, to.y, SCREEN_HEIGHT),
    )
}

/// A body as seen from the player.
#[derive(Debug, Clone, Copy)]
struct RelativeBody {
    offset: Vec2,
    relative_velocity: Vec2,
    velocity: Vec2,
    distance: f64,
    radius: f64,
}

impl RelativeBody {
    fn new(body: Body, player_position: Vec2, player_velocity: Vec2) -> Self {
        let offset = wrapped_offset(player_position, body.position);
        Self {
            offset,
            relative_velocity: body.velocity - player_velocity,
            velocity: body.velocity,
            distance: offset.length(),
            radius: body.radius,
        }
    }
}

/// Closest-point-of-approach test.
///
/// Returns the urgency `1 / (1 + t / urgency_scale)` and the escape direction when the
/// body passes within `threat_radius` at a time `t` inside `[0, window]`.
fn approach_threat(
    offset: Vec2,
    relative_velocity: Vec2,
    window: f64,
    threat_radius: f64,
    urgency_scale: f64,
) -> Option<(f64, Vec2)> {
    let speed_sq = relative_velocity.length_squared();
    if speed_sq < MIN_RELATIVE_SPEED_SQ {
        return None;
    }
    let t = -offset.dot(relative_velocity) / speed_sq;
    if !(0.0..=window).contains(&t) {
        return None;
    }
    let miss = offset + relative_velocity.scaled(t);
    if miss.length() >= threat_radius {
        return None;
    }

    let (rvx, rvy) = (relative_velocity.x, relative_velocity.y);
    let cross = offset.x * rvy - offset.y * rvx;
    let dodge = if cross >= 0.0 {
        Vec2::new(-rvy, rvx)
    } else {
        Vec2::new(rvy, -rvx)
    };
    Some((1.0 / (1.0 + t / urgency_scale), dodge))
}

/// Builds the observation vector for the current state of `view`.
#[must_use]
pub fn extract<V>(view: &V) -> Observation
where
    V: WorldView,
{
    let half_diag = half_diagonal();
    let mut obs = [0.0; OBSERVATION_SIZE];

    let position = view.player_position();
    let velocity = view.player_velocity();
    let angle = view.player_angle();

    obs[0] = (position.x / SCREEN_WIDTH) * 2.0 - 1.0;
    obs[1] = (position.y / SCREEN_HEIGHT) * 2.0 - 1.0;
    obs[2] = velocity.x / MAX_SPEED;
    obs[3] = velocity.y / MAX_SPEED;
    obs[4] = angle.sin();
    obs[5] = angle.cos();
    obs[6] = if view.player_invulnerable() { 1.0 } else { 0.0 };
    #[expect(clippy::cast_precision_loss)]
    let bullet_fraction = view.bullet_count() as f64 / MAX_PLAYER_BULLETS as f64;
    obs[7] = bullet_fraction;

    let asteroids: Vec<RelativeBody> = view
        .asteroid_bodies()
        .map(|body| RelativeBody::new(body, position, velocity))
        .collect();

    // Sorted by distance; ties keep iteration order.
    let mut nearest = ArrayVec::<RelativeBody, NEAREST_ASTEROIDS>::new();
    for asteroid in &asteroids {
        let index = nearest.partition_point(|n| n.distance <= asteroid.distance);
        if index == nearest.capacity() {
            continue;
        }
        if nearest.is_full() {
            nearest.pop();
        }
        nearest.insert(index, *asteroid);
    }

    for (slot, asteroid) in nearest.iter().enumerate() {
        let base = ASTEROID_SLOTS + slot * 4;
        obs[base] = asteroid.offset.x / half_diag;
        obs[base + 1] = asteroid.offset.y / half_diag;
        obs[base + 2] = asteroid.relative_velocity.x / MAX_SPEED;
        obs[base + 3] = asteroid.relative_velocity.y / MAX_SPEED;
    }

    if let Some(saucer) = view.saucer_body() {
        let offset = wrapped_offset(position, saucer.position);
        obs[28] = 1.0;
        obs[29] = offset.x / half_diag;
        obs[30] = offset.y / half_diag;
    }

    let saucer_bullets: Vec<RelativeBody> = view
        .saucer_bullet_bodies()
        .map(|body| RelativeBody::new(body, position, velocity))
        .collect();
    let nearest_bullet = saucer_bullets
        .iter()
        .reduce(|best, b| if b.distance < best.distance { b } else { best });
    if let Some(bullet) = nearest_bullet {
        obs[31] = bullet.offset.x / half_diag;
        obs[32] = bullet.offset.y / half_diag;
    }

    obs[33] = f64::from(view.lives()) / LIVES_SCALE;

    if let Some(target) = nearest.first() {
        let flight_time = target.distance / BULLET_SPEED;
        let lead = target.offset + target.velocity.scaled(flight_time);
        obs[34] = normalize_angle(lead.y.atan2(lead.x) - angle) / PI;

        if target.distance > 0.0 {
            let direction = target.offset.scaled(1.0 / target.distance);
            obs[35] = velocity.dot(direction) / MAX_SPEED;
        }

        obs[36] = line_of_fire_quality(&asteroids, angle);
        obs[37] = target.distance / half_diag;
    }

    let asteroid_threats = asteroids.iter().filter_map(|a| {
        approach_threat(
            a.offset,
            a.relative_velocity,
            ASTEROID_THREAT_WINDOW,
            (PLAYER_RADIUS + a.radius) * ASTEROID_THREAT_MARGIN,
            ASTEROID_URGENCY_SCALE,
        )
    });
    let bullet_threats = saucer_bullets.iter().filter_map(|b| {
        approach_threat(
            b.offset,
            b.relative_velocity,
            BULLET_THREAT_WINDOW,
            BULLET_THREAT_RADIUS,
            BULLET_URGENCY_SCALE,
        )
    });
    // First strictly greater urgency wins.
    let threat = asteroid_threats
        .chain(bullet_threats)
        .fold(None::<(f64, Vec2)>, |best, candidate| match best {
            Some((urgency, _)) if candidate.0 <= urgency => best,
            _ => Some(candidate),
        });
    if let Some((urgency, dodge)) = threat {
        obs[38] = urgency;
        obs[39] = normalize_angle(dodge.y.atan2(dodge.x) - angle) / PI;
    }

    obs
}

/// How well a shot fired now would hit some asteroid, using lead-predicted positions.
///
/// 1 when the heading points at the centre of an asteroid's angular cone, falling linearly
/// to 0 at the cone's edge.
fn line_of_fire_quality(asteroids: &[RelativeBody], angle: f64) -> f64 {
    let mut best = 0.0_f64;
    for asteroid in asteroids {
        if asteroid.distance < 1.0 {
            continue;
        }
        let flight_time = asteroid.distance / BULLET_SPEED;
        let predicted = asteroid.offset + asteroid.velocity.scaled(flight_time);
        let predicted_distance = predicted.length();
        if predicted_distance < 1.0 {
            best = 1.0;
            continue;
        }
        let cone_half_width = asteroid.radius.atan2(predicted_distance);
        let error = normalize_angle(predicted.y.atan2(predicted.x) - angle).abs();
        if error < cone_half_width {
            best = best.max(1.0 - error / cone_half_width);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use asteroids_engine::AsteroidSize;

    use super::*;

    #[derive(Debug, Default)]
    struct Scene {
        position: Vec2,
        velocity: Vec2,
        angle: f64,
        invulnerable: bool,
        bullets: usize,
        lives: u32,
        asteroids: Vec<Body>,
        saucer: Option<Body>,
        saucer_bullets: Vec<Body>,
    }

    impl WorldView for Scene {
        fn player_position(&self) -> Vec2 {
            self.position
        }
        fn player_velocity(&self) -> Vec2 {
            self.velocity
        }
        fn player_angle(&self) -> f64 {
            self.angle
        }
        fn player_invulnerable(&self) -> bool {
            self.invulnerable
        }
        fn bullet_count(&self) -> usize {
            self.bullets
        }
        fn lives(&self) -> u32 {
            self.lives
        }
        fn asteroid_bodies(&self) -> impl Iterator<Item = Body> + '_ {
            self.asteroids.iter().copied()
        }
        fn saucer_body(&self) -> Option<Body> {
            self.saucer
        }
        fn saucer_bullet_bodies(&self) -> impl Iterator<Item = Body> + '_ {
            self.saucer_bullets.iter().copied()
        }
    }

    fn centered() -> Scene {
        Scene {
            position: Vec2::new(400.0, 300.0),
            lives: 3,
            ..Scene::default()
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_player_features() {
        let scene = Scene {
            velocity: Vec2::new(2.5, -5.0),
            invulnerable: true,
            bullets: 2,
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[0], 0.0);
        assert_close(obs[1], 0.0);
        assert_close(obs[2], 0.5);
        assert_close(obs[3], -1.0);
        assert_close(obs[4], 0.0);
        assert_close(obs[5], 1.0);
        assert_close(obs[6], 1.0);
        assert_close(obs[7], 0.5);
        assert_close(obs[33], 0.6);
    }

    #[test]
    fn test_empty_world_leaves_object_features_zero() {
        let obs = extract(&centered());
        assert!(obs[8..33].iter().all(|&x| x == 0.0));
        assert!(obs[34..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_head_on_asteroid() {
        let scene = Scene {
            velocity: Vec2::new(1.0, 0.0),
            asteroids: vec![Body::new(
                Vec2::new(500.0, 300.0),
                Vec2::new(-2.0, 0.0),
                40.0,
            )],
            ..centered()
        };
        let obs = extract(&scene);

        assert_close(obs[8], 0.2);
        assert_close(obs[9], 0.0);
        assert_close(obs[10], -0.6);
        assert_close(obs[11], 0.0);
        assert!(obs[12..28].iter().all(|&x| x == 0.0));

        assert_close(obs[34], 0.0);
        assert_close(obs[35], 0.2);
        assert_close(obs[36], 1.0);
        assert_close(obs[37], 0.2);

        // t* = 100 / 3, passing straight through the player.
        assert_close(obs[38], 1.0 / (1.0 + (100.0 / 3.0) / 30.0));
        // Zero cross product escapes along (-rvy, rvx) = (0, -3).
        assert_close(obs[39], -FRAC_PI_2 / PI);
    }

    #[test]
    fn test_receding_asteroid_is_not_a_threat() {
        let scene = Scene {
            asteroids: vec![Body::new(
                Vec2::new(500.0, 300.0),
                Vec2::new(2.0, 0.0),
                40.0,
            )],
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[38], 0.0);
        assert_close(obs[39], 0.0);
    }

    #[test]
    fn test_offsets_are_wrap_aware() {
        let scene = Scene {
            position: Vec2::new(10.0, 300.0),
            asteroids: vec![Body::new(Vec2::new(790.0, 300.0), Vec2::ZERO, 10.0)],
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[8], -20.0 / 500.0);
        assert_close(obs[37], 20.0 / 500.0);
    }

    #[test]
    fn test_only_five_nearest_asteroids_sorted_by_distance() {
        let asteroids = [250.0, 50.0, 150.0, 300.0, 100.0, 200.0, 20.0]
            .iter()
            .map(|&dx| Body::new(Vec2::new(400.0 + dx, 300.0), Vec2::ZERO, 10.0))
            .collect();
        let obs = extract(&Scene {
            asteroids,
            ..centered()
        });
        let slots: Vec<f64> = (0..5).map(|i| obs[8 + i * 4] * 500.0).collect();
        for (actual, expected) in slots.iter().zip([20.0, 50.0, 100.0, 150.0, 200.0]) {
            assert_close(*actual, expected);
        }
        assert_close(obs[37], 20.0 / 500.0);
    }

    #[test]
    fn test_line_of_fire_off_axis_is_zero() {
        let scene = Scene {
            angle: PI,
            asteroids: vec![Body::new(Vec2::new(600.0, 300.0), Vec2::ZERO, 10.0)],
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[34], -1.0);
        assert_close(obs[36], 0.0);
    }

    #[test]
    fn test_lead_uses_absolute_velocity_and_partial_cone() {
        let scene = Scene {
            velocity: Vec2::new(1.0, 0.0),
            asteroids: vec![Body::new(
                Vec2::new(470.0, 300.0),
                Vec2::new(0.0, 1.0),
                40.0,
            )],
            ..centered()
        };
        let obs = extract(&scene);

        // Flight time 70 / 7 = 10 ticks, so the lead point is (70, 10).
        let lead_error = 10.0_f64.atan2(70.0);
        assert_close(obs[34], lead_error / PI);
        assert_close(obs[35], 0.2);

        let cone_half_width = 40.0_f64.atan2(5000.0_f64.sqrt());
        assert_close(obs[36], 1.0 - lead_error / cone_half_width);
        assert!(obs[36] > 0.0 && obs[36] < 1.0);
    }

    #[test]
    fn test_lead_landing_on_player_is_a_sure_hit() {
        // Heading away from the asteroid, whose lead point is the player itself.
        let scene = Scene {
            angle: PI,
            asteroids: vec![Body::new(
                Vec2::new(470.0, 300.0),
                Vec2::new(-7.0, 0.0),
                40.0,
            )],
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[36], 1.0);
    }

    #[test]
    fn test_saucer_and_nearest_saucer_bullet() {
        let scene = Scene {
            saucer: Some(Body::new(Vec2::new(400.0, 100.0), Vec2::ZERO, 20.0)),
            saucer_bullets: vec![
                Body::new(Vec2::new(300.0, 300.0), Vec2::ZERO, 2.0),
                Body::new(Vec2::new(450.0, 300.0), Vec2::ZERO, 2.0),
            ],
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[28], 1.0);
        assert_close(obs[29], 0.0);
        assert_close(obs[30], -0.4);
        assert_close(obs[31], 0.1);
        assert_close(obs[32], 0.0);
    }

    #[test]
    fn test_incoming_saucer_bullet_threat() {
        let scene = Scene {
            saucer_bullets: vec![Body::new(
                Vec2::new(460.0, 300.0),
                Vec2::new(-4.0, 0.0),
                2.0,
            )],
            ..centered()
        };
        let obs = extract(&scene);
        assert_close(obs[38], 1.0 / (1.0 + 15.0 / 20.0));
    }

    #[test]
    fn test_values_stay_in_range_for_real_world() {
        for seed in 0..10 {
            let mut world = World::new(seed);
            world.spawn_asteroid(Vec2::new(10.0, 10.0), AsteroidSize::Small);
            for _ in 0..200 {
                let obs = extract(&world);
                assert!(obs.iter().all(|x| x.is_finite()));
                assert!(obs[34..].iter().all(|x| (-1.0..=1.0).contains(x)));
                world.step(asteroids_engine::AiAction {
                    thrust: true,
                    rotate_left: true,
                    ..Default::default()
                });
            }
        }
    }

    #[test]
    fn test_wrap_delta_is_shortest_congruent_delta() {
        let size = 800.0;
        for a in [0.0, 10.0, 399.5, 400.0, 799.0] {
            for b in [0.0, 5.0, 400.0, 410.0, 799.9] {
                let d = wrap_delta(a, b, size);
                assert!(d > -size / 2.0 && d <= size / 2.0);
                let residue = (a + d - b).rem_euclid(size);
                assert!(residue < 1e-9 || size - residue < 1e-9);
            }
        }
    }

    #[test]
    fn test_normalize_angle() {
        assert_close(normalize_angle(3.0 * PI), PI);
        assert_close(normalize_angle(-3.0 * PI), -PI);
        assert_close(normalize_angle(0.5), 0.5);
    }
}
