use std::f64::consts::TAU;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    BULLET_SPEED, PLAYER_RADIUS, SCREEN_HEIGHT, SCREEN_WIDTH,
    core::{Asteroid, AsteroidSize, Body, Bullet, Player, Saucer, SaucerSize, Vec2},
    engine::SoundEvent,
};

pub(crate) const INITIAL_LIVES: u32 = 3;
pub(crate) const EXTRA_LIFE_INTERVAL: u32 = 10_000;
pub(crate) const SAUCER_RESPAWN_DELAY: u32 = 600;

const WAVE_SAFE_DISTANCE: f64 = 150.0;
const BULLET_RADIUS: f64 = 2.0;
const BULLET_LIFE: u32 = 60;

pub(crate) const SAUCER_SHOOT_COOLDOWN: std::ops::Range<u32> = 60..150;
pub(crate) const SAUCER_VERTICAL_TIMER: std::ops::Range<u32> = 60..180;
const SAUCER_BULLET_SPEED: f64 = 4.0;
const SAUCER_BULLET_LIFE: u32 = 90;

/// The complete state of one play-through.
///
/// All randomness (wave layout, asteroid drift, saucer behaviour, hyperspace) is drawn
/// from an owned PCG generator, so two worlds built from the same seed and fed the same
/// actions evolve identically.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) rng: Pcg32,
    pub(crate) player: Option<Player>,
    pub(crate) asteroids: Vec<Asteroid>,
    pub(crate) bullets: Vec<Bullet>,
    pub(crate) saucer: Option<Saucer>,
    pub(crate) saucer_bullets: Vec<Bullet>,
    pub(crate) score: u32,
    pub(crate) lives: u32,
    pub(crate) level: u32,
    pub(crate) next_extra_life_at: u32,
    pub(crate) saucer_spawn_timer: u32,
    pub(crate) sound_queue: Vec<SoundEvent>,
}

impl World {
    /// Creates a fresh game: three lives, level 1, a player at the centre and the first wave.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut world = Self::empty(seed);
        world.player = Some(Player::spawn(Body::new(
            screen_center(),
            Vec2::ZERO,
            PLAYER_RADIUS,
        )));
        world.spawn_wave();
        world
    }

    /// Creates a world with game counters initialised but no entities at all.
    ///
    /// Useful for hosts that want to lay out a scenario by hand with
    /// [`spawn_player`](Self::spawn_player) and [`spawn_asteroid`](Self::spawn_asteroid).
    #[must_use]
    pub fn empty(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            player: None,
            asteroids: vec![],
            bullets: vec![],
            saucer: None,
            saucer_bullets: vec![],
            score: 0,
            lives: INITIAL_LIVES,
            level: 1,
            next_extra_life_at: EXTRA_LIFE_INTERVAL,
            saucer_spawn_timer: SAUCER_RESPAWN_DELAY,
            sound_queue: vec![],
        }
    }

    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    #[must_use]
    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    /// Player-fired bullets currently alive.
    #[must_use]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    #[must_use]
    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    #[must_use]
    pub fn saucer(&self) -> Option<&Saucer> {
        self.saucer.as_ref()
    }

    #[must_use]
    pub fn saucer_bullets(&self) -> &[Bullet] {
        &self.saucer_bullets
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    #[must_use]
    pub fn sound_queue(&self) -> &[SoundEvent] {
        &self.sound_queue
    }

    pub fn clear_sound_queue(&mut self) {
        self.sound_queue.clear();
    }

    /// Places a freshly spawned (invulnerable, facing up) player at `position`,
    /// replacing any existing one.
    pub fn spawn_player(&mut self, position: Vec2) {
        self.player = Some(Player::spawn(Body::new(
            position,
            Vec2::ZERO,
            PLAYER_RADIUS,
        )));
    }

    /// Spawns an asteroid at `position` drifting in a random direction.
    pub fn spawn_asteroid(&mut self, position: Vec2, size: AsteroidSize) {
        let direction = self.rng.random_range(0.0..TAU);
        let speed = size.base_speed() * (0.5 + self.rng.random::<f64>());
        self.asteroids.push(Asteroid {
            body: Body::new(
                position,
                Vec2::from_angle(direction, speed),
                size.radius(),
            ),
            size,
        });
    }

    /// Spawns `3 + level` large asteroids, none closer than 150 px to the player.
    pub(crate) fn spawn_wave(&mut self) {
        let count = 3 + self.level;
        let player_position = self.player.map(|p| p.body.position);
        for _ in 0..count {
            let position = loop {
                let candidate = Vec2::new(
                    self.rng.random::<f64>() * SCREEN_WIDTH,
                    self.rng.random::<f64>() * SCREEN_HEIGHT,
                );
                match player_position {
                    Some(p) if candidate.distance(p) <= WAVE_SAFE_DISTANCE => {}
                    _ => break candidate,
                }
            };
            self.spawn_asteroid(position, AsteroidSize::Large);
        }
    }

    pub(crate) fn spawn_player_bullet(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        let position = player.body.position + Vec2::from_angle(player.angle, PLAYER_RADIUS);
        let velocity = Vec2::from_angle(player.angle, BULLET_SPEED);
        self.bullets.push(Bullet {
            body: Body::new(position, velocity, BULLET_RADIUS),
            life: BULLET_LIFE,
        });
        self.sound_queue.push(SoundEvent::Fire);
    }

    /// Spawns a saucer entering from a random side edge, in the middle 60% of the screen.
    pub(crate) fn spawn_saucer(&mut self, size: SaucerSize) {
        let radius = size.radius();
        let (direction_x, x) = if self.rng.random_bool(0.5) {
            (1.0, -radius)
        } else {
            (-1.0, SCREEN_WIDTH + radius)
        };
        let y = SCREEN_HEIGHT * 0.2 + self.rng.random::<f64>() * SCREEN_HEIGHT * 0.6;
        self.saucer = Some(Saucer {
            body: Body::new(
                Vec2::new(x, y),
                Vec2::new(direction_x * size.speed(), 0.0),
                radius,
            ),
            size,
            direction_x,
            shoot_cooldown: self.rng.random_range(SAUCER_SHOOT_COOLDOWN),
            vertical_timer: self.rng.random_range(SAUCER_VERTICAL_TIMER),
        });
    }

    pub(crate) fn spawn_saucer_bullet(&mut self, origin: Vec2, angle: f64) {
        self.saucer_bullets.push(Bullet {
            body: Body::new(
                origin,
                Vec2::from_angle(angle, SAUCER_BULLET_SPEED),
                BULLET_RADIUS,
            ),
            life: SAUCER_BULLET_LIFE,
        });
    }

    /// Picks a saucer size for the current score: always large below 10K, always small
    /// from 40K, linearly more likely small in between.
    pub(crate) fn choose_saucer_size(&mut self) -> SaucerSize {
        match self.score {
            0..10_000 => SaucerSize::Large,
            40_000.. => SaucerSize::Small,
            score => {
                let small_chance = f64::from(score - 10_000) / 30_000.0;
                if self.rng.random::<f64>() < small_chance {
                    SaucerSize::Small
                } else {
                    SaucerSize::Large
                }
            }
        }
    }

    /// Costs a life, clears the saucer and its bullets, and respawns or removes the player.
    pub(crate) fn kill_player(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.saucer = None;
        self.saucer_bullets.clear();
        self.saucer_spawn_timer = SAUCER_RESPAWN_DELAY;
        self.sound_queue.push(SoundEvent::PlayerDeath);
        if self.lives == 0 {
            self.player = None;
        } else if let Some(player) = &mut self.player {
            *player = Player::spawn(Body::new(screen_center(), Vec2::ZERO, PLAYER_RADIUS));
        }
    }

    pub(crate) fn award(&mut self, points: u32) {
        self.score += points;
        while self.score >= self.next_extra_life_at {
            self.lives += 1;
            self.next_extra_life_at += EXTRA_LIFE_INTERVAL;
            self.sound_queue.push(SoundEvent::ExtraLife);
        }
    }
}

pub(crate) fn screen_center() -> Vec2 {
    Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0)
}
