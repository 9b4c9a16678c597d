use std::f64::consts::TAU;

use rand::{Rng as _, seq::IndexedRandom as _};

use crate::{
    MAX_PLAYER_BULLETS, MAX_SPEED, SCREEN_HEIGHT, SCREEN_WIDTH,
    core::Vec2,
    engine::{
        AiAction, SoundEvent,
        world::{SAUCER_RESPAWN_DELAY, SAUCER_SHOOT_COOLDOWN, SAUCER_VERTICAL_TIMER, World},
    },
};

pub(crate) const ROTATION_SPEED: f64 = 0.05;
pub(crate) const THRUST_POWER: f64 = 0.12;
pub(crate) const FRICTION: f64 = 0.99;

const HYPERSPACE_COOLDOWN: u32 = 30;
const HYPERSPACE_DEATH_CHANCE: f64 = 1.0 / 16.0;
const SAUCER_VERTICAL_SPEED: f64 = 0.8;

/// Everything [`World::detect_collisions`] found in one tick, by index into the entity lists.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollisionEvents {
    /// `(bullet, asteroid)` pairs; each bullet hits at most one asteroid.
    pub bullet_hits: Vec<(usize, usize)>,
    /// Player bullets that hit the saucer.
    pub saucer_hits: Vec<usize>,
    /// Whether the (vulnerable) player touched an asteroid, a saucer bullet or the saucer.
    pub player_hit: bool,
}

impl World {
    /// Runs one full tick with `action` as the player's input.
    pub fn step(&mut self, action: AiAction) {
        self.apply_action(action);
        self.physics();
        self.wrap();
        self.tick_invulnerability();
        self.tick_bullet_lifetimes();
        self.spawn_saucer_when_due();
        self.saucer_ai();
        self.tick_saucer_bullet_lifetimes();
        self.despawn_saucer();
        self.hyperspace();
        self.shoot();
        let events = self.detect_collisions();
        self.respond_to_collisions(&events);
        self.clear_wave();
    }

    /// Applies the control input to the player: rotation, thrust (speed-capped), friction,
    /// and the shoot/hyperspace triggers consumed later in the tick.
    pub fn apply_action(&mut self, action: AiAction) {
        let Some(player) = &mut self.player else {
            return;
        };
        if action.rotate_left {
            player.angle -= ROTATION_SPEED;
        }
        if action.rotate_right {
            player.angle += ROTATION_SPEED;
        }

        player.thrusting = action.thrust;
        let velocity = &mut player.body.velocity;
        if player.thrusting {
            *velocity += Vec2::from_angle(player.angle, THRUST_POWER);
            let speed = velocity.length();
            if speed > MAX_SPEED {
                *velocity = velocity.scaled(MAX_SPEED / speed);
            }
        }
        *velocity = velocity.scaled(FRICTION);

        player.shoot_pressed = action.shoot;
        player.hyperspace_pressed = action.hyperspace;
    }

    /// Moves every body by its velocity.
    pub fn physics(&mut self) {
        if let Some(player) = &mut self.player {
            player.body.advance();
        }
        for asteroid in &mut self.asteroids {
            asteroid.body.advance();
        }
        for bullet in self.bullets.iter_mut().chain(&mut self.saucer_bullets) {
            bullet.body.advance();
        }
        if let Some(saucer) = &mut self.saucer {
            saucer.body.advance();
        }
    }

    /// Wraps everything except the saucer around the screen edges.
    pub fn wrap(&mut self) {
        if let Some(player) = &mut self.player {
            player.body.wrap(SCREEN_WIDTH, SCREEN_HEIGHT);
        }
        let bodies = self
            .asteroids
            .iter_mut()
            .map(|a| &mut a.body)
            .chain(self.bullets.iter_mut().map(|b| &mut b.body))
            .chain(self.saucer_bullets.iter_mut().map(|b| &mut b.body));
        for body in bodies {
            body.wrap(SCREEN_WIDTH, SCREEN_HEIGHT);
        }
    }

    pub fn tick_invulnerability(&mut self) {
        let Some(player) = &mut self.player else {
            return;
        };
        if player.invulnerable {
            player.invulnerable_timer = player.invulnerable_timer.saturating_sub(1);
            if player.invulnerable_timer == 0 {
                player.invulnerable = false;
            }
        }
    }

    pub fn tick_bullet_lifetimes(&mut self) {
        tick_lifetimes(&mut self.bullets);
    }

    pub fn tick_saucer_bullet_lifetimes(&mut self) {
        tick_lifetimes(&mut self.saucer_bullets);
    }

    /// Counts down the saucer spawn timer while no saucer is on screen.
    pub fn spawn_saucer_when_due(&mut self) {
        if self.saucer.is_some() {
            return;
        }
        self.saucer_spawn_timer = self.saucer_spawn_timer.saturating_sub(1);
        if self.saucer_spawn_timer == 0 {
            let size = self.choose_saucer_size();
            self.spawn_saucer(size);
            self.saucer_spawn_timer = SAUCER_RESPAWN_DELAY;
        }
    }

    /// Saucer shooting and vertical wandering.
    ///
    /// Small saucers aim at the player; large ones fire in a random direction.
    pub fn saucer_ai(&mut self) {
        let player_position = self.player.map(|p| p.body.position).unwrap_or_default();
        let Some(saucer) = &mut self.saucer else {
            return;
        };

        saucer.shoot_cooldown = saucer.shoot_cooldown.saturating_sub(1);
        let shot = if saucer.shoot_cooldown == 0 {
            saucer.shoot_cooldown = self.rng.random_range(SAUCER_SHOOT_COOLDOWN);
            let origin = saucer.body.position;
            let angle = match saucer.size {
                crate::SaucerSize::Small => {
                    let d = player_position - origin;
                    d.y.atan2(d.x)
                }
                crate::SaucerSize::Large => self.rng.random_range(0.0..TAU),
            };
            Some((origin, angle))
        } else {
            None
        };

        saucer.vertical_timer = saucer.vertical_timer.saturating_sub(1);
        if saucer.vertical_timer == 0 {
            let choices = [-SAUCER_VERTICAL_SPEED, 0.0, SAUCER_VERTICAL_SPEED];
            saucer.body.velocity.y = choices.choose(&mut self.rng).copied().unwrap_or(0.0);
            saucer.vertical_timer = self.rng.random_range(SAUCER_VERTICAL_TIMER);
        }

        let pos = &mut saucer.body.position;
        if pos.y < 0.0 {
            pos.y += SCREEN_HEIGHT;
        } else if pos.y > SCREEN_HEIGHT {
            pos.y -= SCREEN_HEIGHT;
        }

        if let Some((origin, angle)) = shot {
            self.spawn_saucer_bullet(origin, angle);
        }
    }

    /// Removes a saucer that has fully crossed to the far edge and restarts the spawn timer.
    pub fn despawn_saucer(&mut self) {
        let Some(saucer) = &self.saucer else {
            return;
        };
        let x = saucer.body.position.x;
        let radius = saucer.body.radius;
        let gone = (saucer.direction_x > 0.0 && x > SCREEN_WIDTH + radius)
            || (saucer.direction_x < 0.0 && x < -radius);
        if gone {
            self.saucer = None;
            self.saucer_spawn_timer = SAUCER_RESPAWN_DELAY;
        }
    }

    /// Hyperspace jump: teleports to a random spot with zero velocity, or with a 1-in-16
    /// chance destroys the ship. A jump starts a 30-tick cooldown.
    pub fn hyperspace(&mut self) {
        let Some(player) = &mut self.player else {
            return;
        };
        if !player.hyperspace_pressed || player.hyperspace_cooldown > 0 {
            player.hyperspace_cooldown = player.hyperspace_cooldown.saturating_sub(1);
            return;
        }

        player.hyperspace_cooldown = HYPERSPACE_COOLDOWN;
        if self.rng.random::<f64>() < HYPERSPACE_DEATH_CHANCE {
            self.kill_player();
            return;
        }
        player.body.position = Vec2::new(
            self.rng.random::<f64>() * SCREEN_WIDTH,
            self.rng.random::<f64>() * SCREEN_HEIGHT,
        );
        player.body.velocity = Vec2::ZERO;
    }

    /// Fires a bullet while the trigger is held, up to [`MAX_PLAYER_BULLETS`] in flight.
    pub fn shoot(&mut self) {
        let wants_to_shoot = self.player.is_some_and(|p| p.shoot_pressed);
        if wants_to_shoot && self.bullets.len() < MAX_PLAYER_BULLETS {
            self.spawn_player_bullet();
        }
    }

    /// Finds bullet/asteroid, bullet/saucer and player collisions.
    ///
    /// Distances are straight-line (no wrap). The player is ignored while invulnerable.
    #[must_use]
    pub fn detect_collisions(&self) -> CollisionEvents {
        let mut events = CollisionEvents::default();

        for (bi, bullet) in self.bullets.iter().enumerate() {
            let bp = bullet.body.position;
            let hit = self.asteroids.iter().position(|a| {
                (bp - a.body.position).length_squared() < a.body.radius.powi(2)
            });
            if let Some(ai) = hit {
                events.bullet_hits.push((bi, ai));
            }
            if let Some(saucer) = &self.saucer
                && (bp - saucer.body.position).length_squared() < saucer.body.radius.powi(2)
            {
                events.saucer_hits.push(bi);
            }
        }

        let Some(player) = self.player.filter(|p| !p.invulnerable) else {
            return events;
        };
        let pp = player.body.position;
        let pr = player.body.radius;
        events.player_hit = self
            .asteroids
            .iter()
            .any(|a| pp.distance(a.body.position) < pr + a.body.radius)
            || self
                .saucer_bullets
                .iter()
                .any(|b| (pp - b.body.position).length_squared() < pr * pr)
            || self
                .saucer
                .is_some_and(|s| pp.distance(s.body.position) < pr + s.body.radius);

        events
    }

    /// Scores hits, splits asteroids, destroys the saucer and kills the player as reported.
    pub fn respond_to_collisions(&mut self, events: &CollisionEvents) {
        let mut dead_bullets = vec![false; self.bullets.len()];
        let mut dead_asteroids = vec![false; self.asteroids.len()];

        for &(bi, ai) in &events.bullet_hits {
            if dead_asteroids[ai] {
                continue;
            }
            dead_asteroids[ai] = true;
            dead_bullets[bi] = true;

            let asteroid = self.asteroids[ai];
            self.award(asteroid.size.score());
            self.sound_queue.push(asteroid.size.explosion_sound());
            if let Some(fragment) = asteroid.size.split() {
                self.spawn_asteroid(asteroid.body.position, fragment);
                self.spawn_asteroid(asteroid.body.position, fragment);
            }
        }

        if let Some(&bi) = events.saucer_hits.first()
            && let Some(saucer) = self.saucer.take()
        {
            dead_bullets[bi] = true;
            self.award(saucer.size.score());
            self.sound_queue.push(SoundEvent::ExplosionLarge);
            self.saucer_spawn_timer = SAUCER_RESPAWN_DELAY;
        }

        retain_alive(&mut self.bullets, &dead_bullets);
        retain_alive(&mut self.asteroids, &dead_asteroids);

        if events.player_hit {
            self.kill_player();
        }
    }

    /// Starts the next level once every asteroid is gone.
    pub fn clear_wave(&mut self) {
        if self.asteroids.is_empty() {
            self.level += 1;
            self.spawn_wave();
        }
    }
}

fn tick_lifetimes(bullets: &mut Vec<crate::Bullet>) {
    for bullet in bullets.iter_mut() {
        bullet.life = bullet.life.saturating_sub(1);
    }
    bullets.retain(|b| b.life > 0);
}

/// Drops entries flagged dead. Entries past the end of `dead` (spawned this tick) survive.
fn retain_alive<T>(items: &mut Vec<T>, dead: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !dead.get(index).copied().unwrap_or(false);
        index += 1;
        keep
    });
}
