use crate::{PLAYER_RADIUS, core::body::Body, engine::SoundEvent};

/// The three asteroid sizes. A shot asteroid splits into two of the next smaller size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    #[must_use]
    pub const fn radius(self) -> f64 {
        match self {
            Self::Large => 40.0,
            Self::Medium => 20.0,
            Self::Small => 10.0,
        }
    }

    /// Nominal speed; each spawned asteroid gets `base_speed × U[0.5, 1.5)`.
    #[must_use]
    pub const fn base_speed(self) -> f64 {
        match self {
            Self::Large => 1.0,
            Self::Medium => 1.8,
            Self::Small => 2.5,
        }
    }

    #[must_use]
    pub const fn score(self) -> u32 {
        match self {
            Self::Large => 20,
            Self::Medium => 50,
            Self::Small => 100,
        }
    }

    /// Size of the fragments this asteroid breaks into, if any.
    #[must_use]
    pub const fn split(self) -> Option<Self> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => None,
        }
    }

    pub(crate) const fn explosion_sound(self) -> SoundEvent {
        match self {
            Self::Large => SoundEvent::ExplosionLarge,
            Self::Medium => SoundEvent::ExplosionMedium,
            Self::Small => SoundEvent::ExplosionSmall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asteroid {
    pub body: Body,
    pub size: AsteroidSize,
}

/// The player ship and its control state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub body: Body,
    /// Facing angle in radians; 0 points along +x, −π/2 points up.
    pub angle: f64,
    pub thrusting: bool,
    pub shoot_pressed: bool,
    pub hyperspace_pressed: bool,
    pub invulnerable: bool,
    pub invulnerable_timer: u32,
    pub hyperspace_cooldown: u32,
}

impl Player {
    pub(crate) const SPAWN_ANGLE: f64 = -std::f64::consts::FRAC_PI_2;
    pub(crate) const INVULNERABLE_TICKS: u32 = 120;

    pub(crate) fn spawn(body: Body) -> Self {
        Self {
            body: Body {
                radius: PLAYER_RADIUS,
                ..body
            },
            angle: Self::SPAWN_ANGLE,
            thrusting: false,
            shoot_pressed: false,
            hyperspace_pressed: false,
            invulnerable: true,
            invulnerable_timer: Self::INVULNERABLE_TICKS,
            hyperspace_cooldown: 0,
        }
    }
}

/// A projectile with a limited lifetime, fired by either the player or the saucer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub body: Body,
    pub life: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaucerSize {
    /// Fires in random directions.
    Large,
    /// Aims at the player.
    Small,
}

impl SaucerSize {
    #[must_use]
    pub const fn radius(self) -> f64 {
        match self {
            Self::Large => 20.0,
            Self::Small => 10.0,
        }
    }

    #[must_use]
    pub const fn speed(self) -> f64 {
        match self {
            Self::Large => 1.5,
            Self::Small => 2.5,
        }
    }

    #[must_use]
    pub const fn score(self) -> u32 {
        match self {
            Self::Large => 200,
            Self::Small => 1000,
        }
    }
}

/// The roaming hostile craft. It crosses the screen horizontally and never wraps on x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saucer {
    pub body: Body,
    pub size: SaucerSize,
    /// `+1.0` when travelling right, `-1.0` when travelling left.
    pub direction_x: f64,
    pub shoot_cooldown: u32,
    pub vertical_timer: u32,
}
