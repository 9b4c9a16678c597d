//! Headless arcade simulation used as the training environment.
//!
//! The crate models a wrap-around asteroid field with a thrust-and-rotate ship, splitting
//! asteroids, a roaming saucer that fires back, hyperspace jumps, lives and waves. Nothing
//! here renders or plays audio: one-shot sound events are queued in the [`World`] and the
//! consumer decides what to do with them (the training harness simply discards them).
//!
//! # Modules
//!
//! - [`core`] - plain data: vectors, bodies and the entity structs
//! - [`engine`] - the [`World`], its per-tick systems and the [`AiAction`] control input
//!
//! # Example
//!
//! ```
//! use asteroids_engine::{AiAction, World};
//!
//! let mut world = World::new(42);
//! for _ in 0..60 {
//!     world.step(AiAction { thrust: true, ..AiAction::default() });
//!     world.clear_sound_queue();
//! }
//! assert_eq!(world.lives(), 3);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Width of the toroidal playfield in pixels.
pub const SCREEN_WIDTH: f64 = 800.0;
/// Height of the toroidal playfield in pixels.
pub const SCREEN_HEIGHT: f64 = 600.0;

/// Collision radius of the player ship.
pub const PLAYER_RADIUS: f64 = 15.0;
/// Player speed cap in pixels per tick.
pub const MAX_SPEED: f64 = 5.0;
/// Player bullet speed in pixels per tick.
pub const BULLET_SPEED: f64 = 7.0;
/// Maximum number of player bullets alive at once.
pub const MAX_PLAYER_BULLETS: usize = 4;
