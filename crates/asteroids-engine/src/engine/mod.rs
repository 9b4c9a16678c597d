//! World state and the per-tick systems that advance it.
//!
//! - [`World`] - the complete simulation state plus read accessors
//! - [`AiAction`] - the five-boolean control input applied in place of a keyboard
//! - [`SoundEvent`] - one-shot audio cues queued by the systems
//!
//! # Tick Order
//!
//! [`World::step`] runs the systems in a fixed order:
//!
//! ```text
//! apply_action → physics → wrap → invulnerability → bullet lifetimes
//!   → saucer spawn → saucer AI → saucer bullet lifetimes → saucer despawn
//!   → hyperspace → shooting → collision detection → collision response → wave clear
//! ```
//!
//! Each system is also public so a host can drive them individually.

pub use self::{action::*, sound::*, systems::*, world::*};

mod action;
mod sound;
mod systems;
mod world;
