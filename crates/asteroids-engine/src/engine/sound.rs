/// A one-shot sound cue emitted by a system.
///
/// The world only queues these; a host with audio drains the queue each tick, a headless
/// host clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum SoundEvent {
    Fire,
    ExplosionSmall,
    ExplosionMedium,
    ExplosionLarge,
    PlayerDeath,
    ExtraLife,
}
