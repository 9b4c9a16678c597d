/// Control input for one tick.
///
/// Replaces interactive keyboard input: whatever drives the player (a neural agent, a
/// scripted test agent) produces one of these per tick and the world applies it through
/// [`World::apply_action`](crate::World::apply_action).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AiAction {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub shoot: bool,
    pub hyperspace: bool,
}

impl AiAction {
    /// Builds an action from five flags in output order:
    /// rotate left, rotate right, thrust, shoot, hyperspace.
    #[must_use]
    pub const fn from_flags(flags: [bool; 5]) -> Self {
        let [rotate_left, rotate_right, thrust, shoot, hyperspace] = flags;
        Self {
            rotate_left,
            rotate_right,
            thrust,
            shoot,
            hyperspace,
        }
    }
}
