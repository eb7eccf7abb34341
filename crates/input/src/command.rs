/// A camera movement command produced by the key lookup table.
///
/// The walkthrough consumes commands, never raw key events, so alternate
/// bindings all share the same movement logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveCommand {
    /// Step along the camera's ground-plane view direction.
    Forward,
    /// Step against the ground-plane view direction.
    Backward,
    /// Step left, perpendicular to the view direction.
    StrafeLeft,
    /// Step right, perpendicular to the view direction.
    StrafeRight,
}
