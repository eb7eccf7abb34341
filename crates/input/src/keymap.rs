use crate::MoveCommand;
use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Fixed key-to-command lookup table.
///
/// Lookup is a pure function of the key code: a mapped key yields its
/// command, anything else yields nothing.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyCode, MoveCommand>,
}

impl Keymap {
    /// The standard WASD walking layout.
    pub fn wasd() -> Self {
        let bindings = HashMap::from([
            (KeyCode::KeyW, MoveCommand::Forward),
            (KeyCode::KeyA, MoveCommand::StrafeLeft),
            (KeyCode::KeyS, MoveCommand::Backward),
            (KeyCode::KeyD, MoveCommand::StrafeRight),
        ]);
        Self { bindings }
    }

    /// Add or replace a binding, builder style.
    pub fn bind(mut self, key: KeyCode, command: MoveCommand) -> Self {
        self.bindings.insert(key, command);
        self
    }

    pub fn command_for(&self, key: KeyCode) -> Option<MoveCommand> {
        self.bindings.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::wasd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_layout_is_complete() {
        let map = Keymap::wasd();
        assert_eq!(map.len(), 4);
        assert_eq!(map.command_for(KeyCode::KeyW), Some(MoveCommand::Forward));
        assert_eq!(map.command_for(KeyCode::KeyA), Some(MoveCommand::StrafeLeft));
        assert_eq!(map.command_for(KeyCode::KeyS), Some(MoveCommand::Backward));
        assert_eq!(
            map.command_for(KeyCode::KeyD),
            Some(MoveCommand::StrafeRight)
        );
    }

    #[test]
    fn unmapped_keys_yield_nothing() {
        let map = Keymap::wasd();
        for key in [
            KeyCode::KeyQ,
            KeyCode::KeyE,
            KeyCode::Space,
            KeyCode::ArrowUp,
            KeyCode::Escape,
        ] {
            assert_eq!(map.command_for(key), None);
        }
    }

    #[test]
    fn bind_replaces_existing_binding() {
        let map = Keymap::wasd().bind(KeyCode::KeyW, MoveCommand::Backward);
        assert_eq!(map.command_for(KeyCode::KeyW), Some(MoveCommand::Backward));
        assert_eq!(map.len(), 4);
    }
}
