use crate::MoveCommand;
use grove_scene::Camera;

/// Applies movement commands and mouse look to a camera.
///
/// Each command moves the camera by exactly `step` along a ground-plane
/// axis the moment it arrives. There is no acceleration, no delta-time
/// scaling, and no bounds checking; held keys advance at the platform's
/// key-repeat rate.
#[derive(Debug, Clone, Copy)]
pub struct WalkController {
    /// World units per movement command.
    pub step: f32,
    /// Radians of look rotation per unit of raw mouse delta.
    pub sensitivity: f32,
}

impl Default for WalkController {
    fn default() -> Self {
        Self {
            step: 2.0,
            sensitivity: 0.003,
        }
    }
}

impl WalkController {
    pub fn apply(&self, command: MoveCommand, camera: &mut Camera) {
        let delta = match command {
            MoveCommand::Forward => camera.flat_forward() * self.step,
            MoveCommand::Backward => camera.flat_forward() * -self.step,
            MoveCommand::StrafeLeft => camera.flat_right() * -self.step,
            MoveCommand::StrafeRight => camera.flat_right() * self.step,
        };
        camera.position += delta;
        tracing::trace!(?command, position = ?camera.position, "applied move command");
    }

    pub fn look(&self, dx: f32, dy: f32, camera: &mut Camera) {
        camera.yaw += dx * self.sensitivity;
        camera.pitch -= dy * self.sensitivity;
        camera.pitch = camera
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keymap;
    use glam::Vec3;
    use winit::keyboard::KeyCode;

    #[test]
    fn forward_steps_along_view_axis_only() {
        let ctl = WalkController::default();
        let mut cam = Camera::default();
        let start = cam.position;

        ctl.apply(MoveCommand::Forward, &mut cam);

        // Default camera faces -Z.
        assert!((cam.position - (start + Vec3::new(0.0, 0.0, -2.0))).length() < 1e-5);
        assert_eq!(cam.yaw, Camera::default().yaw);
        assert_eq!(cam.pitch, Camera::default().pitch);
    }

    #[test]
    fn backward_is_the_inverse_of_forward() {
        let ctl = WalkController::default();
        let mut cam = Camera::default();
        let start = cam.position;
        ctl.apply(MoveCommand::Forward, &mut cam);
        ctl.apply(MoveCommand::Backward, &mut cam);
        assert!((cam.position - start).length() < 1e-5);
    }

    #[test]
    fn strafes_move_across_the_view_axis() {
        let ctl = WalkController::default();
        let mut cam = Camera::default();
        let start = cam.position;

        ctl.apply(MoveCommand::StrafeRight, &mut cam);
        assert!((cam.position - (start + Vec3::new(2.0, 0.0, 0.0))).length() < 1e-5);

        ctl.apply(MoveCommand::StrafeLeft, &mut cam);
        ctl.apply(MoveCommand::StrafeLeft, &mut cam);
        assert!((cam.position - (start + Vec3::new(-2.0, 0.0, 0.0))).length() < 1e-5);
    }

    #[test]
    fn step_length_ignores_pitch() {
        let ctl = WalkController::default();
        let mut cam = Camera::default();
        cam.pitch = -75.0_f32.to_radians();
        let start = cam.position;

        ctl.apply(MoveCommand::Forward, &mut cam);

        let moved = cam.position - start;
        assert!((moved.length() - ctl.step).abs() < 1e-5);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn every_mapped_key_moves_exactly_one_step() {
        let map = Keymap::wasd();
        let ctl = WalkController::default();
        for key in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyD] {
            let mut cam = Camera::default();
            let start = cam.position;
            let command = map.command_for(key).unwrap();
            ctl.apply(command, &mut cam);
            let moved = cam.position - start;
            assert!((moved.length() - ctl.step).abs() < 1e-5);
            assert_eq!(moved.y, 0.0);
        }
    }

    #[test]
    fn look_clamps_pitch_short_of_the_poles() {
        let ctl = WalkController::default();
        let mut cam = Camera::default();
        ctl.look(0.0, 1.0e6, &mut cam);
        assert!((cam.pitch - (-89.0_f32.to_radians())).abs() < 1e-6);
        ctl.look(0.0, -2.0e6, &mut cam);
        assert!((cam.pitch - 89.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn look_turns_yaw_by_sensitivity() {
        let ctl = WalkController::default();
        let mut cam = Camera::default();
        let yaw0 = cam.yaw;
        ctl.look(100.0, 0.0, &mut cam);
        assert!((cam.yaw - (yaw0 + 100.0 * ctl.sensitivity)).abs() < 1e-6);
    }
}
