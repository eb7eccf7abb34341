use glam::{Mat4, Vec3};

/// First-person camera: position, yaw, pitch, and projection parameters.
///
/// The camera is pure pose and math; how it moves is decided by the input
/// layer, which mutates these fields directly.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    /// Radians around +Y. `-90°` looks down `-Z`.
    pub yaw: f32,
    /// Radians above the horizon. Kept inside `(-90°, 90°)` by the input layer.
    pub pitch: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 10.0),
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            fov_y: 90.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Full view direction including pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// View direction projected onto the ground plane. Walking moves along
    /// this axis so looking up or down never changes the step length.
    pub fn flat_forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin()).normalize()
    }

    /// Ground-plane strafe axis, perpendicular to [`Self::flat_forward`].
    pub fn flat_right(&self) -> Vec3 {
        self.flat_forward().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = Camera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 2.0, 10.0));
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn default_looks_down_negative_z() {
        let cam = Camera::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.flat_right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn flat_basis_stays_on_ground_plane() {
        let mut cam = Camera::default();
        cam.pitch = 45.0_f32.to_radians();
        assert_eq!(cam.flat_forward().y, 0.0);
        assert_eq!(cam.flat_right().y, 0.0);
        assert!((cam.flat_forward().length() - 1.0).abs() < 1e-6);
        assert!(cam.flat_forward().dot(cam.flat_right()).abs() < 1e-6);
    }

    #[test]
    fn pitch_never_changes_flat_forward() {
        let mut level = Camera::default();
        level.yaw = 30.0_f32.to_radians();
        let mut tilted = level;
        tilted.pitch = -80.0_f32.to_radians();
        assert!((level.flat_forward() - tilted.flat_forward()).length() < 1e-6);
    }
}
