use glam::{Mat4, Vec3};
use grove_common::Color;

/// Shadow projection parameters for the sun.
///
/// The sun renders the scene into a square depth map through an
/// orthographic volume centered on its view of the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub enabled: bool,
    /// Half-extent of the orthographic volume on both axes.
    pub extent: f32,
    pub near: f32,
    pub far: f32,
    /// Depth map resolution per side.
    pub map_size: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            extent: 100.0,
            near: 0.0,
            far: 250.0,
            map_size: 4096,
        }
    }
}

/// Directional sun light, always aimed at the world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub shadow: ShadowSettings,
}

impl Default for SunLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(100.0, 100.0, 100.0),
            color: Color::WHITE,
            intensity: 1.0,
            shadow: ShadowSettings::default(),
        }
    }
}

impl SunLight {
    /// Direction the light travels, toward the origin.
    pub fn direction(&self) -> Vec3 {
        (-self.position).try_normalize().unwrap_or(Vec3::NEG_Y)
    }

    /// Up vector for the light's view. Falls back to +Z when the light sits
    /// on the Y axis, where +Y would be degenerate.
    fn up(&self) -> Vec3 {
        if self.direction().y.abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let e = self.shadow.extent;
        Mat4::orthographic_rh(-e, e, -e, e, self.shadow.near, self.shadow.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space corners of the shadow volume, near quad then far quad,
    /// counterclockwise seen from the light.
    pub fn frustum_corners(&self) -> [Vec3; 8] {
        let inv_view = self.view_matrix().inverse();
        let e = self.shadow.extent;
        let mut corners = [Vec3::ZERO; 8];
        for (i, depth) in [self.shadow.near, self.shadow.far].into_iter().enumerate() {
            for (j, (x, y)) in [(-e, -e), (e, -e), (e, e), (-e, e)].into_iter().enumerate() {
                // Looking down -Z in view space, depth d sits at z = -d.
                corners[i * 4 + j] = inv_view.transform_point3(Vec3::new(x, y, -depth));
            }
        }
        corners
    }
}

/// Uniform fill light with no direction and no shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_origin() {
        let sun = SunLight::default();
        let expected = Vec3::new(-1.0, -1.0, -1.0).normalize();
        assert!((sun.direction() - expected).length() < 1e-6);
    }

    #[test]
    fn origin_is_inside_default_shadow_volume() {
        let sun = SunLight::default();
        let ndc = sun.view_projection().project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() <= 1.0);
        assert!(ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn overhead_light_is_not_degenerate() {
        let sun = SunLight {
            position: Vec3::new(0.0, 100.0, 0.0),
            ..SunLight::default()
        };
        let vp = sun.view_projection();
        assert!(vp.is_finite());
        for corner in sun.frustum_corners() {
            assert!(corner.is_finite());
        }
    }

    #[test]
    fn frustum_corners_span_near_and_far() {
        let sun = SunLight::default();
        let corners = sun.frustum_corners();
        let near_center = (corners[0] + corners[2]) / 2.0;
        let far_center = (corners[4] + corners[6]) / 2.0;
        let near_d = (near_center - sun.position).length();
        let far_d = (far_center - sun.position).length();
        assert!((near_d - sun.shadow.near).abs() < 1e-3);
        assert!((far_d - sun.shadow.far).abs() < 1e-2);
    }

    #[test]
    fn zero_position_falls_back_to_straight_down() {
        let sun = SunLight {
            position: Vec3::ZERO,
            ..SunLight::default()
        };
        assert_eq!(sun.direction(), Vec3::NEG_Y);
    }
}
