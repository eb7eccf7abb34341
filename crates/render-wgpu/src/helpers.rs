//! CPU-built line geometry for debug helpers.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex format shared by all helper lines.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Axes gizmo at the origin: +X red, +Y green, +Z blue.
pub(crate) fn axes_lines(size: f32) -> Vec<LineVertex> {
    let axes = [
        (Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        (Vec3::Y, [0.0, 1.0, 0.0, 1.0]),
        (Vec3::Z, [0.0, 0.0, 1.0, 1.0]),
    ];
    let mut verts = Vec::with_capacity(6);
    for (dir, color) in axes {
        verts.push(LineVertex {
            position: [0.0; 3],
            color,
        });
        verts.push(LineVertex {
            position: (dir * size).to_array(),
            color,
        });
    }
    verts
}

/// Wireframe of the sun's shadow volume: near and far quads, the four
/// connecting edges, and four lines back to the light position.
///
/// `corners` holds the near quad then the far quad, matching
/// `SunLight::frustum_corners`.
pub(crate) fn frustum_lines(corners: &[Vec3; 8], light_pos: Vec3) -> Vec<LineVertex> {
    const COLOR: [f32; 4] = [1.0, 0.67, 0.0, 1.0];
    let mut verts = Vec::with_capacity(32);
    let mut edge = |a: Vec3, b: Vec3| {
        verts.push(LineVertex {
            position: a.to_array(),
            color: COLOR,
        });
        verts.push(LineVertex {
            position: b.to_array(),
            color: COLOR,
        });
    };
    for i in 0..4 {
        let next = (i + 1) % 4;
        edge(corners[i], corners[next]);
        edge(corners[4 + i], corners[4 + next]);
        edge(corners[i], corners[4 + i]);
        edge(light_pos, corners[i]);
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_scene::SunLight;

    #[test]
    fn axes_span_each_axis() {
        let verts = axes_lines(5.0);
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[1].position, [5.0, 0.0, 0.0]);
        assert_eq!(verts[3].position, [0.0, 5.0, 0.0]);
        assert_eq!(verts[5].position, [0.0, 0.0, 5.0]);
        assert_ne!(verts[0].color, verts[2].color);
        assert_ne!(verts[2].color, verts[4].color);
    }

    #[test]
    fn frustum_wireframe_is_sixteen_edges() {
        let sun = SunLight::default();
        let verts = frustum_lines(&sun.frustum_corners(), sun.position);
        assert_eq!(verts.len(), 32);
        for v in &verts {
            assert!(v.position.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn four_edges_touch_the_light() {
        let sun = SunLight::default();
        let verts = frustum_lines(&sun.frustum_corners(), sun.position);
        let at_light = verts
            .iter()
            .filter(|v| v.position == sun.position.to_array())
            .count();
        assert_eq!(at_light, 4);
    }
}
