//! Procedural primitive meshes.
//!
//! All generators produce counterclockwise front faces for a viewer
//! outside the solid, matching the renderer's back-face culling.

use crate::MeshData;
use glam::Vec3;
use std::f32::consts::TAU;

/// Flat rectangle on the XZ plane, centered at the origin, facing +Y.
pub fn plane(width: f32, depth: f32) -> MeshData {
    let hw = width / 2.0;
    let hd = depth / 2.0;
    MeshData {
        positions: vec![
            Vec3::new(-hw, 0.0, -hd),
            Vec3::new(hw, 0.0, -hd),
            Vec3::new(hw, 0.0, hd),
            Vec3::new(-hw, 0.0, hd),
        ],
        normals: vec![Vec3::Y; 4],
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// Capped cylinder around the Y axis, centered at the origin.
///
/// Side normals are smooth around the circumference; caps carry their own
/// duplicated vertices so the rim stays a hard edge.
pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let h = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;
    let mut mesh = MeshData::default();

    // Side rings, top and bottom vertex per step.
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let normal = Vec3::new(cos, slope, sin).normalize();
        mesh.positions.push(Vec3::new(radius_top * cos, h, radius_top * sin));
        mesh.normals.push(normal);
        mesh.positions
            .push(Vec3::new(radius_bottom * cos, -h, radius_bottom * sin));
        mesh.normals.push(normal);
    }
    for i in 0..segments {
        let t0 = i * 2;
        let b0 = t0 + 1;
        let t1 = t0 + 2;
        let b1 = t0 + 3;
        mesh.indices.extend_from_slice(&[t0, t1, b0, t1, b1, b0]);
    }

    // Caps: center plus a duplicated ring with axial normals.
    for (y, radius, normal) in [(h, radius_top, Vec3::Y), (-h, radius_bottom, Vec3::NEG_Y)] {
        let center = mesh.positions.len() as u32;
        mesh.positions.push(Vec3::new(0.0, y, 0.0));
        mesh.normals.push(normal);
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.positions.push(Vec3::new(radius * cos, y, radius * sin));
            mesh.normals.push(normal);
        }
        for i in 0..segments {
            let ring = center + 1 + i;
            if normal.y > 0.0 {
                mesh.indices.extend_from_slice(&[center, ring + 1, ring]);
            } else {
                mesh.indices.extend_from_slice(&[center, ring, ring + 1]);
            }
        }
    }

    mesh
}

/// Regular dodecahedron with its vertices on the sphere of the given
/// radius. Normals point radially, so shading rolls smoothly across the
/// pentagonal faces in the toon ramp.
pub fn dodecahedron(radius: f32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let r = 1.0 / t;

    // The 20 vertices of the unit-coordinate dodecahedron, all at length
    // sqrt(3): the cube corners plus one rectangle per coordinate plane.
    let raw: [Vec3; 20] = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(0.0, -r, -t),
        Vec3::new(0.0, -r, t),
        Vec3::new(0.0, r, -t),
        Vec3::new(0.0, r, t),
        Vec3::new(-r, -t, 0.0),
        Vec3::new(-r, t, 0.0),
        Vec3::new(r, -t, 0.0),
        Vec3::new(r, t, 0.0),
        Vec3::new(-t, 0.0, -r),
        Vec3::new(t, 0.0, -r),
        Vec3::new(-t, 0.0, r),
        Vec3::new(t, 0.0, r),
    ];

    let scale = radius / 3.0_f32.sqrt();
    let normals: Vec<Vec3> = raw.iter().map(|v| v.normalize()).collect();
    let positions: Vec<Vec3> = raw.iter().map(|v| *v * scale).collect();

    // Pentagon normals: sign combinations over cyclic permutations of
    // (0, phi, 1), the dual icosahedron's vertex directions.
    let mut face_dirs = Vec::with_capacity(12);
    for st in [-1.0f32, 1.0] {
        for s1 in [-1.0f32, 1.0] {
            face_dirs.push(Vec3::new(0.0, st * t, s1));
            face_dirs.push(Vec3::new(s1, 0.0, st * t));
            face_dirs.push(Vec3::new(st * t, s1, 0.0));
        }
    }

    let mut indices = Vec::with_capacity(108);
    for dir in face_dirs {
        let n = dir.normalize();
        // The five vertices of this face all project near 0.79 onto the
        // face normal; every other vertex lands at or below 0.19.
        let mut ring: Vec<u32> = (0..raw.len() as u32)
            .filter(|&i| normals[i as usize].dot(n) > 0.5)
            .collect();
        debug_assert_eq!(ring.len(), 5);

        let helper = if n.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let u = n.cross(helper).normalize();
        let w = n.cross(u);
        let angle = |i: u32| {
            let p = positions[i as usize];
            p.dot(w).atan2(p.dot(u))
        };
        ring.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));

        for i in 1..4 {
            indices.extend_from_slice(&[ring[0], ring[i], ring[i + 1]]);
        }
    }

    MeshData {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle of a convex solid centered at the origin must wind
    /// counterclockwise seen from outside.
    fn assert_outward_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let a = mesh.positions[tri[0] as usize];
            let b = mesh.positions[tri[1] as usize];
            let c = mesh.positions[tri[2] as usize];
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                face.dot(centroid) > 0.0,
                "inward-facing triangle {tri:?} at {centroid:?}"
            );
        }
    }

    #[test]
    fn plane_is_flat_and_up_facing() {
        let mesh = plane(100.0, 100.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        for p in &mesh.positions {
            assert_eq!(p.y, 0.0);
            assert_eq!(p.x.abs(), 50.0);
            assert_eq!(p.z.abs(), 50.0);
        }
        for n in &mesh.normals {
            assert_eq!(*n, Vec3::Y);
        }
        for tri in mesh.indices.chunks(3) {
            let a = mesh.positions[tri[0] as usize];
            let b = mesh.positions[tri[1] as usize];
            let c = mesh.positions[tri[2] as usize];
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn cylinder_counts_follow_segments() {
        let segments = 8;
        let mesh = cylinder(1.0, 1.0, 7.0, segments);
        assert_eq!(mesh.vertex_count(), (4 * segments + 6) as usize);
        assert_eq!(mesh.index_count(), (12 * segments) as usize);
    }

    #[test]
    fn cylinder_spans_its_height() {
        let mesh = cylinder(1.0, 1.0, 7.0, 8);
        let max_y = mesh.positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let min_y = mesh.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 3.5);
        assert_eq!(min_y, -3.5);
    }

    #[test]
    fn straight_cylinder_side_normals_are_radial() {
        let segments = 8;
        let mesh = cylinder(1.0, 1.0, 7.0, segments);
        for i in 0..(2 * (segments + 1)) as usize {
            let n = mesh.normals[i];
            assert_eq!(n.y, 0.0);
            assert!((n.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn cylinder_winds_outward() {
        assert_outward_winding(&cylinder(1.0, 1.0, 7.0, 8));
    }

    #[test]
    fn dodecahedron_shape() {
        let mesh = dodecahedron(5.0);
        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.triangle_count(), 36);
        for p in &mesh.positions {
            assert!((p.length() - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn dodecahedron_normals_are_radial_and_unit() {
        let mesh = dodecahedron(5.0);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert!((p.normalize() - *n).length() < 1e-5);
        }
    }

    #[test]
    fn dodecahedron_winds_outward() {
        assert_outward_winding(&dodecahedron(5.0));
    }

    #[test]
    fn dodecahedron_uses_every_vertex() {
        let mesh = dodecahedron(1.0);
        let mut seen = [false; 20];
        for &i in &mesh.indices {
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
