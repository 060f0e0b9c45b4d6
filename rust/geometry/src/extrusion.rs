// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting closed rings to closed solids

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::Triangulation;
use crate::ring::Ring;
use crate::solid::{Solid, SolidTags};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Extrude a ring vertically.
///
/// Produces a bottom cap at `base_z` facing -Z, a congruent top cap at
/// `base_z + height` facing +Z, and two triangles per ring edge. The ring
/// is rewound counter-clockwise first so every face points outward.
pub fn extrude_ring(ring: &Ring, height: f64, base_z: f64) -> Result<Mesh> {
    if !height.is_finite() || height <= 0.0 {
        return Err(Error::InvalidExtrusion(format!(
            "height must be positive, got {}",
            height
        )));
    }
    if !base_z.is_finite() {
        return Err(Error::InvalidExtrusion("base elevation is not finite".to_string()));
    }
    if ring.len() < 3 {
        return Err(Error::InvalidExtrusion(format!(
            "ring has {} points",
            ring.len()
        )));
    }

    let ring = ring.to_counter_clockwise();
    let profile = ring.to_profile();
    let triangulation = profile
        .triangulate()
        .map_err(|e| Error::InvalidExtrusion(e.to_string()))?;

    let top_z = base_z + height;
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + profile.outer.len() * 4,
        triangulation.indices.len() * 2 + profile.outer.len() * 6,
    );

    create_cap_mesh(&triangulation, base_z, true, &mut mesh);
    create_cap_mesh(&triangulation, top_z, false, &mut mesh);
    create_side_walls(&profile.outer, base_z, top_z, &mut mesh);

    Ok(mesh)
}

/// Extrude a ring into a tagged solid
pub fn extrude_solid(ring: &Ring, height: f64, base_z: f64, tags: SolidTags) -> Result<Solid> {
    Ok(Solid::new(extrude_ring(ring, height, base_z)?, tags))
}

/// Create a cap from a counter-clockwise triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, facing_down: bool, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let normal = if facing_down { -Vector3::z() } else { Vector3::z() };

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        if facing_down {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create side walls for a counter-clockwise boundary
#[inline]
fn create_side_walls(boundary: &[Point2<f64>], z_bottom: f64, z_top: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let p0 = &boundary[i];
        let p1 = &boundary[(i + 1) % boundary.len()];

        // Outward for counter-clockwise winding
        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(Point3::new(p0.x, p0.y, z_bottom), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, z_bottom), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, z_top), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, z_top), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }
}

/// Apply transformation matrix to mesh
#[inline]
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Normals use the inverse transpose
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous())
            .xyz()
            .try_normalize(1e-12)
            .unwrap_or(normal);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });
}
