// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! csgrs-backed BSP evaluator

use super::{BooleanEvaluator, BooleanOp};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
use nalgebra::{Point3, Vector3};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

/// Exact mesh booleans through csgrs BSP trees
#[derive(Debug, Default, Clone, Copy)]
pub struct BspEvaluator;

impl BspEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Convert our Mesh format to csgrs Mesh format.
    ///
    /// Triangles whose area is below `epsilon` are dropped so no NaN
    /// normals reach the BSP splitter.
    fn mesh_to_csgrs(mesh: &Mesh, epsilon: f64) -> CSGMesh<()> {
        if mesh.is_empty() {
            return CSGMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            };
        }

        let threshold = epsilon.max(1e-12);
        let mut polygons = Vec::with_capacity(mesh.triangle_count());

        for [v0, v1, v2] in mesh.triangles() {
            let face_normal =
                match (v1 - v0).cross(&(v2 - v0)).try_normalize(threshold * threshold) {
                    Some(n) => n,
                    None => continue,
                };

            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];
            polygons.push(Polygon::new(vertices, None));
        }

        CSGMesh::from_polygons(&polygons, None)
    }

    /// Convert csgrs Mesh format back to our Mesh format
    fn csgrs_to_mesh(csg_mesh: &CSGMesh<()>) -> Mesh {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points_3d: Vec<Point3<f64>> = vertices
                .iter()
                .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
                .collect();

            // Prefer the polygon's own normal; recompute when it is unusable
            let raw_normal = Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            );
            let normal = match raw_normal.try_normalize(1e-10) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => match calculate_polygon_normal(&points_3d).try_normalize(1e-10) {
                    Some(n) => n,
                    None => continue,
                },
            };

            let base_idx = mesh.vertex_count() as u32;

            if points_3d.len() == 3 {
                for p in &points_3d {
                    mesh.add_vertex(*p, normal);
                }
                mesh.add_triangle(base_idx, base_idx + 1, base_idx + 2);
                continue;
            }

            // Projection along the polygon normal preserves its winding
            let (points_2d, _, _, _) = project_to_2d(&points_3d, &normal);
            let indices = match triangulate_polygon(&points_2d) {
                Ok(idx) => idx,
                Err(_) => continue,
            };

            for p in &points_3d {
                mesh.add_vertex(*p, normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(
                    base_idx + tri[0] as u32,
                    base_idx + tri[1] as u32,
                    base_idx + tri[2] as u32,
                );
            }
        }

        mesh
    }
}

impl BooleanEvaluator for BspEvaluator {
    fn name(&self) -> &'static str {
        "bsp"
    }

    fn evaluate(&self, op: BooleanOp, a: &Mesh, b: &Mesh, epsilon: f64) -> Result<Mesh> {
        use csgrs::traits::CSG;

        let lhs = Self::mesh_to_csgrs(a, epsilon);
        let rhs = Self::mesh_to_csgrs(b, epsilon);
        if lhs.polygons.is_empty() {
            return Err(Error::BooleanOperationFailed(format!(
                "{}: first operand has no usable faces",
                op
            )));
        }

        // Deep BSP recursion on pathological input can panic inside csgrs
        let result = catch_unwind(AssertUnwindSafe(|| match op {
            BooleanOp::Union => lhs.union(&rhs),
            BooleanOp::Difference => lhs.difference(&rhs),
            BooleanOp::Intersection => lhs.intersection(&rhs),
        }))
        .map_err(|_| Error::BooleanOperationFailed(format!("{}: csgrs panicked", op)))?;

        Ok(Self::csgrs_to_mesh(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::extrude_ring;
    use crate::ring::Ring;

    fn block(x0: f64, y0: f64, x1: f64, y1: f64, z0: f64, height: f64) -> Mesh {
        let ring = Ring::from_xy(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)], 0.0).unwrap();
        extrude_ring(&ring, height, z0).unwrap()
    }

    #[test]
    fn test_difference_cuts_through() {
        let wall = block(0.0, -10.0, 1000.0, 10.0, 0.0, 2800.0);
        let door = block(400.0, -40.0, 600.0, 40.0, -15.0, 2115.0);

        let result = BspEvaluator::new()
            .evaluate(BooleanOp::Difference, &wall, &door, 1e-5)
            .unwrap();

        assert!(result.is_well_formed());
        assert!(result.triangle_count() > wall.triangle_count());
        let (min, max) = result.bounds();
        assert_eq!((min.x, max.x), (0.0, 1000.0));
        assert_eq!(max.z, 2800.0);

        // Nothing left inside the doorway
        for i in 0..result.vertex_count() {
            let p = result.position(i);
            let in_doorway = p.x > 401.0 && p.x < 599.0 && p.z < 2099.0;
            assert!(!in_doorway, "vertex inside doorway: {:?}", p);
        }
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = block(0.0, 0.0, 10.0, 10.0, 0.0, 10.0);
        let b = block(100.0, 100.0, 110.0, 110.0, 0.0, 10.0);
        let result = BspEvaluator::new()
            .evaluate(BooleanOp::Intersection, &a, &b, 1e-5)
            .unwrap();
        assert_eq!(result.triangle_count(), 0);
    }

    #[test]
    fn test_empty_first_operand_fails() {
        let b = block(0.0, 0.0, 1.0, 1.0, 0.0, 1.0);
        let result = BspEvaluator::new().evaluate(BooleanOp::Union, &Mesh::new(), &b, 1e-5);
        assert!(result.is_err());
    }
}
