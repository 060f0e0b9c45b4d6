// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane clipping and the axis-aligned box evaluator

use super::{BooleanEvaluator, BooleanOp};
use crate::bounds::Aabb;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

/// Plane definition for clipping
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Normal vector (normalized)
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a new plane
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Signed distance, positive in front
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }

    pub fn flipped(&self) -> Self {
        Self {
            point: self.point,
            normal: -self.normal,
        }
    }
}

/// Triangle definition
#[derive(Debug, Clone)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unit normal, `None` for a degenerate triangle
    pub fn normal(&self) -> Option<Vector3<f64>> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0)).try_normalize(1e-12)
    }

    pub fn area(&self) -> f64 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0)).norm() * 0.5
    }
}

/// Small inline buffer for the handful of triangles a clip produces
pub type TriangleVec = SmallVec<[Triangle; 8]>;

/// Triangle clipping result
#[derive(Debug, Clone)]
pub enum ClipResult {
    /// Completely in front (keep it)
    AllFront(Triangle),
    /// Completely behind (discard it)
    AllBehind,
    /// Straddles the plane; the front pieces
    Split(TriangleVec),
}

/// Plane clipper with a tolerance band
pub struct ClippingProcessor {
    /// Epsilon for floating point comparisons
    pub epsilon: f64,
}

impl ClippingProcessor {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Clip a triangle against a plane, keeping the part in front
    pub fn clip_triangle(&self, triangle: &Triangle, plane: &Plane) -> ClipResult {
        let verts = [triangle.v0, triangle.v1, triangle.v2];
        let dist = verts.map(|v| plane.signed_distance(&v));
        let front = dist.map(|d| d >= -self.epsilon);

        match front.iter().filter(|&&f| f).count() {
            0 => ClipResult::AllBehind,
            3 => ClipResult::AllFront(triangle.clone()),
            1 => {
                // Rotate so the lone front vertex comes first; winding is kept
                let k = front.iter().position(|&f| f).unwrap_or(0);
                let (a, b, c) = (k, (k + 1) % 3, (k + 2) % 3);
                let p1 = lerp(verts[a], verts[b], dist[a], dist[b]);
                let p2 = lerp(verts[a], verts[c], dist[a], dist[c]);

                let mut pieces = TriangleVec::new();
                pieces.push(Triangle::new(verts[a], p1, p2));
                ClipResult::Split(pieces)
            }
            _ => {
                // Rotate so the lone back vertex comes last
                let k = front.iter().position(|&f| !f).unwrap_or(0);
                let (a, b, c) = ((k + 1) % 3, (k + 2) % 3, k);
                let p1 = lerp(verts[b], verts[c], dist[b], dist[c]);
                let p2 = lerp(verts[a], verts[c], dist[a], dist[c]);

                let mut pieces = TriangleVec::new();
                pieces.push(Triangle::new(verts[a], verts[b], p1));
                pieces.push(Triangle::new(verts[a], p1, p2));
                ClipResult::Split(pieces)
            }
        }
    }

    /// Remove everything inside the box from a closed mesh.
    ///
    /// Triangles outside the box are kept as-is; straddling triangles are
    /// clipped and only their outside pieces kept. The parts of the six box
    /// faces that lie inside the mesh are added as reveal faces, so a
    /// closed input stays closed.
    pub fn subtract_box(&self, mesh: &Mesh, bounds: &Aabb) -> Mesh {
        let mut result = Mesh::with_capacity(mesh.vertex_count(), mesh.indices.len());
        let mut buffers = ClipBuffers::default();
        let eps = self.epsilon;
        let (open_min, open_max) = (bounds.min, bounds.max);

        for [v0, v1, v2] in mesh.triangles() {
            let tri = Triangle::new(v0, v1, v2);
            let tri_bounds = match Aabb::from_points([v0, v1, v2].iter()) {
                Some(b) => b,
                None => continue,
            };

            if !tri_bounds.intersects(bounds, -eps) || !triangle_intersects_box(&tri, bounds) {
                add_triangle_to_mesh(&mut result, &tri);
                continue;
            }

            let inside = tri_bounds.min.x >= open_min.x + eps
                && tri_bounds.max.x <= open_max.x - eps
                && tri_bounds.min.y >= open_min.y + eps
                && tri_bounds.max.y <= open_max.y - eps
                && tri_bounds.min.z >= open_min.z + eps
                && tri_bounds.max.z <= open_max.z - eps;
            if inside {
                continue;
            }

            self.clip_against_box(&tri, bounds, &mut buffers);
            for piece in &buffers.result {
                if piece.area() > eps * eps {
                    add_triangle_to_mesh(&mut result, piece);
                }
            }
        }

        for axis in 0..3 {
            self.add_reveal(&mut result, mesh, bounds, axis, true);
            self.add_reveal(&mut result, mesh, bounds, axis, false);
        }

        result
    }

    /// Cover the part of one box face that lies inside `mesh`.
    ///
    /// The face is the plane `axis = min` (or `max`) limited to the box.
    /// The mesh cross-section in that plane is cut into vertical slabs;
    /// within a slab the section edges do not cross, so inside intervals
    /// follow from crossing parity. Faces point into the box, which is
    /// outward for the carved result.
    fn add_reveal(&self, result: &mut Mesh, mesh: &Mesh, bounds: &Aabb, axis: usize, at_min: bool) {
        let eps = self.epsilon;
        let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
        let level = if at_min { bounds.min[axis] } else { bounds.max[axis] };
        let (u_min, u_max) = (bounds.min[u_axis], bounds.max[u_axis]);
        let (v_min, v_max) = (bounds.min[v_axis], bounds.max[v_axis]);

        let section = cross_section(mesh, axis, level);
        if section.is_empty() {
            return;
        }

        let mut breaks = vec![u_min, u_max];
        for edge in &section {
            for p in edge {
                breaks.push(p.0);
            }
            for v in [v_min, v_max] {
                if let Some(u) = edge_u_at(edge, v) {
                    breaks.push(u);
                }
            }
        }
        breaks.retain(|u| *u >= u_min && *u <= u_max);
        breaks.sort_by(|a, b| a.total_cmp(b));
        breaks.dedup_by(|a, b| (*a - *b).abs() <= eps);

        let lift = |u: f64, v: f64| {
            let mut p = Point3::origin();
            p[axis] = level;
            p[u_axis] = u;
            p[v_axis] = v;
            p
        };

        let mut crossings: Vec<(f64, f64, f64)> = Vec::new();
        for slab in breaks.windows(2) {
            let (u0, u1) = (slab[0], slab[1]);
            if u1 - u0 <= eps {
                continue;
            }
            let mid = 0.5 * (u0 + u1);

            crossings.clear();
            for edge in &section {
                let (a, b) = (edge[0], edge[1]);
                let (lo, hi) = (a.0.min(b.0), a.0.max(b.0));
                if hi - lo <= eps || lo > u0 + eps || hi < u1 - eps {
                    continue;
                }
                let at = |u: f64| a.1 + (b.1 - a.1) * (u - a.0) / (b.0 - a.0);
                crossings.push((at(mid), at(u0), at(u1)));
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Inside between the 1st and 2nd crossing, the 3rd and 4th, ...
            for pair in crossings.chunks_exact(2) {
                let (below, above) = (pair[0], pair[1]);
                let lo0 = below.1.max(v_min);
                let lo1 = below.2.max(v_min);
                let hi0 = above.1.min(v_max).max(lo0);
                let hi1 = above.2.min(v_max).max(lo1);
                if hi0 - lo0 <= eps && hi1 - lo1 <= eps {
                    continue;
                }

                let quad = [lift(u0, lo0), lift(u1, lo1), lift(u1, hi1), lift(u0, hi0)];
                let [a, b, c, d] = if at_min {
                    quad
                } else {
                    [quad[3], quad[2], quad[1], quad[0]]
                };
                add_triangle_to_mesh(result, &Triangle::new(a, b, c));
                add_triangle_to_mesh(result, &Triangle::new(a, c, d));
            }
        }
    }

    /// Clip-and-collect: peel off the outside part at each of the six
    /// inward-facing box planes; whatever survives all six is inside.
    fn clip_against_box(&self, tri: &Triangle, bounds: &Aabb, buffers: &mut ClipBuffers) {
        buffers.clear();
        let (min, max) = (bounds.min, bounds.max);
        let planes = [
            Plane::new(min, Vector3::x()),
            Plane::new(max, -Vector3::x()),
            Plane::new(min, Vector3::y()),
            Plane::new(max, -Vector3::y()),
            Plane::new(min, Vector3::z()),
            Plane::new(max, -Vector3::z()),
        ];

        buffers.remaining.push(tri.clone());
        for plane in &planes {
            buffers.next_remaining.clear();
            for piece in &buffers.remaining {
                match self.clip_triangle(piece, plane) {
                    ClipResult::AllFront(t) => buffers.next_remaining.push(t),
                    ClipResult::AllBehind => buffers.result.push(piece.clone()),
                    ClipResult::Split(inside) => {
                        buffers.next_remaining.extend(inside);
                        match self.clip_triangle(piece, &plane.flipped()) {
                            ClipResult::AllFront(t) => buffers.result.push(t),
                            ClipResult::Split(outside) => buffers.result.extend(outside),
                            ClipResult::AllBehind => {}
                        }
                    }
                }
            }
            std::mem::swap(&mut buffers.remaining, &mut buffers.next_remaining);
        }
    }
}

impl Default for ClippingProcessor {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

/// Reusable buffers for box clipping
#[derive(Default)]
struct ClipBuffers {
    /// Pieces outside the box
    result: TriangleVec,
    /// Pieces still to test against the remaining planes
    remaining: TriangleVec,
    next_remaining: TriangleVec,
}

impl ClipBuffers {
    #[inline]
    fn clear(&mut self) {
        self.result.clear();
        self.remaining.clear();
        self.next_remaining.clear();
    }
}

/// Section edge in face coordinates
type SectionEdge = [(f64, f64); 2];

/// Edges where the plane `axis = level` cuts the mesh, in the two
/// remaining coordinates. Vertices on the plane count as above it, so
/// neighbouring triangles agree on every crossing.
fn cross_section(mesh: &Mesh, axis: usize, level: f64) -> Vec<SectionEdge> {
    let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
    let mut edges = Vec::new();

    for tri in mesh.triangles() {
        let dist = tri.map(|p| p[axis] - level);
        let above = dist.map(|d| d >= 0.0);
        if above[0] == above[1] && above[1] == above[2] {
            continue;
        }

        let mut ends: SmallVec<[(f64, f64); 2]> = SmallVec::new();
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            if above[i] != above[j] {
                let p = lerp(tri[i], tri[j], dist[i], dist[j]);
                ends.push((p[u_axis], p[v_axis]));
            }
        }
        if let [a, b] = ends[..] {
            if a != b {
                edges.push([a, b]);
            }
        }
    }

    edges
}

/// Where a section edge crosses the line `v`, if it does
fn edge_u_at(edge: &SectionEdge, v: f64) -> Option<f64> {
    let [(u0, v0), (u1, v1)] = *edge;
    if (v0 - v) * (v1 - v) >= 0.0 || v0 == v1 {
        return None;
    }
    Some(u0 + (u1 - u0) * (v - v0) / (v1 - v0))
}

#[inline]
fn lerp(from: Point3<f64>, to: Point3<f64>, d_from: f64, d_to: f64) -> Point3<f64> {
    let t = d_from / (d_from - d_to);
    from + (to - from) * t
}

/// Add a triangle to a mesh with its face normal
fn add_triangle_to_mesh(mesh: &mut Mesh, triangle: &Triangle) {
    let normal = match triangle.normal() {
        Some(n) => n,
        None => return,
    };
    let base = mesh.vertex_count() as u32;
    mesh.add_vertex(triangle.v0, normal);
    mesh.add_vertex(triangle.v1, normal);
    mesh.add_vertex(triangle.v2, normal);
    mesh.add_triangle(base, base + 1, base + 2);
}

/// Separating axis test between a triangle and an axis-aligned box
pub(crate) fn triangle_intersects_box(tri: &Triangle, bounds: &Aabb) -> bool {
    let center = bounds.center();
    let half = bounds.size() * 0.5;

    let t = [tri.v0 - center, tri.v1 - center, tri.v2 - center];
    let edges = [t[1] - t[0], t[2] - t[1], t[0] - t[2]];
    let axes = [Vector3::x(), Vector3::y(), Vector3::z()];

    let separated_on = |axis: &Vector3<f64>| {
        let p = t.map(|v| v.dot(axis));
        let r = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
        p[0].max(p[1]).max(p[2]) < -r || p[0].min(p[1]).min(p[2]) > r
    };

    if axes.iter().any(|a| separated_on(a)) {
        return false;
    }

    let face_normal = edges[0].cross(&edges[1]);
    if face_normal.norm_squared() > 1e-20 && separated_on(&face_normal) {
        return false;
    }

    for axis in &axes {
        for edge in &edges {
            let cross = axis.cross(edge);
            if cross.norm_squared() < 1e-10 {
                continue;
            }
            if separated_on(&cross) {
                return false;
            }
        }
    }

    true
}

/// Box-clipping evaluator.
///
/// Difference removes everything inside the tool's bounding box and closes
/// the cut with reveal faces, which is exact for box-shaped openings.
/// Union concatenates. Intersection is not supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipEvaluator;

impl ClipEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl BooleanEvaluator for ClipEvaluator {
    fn name(&self) -> &'static str {
        "clip"
    }

    fn evaluate(&self, op: BooleanOp, a: &Mesh, b: &Mesh, epsilon: f64) -> Result<Mesh> {
        match op {
            BooleanOp::Difference => {
                let bounds = Aabb::from_mesh(b).ok_or_else(|| {
                    Error::BooleanOperationFailed("tool mesh is empty".to_string())
                })?;
                Ok(ClippingProcessor::new(epsilon).subtract_box(a, &bounds))
            }
            BooleanOp::Union => {
                let mut merged = a.clone();
                merged.merge(b);
                Ok(merged)
            }
            BooleanOp::Intersection => Err(Error::BooleanOperationFailed(
                "box clipping cannot intersect".to_string(),
            )),
        }
    }
}
