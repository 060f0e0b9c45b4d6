// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes

use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};

/// Axis-aligned bounding box in f64
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Bounds of all vertices; `None` for an empty mesh
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let (min, max) = mesh.bounds();
        Some(Self {
            min: Point3::new(min.x as f64, min.y as f64, min.z as f64),
            max: Point3::new(max.x as f64, max.y as f64, max.z as f64),
        })
    }

    /// Smallest box containing the given points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.include(p);
        }
        Some(aabb)
    }

    #[inline]
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Box of the 8 transformed corners
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        let corners = self.corners().map(|c| transform.transform_point(&c));
        // 8 corners, never empty
        Self::from_points(corners.iter()).unwrap_or(*self)
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Inclusive overlap test; touching boxes overlap, `slack` widens both
    #[inline]
    pub fn intersects(&self, other: &Aabb, slack: f64) -> bool {
        self.min.x <= other.max.x + slack
            && self.max.x >= other.min.x - slack
            && self.min.y <= other.max.y + slack
            && self.max.y >= other.min.y - slack
            && self.min.z <= other.max.z + slack
            && self.max.z >= other.min.z - slack
    }

    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}
