// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bulge-annotated plan vertices

use nalgebra::{Point2, Point3};

/// Bulge values at or below this magnitude describe a straight edge.
pub const BULGE_EPSILON: f64 = 0.001;

/// A floor-plan vertex.
///
/// `bulge` describes the edge from this vertex to the next vertex of the
/// owning ring: `tan(θ/4)` of the included arc angle, signed by sweep
/// direction (positive = counter-clockwise). Zero means a straight edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanPoint {
    pub x: f64,
    pub y: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bulge: f64,
}

impl PlanPoint {
    /// Create a straight-edge vertex
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, bulge: 0.0 }
    }

    /// Create a vertex whose outgoing edge is an arc
    #[inline]
    pub fn with_bulge(x: f64, y: f64, z: f64, bulge: f64) -> Self {
        Self { x, y, z, bulge }
    }

    /// Whether the outgoing edge is an arc
    #[inline]
    pub fn is_arc(&self) -> bool {
        self.bulge.abs() > BULGE_EPSILON
    }

    /// Same position, straight outgoing edge
    #[inline]
    pub fn straightened(&self) -> Self {
        Self { bulge: 0.0, ..*self }
    }

    #[inline]
    pub fn to_point3(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.bulge.is_finite()
    }
}

impl From<PlanPoint> for Point3<f64> {
    fn from(p: PlanPoint) -> Self {
        p.to_point3()
    }
}

impl From<Point3<f64>> for PlanPoint {
    fn from(p: Point3<f64>) -> Self {
        PlanPoint::new(p.x, p.y, p.z)
    }
}
