// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed bulge-free rings built from plan vertices

use crate::arc::sample_arc;
use crate::error::{Error, Result};
use crate::point::PlanPoint;
use crate::profile::Profile2D;
use nalgebra::{Point2, Point3};

/// Consecutive ring points closer than this are merged.
const DUPLICATE_TOLERANCE: f64 = 1e-9;

/// Closed polygon of bulge-free points; the closing edge is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point3<f64>>,
}

impl Ring {
    /// Validate and wrap a point list.
    ///
    /// Consecutive duplicates (including last == first) are dropped; at
    /// least 3 distinct finite points must remain.
    pub fn new(points: Vec<Point3<f64>>) -> Result<Self> {
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite())) {
            return Err(Error::InvalidRing("ring contains non-finite coordinates".to_string()));
        }

        let mut cleaned: Vec<Point3<f64>> = Vec::with_capacity(points.len());
        for p in points {
            if cleaned.last().map_or(true, |last| !same_plan_position(last, &p)) {
                cleaned.push(p);
            }
        }
        while cleaned.len() > 1 && same_plan_position(&cleaned[0], &cleaned[cleaned.len() - 1]) {
            cleaned.pop();
        }

        if cleaned.len() < 3 {
            return Err(Error::InvalidRing(format!(
                "ring needs at least 3 distinct points, got {}",
                cleaned.len()
            )));
        }
        Ok(Self { points: cleaned })
    }

    /// Build a ring from plan coordinates at elevation `z`
    pub fn from_xy(coords: &[(f64, f64)], z: f64) -> Result<Self> {
        Self::new(coords.iter().map(|&(x, y)| Point3::new(x, y, z)).collect())
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edges including the closing one
    pub fn edges(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area in the plan, positive for counter-clockwise
    pub fn signed_area(&self) -> f64 {
        self.edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f64>()
            * 0.5
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Same ring with reversed winding
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Same ring wound counter-clockwise
    pub fn to_counter_clockwise(&self) -> Self {
        if self.is_counter_clockwise() {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Plan projection for triangulation
    pub fn to_profile(&self) -> Profile2D {
        Profile2D::new(self.points.iter().map(|p| Point2::new(p.x, p.y)).collect())
    }

    /// Plan bounding rectangle `(min, max)`
    pub fn plan_bounds(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = Point2::new(f64::MAX, f64::MAX);
        let mut max = Point2::new(f64::MIN, f64::MIN);
        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

#[inline]
fn same_plan_position(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a.x - b.x).abs() <= DUPLICATE_TOLERANCE && (a.y - b.y).abs() <= DUPLICATE_TOLERANCE
}

/// Expand a single edge.
///
/// A bulged `current` yields the tessellated arc to `next`; a straight one
/// yields exactly `[current, next]`.
pub fn expand_edge(current: PlanPoint, next: PlanPoint, samples: usize) -> Vec<PlanPoint> {
    if current.is_arc() {
        sample_arc(current, next, current.bulge, samples)
    } else {
        vec![current.straightened(), next.straightened()]
    }
}

/// Expand every bulged vertex of a closed plan polygon into a flat ring.
pub fn build_ring(points: &[PlanPoint], samples: usize) -> Result<Ring> {
    if points.len() < 3 {
        return Err(Error::InvalidRing(format!(
            "ring needs at least 3 vertices, got {}",
            points.len()
        )));
    }

    let n = points.len();
    let mut flat = Vec::with_capacity(n * 2);
    for i in 0..n {
        let edge = expand_edge(points[i], points[(i + 1) % n], samples);
        // Each edge's end is the next edge's start
        let keep = edge.len().saturating_sub(1).max(1);
        flat.extend(edge.into_iter().take(keep).map(|p| p.to_point3()));
    }

    Ring::new(flat)
}
