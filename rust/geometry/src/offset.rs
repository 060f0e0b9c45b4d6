// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan offsets: enlarging rings and stroking open polylines

use crate::error::{Error, Result};
use crate::ring::Ring;
use nalgebra::{Point3, Vector2};

/// Maximum miter distance as a multiple of the offset distance. Sharper
/// corners get a bevel (two points) instead.
const MITER_LIMIT: f64 = 4.0;

/// Edges shorter than this carry no direction
const MIN_EDGE_LENGTH: f64 = 1e-9;

/// Offset a closed ring by `distance`; positive grows the ring outward
/// whatever its winding.
pub fn offset_ring(ring: &Ring, distance: f64) -> Result<Ring> {
    if !distance.is_finite() {
        return Err(Error::InvalidRing("offset distance is not finite".to_string()));
    }
    if distance == 0.0 {
        return Ok(ring.clone());
    }
    let ccw = ring.to_counter_clockwise();
    // Left of a counter-clockwise ring is its interior
    let points = offset_polyline(ccw.points(), -distance, true);
    let result = Ring::new(points)?;

    // An over-inset ring flips through itself and leaves the input bounds
    if distance < 0.0 {
        let (min, max) = ccw.plan_bounds();
        let (inner_min, inner_max) = result.plan_bounds();
        let escaped = inner_min.x < min.x
            || inner_min.y < min.y
            || inner_max.x > max.x
            || inner_max.y > max.y;
        if escaped || result.signed_area() <= 0.0 {
            return Err(Error::InvalidRing(format!(
                "inset by {} collapses the ring",
                -distance
            )));
        }
    }
    Ok(result)
}

/// Closed outline tracing both sides of an open polyline at `half_width`,
/// with flat caps at the ends.
pub fn stroke_polyline(points: &[Point3<f64>], half_width: f64) -> Result<Ring> {
    if !half_width.is_finite() || half_width <= 0.0 {
        return Err(Error::InvalidRing(format!(
            "stroke half width must be positive, got {}",
            half_width
        )));
    }

    let mut path: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if path.last().map_or(true, |last| plan_distance(last, p) > MIN_EDGE_LENGTH) {
            path.push(*p);
        }
    }
    if path.len() < 2 {
        return Err(Error::InvalidRing(
            "stroke needs a polyline of at least 2 distinct points".to_string(),
        ));
    }

    let mut outline = offset_polyline(&path, half_width, false);
    let mut right = offset_polyline(&path, -half_width, false);
    right.reverse();
    outline.extend(right);

    Ring::new(outline)
}

/// Offset along the left normal of each edge (`distance < 0` for the right
/// side), joining consecutive edges with a miter or a bevel.
fn offset_polyline(points: &[Point3<f64>], distance: f64, closed: bool) -> Vec<Point3<f64>> {
    let n = points.len();
    let edge_count = if closed { n } else { n.saturating_sub(1) };

    let normals: Vec<Option<Vector2<f64>>> = (0..edge_count)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            Vector2::new(-(b.y - a.y), b.x - a.x).try_normalize(MIN_EDGE_LENGTH)
        })
        .collect();

    let mut result = Vec::with_capacity(n + 4);
    for i in 0..n {
        let incoming = if i > 0 {
            normals[i - 1]
        } else if closed {
            normals[edge_count - 1]
        } else {
            None
        };
        let outgoing = if i < edge_count { normals[i] } else { None };

        let p = points[i];
        match (incoming, outgoing) {
            (Some(n0), Some(n1)) => push_join(&mut result, p, n0, n1, distance),
            (Some(n), None) | (None, Some(n)) => result.push(shift(p, n * distance)),
            (None, None) => {}
        }
    }
    result
}

fn push_join(
    out: &mut Vec<Point3<f64>>,
    p: Point3<f64>,
    n0: Vector2<f64>,
    n1: Vector2<f64>,
    distance: f64,
) {
    let denom = 1.0 + n0.dot(&n1);
    if denom > 1e-12 {
        let miter = (n0 + n1) / denom;
        if miter.norm() <= MITER_LIMIT {
            out.push(shift(p, miter * distance));
            return;
        }
    }
    out.push(shift(p, n0 * distance));
    out.push(shift(p, n1 * distance));
}

#[inline]
fn shift(p: Point3<f64>, d: Vector2<f64>) -> Point3<f64> {
    Point3::new(p.x + d.x, p.y + d.y, p.z)
}

#[inline]
fn plan_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}
