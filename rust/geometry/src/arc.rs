// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bulge arc tessellation
//!
//! A bulge-annotated edge `(start, end, bulge)` describes a circular arc.
//! With chord length `c` and `θ = 2·atan(|bulge|)`:
//!
//! - radius `r = c / (2·sin θ)`
//! - centre = chord midpoint + left perpendicular `(-dy, dx) / c` scaled by
//!   `r·cos θ·sign(bulge)`
//! - positive bulge sweeps counter-clockwise, negative clockwise
//!
//! Samples are spread uniformly over the swept angle and include both
//! endpoints exactly.

use crate::error::{Error, Result};
use crate::point::PlanPoint;
use nalgebra::Point2;
use std::f64::consts::TAU;

/// Samples per arc used across the pipeline unless configured otherwise.
pub const DEFAULT_ARC_SAMPLES: usize = 50;

/// Circular arc reconstructed from a bulge-annotated edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulgeArc {
    start: PlanPoint,
    end: PlanPoint,
    bulge: f64,
    center: Point2<f64>,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl BulgeArc {
    /// Reconstruct the arc from `start` to `end`.
    ///
    /// Fails with [`Error::DegenerateArc`] when the chord has zero length
    /// or the inputs are not finite.
    pub fn new(start: PlanPoint, end: PlanPoint, bulge: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || !bulge.is_finite() {
            return Err(Error::DegenerateArc("non-finite arc input".to_string()));
        }

        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let chord = dx.hypot(dy);
        if chord == 0.0 {
            return Err(Error::DegenerateArc(format!(
                "start and end coincide at ({}, {})",
                start.x, start.y
            )));
        }
        if bulge == 0.0 {
            return Err(Error::DegenerateArc("zero bulge describes a straight edge".to_string()));
        }

        let theta = 2.0 * bulge.abs().atan();
        let radius = chord / (2.0 * theta.sin());

        let perp_x = -dy / chord;
        let perp_y = dx / chord;
        let mid_x = (start.x + end.x) * 0.5;
        let mid_y = (start.y + end.y) * 0.5;
        let offset = radius * theta.cos() * bulge.signum();
        let center = Point2::new(mid_x + perp_x * offset, mid_y + perp_y * offset);

        let start_angle = (start.y - center.y).atan2(start.x - center.x);
        let end_angle = (end.y - center.y).atan2(end.x - center.x);

        let mut sweep = end_angle - start_angle;
        if bulge < 0.0 {
            if sweep > 0.0 {
                sweep -= TAU;
            }
        } else if sweep < 0.0 {
            sweep += TAU;
        }

        Ok(Self {
            start,
            end,
            bulge,
            center,
            radius,
            start_angle,
            sweep,
        })
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn bulge(&self) -> f64 {
        self.bulge
    }

    /// `θ = 2·atan(|bulge|)`, the angle used to place the centre
    #[inline]
    pub fn included_angle(&self) -> f64 {
        2.0 * self.bulge.abs().atan()
    }

    /// Signed angle swept from start to end (negative = clockwise)
    #[inline]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.bulge < 0.0
    }

    /// Arc length
    #[inline]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Lazy sample sequence of `count` points (at least 2).
    ///
    /// The iterator is finite and can be cloned to restart from the
    /// current position; calling `samples` again starts over.
    pub fn samples(&self, count: usize) -> ArcSamples {
        ArcSamples {
            arc: *self,
            count: count.max(2),
            next: 0,
        }
    }

    fn point_at(&self, index: usize, count: usize) -> PlanPoint {
        if index == 0 {
            return self.start.straightened();
        }
        if index + 1 == count {
            return self.end.straightened();
        }
        let t = index as f64 / (count - 1) as f64;
        let angle = self.start_angle + self.sweep * t;
        PlanPoint::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            self.start.z + (self.end.z - self.start.z) * t,
        )
    }
}

/// Iterator over the samples of a [`BulgeArc`]
#[derive(Debug, Clone)]
pub struct ArcSamples {
    arc: BulgeArc,
    count: usize,
    next: usize,
}

impl Iterator for ArcSamples {
    type Item = PlanPoint;

    fn next(&mut self) -> Option<PlanPoint> {
        if self.next >= self.count {
            return None;
        }
        let point = self.arc.point_at(self.next, self.count);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArcSamples {}

impl std::iter::FusedIterator for ArcSamples {}

/// Tessellate one bulge edge into `count` points.
///
/// Never fails: a degenerate arc is logged and collapses to `[start]`.
pub fn sample_arc(start: PlanPoint, end: PlanPoint, bulge: f64, count: usize) -> Vec<PlanPoint> {
    match BulgeArc::new(start, end, bulge) {
        Ok(arc) => arc.samples(count).collect(),
        Err(err) => {
            tracing::warn!(
                x = start.x,
                y = start.y,
                bulge,
                error = %err,
                "Skipping degenerate arc"
            );
            vec![start.straightened()]
        }
    }
}
