// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D footprints and cap triangulation

use crate::error::{Error, Result};
use crate::triangulation::triangulate_polygon;
use nalgebra::Point2;

/// Plan footprint of an extrusion
#[derive(Debug, Clone)]
pub struct Profile2D {
    /// Outer boundary
    pub outer: Vec<Point2<f64>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self { outer }
    }

    /// Shoelace area, positive for counter-clockwise
    pub fn signed_area(&self) -> f64 {
        let n = self.outer.len();
        (0..n)
            .map(|i| {
                let a = self.outer[i];
                let b = self.outer[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            * 0.5
    }

    /// Triangulate the profile.
    ///
    /// Every emitted triangle is counter-clockwise in the plan regardless
    /// of what the triangulator returned; zero-area triangles are dropped.
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let raw = triangulate_polygon(&self.outer)?;

        let mut indices = Vec::with_capacity(raw.len());
        for tri in raw.chunks_exact(3) {
            let (a, b, c) = (self.outer[tri[0]], self.outer[tri[1]], self.outer[tri[2]]);
            let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
            if cross > 0.0 {
                indices.extend_from_slice(&[tri[0], tri[1], tri[2]]);
            } else if cross < 0.0 {
                indices.extend_from_slice(&[tri[0], tri[2], tri[1]]);
            }
        }

        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "Profile produced no non-degenerate triangles".to_string(),
            ));
        }

        Ok(Triangulation {
            points: self.outer.clone(),
            indices,
        })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    /// Counter-clockwise triangle indices into `points`
    pub indices: Vec<usize>,
}
