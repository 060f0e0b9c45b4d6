// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting room rings into straight and arc wall segments

use crate::arc::sample_arc;
use crate::error::{Error, Result};
use crate::point::PlanPoint;
use nalgebra::Point3;

/// Shape of a wall segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SegmentKind {
    Straight,
    Arc,
}

/// One wall segment of a room ring
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub kind: SegmentKind,
    /// Polyline from the start vertex to the end vertex, bulge-free
    pub points: Vec<Point3<f64>>,
    pub room_index: usize,
    /// Index of the first source vertex
    pub start_index: usize,
    /// Index of the last source vertex (wraps to 0 on the closing edge)
    pub end_index: usize,
}

impl WallSegment {
    /// Number of source ring edges covered
    pub fn edge_count(&self, ring_len: usize) -> usize {
        if ring_len == 0 {
            return 0;
        }
        let span = (self.end_index + ring_len - self.start_index) % ring_len;
        if span == 0 {
            ring_len
        } else {
            span
        }
    }

    /// Plan length of the polyline
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
            .sum()
    }
}

/// Split a closed room ring into wall segments.
///
/// Straight edges become one segment each. A run of consecutive bulged
/// vertices becomes a single arc segment ending at the first straight
/// vertex after it. Segments cover the closed ring exactly once.
pub fn classify_segments(
    points: &[PlanPoint],
    room_index: usize,
    samples: usize,
) -> Result<Vec<WallSegment>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::InvalidRing(format!(
            "room {} needs at least 3 vertices, got {}",
            room_index, n
        )));
    }

    // Start on a vertex that opens a run so no arc run straddles the seam
    let start = (0..n)
        .find(|&i| !points[(i + n - 1) % n].is_arc())
        .unwrap_or(0);

    let mut segments = Vec::new();
    let mut covered = 0;
    let mut i = start;

    while covered < n {
        let current = points[i];
        let next_index = (i + 1) % n;

        if !current.is_arc() {
            segments.push(WallSegment {
                kind: SegmentKind::Straight,
                points: vec![current.to_point3(), points[next_index].to_point3()],
                room_index,
                start_index: i,
                end_index: next_index,
            });
            covered += 1;
            i = next_index;
            continue;
        }

        // Greedy run: every bulged vertex contributes its edge
        let mut polyline: Vec<Point3<f64>> = Vec::new();
        let mut j = i;
        while covered < n && points[j].is_arc() {
            let k = (j + 1) % n;
            for p in sample_arc(points[j], points[k], points[j].bulge, samples) {
                push_unique(&mut polyline, p.to_point3());
            }
            // Degenerate arcs collapse to their start; keep the run connected
            push_unique(&mut polyline, points[k].to_point3());
            covered += 1;
            j = k;
        }

        segments.push(WallSegment {
            kind: SegmentKind::Arc,
            points: polyline,
            room_index,
            start_index: i,
            end_index: j,
        });
        i = j;
    }

    Ok(segments)
}

#[inline]
fn push_unique(polyline: &mut Vec<Point3<f64>>, p: Point3<f64>) {
    let duplicate = polyline
        .last()
        .map_or(false, |last| (last.x - p.x).abs() < 1e-9 && (last.y - p.y).abs() < 1e-9);
    if !duplicate {
        polyline.push(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{BulgeArc, DEFAULT_ARC_SAMPLES};
    use approx::assert_relative_eq;

    fn square() -> Vec<PlanPoint> {
        vec![
            PlanPoint::new(0.0, 0.0, 0.0),
            PlanPoint::new(10.0, 0.0, 0.0),
            PlanPoint::new(10.0, 10.0, 0.0),
            PlanPoint::new(0.0, 10.0, 0.0),
        ]
    }

    #[test]
    fn test_square_gives_four_straight_segments() {
        let points = square();
        let segments = classify_segments(&points, 0, DEFAULT_ARC_SAMPLES).unwrap();
        assert_eq!(segments.len(), 4);
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(seg.kind, SegmentKind::Straight);
            assert_eq!(seg.start_index, i);
            assert_eq!(seg.end_index, (i + 1) % 4);
            assert_eq!(seg.points[0], points[i].to_point3());
            assert_eq!(seg.points[1], points[(i + 1) % 4].to_point3());
        }
    }

    #[test]
    fn test_single_bulge_gives_one_arc() {
        let mut points = square();
        points[1].bulge = 0.5;
        let segments = classify_segments(&points, 2, DEFAULT_ARC_SAMPLES).unwrap();
        assert_eq!(segments.len(), 4);

        let arcs: Vec<_> = segments.iter().filter(|s| s.kind == SegmentKind::Arc).collect();
        assert_eq!(arcs.len(), 1);
        let arc = arcs[0];
        assert_eq!((arc.start_index, arc.end_index), (1, 2));
        assert_eq!(arc.room_index, 2);
        assert_eq!(arc.points.len(), DEFAULT_ARC_SAMPLES);
        assert_eq!(arc.points[0], points[1].to_point3());
        assert_eq!(*arc.points.last().unwrap(), points[2].to_point3());

        let geometry = BulgeArc::new(points[1], points[2], 0.5).unwrap();
        assert_relative_eq!(geometry.included_angle(), 2.0 * 0.5f64.atan(), epsilon = 1e-12);
        assert_relative_eq!(geometry.included_angle().to_degrees(), 53.13, epsilon = 0.01);
    }

    #[test]
    fn test_consecutive_bulges_merge() {
        let points = vec![
            PlanPoint::new(0.0, 0.0, 0.0),
            PlanPoint::with_bulge(10.0, 0.0, 0.0, 0.2),
            PlanPoint::with_bulge(12.0, 5.0, 0.0, 0.2),
            PlanPoint::new(10.0, 10.0, 0.0),
            PlanPoint::new(0.0, 10.0, 0.0),
        ];
        let segments = classify_segments(&points, 0, 10).unwrap();
        assert_eq!(segments.len(), 4);
        let arc = segments.iter().find(|s| s.kind == SegmentKind::Arc).unwrap();
        assert_eq!((arc.start_index, arc.end_index), (1, 3));
        // Two 10-sample arcs share their joint
        assert_eq!(arc.points.len(), 19);
        assert_eq!(arc.edge_count(points.len()), 2);
    }

    #[test]
    fn test_run_across_the_seam() {
        let points = vec![
            PlanPoint::with_bulge(0.0, 0.0, 0.0, 0.3),
            PlanPoint::new(10.0, 0.0, 0.0),
            PlanPoint::new(10.0, 10.0, 0.0),
            PlanPoint::with_bulge(0.0, 10.0, 0.0, 0.3),
        ];
        let segments = classify_segments(&points, 0, 8).unwrap();
        let total: usize = segments.iter().map(|s| s.edge_count(points.len())).sum();
        assert_eq!(total, points.len());

        let arc = segments.iter().find(|s| s.kind == SegmentKind::Arc).unwrap();
        assert_eq!((arc.start_index, arc.end_index), (3, 1));
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_fully_bulged_ring() {
        let points = vec![
            PlanPoint::with_bulge(-5.0, 0.0, 0.0, 1.0),
            PlanPoint::with_bulge(5.0, 0.0, 0.0, 1.0),
        ];
        assert!(classify_segments(&points, 0, 8).is_err());

        let points = vec![
            PlanPoint::with_bulge(0.0, 0.0, 0.0, 0.2),
            PlanPoint::with_bulge(10.0, 0.0, 0.0, 0.2),
            PlanPoint::with_bulge(5.0, 8.0, 0.0, 0.2),
        ];
        let segments = classify_segments(&points, 0, 8).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].edge_count(points.len()), 3);
        assert_eq!(segments[0].points.first(), segments[0].points.last());
    }

    #[test]
    fn test_segment_length() {
        let segments = classify_segments(&square(), 0, 8).unwrap();
        let perimeter: f64 = segments.iter().map(|s| s.length()).sum();
        assert_relative_eq!(perimeter, 40.0, epsilon = 1e-9);
    }
}
