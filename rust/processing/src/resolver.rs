// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intersection Resolver
//!
//! Decides which opening solids can touch which targets before any
//! boolean runs, and keeps the resulting wall-to-opening mapping.
//!
//! The bounding-box test is a necessary condition only: a box overlap
//! may still be a miss, a box miss is always a miss.

use plancarve_geometry::{Aabb, CsgAdapter, Solid};
use rustc_hash::FxHashMap;

/// Bounding-box prefilter with an optional exact confirmation stage
#[derive(Debug, Clone)]
pub struct IntersectionResolver {
    adapter: CsgAdapter,
    precise: bool,
}

impl IntersectionResolver {
    /// `precise` confirms every box overlap with an exact intersection
    pub fn new(adapter: CsgAdapter, precise: bool) -> Self {
        Self { adapter, precise }
    }

    #[inline]
    pub fn is_precise(&self) -> bool {
        self.precise
    }

    #[inline]
    fn slack(&self) -> f64 {
        self.adapter.config().epsilon
    }

    /// Whether `candidate` can share volume with `target`.
    ///
    /// Boxes are compared in the shared frame, pending transforms applied.
    /// An exact check that cannot decide counts as a hit.
    pub fn may_intersect(&self, target: &Solid, candidate: &Solid) -> bool {
        match (target.bounds(), candidate.bounds()) {
            (Some(t), Some(c)) => self.confirm(&t, &c, target, candidate),
            _ => false,
        }
    }

    /// Map every wall to the openings that may cut it.
    ///
    /// `walls` and `openings` are addressed by position in the slices.
    pub fn index_openings(&self, walls: &[Solid], openings: &[Solid]) -> OpeningIndex {
        let opening_bounds: Vec<Option<Aabb>> = openings.iter().map(Solid::bounds).collect();
        let mut index = OpeningIndex::new();

        for (wall_id, wall) in walls.iter().enumerate() {
            let Some(wall_bounds) = wall.bounds() else {
                continue;
            };
            for (opening_id, bounds) in opening_bounds.iter().enumerate() {
                let Some(bounds) = bounds else {
                    continue;
                };
                if self.confirm(&wall_bounds, bounds, wall, &openings[opening_id]) {
                    index.add_relationship(wall_id, opening_id);
                }
            }
        }

        tracing::debug!(
            walls = walls.len(),
            openings = openings.len(),
            relationships = index.total_relationships(),
            precise = self.precise,
            "Indexed openings against walls"
        );
        index
    }

    fn confirm(
        &self,
        target_bounds: &Aabb,
        candidate_bounds: &Aabb,
        target: &Solid,
        candidate: &Solid,
    ) -> bool {
        if !target_bounds.intersects(candidate_bounds, self.slack()) {
            return false;
        }
        if !self.precise {
            return true;
        }
        self.adapter.intersects(target, candidate).unwrap_or(true)
    }
}

/// Index mapping walls to the openings that cut them
#[derive(Debug, Clone, Default)]
pub struct OpeningIndex {
    /// Map from wall position to opening positions, in discovery order
    wall_to_openings: FxHashMap<usize, Vec<usize>>,
    /// Reverse lookup; an opening at a corner cuts several walls
    opening_to_walls: FxHashMap<usize, Vec<usize>>,
    relationship_count: usize,
}

impl OpeningIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_relationship(&mut self, wall_id: usize, opening_id: usize) {
        self.wall_to_openings.entry(wall_id).or_default().push(opening_id);
        self.opening_to_walls.entry(opening_id).or_default().push(wall_id);
        self.relationship_count += 1;
    }

    /// Openings cutting a wall, or an empty slice
    pub fn openings_for(&self, wall_id: usize) -> &[usize] {
        self.wall_to_openings
            .get(&wall_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Walls an opening cuts, or an empty slice
    pub fn walls_for(&self, opening_id: usize) -> &[usize] {
        self.opening_to_walls
            .get(&opening_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_openings(&self, wall_id: usize) -> bool {
        !self.openings_for(wall_id).is_empty()
    }

    /// Number of walls with at least one opening
    pub fn wall_count(&self) -> usize {
        self.wall_to_openings.len()
    }

    pub fn total_relationships(&self) -> usize {
        self.relationship_count
    }
}

/// Distribution of openings over walls
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningStatistics {
    pub walls_with_openings: usize,
    pub total_relationships: usize,
    pub max_openings_per_wall: usize,
    /// Average over walls that have openings
    pub avg_openings_per_wall: f64,
    /// Openings that touch no wall at all
    pub unplaced_openings: usize,
}

impl OpeningStatistics {
    pub fn from_index(index: &OpeningIndex, opening_count: usize) -> Self {
        let walls_with_openings = index.wall_count();
        let total_relationships = index.total_relationships();

        let max_openings_per_wall = index
            .wall_to_openings
            .values()
            .map(|v| v.len())
            .max()
            .unwrap_or(0);

        let avg_openings_per_wall = if walls_with_openings > 0 {
            total_relationships as f64 / walls_with_openings as f64
        } else {
            0.0
        };

        let unplaced_openings = (0..opening_count)
            .filter(|id| index.walls_for(*id).is_empty())
            .count();

        Self {
            walls_with_openings,
            total_relationships,
            max_openings_per_wall,
            avg_openings_per_wall,
            unplaced_openings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancarve_geometry::{extrude_solid, CsgConfig, OpeningKind, Ring, SegmentKind, SolidTags};

    fn block(x0: f64, y0: f64, x1: f64, y1: f64, z0: f64, height: f64, tags: SolidTags) -> Solid {
        let ring = Ring::from_xy(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)], 0.0).unwrap();
        extrude_solid(&ring, height, z0, tags).unwrap()
    }

    fn wall(x0: f64, x1: f64) -> Solid {
        block(x0, -10.0, x1, 10.0, 0.0, 2800.0, SolidTags::wall(0, SegmentKind::Straight))
    }

    fn door(x0: f64, x1: f64) -> Solid {
        let tags = SolidTags::opening(OpeningKind::Door, 0);
        block(x0, -40.0, x1, 40.0, 0.0, 2130.0, tags).raised_by(-15.0)
    }

    #[test]
    fn test_box_prefilter() {
        let resolver = IntersectionResolver::new(CsgAdapter::new(CsgConfig::default()), false);
        assert!(resolver.may_intersect(&wall(0.0, 1000.0), &door(400.0, 600.0)));
        assert!(!resolver.may_intersect(&wall(0.0, 1000.0), &door(2000.0, 2200.0)));
        // Touching faces count as overlap
        assert!(resolver.may_intersect(&wall(0.0, 1000.0), &door(1000.0, 1200.0)));
    }

    #[test]
    fn test_pending_transform_is_applied() {
        let resolver = IntersectionResolver::new(CsgAdapter::new(CsgConfig::default()), false);
        let high = door(400.0, 600.0).raised_by(5000.0);
        assert!(!resolver.may_intersect(&wall(0.0, 1000.0), &high));
    }

    #[test]
    fn test_precise_stage_rejects_box_only_hits() {
        // Diagonal target: boxes overlap, volumes do not
        let ring = Ring::from_xy(&[(0.0, 0.0), (100.0, 90.0), (90.0, 100.0)], 0.0).unwrap();
        let target = extrude_solid(&ring, 100.0, 0.0, SolidTags::outline()).unwrap();
        let corner = block(70.0, 0.0, 100.0, 30.0, 0.0, 100.0, SolidTags::room(0));

        let coarse = IntersectionResolver::new(CsgAdapter::new(CsgConfig::default()), false);
        assert!(coarse.may_intersect(&target, &corner));

        let precise = IntersectionResolver::new(CsgAdapter::new(CsgConfig::default()), true);
        assert!(precise.is_precise());
        assert!(!precise.may_intersect(&target, &corner));
    }

    #[test]
    fn test_index_openings() {
        let resolver = IntersectionResolver::new(CsgAdapter::new(CsgConfig::default()), false);
        let walls = vec![wall(0.0, 1000.0), wall(1000.0, 2000.0), wall(5000.0, 6000.0)];
        let openings = vec![door(400.0, 600.0), door(950.0, 1050.0), door(8000.0, 8200.0)];

        let index = resolver.index_openings(&walls, &openings);
        assert_eq!(index.openings_for(0), &[0, 1]);
        assert_eq!(index.openings_for(1), &[1]);
        assert!(!index.has_openings(2));
        assert_eq!(index.walls_for(1), &[0, 1]);
        assert!(index.walls_for(2).is_empty());
        assert_eq!(index.total_relationships(), 3);

        let stats = OpeningStatistics::from_index(&index, openings.len());
        assert_eq!(stats.walls_with_openings, 2);
        assert_eq!(stats.max_openings_per_wall, 2);
        assert_eq!(stats.avg_openings_per_wall, 1.5);
        assert_eq!(stats.unplaced_openings, 1);
    }

    #[test]
    fn test_empty_index() {
        let index = OpeningIndex::new();
        assert!(index.openings_for(7).is_empty());
        assert_eq!(index.wall_count(), 0);
        let stats = OpeningStatistics::from_index(&index, 0);
        assert_eq!(stats.avg_openings_per_wall, 0.0);
    }
}
