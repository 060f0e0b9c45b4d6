// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan input documents

use crate::error::Result;
use plancarve_geometry::{OpeningKind, PlanPoint};
use serde::{Deserialize, Serialize};

/// One door or window as delivered by the plan source.
///
/// `points` is the plan footprint of the opening, `height` its vertical
/// extent and `ground_elevation` the sill height above the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningSpec {
    pub points: Vec<PlanPoint>,
    pub height: f64,
    #[serde(default, alias = "groundHeight")]
    pub ground_elevation: f64,
}

impl OpeningSpec {
    pub fn new(points: Vec<PlanPoint>, height: f64, ground_elevation: f64) -> Self {
        Self {
            points,
            height,
            ground_elevation,
        }
    }

    /// Whether any footprint edge is curved
    pub fn has_arc(&self) -> bool {
        self.points.iter().any(PlanPoint::is_arc)
    }
}

/// A complete floor plan: building outline, room boundaries and openings.
///
/// Rooms and openings keep their document order; that order is the carving
/// order and the source of every index reported back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorPlan {
    pub outline: Vec<PlanPoint>,
    pub rooms: Vec<Vec<PlanPoint>>,
    pub doors: Vec<OpeningSpec>,
    pub windows: Vec<OpeningSpec>,
}

impl FloorPlan {
    /// Parse a plan from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: FloorPlan = serde_json::from_str(json)?;
        tracing::debug!(
            rooms = plan.rooms.len(),
            doors = plan.doors.len(),
            windows = plan.windows.len(),
            "Parsed floor plan"
        );
        Ok(plan)
    }

    /// Whether any room boundary contains a bulged edge
    pub fn has_arcs(&self) -> bool {
        self.rooms
            .iter()
            .any(|room| room.iter().any(PlanPoint::is_arc))
    }

    /// Doors plus windows
    #[inline]
    pub fn opening_count(&self) -> usize {
        self.doors.len() + self.windows.len()
    }

    /// Every opening in carving order: doors first, then windows.
    ///
    /// The index is the position within its own kind.
    pub fn openings(&self) -> impl Iterator<Item = (OpeningKind, usize, &OpeningSpec)> + '_ {
        let doors = self
            .doors
            .iter()
            .enumerate()
            .map(|(i, spec)| (OpeningKind::Door, i, spec));
        let windows = self
            .windows
            .iter()
            .enumerate()
            .map(|(i, spec)| (OpeningKind::Window, i, spec));
        doors.chain(windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "outline": [
            {"x": 0, "y": 0}, {"x": 4000, "y": 0},
            {"x": 4000, "y": 3000}, {"x": 0, "y": 3000}
        ],
        "rooms": [[
            {"x": 0, "y": 0, "z": 0, "bulge": 0},
            {"x": 4000, "y": 0, "bulge": 0.25},
            {"x": 4000, "y": 3000},
            {"x": 0, "y": 3000}
        ]],
        "doors": [
            {
                "points": [
                    {"x": 100, "y": -25}, {"x": 1000, "y": -25},
                    {"x": 1000, "y": 25}, {"x": 100, "y": 25}
                ],
                "height": 2100
            }
        ],
        "windows": [
            {
                "points": [
                    {"x": 2000, "y": 2975}, {"x": 3000, "y": 2975},
                    {"x": 3000, "y": 3025}, {"x": 2000, "y": 3025}
                ],
                "height": 1200,
                "groundHeight": 900
            }
        ]
    }"#;

    #[test]
    fn test_parse_plan() {
        let plan = FloorPlan::from_json(PLAN).unwrap();
        assert_eq!(plan.outline.len(), 4);
        assert_eq!(plan.rooms.len(), 1);
        assert_eq!(plan.rooms[0][1].bulge, 0.25);
        assert_eq!(plan.doors[0].ground_elevation, 0.0);
        assert_eq!(plan.windows[0].ground_elevation, 900.0);
        assert!(plan.has_arcs());
        assert_eq!(plan.opening_count(), 2);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let plan = FloorPlan::from_json(r#"{"outline": []}"#).unwrap();
        assert!(plan.rooms.is_empty());
        assert!(plan.doors.is_empty());
        assert!(!plan.has_arcs());
    }

    #[test]
    fn test_malformed_document() {
        assert!(FloorPlan::from_json(r#"{"rooms": 3}"#).is_err());
    }

    #[test]
    fn test_openings_order() {
        let plan = FloorPlan::from_json(PLAN).unwrap();
        let order: Vec<_> = plan.openings().map(|(kind, i, _)| (kind, i)).collect();
        assert_eq!(order, vec![(OpeningKind::Door, 0), (OpeningKind::Window, 0)]);
    }
}
