// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall, room and floor solids built from plan rings and segments

use plancarve_geometry::{
    extrude_solid, offset_ring, stroke_polyline, Result, Ring, Solid, SolidTags, WallSegment,
};

/// Thin wall standing on z = 0, centred on the segment polyline
pub fn wall_solid(segment: &WallSegment, thickness: f64, height: f64) -> Result<Solid> {
    let outline = stroke_polyline(&segment.points, thickness / 2.0)?;
    extrude_solid(
        &outline,
        height,
        0.0,
        SolidTags::wall(segment.room_index, segment.kind),
    )
}

/// Building outline block from the floor to the wall top
pub fn outline_solid(ring: &Ring, height: f64) -> Result<Solid> {
    extrude_solid(ring, height, 0.0, SolidTags::outline())
}

/// Outline block of one room grown outward by `margin`.
///
/// Fusing these for every room gives the building outline when the plan
/// carries none.
pub fn grown_room_solid(ring: &Ring, margin: f64, height: f64) -> Result<Solid> {
    outline_solid(&offset_ring(ring, margin)?, height)
}

/// Room cutter reaching `overshoot` past both caps of the outline block
pub fn room_solid(ring: &Ring, room_index: usize, height: f64, overshoot: f64) -> Result<Solid> {
    extrude_solid(
        ring,
        height + 2.0 * overshoot,
        -overshoot,
        SolidTags::room(room_index),
    )
}

/// Floor slab hanging below z = 0
pub fn floor_solid(ring: &Ring, room_index: usize, thickness: f64) -> Result<Solid> {
    extrude_solid(ring, thickness, -thickness, SolidTags::floor(room_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use plancarve_geometry::{classify_segments, PlanPoint, SegmentKind, SolidRole};

    fn room() -> Vec<PlanPoint> {
        vec![
            PlanPoint::new(0.0, 0.0, 0.0),
            PlanPoint::with_bulge(4000.0, 0.0, 0.0, 0.3),
            PlanPoint::new(4000.0, 3000.0, 0.0),
            PlanPoint::new(0.0, 3000.0, 0.0),
        ]
    }

    #[test]
    fn test_straight_wall_bounds() {
        let segments = classify_segments(&room(), 2, 50).unwrap();
        let bottom = &segments[0];
        assert_eq!(bottom.kind, SegmentKind::Straight);

        let wall = wall_solid(bottom, 20.0, 2800.0).unwrap();
        assert_eq!(wall.tags, SolidTags::wall(2, SegmentKind::Straight));
        let bounds = wall.bounds().unwrap();
        assert_relative_eq!(bounds.min.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.x, 4000.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.min.y, -10.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.y, 10.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.z, 2800.0, epsilon = 1e-3);
    }

    #[test]
    fn test_arc_wall() {
        let segments = classify_segments(&room(), 0, 50).unwrap();
        let arc = segments
            .iter()
            .find(|s| s.kind == SegmentKind::Arc)
            .unwrap();
        let wall = wall_solid(arc, 20.0, 2800.0).unwrap();
        assert_eq!(wall.tags.segment_kind, Some(SegmentKind::Arc));
        assert!(wall.is_usable_result());
        // Positive bulge on the east edge bulges away from the room
        assert!(wall.bounds().unwrap().max.x > 4010.0);
    }

    #[test]
    fn test_room_and_floor_spans() {
        let ring =
            Ring::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], 0.0).unwrap();

        let room = room_solid(&ring, 1, 2800.0, 15.0).unwrap();
        let bounds = room.bounds().unwrap();
        assert_relative_eq!(bounds.min.z, -15.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.z, 2815.0, epsilon = 1e-3);
        assert_eq!(room.tags.role, SolidRole::Room);

        let floor = floor_solid(&ring, 1, 120.0).unwrap();
        let bounds = floor.bounds().unwrap();
        assert_relative_eq!(bounds.min.z, -120.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.z, 0.0, epsilon = 1e-3);
        assert_eq!(floor.tags, SolidTags::floor(1));

        assert_eq!(outline_solid(&ring, 2800.0).unwrap().tags.role, SolidRole::Outline);
    }

    #[test]
    fn test_grown_room_surrounds_room() {
        let ring = Ring::from_xy(&[(0.0, 0.0), (4000.0, 0.0), (4000.0, 3000.0), (0.0, 3000.0)], 0.0)
            .unwrap();
        let grown = grown_room_solid(&ring, 240.0, 2800.0).unwrap();
        assert_eq!(grown.tags, SolidTags::outline());

        let bounds = grown.bounds().unwrap();
        assert_relative_eq!(bounds.min.x, -240.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.y, 3240.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.min.z, 0.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.z, 2800.0, epsilon = 1e-3);
    }
}
