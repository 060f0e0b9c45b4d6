// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PlanCarve Geometry
//!
//! Solid modelling for floor plans: bulge-arc tessellation, ring building,
//! wall segmentation, extrusion, and validated boolean carving using
//! earcutr triangulation, nalgebra math and csgrs BSP booleans.

pub mod arc;
pub mod bounds;
pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod offset;
pub mod point;
pub mod profile;
pub mod ring;
pub mod segments;
pub mod solid;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use arc::{sample_arc, ArcSamples, BulgeArc, DEFAULT_ARC_SAMPLES};
pub use bounds::Aabb;
pub use csg::{
    BooleanEvaluator, BooleanOp, BooleanOutcome, BspEvaluator, ClipEvaluator, CsgAdapter,
    CsgConfig, EvaluatorKind, OperationStatus, PrecisionLevel,
};
pub use error::{Error, Result};
pub use extrusion::{extrude_ring, extrude_solid};
pub use mesh::Mesh;
pub use offset::{offset_ring, stroke_polyline};
pub use point::{PlanPoint, BULGE_EPSILON};
pub use profile::Profile2D;
pub use ring::{build_ring, expand_edge, Ring};
pub use segments::{classify_segments, SegmentKind, WallSegment};
pub use solid::{OpeningKind, Solid, SolidRole, SolidTags};
pub use triangulation::triangulate_polygon;
