// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end carving tests

use plancarve_geometry::{
    build_ring, classify_segments, BooleanEvaluator, BooleanOp, CsgAdapter, CsgConfig,
    Error as GeometryError, EvaluatorKind, Mesh, OpeningKind, PlanPoint,
    Result as GeometryResult, SegmentKind, Solid, SolidRole, SolidTags,
};
use plancarve_processing::walls::{outline_solid, wall_solid};
use plancarve_processing::{
    CarveStage, CarvingPipeline, FloorPlan, IntersectionResolver, Opening, OpeningSpec,
    PipelineConfig,
};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .with_test_writer()
        .try_init();
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PlanPoint> {
    vec![
        PlanPoint::new(x0, y0, 0.0),
        PlanPoint::new(x1, y0, 0.0),
        PlanPoint::new(x1, y1, 0.0),
        PlanPoint::new(x0, y1, 0.0),
    ]
}

/// 10 m × 8 m single-room plan with one door centred in the south wall
fn single_room_plan() -> FloorPlan {
    let outline = rect(0.0, 0.0, 10000.0, 8000.0);
    FloorPlan {
        outline: outline.clone(),
        rooms: vec![outline],
        doors: vec![OpeningSpec::new(rect(4550.0, -25.0, 5450.0, 25.0), 2100.0, 0.0)],
        windows: Vec::new(),
    }
}

/// Uncarved wall solids for every segment of a room
fn plain_walls(points: &[PlanPoint], config: &PipelineConfig) -> Vec<Solid> {
    classify_segments(points, 0, config.arc_samples)
        .unwrap()
        .iter()
        .map(|segment| wall_solid(segment, config.wall_thickness, config.wall_height).unwrap())
        .collect()
}

fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
        .sum()
}

struct AlwaysFails;

impl BooleanEvaluator for AlwaysFails {
    fn name(&self) -> &'static str {
        "always-fails"
    }

    fn evaluate(&self, op: BooleanOp, _a: &Mesh, _b: &Mesh, _epsilon: f64) -> GeometryResult<Mesh> {
        Err(GeometryError::BooleanOperationFailed(format!("{} unavailable", op)))
    }
}

#[test]
fn test_single_door_cuts_exactly_one_wall() {
    init_tracing();
    let plan = single_room_plan();
    let config = PipelineConfig::default();
    let model = CarvingPipeline::new(config.clone()).run(&plan).unwrap();

    let expected = plain_walls(&plan.rooms[0], &config);
    assert_eq!(model.walls.len(), 4);

    let carved: Vec<usize> = model
        .walls
        .iter()
        .zip(&expected)
        .enumerate()
        .filter(|(_, (got, plain))| got.mesh != plain.mesh)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(carved, vec![0], "only the south wall is cut");

    let south = &model.walls[0];
    assert_eq!(south.tags, SolidTags::wall(0, SegmentKind::Straight));
    assert!(south.is_usable_result());

    let mut hole_corner = false;
    for i in 0..south.mesh.vertex_count() {
        let p = south.mesh.position(i);
        let inside_hole = p.x > 4536.0 && p.x < 5464.0 && p.z < 2114.0;
        assert!(!inside_hole, "wall material left inside the doorway at {:?}", p);
        if (p.x - 4535.0).abs() < 0.01 && (p.z - 2115.0).abs() < 0.01 {
            hole_corner = true;
        }
    }
    assert!(hole_corner, "door head corner missing");

    // Carving removed material
    assert!(signed_volume(&south.mesh) < signed_volume(&expected[0].mesh));

    assert_eq!(model.report.failure_count(CarveStage::WallCut), 0);
    assert_eq!(model.openings.len(), 1);
    assert_eq!(model.openings[0].tags.role, SolidRole::Opening(OpeningKind::Door));
}

#[test]
fn test_failing_evaluator_keeps_outline() {
    init_tracing();
    let mut plan = single_room_plan();
    plan.doors.push(OpeningSpec::new(rect(1000.0, 7975.0, 1900.0, 8025.0), 2100.0, 0.0));
    plan.windows.push(OpeningSpec::new(rect(9975.0, 3000.0, 10025.0, 4500.0), 1200.0, 900.0));
    let config = PipelineConfig::default();

    let model = CarvingPipeline::new(config.clone())
        .with_evaluator(Arc::new(AlwaysFails))
        .run(&plan)
        .unwrap();

    let outline_ring = build_ring(&plan.outline, config.arc_samples).unwrap();
    let outline = outline_solid(&outline_ring, config.wall_height).unwrap();
    assert_eq!(model.shell.mesh, outline.mesh);
    assert_eq!(model.shell.tags.role, SolidRole::Outline);

    // One room and three openings against the shell, one opening per wall
    assert_eq!(model.report.failure_count(CarveStage::ShellCut), 4);
    assert_eq!(model.report.failure_count(CarveStage::WallCut), 3);
    assert_eq!(model.report.stats.applied, 0);
    assert_eq!(model.report.stats.fallbacks, 7);
    assert_eq!(model.report.stats.evaluator, "always-fails");

    for (got, plain) in model.walls.iter().zip(plain_walls(&plan.rooms[0], &config)) {
        assert_eq!(got.mesh, plain.mesh);
    }
    assert!(model
        .report
        .failures
        .iter()
        .all(|f| matches!(f.error, GeometryError::BooleanOperationFailed(_))));
}

#[test]
fn test_non_overlapping_opening_leaves_walls_unchanged() {
    init_tracing();
    let mut plan = single_room_plan();
    plan.doors.clear();
    // Free-standing in the middle of the room
    plan.windows.push(OpeningSpec::new(rect(4000.0, 3000.0, 4500.0, 3050.0), 1000.0, 900.0));
    let config = PipelineConfig::default();

    let model = CarvingPipeline::new(config.clone()).run(&plan).unwrap();
    for (got, plain) in model.walls.iter().zip(plain_walls(&plan.rooms[0], &config)) {
        assert_eq!(got.mesh, plain.mesh);
    }
    assert_eq!(model.report.failure_count(CarveStage::WallCut), 0);

    // Same result with the resolver bypassed
    let adapter = CsgAdapter::new(CsgConfig::default());
    let window = Opening::from_spec(OpeningKind::Window, 0, &plan.windows[0], config.arc_samples)
        .unwrap()
        .carving_solid(config.carving_offset)
        .unwrap();
    let resolver = IntersectionResolver::new(adapter.clone(), true);

    for plain in plain_walls(&plan.rooms[0], &config) {
        assert!(!resolver.may_intersect(&plain, &window));
        let before = plain.bounds().unwrap();
        let volume = signed_volume(&plain.mesh);

        let outcome = adapter.subtract(plain, &window);
        let after = outcome.solid.bounds().unwrap();
        approx::assert_relative_eq!(before.min, after.min, epsilon = 1e-3);
        approx::assert_relative_eq!(before.max, after.max, epsilon = 1e-3);
        approx::assert_relative_eq!(
            signed_volume(&outcome.solid.mesh),
            volume,
            max_relative = 1e-4
        );
    }
}

#[test]
fn test_box_engine_leaves_closed_walls() {
    init_tracing();
    let plan = single_room_plan();
    let mut config = PipelineConfig::default();
    config.csg.engine = EvaluatorKind::Clip;

    let model = CarvingPipeline::new(config.clone()).run(&plan).unwrap();
    assert_eq!(model.report.stats.evaluator, "clip");
    assert_eq!(model.report.failure_count(CarveStage::WallCut), 0);

    // 930 × 20 × 2115 removed by the enlarged door from the 20 mm south wall
    let expected = 10000.0 * 20.0 * 2800.0 - 930.0 * 20.0 * 2115.0;
    approx::assert_relative_eq!(
        signed_volume(&model.walls[0].mesh),
        expected,
        max_relative = 1e-5
    );

    for (got, plain) in model.walls.iter().zip(plain_walls(&plan.rooms[0], &config)).skip(1) {
        assert_eq!(got.mesh, plain.mesh);
    }
}

#[test]
fn test_outline_derived_from_room_is_carved() {
    init_tracing();
    let mut plan = single_room_plan();
    plan.outline.clear();

    let model = CarvingPipeline::new(PipelineConfig::default()).run(&plan).unwrap();
    assert_eq!(model.report.failure_count(CarveStage::Outline), 0);
    assert_eq!(model.report.failure_count(CarveStage::ShellCut), 0);

    // Shell is the 20 mm band outside the room, cut by the door
    let band = (10040.0 * 8040.0 - 10000.0 * 8000.0) * 2800.0;
    let door = 930.0 * 20.0 * 2115.0;
    approx::assert_relative_eq!(
        signed_volume(&model.shell.mesh),
        band - door,
        max_relative = 1e-4
    );

    let bounds = model.shell.bounds().unwrap();
    approx::assert_relative_eq!(bounds.min.y, -20.0, epsilon = 1e-2);
    approx::assert_relative_eq!(bounds.max.x, 10020.0, epsilon = 1e-2);
}
