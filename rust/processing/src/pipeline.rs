// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Carving pipeline.
//!
//! A run has two boolean passes over the same inputs:
//!
//! 1. Shell pass: the outline block minus every room, then minus every
//!    opening whose carving solid can reach the shell.
//! 2. Per-wall pass: one thin solid per wall segment of every room, minus
//!    the openings the resolver maps to it.
//!
//! Both passes are strict left folds. A failed operation leaves its target
//! as it was, is recorded in the report and the fold continues.
//!
//! A plan without an outline gets one grown from its rooms: every room
//! footprint offset outward by the wall thickness, all of them fused.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::openings::{combine_openings, Opening};
use crate::plan::FloorPlan;
use crate::report::{CarveReport, CarveStage};
use crate::resolver::{IntersectionResolver, OpeningStatistics};
use crate::walls::{floor_solid, grown_room_solid, outline_solid, room_solid, wall_solid};
use plancarve_geometry::{
    build_ring, classify_segments, BooleanEvaluator, BooleanOutcome, CsgAdapter, OperationStatus,
    Ring, Solid, SolidTags,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

/// Which boolean pass an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarvePass {
    Shell,
    Walls,
}

/// Snapshot handed to the observer after each boolean operation
#[derive(Debug, Clone, Copy)]
pub struct CarveProgress<'a> {
    pub pass: CarvePass,
    /// Operations finished so far, this one included
    pub completed: usize,
    /// Upper bound on the operations of the run; resolver rejections
    /// lower the real count
    pub planned: usize,
    pub target: &'a SolidTags,
    pub tool: &'a SolidTags,
    /// Whether the evaluator result was accepted
    pub applied: bool,
}

/// Receives progress between boolean operations.
///
/// Returning `ControlFlow::Break` cancels the run at that point; an
/// operation in flight always completes first.
pub trait CarveObserver {
    fn on_operation(&mut self, _progress: &CarveProgress<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called every `chunk_size` operations when chunking is enabled
    fn on_chunk_boundary(&mut self, _completed: usize) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Observer that never interrupts
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CarveObserver for NoopObserver {}

impl<F> CarveObserver for F
where
    F: FnMut(&CarveProgress<'_>) -> ControlFlow<()>,
{
    fn on_operation(&mut self, progress: &CarveProgress<'_>) -> ControlFlow<()> {
        self(progress)
    }
}

/// Output of a carving run
#[derive(Debug, Clone)]
pub struct CarvedModel {
    /// Outline minus rooms minus openings
    pub shell: Solid,
    /// One solid per wall segment, in room then segment order
    pub walls: Vec<Solid>,
    /// Exact-size door and window solids, doors first
    pub openings: Vec<Solid>,
    /// One slab per room when floors are enabled
    pub floors: Vec<Solid>,
    pub report: CarveReport,
}

impl CarvedModel {
    /// Every output solid, shell first
    pub fn solids(&self) -> impl Iterator<Item = &Solid> + '_ {
        std::iter::once(&self.shell)
            .chain(self.walls.iter())
            .chain(self.openings.iter())
            .chain(self.floors.iter())
    }

    pub fn walls_of_room(&self, room_index: usize) -> impl Iterator<Item = &Solid> + '_ {
        self.walls
            .iter()
            .filter(move |w| w.tags.room_index == Some(room_index))
    }

    pub fn total_triangles(&self) -> usize {
        self.solids().map(|s| s.mesh.triangle_count()).sum()
    }
}

/// Runs the shell and per-wall passes for a floor plan
#[derive(Clone)]
pub struct CarvingPipeline {
    config: PipelineConfig,
    evaluator: Option<Arc<dyn BooleanEvaluator>>,
}

impl CarvingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            evaluator: None,
        }
    }

    /// Use this evaluator instead of the one the config names
    pub fn with_evaluator(mut self, evaluator: Arc<dyn BooleanEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace the configuration; affects later runs only
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    pub fn run(&self, plan: &FloorPlan) -> Result<CarvedModel> {
        self.run_with_observer(plan, &mut NoopObserver)
    }

    pub fn run_with_observer<O>(&self, plan: &FloorPlan, observer: &mut O) -> Result<CarvedModel>
    where
        O: CarveObserver + ?Sized,
    {
        let start = Instant::now();
        let config = self.config.clone();
        config.validate()?;

        let adapter = match &self.evaluator {
            Some(evaluator) => CsgAdapter::with_evaluator(evaluator.clone(), config.csg),
            None => CsgAdapter::new(config.csg),
        };
        let resolver = IntersectionResolver::new(adapter.clone(), config.precise_intersection);

        tracing::info!(
            rooms = plan.rooms.len(),
            doors = plan.doors.len(),
            windows = plan.windows.len(),
            evaluator = adapter.evaluator_name(),
            epsilon = config.csg.epsilon,
            "Starting floor plan carving"
        );

        let mut report = CarveReport::default();
        let inputs = prepare_inputs(plan, &config, &adapter, &mut report)?;

        let planned = inputs.rooms.len()
            + inputs.carving.len()
            + inputs.walls.len() * inputs.carving.len();
        let mut ticker = Ticker {
            observer,
            completed: 0,
            planned,
            chunk_size: config.chunk_size,
        };

        // Shell pass
        let mut shell = inputs.outline;
        for (room_index, ring) in &inputs.rooms {
            let cutter =
                match room_solid(ring, *room_index, config.wall_height, config.carving_offset) {
                    Ok(cutter) => cutter,
                    Err(err) => {
                        let tags = SolidTags::room(*room_index);
                        report.record(CarveStage::Room, Some(&tags), None, err);
                        continue;
                    }
                };
            let (carved, applied) =
                carve(&adapter, shell, &cutter, CarveStage::ShellCut, &mut report);
            shell = carved;
            ticker.tick(CarvePass::Shell, &shell.tags, &cutter.tags, applied)?;
        }

        let mut reaching = Vec::with_capacity(inputs.carving.len());
        for tool in &inputs.carving {
            if resolver.may_intersect(&shell, tool) {
                reaching.push(tool);
            } else {
                report.stats.skipped_pairs += 1;
            }
        }

        if config.combine_openings {
            if let Some(tool) = combine_openings(&adapter, reaching.into_iter().cloned()) {
                let (carved, applied) =
                    carve(&adapter, shell, &tool, CarveStage::ShellCut, &mut report);
                shell = carved;
                ticker.tick(CarvePass::Shell, &shell.tags, &tool.tags, applied)?;
            }
        } else {
            for tool in reaching {
                let (carved, applied) =
                    carve(&adapter, shell, tool, CarveStage::ShellCut, &mut report);
                shell = carved;
                ticker.tick(CarvePass::Shell, &shell.tags, &tool.tags, applied)?;
            }
        }
        tracing::debug!(
            operations = ticker.completed,
            triangles = shell.mesh.triangle_count(),
            "Shell pass complete"
        );

        // Per-wall pass
        let index = resolver.index_openings(&inputs.walls, &inputs.carving);
        let statistics = OpeningStatistics::from_index(&index, inputs.carving.len());
        report.stats.skipped_pairs +=
            inputs.walls.len() * inputs.carving.len() - index.total_relationships();
        tracing::debug!(
            walls_with_openings = statistics.walls_with_openings,
            max_openings_per_wall = statistics.max_openings_per_wall,
            unplaced_openings = statistics.unplaced_openings,
            "Resolved openings against walls"
        );

        let mut walls = Vec::with_capacity(inputs.walls.len());
        for (wall_id, mut wall) in inputs.walls.into_iter().enumerate() {
            for &opening_id in index.openings_for(wall_id) {
                let tool = &inputs.carving[opening_id];
                let (carved, applied) =
                    carve(&adapter, wall, tool, CarveStage::WallCut, &mut report);
                wall = carved;
                ticker.tick(CarvePass::Walls, &wall.tags, &tool.tags, applied)?;
            }
            walls.push(wall);
        }

        // Display openings and floors
        let mut openings = Vec::with_capacity(inputs.openings.len());
        for opening in &inputs.openings {
            match opening.display_solid() {
                Ok(solid) => openings.push(solid),
                Err(err) => report.record(CarveStage::Opening, Some(&opening.tags()), None, err),
            }
        }

        let mut floors = Vec::new();
        if config.floor_thickness > 0.0 {
            for (room_index, ring) in &inputs.rooms {
                match floor_solid(ring, *room_index, config.floor_thickness) {
                    Ok(floor) => floors.push(floor),
                    Err(err) => {
                        let tags = SolidTags::floor(*room_index);
                        report.record(CarveStage::Floor, Some(&tags), None, err);
                    }
                }
            }
        }

        let stats = &mut report.stats;
        stats.evaluator = adapter.evaluator_name().to_string();
        stats.epsilon = config.csg.epsilon;
        stats.rooms = inputs.rooms.len();
        stats.walls = walls.len();
        stats.openings = openings.len();

        let mut model = CarvedModel {
            shell,
            walls,
            openings,
            floors,
            report,
        };
        model.report.stats.total_triangles = model.total_triangles();
        model.report.stats.carve_time_ms = start.elapsed().as_millis() as u64;

        let stats = &model.report.stats;
        tracing::info!(
            operations = stats.operations,
            applied = stats.applied,
            fallbacks = stats.fallbacks,
            skipped_pairs = stats.skipped_pairs,
            failures = model.report.failures.len(),
            triangles = stats.total_triangles,
            carve_time_ms = stats.carve_time_ms,
            "Floor plan carving complete"
        );

        Ok(model)
    }
}

impl std::fmt::Debug for CarvingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarvingPipeline")
            .field("config", &self.config)
            .field("evaluator", &self.evaluator.as_ref().map(|e| e.name()))
            .finish()
    }
}

/// Solids built before any boolean runs
struct Inputs {
    outline: Solid,
    /// Rooms with a usable ring, by plan index
    rooms: Vec<(usize, Ring)>,
    openings: Vec<Opening>,
    /// Carving solids, parallel to `openings`
    carving: Vec<Solid>,
    walls: Vec<Solid>,
}

fn prepare_inputs(
    plan: &FloorPlan,
    config: &PipelineConfig,
    adapter: &CsgAdapter,
    report: &mut CarveReport,
) -> Result<Inputs> {
    let mut rooms = Vec::with_capacity(plan.rooms.len());
    let mut walls = Vec::new();
    for (room_index, points) in plan.rooms.iter().enumerate() {
        let tags = SolidTags::room(room_index);
        let ring = match build_ring(points, config.arc_samples) {
            Ok(ring) => ring,
            Err(err) => {
                tracing::warn!(
                    room = room_index,
                    error = %err,
                    "Skipping room with unusable boundary"
                );
                report.record(CarveStage::Room, Some(&tags), None, err);
                continue;
            }
        };

        match classify_segments(points, room_index, config.arc_samples) {
            Ok(segments) => {
                // Closing vertices repeated in the source give zero-length edges
                for segment in segments.iter().filter(|s| s.length() > config.csg.epsilon) {
                    match wall_solid(segment, config.wall_thickness, config.wall_height) {
                        Ok(wall) => walls.push(wall),
                        Err(err) => {
                            tracing::warn!(
                                room = room_index,
                                start = segment.start_index,
                                end = segment.end_index,
                                error = %err,
                                "Skipping wall segment"
                            );
                            report.record(
                                CarveStage::Wall,
                                Some(&SolidTags::wall(room_index, segment.kind)),
                                None,
                                err,
                            );
                        }
                    }
                }
            }
            Err(err) => report.record(CarveStage::Wall, Some(&tags), None, err),
        }

        rooms.push((room_index, ring));
    }

    let outline = if plan.outline.is_empty() {
        derive_outline(&rooms, config, adapter, report)?
    } else {
        build_ring(&plan.outline, config.arc_samples)
            .and_then(|ring| outline_solid(&ring, config.wall_height))
            .map_err(|err| Error::EmptyOutline(err.to_string()))?
    };

    let mut openings = Vec::with_capacity(plan.opening_count());
    let mut carving = Vec::with_capacity(plan.opening_count());
    for (kind, index, spec) in plan.openings() {
        let built = Opening::from_spec(kind, index, spec, config.arc_samples).and_then(|opening| {
            let solid = opening.carving_solid(config.carving_offset)?;
            Ok((opening, solid))
        });
        match built {
            Ok((opening, solid)) => {
                openings.push(opening);
                carving.push(solid);
            }
            Err(err) => {
                tracing::warn!(kind = ?kind, index, error = %err, "Skipping opening");
                let tags = SolidTags::opening(kind, index);
                report.record(CarveStage::Opening, Some(&tags), None, err);
            }
        }
    }

    tracing::debug!(
        rooms = rooms.len(),
        walls = walls.len(),
        openings = openings.len(),
        "Prepared carving inputs"
    );

    Ok(Inputs {
        outline,
        rooms,
        openings,
        carving,
        walls,
    })
}

/// Outline fused from every room grown by the wall thickness.
///
/// A room that cannot be grown or fused is recorded and left out; only a
/// plan with no usable room at all has no outline.
fn derive_outline(
    rooms: &[(usize, Ring)],
    config: &PipelineConfig,
    adapter: &CsgAdapter,
    report: &mut CarveReport,
) -> Result<Solid> {
    let mut outline: Option<Solid> = None;
    for (room_index, ring) in rooms {
        let tags = SolidTags::room(*room_index);
        let grown = match grown_room_solid(ring, config.wall_thickness, config.wall_height) {
            Ok(grown) => grown,
            Err(err) => {
                report.record(CarveStage::Outline, Some(&tags), None, err);
                continue;
            }
        };

        outline = Some(match outline {
            None => grown,
            Some(acc) => {
                let BooleanOutcome { solid, status } = adapter.union(acc, &grown);
                if let OperationStatus::Fallback(err) = status {
                    report.record(CarveStage::Outline, Some(&solid.tags), Some(&tags), err);
                }
                solid
            }
        });
    }

    let outline = outline.ok_or_else(|| {
        Error::EmptyOutline("plan has no outline and no usable room to grow one from".to_string())
    })?;
    tracing::debug!(
        rooms = rooms.len(),
        triangles = outline.mesh.triangle_count(),
        "Derived outline from rooms"
    );
    Ok(outline)
}

/// One subtraction with failure bookkeeping; the flag tells whether the
/// evaluator result was kept
fn carve(
    adapter: &CsgAdapter,
    target: Solid,
    tool: &Solid,
    stage: CarveStage,
    report: &mut CarveReport,
) -> (Solid, bool) {
    let outcome = adapter.subtract(target, tool);
    report.stats.operations += 1;
    match outcome.status {
        OperationStatus::Applied => {
            report.stats.applied += 1;
            (outcome.solid, true)
        }
        OperationStatus::Fallback(err) => {
            report.stats.fallbacks += 1;
            report.record(stage, Some(&outcome.solid.tags), Some(&tool.tags), err);
            (outcome.solid, false)
        }
    }
}

struct Ticker<'o, O: ?Sized> {
    observer: &'o mut O,
    completed: usize,
    planned: usize,
    chunk_size: usize,
}

impl<O: CarveObserver + ?Sized> Ticker<'_, O> {
    fn tick(
        &mut self,
        pass: CarvePass,
        target: &SolidTags,
        tool: &SolidTags,
        applied: bool,
    ) -> Result<()> {
        self.completed += 1;
        let progress = CarveProgress {
            pass,
            completed: self.completed,
            planned: self.planned,
            target,
            tool,
            applied,
        };
        if self.observer.on_operation(&progress).is_break() {
            return Err(self.cancel());
        }
        if self.chunk_size > 0
            && self.completed % self.chunk_size == 0
            && self.observer.on_chunk_boundary(self.completed).is_break()
        {
            return Err(self.cancel());
        }
        Ok(())
    }

    fn cancel(&self) -> Error {
        tracing::info!(completed = self.completed, "Carving cancelled by observer");
        Error::Cancelled {
            completed: self.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::OpeningSpec;
    use approx::assert_relative_eq;
    use plancarve_geometry::{Mesh, PlanPoint, SolidRole};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PlanPoint> {
        vec![
            PlanPoint::new(x0, y0, 0.0),
            PlanPoint::new(x1, y0, 0.0),
            PlanPoint::new(x1, y1, 0.0),
            PlanPoint::new(x0, y1, 0.0),
        ]
    }

    fn plan() -> FloorPlan {
        FloorPlan {
            outline: rect(0.0, 0.0, 4000.0, 3000.0),
            rooms: vec![rect(100.0, 100.0, 3900.0, 2900.0)],
            doors: vec![OpeningSpec::new(rect(1000.0, 75.0, 1900.0, 125.0), 2100.0, 0.0)],
            windows: Vec::new(),
        }
    }

    fn signed_volume(mesh: &Mesh) -> f64 {
        mesh.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }

    #[derive(Default)]
    struct Recorder {
        operations: Vec<(CarvePass, usize)>,
        chunks: Vec<usize>,
    }

    impl CarveObserver for Recorder {
        fn on_operation(&mut self, progress: &CarveProgress<'_>) -> ControlFlow<()> {
            self.operations.push((progress.pass, progress.completed));
            ControlFlow::Continue(())
        }

        fn on_chunk_boundary(&mut self, completed: usize) -> ControlFlow<()> {
            self.chunks.push(completed);
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn test_run_counts_operations() {
        let pipeline = CarvingPipeline::new(PipelineConfig {
            chunk_size: 2,
            ..PipelineConfig::default()
        });
        let mut recorder = Recorder::default();
        let model = pipeline.run_with_observer(&plan(), &mut recorder).unwrap();

        // Room and door against the shell, door against the south wall
        assert_eq!(
            recorder.operations,
            vec![(CarvePass::Shell, 1), (CarvePass::Shell, 2), (CarvePass::Walls, 3)]
        );
        assert_eq!(recorder.chunks, vec![2]);
        assert_eq!(model.report.stats.operations, 3);
        assert_eq!(model.walls.len(), 4);
        assert_eq!(model.openings.len(), 1);
        assert!(model.floors.is_empty());
        assert_eq!(model.shell.tags.role, SolidRole::Outline);
        assert_eq!(model.walls_of_room(0).count(), 4);
    }

    #[test]
    fn test_shell_pass_removes_room_and_door() {
        let model = CarvingPipeline::new(PipelineConfig::default()).run(&plan()).unwrap();
        assert_eq!(model.report.failure_count(CarveStage::ShellCut), 0);

        // 100 mm band around the room, minus the door's share of the band
        let band = (4000.0 * 3000.0 - 3800.0 * 2800.0) * 2800.0;
        let door = 930.0 * 40.0 * 2115.0;
        assert_relative_eq!(signed_volume(&model.shell.mesh), band - door, max_relative = 1e-4);
        assert_relative_eq!(signed_volume(&model.shell.mesh), 3.729322e9, max_relative = 1e-4);
    }

    #[test]
    fn test_combined_openings_cut_the_shell_once() {
        let mut plan = plan();
        plan.windows.push(OpeningSpec::new(rect(2000.0, 2875.0, 2500.0, 2925.0), 1200.0, 900.0));

        let separate = CarvingPipeline::new(PipelineConfig::default()).run(&plan).unwrap();
        let mut recorder = Recorder::default();
        let combined = CarvingPipeline::new(PipelineConfig {
            combine_openings: true,
            ..PipelineConfig::default()
        })
        .run_with_observer(&plan, &mut recorder)
        .unwrap();

        // Room, then both openings as one tool; one opening per wall after
        assert_eq!(
            recorder.operations,
            vec![
                (CarvePass::Shell, 1),
                (CarvePass::Shell, 2),
                (CarvePass::Walls, 3),
                (CarvePass::Walls, 4)
            ]
        );
        assert_eq!(separate.report.stats.operations, 5);
        assert_eq!(combined.report.stats.operations, 4);
        assert!(combined.report.is_clean());

        let expected = (4000.0 * 3000.0 - 3800.0 * 2800.0) * 2800.0
            - 930.0 * 40.0 * 2115.0
            - 530.0 * 40.0 * 1230.0;
        assert_relative_eq!(signed_volume(&separate.shell.mesh), expected, max_relative = 1e-4);
        assert_relative_eq!(signed_volume(&combined.shell.mesh), expected, max_relative = 1e-4);
    }

    #[test]
    fn test_outline_grown_from_rooms() {
        let plan = FloorPlan {
            outline: Vec::new(),
            rooms: vec![rect(0.0, 0.0, 4000.0, 3000.0), rect(4000.0, 0.0, 8000.0, 3000.0)],
            ..FloorPlan::default()
        };
        let model = CarvingPipeline::new(PipelineConfig::default()).run(&plan).unwrap();
        assert_eq!(model.report.failure_count(CarveStage::Outline), 0);
        assert_eq!(model.shell.tags.role, SolidRole::Outline);

        let bounds = model.shell.bounds().unwrap();
        assert_relative_eq!(bounds.min.x, -20.0, epsilon = 1e-2);
        assert_relative_eq!(bounds.max.x, 8020.0, epsilon = 1e-2);
        assert_relative_eq!(bounds.max.y, 3020.0, epsilon = 1e-2);
        assert_eq!(model.walls.len(), 8);
    }

    #[test]
    fn test_no_outline_and_no_rooms_is_an_error() {
        let plan = FloorPlan {
            rooms: vec![vec![PlanPoint::new(0.0, 0.0, 0.0)]],
            ..FloorPlan::default()
        };
        let result = CarvingPipeline::new(PipelineConfig::default()).run(&plan);
        assert!(matches!(result, Err(Error::EmptyOutline(_))));
    }

    #[test]
    fn test_observer_cancels() {
        let pipeline = CarvingPipeline::new(PipelineConfig::default());
        let mut observer = |progress: &CarveProgress<'_>| {
            if progress.completed == 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let result = pipeline.run_with_observer(&plan(), &mut observer);
        assert!(matches!(result, Err(Error::Cancelled { completed: 1 })));
    }

    #[test]
    fn test_chunk_boundary_cancels() {
        struct StopAtChunk;
        impl CarveObserver for StopAtChunk {
            fn on_chunk_boundary(&mut self, _completed: usize) -> ControlFlow<()> {
                ControlFlow::Break(())
            }
        }

        let pipeline = CarvingPipeline::new(PipelineConfig {
            chunk_size: 2,
            ..PipelineConfig::default()
        });
        let result = pipeline.run_with_observer(&plan(), &mut StopAtChunk);
        assert!(matches!(result, Err(Error::Cancelled { completed: 2 })));
    }

    #[test]
    fn test_unusable_outline_is_an_error() {
        let mut plan = plan();
        plan.outline.truncate(2);
        let result = CarvingPipeline::new(PipelineConfig::default()).run(&plan);
        assert!(matches!(result, Err(Error::EmptyOutline(_))));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let pipeline = CarvingPipeline::new(PipelineConfig {
            wall_thickness: -1.0,
            ..PipelineConfig::default()
        });
        assert!(matches!(pipeline.run(&plan()), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_room_and_opening_are_skipped() {
        let mut plan = plan();
        plan.rooms.push(vec![PlanPoint::new(0.0, 0.0, 0.0), PlanPoint::new(1.0, 1.0, 0.0)]);
        plan.windows.push(OpeningSpec::new(rect(0.0, 0.0, 10.0, 10.0), -5.0, 0.0));

        let model = CarvingPipeline::new(PipelineConfig::default()).run(&plan).unwrap();
        assert_eq!(model.report.failure_count(CarveStage::Room), 1);
        assert_eq!(model.report.failure_count(CarveStage::Opening), 1);
        assert_eq!(model.report.stats.rooms, 1);
        assert_eq!(model.walls.len(), 4);
        assert_eq!(model.openings.len(), 1);
    }

    #[test]
    fn test_floors() {
        let pipeline = CarvingPipeline::new(PipelineConfig {
            floor_thickness: 120.0,
            ..PipelineConfig::default()
        });
        let model = pipeline.run(&plan()).unwrap();
        assert_eq!(model.floors.len(), 1);
        assert_eq!(model.floors[0].tags, SolidTags::floor(0));
        let bounds = model.floors[0].bounds().unwrap();
        assert!(bounds.max.z <= 1e-6);
        assert!(model.total_triangles() > model.shell.mesh.triangle_count());
    }

    #[test]
    fn test_config_change_affects_later_runs_only() {
        let mut pipeline = CarvingPipeline::new(PipelineConfig::default());
        let first = pipeline.run(&plan()).unwrap();
        assert_eq!(first.report.stats.evaluator, "bsp");

        let mut config = pipeline.config().clone();
        config.csg.engine = plancarve_geometry::EvaluatorKind::Clip;
        pipeline.set_config(config);
        let second = pipeline.run(&plan()).unwrap();
        assert_eq!(second.report.stats.evaluator, "clip");
        assert_eq!(first.report.stats.evaluator, "bsp");
    }
}
