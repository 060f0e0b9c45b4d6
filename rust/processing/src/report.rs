// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run report: what was skipped, what fell back, and summary statistics.

use plancarve_geometry::{Error, SolidTags};
use serde::{Deserialize, Serialize};

/// Where in a run a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarveStage {
    /// Room could not be grown or fused into the derived outline
    Outline,
    /// Room ring or room cutter could not be built; the room is skipped
    Room,
    /// Opening footprint or solids could not be built; the opening is skipped
    Opening,
    /// Wall segment solid could not be built; the segment is skipped
    Wall,
    Floor,
    /// Subtraction from the shell fell back to the uncut shell
    ShellCut,
    /// Subtraction from a wall fell back to the uncut wall
    WallCut,
}

/// One recorded failure. The run always continues past it.
#[derive(Debug, Clone, PartialEq)]
pub struct CarveFailure {
    pub stage: CarveStage,
    pub target: Option<SolidTags>,
    pub tool: Option<SolidTags>,
    pub error: Error,
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarveStats {
    /// Evaluator that performed the booleans
    pub evaluator: String,
    pub epsilon: f64,
    pub rooms: usize,
    pub walls: usize,
    pub openings: usize,
    /// Subtractions attempted by the shell and per-wall passes
    pub operations: usize,
    /// Operations whose result was accepted
    pub applied: usize,
    /// Operations that returned the first operand unchanged
    pub fallbacks: usize,
    /// Opening/target pairs rejected by the intersection resolver
    pub skipped_pairs: usize,
    pub total_triangles: usize,
    pub carve_time_ms: u64,
}

/// Failures and statistics of a carving run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarveReport {
    pub failures: Vec<CarveFailure>,
    pub stats: CarveStats,
}

impl CarveReport {
    pub fn record(
        &mut self,
        stage: CarveStage,
        target: Option<&SolidTags>,
        tool: Option<&SolidTags>,
        error: Error,
    ) {
        self.failures.push(CarveFailure {
            stage,
            target: target.cloned(),
            tool: tool.cloned(),
            error,
        });
    }

    /// No failure of any kind
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_at(&self, stage: CarveStage) -> impl Iterator<Item = &CarveFailure> + '_ {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    pub fn failure_count(&self, stage: CarveStage) -> usize {
        self.failures_at(stage).count()
    }
}
