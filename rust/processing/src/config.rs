// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration, environment loading and plan-based recommendation.

use crate::error::{Error, Result};
use crate::plan::FloorPlan;
use plancarve_geometry::{CsgConfig, EvaluatorKind, PrecisionLevel, DEFAULT_ARC_SAMPLES};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_WALL_HEIGHT: f64 = 2800.0;
pub const DEFAULT_WALL_THICKNESS: f64 = 20.0;
pub const DEFAULT_CARVING_OFFSET: f64 = 15.0;

/// Settings for one carving run.
///
/// Lengths are in plan units (millimetres for the usual drawing sources).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Boolean engine and tolerance, snapshotted at the start of each run
    pub csg: CsgConfig,
    pub wall_height: f64,
    pub wall_thickness: f64,
    /// Enlargement applied to carving solids in plan and at both ends
    pub carving_offset: f64,
    /// Samples per bulge arc, both endpoints included
    pub arc_samples: usize,
    /// Slab thickness below each room; 0 disables floors
    pub floor_thickness: f64,
    /// Confirm bounding-box hits with an exact intersection
    pub precise_intersection: bool,
    /// Union the openings reaching the shell and subtract them in one step.
    /// The box evaluator cuts the bounds of the whole union, so this is
    /// meant for the exact engine.
    pub combine_openings: bool,
    /// Operations between cooperative yield points; 0 disables them
    pub chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            csg: CsgConfig::default(),
            wall_height: DEFAULT_WALL_HEIGHT,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            carving_offset: DEFAULT_CARVING_OFFSET,
            arc_samples: DEFAULT_ARC_SAMPLES,
            floor_thickness: 0.0,
            precise_intersection: false,
            combine_openings: false,
            chunk_size: 0,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `PLANCARVE_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let engine = parsed(&lookup, "PLANCARVE_ENGINE", defaults.csg.engine);
        let mut csg = CsgConfig {
            engine,
            ..defaults.csg
        };
        let precision =
            lookup("PLANCARVE_PRECISION").and_then(|v| v.parse::<PrecisionLevel>().ok());
        if let Some(level) = precision {
            csg = csg.with_precision(level);
        }
        csg.epsilon = parsed(&lookup, "PLANCARVE_EPSILON", csg.epsilon);

        Self {
            csg,
            wall_height: parsed(&lookup, "PLANCARVE_WALL_HEIGHT", defaults.wall_height),
            wall_thickness: parsed(&lookup, "PLANCARVE_WALL_THICKNESS", defaults.wall_thickness),
            carving_offset: parsed(&lookup, "PLANCARVE_CARVING_OFFSET", defaults.carving_offset),
            arc_samples: parsed(&lookup, "PLANCARVE_ARC_SAMPLES", defaults.arc_samples),
            floor_thickness: parsed(
                &lookup,
                "PLANCARVE_FLOOR_THICKNESS",
                defaults.floor_thickness,
            ),
            precise_intersection: parsed(
                &lookup,
                "PLANCARVE_PRECISE_INTERSECTION",
                defaults.precise_intersection,
            ),
            combine_openings: parsed(
                &lookup,
                "PLANCARVE_COMBINE_OPENINGS",
                defaults.combine_openings,
            ),
            chunk_size: parsed(&lookup, "PLANCARVE_CHUNK_SIZE", defaults.chunk_size),
        }
    }

    /// Parse a JSON configuration; missing fields keep their default
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run can work with
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, value)))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{} must not be negative, got {}", name, value)))
            }
        }

        positive("wall_height", self.wall_height)?;
        positive("wall_thickness", self.wall_thickness)?;
        positive("epsilon", self.csg.epsilon)?;
        non_negative("carving_offset", self.carving_offset)?;
        non_negative("floor_thickness", self.floor_thickness)?;
        if self.arc_samples < 2 {
            return Err(Error::InvalidConfig(format!(
                "arc_samples must be at least 2, got {}",
                self.arc_samples
            )));
        }
        Ok(())
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Engine settings suggested for a particular plan
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub config: CsgConfig,
    pub precision: PrecisionLevel,
    /// (doors + windows)·2 + rooms·3, plus 10 when any room is curved
    pub complexity: usize,
    pub reasons: Vec<String>,
}

/// Suggest engine and precision from the size and shape of a plan.
///
/// Curved rooms, many openings or a high complexity score ask for exact
/// booleans at high precision; very small straight-walled plans can use
/// the coarse tolerance.
pub fn recommend_config(plan: &FloorPlan) -> Recommendation {
    let openings = plan.opening_count();
    let rooms = plan.rooms.len();
    let has_arcs = plan.has_arcs();
    let complexity = openings * 2 + rooms * 3 + if has_arcs { 10 } else { 0 };

    // The exact engine in every case; plans only differ in tolerance
    let engine = EvaluatorKind::Bsp;
    let mut precision = PrecisionLevel::Medium;
    let mut reasons = Vec::new();

    if has_arcs {
        precision = PrecisionLevel::High;
        reasons.push("curved walls need high precision".to_string());
    }

    if openings > 15 {
        precision = PrecisionLevel::High;
        reasons.push(format!("{} openings, exact booleans recommended", openings));
    }

    if rooms > 8 {
        precision = PrecisionLevel::Medium;
        reasons.push(format!("{} rooms, balancing precision and speed", rooms));
    }

    if complexity > 30 {
        precision = PrecisionLevel::High;
        reasons.push(format!("complexity {} needs the exact engine", complexity));
    }

    if complexity < 5 && !has_arcs {
        precision = PrecisionLevel::Fast;
        reasons.push("simple plan, coarse tolerance is enough".to_string());
    }

    if reasons.is_empty() {
        reasons.push("standard configuration".to_string());
    }

    tracing::debug!(
        complexity,
        engine = ?engine,
        precision = ?precision,
        "Recommended carving configuration"
    );

    Recommendation {
        config: CsgConfig::new(engine, precision),
        precision,
        complexity,
        reasons,
    }
}
