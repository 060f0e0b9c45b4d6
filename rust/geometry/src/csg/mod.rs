// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) Operations
//!
//! Boolean evaluators behind a single trait, the configuration that picks
//! one, and the adapter that turns evaluator failures into a fallback.

mod adapter;
mod bsp;
mod clipping;

pub use adapter::{BooleanOutcome, CsgAdapter, OperationStatus};
pub use bsp::BspEvaluator;
pub use clipping::{ClipEvaluator, ClipResult, ClippingProcessor, Plane, Triangle, TriangleVec};

use crate::error::Result;
use crate::mesh::Mesh;
use std::fmt;
use std::sync::Arc;

/// Boolean operation on two closed meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanOp::Union => write!(f, "union"),
            BooleanOp::Difference => write!(f, "difference"),
            BooleanOp::Intersection => write!(f, "intersection"),
        }
    }
}

/// Mesh boolean backend.
///
/// Implementations may fail or return degenerate output; the
/// [`CsgAdapter`] is responsible for validating both.
pub trait BooleanEvaluator: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Compute `a op b`
    fn evaluate(&self, op: BooleanOp, a: &Mesh, b: &Mesh, epsilon: f64) -> Result<Mesh>;
}

/// Which built-in evaluator to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EvaluatorKind {
    /// csgrs BSP trees; exact for arbitrary closed tools
    #[default]
    Bsp,
    /// Axis-aligned box clipping; fast, treats every tool as its bounding box
    Clip,
}

impl EvaluatorKind {
    pub fn create(self) -> Arc<dyn BooleanEvaluator> {
        match self {
            EvaluatorKind::Bsp => Arc::new(BspEvaluator::new()),
            EvaluatorKind::Clip => Arc::new(ClipEvaluator::new()),
        }
    }
}

impl std::str::FromStr for EvaluatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bsp" | "csgrs" => Ok(EvaluatorKind::Bsp),
            "clip" | "aabb" => Ok(EvaluatorKind::Clip),
            other => Err(format!("unknown evaluator '{}'", other)),
        }
    }
}

/// Named tolerance presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PrecisionLevel {
    UltraHigh,
    High,
    Medium,
    Low,
    Fast,
}

impl PrecisionLevel {
    pub fn epsilon(self) -> f64 {
        match self {
            PrecisionLevel::UltraHigh => 1e-8,
            PrecisionLevel::High => 1e-6,
            PrecisionLevel::Medium => 1e-5,
            PrecisionLevel::Low => 1e-4,
            PrecisionLevel::Fast => 1e-3,
        }
    }
}

impl std::str::FromStr for PrecisionLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ultra_high" | "ultrahigh" => Ok(PrecisionLevel::UltraHigh),
            "high" => Ok(PrecisionLevel::High),
            "medium" => Ok(PrecisionLevel::Medium),
            "low" => Ok(PrecisionLevel::Low),
            "fast" => Ok(PrecisionLevel::Fast),
            other => Err(format!("unknown precision level '{}'", other)),
        }
    }
}

/// Evaluator choice and numeric tolerance, read once per run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CsgConfig {
    pub engine: EvaluatorKind,
    pub epsilon: f64,
}

impl CsgConfig {
    pub fn new(engine: EvaluatorKind, precision: PrecisionLevel) -> Self {
        Self {
            engine,
            epsilon: precision.epsilon(),
        }
    }

    pub fn with_precision(self, precision: PrecisionLevel) -> Self {
        Self {
            epsilon: precision.epsilon(),
            ..self
        }
    }
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self::new(EvaluatorKind::Bsp, PrecisionLevel::Medium)
    }
}
