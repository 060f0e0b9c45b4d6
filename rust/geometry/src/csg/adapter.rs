// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated boolean operations on tagged solids with graceful fallback

use super::{BooleanEvaluator, BooleanOp, CsgConfig};
use crate::error::Error;
use crate::solid::Solid;
use std::sync::Arc;

/// How a boolean operation ended
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    /// The evaluator result was accepted
    Applied,
    /// Operand A was returned unchanged
    Fallback(Error),
}

/// Result of an adapter operation: always a solid, plus what happened
#[derive(Debug, Clone)]
pub struct BooleanOutcome {
    pub solid: Solid,
    pub status: OperationStatus,
}

impl BooleanOutcome {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OperationStatus::Applied)
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.status {
            OperationStatus::Applied => None,
            OperationStatus::Fallback(err) => Some(err),
        }
    }

    #[inline]
    pub fn into_solid(self) -> Solid {
        self.solid
    }
}

/// Wraps a [`BooleanEvaluator`] with validity checks, pending-transform
/// baking, tag propagation and the fallback-to-operand-A policy.
#[derive(Clone)]
pub struct CsgAdapter {
    evaluator: Arc<dyn BooleanEvaluator>,
    config: CsgConfig,
}

impl CsgAdapter {
    /// Adapter over the evaluator the config names
    pub fn new(config: CsgConfig) -> Self {
        Self {
            evaluator: config.engine.create(),
            config,
        }
    }

    /// Adapter over a caller-supplied evaluator
    pub fn with_evaluator(evaluator: Arc<dyn BooleanEvaluator>, config: CsgConfig) -> Self {
        Self { evaluator, config }
    }

    #[inline]
    pub fn config(&self) -> &CsgConfig {
        &self.config
    }

    #[inline]
    pub fn evaluator_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// `a - b`
    pub fn subtract(&self, a: Solid, b: &Solid) -> BooleanOutcome {
        self.apply(BooleanOp::Difference, a, b)
    }

    /// `a ∪ b`
    pub fn union(&self, a: Solid, b: &Solid) -> BooleanOutcome {
        self.apply(BooleanOp::Union, a, b)
    }

    /// Whether two solids share volume.
    ///
    /// `None` when either operand is invalid or the evaluator cannot tell.
    pub fn intersects(&self, a: &Solid, b: &Solid) -> Option<bool> {
        let a = a.baked_ref();
        let b = b.baked_ref();
        if !a.is_valid() || !b.is_valid() {
            return None;
        }
        match self
            .evaluator
            .evaluate(BooleanOp::Intersection, &a.mesh, &b.mesh, self.config.epsilon)
        {
            Ok(mesh) if mesh.is_well_formed() => Some(!mesh.is_empty()),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(
                    evaluator = self.evaluator.name(),
                    error = %err,
                    "Precise intersection undecided"
                );
                None
            }
        }
    }

    fn apply(&self, op: BooleanOp, a: Solid, b: &Solid) -> BooleanOutcome {
        let a = a.baked();
        match self.try_apply(op, &a, b) {
            Ok(mesh) => BooleanOutcome {
                solid: Solid::new(mesh, a.tags),
                status: OperationStatus::Applied,
            },
            Err(err) => {
                tracing::warn!(
                    op = %op,
                    evaluator = self.evaluator.name(),
                    role = ?a.tags.role,
                    tool = ?b.tags.role,
                    error = %err,
                    "Boolean operation failed, keeping first operand"
                );
                BooleanOutcome {
                    solid: a,
                    status: OperationStatus::Fallback(err),
                }
            }
        }
    }

    fn try_apply(&self, op: BooleanOp, a: &Solid, b: &Solid) -> Result<crate::mesh::Mesh, Error> {
        if !a.is_valid() {
            return Err(Error::InvalidSolid(format!(
                "first operand ({:?}) is empty or non-finite",
                a.tags.role
            )));
        }
        let b = b.baked_ref();
        if !b.is_valid() {
            return Err(Error::InvalidSolid(format!(
                "second operand ({:?}) is empty or non-finite",
                b.tags.role
            )));
        }

        let mesh = self
            .evaluator
            .evaluate(op, &a.mesh, &b.mesh, self.config.epsilon)
            .map_err(|err| match err {
                Error::BooleanOperationFailed(_) => err,
                other => Error::BooleanOperationFailed(other.to_string()),
            })?;

        let candidate = Solid::new(mesh, a.tags.clone());
        if !candidate.is_usable_result() {
            return Err(Error::BooleanOperationFailed(format!(
                "{} produced a degenerate result ({} triangles)",
                op,
                candidate.mesh.triangle_count()
            )));
        }
        Ok(candidate.mesh)
    }
}

impl std::fmt::Debug for CsgAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsgAdapter")
            .field("evaluator", &self.evaluator.name())
            .field("config", &self.config)
            .finish()
    }
}
