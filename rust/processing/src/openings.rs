// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window solids.
//!
//! Every opening yields two solids from the same footprint: the display
//! solid at its exact size and the carving solid, enlarged so that cuts
//! pass cleanly through wall faces instead of leaving coplanar slivers.

use crate::plan::OpeningSpec;
use plancarve_geometry::{
    build_ring, extrude_solid, offset_ring, CsgAdapter, Error, OpeningKind, Result, Ring, Solid,
    SolidTags,
};

/// A door or window ready for solid construction
#[derive(Debug, Clone)]
pub struct Opening {
    pub kind: OpeningKind,
    /// Position among openings of the same kind
    pub index: usize,
    pub ring: Ring,
    pub height: f64,
    pub ground_elevation: f64,
    /// Footprint contains a bulged edge
    pub has_arc: bool,
}

impl Opening {
    /// Flatten an opening footprint into a ring
    pub fn from_spec(
        kind: OpeningKind,
        index: usize,
        spec: &OpeningSpec,
        arc_samples: usize,
    ) -> Result<Self> {
        if !spec.height.is_finite() || spec.height <= 0.0 {
            return Err(Error::InvalidExtrusion(format!(
                "{:?} {} has height {}",
                kind, index, spec.height
            )));
        }
        if !spec.ground_elevation.is_finite() {
            return Err(Error::InvalidExtrusion(format!(
                "{:?} {} has a non-finite ground elevation",
                kind, index
            )));
        }

        Ok(Self {
            kind,
            index,
            ring: build_ring(&spec.points, arc_samples)?,
            height: spec.height,
            ground_elevation: spec.ground_elevation,
            has_arc: spec.has_arc(),
        })
    }

    #[inline]
    pub fn tags(&self) -> SolidTags {
        SolidTags::opening(self.kind, self.index)
    }

    /// Exact-size solid standing on its ground elevation
    pub fn display_solid(&self) -> Result<Solid> {
        Ok(extrude_solid(&self.ring, self.height, 0.0, self.tags())?
            .raised_by(self.ground_elevation)
            .baked())
    }

    /// Solid enlarged by `offset` outward in plan and at both ends.
    ///
    /// The vertical placement is left pending; the adapter bakes it before
    /// any boolean and the resolver applies it to bounds.
    pub fn carving_solid(&self, offset: f64) -> Result<Solid> {
        let ring = offset_ring(&self.ring, offset)?;
        let solid = extrude_solid(&ring, self.height + 2.0 * offset, 0.0, self.tags())?;
        Ok(solid.raised_by(self.ground_elevation - offset))
    }
}

/// Union several opening solids into one.
///
/// Operands are folded left to right; an operand the adapter cannot merge
/// is left out and the fold continues. The result carries the first
/// solid's tags.
pub fn combine_openings<I>(adapter: &CsgAdapter, solids: I) -> Option<Solid>
where
    I: IntoIterator<Item = Solid>,
{
    let mut solids = solids.into_iter();
    let first = solids.next()?.baked();

    let mut merged = 0usize;
    let mut skipped = 0usize;
    let combined = solids.fold(first, |acc, solid| {
        let outcome = adapter.union(acc, &solid);
        if outcome.is_applied() {
            merged += 1;
        } else {
            skipped += 1;
        }
        outcome.into_solid()
    });

    tracing::debug!(merged, skipped, "Combined opening solids");
    Some(combined)
}
