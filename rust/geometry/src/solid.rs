// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged solids with an optional pending placement

use crate::bounds::Aabb;
use crate::extrusion::apply_transform;
use crate::mesh::Mesh;
use crate::segments::SegmentKind;
use nalgebra::{Matrix4, Vector3};
use std::borrow::Cow;

/// A closed solid needs at least a tetrahedron's worth of faces
pub const MIN_SOLID_TRIANGLES: usize = 4;

/// Door or window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OpeningKind {
    Door,
    Window,
}

/// What a solid stands for in the carved model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolidRole {
    Outline,
    Room,
    Wall,
    Floor,
    Opening(OpeningKind),
}

/// Identity metadata carried through boolean operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolidTags {
    pub role: SolidRole,
    pub room_index: Option<usize>,
    pub segment_kind: Option<SegmentKind>,
    /// Position of the source opening among openings of its kind
    pub opening_index: Option<usize>,
}

impl SolidTags {
    pub fn new(role: SolidRole) -> Self {
        Self {
            role,
            room_index: None,
            segment_kind: None,
            opening_index: None,
        }
    }

    pub fn outline() -> Self {
        Self::new(SolidRole::Outline)
    }

    pub fn room(room_index: usize) -> Self {
        Self {
            room_index: Some(room_index),
            ..Self::new(SolidRole::Room)
        }
    }

    pub fn floor(room_index: usize) -> Self {
        Self {
            room_index: Some(room_index),
            ..Self::new(SolidRole::Floor)
        }
    }

    pub fn wall(room_index: usize, kind: SegmentKind) -> Self {
        Self {
            room_index: Some(room_index),
            segment_kind: Some(kind),
            ..Self::new(SolidRole::Wall)
        }
    }

    pub fn opening(kind: OpeningKind, opening_index: usize) -> Self {
        Self {
            opening_index: Some(opening_index),
            ..Self::new(SolidRole::Opening(kind))
        }
    }
}

/// Triangle mesh plus tags plus an optional local transform that has not
/// yet been applied to the vertices.
#[derive(Debug, Clone)]
pub struct Solid {
    pub mesh: Mesh,
    pub tags: SolidTags,
    pub transform: Option<Matrix4<f64>>,
}

impl Solid {
    pub fn new(mesh: Mesh, tags: SolidTags) -> Self {
        Self {
            mesh,
            tags,
            transform: None,
        }
    }

    /// Attach a pending placement
    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Pending vertical placement, as used for opening sill heights
    pub fn raised_by(self, dz: f64) -> Self {
        self.with_transform(Matrix4::new_translation(&Vector3::new(0.0, 0.0, dz)))
    }

    /// Apply and clear the pending transform
    pub fn baked(mut self) -> Self {
        if let Some(transform) = self.transform.take() {
            apply_transform(&mut self.mesh, &transform);
        }
        self
    }

    /// Borrowed when nothing is pending, baked copy otherwise
    pub fn baked_ref(&self) -> Cow<'_, Solid> {
        if self.transform.is_some() {
            Cow::Owned(self.clone().baked())
        } else {
            Cow::Borrowed(self)
        }
    }

    /// Non-empty triangle set with finite coordinates and valid indices
    pub fn is_valid(&self) -> bool {
        !self.mesh.is_empty()
            && self.mesh.is_well_formed()
            && self
                .transform
                .map_or(true, |t| t.iter().all(|v| v.is_finite()))
    }

    /// Valid and closed-solid sized
    pub fn is_usable_result(&self) -> bool {
        self.is_valid() && self.mesh.triangle_count() >= MIN_SOLID_TRIANGLES
    }

    /// World-space bounds with the pending transform applied
    pub fn bounds(&self) -> Option<Aabb> {
        let local = Aabb::from_mesh(&self.mesh)?;
        Some(match &self.transform {
            Some(t) => local.transformed(t),
            None => local,
        })
    }
}
