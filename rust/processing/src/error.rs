// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a carving run.
///
/// Individual boolean failures never surface here; they are recorded in
/// the run report and the run continues.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Carving cancelled after {completed} operations")]
    Cancelled { completed: usize },

    #[error("Building outline is unusable: {0}")]
    EmptyOutline(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] plancarve_geometry::Error),

    #[error("Invalid floor plan document: {0}")]
    Parse(#[from] serde_json::Error),
}
