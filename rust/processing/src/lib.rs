// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan carving pipeline.
//!
//! Turns a [`FloorPlan`] into a carved building shell, per-segment wall
//! solids with door and window holes, display openings and optional floor
//! slabs. Boolean failures never abort a run; they are collected in the
//! [`CarveReport`].
//!
//! ```no_run
//! use plancarve_processing::{CarvingPipeline, FloorPlan, PipelineConfig};
//!
//! let plan = FloorPlan::from_json(&std::fs::read_to_string("plan.json")?)?;
//! let model = CarvingPipeline::new(PipelineConfig::from_env()).run(&plan)?;
//! for failure in &model.report.failures {
//!     eprintln!("{:?}: {}", failure.stage, failure.error);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod openings;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod resolver;
pub mod walls;

pub use config::{recommend_config, PipelineConfig, Recommendation};
pub use error::{Error, Result};
pub use openings::{combine_openings, Opening};
pub use pipeline::{
    CarveObserver, CarvePass, CarveProgress, CarvedModel, CarvingPipeline, NoopObserver,
};
pub use plan::{FloorPlan, OpeningSpec};
pub use report::{CarveFailure, CarveReport, CarveStage, CarveStats};
pub use resolver::{IntersectionResolver, OpeningIndex, OpeningStatistics};
