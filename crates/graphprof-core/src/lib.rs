#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

//! Network-measure profiling engine.
//!
//! Given a graph and a set of enabled measures, this crate computes each
//! measure through a pluggable algorithm capability, derives distribution
//! statistics (sorted/ranked samples, assortativity, centralization),
//! correlates measures within the same category, renders per-measure SVG
//! views, and assembles everything into an HTML or LaTeX report.
//!
//! - [`Config`] / [`Preset`] select what to compute
//! - [`Profile`] drives the two-phase compute → post-process pipeline
//! - [`walk`] batch-profiles a directory of graph files
//!
//! # Example
//!
//! ```rust
//! use graphprof_core::{Graph, Preset, Profile, MeasureKey};
//!
//! let mut g = Graph::new(false, false);
//! g.add_edge(0, 1, 1.0);
//! g.add_edge(1, 2, 1.0);
//! g.add_edge(2, 0, 1.0);
//!
//! let profile = Profile::create(g, Preset::Minimal).unwrap();
//! assert_eq!(profile.properties().nodes, 3);
//! assert!(profile.stat(MeasureKey::Degree).is_ok());
//! ```

pub mod algo;
mod config;
pub mod correlation;
mod error;
mod graph;
pub mod plot;
mod pool;
mod profile;
mod registry;
pub mod report;
pub mod stat;
mod walk;

pub use config::{
    Config, CorrelationKind, Preset, PropertyKey, ALL_CORRELATIONS, ALL_PROPERTIES,
};
pub use correlation::{ordered_pair, CorrelationEntry, CorrelationMatrix};
pub use error::{Error, Result};
pub use graph::{Graph, GraphFormat};
pub use plot::{colors, PlotRenderer, Style, SvgRenderer, Theme};
pub use pool::{default_workers, Completed, JobKind, WorkerPool};
pub use profile::{DisplaySink, Measure, Profile, ProfileSettings, Properties, Timings};
pub use registry::{Category, MeasureKey, MeasureSpec, ALL_MEASURES};
pub use report::OutputKind;
pub use stat::Stats;
pub use walk::{walk, WalkOptions};
