// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. graph::GitGraph)
    clippy::module_name_repetitions
)]

//! # gitgraph-md
//!
//! Renders `git-graph` fenced blocks in markdown as branch/commit diagrams.
//!
//! A block lists branches and their commits in a small text format:
//!
//! ```text
//! [main]
//! a1 initial commit 2020-01-01
//! a2 'second commit' 2020-01-03
//! [feature]
//! f1<a1 branch work 2020-01-02
//! ```
//!
//! ## Pipeline
//!
//! - **Parse**: block text into a [`graph::GitGraph`]
//! - **Linearize**: interleave branches into one oldest-first order
//! - **Layout**: assign rows and lanes, producing drawables
//! - **Render**: drawables to SVG or an HTML table
//!
//! ## Modules
//!
//! - [`graph`]: Graph model, block parser and linearizer
//! - [`layout`]: Geometry and drawables
//! - [`render`]: SVG and table markup
//! - [`document`]: Markdown integration via comrak
//! - [`options`]: Rendering options and overrides
//! - [`config`]: Saved flags and options files
//! - [`raster`]: PNG output
//! - [`watcher`]: File watching

pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod layout;
pub mod options;
pub mod perf;
pub mod raster;
pub mod render;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::render_markdown;
    pub use crate::graph::GitGraph;
    pub use crate::options::ResolvedOptions;
    pub use crate::render::render;
}
