//! Turning a git-graph block into markup.
//!
//! [`render`] is the entry point the document pipeline calls for every
//! tagged fence. It never fails: layout errors replace the diagram with a
//! small error graphic.

mod svg;
mod table;

use serde::Serialize;

pub use svg::{draw, draw_svg};
pub use table::draw_table;

use crate::graph::{GitGraph, Linearization, linearize, parse};
use crate::layout::{Diagram, error_diagram, layout};
use crate::options::{OutputLayout, ResolvedOptions};
use crate::perf;

/// Element id prefix for the diagram of block `block_index`.
pub fn diagram_id(block_index: usize) -> String {
    format!("gg-{block_index}")
}

/// Render one block body to SVG (or table) markup.
pub fn render(block_index: usize, text: &str, options: &ResolvedOptions) -> String {
    let _scope = perf::scope("render.block");
    let id = diagram_id(block_index);
    match diagram(text, options) {
        Ok(diagram) => match options.theme.layout {
            OutputLayout::Svg => draw_svg(&id, &diagram, &options.theme),
            OutputLayout::Table => draw_table(&id, &diagram, &options.theme),
        },
        Err(diagram) => draw_svg(&id, &diagram, &options.theme),
    }
}

/// Render one block body to a standalone SVG document, ignoring the table
/// layout.
pub fn render_svg(block_index: usize, text: &str, options: &ResolvedOptions) -> String {
    let mut options = options.clone();
    options.theme.layout = OutputLayout::Svg;
    let diagram = match diagram(text, &options) {
        Ok(diagram) | Err(diagram) => diagram,
    };
    draw_svg(&diagram_id(block_index), &diagram, &options.theme)
}

/// Parse and lay out `text`. The error side already holds the error graphic.
pub fn diagram(text: &str, options: &ResolvedOptions) -> Result<Diagram, Diagram> {
    let graph = parse(text, options);
    layout(&graph, options).map_err(|errors| error_diagram(&errors, options))
}

/// Everything known about one block, for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub graph: GitGraph,
    pub order: Vec<String>,
    pub dropped: usize,
    pub errors: Vec<String>,
    pub diagram: Option<Diagram>,
}

pub fn describe(text: &str, options: &ResolvedOptions) -> GraphReport {
    let graph = parse(text, options);
    let Linearization { order, dropped } = linearize(&graph, &graph.table());
    let order = order
        .into_iter()
        .map(|id| graph.commit(id).hash.clone())
        .collect();
    let (diagram, errors) = match layout(&graph, options) {
        Ok(diagram) => (Some(diagram), Vec::new()),
        Err(errors) => (None, errors.iter().map(ToString::to_string).collect()),
    };
    GraphReport {
        graph,
        order,
        dropped,
        errors,
        diagram,
    }
}
