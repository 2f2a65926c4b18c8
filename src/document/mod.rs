//! Markdown documents with git-graph blocks.
//!
//! Documents are parsed with comrak. Every fenced code block whose info
//! string starts with `git-graph` is swapped for a raw HTML block holding
//! the rendered diagram before the tree is formatted back to HTML. Other
//! code blocks are left to comrak.

use std::path::Path;

use anyhow::{Context, Result};
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};

use crate::options::{GIT_GRAPH_TAG, OptionOverrides, ResolvedOptions, info_overrides};
use crate::perf;
use crate::render::render;

/// Extensions read as bare git-graph source rather than markdown.
const GRAPH_EXTENSIONS: &[&str] = &["gitgraph", "gg"];

/// One git-graph fence found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBlock {
    /// Ordinal among the document's git-graph blocks.
    pub index: usize,
    /// Overrides from the fence info string.
    pub overrides: OptionOverrides,
    /// Block body.
    pub literal: String,
}

/// Prepare file content for rendering based on its extension.
///
/// Bare graph sources are wrapped in a git-graph fence so they go through
/// the same pipeline as markdown. Everything else passes through unchanged.
pub fn prepare_content(file_path: &Path, content: String) -> String {
    if !is_graph_source(file_path) {
        return content;
    }
    let fence = "`".repeat(longest_backtick_run(&content).max(2) + 1);
    format!("{fence}{GIT_GRAPH_TAG}\n{content}\n{fence}")
}

/// Returns true if the file extension marks a bare git-graph source.
pub fn is_graph_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GRAPH_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn longest_backtick_run(content: &str) -> usize {
    content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

/// Render markdown to HTML, replacing each git-graph block with its diagram.
///
/// # Errors
///
/// Returns an error if the HTML cannot be written or is not UTF-8.
pub fn render_markdown(source: &str, options: &ResolvedOptions) -> Result<String> {
    let _scope = perf::scope("document.render");
    let arena = Arena::new();
    let mut comrak_options = create_options();
    // Diagrams are emitted as raw HTML blocks.
    comrak_options.render.unsafe_ = true;
    let root = parse_document(&arena, source, &comrak_options);

    let mut index = 0;
    for node in root.descendants() {
        let Some((overrides, literal)) = graph_fence(node) else {
            continue;
        };
        let markup = render(index, &literal, &options.merge(&overrides));
        node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: format!("{markup}\n"),
        });
        index += 1;
    }
    perf::log_event("document.blocks", format!("rendered={index}"));

    let mut html = Vec::new();
    format_html(root, &comrak_options, &mut html).context("Failed to format HTML")?;
    String::from_utf8(html).context("Rendered HTML is not UTF-8")
}

/// Every git-graph block of `source`, in document order.
pub fn graph_blocks(source: &str) -> Vec<GraphBlock> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);
    root.descendants()
        .filter_map(graph_fence)
        .enumerate()
        .map(|(index, (overrides, literal))| GraphBlock {
            index,
            overrides,
            literal,
        })
        .collect()
}

fn graph_fence<'a>(node: &'a AstNode<'a>) -> Option<(OptionOverrides, String)> {
    match &node.data.borrow().value {
        NodeValue::CodeBlock(block) if block.fenced => {
            info_overrides(&block.info).map(|overrides| (overrides, block.literal.clone()))
        }
        _ => None,
    }
}

fn create_options() -> Options {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options
}
