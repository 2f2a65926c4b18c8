//! Git-graph source parsing and commit ordering.
//!
//! This module handles:
//! - Splitting a fenced block body into logical lines and fields
//! - Building branches and commits from those lines
//! - Linearizing all commits into one draw order

mod lines;
mod linearize;
mod parser;
mod types;

pub use lines::{fields, logical_lines};
pub use linearize::{Linearization, linearize};
pub use parser::{branch_name, parse, parse_commit, parse_date};
pub use types::{Branch, Commit, CommitId, CommitTable, GitGraph};
