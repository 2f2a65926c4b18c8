//! Drawable primitives produced by the layout engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A commit dot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub hash: String,
    pub at: Coord,
    pub color: String,
}

/// Straight connector between two points, or from the bottom anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub from: Coord,
    pub to: Coord,
    pub color: String,
}

/// Curved connector from a merge source to the merging commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeLine {
    pub from: Coord,
    pub to: Coord,
    pub color: String,
}

/// Commit text beside its row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub at: Coord,
    pub text: String,
    pub color: String,
}

/// Horizontal rule between the graph and the branch legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divider {
    pub y: f64,
    pub width: f64,
    pub color: String,
}

/// One legend row: a dot in the branch colour and its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub at: Coord,
    pub name: String,
    pub color: String,
}

/// A line of the error graphic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMarker {
    pub at: Coord,
    pub message: String,
}

/// Closed set of everything a diagram can contain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drawable {
    Point(Point),
    Line(Line),
    MergeLine(MergeLine),
    Label(Label),
    Divider(Divider),
    LegendEntry(LegendEntry),
    ErrorMarker(ErrorMarker),
}

/// Table row data for one placed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub hash: String,
    pub message: String,
    pub date: Option<DateTime<Utc>>,
    pub color: String,
}

/// A laid-out diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub width: f64,
    pub height: f64,
    /// In paint order: merge curves, lines, points, labels, divider, legend
    pub drawables: Vec<Drawable>,
    /// Placed commits, newest first
    pub rows: Vec<Row>,
    /// Commits left out by the linearizer
    pub dropped: usize,
}

impl Diagram {
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.drawables.iter().filter_map(|d| match d {
            Drawable::Point(point) => Some(point),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.drawables.iter().filter_map(|d| match d {
            Drawable::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn merge_lines(&self) -> impl Iterator<Item = &MergeLine> {
        self.drawables.iter().filter_map(|d| match d {
            Drawable::MergeLine(line) => Some(line),
            _ => None,
        })
    }

    pub fn point(&self, hash: &str) -> Option<&Point> {
        self.points().find(|p| p.hash == hash)
    }
}
