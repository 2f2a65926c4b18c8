//! Geometry: turning an ordered graph into drawable primitives.
//!
//! Branch lanes run left to right in declaration order. Rows run top to
//! bottom from the newest commit to the oldest; the oldest row sits one
//! `point_space` above the bottom anchor that origin commits grow from.

mod drawable;

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

pub use drawable::{
    Coord, Diagram, Divider, Drawable, ErrorMarker, Label, LegendEntry, Line, MergeLine, Point,
    Row,
};

use crate::error::LayoutError;
use crate::graph::{Commit, CommitId, GitGraph, linearize};
use crate::options::{Column, OutputLayout, ResolvedOptions};

const DIVIDER_COLOR: &str = "#dadce0";
const LABEL_SEPARATOR: &str = "  ";
const ERROR_WIDTH: f64 = 300.0;
const ERROR_HEIGHT: f64 = 100.0;
/// Messages that fit inside the error graphic.
pub const ERROR_LINES: usize = 3;

/// Lay out every commit of `graph`.
///
/// # Errors
///
/// Returns every duplicate hash, duplicate branch name and unresolvable
/// base or merge edge found. Any error withholds the whole diagram.
pub fn layout(graph: &GitGraph, options: &ResolvedOptions) -> Result<Diagram, Vec<LayoutError>> {
    let theme = &options.theme;
    let table = graph.table();
    let linear = linearize(graph, &table);
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for branch in &graph.branches {
        if !names.insert(branch.name.as_str()) {
            errors.push(LayoutError::DuplicateBranch(branch.name.clone()));
        }
    }

    let padding = Coord::new(theme.line_space / 2.0, theme.point_space / 2.0);
    let row_count = linear.len();
    let graph_height = (row_count + 1) as f64 * theme.point_space;
    let anchor_y = graph_height - theme.point_space;
    let lanes = graph.branches.len();

    // Only the commit the table resolves a hash to gets a point.
    let mut points: HashMap<CommitId, Point> = HashMap::with_capacity(row_count);
    let mut placed: Vec<(usize, CommitId)> = Vec::with_capacity(row_count);
    for (i, &id) in linear.order.iter().enumerate() {
        let commit = graph.commit(id);
        if table.get(&commit.hash) != Some(id) {
            errors.push(LayoutError::DuplicateCommit(commit.hash.clone()));
            continue;
        }
        let branch = &graph.branches[id.branch];
        let row = row_count - 1 - i;
        let at = Coord::new(
            branch.lane as f64 * theme.line_space + padding.x,
            row as f64 * theme.point_space + padding.y,
        );
        points.insert(
            id,
            Point {
                hash: commit.hash.clone(),
                at,
                color: branch.color.clone(),
            },
        );
        placed.push((row, id));
    }
    placed.sort_by_key(|(row, _)| *row);
    let resolve = |hash: &str| table.get(hash).and_then(|id| points.get(&id));

    let mut merge_lines = Vec::new();
    let mut lines = Vec::new();
    for &(_, id) in &placed {
        let commit = graph.commit(id);
        let point = &points[&id];
        if commit.base.is_none() && commit.merge.is_none() {
            lines.push(Drawable::Line(Line {
                from: Coord::new(point.at.x, anchor_y),
                to: point.at,
                color: point.color.clone(),
            }));
            continue;
        }
        if let Some(base) = &commit.base {
            match resolve(base) {
                Some(from) => lines.push(Drawable::Line(Line {
                    from: from.at,
                    to: point.at,
                    color: point.color.clone(),
                })),
                None => errors.push(LayoutError::BaseNotFound {
                    hash: commit.hash.clone(),
                    base: base.clone(),
                }),
            }
        }
        if let Some(merge) = &commit.merge {
            match resolve(merge) {
                Some(from) => merge_lines.push(Drawable::MergeLine(MergeLine {
                    from: from.at,
                    to: point.at,
                    color: if commit.base.is_some() {
                        from.color.clone()
                    } else {
                        point.color.clone()
                    },
                })),
                None => errors.push(LayoutError::MergeNotFound {
                    hash: commit.hash.clone(),
                    merge: merge.clone(),
                }),
            }
        }
    }

    if !errors.is_empty() {
        tracing::warn!(count = errors.len(), "git graph withheld: {}", errors[0]);
        return Err(errors);
    }

    let mut width = lanes as f64 * theme.line_space;
    let mut labels = Vec::new();
    if theme.layout == OutputLayout::Svg && !theme.columns.is_empty() {
        let label_x = width + padding.x;
        let mut widest: f64 = 0.0;
        for &(_, id) in &placed {
            let commit = graph.commit(id);
            let point = &points[&id];
            let text = label_text(commit, &theme.columns, &theme.date_format);
            widest = widest.max(text.width() as f64 * theme.char_width);
            labels.push(Drawable::Label(Label {
                at: Coord::new(label_x, point.at.y),
                text,
                color: point.color.clone(),
            }));
        }
        if !labels.is_empty() {
            width = width.max(label_x + widest + theme.line_space);
        }
    }

    let mut height = graph_height;
    let mut legend = Vec::new();
    if theme.draw_branch_info && lanes > 0 {
        let text_x = padding.x + theme.line_space;
        for (i, branch) in graph.branches.iter().enumerate() {
            let name_width = branch.name.width() as f64 * theme.char_width;
            width = width.max(text_x + name_width + theme.line_space);
            legend.push(Drawable::LegendEntry(LegendEntry {
                at: Coord::new(padding.x, graph_height + i as f64 * theme.point_space),
                name: branch.name.clone(),
                color: branch.color.clone(),
            }));
        }
        legend.insert(
            0,
            Drawable::Divider(Divider {
                y: graph_height - theme.point_space * 0.8,
                width,
                color: DIVIDER_COLOR.to_string(),
            }),
        );
        height += lanes as f64 * theme.point_space;
    }

    let rows = placed
        .iter()
        .map(|&(_, id)| {
            let commit = graph.commit(id);
            Row {
                hash: commit.hash.clone(),
                message: commit.message.clone(),
                date: commit.date,
                color: points[&id].color.clone(),
            }
        })
        .collect();

    let mut drawables = merge_lines;
    drawables.extend(lines);
    drawables.extend(
        placed
            .iter()
            .filter_map(|(_, id)| points.remove(id))
            .map(Drawable::Point),
    );
    drawables.extend(labels);
    drawables.extend(legend);

    Ok(Diagram {
        width,
        height,
        drawables,
        rows,
        dropped: linear.dropped,
    })
}

/// The fixed-size replacement for a withheld diagram.
///
/// At most [`ERROR_LINES`] messages are shown; past that the last line
/// counts the rest.
pub fn error_diagram(errors: &[LayoutError], options: &ResolvedOptions) -> Diagram {
    let theme = &options.theme;
    let mut messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    if messages.len() > ERROR_LINES {
        let hidden = messages.len() - (ERROR_LINES - 1);
        messages.truncate(ERROR_LINES - 1);
        messages.push(format!("and {hidden} more errors"));
    }
    let step = theme
        .point_space
        .min(ERROR_HEIGHT / (messages.len() + 1) as f64);
    let drawables = messages
        .into_iter()
        .enumerate()
        .map(|(i, message)| {
            Drawable::ErrorMarker(ErrorMarker {
                at: Coord::new(theme.line_space, (i + 1) as f64 * step),
                message,
            })
        })
        .collect();
    Diagram {
        width: ERROR_WIDTH,
        height: ERROR_HEIGHT,
        drawables,
        rows: Vec::new(),
        dropped: 0,
    }
}

fn label_text(commit: &Commit, columns: &[Column], date_format: &str) -> String {
    columns
        .iter()
        .map(|column| match column {
            Column::Hash => commit.hash.clone(),
            Column::Message => commit.message.clone(),
            Column::Date => commit
                .date
                .map(|date| format_date(&date, date_format))
                .unwrap_or_default(),
        })
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}

/// Format a commit date with a `strftime` pattern, falling back to RFC 3339
/// when the pattern is invalid.
pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    let items = StrftimeItems::new(format);
    if items.clone().any(|item| matches!(item, Item::Error)) {
        return date.to_rfc3339();
    }
    let mut out = String::new();
    if write!(out, "{}", date.format_with_items(items)).is_err() {
        return date.to_rfc3339();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse;
    use crate::options::parse_theme;

    fn options() -> ResolvedOptions {
        ResolvedOptions::default()
    }

    fn diagram(text: &str) -> Diagram {
        let options = options();
        layout(&parse(text, &options), &options).unwrap()
    }

    fn errors(text: &str) -> Vec<LayoutError> {
        let options = options();
        layout(&parse(text, &options), &options).unwrap_err()
    }

    #[test]
    fn test_single_branch_shares_one_lane() {
        let d = diagram("[main]\na first\nb second\nc third");
        let a = d.point("a").unwrap();
        let b = d.point("b").unwrap();
        let c = d.point("c").unwrap();
        assert_eq!(a.at.x, 10.0);
        assert_eq!(b.at.x, a.at.x);
        assert_eq!(c.at.x, a.at.x);
        assert_eq!(a.at.y - b.at.y, 25.0);
        assert_eq!(b.at.y - c.at.y, 25.0);
        // newest on top
        assert_eq!(c.at.y, 12.5);
    }

    #[test]
    fn test_lanes_follow_declaration_order() {
        let d = diagram("[main]\n1 a\n[dev]\n2 b\n[ops]\n3 c");
        let xs: Vec<_> = ["1", "2", "3"]
            .iter()
            .map(|h| d.point(h).unwrap().at.x)
            .collect();
        assert_eq!(xs, vec![10.0, 30.0, 50.0]);
    }

    #[test]
    fn test_origin_commit_grows_from_bottom_anchor() {
        let d = diagram("[main]\na first\nb second");
        let lines: Vec<_> = d.lines().collect();
        assert_eq!(lines.len(), 2);
        // anchor sits at rows × point_space
        let anchor = lines.iter().find(|l| l.to == d.point("a").unwrap().at).unwrap();
        assert_eq!(anchor.from, Coord::new(10.0, 50.0));
        let chain = lines.iter().find(|l| l.to == d.point("b").unwrap().at).unwrap();
        assert_eq!(chain.from, d.point("a").unwrap().at);
    }

    #[test]
    fn test_merge_draws_curve_between_points() {
        let d = diagram("[main]\na first\n[dev]\nb<a 'merge'");
        let merges: Vec<_> = d.merge_lines().collect();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].from, d.point("a").unwrap().at);
        assert_eq!(merges[0].to, d.point("b").unwrap().at);
        // b has no base, so the curve takes b's colour and no anchor line is drawn for b
        assert_eq!(merges[0].color, d.point("b").unwrap().color);
        assert_eq!(d.lines().count(), 1);
    }

    #[test]
    fn test_merge_with_base_takes_source_colour() {
        let d = diagram("[main]\na first\n[dev]\nb second\nc<a merge");
        let merge = d.merge_lines().next().unwrap();
        assert_eq!(merge.color, d.point("a").unwrap().color);
    }

    #[test]
    fn test_undefined_merge_source_draws_no_curve() {
        let d = diagram("[main]\nb<a 'merge'");
        assert_eq!(d.merge_lines().count(), 0);
        assert_eq!(d.lines().count(), 1);
    }

    #[test]
    fn test_duplicate_hash_withholds_diagram() {
        let errs = errors("[main]\n1 a\n[dev]\n1 b");
        assert!(errs.contains(&LayoutError::DuplicateCommit("1".to_string())));
    }

    #[test]
    fn test_duplicate_reported_for_copy_the_table_does_not_resolve() {
        // the dev copy is emitted first but main declares x first
        let errs = errors("[main]\nx a 2020-01-05\n[dev]\nx b 2020-01-01");
        assert_eq!(errs, vec![LayoutError::DuplicateCommit("x".to_string())]);
    }

    #[test]
    fn test_edges_resolve_through_commit_table() {
        let d = diagram("[main]\na first\nb second\n[dev]\nc<b merge");
        let chain = d.lines().find(|l| l.to == d.point("b").unwrap().at).unwrap();
        assert_eq!(chain.from, d.point("a").unwrap().at);
        let merge = d.merge_lines().next().unwrap();
        assert_eq!(merge.from, d.point("b").unwrap().at);
        assert_eq!(merge.to, d.point("c").unwrap().at);
    }

    #[test]
    fn test_duplicate_branch_withholds_diagram() {
        let errs = errors("[main]\n1 a\n[main]\n2 b");
        assert_eq!(errs, vec![LayoutError::DuplicateBranch("main".to_string())]);
    }

    #[test]
    fn test_unresolved_base_is_reported() {
        use crate::graph::{Branch, Commit};

        let mut main = Branch::new("main", 0, "#e6194b");
        main.commits.push(Commit {
            hash: "b".to_string(),
            message: "orphan".to_string(),
            date: None,
            base: Some("ghost".to_string()),
            merge: None,
            branch: 0,
        });
        let graph = GitGraph {
            branches: vec![main],
        };
        let errs = layout(&graph, &options()).unwrap_err();
        assert_eq!(errs, vec![LayoutError::BaseNotFound {
            hash: "b".to_string(),
            base: "ghost".to_string(),
        }]);
    }

    #[test]
    fn test_cycle_without_dependents_renders_remaining_commits() {
        let options = options();
        let graph = parse("[main]\n1 a\n[dev]\n2<3 b\n[ops]\n3<2 c", &options);
        let d = layout(&graph, &options).unwrap();
        assert_eq!(d.dropped, 2);
        assert_eq!(d.points().count(), 1);
    }

    #[test]
    fn test_dimensions_with_labels_and_legend() {
        let d = diagram("[main]\nabc test\nbbc test2\n[feature]\nccc test3");
        // 3 rows → graph height 100, plus two legend rows
        assert_eq!(d.height, 150.0);
        // label x = 2 lanes × 20 + 10; widest label "bbc  test2" is 10 chars × 7
        assert_eq!(d.width, 50.0 + 70.0 + 20.0);
    }

    #[test]
    fn test_dimensions_without_extras() {
        let options = options().merge(&parse_theme("drawBranchInfo=false layout=table"));
        let graph = parse("[main]\n1 a\n2 b\n[dev]\n3 c", &options);
        let d = layout(&graph, &options).unwrap();
        assert_eq!(d.width, 40.0);
        assert_eq!(d.height, 100.0);
        assert!(!d.drawables.iter().any(|x| matches!(x, Drawable::Label(_))));
    }

    #[test]
    fn test_paint_order() {
        let d = diagram("[main]\na first\n[dev]\nb<a merge");
        let kinds: Vec<_> = d
            .drawables
            .iter()
            .map(|x| match x {
                Drawable::Point(_) => "point",
                Drawable::Line(_) => "line",
                Drawable::MergeLine(_) => "merge",
                Drawable::Label(_) => "label",
                Drawable::Divider(_) => "divider",
                Drawable::LegendEntry(_) => "legend",
                Drawable::ErrorMarker(_) => "error",
            })
            .collect();
        assert_eq!(kinds, vec![
            "merge", "line", "point", "point", "label", "label", "divider", "legend", "legend"
        ]);
    }

    #[test]
    fn test_rows_are_newest_first() {
        let d = diagram("1 a\n2 b\n3 c");
        let hashes: Vec<_> = d.rows.iter().map(|r| r.hash.as_str()).collect();
        assert_eq!(hashes, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_date_column_in_labels() {
        let options = options().merge(&parse_theme("columns=hash,date dateFormat=%Y/%m/%d"));
        let graph = parse("1 a 2020-01-02", &options);
        let d = layout(&graph, &options).unwrap();
        let label = d
            .drawables
            .iter()
            .find_map(|x| match x {
                Drawable::Label(label) => Some(label.text.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(label, "1  2020/01/02");
    }

    #[test]
    fn test_format_date_falls_back_on_bad_pattern() {
        let date = crate::graph::parse_date("2020-01-02").unwrap();
        assert_eq!(format_date(&date, "%Y"), "2020");
        assert_eq!(format_date(&date, "%Q"), date.to_rfc3339());
    }

    #[test]
    fn test_error_diagram_keeps_markers_on_canvas() {
        let errs: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|h| LayoutError::DuplicateCommit((*h).to_string()))
            .collect();
        let d = error_diagram(&errs, &options());
        let markers: Vec<_> = d
            .drawables
            .iter()
            .filter_map(|x| match x {
                Drawable::ErrorMarker(marker) => Some(marker),
                _ => None,
            })
            .collect();
        assert_eq!(markers.len(), ERROR_LINES);
        assert_eq!(markers[0].message, "commit a is not unique");
        assert_eq!(markers[2].message, "and 3 more errors");
        let ys: Vec<_> = markers.iter().map(|m| m.at.y).collect();
        assert_eq!(ys, vec![25.0, 50.0, 75.0]);
        assert!(ys.iter().all(|y| *y > 0.0 && *y < d.height));
    }

    #[test]
    fn test_error_diagram_squeezes_wide_point_space() {
        let options = options().merge(&parse_theme("pointSpace=60"));
        let errs = vec![
            LayoutError::DuplicateCommit("a".to_string()),
            LayoutError::DuplicateBranch("main".to_string()),
        ];
        let d = error_diagram(&errs, &options);
        let ys: Vec<_> = d
            .drawables
            .iter()
            .filter_map(|x| match x {
                Drawable::ErrorMarker(marker) => Some(marker.at.y),
                _ => None,
            })
            .collect();
        assert!(ys.iter().all(|y| *y < d.height), "{ys:?}");
    }

    #[test]
    fn test_error_diagram_is_fixed_size() {
        let errs = vec![LayoutError::DuplicateCommit("x".to_string())];
        let d = error_diagram(&errs, &options());
        assert_eq!((d.width, d.height), (300.0, 100.0));
        assert_eq!(d.drawables.len(), 1);
    }
}
