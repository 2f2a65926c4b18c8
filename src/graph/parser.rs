//! Branch/commit parsing.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use super::lines::{fields, logical_lines};
use super::types::{Branch, Commit, GitGraph};
use crate::options::ResolvedOptions;

/// `[name]`, where the name runs up to the first closing bracket.
static BRANCH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]*)\]").expect("valid branch regex"));

/// Year, optionally followed by a month: `2020`, `2020-01`, `2020/1`.
static PARTIAL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(?:[-/](\d{1,2}))?$").expect("valid date regex"));

// `%b`/`%a` also accept full month and weekday names, `%m`/`%d` one digit.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%a %b %d %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d %Y",
    "%b %d, %Y",
    "%a %b %d %Y",
    "%a, %b %d, %Y",
    "%d %b %Y",
    "%d %b, %Y",
];

/// Parse a block body into branches and commits.
///
/// Commit lines before any branch declaration go to an implicit branch named
/// after `options.default_branch_name`. Merge references that do not resolve
/// to a known hash are cleared once every line has been read.
pub fn parse(text: &str, options: &ResolvedOptions) -> GitGraph {
    let mut branches: Vec<Branch> = Vec::new();

    for line in logical_lines(text) {
        if let Some(name) = branch_name(&line) {
            let lane = branches.len();
            branches.push(Branch::new(name, lane, options.branch_color(lane, name)));
            continue;
        }
        let Some(commit) = parse_commit(&line) else {
            tracing::debug!(line = %line, "skipping row that is not a commit");
            continue;
        };
        if branches.is_empty() {
            let name = options.default_branch_name.as_str();
            branches.push(Branch::new(name, 0, options.branch_color(0, name)));
        }
        if let Some(branch) = branches.last_mut() {
            branch.push(commit);
        }
    }

    let mut graph = GitGraph { branches };
    graph.drop_dangling_merges();
    graph
}

/// Name of a branch declaration line, `None` for any other line.
pub fn branch_name(line: &str) -> Option<&str> {
    BRANCH_LINE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str())
}

/// Parse one commit row. `base` and `branch` are left for the owning branch
/// to fill in.
///
/// Returns `None` for rows with fewer than two fields or an empty hash.
pub fn parse_commit(row: &str) -> Option<Commit> {
    let cells = fields(row);
    if cells.len() < 2 {
        return None;
    }

    let (hash, merge) = match cells[0].split_once('<') {
        Some((hash, rest)) => {
            let target = rest.split('<').next().unwrap_or_default();
            let target = target.split('>').next().unwrap_or_default().trim();
            (hash.trim(), (!target.is_empty()).then(|| target.to_string()))
        }
        None => (cells[0].trim(), None),
    };
    if hash.is_empty() {
        return None;
    }

    Some(Commit {
        hash: hash.to_string(),
        message: cells[1].clone(),
        date: cells.get(2).and_then(|date| parse_date(date)),
        base: None,
        merge,
        branch: 0,
    })
}

/// Parse a commit date. Dates without an offset are read as UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| partial_date(text))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// First day of a bare year or year-month.
fn partial_date(text: &str) -> Option<NaiveDate> {
    let caps = PARTIAL_DATE.captures(text)?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2).map_or(Some(1), |m| m.as_str().parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, 1)
}
