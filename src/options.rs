//! Diagram options and theme.
//!
//! [`ResolvedOptions`] is the fully defaulted value every render consumes.
//! Partial [`OptionOverrides`] come from an options file, saved flags, the
//! command line and the fence info string, and are folded in with
//! [`ResolvedOptions::merge`], which always returns a new value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Fence tag that marks a git-graph block.
pub const GIT_GRAPH_TAG: &str = "git-graph";

const DEFAULT_COLORS: &[&str] = &[
    "#e6194b", "#ffe119", "#4363d8", "#3cb44b", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#fabebe", "#008080", "#e6beff",
];

/// Per-commit fields that can be shown next to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Hash,
    Message,
    Date,
}

impl FromStr for Column {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hash" => Ok(Self::Hash),
            "message" => Ok(Self::Message),
            "date" => Ok(Self::Date),
            other => Err(OptionsError::InvalidValue {
                key: "columns".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hash => "hash",
            Self::Message => "message",
            Self::Date => "date",
        })
    }
}

/// Output shape of one diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// Standalone SVG with commit labels beside the points
    #[default]
    Svg,
    /// HTML table with the SVG in the first column and one row per commit
    Table,
}

impl FromStr for OutputLayout {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "svg" => Ok(Self::Svg),
            "table" => Ok(Self::Table),
            other => Err(OptionsError::InvalidValue {
                key: "layout".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Svg => "svg",
            Self::Table => "table",
        })
    }
}

/// Geometry and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    /// Vertical distance between two commit rows
    pub point_space: f64,
    /// Horizontal distance between two branch lanes
    pub line_space: f64,
    pub point_radius: f64,
    /// Estimated width of one label character
    pub char_width: f64,
    pub columns: Vec<Column>,
    /// `strftime` pattern for the date column
    pub date_format: String,
    /// Draw the branch legend under the graph
    pub draw_branch_info: bool,
    pub layout: OutputLayout,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            point_space: 25.0,
            line_space: 20.0,
            point_radius: 5.0,
            char_width: 7.0,
            columns: vec![Column::Hash, Column::Message],
            date_format: "%Y-%m-%d %H:%M".to_string(),
            draw_branch_info: true,
            layout: OutputLayout::Svg,
        }
    }
}

/// Fully resolved options. Every field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOptions {
    pub default_branch_name: String,
    pub colors: Vec<String>,
    pub theme: Theme,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            default_branch_name: "main".to_string(),
            colors: DEFAULT_COLORS.iter().map(ToString::to_string).collect(),
            theme: Theme::default(),
        }
    }
}

impl ResolvedOptions {
    /// Return a copy with every present override applied.
    pub fn merge(&self, overrides: &OptionOverrides) -> Self {
        let theme = &overrides.theme;
        let base = &self.theme;
        Self {
            default_branch_name: overrides
                .default_branch_name
                .clone()
                .unwrap_or_else(|| self.default_branch_name.clone()),
            colors: overrides.colors.clone().unwrap_or_else(|| self.colors.clone()),
            theme: Theme {
                point_space: positive(theme.point_space).unwrap_or(base.point_space),
                line_space: positive(theme.line_space).unwrap_or(base.line_space),
                point_radius: positive(theme.point_radius).unwrap_or(base.point_radius),
                char_width: positive(theme.char_width).unwrap_or(base.char_width),
                columns: theme.columns.clone().unwrap_or_else(|| base.columns.clone()),
                date_format: theme
                    .date_format
                    .clone()
                    .unwrap_or_else(|| base.date_format.clone()),
                draw_branch_info: theme.draw_branch_info.unwrap_or(base.draw_branch_info),
                layout: theme.layout.unwrap_or(base.layout),
            },
        }
    }

    /// Colour for the branch in `lane`: the palette entry while it lasts,
    /// then a stable colour derived from the branch name.
    pub fn branch_color(&self, lane: usize, name: &str) -> String {
        self.colors
            .get(lane)
            .cloned()
            .unwrap_or_else(|| generated_color(lane, name))
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

// FNV-1a over name and lane, folded to 24 bits
fn generated_color(lane: usize, name: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes().chain(lane.to_le_bytes()) {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("#{:06x}", hash & 0x00ff_ffff)
}

/// Partial theme; `None` keeps the value underneath.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeOverrides {
    pub point_space: Option<f64>,
    pub line_space: Option<f64>,
    pub point_radius: Option<f64>,
    pub char_width: Option<f64>,
    pub columns: Option<Vec<Column>>,
    pub date_format: Option<String>,
    pub draw_branch_info: Option<bool>,
    pub layout: Option<OutputLayout>,
}

/// Partial options, as read from an options file or flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionOverrides {
    pub default_branch_name: Option<String>,
    pub colors: Option<Vec<String>>,
    pub theme: ThemeOverrides,
}

/// Keys accepted by [`OptionOverrides::set`].
pub const OVERRIDE_KEYS: &[&str] = &[
    "defaultBranchName",
    "colors",
    "pointSpace",
    "lineSpace",
    "pointRadius",
    "charWidth",
    "columns",
    "dateFormat",
    "drawBranchInfo",
    "layout",
];

impl OptionOverrides {
    /// Layer `other` on top of `self`; fields present in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        let (mine, theirs) = (&self.theme, &other.theme);
        Self {
            default_branch_name: other
                .default_branch_name
                .clone()
                .or_else(|| self.default_branch_name.clone()),
            colors: other.colors.clone().or_else(|| self.colors.clone()),
            theme: ThemeOverrides {
                point_space: theirs.point_space.or(mine.point_space),
                line_space: theirs.line_space.or(mine.line_space),
                point_radius: theirs.point_radius.or(mine.point_radius),
                char_width: theirs.char_width.or(mine.char_width),
                columns: theirs.columns.clone().or_else(|| mine.columns.clone()),
                date_format: theirs
                    .date_format
                    .clone()
                    .or_else(|| mine.date_format.clone()),
                draw_branch_info: theirs.draw_branch_info.or(mine.draw_branch_info),
                layout: theirs.layout.or(mine.layout),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set one field from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, empty values and values that do
    /// not parse for the key's type. `self` is left untouched in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), OptionsError> {
        let value = value.trim();
        let invalid = || OptionsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        if value.is_empty() {
            return Err(invalid());
        }
        let number = || {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(invalid)
        };
        let theme = &mut self.theme;
        match key {
            "defaultBranchName" => self.default_branch_name = Some(value.to_string()),
            "colors" => self.colors = Some(split_list(value)),
            "pointSpace" => theme.point_space = Some(number()?),
            "lineSpace" => theme.line_space = Some(number()?),
            "pointRadius" => theme.point_radius = Some(number()?),
            "charWidth" => theme.char_width = Some(number()?),
            "columns" => {
                let columns = split_list(value)
                    .iter()
                    .map(|c| c.parse())
                    .collect::<Result<Vec<Column>, _>>()?;
                theme.columns = Some(columns);
            }
            "dateFormat" => theme.date_format = Some(value.to_string()),
            "drawBranchInfo" => {
                theme.draw_branch_info = Some(value.parse::<bool>().map_err(|_| invalid())?);
            }
            "layout" => theme.layout = Some(value.parse()?),
            _ => return Err(OptionsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Every present field as a `(key, value)` pair, in [`OVERRIDE_KEYS`]
    /// order. Feeding the pairs back through [`Self::set`] rebuilds `self`.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let theme = &self.theme;
        let join = |items: Vec<String>| items.join(",");
        let mut pairs = Vec::new();
        if let Some(name) = &self.default_branch_name {
            pairs.push(("defaultBranchName", name.clone()));
        }
        if let Some(colors) = &self.colors {
            pairs.push(("colors", colors.join(",")));
        }
        let numbers = [
            ("pointSpace", theme.point_space),
            ("lineSpace", theme.line_space),
            ("pointRadius", theme.point_radius),
            ("charWidth", theme.char_width),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(columns) = &theme.columns {
            pairs.push(("columns", join(columns.iter().map(ToString::to_string).collect())));
        }
        if let Some(format) = &theme.date_format {
            pairs.push(("dateFormat", format.clone()));
        }
        if let Some(draw) = theme.draw_branch_info {
            pairs.push(("drawBranchInfo", draw.to_string()));
        }
        if let Some(layout) = theme.layout {
            pairs.push(("layout", layout.to_string()));
        }
        pairs
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse `key=value` overrides separated by whitespace or `;`.
///
/// Malformed pairs, unknown keys and values of the wrong type are skipped.
pub fn parse_theme(spec: &str) -> OptionOverrides {
    let mut overrides = OptionOverrides::default();
    for pair in spec.split(|c: char| c == ';' || c.is_whitespace()) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if let Err(err) = overrides.set(key.trim(), value) {
            tracing::debug!(%err, "ignoring theme override");
        }
    }
    overrides
}

/// Overrides carried by a fence info string, `None` when the fence is not a
/// git-graph block.
pub fn info_overrides(info: &str) -> Option<OptionOverrides> {
    info.trim()
        .strip_prefix(GIT_GRAPH_TAG)
        .filter(|rest| rest.is_empty() || rest.starts_with(|c: char| c == ';' || c.is_whitespace()))
        .map(parse_theme)
}
