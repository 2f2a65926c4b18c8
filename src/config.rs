use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::OptionsError;
use crate::options::{OptionOverrides, OutputLayout};

/// Flags that take a value, and the override key each one sets.
const VALUE_FLAGS: &[(&str, &str)] = &[
    ("--default-branch", "defaultBranchName"),
    ("--colors", "colors"),
    ("--point-space", "pointSpace"),
    ("--line-space", "lineSpace"),
    ("--point-radius", "pointRadius"),
    ("--char-width", "charWidth"),
    ("--columns", "columns"),
    ("--date-format", "dateFormat"),
];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub perf: bool,
    pub options_file: Option<PathBuf>,
    pub overrides: OptionOverrides,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            perf: self.perf || other.perf,
            options_file: other
                .options_file
                .clone()
                .or_else(|| self.options_file.clone()),
            overrides: self.overrides.union(&other.overrides),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("gitgraph-md").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("gitgraph-md")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("gitgraph-md").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("gitgraph-md")
                .join("config");
        }
    }

    PathBuf::from(".gitgraphrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".gitgraphrc")
}

/// Load saved flags. Each non-comment line holds one flag, optionally
/// followed by its value; the value may contain spaces.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| match line.split_once(char::is_whitespace) {
            Some((flag, value)) => vec![flag.to_string(), value.trim().to_string()],
            None => vec![line.to_string()],
        })
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# gitgraph-md defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.options_file {
        lines.push(format!("--options {}", path.display()));
    }
    let theme = &flags.overrides.theme;
    if theme.layout == Some(OutputLayout::Table) {
        lines.push("--table".to_string());
    }
    if theme.draw_branch_info == Some(false) {
        lines.push("--no-branch-info".to_string());
    }
    for (key, value) in flags.overrides.pairs() {
        if let Some((flag, _)) = VALUE_FLAGS.iter().find(|(_, k)| *k == key) {
            lines.push(format!("{flag} {value}"));
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Read a JSON5 options file into overrides.
pub fn load_options_file(path: &Path) -> Result<OptionOverrides> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options {}", path.display()))?;
    let overrides = json5::from_str(&content)
        .map_err(OptionsError::from)
        .with_context(|| format!("Invalid options file {}", path.display()))?;
    Ok(overrides)
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        match name {
            "--watch" | "-w" => flags.watch = true,
            "--perf" => flags.perf = true,
            "--table" => flags.overrides.theme.layout = Some(OutputLayout::Table),
            "--no-branch-info" => flags.overrides.theme.draw_branch_info = Some(false),
            "--options" => {
                if let Some(value) = inline_value.or_else(|| take_next(tokens, &mut i)) {
                    flags.options_file = Some(PathBuf::from(value));
                }
            }
            _ => {
                if let Some((_, key)) = VALUE_FLAGS.iter().find(|(flag, _)| *flag == name) {
                    if let Some(value) = inline_value.or_else(|| take_next(tokens, &mut i)) {
                        if let Err(err) = flags.overrides.set(key, value) {
                            tracing::warn!(flag = name, %err, "ignoring flag");
                        }
                    }
                }
            }
        }
        i += 1;
    }
    flags
}

fn take_next<'a>(tokens: &'a [String], i: &mut usize) -> Option<&'a str> {
    let next = tokens.get(*i + 1)?;
    *i += 1;
    Some(next.as_str())
}
