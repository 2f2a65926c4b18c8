//! gitgraph-md - render git-graph blocks in markdown as diagrams.
//!
//! # Usage
//!
//! ```bash
//! gitgraph-md README.md -o README.html
//! gitgraph-md history.gg --table
//! gitgraph-md history.gg --png history.png --png-width 1200
//! gitgraph-md --watch README.md -o README.html
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use gitgraph_md::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, load_options_file,
    local_override_path, save_config_flags,
};
use gitgraph_md::document::{graph_blocks, prepare_content, render_markdown};
use gitgraph_md::options::{OptionOverrides, OutputLayout, ResolvedOptions};
use gitgraph_md::perf;
use gitgraph_md::raster::render_to_image;
use gitgraph_md::render::describe;
use gitgraph_md::watcher::SourceWatcher;

/// Render git-graph fenced blocks in markdown as SVG diagrams
#[derive(Parser, Debug)]
#[command(name = "gitgraph-md", version, about, long_about = None)]
struct Cli {
    /// Markdown file, or a bare .gitgraph/.gg source
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write HTML here instead of stdout
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Watch the file and re-render on change
    #[arg(short, long)]
    watch: bool,

    /// Rasterize the first diagram to a PNG
    #[arg(long, value_name = "OUT")]
    png: Option<PathBuf>,

    /// Width of the PNG in pixels
    #[arg(long, value_name = "N", default_value_t = 800)]
    png_width: u32,

    /// Lay diagrams out as a table with one row per commit
    #[arg(long)]
    table: bool,

    /// Vertical distance between commits
    #[arg(long, value_name = "N")]
    point_space: Option<f64>,

    /// Horizontal distance between branch lanes
    #[arg(long, value_name = "N")]
    line_space: Option<f64>,

    /// Radius of commit points
    #[arg(long, value_name = "N")]
    point_radius: Option<f64>,

    /// Estimated label character width
    #[arg(long, value_name = "N")]
    char_width: Option<f64>,

    /// Comma-separated branch palette
    #[arg(long, value_name = "COLORS")]
    colors: Option<String>,

    /// Comma-separated table columns (hash, message, date)
    #[arg(long, value_name = "COLUMNS")]
    columns: Option<String>,

    /// strftime format for dates
    #[arg(long, value_name = "FMT")]
    date_format: Option<String>,

    /// Branch for commits before any [branch] line
    #[arg(long, value_name = "NAME")]
    default_branch: Option<String>,

    /// Hide the branch legend
    #[arg(long)]
    no_branch_info: bool,

    /// JSON5 options file
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Print parsed graphs and layouts as JSON instead of HTML
    #[arg(long)]
    json: bool,

    /// Log timings
    #[arg(long)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    /// Flags given on this command line, in the shape saved to `.gitgraphrc`.
    fn config_flags(&self) -> ConfigFlags {
        let mut overrides = OptionOverrides::default();
        if self.table {
            overrides.theme.layout = Some(OutputLayout::Table);
        }
        if self.no_branch_info {
            overrides.theme.draw_branch_info = Some(false);
        }
        let values = [
            ("defaultBranchName", self.default_branch.clone()),
            ("colors", self.colors.clone()),
            ("pointSpace", self.point_space.map(|v| v.to_string())),
            ("lineSpace", self.line_space.map(|v| v.to_string())),
            ("pointRadius", self.point_radius.map(|v| v.to_string())),
            ("charWidth", self.char_width.map(|v| v.to_string())),
            ("columns", self.columns.clone()),
            ("dateFormat", self.date_format.clone()),
        ];
        for (key, value) in values
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
        {
            if let Err(err) = overrides.set(key, &value) {
                tracing::warn!(%err, "ignoring flag");
            }
        }
        ConfigFlags {
            watch: self.watch,
            perf: self.perf,
            options_file: self.options.clone(),
            overrides,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging; perf timings only fire once `--perf` enables them
    let perf_directive = "gitgraph_md::perf=info"
        .parse()
        .context("Invalid perf log directive")?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into())
                .add_directive(perf_directive),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.config_flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    perf::set_enabled(effective.perf);

    let options = resolve_options(&effective)?;

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    run_once(&cli, &options)?;
    if !effective.watch {
        return Ok(());
    }

    let mut watcher =
        SourceWatcher::new(&cli.file, Duration::from_millis(200)).context("Failed to watch file")?;
    eprintln!("Watching {}", watcher.source_path().display());
    loop {
        watcher.wait_for_change();
        if let Err(err) = run_once(&cli, &options) {
            tracing::error!("{err:#}");
        }
    }
}

/// Defaults, then the options file, then saved and command-line flags.
fn resolve_options(flags: &ConfigFlags) -> Result<ResolvedOptions> {
    let mut options = ResolvedOptions::default();
    if let Some(path) = &flags.options_file {
        options = options.merge(&load_options_file(path)?);
    }
    Ok(options.merge(&flags.overrides))
}

fn run_once(cli: &Cli, options: &ResolvedOptions) -> Result<()> {
    let _scope = perf::scope("cli.run");
    let content = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let source = prepare_content(&cli.file, content);

    if let Some(png) = &cli.png {
        write_png(&source, options, png, cli.png_width)?;
    }

    let text = if cli.json {
        let reports = graph_blocks(&source)
            .iter()
            .map(|block| describe(&block.literal, &options.merge(&block.overrides)))
            .collect::<Vec<_>>();
        let mut json = serde_json::to_string_pretty(&reports)?;
        json.push('\n');
        json
    } else {
        render_markdown(&source, options)?
    };

    match &cli.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn write_png(source: &str, options: &ResolvedOptions, path: &Path, width: u32) -> Result<()> {
    let block = graph_blocks(source)
        .into_iter()
        .next()
        .context("No git-graph block to rasterize")?;
    let image = render_to_image(&block.literal, &options.merge(&block.overrides), width)?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
