//! graphprof - network profiling from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Profile one graph into an HTML report
//! graphprof profile karate.edges -o reports/
//!
//! # Complete preset, LaTeX bundle, dark style
//! graphprof profile karate.edges -o reports/ --preset complete \
//!     --output-type LaTeX --style dark
//!
//! # Profile every *.edges file under a directory tree
//! graphprof walk graphs/ reports/ --pattern '*.edges' --recursive
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graphprof_core::{
    colors, walk, Graph, GraphFormat, OutputKind, Preset, Profile, ProfileSettings, Style,
    WalkOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphprof")]
#[command(about = "Network-measure profiling", long_about = None)]
struct Cli {
    /// Increase verbosity (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Whitespace-separated `u v [w]` lines, undirected
    EdgeList,
    /// Edge list with directed edges
    EdgeListDirected,
    /// METIS adjacency format
    Metis,
}

impl From<FormatArg> for GraphFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::EdgeList => GraphFormat::EdgeList,
            FormatArg::EdgeListDirected => GraphFormat::EdgeListDirected,
            FormatArg::Metis => GraphFormat::Metis,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Profile a single graph file and write a report
    Profile {
        /// Input graph file
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, value_enum, default_value = "edge-list")]
        format: FormatArg,

        /// Configuration preset: minimal, default, complete
        #[arg(long, default_value = "default")]
        preset: String,

        /// Report kind: HTML or LaTeX
        #[arg(long, default_value = "HTML")]
        output_type: String,

        /// Report file name (without extension)
        #[arg(long, default_value = "graph")]
        filename: String,

        /// Report style: light or dark
        #[arg(long, default_value = "light")]
        style: String,

        /// Accent color as `r,g,b` with components in [0, 1]
        #[arg(long)]
        color: Option<String>,

        /// Number of post-processing workers
        #[arg(long)]
        parallelism: Option<usize>,

        /// Render plots in parallel (experimental)
        #[arg(long)]
        parallel: bool,

        /// Also render scatter plots for correlation pairs
        #[arg(long)]
        scatter: bool,
    },

    /// Profile every matching graph file under a directory
    Walk {
        /// Directory to search
        input_dir: PathBuf,

        /// Directory for generated reports
        output_dir: PathBuf,

        /// Input format
        #[arg(long, value_enum, default_value = "edge-list")]
        format: FormatArg,

        /// Accepted file names, e.g. `*.edges`
        #[arg(long, default_value = "*")]
        pattern: String,

        /// Configuration preset: minimal, default, complete
        #[arg(long, default_value = "default")]
        preset: String,

        /// Report kind: HTML or LaTeX
        #[arg(long, default_value = "HTML")]
        output_type: String,

        /// Report style: light or dark
        #[arg(long, default_value = "light")]
        style: String,

        /// Also search subdirectories
        #[arg(long)]
        recursive: bool,

        /// Render plots in parallel (experimental)
        #[arg(long)]
        parallel: bool,
    },
}

fn init_logging(verbosity: u8, log_file: Option<&PathBuf>) -> Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn parse_color(spec: Option<&str>) -> Result<(f64, f64, f64)> {
    let Some(spec) = spec else {
        return Ok(colors::GREEN);
    };
    let parts: Vec<f64> = spec
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid color: {spec}"))?;
    if parts.len() != 3 || parts.iter().any(|c| !(0.0..=1.0).contains(c)) {
        bail!("invalid color: {spec} (expected r,g,b in [0, 1])");
    }
    Ok((parts[0], parts[1], parts[2]))
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("template"));
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_ref())?;

    match cli.command {
        Commands::Profile {
            input,
            output,
            format,
            preset,
            output_type,
            filename,
            style,
            color,
            parallelism,
            parallel,
            scatter,
        } => {
            let preset: Preset = preset.parse()?;
            let kind: OutputKind = output_type.parse()?;
            let style: Style = style.parse()?;
            let color = parse_color(color.as_deref())?;

            let mut settings = ProfileSettings::new().with_scatter_plots(scatter);
            if let Some(parallelism) = parallelism {
                settings = settings.with_parallelism(parallelism)?;
            }

            let graph = Graph::read(&input, format.into())
                .with_context(|| format!("reading {}", input.display()))?;
            println!(
                "Loaded {}: {} nodes, {} edges",
                input.display(),
                graph.node_count(),
                graph.edge_count()
            );

            let bar = spinner("profiling...");
            let config = graphprof_core::Config::from_preset(preset);
            let mut profile = Profile::create_with(graph, config, settings)?;
            bar.set_message("rendering report...");
            profile.output(kind, &output, &filename, style, color, parallel)?;
            bar.finish_and_clear();

            let written = match kind {
                OutputKind::Html => output.join(format!("{filename}.html")),
                OutputKind::Latex => output.join(&filename).join(format!("{filename}.tex")),
            };
            println!("Report written to {}", written.display());
            println!("Measures: {}", profile.active_measures().len());
        }

        Commands::Walk {
            input_dir,
            output_dir,
            format,
            pattern,
            preset,
            output_type,
            style,
            recursive,
            parallel,
        } => {
            let preset: Preset = preset.parse()?;
            let kind: OutputKind = output_type.parse()?;
            let style: Style = style.parse()?;

            let options = WalkOptions {
                pattern,
                config: None,
                preset,
                output: kind,
                style,
                color: colors::GREEN,
                recursive,
                parallel,
            };
            walk(&input_dir, &output_dir, format.into(), &options)?;
            println!("Done");
        }
    }
    Ok(())
}
