//! opchain - build and run oiiotool/ffmpeg renders from operator pipelines

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use opchain_core::FrameRange;

mod commands;

#[derive(Parser)]
#[command(name = "opchain")]
#[command(author, version, about = "Build and run oiiotool/ffmpeg renders from operator pipelines")]
#[command(long_about = "
Turns an ordered list of operator records (colorspace, cdl, lut, look,
transform, crop, resize, mirror, matrix, text) into one oiiotool command
line and optionally runs it.

Examples:
  opchain plan sh010.json -W 1920 -H 1080 -i in.####.exr -o out.####.exr
  opchain render sh010.json --media probe.json -i in.####.exr -o out.####.exr --frames 1001-1100
  opchain render sh010.json -W 2048 -H 858 -i in.####.exr -o out.####.exr --movie sh010.mov --fps 24
  opchain matrix sh010.json -W 1920 -H 1080
  opchain -j 4 batch jobs.yaml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of parallel jobs for batch (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    jobs: usize,

    /// Render config (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled command line without running it
    #[command(visible_alias = "p")]
    Plan(PlanArgs),

    /// Assemble and run the command line
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print the composite matrix of the geometric operators
    #[command(visible_alias = "m")]
    Matrix(MatrixArgs),

    /// Render every job of a YAML job file in parallel
    Batch(BatchArgs),
}

/// Pipeline and source description shared by several commands.
#[derive(Args, Clone, Debug)]
struct SourceArgs {
    /// Pipeline file (JSON or YAML list of operator records)
    pipeline: PathBuf,

    /// Source width
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Source height
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Media info JSON from a probe (resolution, frame range, colorspace)
    #[arg(long)]
    media: Option<PathBuf>,

    /// Reformat after the chain, e.g. 1920x1080
    #[arg(long)]
    target: Option<String>,

    /// Fit for --target: stretch, letterbox, width, height
    #[arg(long, default_value = "letterbox")]
    fit: String,
}

#[derive(Args, Clone, Debug)]
struct IoArgs {
    /// Input path or sequence pattern (####, @@@@ or %04d)
    #[arg(short, long)]
    input: String,

    /// Output path or sequence pattern
    #[arg(short, long)]
    output: String,

    /// Frame range, e.g. 1001-1100
    #[arg(long)]
    frames: Option<FrameRange>,
}

#[derive(Args)]
struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    io: IoArgs,

    /// Print one argument per line instead of a single command line
    #[arg(long)]
    lines: bool,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    io: IoArgs,

    /// Encode the rendered sequence to this movie
    #[arg(long)]
    movie: Option<String>,

    /// Codec preset for --movie (ProRes422-HQ, ProRes4444-XQ, DNxHR-SQ)
    #[arg(long)]
    codec: Option<String>,

    /// Frame rate for --movie
    #[arg(long)]
    fps: Option<f64>,

    /// Audio track for --movie
    #[arg(long)]
    audio: Option<String>,
}

#[derive(Args)]
struct MatrixArgs {
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Job file (YAML)
    jobs: PathBuf,

    /// Print command lines without running them
    #[arg(short = 'n', long)]
    dry_run: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.jobs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.jobs)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args, &config),
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Matrix(args) => commands::matrix::run(args, &config),
        Commands::Batch(args) => commands::batch::run(args, &config, cli.verbose),
    };

    // a failed external tool exits with the tool's own code
    if let Err(err) = &result {
        if let Some(code) = commands::tool_exit_code(err) {
            eprintln!("Error: {err:#}");
            std::process::exit(code);
        }
    }
    result
}
