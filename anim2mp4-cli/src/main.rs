use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

const LOG_FILE: &str = "anim2mp4.log";

/// Convert animated WEBP/GIF files to MP4 videos with optional splitting and merging.
#[derive(Parser, Debug)]
#[command(
    name = "anim2mp4",
    version,
    after_help = "Example: anim2mp4 a.webp b.gif --fps 24 --percent 50 --output videos --log"
)]
struct Cli {
    /// Input files (.webp, .gif). Defaults to every such file in the current directory.
    inputs: Vec<PathBuf>,

    /// Frames per second of the output video.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Percentage of frames in the first segment (100 = no split).
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=100))]
    percent: u32,

    /// Directory for output MP4 files (default: current directory).
    #[arg(long)]
    output: Option<PathBuf>,

    /// File name of a combined video of every output; relative to --output when given.
    #[arg(long)]
    combine: Option<PathBuf>,

    /// Also write logs to `anim2mp4.log`.
    #[arg(long, default_value_t = false)]
    log: bool,

    /// Files converted in parallel.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    jobs: u32,

    /// JSON file overriding encoder settings (codec, preset, crf, ...).
    #[arg(long)]
    encoder_config: Option<PathBuf>,

    /// Log debug details.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    run(cli)
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let file_layer = if cli.log {
        let file =
            File::create(LOG_FILE).with_context(|| format!("create log file '{LOG_FILE}'"))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(level)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    tracing::info!(?cli, "starting conversion");

    let encoder = match &cli.encoder_config {
        Some(path) => anim2mp4::EncoderOpts::from_json_path(path)?,
        None => anim2mp4::EncoderOpts::default(),
    };
    let output_dir = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let opts = anim2mp4::ConvertOpts {
        fps: anim2mp4::Fps::whole(cli.fps)?,
        split_ratio: cli.percent,
        output_dir,
        encoder,
    };

    let candidates = if cli.inputs.is_empty() {
        anim2mp4::discover_inputs(Path::new("."))?
    } else {
        cli.inputs.clone()
    };
    if candidates.is_empty() {
        tracing::error!("no input files found");
        return Ok(ExitCode::FAILURE);
    }
    let inputs = existing_inputs(candidates);

    let report = anim2mp4::convert_batch(&inputs, &opts, cli.jobs as usize)?;
    let mut ok = report.failed() == 0;

    let outputs = report.outputs();
    if let Some(name) = &cli.combine
        && !outputs.is_empty()
    {
        let dest = combine_path(name, cli.output.as_deref());
        match anim2mp4::merge_videos(&outputs, &dest, opts.fps, &opts.encoder) {
            Ok(dest) => tracing::info!(dest = %dest.display(), "merged videos"),
            Err(err) => {
                tracing::error!(error = %err, "failed to merge videos");
                ok = false;
            }
        }
    }

    tracing::info!("processing complete");
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn existing_inputs(candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    candidates
        .into_iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                tracing::warn!(path = %path.display(), "file not found");
            }
            exists
        })
        .collect()
}

fn combine_path(name: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(dir) if name.is_relative() => dir.join(name),
        _ => name.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
