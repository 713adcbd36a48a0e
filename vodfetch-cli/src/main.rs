mod cli;
mod error;
mod ffmpeg;
mod progress;

use clap::Parser;
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vodfetch_engine::{DownloadPipeline, PipelineConfig};

use crate::error::{AppError, Result};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("download failed: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn run(args: cli::Args) -> Result<()> {
    if args.master_playlist.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "missing master playlist URL".to_owned(),
        ));
    }

    let config = PipelineConfig {
        workspace_root: args.work_dir.clone(),
        output_dir: args.output_dir.clone(),
        output_container: args.container.clone(),
        selection_policy: args.selection_policy(),
        ..PipelineConfig::default()
    };

    let muxer = ffmpeg::FfmpegMuxer::new(&args.ffmpeg_path);
    let progress = (!args.quiet).then(progress::track_bars);
    let pipeline = DownloadPipeline::new(config, muxer, progress)?;

    let report = pipeline.run(&args.master_playlist).await?;
    info!(
        output = %report.output_path.display(),
        bandwidth = report.selected_bandwidth,
        video_segments = report.video_segments,
        audio_segments = report.audio_segments,
        "video and audio merged successfully"
    );
    Ok(())
}
