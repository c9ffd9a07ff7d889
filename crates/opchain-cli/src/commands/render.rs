//! Render command: assemble, run, and optionally encode a movie

use anyhow::{Context, Result};
use tracing::{debug, info, trace};

use opchain_render::{Codec, ExecutionResult, RenderConfig, Renderer, VideoEncoder, VideoSpec};

use super::Job;
use crate::RenderArgs;

pub fn run(args: RenderArgs, config: &RenderConfig) -> Result<()> {
    trace!(pipeline = %args.source.pipeline.display(), "render::run");

    let job = Job::from_args(&args.source)?;
    let renderer = Renderer::new(config.clone());
    let io = job.io(&args.io.input, &args.io.output, args.io.frames);
    let flags = job.plan(&renderer, &io)?;

    let result = renderer
        .execute(&flags)
        .with_context(|| format!("Render failed: {}", args.io.output))?;
    report(&result);
    println!("Rendered {}", args.io.output);

    let Some(movie) = args.movie else {
        return Ok(());
    };

    let mut video = config.video.clone();
    if let Some(name) = &args.codec {
        video.codec = Some(name.parse::<Codec>()?);
    }
    let mut spec = VideoSpec::new(args.io.output.as_str(), movie.as_str());
    spec.frames = io.frames;
    spec.fps = args.fps;
    spec.audio = args.audio;
    let spec = spec.with_media(&job.media);

    info!(movie = %movie, codec = ?video.codec, "encoding");
    let result = VideoEncoder::new(video)
        .encode(&spec)
        .with_context(|| format!("Encode failed: {movie}"))?;
    report(&result);
    println!("Encoded {movie}");
    Ok(())
}

fn report(result: &ExecutionResult) {
    if !result.stdout.trim().is_empty() {
        debug!(stdout = %result.stdout.trim(), "tool output");
    }
    if !result.stderr.trim().is_empty() {
        debug!(stderr = %result.stderr.trim(), "tool diagnostics");
    }
}
