//! Plan command: print the assembled command line

use anyhow::Result;
use tracing::trace;

use opchain_render::{RenderConfig, Renderer};

use super::Job;
use crate::PlanArgs;

pub fn run(args: PlanArgs, config: &RenderConfig) -> Result<()> {
    trace!(pipeline = %args.source.pipeline.display(), "plan::run");

    let job = Job::from_args(&args.source)?;
    let renderer = Renderer::new(config.clone());
    let io = job.io(&args.io.input, &args.io.output, args.io.frames);
    let flags = job.plan(&renderer, &io)?;

    if args.lines {
        println!("{}", config.program);
        for flag in &flags {
            println!("{flag}");
        }
    } else {
        println!("{}", renderer.command_line(&flags));
    }
    Ok(())
}
