//! Matrix command: print the composite matrix of a pipeline

use anyhow::Result;
use tracing::trace;

use opchain_ops::warp_flags;
use opchain_render::RenderConfig;

use super::Job;
use crate::MatrixArgs;

pub fn run(args: MatrixArgs, config: &RenderConfig) -> Result<()> {
    trace!(pipeline = %args.source.pipeline.display(), "matrix::run");

    let job = Job::from_args(&args.source)?;
    let processors = job.processors(config)?;
    let composite = processors.geometric.composite()?;

    for row in composite.matrix.m {
        println!("{:>14.6} {:>14.6} {:>14.6}", row[0], row[1], row[2]);
    }
    println!("source: {}", job.source());
    println!("canvas: {}", composite.resolution());
    println!("warp:   {}", warp_flags(&composite.matrix, &config.warp_filter).join(" "));
    Ok(())
}
