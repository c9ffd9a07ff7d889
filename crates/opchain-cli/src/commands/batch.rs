//! Batch command: render every job of a YAML job file

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use opchain_core::{FrameRange, MediaInfo};
use opchain_ops::{Fit, normalize};
use opchain_render::{RenderConfig, Renderer};

use super::{Job, load_pipeline, parse_fit, parse_size};
use crate::BatchArgs;

/// Top level of a job file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchFile {
    jobs: Vec<JobSpec>,
}

/// One job. Either `pipeline` (a file, relative to the job file) or inline
/// `ops` must be given.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    pipeline: Option<PathBuf>,
    #[serde(default)]
    ops: Option<Vec<Value>>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    media: Option<MediaInfo>,
    input: String,
    output: String,
    #[serde(default)]
    frames: Option<FrameRange>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    fit: Option<String>,
}

impl JobSpec {
    fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("job {}", index + 1))
    }

    fn to_job(&self, base: &Path) -> Result<Job> {
        let ops = match (&self.pipeline, &self.ops) {
            (Some(path), None) => load_pipeline(&base.join(path))?,
            (None, Some(ops)) => normalize(ops.clone())?,
            (Some(_), Some(_)) => bail!("both 'pipeline' and 'ops' given"),
            (None, None) => bail!("one of 'pipeline' or 'ops' is required"),
        };
        let target = match &self.target {
            Some(size) => {
                let (w, h) = parse_size(size)?;
                let fit = match &self.fit {
                    Some(fit) => parse_fit(fit)?,
                    None => Fit::Letterbox,
                };
                Some((w, h, fit))
            }
            None => None,
        };
        let media = self.media.clone().unwrap_or_else(|| MediaInfo::new(0, 0));
        Job::new(ops, media, self.width, self.height, target)
    }
}

pub fn run(args: BatchArgs, config: &RenderConfig, verbose: u8) -> Result<()> {
    trace!(jobs = %args.jobs.display(), dry_run = args.dry_run, "batch::run");

    let text = std::fs::read_to_string(&args.jobs)
        .with_context(|| format!("Failed to read: {}", args.jobs.display()))?;
    let file: BatchFile = serde_yaml::from_str(&text)
        .with_context(|| format!("Invalid job file: {}", args.jobs.display()))?;

    if file.jobs.is_empty() {
        bail!("No jobs in {}", args.jobs.display());
    }
    let base = args.jobs.parent().unwrap_or(Path::new("."));

    info!(jobs = file.jobs.len(), file = %args.jobs.display(), "Starting batch");

    let renderer = Renderer::new(config.clone());
    let results: Vec<(String, Result<String>)> = file
        .jobs
        .par_iter()
        .enumerate()
        .map(|(i, spec)| {
            let label = spec.label(i);
            let result = run_job(spec, base, &renderer, args.dry_run, verbose)
                .with_context(|| label.clone());
            (label, result)
        })
        .collect();

    let mut success = 0;
    let mut failed = 0;
    for (label, r) in results {
        match r {
            Ok(line) => {
                success += 1;
                if args.dry_run {
                    println!("{line}");
                } else if verbose > 0 {
                    println!("{label}: ok");
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {e:#}");
            }
        }
    }

    info!(success, failed, "Batch complete");
    println!("Processed: {success} success, {failed} failed");

    if failed > 0 {
        bail!("{failed} jobs failed");
    }
    Ok(())
}

/// Plans one job and runs it unless `dry_run`. Returns the command line.
fn run_job(
    spec: &JobSpec,
    base: &Path,
    renderer: &Renderer,
    dry_run: bool,
    verbose: u8,
) -> Result<String> {
    let job = spec.to_job(base)?;
    let io = job.io(&spec.input, &spec.output, spec.frames);
    let flags = job.plan(renderer, &io)?;
    let line = renderer.command_line(&flags);

    if verbose > 0 {
        println!("{} -> {}", spec.input, spec.output);
    }
    if !dry_run {
        let result = renderer.execute(&flags)?;
        debug!(output = %spec.output, stderr = %result.stderr.trim(), "job done");
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOBS: &str = r#"
jobs:
  - name: sh010
    width: 1920
    height: 1080
    input: in.####.exr
    output: out.####.exr
    frames: 1001-1010
    ops:
      - {kind: crop, box: [0, 0, 960, 540]}
      - {kind: resize, w: 1920, h: 1080}
  - pipeline: grade.yaml
    media: {width: 2048, height: 1080, colorspace: ACEScg}
    input: b.exr
    output: b.png
    target: 1024x540
"#;

    #[test]
    fn test_job_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("grade.yaml"),
            "- {kind: cdl, slope: [1.1, 1.0, 0.9]}\n- {kind: colorspace, value: sRGB, role: output}\n",
        )
        .unwrap();

        let file: BatchFile = serde_yaml::from_str(JOBS).unwrap();
        assert_eq!(file.jobs.len(), 2);
        assert_eq!(file.jobs[0].label(0), "sh010");
        assert_eq!(file.jobs[1].label(1), "job 2");

        let renderer = Renderer::default();
        let first = run_job(&file.jobs[0], dir.path(), &renderer, true, 0).unwrap();
        assert!(first.starts_with("oiiotool --frames 1001-1010 -i in.%04d.exr"));
        assert!(first.contains("--warp:filter=cubic:recompute_roi=1"));

        let second = run_job(&file.jobs[1], dir.path(), &renderer, true, 0).unwrap();
        assert!(second.contains("--iscolorspace ACEScg"));
        assert!(second.contains("--tocolorspace sRGB"));
        assert!(second.contains("--cut 1024x540+0+0"));
    }

    #[test]
    fn test_job_needs_ops() {
        let spec: JobSpec = serde_yaml::from_str("{input: a.exr, output: b.exr, width: 8, height: 8}").unwrap();
        assert!(spec.to_job(Path::new(".")).is_err());
    }
}
