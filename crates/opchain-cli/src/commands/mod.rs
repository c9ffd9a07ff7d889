//! CLI command implementations

pub mod batch;
pub mod matrix;
pub mod plan;
pub mod render;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use opchain_core::{FrameRange, MediaInfo, Resolution};
use opchain_ops::{Family, Fit, Operator, normalize};
use opchain_process::{ColorProcessor, OverlayProcessor, Processor, RepositionProcessor};
use opchain_render::{IoSpec, RenderConfig, RenderError, Renderer};

use crate::SourceArgs;

/// Loads the render config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    match path {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(RenderConfig::default()),
    }
}

/// Exit code of a failed external tool anywhere in the error chain.
pub fn tool_exit_code(err: &anyhow::Error) -> Option<i32> {
    err.chain()
        .find_map(|e| e.downcast_ref::<RenderError>())
        .and_then(RenderError::exit_code)
}

/// Reads a JSON or YAML document into a generic value.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let value = if yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML: {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON: {}", path.display()))?
    };
    Ok(value)
}

/// Loads and normalizes a pipeline file.
pub fn load_pipeline(path: &Path) -> Result<Vec<Operator>> {
    let doc = read_document(path)?;
    let ops = normalize(doc).with_context(|| format!("Invalid pipeline: {}", path.display()))?;
    debug!(ops = ops.len(), path = %path.display(), "pipeline loaded");
    Ok(ops)
}

/// Parses `WxH`.
pub fn parse_size(text: &str) -> Result<(u32, u32)> {
    let Some((w, h)) = text.split_once(['x', 'X']) else {
        bail!("Invalid size '{text}', expected WxH");
    };
    let w = w.trim().parse().with_context(|| format!("Invalid width in '{text}'"))?;
    let h = h.trim().parse().with_context(|| format!("Invalid height in '{text}'"))?;
    Ok((w, h))
}

/// Parses a fit mode name.
pub fn parse_fit(text: &str) -> Result<Fit> {
    serde_json::from_value(Value::String(text.to_ascii_lowercase()))
        .with_context(|| format!("Unknown fit '{text}'"))
}

/// Everything needed to assemble one render.
#[derive(Debug, Clone)]
pub struct Job {
    /// Operators of every family, in authoring order
    pub ops: Vec<Operator>,
    /// Source metadata
    pub media: MediaInfo,
    /// Optional reformat after the geometric chain
    pub target: Option<(u32, u32, Fit)>,
}

/// One processor per family.
pub struct Processors {
    pub color: ColorProcessor,
    pub geometric: RepositionProcessor,
    pub overlay: OverlayProcessor,
}

impl Processors {
    pub fn as_dyn(&self) -> [&dyn Processor; 3] {
        [&self.color, &self.geometric, &self.overlay]
    }
}

impl Job {
    /// Builds a job from command line source arguments.
    pub fn from_args(args: &SourceArgs) -> Result<Self> {
        let media = match &args.media {
            Some(path) => {
                let doc = read_document(path)?;
                serde_json::from_value(doc)
                    .with_context(|| format!("Invalid media info: {}", path.display()))?
            }
            None => MediaInfo::new(0, 0),
        };
        let target = match &args.target {
            Some(size) => {
                let (w, h) = parse_size(size)?;
                Some((w, h, parse_fit(&args.fit)?))
            }
            None => None,
        };
        Self::new(
            load_pipeline(&args.pipeline)?,
            media,
            args.width,
            args.height,
            target,
        )
    }

    /// Builds a job, letting explicit dimensions override probed ones.
    pub fn new(
        ops: Vec<Operator>,
        mut media: MediaInfo,
        width: Option<u32>,
        height: Option<u32>,
        target: Option<(u32, u32, Fit)>,
    ) -> Result<Self> {
        if let Some(w) = width {
            media.width = w;
        }
        if let Some(h) = height {
            media.height = h;
        }
        if media.resolution().is_empty() {
            bail!("Source resolution unknown: pass --width/--height or --media");
        }
        if media.is_anamorphic() {
            warn!(
                pixel_aspect = media.pixel_aspect,
                "non-square pixels; geometric operators work in pixel space"
            );
        }
        Ok(Self { ops, media, target })
    }

    /// Source resolution.
    pub fn source(&self) -> Resolution {
        self.media.resolution()
    }

    /// Splits the operators into per-family processors.
    pub fn processors(&self, config: &RenderConfig) -> Result<Processors> {
        let mut color = ColorProcessor::new();
        if let Some(cs) = &self.media.colorspace {
            color = color.with_default_input(cs.as_str());
        }
        let mut geometric =
            RepositionProcessor::new(self.source()).with_filter(config.warp_filter.as_str());
        if let Some((w, h, fit)) = self.target {
            geometric = geometric.with_target(w, h, fit);
        }
        let mut overlay = OverlayProcessor::new();

        for op in &self.ops {
            match op.family() {
                Family::Color => color.add(op.clone())?,
                Family::Geometric => geometric.add(op.clone())?,
                Family::Overlay => overlay.add(op.clone())?,
            }
        }
        Ok(Processors {
            color,
            geometric,
            overlay,
        })
    }

    /// I/O spec with the frame range filled from media when absent.
    pub fn io(&self, input: &str, output: &str, frames: Option<FrameRange>) -> IoSpec {
        let mut io = IoSpec::new(input, output);
        io.frames = frames;
        io.with_media(&self.media)
    }

    /// Full argument list for the still-image tool.
    pub fn plan(&self, renderer: &Renderer, io: &IoSpec) -> Result<Vec<String>> {
        let processors = self.processors(renderer.config())?;
        Ok(renderer.render(&processors.as_dyn(), io)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opchain_ops::{Crop, Lut, Text, Position};

    #[test]
    fn test_parse_size_and_fit() {
        assert_eq!(parse_size("1920x1080").unwrap(), (1920, 1080));
        assert!(parse_size("1920").is_err());
        assert_eq!(parse_fit("Letterbox").unwrap(), Fit::Letterbox);
        assert!(parse_fit("zoom").is_err());
    }

    #[test]
    fn test_tool_exit_code() {
        let failed = RenderError::RenderFailed {
            code: Some(3),
            stdout: String::new(),
            stderr: "boom".into(),
        };
        let err = anyhow::Error::new(failed).context("Render failed: out.exr");
        assert_eq!(tool_exit_code(&err), Some(3));

        let killed = RenderError::RenderFailed {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(tool_exit_code(&anyhow::Error::new(killed)), None);
        assert_eq!(tool_exit_code(&anyhow::anyhow!("bad pipeline")), None);
    }

    #[test]
    fn test_job_requires_resolution() {
        assert!(Job::new(vec![], MediaInfo::new(0, 0), None, None, None).is_err());
        let job = Job::new(vec![], MediaInfo::new(0, 0), Some(1920), Some(1080), None).unwrap();
        assert_eq!(job.source(), Resolution::HD);
    }

    #[test]
    fn test_processors_split_by_family() {
        let ops = vec![
            Operator::from(Text::new("v001", Position::BottomLeft)),
            Operator::from(Lut::new("show.cube")),
            Operator::from(Crop::new(0.0, 0.0, 960.0, 540.0)),
        ];
        let mut media = MediaInfo::new(1920, 1080);
        media.colorspace = Some("ACES - ACEScg".into());
        let job = Job::new(ops, media, None, None, None).unwrap();
        let p = job.processors(&RenderConfig::default()).unwrap();
        assert_eq!(p.color.len(), 1);
        assert_eq!(p.geometric.len(), 1);
        assert_eq!(p.overlay.len(), 1);
        assert_eq!(&p.color.compute().unwrap()[..2], ["--iscolorspace", "ACES - ACEScg"]);
    }
}
