//! Renderer and encoder configuration.
//!
//! Everything a render needs from its environment is passed in through
//! these structs; nothing is read from the process environment. Both
//! load from YAML, with every field optional:
//!
//! ```yaml
//! program: /opt/oiio/bin/oiiotool
//! threads: 8
//! channels: R,G,B
//! ocio_config: /show/config.ocio
//! env:
//!   OCIO: /show/config.ocio
//! component_order: [geometric, color, overlay]
//! warp_filter: lanczos3
//! video:
//!   codec: ProRes422-HQ
//!   fps: 24
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use opchain_ops::{DEFAULT_WARP_FILTER, Family};

use crate::error::{RenderError, Result};
use crate::video::Codec;

/// Still-image tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Still-image tool executable
    pub program: String,
    /// Worker threads passed as `--threads`
    pub threads: u32,
    /// Channels kept with `--ch`; empty disables the flag
    pub channels: String,
    /// Adds `--debug -v`
    pub debug: bool,
    /// Extra environment for the child process only
    pub env: BTreeMap<String, String>,
    /// Working directory of the child process
    pub working_dir: Option<PathBuf>,
    /// Order in which processor flag groups are concatenated
    pub component_order: Vec<Family>,
    /// Filter for the geometric warp
    pub warp_filter: String,
    /// OCIO config emitted as `--colorconfig`
    pub ocio_config: Option<String>,
    /// Video encoder settings
    pub video: VideoConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "oiiotool".into(),
            threads: 4,
            channels: "R,G,B".into(),
            debug: false,
            env: BTreeMap::new(),
            working_dir: None,
            component_order: vec![Family::Geometric, Family::Color, Family::Overlay],
            warp_filter: DEFAULT_WARP_FILTER.into(),
            ocio_config: None,
            video: VideoConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parses a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Position of `family` in the component order; unlisted families
    /// sort last.
    pub fn component_rank(&self, family: Family) -> usize {
        self.component_order
            .iter()
            .position(|f| *f == family)
            .unwrap_or(self.component_order.len())
    }
}

/// Video tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Video tool executable
    pub program: String,
    /// Codec preset; `None` leaves codec choice to the tool
    pub codec: Option<Codec>,
    /// Frame rate used when the job does not carry one
    pub fps: Option<f64>,
    /// Overwrite existing output (`-y`) or refuse (`-n`)
    pub overwrite: bool,
    /// `-loglevel` value
    pub loglevel: String,
    /// Extra environment for the child process only
    pub env: BTreeMap<String, String>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".into(),
            codec: None,
            fps: None,
            overwrite: true,
            loglevel: "info".into(),
            env: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RenderConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg, RenderConfig::default());
        assert_eq!(cfg.program, "oiiotool");
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.video.program, "ffmpeg");
    }

    #[test]
    fn test_partial_yaml() {
        let cfg = RenderConfig::from_yaml(
            "threads: 16\ncomponent_order: [color, geometric]\nvideo:\n  codec: DNxHR-SQ\n  fps: 25\n",
        )
        .unwrap();
        assert_eq!(cfg.threads, 16);
        assert_eq!(cfg.component_rank(Family::Color), 0);
        assert_eq!(cfg.component_rank(Family::Overlay), 2);
        assert_eq!(cfg.video.codec, Some(Codec::DnxhrSq));
        assert_eq!(cfg.video.fps, Some(25.0));
    }

    #[test]
    fn test_unknown_field() {
        let err = RenderConfig::from_yaml("threds: 3").unwrap_err();
        assert!(err.is_build_error());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut cfg = RenderConfig::default();
        cfg.env.insert("OCIO".into(), "/show/config.ocio".into());
        cfg.video.codec = Some(Codec::ProRes4444Xq);
        let back = RenderConfig::from_yaml(&cfg.to_yaml().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.yaml");
        std::fs::write(&path, "debug: true\nwarp_filter: box\n").unwrap();
        let cfg = RenderConfig::from_file(&path).unwrap();
        assert!(cfg.debug);
        assert_eq!(cfg.warp_filter, "box");

        let missing = RenderConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, RenderError::ConfigIo { .. }));
    }
}
