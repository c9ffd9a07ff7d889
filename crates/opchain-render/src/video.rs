//! Video encoding of rendered image sequences.
//!
//! ```text
//! ffmpeg -loglevel info -hide_banner -y -xerror -start_number 1001 -r 24
//!        -thread_queue_size 4096 -framerate 24 -i plate.%04d.exr
//!        [-i audio.wav -map 0:v -map 1:a] [-timecode 01:00:00:00]
//!        <codec args> out.mov
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use opchain_core::format::number;
use opchain_core::{Error, FrameRange, MediaInfo};

use crate::config::VideoConfig;
use crate::error::Result;
use crate::exec::{ExecutionResult, run};
use crate::io::tool_path;

/// Supported codec presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Codec {
    /// Apple ProRes 422 HQ
    ProRes422Hq,
    /// Apple ProRes 4444 XQ
    ProRes4444Xq,
    /// Avid DNxHR SQ
    DnxhrSq,
}

impl Codec {
    /// All presets.
    pub const ALL: [Self; 3] = [Self::ProRes422Hq, Self::ProRes4444Xq, Self::DnxhrSq];

    /// Preset name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProRes422Hq => "ProRes422-HQ",
            Self::ProRes4444Xq => "ProRes4444-XQ",
            Self::DnxhrSq => "DNxHR-SQ",
        }
    }

    /// Encoder arguments for this preset.
    pub fn args(self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::ProRes422Hq => &[
                "-vcodec", "prores_ks", "-profile:v", "3", "-vendor", "apl0", "-pix_fmt",
                "yuv422p10le", "-vtag", "apch",
            ],
            Self::ProRes4444Xq => &[
                "-vcodec", "prores_ks", "-profile:v", "4", "-vendor", "apl0", "-pix_fmt",
                "yuva444p10le", "-vtag", "ap4h",
            ],
            Self::DnxhrSq => &["-vcodec", "dnxhd", "-profile:v", "2", "-pix_fmt", "yuv422p"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedCodec {
                name: s.to_string(),
                supported: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

impl TryFrom<String> for Codec {
    type Error = Error;

    fn try_from(s: String) -> std::result::Result<Self, Error> {
        s.parse()
    }
}

impl From<Codec> for String {
    fn from(c: Codec) -> Self {
        c.as_str().to_string()
    }
}

/// One encode: an image sequence in, a movie out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoSpec {
    /// Sequence pattern
    pub input: String,
    /// Movie path
    pub output: String,
    /// Sequence frame range; its start becomes `-start_number`
    #[serde(default)]
    pub frames: Option<FrameRange>,
    /// Frame rate
    #[serde(default)]
    pub fps: Option<f64>,
    /// Audio track muxed with the video
    #[serde(default)]
    pub audio: Option<String>,
    /// Start timecode
    #[serde(default)]
    pub timecode: Option<String>,
}

impl VideoSpec {
    /// Creates a spec with nothing but paths.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            frames: None,
            fps: None,
            audio: None,
            timecode: None,
        }
    }

    /// Fills unset frame range, fps and timecode from probed media.
    pub fn with_media(mut self, info: &MediaInfo) -> Self {
        self.frames = self.frames.or(info.frame_range);
        self.fps = self.fps.or(info.fps);
        if self.timecode.is_none() {
            self.timecode = info.timecode.clone();
        }
        self
    }
}

/// Builds and runs video tool invocations.
#[derive(Debug, Clone, Default)]
pub struct VideoEncoder {
    config: VideoConfig,
}

impl VideoEncoder {
    /// Creates an encoder.
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    /// Encoder configuration.
    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    /// Assembles the argument list (without the program).
    pub fn build(&self, spec: &VideoSpec) -> Result<Vec<String>> {
        let fps = spec.fps.or(self.config.fps).ok_or_else(|| {
            Error::invalid_parameter("video", "fps", "no frame rate in job, media or config")
        })?;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(Error::invalid_parameter("video", "fps", "must be positive").into());
        }
        let fps = number(fps);

        let mut args: Vec<String> = vec![
            "-loglevel".into(),
            self.config.loglevel.clone(),
            "-hide_banner".into(),
            if self.config.overwrite { "-y" } else { "-n" }.into(),
            "-xerror".into(),
        ];
        if let Some(frames) = spec.frames {
            args.push("-start_number".into());
            args.push(frames.start().to_string());
        }
        args.extend([
            "-r".into(),
            fps.clone(),
            "-thread_queue_size".into(),
            "4096".into(),
            "-framerate".into(),
            fps,
            "-i".into(),
            tool_path("input", &spec.input)?,
        ]);
        if let Some(audio) = &spec.audio {
            args.extend([
                "-i".into(),
                audio.replace('\\', "/"),
                "-map".into(),
                "0:v".into(),
                "-map".into(),
                "1:a".into(),
            ]);
        }
        if let Some(tc) = &spec.timecode {
            args.push("-timecode".into());
            args.push(tc.clone());
        }
        if let Some(codec) = self.config.codec {
            args.extend(codec.args());
        }
        // the video tool requires the output last
        args.push(tool_path("output", &spec.output)?);
        Ok(args)
    }

    /// Builds and runs the encode, blocking until the tool exits.
    pub fn encode(&self, spec: &VideoSpec) -> Result<ExecutionResult> {
        let args = self.build(spec)?;
        run(&self.config.program, &args, &self.config.env, None)
    }
}
