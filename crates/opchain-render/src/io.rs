//! Input/output description of one render.

use serde::{Deserialize, Serialize};

use opchain_core::{Error, FrameRange, MediaInfo, SeqPattern};

/// Input and output paths plus the frame range to process.
///
/// Sequence paths may use `####`, `@@@@` or `%04d` padding; they are
/// passed to the tools in printf form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoSpec {
    /// Source path or sequence pattern
    pub input: String,
    /// Destination path or sequence pattern
    pub output: String,
    /// Inclusive frame range
    #[serde(default)]
    pub frames: Option<FrameRange>,
}

impl IoSpec {
    /// Creates a spec without a frame range.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            frames: None,
        }
    }

    /// Sets the frame range.
    pub fn with_frames(mut self, frames: FrameRange) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Fills the frame range from probed media when none is set.
    pub fn with_media(mut self, info: &MediaInfo) -> Self {
        if self.frames.is_none() {
            self.frames = info.frame_range;
        }
        self
    }

    /// Input path as given to the tools.
    pub fn input_path(&self) -> opchain_core::Result<String> {
        tool_path("input", &self.input)
    }

    /// Output path as given to the tools.
    pub fn output_path(&self) -> opchain_core::Result<String> {
        tool_path("output", &self.output)
    }
}

/// Normalizes separators and converts sequence padding to printf form.
///
/// Only a padding run at the frame position of the file name is
/// converted; every other path is passed through as given.
pub(crate) fn tool_path(field: &str, path: &str) -> opchain_core::Result<String> {
    if path.trim().is_empty() {
        return Err(Error::invalid_parameter("io", field, "must not be empty"));
    }
    let path = path.replace('\\', "/");
    Ok(match SeqPattern::detect(&path) {
        Some(seq) => seq.printf(),
        None => path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let io = IoSpec::new("C:\\plates\\sh010.####.exr", "out/sh010.%04d.exr");
        assert_eq!(io.input_path().unwrap(), "C:/plates/sh010.%04d.exr");
        assert_eq!(io.output_path().unwrap(), "out/sh010.%04d.exr");
        assert_eq!(IoSpec::new("a.mov", "b.mov").input_path().unwrap(), "a.mov");
    }

    #[test]
    fn test_special_characters_kept() {
        let io = IoSpec::new("/mnt/user@studio/plate.exr", "/shows/#42/out.exr");
        assert_eq!(io.input_path().unwrap(), "/mnt/user@studio/plate.exr");
        assert_eq!(io.output_path().unwrap(), "/shows/#42/out.exr");

        let io = IoSpec::new("/mnt/user@studio/sh010.@@@@.exr", "/shows/#42/take#2.exr");
        assert_eq!(io.input_path().unwrap(), "/mnt/user@studio/sh010.%04d.exr");
        assert_eq!(io.output_path().unwrap(), "/shows/#42/take#2.exr");
    }

    #[test]
    fn test_empty_path() {
        assert!(IoSpec::new("", "b.exr").input_path().is_err());
    }

    #[test]
    fn test_media_frames() {
        let mut info = MediaInfo::new(1920, 1080);
        info.frame_range = Some(FrameRange::new(1001, 1010));
        let io = IoSpec::new("a.@@@@.exr", "b.####.exr").with_media(&info);
        assert_eq!(io.frames, Some(FrameRange::new(1001, 1010)));

        let explicit = IoSpec::new("a", "b")
            .with_frames(FrameRange::single(1))
            .with_media(&info);
        assert_eq!(explicit.frames, Some(FrameRange::single(1)));
    }
}
