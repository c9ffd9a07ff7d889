//! Frame ranges and numbered sequence patterns.
//!
//! Render invocations address image sequences through a padded pattern
//! and an inclusive frame range:
//!
//! - `plate.####.exr` - hash style (one `#` per digit)
//! - `plate.@@@@.exr` - at style (one `@` per digit)
//! - `plate.%04d.exr` - printf style
//!
//! Both external tools are given the printf form: the still-image tool
//! reads a bare `#` as four digits, so hash patterns are never passed
//! through verbatim.
//!
//! # Example
//!
//! ```rust
//! use opchain_core::sequence::{FrameRange, SeqPattern};
//!
//! let range: FrameRange = "1001-1100".parse().unwrap();
//! assert_eq!(range.len(), 100);
//!
//! let seq = SeqPattern::parse("shots/plate.####.exr").unwrap();
//! assert_eq!(seq.printf(), "shots/plate.%04d.exr");
//! assert_eq!(seq.frame_path(1001), "shots/plate.1001.exr");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An inclusive range of frame numbers.
///
/// Serializes as the `start-end` text form used on command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameRange {
    start: i32,
    end: i32,
}

impl FrameRange {
    /// Creates a new frame range, swapping the bounds if given reversed.
    pub fn new(start: i32, end: i32) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self { start, end }
    }

    /// Creates a range for a single frame.
    pub fn single(frame: i32) -> Self {
        Self::new(frame, frame)
    }

    /// Returns the first frame.
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Returns the last frame (inclusive).
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Returns the number of frames in the range.
    pub fn len(&self) -> usize {
        (i64::from(self.end) - i64::from(self.start) + 1) as usize
    }

    /// A range always holds at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the range contains the given frame.
    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.start && frame <= self.end
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for FrameRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || Error::InvalidFrameRange(s.to_string());
        if text.is_empty() {
            return Err(invalid());
        }

        // A leading '-' belongs to a negative start frame, not the separator.
        let split_at = text
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i);

        match split_at {
            Some(i) => {
                let start = text[..i].trim().parse().map_err(|_| invalid())?;
                let end = text[i + 1..].trim().parse().map_err(|_| invalid())?;
                Ok(Self::new(start, end))
            }
            None => text.parse().map(Self::single).map_err(|_| invalid()),
        }
    }
}

impl TryFrom<String> for FrameRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FrameRange> for String {
    fn from(range: FrameRange) -> Self {
        range.to_string()
    }
}

/// A padded sequence path such as `plate.####.exr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqPattern {
    prefix: String,
    suffix: String,
    padding: usize,
}

impl SeqPattern {
    /// Creates a pattern from its components.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, padding: usize) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            padding: padding.max(1),
        }
    }

    /// Parses a path containing `####`, `@@@@` or `%04d` padding.
    ///
    /// Only the last padding token in the path is treated as the frame
    /// placeholder.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = || Error::InvalidPattern(pattern.to_string());

        if let Some(pos) = pattern.rfind('%') {
            let rest = &pattern[pos + 1..];
            let d_pos = rest.find('d').ok_or_else(invalid)?;
            let spec = &rest[..d_pos];
            if !spec.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let padding = if spec.is_empty() {
                1
            } else {
                spec.trim_start_matches('0').parse().unwrap_or(1)
            };
            return Ok(Self::new(&pattern[..pos], &rest[d_pos + 1..], padding));
        }

        for token in ['#', '@'] {
            if let Some(end) = pattern.rfind(token) {
                let start = pattern[..end]
                    .rfind(|c| c != token)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                return Ok(Self::new(
                    &pattern[..start],
                    &pattern[end + 1..],
                    end + 1 - start,
                ));
            }
        }

        Err(invalid())
    }

    /// Finds a frame placeholder in the file name part of `path`.
    ///
    /// Only the last `####`, `@@@@`, `%0Nd` or `%d` run in the file name
    /// counts, and only when it sits at a frame position: at the start of
    /// the name or after `.` or `_`, and at the end of the name or before
    /// `.`. Anything else (`#` or `@` in a directory, `take#2.exr`) is not a
    /// sequence and yields `None`.
    pub fn detect(path: &str) -> Option<Self> {
        let name_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
        let name = &path[name_start..];
        let (start, end, padding) = frame_token(name)?;

        let bytes = name.as_bytes();
        let before = start == 0 || matches!(bytes[start - 1], b'.' | b'_');
        let after = end == bytes.len() || bytes[end] == b'.';
        if !(before && after) {
            return None;
        }
        Some(Self::new(
            &path[..name_start + start],
            &name[end..],
            padding,
        ))
    }

    /// Returns the text before the frame number.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the text after the frame number.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns the number of digits.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Pattern in printf form (`plate.%04d.exr`).
    pub fn printf(&self) -> String {
        format!("{}%0{}d{}", self.prefix, self.padding, self.suffix)
    }

    /// Pattern in hash form (`plate.####.exr`).
    pub fn hashes(&self) -> String {
        format!("{}{}{}", self.prefix, "#".repeat(self.padding), self.suffix)
    }

    /// Path of one concrete frame.
    pub fn frame_path(&self, frame: i32) -> String {
        let digits = if frame < 0 {
            format!("-{:0width$}", frame.unsigned_abs(), width = self.padding)
        } else {
            format!("{:0width$}", frame, width = self.padding)
        };
        format!("{}{}{}", self.prefix, digits, self.suffix)
    }
}

// Byte span and padding of the last padding token in a file name.
fn frame_token(name: &str) -> Option<(usize, usize, usize)> {
    let bytes = name.as_bytes();
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            c @ (b'#' | b'@') => {
                let start = bytes[..i]
                    .iter()
                    .rposition(|b| *b != c)
                    .map_or(0, |p| p + 1);
                return Some((start, i + 1, i + 1 - start));
            }
            b'd' => {
                let Some(pct) = bytes[..i].iter().rposition(|b| !b.is_ascii_digit()) else {
                    continue;
                };
                if bytes[pct] == b'%' {
                    let padding = name[pct + 1..i].trim_start_matches('0').parse().unwrap_or(1);
                    return Some((pct, i + 1, padding));
                }
            }
            _ => {}
        }
    }
    None
}

impl fmt::Display for SeqPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hashes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_range() {
        let range = FrameRange::new(1001, 1100);
        assert_eq!(range.start(), 1001);
        assert_eq!(range.end(), 1100);
        assert_eq!(range.len(), 100);
        assert!(range.contains(1050));
        assert!(!range.contains(1101));
    }

    #[test]
    fn test_frame_range_reverse() {
        let range = FrameRange::new(1100, 1001);
        assert_eq!(range.start(), 1001);
        assert_eq!(range.end(), 1100);
    }

    #[test]
    fn test_frame_range_parse() {
        assert_eq!("1001-1100".parse::<FrameRange>().unwrap(), FrameRange::new(1001, 1100));
        assert_eq!("42".parse::<FrameRange>().unwrap(), FrameRange::single(42));
        assert_eq!("-5-10".parse::<FrameRange>().unwrap(), FrameRange::new(-5, 10));
        assert!("abc".parse::<FrameRange>().is_err());
        assert!("".parse::<FrameRange>().is_err());
    }

    #[test]
    fn test_frame_range_display() {
        assert_eq!(FrameRange::new(1, 24).to_string(), "1-24");
        assert_eq!(FrameRange::single(7).to_string(), "7");
    }

    #[test]
    fn test_frame_range_serde() {
        let range: FrameRange = serde_json::from_str("\"1001-1010\"").unwrap();
        assert_eq!(range.len(), 10);
        assert_eq!(serde_json::to_string(&range).unwrap(), "\"1001-1010\"");
    }

    #[test]
    fn test_hash_pattern() {
        let seq = SeqPattern::parse("/plates/sh010.####.exr").unwrap();
        assert_eq!(seq.prefix(), "/plates/sh010.");
        assert_eq!(seq.suffix(), ".exr");
        assert_eq!(seq.padding(), 4);
        assert_eq!(seq.printf(), "/plates/sh010.%04d.exr");
    }

    #[test]
    fn test_printf_pattern() {
        let seq = SeqPattern::parse("sh010.%06d.dpx").unwrap();
        assert_eq!(seq.padding(), 6);
        assert_eq!(seq.hashes(), "sh010.######.dpx");
    }

    #[test]
    fn test_at_pattern() {
        let seq = SeqPattern::parse("sh010.@@@.png").unwrap();
        assert_eq!(seq.padding(), 3);
        assert_eq!(seq.frame_path(7), "sh010.007.png");
    }

    #[test]
    fn test_detect_frame_position() {
        let seq = SeqPattern::detect("/plates/sh010.####.exr").unwrap();
        assert_eq!(seq.printf(), "/plates/sh010.%04d.exr");
        assert_eq!(SeqPattern::detect("sh010_@@@.png").unwrap().printf(), "sh010_%03d.png");
        assert_eq!(SeqPattern::detect("render/%06d.dpx").unwrap().padding(), 6);
        assert_eq!(SeqPattern::detect("out.%d.tif").unwrap().printf(), "out.%01d.tif");
        assert_eq!(SeqPattern::detect("plate.####").unwrap().suffix(), "");
    }

    #[test]
    fn test_detect_ignores_other_characters() {
        assert_eq!(SeqPattern::detect("/mnt/user@studio/plate.exr"), None);
        assert_eq!(SeqPattern::detect("/shows/#42/out.exr"), None);
        assert_eq!(SeqPattern::detect("/shows/#42/sh010.####.exr").unwrap().prefix(), "/shows/#42/sh010.");
        assert_eq!(SeqPattern::detect("take#2.exr"), None);
        assert_eq!(SeqPattern::detect("grade_100%.exr"), None);
        assert_eq!(SeqPattern::detect("movie.mov"), None);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(SeqPattern::parse("movie.mov").is_err());
        assert!(SeqPattern::parse("sh010.%0xd.exr").is_err());
    }
}
