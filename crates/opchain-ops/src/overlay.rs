//! Text overlays (burn-ins).
//!
//! Positions are expressed with the still-image tool's `{TOP.width}` and
//! `{TOP.height}` expressions so the same flags work at any resolution.

use serde::{Deserialize, Serialize};

use opchain_core::format::{number, number_list};
use opchain_core::{Error, Result};

/// Anchor corner or edge for a text overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Top left corner
    #[default]
    TopLeft,
    /// Top edge, centred
    TopCenter,
    /// Top right corner
    TopRight,
    /// Bottom left corner
    BottomLeft,
    /// Bottom edge, centred
    BottomCenter,
    /// Bottom right corner
    BottomRight,
}

impl Position {
    fn placement(self, padding: &str) -> [String; 4] {
        let left = padding.to_string();
        let center = "{TOP.width/2}".to_string();
        let right = format!("{{TOP.width-{padding}}}");
        let top = padding.to_string();
        let bottom = format!("{{TOP.height-{padding}}}");
        let (x, xalign) = match self {
            Self::TopLeft | Self::BottomLeft => (left, "left"),
            Self::TopCenter | Self::BottomCenter => (center, "center"),
            Self::TopRight | Self::BottomRight => (right, "right"),
        };
        let (y, yalign) = match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => (top, "top"),
            _ => (bottom, "bottom"),
        };
        [x, y, xalign.to_string(), yalign.to_string()]
    }
}

/// A line of text burnt into the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Text {
    /// Text to draw; may contain tool expressions such as `{FRAME}`
    pub text: String,
    /// Placement
    #[serde(default)]
    pub position: Position,
    /// Font size in pixels
    #[serde(default = "default_size")]
    pub size: f64,
    /// RGB color
    #[serde(default = "white")]
    pub color: [f64; 3],
    /// Font file
    #[serde(default)]
    pub font: Option<String>,
    /// Drop shadow strength
    #[serde(default)]
    pub outline: Option<f64>,
    /// Distance from the frame edges
    #[serde(default = "default_padding")]
    pub padding: f64,
}

fn default_size() -> f64 {
    64.0
}

fn white() -> [f64; 3] {
    [1.0; 3]
}

fn default_padding() -> f64 {
    30.0
}

impl Text {
    /// White text at the default size.
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
            size: default_size(),
            color: white(),
            font: None,
            outline: None,
            padding: default_padding(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(Error::invalid_parameter("text", "text", "must not be empty"));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(Error::invalid_parameter("text", "size", "must be positive"));
        }
        if !self.padding.is_finite() {
            return Err(Error::invalid_parameter("text", "padding", "must be finite"));
        }
        Ok(())
    }

    /// `--text:size=..:color=..[:shadow=..][:font=..]:x=..:y=..:xalign=..:yalign=.. TEXT`.
    pub fn flags(&self) -> Vec<String> {
        let mut flag = format!(
            "--text:size={}:color={}",
            number(self.size),
            number_list(&self.color)
        );
        if let Some(outline) = self.outline.filter(|o| *o > 0.0) {
            let shadow = (self.size * 0.05 * outline) as i64;
            flag.push_str(&format!(":shadow={shadow}"));
        }
        if let Some(font) = self.font.as_deref().filter(|f| !f.is_empty()) {
            flag.push_str(&format!(":font=\"{}\"", font.replace('\\', "/")));
        }
        let [x, y, xalign, yalign] = self.position.placement(&number(self.padding));
        flag.push_str(&format!(":x={x}:y={y}:xalign={xalign}:yalign={yalign}"));
        vec![flag, self.text.clone()]
    }
}
