//! Style types and enums for Canvas 2D text drawing.

use crate::error::{Canvas2dError, Canvas2dResult};
use std::str::FromStr;

/// Paint used by fill and stroke operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStyle {
    /// Solid color paint.
    Color(tiny_skia::Color),
}

impl FillStyle {
    /// Parse a CSS color string (`#rgb`, `#rrggbbaa`, `rgb()`, named colors, ...).
    pub fn from_css(style: &str) -> Canvas2dResult<Self> {
        let parsed = csscolorparser::parse(style.trim())
            .map_err(|e| Canvas2dError::ColorParseError(format!("{}: {}", style, e)))?;
        let [r, g, b, a] = parsed.to_array();
        let color = tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::BLACK);
        Ok(FillStyle::Color(color))
    }

    pub(crate) fn color(&self) -> tiny_skia::Color {
        match self {
            FillStyle::Color(color) => *color,
        }
    }
}

impl Default for FillStyle {
    fn default() -> Self {
        // Default is opaque black
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

/// Text alignment for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Align text to the left of the anchor point.
    Left,
    /// Align text to the right of the anchor point.
    Right,
    /// Center text on the anchor point.
    Center,
    /// Align text to the start (left for LTR).
    #[default]
    Start,
    /// Align text to the end (right for LTR).
    End,
}

impl FromStr for TextAlign {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(TextAlign::Left),
            "right" => Ok(TextAlign::Right),
            "center" => Ok(TextAlign::Center),
            "start" => Ok(TextAlign::Start),
            "end" => Ok(TextAlign::End),
            other => Err(Canvas2dError::TextError(format!(
                "Unknown text alignment: {other}"
            ))),
        }
    }
}

/// Text baseline for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// Top of the em square.
    Top,
    /// Hanging baseline.
    Hanging,
    /// Middle of the em square.
    Middle,
    /// Alphabetic baseline.
    #[default]
    Alphabetic,
    /// Ideographic baseline.
    Ideographic,
    /// Bottom of the em square.
    Bottom,
}

impl FromStr for TextBaseline {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(TextBaseline::Top),
            "hanging" => Ok(TextBaseline::Hanging),
            "middle" => Ok(TextBaseline::Middle),
            "alphabetic" => Ok(TextBaseline::Alphabetic),
            "ideographic" => Ok(TextBaseline::Ideographic),
            "bottom" => Ok(TextBaseline::Bottom),
            other => Err(Canvas2dError::TextError(format!(
                "Unknown text baseline: {other}"
            ))),
        }
    }
}
