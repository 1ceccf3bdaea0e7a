//! Canvas 2D rendering context implementation.

mod image_ops;
mod text_rendering;

pub use image_ops::CanvasImageDataRef;

use crate::drawing_state::DrawingState;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::font_config::FontConfig;
use crate::style::FillStyle;
use cosmic_text::{FontSystem, SwashCache};
use tiny_skia::Pixmap;

/// Maximum canvas dimension (same as Chrome).
const MAX_DIMENSION: u32 = 32767;

/// Canvas 2D rendering context.
pub struct Canvas2dContext {
    /// Width of the canvas in pixels.
    pub(crate) width: u32,
    /// Height of the canvas in pixels.
    pub(crate) height: u32,
    /// Pixel buffer (premultiplied RGBA).
    pub(crate) pixmap: Pixmap,
    /// Font system for text shaping.
    pub(crate) font_system: FontSystem,
    /// Swash cache for glyph outlines.
    pub(crate) swash_cache: SwashCache,
    /// Current drawing state.
    pub(crate) state: DrawingState,
    /// Whether font hinting is enabled for text rendering.
    pub(crate) hinting_enabled: bool,
}

impl Canvas2dContext {
    /// Create a new Canvas2dContext with the specified dimensions and default fonts.
    pub fn new(width: u32, height: u32) -> Canvas2dResult<Self> {
        Self::with_config(width, height, &FontConfig::default())
    }

    /// Create a new Canvas2dContext with the specified dimensions and font configuration.
    pub fn with_config(width: u32, height: u32, config: &FontConfig) -> Canvas2dResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Canvas2dError::InvalidDimensions { width, height });
        }
        let pixmap =
            Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })?;

        let font_system = FontSystem::new_with_locale_and_db("en".to_string(), config.to_fontdb());

        Ok(Self {
            width,
            height,
            pixmap,
            font_system,
            swash_cache: SwashCache::new(),
            state: DrawingState::default(),
            hinting_enabled: config.hinting_enabled,
        })
    }

    /// Get canvas width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get canvas height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the whole canvas with a CSS color, ignoring the drawing state.
    pub fn clear(&mut self, color: &str) -> Canvas2dResult<()> {
        let style = FillStyle::from_css(color)?;
        self.pixmap.fill(style.color());
        Ok(())
    }

    // --- Style setters ---

    /// Set the fill style from a CSS color string.
    pub fn set_fill_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.fill_style = FillStyle::from_css(style)?;
        Ok(())
    }

    /// Set the stroke style from a CSS color string.
    pub fn set_stroke_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.stroke_style = FillStyle::from_css(style)?;
        Ok(())
    }

    /// Replace the fill style.
    pub fn set_fill_style_value(&mut self, style: FillStyle) {
        self.state.fill_style = style;
    }

    /// Replace the stroke style.
    pub fn set_stroke_style_value(&mut self, style: FillStyle) {
        self.state.stroke_style = style;
    }

    /// Current fill style.
    pub fn fill_style(&self) -> FillStyle {
        self.state.fill_style
    }

    /// Current stroke style.
    pub fn stroke_style(&self) -> FillStyle {
        self.state.stroke_style
    }

    /// Set the width of stroked glyph outlines.
    /// Non-finite values and values <= 0 are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            log::debug!(target: "canvas", "lineWidth {}", width);
            self.state.line_width = width;
        }
    }

    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    /// Build a paint for the given style and run `f` with it.
    pub(crate) fn with_paint<R>(
        &mut self,
        style: FillStyle,
        f: impl FnOnce(&mut Self, &tiny_skia::Paint<'static>) -> R,
    ) -> R {
        let color = style.color();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        f(self, &paint)
    }
}
