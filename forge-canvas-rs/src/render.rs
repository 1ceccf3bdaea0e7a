//! Drawing broken lines onto a surface.

use crate::config::ResolverConfig;
use crate::emoji::{emoji_url, ResolvedEmoji};
use crate::line_break::Line;
use crate::measure::WidthOracle;
use crate::surface::{DecodedImage, DrawMode, DrawingSurface};
use crate::token::Token;
use forge_canvas_canvas2d::{baseline_offset, text_x_offset, TextAlign};
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

/// Counts of emoji drawn as images and as fallback text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub emoji_images: usize,
    pub emoji_fallbacks: usize,
}

/// What a token turns into on the surface.
enum Glyph<'t> {
    Text(&'t str),
    Image(Arc<DecodedImage>),
}

/// Draws lines token by token with a left-to-right cursor.
///
/// The surface's text alignment must be `Left` while rendering; `align` is
/// applied here per line, using each line's own width.
pub struct LineRenderer<'a, S: DrawingSurface + ?Sized> {
    surface: &'a mut S,
    oracle: WidthOracle,
    mode: DrawMode,
    align: TextAlign,
    images: &'a HashMap<String, ResolvedEmoji>,
    urls: &'a ResolverConfig,
    stats: RenderStats,
}

impl<'a, S: DrawingSurface + ?Sized> LineRenderer<'a, S> {
    pub fn new(
        surface: &'a mut S,
        oracle: WidthOracle,
        mode: DrawMode,
        align: TextAlign,
        images: &'a HashMap<String, ResolvedEmoji>,
        urls: &'a ResolverConfig,
    ) -> Self {
        Self {
            surface,
            oracle,
            mode,
            align,
            images,
            urls,
            stats: RenderStats::default(),
        }
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    fn glyph<'t>(&self, token: &'t Token) -> Glyph<'t> {
        let Some(emoji) = &token.emoji else {
            return Glyph::Text(&token.content);
        };
        let url = emoji_url(emoji, self.urls);
        match self.images.get(&url).and_then(|r| r.image.clone()) {
            Some(image) => Glyph::Image(image),
            None => Glyph::Text(token.fallback_text()),
        }
    }

    fn text_width(&mut self, text: &str) -> f32 {
        match self.oracle.measure_str(&mut *self.surface, text) {
            Ok(width) => width,
            Err(err) => {
                warn!("Could not measure {text:?}: {err}");
                0.0
            }
        }
    }

    /// Width the line will occupy, with fallback text for missing images.
    pub fn line_width(&mut self, line: &Line) -> f32 {
        let emoji_size = self.oracle.emoji_size();
        let mut width = 0.0;
        for token in &line.tokens {
            width += match self.glyph(token) {
                Glyph::Image(_) => emoji_size,
                Glyph::Text(text) => self.text_width(text),
            };
        }
        width
    }

    /// Draw one line with its anchor at `(x, line_y)`.
    pub fn render_line(&mut self, line: &Line, x: f32, line_y: f32) {
        let emoji_size = self.oracle.emoji_size();
        let width = self.line_width(line);
        let mut cursor = x + text_x_offset(width, self.align);

        // Emoji are centered on the em box of the surrounding text.
        let metrics = self.surface.font_metrics();
        let baseline_y = line_y
            + baseline_offset(metrics.ascent, metrics.descent, self.surface.text_baseline());
        let emoji_top =
            baseline_y + (metrics.descent - metrics.ascent) / 2.0 - emoji_size / 2.0;

        for token in &line.tokens {
            match self.glyph(token) {
                Glyph::Image(image) => {
                    self.surface
                        .draw_image(&image, cursor, emoji_top, emoji_size, emoji_size);
                    self.stats.emoji_images += 1;
                    cursor += emoji_size;
                }
                Glyph::Text(text) => {
                    if token.is_emoji() {
                        self.stats.emoji_fallbacks += 1;
                    }
                    self.surface.draw_text(self.mode, text, cursor, line_y);
                    cursor += self.text_width(text);
                }
            }
        }
    }

    /// Draw lines top to bottom, `line_offset` apart.
    pub fn render_lines(&mut self, lines: &[Line], x: f32, y: f32, line_offset: f32) {
        for (index, line) in lines.iter().enumerate() {
            self.render_line(line, x, y + index as f32 * line_offset);
        }
    }
}
