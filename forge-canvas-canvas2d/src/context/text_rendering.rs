//! Text rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::Canvas2dResult;
use crate::font_parser::{parse_font, ParsedFont};
use crate::style::{TextAlign, TextBaseline};
use crate::text::{baseline_offset, buffer_metrics, shape_text, text_x_offset, TextMetrics};
use cosmic_text::Command;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Set the font from a CSS font string.
    ///
    /// On a parse error the current font is kept.
    pub fn set_font(&mut self, font: &str) -> Canvas2dResult<()> {
        self.state.font = parse_font(font)?;
        Ok(())
    }

    /// Current parsed font.
    pub fn font(&self) -> &ParsedFont {
        &self.state.font
    }

    /// Current font size in pixels.
    pub fn font_size_px(&self) -> f32 {
        self.state.font.size_px
    }

    /// Set the text alignment.
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    /// Current text alignment.
    pub fn text_align(&self) -> TextAlign {
        self.state.text_align
    }

    /// Set the text baseline.
    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    /// Current text baseline.
    pub fn text_baseline(&self) -> TextBaseline {
        self.state.text_baseline
    }

    /// Measure text with the current font.
    pub fn measure_text(&mut self, text: &str) -> TextMetrics {
        crate::text::measure_text(
            &mut self.font_system,
            text,
            &self.state.font,
            self.hinting_enabled,
        )
    }

    /// Fill text at the specified position.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {}", text, x, y);
        self.render_text_impl(text, x, y, true);
    }

    /// Stroke text at the specified position.
    pub fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "strokeText \"{}\" {} {}", text, x, y);
        self.render_text_impl(text, x, y, false);
    }

    /// Render glyph outlines as vector paths (shared by fillText and strokeText).
    fn render_text_impl(&mut self, text: &str, x: f32, y: f32, fill: bool) {
        if text.is_empty() {
            return;
        }
        let font = self.state.font.clone();
        let buffer = shape_text(&mut self.font_system, text, &font, self.hinting_enabled);
        let metrics = buffer_metrics(&buffer, &font);

        let base_x = x + text_x_offset(metrics.width, self.state.text_align);
        let base_y = y + baseline_offset(
            metrics.font_bounding_box_ascent,
            metrics.font_bounding_box_descent,
            self.state.text_baseline,
        );

        let style = if fill {
            self.state.fill_style
        } else {
            self.state.stroke_style
        };
        self.with_paint(style, |ctx, paint| {
            for run in buffer.layout_runs() {
                for glyph in run.glyphs.iter() {
                    let physical_glyph = glyph.physical((base_x, base_y), 1.0);
                    let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                    let glyph_y = base_y + glyph.y - glyph.font_size * glyph.y_offset;

                    let Some(commands) = ctx
                        .swash_cache
                        .get_outline_commands(&mut ctx.font_system, physical_glyph.cache_key)
                    else {
                        continue;
                    };

                    // Font outlines are y-up, the canvas is y-down
                    let mut path_builder = tiny_skia::PathBuilder::new();
                    for cmd in commands {
                        match cmd {
                            Command::MoveTo(p) => path_builder.move_to(p.x, -p.y),
                            Command::LineTo(p) => path_builder.line_to(p.x, -p.y),
                            Command::QuadTo(ctrl, end) => {
                                path_builder.quad_to(ctrl.x, -ctrl.y, end.x, -end.y)
                            }
                            Command::CurveTo(c1, c2, end) => {
                                path_builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                            }
                            Command::Close => path_builder.close(),
                        }
                    }
                    let Some(path) = path_builder.finish() else {
                        continue;
                    };

                    let transform = Transform::from_translate(glyph_x, glyph_y);
                    if fill {
                        ctx.pixmap.fill_path(
                            &path,
                            paint,
                            tiny_skia::FillRule::Winding,
                            transform,
                            None,
                        );
                    } else {
                        let stroke = tiny_skia::Stroke {
                            width: ctx.state.line_width,
                            ..tiny_skia::Stroke::default()
                        };
                        ctx.pixmap.stroke_path(&path, paint, &stroke, transform, None);
                    }
                }
            }
        });
    }
}
