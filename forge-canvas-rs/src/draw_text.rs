//! The `draw_text` entry point.

use crate::emoji::EmojiResolver;
use crate::line_break::{break_lines, BreakOptions, Line};
use crate::measure::WidthOracle;
use crate::render::LineRenderer;
use crate::surface::{DrawMode, DrawingSurface, StyleScope};
use crate::token::tokenize;
use forge_canvas_canvas2d::{FillStyle, TextAlign};
use log::{debug, warn};

const DEFAULT_EMOJI_SIZE: f32 = 16.0;
const LINE_OFFSET_FACTOR: f32 = 1.2;

/// One text drawing call.
///
/// Zero, negative, and non-finite sizes count as not given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRequest {
    pub text: String,
    /// CSS font applied before measuring; the surface font is kept when `None`.
    pub font: Option<String>,
    /// CSS color for the fill or stroke style of `mode`, for this call only.
    pub style: Option<String>,
    pub mode: DrawMode,
    pub x: f32,
    pub y: f32,
    /// Side of the emoji square. Defaults to the font size.
    pub emoji_size: Option<f32>,
    pub max_width: Option<f32>,
    pub multiline: bool,
    pub wrap: bool,
    /// Distance between baselines. Defaults to `emoji_size * 1.2`.
    pub line_offset: Option<f32>,
}

impl LayoutRequest {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            ..Self::default()
        }
    }

    fn break_options(&self) -> BreakOptions {
        BreakOptions {
            max_width: positive(self.max_width),
            wrap: self.wrap,
            multiline: self.multiline,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawSummary {
    pub lines: usize,
    pub emoji_images: usize,
    pub emoji_fallbacks: usize,
}

fn positive(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn apply_font<S: DrawingSurface + ?Sized>(surface: &mut S, request: &LayoutRequest) {
    if let Some(font) = &request.font {
        if let Err(err) = surface.set_font(font) {
            warn!("Keeping current font, could not set {font:?}: {err}");
        }
    }
}

fn emoji_size<S: DrawingSurface + ?Sized>(surface: &S, request: &LayoutRequest) -> f32 {
    positive(request.emoji_size)
        .or_else(|| positive(Some(surface.font_size_px())))
        .unwrap_or(DEFAULT_EMOJI_SIZE)
}

/// Apply the request's font and break its text into lines.
pub fn layout_lines<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    request: &LayoutRequest,
) -> (Vec<Line>, WidthOracle) {
    apply_font(&mut *surface, request);
    let mut oracle = WidthOracle::new(emoji_size(&*surface, request));
    let tokens = tokenize(&request.text);
    let lines = break_lines(&tokens, &request.break_options(), &mut oracle, &mut *surface);
    (lines, oracle)
}

/// Lay out and draw `request.text`, with emoji images where they load and
/// fallback text where they don't.
///
/// The style and text alignment of the surface are restored before returning.
pub async fn draw_text<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    request: &LayoutRequest,
    resolver: &EmojiResolver,
) -> DrawSummary {
    let (lines, oracle) = layout_lines(&mut *surface, request);
    let emoji_size = oracle.emoji_size();
    let line_offset =
        positive(request.line_offset).unwrap_or(emoji_size * LINE_OFFSET_FACTOR);
    debug!(
        "Drawing {} line(s) at ({}, {}), line offset {}",
        lines.len(),
        request.x,
        request.y,
        line_offset
    );

    let images = resolver
        .resolve_all(
            lines
                .iter()
                .flat_map(|line| &line.tokens)
                .filter_map(|token| token.emoji.as_ref()),
        )
        .await;

    let style = request.style.as_deref().and_then(|css| {
        FillStyle::from_css(css)
            .map_err(|err| warn!("Keeping current style: {err}"))
            .ok()
    });
    let align = surface.text_align();
    let mut scope = StyleScope::new(surface, request.mode, style, TextAlign::Left);
    let mut renderer = LineRenderer::new(
        &mut *scope,
        oracle,
        request.mode,
        align,
        &images,
        resolver.config(),
    );
    renderer.render_lines(&lines, request.x, request.y, line_offset);
    let stats = renderer.stats();

    DrawSummary {
        lines: lines.len(),
        emoji_images: stats.emoji_images,
        emoji_fallbacks: stats.emoji_fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(12.0), Some(12.0))]
    #[case(Some(0.0), None)]
    #[case(Some(-3.0), None)]
    #[case(Some(f32::NAN), None)]
    #[case(Some(f32::INFINITY), None)]
    #[case(None, None)]
    fn test_positive(#[case] input: Option<f32>, #[case] expected: Option<f32>) {
        assert_eq!(positive(input), expected);
    }

    #[test]
    fn test_request_defaults() {
        let request = LayoutRequest::new("hi", 1.0, 2.0);
        assert_eq!(request.mode, DrawMode::Fill);
        assert!(!request.wrap && !request.multiline);
        assert_eq!(request.break_options().max_width, None);
    }
}
