//! Text shaping and measurement using cosmic-text.

use crate::font_parser::ParsedFont;
use crate::style::{TextAlign, TextBaseline};
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Family, FontSystem, Metrics, Shaping};

/// Text metrics returned by measureText().
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMetrics {
    /// Width of the text in pixels.
    pub width: f32,
    /// Font ascent above the alphabetic baseline.
    pub font_bounding_box_ascent: f32,
    /// Font descent below the alphabetic baseline.
    pub font_bounding_box_descent: f32,
}

/// Map a CSS family name onto a cosmic-text family.
fn css_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "sans-serif" | "system-ui" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

/// Shape a single line of text with the given font.
pub(crate) fn shape_text(
    font_system: &mut FontSystem,
    text: &str,
    font: &ParsedFont,
    hinting_enabled: bool,
) -> Buffer {
    let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);

    let family = font
        .families
        .first()
        .map(|f| css_family(f))
        .unwrap_or(Family::SansSerif);

    let mut attrs = Attrs::new()
        .family(family)
        .weight(font.weight)
        .style(font.style);
    if !hinting_enabled {
        attrs = attrs.cache_key_flags(CacheKeyFlags::DISABLE_HINTING);
    }

    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    buffer
}

/// Collect width and vertical extents from a shaped buffer.
pub(crate) fn buffer_metrics(buffer: &Buffer, font: &ParsedFont) -> TextMetrics {
    let mut width: f32 = 0.0;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    for run in buffer.layout_runs() {
        width = width.max(run.line_w);
        ascent = ascent.max(run.line_y - run.line_top);
        descent = descent.max((run.line_top + run.line_height) - run.line_y);
    }
    // Empty strings produce no runs
    if ascent == 0.0 && descent == 0.0 {
        ascent = font.size_px * 0.8;
        descent = font.size_px * 0.2;
    }

    TextMetrics {
        width,
        font_bounding_box_ascent: ascent,
        font_bounding_box_descent: descent,
    }
}

/// Measure text using cosmic-text.
pub(crate) fn measure_text(
    font_system: &mut FontSystem,
    text: &str,
    font: &ParsedFont,
    hinting_enabled: bool,
) -> TextMetrics {
    let buffer = shape_text(font_system, text, font, hinting_enabled);
    buffer_metrics(&buffer, font)
}

/// X offset of the text origin relative to the anchor for a given alignment.
pub fn text_x_offset(width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left | TextAlign::Start => 0.0,
        TextAlign::Right | TextAlign::End => -width,
        TextAlign::Center => -width / 2.0,
    }
}

/// Distance from the anchor y to the alphabetic baseline for a given baseline mode.
pub fn baseline_offset(ascent: f32, descent: f32, baseline: TextBaseline) -> f32 {
    match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Hanging => ascent * 0.8,
        TextBaseline::Middle => (ascent - descent) / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Ideographic => -descent * 0.5,
        TextBaseline::Bottom => -descent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TextAlign::Start, 0.0)]
    #[case(TextAlign::Left, 0.0)]
    #[case(TextAlign::Center, -50.0)]
    #[case(TextAlign::End, -100.0)]
    #[case(TextAlign::Right, -100.0)]
    fn test_text_x_offset(#[case] align: TextAlign, #[case] expected: f32) {
        assert_eq!(text_x_offset(100.0, align), expected);
    }

    #[test]
    fn test_baseline_offsets_are_distinct() {
        let modes = [
            TextBaseline::Top,
            TextBaseline::Hanging,
            TextBaseline::Middle,
            TextBaseline::Alphabetic,
            TextBaseline::Ideographic,
            TextBaseline::Bottom,
        ];
        let offsets: Vec<f32> = modes
            .iter()
            .map(|mode| baseline_offset(16.0, 4.0, *mode))
            .collect();
        for (i, a) in offsets.iter().enumerate() {
            for b in &offsets[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(baseline_offset(16.0, 4.0, TextBaseline::Top), 16.0);
        assert_eq!(baseline_offset(16.0, 4.0, TextBaseline::Bottom), -4.0);
    }
}
