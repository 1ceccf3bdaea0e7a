//! Integration tests for forge-canvas-canvas2d.

use forge_canvas_canvas2d::{
    Canvas2dContext, CanvasImageDataRef, FillStyle, FontConfig, TextAlign, TextBaseline,
};

fn context(width: u32, height: u32) -> Canvas2dContext {
    Canvas2dContext::with_config(width, height, &FontConfig::default()).unwrap()
}

/// Measured width grows with the text and is zero for the empty string.
#[test]
fn test_measure_text() {
    let mut ctx = context(100, 100);
    ctx.set_font("20px sans-serif").unwrap();

    let short = ctx.measure_text("Hi").width;
    let long = ctx.measure_text("Hi there, world").width;
    assert!(long >= short);
    assert_eq!(ctx.measure_text("").width, 0.0);

    let metrics = ctx.measure_text("Hg");
    assert!(metrics.font_bounding_box_ascent > 0.0);
    assert!(metrics.font_bounding_box_descent > 0.0);
}

/// Fill text only touches pixels when a font is available; it never panics.
#[test]
fn test_fill_and_stroke_text() {
    let mut ctx = context(200, 60);
    ctx.set_font("bold 32px sans-serif").unwrap();
    ctx.set_fill_style("#ff0000").unwrap();
    ctx.fill_text("Hello", 10.0, 40.0);
    ctx.set_line_width(2.0);
    ctx.stroke_text("Hello", 10.0, 40.0);

    let has_glyphs = ctx.measure_text("Hello").width > 0.0;
    let data = ctx.get_image_data(0, 0, 200, 60);
    let painted = data.chunks_exact(4).any(|px| px[3] > 0);
    assert_eq!(painted, has_glyphs);
}

/// A rejected font leaves the text state untouched.
#[test]
fn test_text_state_survives_bad_font() {
    let mut ctx = context(10, 10);
    ctx.set_font("12px serif").unwrap();
    ctx.set_text_align(TextAlign::End);
    ctx.set_text_baseline(TextBaseline::Top);

    assert!(ctx.set_font("huge").is_err());
    assert_eq!(ctx.font_size_px(), 12.0);
    assert_eq!(ctx.text_align(), TextAlign::End);
    assert_eq!(ctx.text_baseline(), TextBaseline::Top);
}

/// Straight-alpha images are premultiplied before compositing.
#[test]
fn test_draw_image_with_alpha() {
    let mut ctx = context(10, 10);
    let data = [0u8, 0, 255, 128].repeat(16);
    let image = CanvasImageDataRef {
        data: &data,
        width: 4,
        height: 4,
    };
    ctx.draw_image_data_scaled(&image, 0.0, 0.0, 10.0, 10.0);

    let pixels = ctx.get_image_data(5, 5, 1, 1);
    assert!(pixels[3] > 100 && pixels[3] < 160);
    assert!(pixels[2] > 200);
}

#[test]
fn test_style_values() {
    let mut ctx = context(10, 10);
    let green = FillStyle::from_css("rgb(0, 255, 0)").unwrap();
    ctx.set_stroke_style_value(green);
    assert_eq!(ctx.stroke_style(), green);
    assert_eq!(ctx.fill_style(), FillStyle::default());
}
