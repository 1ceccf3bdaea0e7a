//! The drawing surface capability the shaping engine draws through.

use crate::error::FcError;
use forge_canvas_canvas2d::{
    Canvas2dContext, CanvasImageDataRef, FillStyle, TextAlign, TextBaseline,
};
use std::ops::{Deref, DerefMut};

/// Whether text is filled or stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Fill,
    Stroke,
}

/// Vertical font extents relative to the alphabetic baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

/// A decoded image with straight-alpha RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl DecodedImage {
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Width measurement under the surface's active font.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str) -> Result<f32, FcError>;
}

pub trait DrawingSurface: TextMeasure {
    fn set_font(&mut self, font: &str) -> Result<(), FcError>;
    fn font_size_px(&self) -> f32;
    fn font_metrics(&mut self) -> FontMetrics;

    fn draw_text(&mut self, mode: DrawMode, text: &str, x: f32, y: f32);
    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32);

    fn style(&self, mode: DrawMode) -> FillStyle;
    fn set_style(&mut self, mode: DrawMode, style: FillStyle);
    fn text_align(&self) -> TextAlign;
    fn set_text_align(&mut self, align: TextAlign);
    fn text_baseline(&self) -> TextBaseline;
}

impl TextMeasure for Canvas2dContext {
    fn measure_text(&mut self, text: &str) -> Result<f32, FcError> {
        let width = Canvas2dContext::measure_text(self, text).width;
        if width.is_finite() {
            Ok(width)
        } else {
            Err(FcError::Measurement(format!(
                "non-finite width {width} for {text:?}"
            )))
        }
    }
}

impl DrawingSurface for Canvas2dContext {
    fn set_font(&mut self, font: &str) -> Result<(), FcError> {
        Ok(Canvas2dContext::set_font(self, font)?)
    }

    fn font_size_px(&self) -> f32 {
        Canvas2dContext::font_size_px(self)
    }

    fn font_metrics(&mut self) -> FontMetrics {
        let metrics = Canvas2dContext::measure_text(self, "Hg");
        FontMetrics {
            ascent: metrics.font_bounding_box_ascent,
            descent: metrics.font_bounding_box_descent,
        }
    }

    fn draw_text(&mut self, mode: DrawMode, text: &str, x: f32, y: f32) {
        match mode {
            DrawMode::Fill => self.fill_text(text, x, y),
            DrawMode::Stroke => self.stroke_text(text, x, y),
        }
    }

    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32) {
        let image = CanvasImageDataRef {
            data: &image.data,
            width: image.width,
            height: image.height,
        };
        self.draw_image_data_scaled(&image, x, y, width, height);
    }

    fn style(&self, mode: DrawMode) -> FillStyle {
        match mode {
            DrawMode::Fill => self.fill_style(),
            DrawMode::Stroke => self.stroke_style(),
        }
    }

    fn set_style(&mut self, mode: DrawMode, style: FillStyle) {
        match mode {
            DrawMode::Fill => self.set_fill_style_value(style),
            DrawMode::Stroke => self.set_stroke_style_value(style),
        }
    }

    fn text_align(&self) -> TextAlign {
        Canvas2dContext::text_align(self)
    }

    fn set_text_align(&mut self, align: TextAlign) {
        Canvas2dContext::set_text_align(self, align)
    }

    fn text_baseline(&self) -> TextBaseline {
        Canvas2dContext::text_baseline(self)
    }
}

/// Overrides the style for one draw mode and the text alignment,
/// restoring both when dropped.
pub struct StyleScope<'a, S: DrawingSurface + ?Sized> {
    surface: &'a mut S,
    mode: DrawMode,
    saved_style: FillStyle,
    saved_align: TextAlign,
}

impl<'a, S: DrawingSurface + ?Sized> StyleScope<'a, S> {
    pub fn new(
        surface: &'a mut S,
        mode: DrawMode,
        style: Option<FillStyle>,
        align: TextAlign,
    ) -> Self {
        let saved_style = surface.style(mode);
        let saved_align = surface.text_align();
        if let Some(style) = style {
            surface.set_style(mode, style);
        }
        surface.set_text_align(align);
        Self {
            surface,
            mode,
            saved_style,
            saved_align,
        }
    }
}

impl<S: DrawingSurface + ?Sized> Deref for StyleScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawingSurface + ?Sized> DerefMut for StyleScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawingSurface + ?Sized> Drop for StyleScope<'_, S> {
    fn drop(&mut self) {
        self.surface.set_style(self.mode, self.saved_style);
        self.surface.set_text_align(self.saved_align);
    }
}
