#![allow(dead_code)]

use forge_canvas_rs::forge_canvas_canvas2d::{parse_font, FillStyle, TextAlign, TextBaseline};
use forge_canvas_rs::{
    DecodedImage, DrawMode, DrawingSurface, FcError, FontMetrics, ImageFetcher, TextMeasure,
};
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const CHAR_WIDTH: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        mode: DrawMode,
        text: String,
        x: f32,
        y: f32,
        style: FillStyle,
        align: TextAlign,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Surface where every char is `CHAR_WIDTH` wide; records draw calls.
#[derive(Debug)]
pub struct RecordingSurface {
    pub font_px: f32,
    pub fill: FillStyle,
    pub stroke: FillStyle,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub fail_measure: bool,
    pub ops: Vec<Op>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            font_px: 10.0,
            fill: FillStyle::default(),
            stroke: FillStyle::default(),
            align: TextAlign::Start,
            baseline: TextBaseline::Alphabetic,
            fail_measure: false,
            ops: Vec::new(),
        }
    }
}

impl RecordingSurface {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                Op::Image { .. } => None,
            })
            .collect()
    }

    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Image { .. }))
            .count()
    }
}

impl TextMeasure for RecordingSurface {
    fn measure_text(&mut self, text: &str) -> Result<f32, FcError> {
        if self.fail_measure {
            return Err(FcError::Measurement("measurement disabled".to_string()));
        }
        Ok(text.chars().count() as f32 * CHAR_WIDTH)
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_font(&mut self, font: &str) -> Result<(), FcError> {
        self.font_px = parse_font(font)?.size_px;
        Ok(())
    }

    fn font_size_px(&self) -> f32 {
        self.font_px
    }

    fn font_metrics(&mut self) -> FontMetrics {
        FontMetrics {
            ascent: self.font_px * 0.8,
            descent: self.font_px * 0.2,
        }
    }

    fn draw_text(&mut self, mode: DrawMode, text: &str, x: f32, y: f32) {
        let style = match mode {
            DrawMode::Fill => self.fill,
            DrawMode::Stroke => self.stroke,
        };
        self.ops.push(Op::Text {
            mode,
            text: text.to_string(),
            x,
            y,
            style,
            align: self.align,
        });
    }

    fn draw_image(&mut self, _image: &DecodedImage, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(Op::Image {
            x,
            y,
            width,
            height,
        });
    }

    fn style(&self, mode: DrawMode) -> FillStyle {
        match mode {
            DrawMode::Fill => self.fill,
            DrawMode::Stroke => self.stroke,
        }
    }

    fn set_style(&mut self, mode: DrawMode, style: FillStyle) {
        match mode {
            DrawMode::Fill => self.fill = style,
            DrawMode::Stroke => self.stroke = style,
        }
    }

    fn text_align(&self) -> TextAlign {
        self.align
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn text_baseline(&self) -> TextBaseline {
        self.baseline
    }
}

/// Serves a 1x1 image for every URL after a short delay, counting requests.
/// URLs containing `fail` are rejected.
#[derive(Debug, Default)]
pub struct CountingFetcher {
    pub calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DecodedImage, FcError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = url.to_string();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if url.contains("fail") {
                return Err(FcError::ImageLoad {
                    url,
                    reason: "rejected".to_string(),
                });
            }
            Ok(DecodedImage {
                width: 1,
                height: 1,
                data: vec![255, 0, 0, 255],
            })
        }
        .boxed()
    }
}
