//! Image drawing, pixel data, and PNG output operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::{Canvas2dError, Canvas2dResult};

/// Borrowed image pixels.
#[derive(Debug, Clone, Copy)]
pub struct CanvasImageDataRef<'a> {
    /// RGBA pixel data, non-premultiplied, 4 bytes per pixel.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasImageDataRef<'_> {
    /// Copy into a premultiplied pixmap that tiny-skia can draw.
    fn to_pixmap(self) -> Canvas2dResult<tiny_skia::Pixmap> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(Canvas2dError::InvalidImageData {
                expected,
                actual: self.data.len(),
            });
        }
        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height).ok_or(
            Canvas2dError::InvalidDimensions {
                width: self.width,
                height: self.height,
            },
        )?;
        for (dst, src) in pixmap
            .data_mut()
            .chunks_exact_mut(4)
            .zip(self.data.chunks_exact(4))
        {
            let a = src[3] as u16;
            // (color * alpha + 127) / 255 for proper rounding
            dst[0] = ((src[0] as u16 * a + 127) / 255) as u8;
            dst[1] = ((src[1] as u16 * a + 127) / 255) as u8;
            dst[2] = ((src[2] as u16 * a + 127) / 255) as u8;
            dst[3] = src[3];
        }
        Ok(pixmap)
    }
}

impl Canvas2dContext {
    /// Draw image data scaled into the destination rectangle.
    ///
    /// Malformed image data is logged and skipped.
    pub fn draw_image_data_scaled(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        log::debug!(target: "canvas", "drawImage {}x{} at {} {} {} {}", image.width, image.height, dx, dy, dw, dh);
        if image.width == 0 || image.height == 0 || dw <= 0.0 || dh <= 0.0 {
            return;
        }
        let pixmap = match image.to_pixmap() {
            Ok(pixmap) => pixmap,
            Err(err) => {
                log::warn!("Skipping drawImage: {err}");
                return;
            }
        };

        let paint = tiny_skia::PixmapPaint {
            opacity: 1.0,
            blend_mode: tiny_skia::BlendMode::SourceOver,
            quality: tiny_skia::FilterQuality::Bilinear,
        };
        let transform = tiny_skia::Transform::from_translate(dx, dy)
            .pre_scale(dw / image.width as f32, dh / image.height as f32);
        self.pixmap
            .draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
    }

    /// Get straight-alpha RGBA data for a region of the canvas.
    pub fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        let source = self.pixmap.data();

        for dy in 0..height {
            let src_y = y + dy as i32;
            if src_y < 0 || src_y >= self.height as i32 {
                continue;
            }
            for dx in 0..width {
                let src_x = x + dx as i32;
                if src_x < 0 || src_x >= self.width as i32 {
                    continue;
                }
                let src_idx = (src_y as usize * self.width as usize + src_x as usize) * 4;
                let dst_idx = ((dy * width + dx) * 4) as usize;
                let pixel = &source[src_idx..src_idx + 4];

                // Premultiplied to straight alpha
                let a = pixel[3];
                match a {
                    0 => {}
                    255 => data[dst_idx..dst_idx + 4].copy_from_slice(pixel),
                    _ => {
                        let alpha_f = a as f32 / 255.0;
                        for c in 0..3 {
                            data[dst_idx + c] = (pixel[c] as f32 / alpha_f).min(255.0) as u8;
                        }
                        data[dst_idx + 3] = a;
                    }
                }
            }
        }

        data
    }

    /// Export the canvas as PNG data.
    ///
    /// `ppi` sets the pixel density metadata, 72 when not given.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Pixels per meter
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            let data = self.get_image_data(0, 0, self.width, self.height);
            writer.write_image_data(&data)?;
        }
        Ok(buf)
    }
}
