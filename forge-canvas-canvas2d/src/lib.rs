//! Canvas 2D drawing surface for text and emoji rendering.
//!
//! This crate implements the subset of the Canvas 2D API that text drawing
//! needs, without a browser or JavaScript runtime:
//! - `tiny-skia` for rasterization
//! - `cosmic-text` for text shaping, measurement, and glyph outlines
//! - `fontdb` for the font database
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_canvas_canvas2d::Canvas2dContext;
//!
//! let mut ctx = Canvas2dContext::new(400, 100)?;
//! ctx.set_font("24px sans-serif")?;
//! ctx.set_fill_style("#202020")?;
//! ctx.fill_text("Hello", 10.0, 40.0);
//! let png_data = ctx.to_png(None)?;
//! ```

mod context;
mod drawing_state;
mod error;
mod font_config;
mod font_parser;
mod style;
mod text;

// Re-export public API
pub use context::{Canvas2dContext, CanvasImageDataRef};
pub use error::{Canvas2dError, Canvas2dResult};
pub use font_config::{CustomFont, FontConfig, GenericFamilyMap};
pub use font_parser::{parse_font, ParsedFont};
pub use style::{FillStyle, TextAlign, TextBaseline};
pub use text::{baseline_offset, text_x_offset, TextMetrics};
