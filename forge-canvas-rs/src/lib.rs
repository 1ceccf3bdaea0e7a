#![doc = include_str!("../README.md")]

pub mod canvas_manager;
pub mod config;
pub mod draw_text;
pub mod emoji;
pub mod error;
pub mod image_loading;
pub mod line_break;
pub mod measure;
pub mod render;
pub mod surface;
pub mod token;

#[macro_use]
extern crate lazy_static;

pub use canvas_manager::{draw_text_on, CanvasManager};
pub use config::ResolverConfig;
pub use draw_text::{draw_text, layout_lines, DrawSummary, LayoutRequest};
pub use emoji::{EmojiResolver, ResolvedEmoji};
pub use error::FcError;
pub use image_loading::{DisabledImageFetcher, HttpImageFetcher, ImageFetcher};
pub use line_break::{break_lines, BreakOptions, Line};
pub use measure::WidthOracle;
pub use surface::{DecodedImage, DrawMode, DrawingSurface, FontMetrics, StyleScope, TextMeasure};
pub use token::{tokenize, EmojiRef, Token, TokenKind};

pub use forge_canvas_canvas2d;
