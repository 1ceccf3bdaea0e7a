//! Named canvases and the "current canvas" lookup.

use crate::draw_text::{draw_text, DrawSummary, LayoutRequest};
use crate::emoji::EmojiResolver;
use crate::error::FcError;
use forge_canvas_canvas2d::{Canvas2dContext, FontConfig};
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Canvases by name. The most recently created or used one is "current".
pub struct CanvasManager {
    font_config: FontConfig,
    canvases: HashMap<String, Canvas2dContext>,
    current: Option<String>,
}

impl Default for CanvasManager {
    fn default() -> Self {
        Self::new(FontConfig::default())
    }
}

impl CanvasManager {
    pub fn new(font_config: FontConfig) -> Self {
        Self {
            font_config,
            canvases: HashMap::new(),
            current: None,
        }
    }

    /// Create (or replace) a canvas and make it current.
    pub fn create(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
    ) -> Result<&mut Canvas2dContext, FcError> {
        let canvas = Canvas2dContext::with_config(width, height, &self.font_config)?;
        debug!("Created canvas {name:?} ({width}x{height})");
        self.current = Some(name.to_string());
        let canvas = match self.canvases.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(canvas);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(canvas),
        };
        Ok(canvas)
    }

    /// The named canvas, or the current one when `name` is `None`.
    pub fn get_mut(&mut self, name: Option<&str>) -> Option<&mut Canvas2dContext> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.current.clone()?,
        };
        let canvas = self.canvases.get_mut(&name)?;
        self.current = Some(name);
        Some(canvas)
    }

    pub fn remove(&mut self, name: &str) -> Option<Canvas2dContext> {
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        self.canvases.remove(name)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }
}

/// Draw on the named (or current) canvas.
///
/// Fails with [`FcError::NoCanvas`] before drawing anything if there is no
/// such canvas.
pub async fn draw_text_on(
    manager: &mut CanvasManager,
    name: Option<&str>,
    request: &LayoutRequest,
    resolver: &EmojiResolver,
) -> Result<DrawSummary, FcError> {
    let canvas = manager.get_mut(name).ok_or(FcError::NoCanvas)?;
    Ok(draw_text(canvas, request, resolver).await)
}
