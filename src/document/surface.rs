//! The 2D raster canvas pages are drawn onto.

use crate::document::PageRaster;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::sync::Arc;

/// Surface shared between the render task and the terminal renderer.
pub type SharedSurface = Arc<Mutex<DrawingSurface>>;

const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone)]
pub struct DrawingSurface {
    pixels: RgbaImage,
    page: Option<u32>,
    /// Bumped on every draw so renderers can tell stale frames apart
    generation: u64,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface {
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            page: None,
            generation: 0,
        }
    }

    pub fn shared() -> SharedSurface {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Resize to `width` x `height`. Resizing clears the surface, like a canvas does.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::from_pixel(width, height, BLANK);
        self.page = None;
    }

    /// Draw `content` at the origin, clipped to the surface.
    pub fn draw(&mut self, content: &PageRaster) {
        image::imageops::replace(&mut self.pixels, &content.pixels, 0, 0);
        self.page = Some(content.page);
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    /// Page currently shown, None when nothing has been drawn since the last resize
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
