//! Paged document abstraction and the drawing surface pages are rendered onto.
//!
//! A [`PagedDocument`] exposes a page count and per-page rasterization at a requested
//! scale. [`render_page`] is the render operation the scheduler serializes: it obtains the
//! page content, resizes the shared surface to the content's scaled dimensions and draws it.

pub mod pdfium;
pub mod surface;

use crate::error::{Result, SlideError};
use async_trait::async_trait;
use image::RgbaImage;
use std::sync::Arc;

pub use pdfium::{PdfiumDocument, PdfiumOpener};
pub use surface::{DrawingSurface, SharedSurface};

/// Raster content of a single page at a given scale.
#[derive(Debug, Clone)]
pub struct PageRaster {
    /// 1-based page number
    pub page: u32,
    pub pixels: RgbaImage,
}

impl PageRaster {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Core trait for a loaded paged document.
#[async_trait]
pub trait PagedDocument: Send + Sync + std::fmt::Debug {
    /// Display name of the document
    fn name(&self) -> &str;

    /// Total number of pages
    fn page_count(&self) -> u32;

    /// Rasterize `page` (1-based) at `scale` times its intrinsic size
    async fn page_content(&self, page: u32, scale: f32) -> Result<PageRaster>;
}

/// Turns downloaded bytes into a document handle.
#[async_trait]
pub trait DocumentOpener: Send + Sync {
    async fn open(&self, name: &str, bytes: Vec<u8>) -> Result<Arc<dyn PagedDocument>>;
}

/// Outcome of a completed render operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedPage {
    pub page: u32,
    pub width: u32,
    pub height: u32,
}

/// Render `page` of `document` onto `surface`.
///
/// The caller guarantees no other render targets the same surface concurrently.
pub async fn render_page(
    document: &dyn PagedDocument,
    page: u32,
    scale: f32,
    surface: &SharedSurface,
) -> Result<RenderedPage> {
    let total = document.page_count();
    if page == 0 || page > total {
        return Err(SlideError::PageOutOfRange { page, total });
    }

    let content = document.page_content(page, scale).await?;
    let (width, height) = (content.width(), content.height());

    let mut surface = surface.lock();
    surface.resize(width, height);
    surface.draw(&content);

    Ok(RenderedPage {
        page,
        width,
        height,
    })
}
