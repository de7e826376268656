//! PDF documents rasterized through PDFium.
//!
//! PDFium is not thread-safe, so every operation binds a fresh instance on the blocking
//! pool and reopens the document from the retained bytes.

use crate::document::{DocumentOpener, PageRaster, PagedDocument};
use crate::error::{Result, SlideError};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Locates and binds the PDFium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumLoader {
    library: Option<PathBuf>,
}

impl PdfiumLoader {
    pub fn new(library: Option<PathBuf>) -> Self {
        Self { library }
    }

    /// Search order: configured path, working directory, system library.
    pub fn bind(&self) -> Result<Pdfium> {
        let configured = self
            .library
            .as_ref()
            .map(|path| Pdfium::bind_to_library(path));

        let bindings = match configured {
            Some(Ok(bindings)) => Ok(bindings),
            _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| SlideError::document(format!("Failed to initialize PDFium: {}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

/// A PDF held in memory.
#[derive(Debug)]
pub struct PdfiumDocument {
    name: String,
    data: Arc<Vec<u8>>,
    page_count: u32,
    loader: PdfiumLoader,
}

impl PdfiumDocument {
    /// Validate `data` and read its page count. Blocking.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>, loader: PdfiumLoader) -> Result<Self> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(SlideError::document("Not a valid PDF file"));
        }

        let pdfium = loader.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(&data, None)
            .map_err(map_pdfium_error)?;
        let page_count = document.pages().len() as u32;
        drop(document);

        if page_count == 0 {
            return Err(SlideError::document("Document has no pages"));
        }

        Ok(Self {
            name: name.into(),
            data: Arc::new(data),
            page_count,
            loader,
        })
    }

    fn rasterize(&self, page: u32, scale: f32) -> Result<PageRaster> {
        let pdfium = self.loader.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(&self.data, None)
            .map_err(map_pdfium_error)?;

        let index = u16::try_from(page - 1).map_err(|_| SlideError::PageOutOfRange {
            page,
            total: self.page_count,
        })?;
        let pdf_page = document
            .pages()
            .get(index)
            .map_err(|e| SlideError::render(page, e.to_string()))?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(scale)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| SlideError::render(page, e.to_string()))?;

        Ok(PageRaster {
            page,
            pixels: bitmap.as_image().to_rgba8(),
        })
    }
}

#[async_trait]
impl PagedDocument for PdfiumDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn page_content(&self, page: u32, scale: f32) -> Result<PageRaster> {
        if page == 0 || page > self.page_count {
            return Err(SlideError::PageOutOfRange {
                page,
                total: self.page_count,
            });
        }

        let job = Self {
            name: self.name.clone(),
            data: Arc::clone(&self.data),
            page_count: self.page_count,
            loader: self.loader.clone(),
        };
        tokio::task::spawn_blocking(move || job.rasterize(page, scale))
            .await
            .map_err(|e| SlideError::render(page, format!("render task aborted: {}", e)))?
    }
}

/// Production [`DocumentOpener`] backed by PDFium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumOpener {
    loader: PdfiumLoader,
}

impl PdfiumOpener {
    pub fn new(library: Option<PathBuf>) -> Self {
        Self {
            loader: PdfiumLoader::new(library),
        }
    }
}

#[async_trait]
impl DocumentOpener for PdfiumOpener {
    async fn open(&self, name: &str, bytes: Vec<u8>) -> Result<Arc<dyn PagedDocument>> {
        let name = name.to_string();
        let loader = self.loader.clone();
        let document = tokio::task::spawn_blocking(move || {
            PdfiumDocument::from_bytes(name, bytes, loader)
        })
        .await
        .map_err(|e| SlideError::document(format!("open task aborted: {}", e)))??;
        Ok(Arc::new(document))
    }
}

fn map_pdfium_error(err: PdfiumError) -> SlideError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            SlideError::document("PDF is password protected")
        }
        other => SlideError::document(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bytes_without_pdf_header() {
        let err = PdfiumDocument::from_bytes("deck", b"<html>".to_vec(), PdfiumLoader::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Document error: Not a valid PDF file");
    }

    #[tokio::test]
    async fn opener_surfaces_validation_errors() {
        let opener = PdfiumOpener::default();
        let err = opener.open("deck", Vec::new()).await.unwrap_err();
        assert!(matches!(err, SlideError::Document { .. }));
    }
}
