//! Page-rendering backends
//!
//! A backend opens a document source and hands back an [`OpenDocument`]
//! that lives on the loader thread for as long as the document is shown.

use std::fs;
use std::path::Path;

use super::document::{Document, DocumentKind, PageSurface, ViewerError};
use super::geometry::Size;

/// Opens document sources; shared with the loader thread
pub trait DocumentBackend: Send + Sync {
    fn open(&self, document: &Document) -> Result<Box<dyn OpenDocument>, ViewerError>;
}

/// A successfully opened document
pub trait OpenDocument {
    fn page_count(&self) -> usize;

    /// Render a page (1-based) at the given scale
    fn render(&self, page: usize, scale: f32) -> Result<PageSurface, ViewerError>;
}

fn ensure_readable(path: &Path) -> Result<(), ViewerError> {
    let meta = fs::metadata(path).map_err(|e| ViewerError::unreachable(path.display(), e))?;
    if meta.is_file() {
        Ok(())
    } else {
        Err(ViewerError::unreachable(path.display(), "not a regular file"))
    }
}

/// Raster and vector images, always a single page
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageBackend;

struct OpenImage {
    size: Size,
}

impl DocumentBackend for ImageBackend {
    fn open(&self, document: &Document) -> Result<Box<dyn OpenDocument>, ViewerError> {
        let path = document.source.as_path();
        ensure_readable(path)?;

        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        let size = if is_svg {
            // Scalable; the viewer fits it to the container
            Size::default()
        } else {
            let dims = imagesize::size(path)
                .map_err(|e| ViewerError::unreachable(path.display(), e))?;
            Size::new(dims.width as f32, dims.height as f32)
        };

        log::debug!("Opened image {} ({size:?})", path.display());
        Ok(Box::new(OpenImage { size }))
    }
}

impl OpenDocument for OpenImage {
    fn page_count(&self) -> usize {
        1
    }

    fn render(&self, page: usize, scale: f32) -> Result<PageSurface, ViewerError> {
        if page != 1 {
            return Err(ViewerError::render_failed(page, "images have a single page"));
        }
        Ok(PageSurface {
            page,
            scale,
            natural_size: self.size,
            lines: Vec::new(),
        })
    }
}

#[cfg(feature = "pdf")]
pub use pdf::PdfBackend;

#[cfg(feature = "pdf")]
mod pdf {
    use mupdf::TextPageFlags;
    use mupdf::text_page::TextBlockType;

    use super::*;

    /// PDF documents through MuPDF
    #[derive(Debug, Default, Clone, Copy)]
    pub struct PdfBackend;

    struct OpenPdf {
        doc: mupdf::Document,
        page_count: usize,
    }

    impl DocumentBackend for PdfBackend {
        fn open(&self, document: &Document) -> Result<Box<dyn OpenDocument>, ViewerError> {
            let path = document.source.as_path();
            ensure_readable(path)?;

            let doc = mupdf::Document::open(path.to_string_lossy().as_ref())
                .map_err(|e| ViewerError::unreachable(path.display(), e))?;
            let page_count = doc
                .page_count()
                .map_err(|e| ViewerError::unreachable(path.display(), e))?;
            if page_count <= 0 {
                return Err(ViewerError::unreachable(path.display(), "document has no pages"));
            }

            log::info!("Opened PDF {} with {page_count} pages", path.display());
            Ok(Box::new(OpenPdf {
                doc,
                page_count: page_count as usize,
            }))
        }
    }

    impl OpenDocument for OpenPdf {
        fn page_count(&self) -> usize {
            self.page_count
        }

        fn render(&self, page: usize, scale: f32) -> Result<PageSurface, ViewerError> {
            if page == 0 || page > self.page_count {
                return Err(ViewerError::render_failed(page, "page out of range"));
            }
            let loaded = self
                .doc
                .load_page((page - 1) as i32)
                .map_err(|e| ViewerError::render_failed(page, e))?;
            let bounds = loaded
                .bounds()
                .map_err(|e| ViewerError::render_failed(page, e))?;

            let mut lines = Vec::new();
            if let Ok(text_page) = loaded.to_text_page(TextPageFlags::empty()) {
                for block in text_page.blocks() {
                    if block.r#type() != TextBlockType::Text {
                        continue;
                    }
                    for line in block.lines() {
                        let text: String = line.chars().filter_map(|ch| ch.char()).collect();
                        let text = text.trim_end();
                        if !text.is_empty() {
                            lines.push(text.to_string());
                        }
                    }
                }
            }

            Ok(PageSurface {
                page,
                scale,
                natural_size: Size::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0),
                lines,
            })
        }
    }
}

/// Dispatches on the document kind
#[derive(Debug, Default, Clone, Copy)]
pub struct FileBackend {
    images: ImageBackend,
    #[cfg(feature = "pdf")]
    pdfs: PdfBackend,
}

impl DocumentBackend for FileBackend {
    fn open(&self, document: &Document) -> Result<Box<dyn OpenDocument>, ViewerError> {
        match document.kind {
            DocumentKind::Image => self.images.open(document),
            #[cfg(feature = "pdf")]
            DocumentKind::Document => self.pdfs.open(document),
            #[cfg(not(feature = "pdf"))]
            DocumentKind::Document => Err(ViewerError::unreachable(
                document.source.display(),
                "built without PDF support",
            )),
        }
    }
}
