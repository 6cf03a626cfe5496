//! Viewer session: page, zoom and pan state for one open document
//!
//! State changes go through [`ViewerSession::apply`], which returns the
//! side effects the owner has to carry out (indicators, re-rendering).
//! Out-of-range requests are clamped, never rejected.

use super::config::ViewerConfig;
use super::document::Document;
use super::geometry::{Bounds, Offset, Size};

/// Commands that modify the session
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Go to a page (1-based)
    GoToPage(usize),
    NextPage,
    PrevPage,
    /// Set the zoom factor
    SetScale(f32),
    ZoomIn,
    ZoomOut,
    /// Back to 1.0 with the content centered
    ResetZoom,
    /// Move the content center relative to the container center
    PanTo(Offset),
    /// The hosting area changed size
    SetContainer(Size),
    /// Natural size of the current page became known
    SetPageSize(Size),
    /// The document's page count resolved
    SetPageCount(usize),
}

/// Effects produced by session changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    ShowPageIndicator,
    ShowZoomIndicator,
    RenderCurrentPage,
}

/// Page, zoom and pan state of the document currently in the viewer
#[derive(Debug, Clone)]
pub struct ViewerSession {
    document: Document,
    config: ViewerConfig,
    /// Current page (1-based)
    page: usize,
    /// Unknown until the loader resolves it
    page_count: Option<usize>,
    scale: f32,
    offset: Offset,
    bounds: Bounds,
    /// Natural size of the current page, used to refit on resize
    page_size: Size,
}

impl ViewerSession {
    /// Start a fresh session: page 1, scale 1.0, centered
    #[must_use]
    pub fn open(document: Document, config: ViewerConfig, container: Size) -> Self {
        let scale = config.clamp_scale(1.0);
        Self {
            document,
            config,
            page: 1,
            page_count: None,
            scale,
            offset: Offset::ZERO,
            bounds: Bounds::new(container, Size::default()),
            page_size: Size::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Zoom as a whole percentage, for display
    pub fn scale_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// True when the content is magnified past its fitted size
    pub fn is_zoomed_in(&self) -> bool {
        self.scale > 1.0
    }

    /// Size the content currently occupies on screen
    pub fn content_size(&self) -> Size {
        self.bounds.base_content().scaled(self.scale)
    }

    fn last_page(&self) -> usize {
        self.page_count.unwrap_or(1).max(1)
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::GoToPage(page) => self.go_to_page(page),
            Command::NextPage => self.go_to_page(self.page.saturating_add(1)),
            Command::PrevPage => self.go_to_page(self.page.saturating_sub(1)),

            Command::SetScale(scale) => self.set_scale(scale),
            Command::ZoomIn => self.set_scale(round_tenth(self.scale + self.config.zoom_step)),
            Command::ZoomOut => self.set_scale(round_tenth(self.scale - self.config.zoom_step)),
            Command::ResetZoom => {
                let effects = self.set_scale(1.0);
                self.offset = Offset::ZERO;
                effects
            }

            Command::PanTo(offset) => {
                self.offset = self.bounds.clamp_offset(offset, self.scale);
                vec![]
            }

            Command::SetContainer(container) => {
                if self.bounds.container != container {
                    self.bounds.container = container;
                    self.refit();
                }
                vec![]
            }

            Command::SetPageSize(size) => {
                if self.page_size != size {
                    self.page_size = size;
                    self.refit();
                }
                vec![]
            }

            Command::SetPageCount(count) => {
                self.page_count = Some(count);
                self.page = self.page.clamp(1, self.last_page());
                vec![Effect::RenderCurrentPage]
            }
        }
    }

    fn go_to_page(&mut self, page: usize) -> Vec<Effect> {
        let clamped = page.clamp(1, self.last_page());
        if clamped == self.page {
            return vec![Effect::ShowPageIndicator];
        }
        self.page = clamped;
        self.offset = Offset::ZERO;
        vec![Effect::ShowPageIndicator, Effect::RenderCurrentPage]
    }

    fn set_scale(&mut self, scale: f32) -> Vec<Effect> {
        let clamped = self.config.clamp_scale(scale);
        if (clamped - self.scale).abs() <= f32::EPSILON {
            return vec![Effect::ShowZoomIndicator];
        }
        let ratio = clamped / self.scale;
        self.scale = clamped;
        self.offset = self.bounds.clamp_offset(self.offset.scaled(ratio), clamped);
        vec![Effect::ShowZoomIndicator, Effect::RenderCurrentPage]
    }

    fn refit(&mut self) {
        self.bounds.content = if self.page_size.is_empty() {
            Size::default()
        } else {
            self.page_size.fit_within(self.bounds.container)
        };
        self.offset = self.bounds.clamp_offset(self.offset, self.scale);
    }
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
