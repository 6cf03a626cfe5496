//! Documents, page surfaces and viewer errors

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::geometry::Size;

/// What the viewer needs to pick a backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Image,
    #[serde(alias = "pdf")]
    Document,
}

impl DocumentKind {
    const IMAGE_EXTENSIONS: [&'static str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];

    /// Guess the kind from a file extension
    pub fn from_extension(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?.to_ascii_lowercase();
        if Self::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if ext == "pdf" {
            Some(Self::Document)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "pdf",
        }
    }
}

/// A document opened in the viewer: source locator plus display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub source: PathBuf,
    pub name: String,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            kind,
        }
    }
}

/// A rendered page ready to be laid out
#[derive(Clone, Debug, PartialEq)]
pub struct PageSurface {
    /// Page number (1-based)
    pub page: usize,
    /// Scale the surface was produced for
    pub scale: f32,
    /// Natural page size at scale 1.0, in page units
    pub natural_size: Size,
    /// Text lines found on the page, top to bottom
    pub lines: Vec<String>,
}

/// Recoverable viewer failures; none of them take the shell down
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("cannot open {location}: {reason}")]
    SourceUnreachable { location: String, reason: String },

    #[error("page {page} failed to render: {reason}")]
    RenderFailed { page: usize, reason: String },
}

impl ViewerError {
    pub fn unreachable(location: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::SourceUnreachable {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn render_failed(page: usize, reason: impl fmt::Display) -> Self {
        Self::RenderFailed {
            page,
            reason: reason.to_string(),
        }
    }

    /// Short message shown in the viewer in place of the page
    pub fn headline(&self) -> &'static str {
        match self {
            Self::SourceUnreachable { .. } => "File could not be opened",
            Self::RenderFailed { .. } => "Page could not be rendered",
        }
    }
}

/// Progress of the one-shot page count load
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready { page_count: usize },
    Failed(ViewerError),
}

impl LoadState {
    pub fn page_count(&self) -> Option<usize> {
        match self {
            Self::Ready { page_count } => Some(*page_count),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&ViewerError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
