//! Document viewer
//!
//! [`ViewerSession`] is the pure state machine (page, scale, pan offset).
//! [`GestureInterpreter`] turns touch sequences into session commands,
//! [`DocumentLoader`] resolves page counts and renders pages off-thread,
//! and [`Viewer`] ties them together with the host [`Platform`].

pub mod backend;
pub mod config;
pub mod document;
pub mod geometry;
pub mod gesture;
pub mod indicator;
pub mod loader;
pub mod modal;
pub mod platform;
pub mod session;

pub use backend::{DocumentBackend, FileBackend, ImageBackend, OpenDocument};
#[cfg(feature = "pdf")]
pub use backend::PdfBackend;
pub use config::ViewerConfig;
pub use document::{Document, DocumentKind, LoadState, PageSurface, ViewerError};
pub use geometry::{Bounds, Offset, Point, Size};
pub use gesture::{Gesture, GestureInterpreter, Outcome, SwipeDirection, TouchEvent, TouchPhase, TouchPoint};
pub use indicator::{IndicatorKind, Indicators, TransientIndicator};
pub use loader::{DocumentLoader, LoadResponse, RequestId};
pub use modal::{Lifecycle, LifecycleHook, Viewer, ViewerStatus};
pub use platform::{HeadlessPlatform, InputCapture, Platform, TerminalPlatform};
pub use session::{Command, Effect, ViewerSession};
