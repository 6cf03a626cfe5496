// Export modules for use in tests
pub mod app;
pub mod catalog;
pub mod event_source;
pub mod panic_handler;
pub mod settings;
pub mod theme;
pub mod viewer;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::{App, AppAction, FocusedPanel, run_app_with_event_source};
