//! Host platform capabilities
//!
//! The viewer talks to the host through [`Platform`] only: fullscreen
//! switching, whether a pointer is available, and hooking pointer input.
//! Input hooks are handed out as [`InputCapture`] guards that unhook on drop.

use std::io;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

/// Releases a pointer-input hook when dropped
#[must_use = "input is released as soon as the capture is dropped"]
pub struct InputCapture {
    release: Option<Box<dyn FnOnce()>>,
}

impl InputCapture {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A capture with nothing to undo
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for InputCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputCapture")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

pub trait Platform {
    /// Whether pointer/touch gestures can reach the viewer at all
    fn pointer_capable(&self) -> bool;

    /// Start delivering pointer input; stops when the guard drops
    fn capture_input(&mut self) -> io::Result<InputCapture>;

    fn is_fullscreen(&self) -> bool;

    fn set_fullscreen(&mut self, fullscreen: bool) -> io::Result<()>;
}

/// Terminal host: mouse capture through crossterm, fullscreen means the
/// viewer takes the whole frame
#[derive(Debug)]
pub struct TerminalPlatform {
    mouse: bool,
    shell_captured: bool,
    fullscreen: bool,
}

impl TerminalPlatform {
    pub fn new(mouse: bool) -> Self {
        Self {
            mouse,
            shell_captured: false,
            fullscreen: false,
        }
    }

    /// The shell holds mouse capture for its own panels, so viewer
    /// captures must leave it enabled when released
    pub fn with_shell_capture(mut self) -> Self {
        self.shell_captured = true;
        self
    }
}

impl Platform for TerminalPlatform {
    fn pointer_capable(&self) -> bool {
        self.mouse
    }

    fn capture_input(&mut self) -> io::Result<InputCapture> {
        if self.shell_captured {
            return Ok(InputCapture::noop());
        }
        execute!(io::stdout(), EnableMouseCapture)?;
        log::debug!("Mouse capture enabled");
        Ok(InputCapture::new(|| {
            let _ = execute!(io::stdout(), DisableMouseCapture);
            log::debug!("Mouse capture released");
        }))
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> io::Result<()> {
        self.fullscreen = fullscreen;
        Ok(())
    }
}

/// Headless host for tests and tools; counts active captures
#[derive(Debug, Default, Clone)]
pub struct HeadlessPlatform {
    pointer: bool,
    fullscreen: bool,
    captures: std::rc::Rc<std::cell::Cell<usize>>,
}

impl HeadlessPlatform {
    pub fn new(pointer: bool) -> Self {
        Self {
            pointer,
            ..Self::default()
        }
    }

    /// Number of captures currently held
    pub fn active_captures(&self) -> usize {
        self.captures.get()
    }
}

impl Platform for HeadlessPlatform {
    fn pointer_capable(&self) -> bool {
        self.pointer
    }

    fn capture_input(&mut self) -> io::Result<InputCapture> {
        let captures = self.captures.clone();
        captures.set(captures.get() + 1);
        Ok(InputCapture::new(move || captures.set(captures.get() - 1)))
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> io::Result<()> {
        self.fullscreen = fullscreen;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn capture_releases_on_drop() {
        let released = Rc::new(Cell::new(false));
        let flag = released.clone();
        let capture = InputCapture::new(move || flag.set(true));
        assert!(!released.get());
        drop(capture);
        assert!(released.get());
    }

    #[test]
    fn headless_counts_captures() {
        let mut platform = HeadlessPlatform::new(true);
        let observer = platform.clone();
        let first = platform.capture_input().unwrap();
        let second = platform.capture_input().unwrap();
        assert_eq!(observer.active_captures(), 2);
        drop(first);
        drop(second);
        assert_eq!(observer.active_captures(), 0);
    }
}
