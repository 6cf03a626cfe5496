pub mod test_helpers {
    use std::time::Duration;

    use crate::event_source::{
        Event, KeyCode, KeyModifiers, MouseEventKind, SimulatedEventSource,
    };
    use crate::viewer::geometry::Size;
    use crate::viewer::{Document, DocumentBackend, OpenDocument, PageSurface, ViewerError};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// In-memory backend: sources whose path contains "missing" fail to
    /// open, page 13 never renders, every page is 600x800
    #[derive(Debug, Clone, Copy)]
    pub struct StubBackend {
        pub pages: usize,
    }

    struct StubDocument {
        pages: usize,
    }

    impl DocumentBackend for StubBackend {
        fn open(&self, document: &Document) -> Result<Box<dyn OpenDocument>, ViewerError> {
            if document.source.to_string_lossy().contains("missing") {
                return Err(ViewerError::unreachable(
                    document.source.display(),
                    "not found",
                ));
            }
            Ok(Box::new(StubDocument { pages: self.pages }))
        }
    }

    impl OpenDocument for StubDocument {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn render(&self, page: usize, scale: f32) -> Result<PageSurface, ViewerError> {
            if page == 13 || page > self.pages {
                return Err(ViewerError::render_failed(page, "corrupt page"));
            }
            Ok(PageSurface {
                page,
                scale,
                natural_size: Size::new(600.0, 800.0),
                lines: vec![format!("Page {page}")],
            })
        }
    }

    /// Call `step` until `done` holds; panics after about a second
    pub fn wait_until<T>(target: &mut T, mut step: impl FnMut(&mut T), done: impl Fn(&T) -> bool) {
        for _ in 0..500 {
            step(target);
            if done(target) {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("condition never held");
    }

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        pub(crate) events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn press(mut self, code: KeyCode) -> Self {
            self.events
                .push(SimulatedEventSource::key_event(code, KeyModifiers::empty()));
            self
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press(KeyCode::Enter)
        }

        pub fn press_tab(self) -> Self {
            self.press(KeyCode::Tab)
        }

        pub fn press_esc(self) -> Self {
            self.press(KeyCode::Esc)
        }

        /// Move the cursor down n times (press 'j' n times)
        pub fn navigate_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        /// Left click at a terminal cell
        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.extend(SimulatedEventSource::drag((column, row), &[]));
            self
        }

        /// Press at `from`, drag through `path`, release
        pub fn drag(mut self, from: (u16, u16), path: &[(u16, u16)]) -> Self {
            self.events.extend(SimulatedEventSource::drag(from, path));
            self
        }

        pub fn scroll_down(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::mouse_event(
                MouseEventKind::ScrollDown,
                column,
                row,
            ));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}
