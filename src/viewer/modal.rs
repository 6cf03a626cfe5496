//! The viewer: one document at a time, with its session, gestures,
//! loader and input capture bundled so they live and die together.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use super::backend::DocumentBackend;
use super::config::ViewerConfig;
use super::document::{Document, LoadState, PageSurface, ViewerError};
use super::gesture::{Gesture, GestureInterpreter, TouchEvent};
use super::geometry::Size;
use super::indicator::Indicators;
use super::loader::{DocumentLoader, LoadResponse};
use super::platform::{InputCapture, Platform};
use super::session::{Command, Effect, ViewerSession};

/// Open/close notifications for whoever hosts the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Opened { name: String },
    Closed { name: String },
}

pub type LifecycleHook = Box<dyn FnMut(&Lifecycle)>;

/// Snapshot of what the viewer is showing, for status lines
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerStatus {
    pub name: String,
    pub page: usize,
    pub page_count: Option<usize>,
    pub scale_percent: u32,
    pub loading: bool,
    /// Load failure, or a render failure of the current page
    pub error: Option<ViewerError>,
}

impl ViewerStatus {
    /// "3 / 12", or "1 / ?" while the page count is unknown
    pub fn page_label(&self) -> String {
        match self.page_count {
            Some(count) => format!("{} / {}", self.page, count),
            None => format!("{} / ?", self.page),
        }
    }
}

struct ActiveDocument {
    session: ViewerSession,
    gestures: GestureInterpreter,
    loader: DocumentLoader,
    load_state: LoadState,
    surface: Option<PageSurface>,
    page_errors: HashMap<usize, ViewerError>,
    _capture: Option<InputCapture>,
}

pub struct Viewer {
    config: ViewerConfig,
    backend: Arc<dyn DocumentBackend>,
    platform: Box<dyn Platform>,
    container: Size,
    indicators: Indicators,
    active: Option<ActiveDocument>,
    hooks: Vec<LifecycleHook>,
}

impl Viewer {
    pub fn new(
        config: ViewerConfig,
        backend: Arc<dyn DocumentBackend>,
        platform: Box<dyn Platform>,
    ) -> Self {
        let indicators = Indicators::new(config.indicator_delay());
        Self {
            config,
            backend,
            platform,
            container: Size::default(),
            indicators,
            active: None,
            hooks: Vec::new(),
        }
    }

    /// Register a hook called on every open and close
    pub fn on_lifecycle(&mut self, hook: impl FnMut(&Lifecycle) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    fn notify(&mut self, event: Lifecycle) {
        for hook in &mut self.hooks {
            hook(&event);
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Show `document`, replacing whatever was open
    pub fn open(&mut self, document: Document) {
        self.close();
        info!(
            "Opening {} ({})",
            document.source.display(),
            document.kind.label()
        );

        let capture = if self.platform.pointer_capable() {
            match self.platform.capture_input() {
                Ok(capture) => Some(capture),
                Err(e) => {
                    warn!("Pointer input unavailable: {e}");
                    None
                }
            }
        } else {
            None
        };

        let name = document.name.clone();
        let loader = DocumentLoader::spawn(document.clone(), self.backend.clone());
        self.active = Some(ActiveDocument {
            session: ViewerSession::open(document, self.config.clone(), self.container),
            gestures: GestureInterpreter::new(),
            loader,
            load_state: LoadState::Pending,
            surface: None,
            page_errors: HashMap::new(),
            _capture: capture,
        });
        self.indicators.clear();
        self.notify(Lifecycle::Opened { name });
    }

    /// Discard the session; leaves fullscreen like closing a modal would
    pub fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let name = active.session.document().name.clone();
        drop(active);
        self.indicators.clear();
        if self.platform.is_fullscreen() {
            if let Err(e) = self.platform.set_fullscreen(false) {
                warn!("Failed to leave fullscreen: {e}");
            }
        }
        debug!("Closed {name}");
        self.notify(Lifecycle::Closed { name });
    }

    pub fn session(&self) -> Option<&ViewerSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn load_state(&self) -> Option<&LoadState> {
        self.active.as_ref().map(|a| &a.load_state)
    }

    /// Rendered surface of the current page, once available
    pub fn surface(&self) -> Option<&PageSurface> {
        let active = self.active.as_ref()?;
        active
            .surface
            .as_ref()
            .filter(|s| s.page == active.session.page())
    }

    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn is_fullscreen(&self) -> bool {
        self.platform.is_fullscreen()
    }

    pub fn toggle_fullscreen(&mut self) -> io::Result<bool> {
        let target = !self.platform.is_fullscreen();
        self.platform.set_fullscreen(target)?;
        Ok(target)
    }

    /// Hosting area size changed (layout or terminal resize)
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        if let Some(active) = self.active.as_mut() {
            let _ = active.session.apply(Command::SetContainer(container));
        }
    }

    /// Apply a session command on behalf of keyboard or button input
    pub fn apply(&mut self, command: Command, now: Instant) -> Vec<Effect> {
        let Some(active) = self.active.as_mut() else {
            return vec![];
        };
        let effects = active.session.apply(command);
        self.route(&effects, now);
        effects
    }

    /// Feed a touch event; ignored when the platform has no pointer
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<Gesture> {
        if !self.platform.pointer_capable() {
            return None;
        }
        let active = self.active.as_mut()?;
        let outcome = active.gestures.handle(event, &mut active.session);
        self.route(&outcome.effects, event.at);
        outcome.gesture
    }

    fn route(&mut self, effects: &[Effect], now: Instant) {
        self.indicators.apply_effects(effects, now);
        if effects.contains(&Effect::RenderCurrentPage) {
            self.request_current_page();
        }
    }

    fn request_current_page(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.load_state.page_count().is_none() {
            return;
        }
        let page = active.session.page();
        // Surfaces carry the natural page size, so a zoom alone needs no new render
        let have = active.surface.as_ref().is_some_and(|s| s.page == page);
        if have || active.page_errors.contains_key(&page) || active.loader.is_page_pending(page) {
            return;
        }
        active.loader.request_page(page, active.session.scale());
    }

    /// Drain loader responses and expire indicators; true if the view changed
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.indicators.update(now);
        let Some(active) = self.active.as_mut() else {
            return changed;
        };

        let mut effects = Vec::new();
        for response in active.loader.poll() {
            changed = true;
            match response {
                LoadResponse::Opened { page_count } => {
                    debug!("{} has {page_count} pages", active.session.document().name);
                    active.load_state = LoadState::Ready { page_count };
                    effects.extend(active.session.apply(Command::SetPageCount(page_count)));
                }
                LoadResponse::Failed(error) => {
                    warn!("{error}");
                    active.load_state = LoadState::Failed(error);
                }
                LoadResponse::Page { surface, .. } => {
                    active.page_errors.remove(&surface.page);
                    if surface.page != active.session.page() {
                        debug!("Dropping late render of page {}", surface.page);
                        continue;
                    }
                    let _ = active.session.apply(Command::SetPageSize(surface.natural_size));
                    active.surface = Some(surface);
                }
                LoadResponse::PageFailed { error, .. } => {
                    if let ViewerError::RenderFailed { page, .. } = &error {
                        active.page_errors.insert(*page, error.clone());
                    }
                }
            }
        }
        self.route(&effects, now);
        // The shown page may have changed while its render was in flight
        self.request_current_page();
        changed
    }

    /// Earliest moment something on screen changes without input
    pub fn next_deadline(&self) -> Option<Instant> {
        self.indicators.next_deadline()
    }

    pub fn status(&self) -> Option<ViewerStatus> {
        let active = self.active.as_ref()?;
        let session = &active.session;
        let error = active
            .load_state
            .error()
            .or_else(|| active.page_errors.get(&session.page()))
            .cloned();
        Some(ViewerStatus {
            name: session.document().name.clone(),
            page: session.page(),
            page_count: session.page_count(),
            scale_percent: session.scale_percent(),
            loading: active.load_state.is_pending(),
            error,
        })
    }
}
