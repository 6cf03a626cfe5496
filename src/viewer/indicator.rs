//! Transient page and zoom indicators
//!
//! An indicator becomes visible when triggered and hides itself a fixed
//! delay after the most recent trigger. Re-triggering moves the deadline,
//! so a burst of changes keeps it on screen without flicker.

use std::time::{Duration, Instant};

use super::session::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Page,
    Zoom,
}

/// Single-shot, restartable visibility timer
#[derive(Debug, Clone)]
pub struct TransientIndicator {
    delay: Duration,
    expires_at: Option<Instant>,
}

impl TransientIndicator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            expires_at: None,
        }
    }

    /// Show the indicator, replacing any pending hide
    pub fn trigger(&mut self, now: Instant) {
        self.expires_at = Some(now + self.delay);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now < deadline)
    }

    pub fn hide(&mut self) {
        self.expires_at = None;
    }

    /// Pending hide deadline, if the indicator is still armed
    pub fn deadline(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Drop an elapsed deadline; returns true if the indicator just hid
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.expires_at = None;
                true
            }
            _ => false,
        }
    }
}

/// The viewer's pair of indicators
#[derive(Debug, Clone)]
pub struct Indicators {
    page: TransientIndicator,
    zoom: TransientIndicator,
}

impl Indicators {
    pub fn new(delay: Duration) -> Self {
        Self {
            page: TransientIndicator::new(delay),
            zoom: TransientIndicator::new(delay),
        }
    }

    fn get_mut(&mut self, kind: IndicatorKind) -> &mut TransientIndicator {
        match kind {
            IndicatorKind::Page => &mut self.page,
            IndicatorKind::Zoom => &mut self.zoom,
        }
    }

    pub fn get(&self, kind: IndicatorKind) -> &TransientIndicator {
        match kind {
            IndicatorKind::Page => &self.page,
            IndicatorKind::Zoom => &self.zoom,
        }
    }

    pub fn trigger(&mut self, kind: IndicatorKind, now: Instant) {
        self.get_mut(kind).trigger(now);
    }

    pub fn is_visible(&self, kind: IndicatorKind, now: Instant) -> bool {
        self.get(kind).is_visible(now)
    }

    /// Trigger whichever indicators the session effects ask for
    pub fn apply_effects(&mut self, effects: &[Effect], now: Instant) {
        for effect in effects {
            match effect {
                Effect::ShowPageIndicator => self.page.trigger(now),
                Effect::ShowZoomIndicator => self.zoom.trigger(now),
                Effect::RenderCurrentPage => {}
            }
        }
    }

    /// Expire elapsed indicators; returns true if anything changed on screen
    pub fn update(&mut self, now: Instant) -> bool {
        let page = self.page.expire(now);
        let zoom = self.zoom.expire(now);
        page || zoom
    }

    /// Earliest pending hide, used to size the event-loop poll timeout
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.page.deadline(), self.zoom.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn clear(&mut self) {
        self.page.hide();
        self.zoom.hide();
    }
}
