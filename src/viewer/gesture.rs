//! Touch gesture interpreter
//!
//! Turns raw touch sequences into session commands:
//! - one finger: swipe to turn pages, or pan while zoomed in
//! - two fingers: pinch to zoom
//! - two quick taps: toggle between fitted and zoomed-in views
//!
//! Touch positions are relative to the top-left corner of the container.
//! Once a second finger lands, nothing single-finger is interpreted until
//! every finger has lifted.

use std::time::Instant;

use super::config::ViewerConfig;
use super::geometry::{Offset, Point};
use super::session::{Command, Effect, ViewerSession};

/// One finger on the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A touch event as delivered by the platform
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Fingers still on the surface after this event
    pub touches: Vec<TouchPoint>,
    /// Fingers that changed in this event (the lifted ones, on `End`)
    pub changed: Vec<TouchPoint>,
    pub at: Instant,
}

impl TouchEvent {
    pub fn start(touches: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Start,
            changed: touches.clone(),
            touches,
            at,
        }
    }

    pub fn moved(touches: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Move,
            changed: touches.clone(),
            touches,
            at,
        }
    }

    pub fn end(remaining: Vec<TouchPoint>, lifted: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::End,
            touches: remaining,
            changed: lifted,
            at,
        }
    }

    pub fn cancel(at: Instant) -> Self {
        Self {
            phase: TouchPhase::Cancel,
            touches: Vec::new(),
            changed: Vec::new(),
            at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved right to left
    Left,
    /// Finger moved left to right
    Right,
}

/// What a touch event was recognised as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Swipe(SwipeDirection),
    Pan,
    Pinch,
    Tap,
    DoubleTap,
}

/// Result of feeding one event to the interpreter
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub gesture: Option<Gesture>,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }

    fn recognised(gesture: Gesture, effects: Vec<Effect>) -> Self {
        Self {
            gesture: Some(gesture),
            effects,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SingleTouch {
    id: u64,
    start: Point,
    last: Point,
    started_at: Instant,
    start_offset: Offset,
    /// Zoomed in at touch-start: the finger drags content instead of swiping
    panning: bool,
}

#[derive(Clone, Copy, Debug)]
struct PinchTouch {
    ids: (u64, u64),
    start_distance: f32,
    start_scale: f32,
    announced_distance: f32,
}

/// Per-sequence state, created on touch-start and consumed on touch-end
#[derive(Clone, Copy, Debug, Default)]
enum GestureContext {
    #[default]
    Idle,
    Single(SingleTouch),
    Pinch(PinchTouch),
    /// A multi-finger sequence is winding down
    Suppressed,
}

#[derive(Clone, Copy, Debug)]
struct Tap {
    position: Point,
    at: Instant,
}

/// Classifies touch sequences and applies them to a [`ViewerSession`]
#[derive(Debug, Default)]
pub struct GestureInterpreter {
    context: GestureContext,
    last_tap: Option<Tap>,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a touch sequence is in progress
    pub fn is_tracking(&self) -> bool {
        !matches!(self.context, GestureContext::Idle)
    }

    /// Forget any in-flight sequence and pending tap
    pub fn reset(&mut self) {
        self.context = GestureContext::Idle;
        self.last_tap = None;
    }

    pub fn handle(&mut self, event: &TouchEvent, session: &mut ViewerSession) -> Outcome {
        let config = session.config().clone();
        match event.phase {
            TouchPhase::Start => self.on_start(event, session),
            TouchPhase::Move => self.on_move(event, session, &config),
            TouchPhase::End => self.on_end(event, session, &config),
            TouchPhase::Cancel => {
                self.reset();
                Outcome::none()
            }
        }
    }

    fn on_start(&mut self, event: &TouchEvent, session: &ViewerSession) -> Outcome {
        match (event.touches.as_slice(), self.context) {
            ([finger], GestureContext::Idle | GestureContext::Single(_)) => {
                // A lone finger landing while another is tracked means the
                // earlier release was lost; start over from this one
                if let GestureContext::Single(stale) = self.context {
                    log::debug!("touch {} never lifted, restarting with {}", stale.id, finger.id);
                }
                self.context = GestureContext::Single(SingleTouch {
                    id: finger.id,
                    start: finger.position,
                    last: finger.position,
                    started_at: event.at,
                    start_offset: session.offset(),
                    panning: session.is_zoomed_in(),
                });
            }
            ([first, second, ..], _) => {
                let distance = first.position.distance_to(second.position);
                self.context = GestureContext::Pinch(PinchTouch {
                    ids: (first.id, second.id),
                    start_distance: distance,
                    start_scale: session.scale(),
                    announced_distance: distance,
                });
                self.last_tap = None;
            }
            _ => {}
        }
        Outcome::none()
    }

    fn on_move(
        &mut self,
        event: &TouchEvent,
        session: &mut ViewerSession,
        config: &ViewerConfig,
    ) -> Outcome {
        match &mut self.context {
            GestureContext::Single(single) => {
                let Some(finger) = event.touches.iter().find(|t| t.id == single.id) else {
                    return Outcome::none();
                };
                single.last = finger.position;
                if !single.panning {
                    return Outcome::none();
                }
                let target = single.start_offset.translated(
                    single.last.x - single.start.x,
                    single.last.y - single.start.y,
                );
                let effects = session.apply(Command::PanTo(target));
                Outcome::recognised(Gesture::Pan, effects)
            }

            GestureContext::Pinch(pinch) => {
                let Some(distance) = pinch_distance(&event.touches, pinch.ids) else {
                    return Outcome::none();
                };
                if pinch.start_distance <= f32::EPSILON {
                    return Outcome::none();
                }
                let scale = pinch.start_scale * (distance / pinch.start_distance);
                let mut effects = session.apply(Command::SetScale(scale));
                if (distance - pinch.announced_distance).abs() > config.pinch_sensitivity {
                    pinch.announced_distance = distance;
                } else {
                    effects.retain(|e| *e != Effect::ShowZoomIndicator);
                }
                Outcome::recognised(Gesture::Pinch, effects)
            }

            GestureContext::Idle | GestureContext::Suppressed => Outcome::none(),
        }
    }

    fn on_end(
        &mut self,
        event: &TouchEvent,
        session: &mut ViewerSession,
        config: &ViewerConfig,
    ) -> Outcome {
        if !event.touches.is_empty() {
            // Some fingers remain; a pinch that loses a finger stays inert
            if matches!(self.context, GestureContext::Pinch(_)) {
                self.context = GestureContext::Suppressed;
            }
            return Outcome::none();
        }

        let context = std::mem::take(&mut self.context);
        let GestureContext::Single(single) = context else {
            return Outcome::none();
        };

        let end = event
            .changed
            .iter()
            .find(|t| t.id == single.id)
            .map_or(single.last, |t| t.position);
        let dx = end.x - single.start.x;
        let dy = end.y - single.start.y;
        let elapsed = event.at.saturating_duration_since(single.started_at);
        let quick = elapsed <= config.swipe_max_duration();

        if !single.panning && quick && dx.abs() > config.swipe_threshold && dx.abs() > dy.abs() {
            self.last_tap = None;
            let (direction, command) = if dx > 0.0 {
                (SwipeDirection::Right, Command::PrevPage)
            } else {
                (SwipeDirection::Left, Command::NextPage)
            };
            log::debug!("swipe {direction:?} after {elapsed:?}");
            return Outcome::recognised(Gesture::Swipe(direction), session.apply(command));
        }

        if quick && single.start.distance_to(end) < config.tap_slop {
            return self.on_tap(end, event.at, session, config);
        }

        if single.panning {
            return Outcome::recognised(Gesture::Pan, vec![]);
        }
        self.last_tap = None;
        Outcome::none()
    }

    fn on_tap(
        &mut self,
        position: Point,
        at: Instant,
        session: &mut ViewerSession,
        config: &ViewerConfig,
    ) -> Outcome {
        let is_double = self.last_tap.is_some_and(|prev| {
            at.saturating_duration_since(prev.at) <= config.double_tap_window()
                && prev.position.distance_to(position) <= config.double_tap_radius
        });

        if !is_double {
            self.last_tap = Some(Tap { position, at });
            return Outcome::recognised(Gesture::Tap, vec![]);
        }

        self.last_tap = None;
        let effects = if (session.scale() - 1.0).abs() > f32::EPSILON {
            session.apply(Command::ResetZoom)
        } else {
            zoom_towards(session, position, config.zoomed_scale)
        };
        Outcome::recognised(Gesture::DoubleTap, effects)
    }
}

/// Zoom in keeping the content under `focus` in place
fn zoom_towards(session: &mut ViewerSession, focus: Point, scale: f32) -> Vec<Effect> {
    let mut effects = session.apply(Command::SetScale(scale));
    let center = session.bounds().container.center();
    let factor = 1.0 - session.scale();
    let offset = Offset::new((focus.x - center.x) * factor, (focus.y - center.y) * factor);
    effects.extend(session.apply(Command::PanTo(offset)));
    effects
}

fn pinch_distance(touches: &[TouchPoint], ids: (u64, u64)) -> Option<f32> {
    let first = touches.iter().find(|t| t.id == ids.0)?;
    let second = touches.iter().find(|t| t.id == ids.1)?;
    Some(first.position.distance_to(second.position))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::viewer::document::{Document, DocumentKind};
    use crate::viewer::geometry::Size;

    fn session(pages: usize) -> ViewerSession {
        let doc = Document::new("deck.pdf", "Deck", DocumentKind::Document);
        let mut session =
            ViewerSession::open(doc, ViewerConfig::default(), Size::new(400.0, 300.0));
        let _ = session.apply(Command::SetPageCount(pages));
        session
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    /// Drive a single-finger drag from `from` to `to` over `millis`
    fn drag(
        interpreter: &mut GestureInterpreter,
        session: &mut ViewerSession,
        from: (f32, f32),
        to: (f32, f32),
        t0: Instant,
        millis: u64,
    ) -> Outcome {
        let start = TouchPoint::new(1, from.0, from.1);
        let end = TouchPoint::new(1, to.0, to.1);
        interpreter.handle(&TouchEvent::start(vec![start], t0), session);
        interpreter.handle(&TouchEvent::moved(vec![end], ms(t0, millis / 2)), session);
        interpreter.handle(&TouchEvent::end(vec![], vec![end], ms(t0, millis)), session)
    }

    fn tap(
        interpreter: &mut GestureInterpreter,
        session: &mut ViewerSession,
        at: (f32, f32),
        t: Instant,
    ) -> Outcome {
        let finger = TouchPoint::new(7, at.0, at.1);
        interpreter.handle(&TouchEvent::start(vec![finger], t), session);
        interpreter.handle(&TouchEvent::end(vec![], vec![finger], ms(t, 40)), session)
    }

    #[test]
    fn leftward_swipe_advances_page() {
        let mut s = session(5);
        let mut gi = GestureInterpreter::new();
        let outcome = drag(&mut gi, &mut s, (200.0, 100.0), (160.0, 105.0), Instant::now(), 150);
        assert_eq!(outcome.gesture, Some(Gesture::Swipe(SwipeDirection::Left)));
        assert_eq!(s.page(), 2);
        assert!(outcome.effects.contains(&Effect::ShowPageIndicator));
        assert!(!gi.is_tracking());
    }

    #[test]
    fn rightward_swipe_goes_back() {
        let mut s = session(5);
        let _ = s.apply(Command::GoToPage(3));
        let mut gi = GestureInterpreter::new();
        drag(&mut gi, &mut s, (100.0, 100.0), (140.0, 100.0), Instant::now(), 150);
        assert_eq!(s.page(), 2);
    }

    #[test]
    fn slow_or_short_or_vertical_drag_is_not_a_swipe() {
        let mut s = session(5);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();

        drag(&mut gi, &mut s, (200.0, 100.0), (160.0, 100.0), t0, 450);
        assert_eq!(s.page(), 1);

        drag(&mut gi, &mut s, (200.0, 100.0), (180.0, 100.0), ms(t0, 1000), 100);
        assert_eq!(s.page(), 1);

        drag(&mut gi, &mut s, (200.0, 100.0), (160.0, 20.0), ms(t0, 2000), 100);
        assert_eq!(s.page(), 1);
    }

    #[test]
    fn same_swipe_pans_when_zoomed() {
        let mut s = session(5);
        let _ = s.apply(Command::SetScale(2.0));
        let mut gi = GestureInterpreter::new();
        let outcome = drag(&mut gi, &mut s, (200.0, 100.0), (160.0, 100.0), Instant::now(), 150);
        assert_eq!(outcome.gesture, Some(Gesture::Pan));
        assert_eq!(s.page(), 1);
        assert_eq!(s.offset(), Offset::new(-40.0, 0.0));
    }

    #[test]
    fn pan_is_clamped_and_resumes_from_previous_offset() {
        let mut s = session(1);
        let _ = s.apply(Command::SetScale(2.0));
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();

        drag(&mut gi, &mut s, (0.0, 0.0), (1000.0, 0.0), t0, 800);
        assert_eq!(s.offset(), Offset::new(200.0, 0.0));

        drag(&mut gi, &mut s, (300.0, 150.0), (250.0, 100.0), ms(t0, 2000), 800);
        assert_eq!(s.offset(), Offset::new(150.0, -50.0));
    }

    #[test]
    fn pinch_scales_by_distance_ratio() {
        let mut s = session(1);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        let start = vec![TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 200.0, 100.0)];
        gi.handle(&TouchEvent::start(start, t0), &mut s);

        let spread = vec![TouchPoint::new(1, 75.0, 100.0), TouchPoint::new(2, 225.0, 100.0)];
        let outcome = gi.handle(&TouchEvent::moved(spread, ms(t0, 50)), &mut s);
        assert_eq!(outcome.gesture, Some(Gesture::Pinch));
        assert!((s.scale() - 1.5).abs() < 1e-5);
        assert!(outcome.effects.contains(&Effect::ShowZoomIndicator));

        let huge = vec![TouchPoint::new(1, 0.0, 100.0), TouchPoint::new(2, 900.0, 100.0)];
        gi.handle(&TouchEvent::moved(huge, ms(t0, 100)), &mut s);
        assert_eq!(s.scale(), 3.0);
    }

    #[test]
    fn pinch_announces_only_perceptible_changes() {
        let mut s = session(1);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        gi.handle(
            &TouchEvent::start(
                vec![TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 200.0, 100.0)],
                t0,
            ),
            &mut s,
        );
        let nudge = vec![TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 203.0, 100.0)];
        let outcome = gi.handle(&TouchEvent::moved(nudge, ms(t0, 20)), &mut s);
        assert!(!outcome.effects.contains(&Effect::ShowZoomIndicator));
        assert!((s.scale() - 1.03).abs() < 1e-5);
    }

    #[test]
    fn lifting_one_pinch_finger_suppresses_single_finger_gestures() {
        let mut s = session(5);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        let a = TouchPoint::new(1, 100.0, 100.0);
        let b = TouchPoint::new(2, 200.0, 100.0);
        gi.handle(&TouchEvent::start(vec![a, b], t0), &mut s);
        gi.handle(&TouchEvent::end(vec![a], vec![b], ms(t0, 50)), &mut s);

        // Remaining finger sweeps left fast: would be a swipe on its own
        let swept = TouchPoint::new(1, 20.0, 100.0);
        gi.handle(&TouchEvent::moved(vec![swept], ms(t0, 80)), &mut s);
        let outcome = gi.handle(&TouchEvent::end(vec![], vec![swept], ms(t0, 120)), &mut s);
        assert_eq!(outcome.gesture, None);
        assert_eq!(s.page(), 1);
        assert!(!gi.is_tracking());
    }

    #[test]
    fn double_tap_zooms_in_then_resets() {
        let mut s = session(1);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();

        assert_eq!(tap(&mut gi, &mut s, (200.0, 150.0), t0).gesture, Some(Gesture::Tap));
        let outcome = tap(&mut gi, &mut s, (202.0, 151.0), ms(t0, 200));
        assert_eq!(outcome.gesture, Some(Gesture::DoubleTap));
        assert_eq!(s.scale(), 2.0);

        tap(&mut gi, &mut s, (100.0, 100.0), ms(t0, 1000));
        tap(&mut gi, &mut s, (100.0, 100.0), ms(t0, 1200));
        assert_eq!(s.scale(), 1.0);
        assert_eq!(s.offset(), Offset::ZERO);
    }

    #[test]
    fn double_tap_keeps_tapped_point_in_place() {
        let mut s = session(1);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        // 50 units right of and 30 above the container center (200, 150)
        tap(&mut gi, &mut s, (250.0, 120.0), t0);
        tap(&mut gi, &mut s, (250.0, 120.0), ms(t0, 150));
        assert_eq!(s.offset(), Offset::new(-50.0, 30.0));
    }

    #[test]
    fn double_tap_from_reduced_scale_resets_to_fit() {
        let mut s = session(1);
        let _ = s.apply(Command::SetScale(0.5));
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        tap(&mut gi, &mut s, (10.0, 10.0), t0);
        tap(&mut gi, &mut s, (10.0, 10.0), ms(t0, 100));
        assert_eq!(s.scale(), 1.0);
    }

    #[test]
    fn taps_too_far_apart_are_not_a_double_tap() {
        let mut s = session(1);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();

        tap(&mut gi, &mut s, (50.0, 50.0), t0);
        tap(&mut gi, &mut s, (50.0, 50.0), ms(t0, 700));
        assert_eq!(s.scale(), 1.0);

        tap(&mut gi, &mut s, (50.0, 50.0), ms(t0, 2000));
        tap(&mut gi, &mut s, (150.0, 50.0), ms(t0, 2100));
        assert_eq!(s.scale(), 1.0);
    }

    #[test]
    fn new_finger_after_lost_release_starts_fresh_sequence() {
        let mut s = session(5);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        gi.handle(
            &TouchEvent::start(vec![TouchPoint::new(1, 300.0, 100.0)], t0),
            &mut s,
        );

        let t1 = ms(t0, 5000);
        let start = TouchPoint::new(2, 200.0, 100.0);
        let end = TouchPoint::new(2, 150.0, 100.0);
        gi.handle(&TouchEvent::start(vec![start], t1), &mut s);
        gi.handle(&TouchEvent::moved(vec![end], ms(t1, 50)), &mut s);
        let outcome = gi.handle(&TouchEvent::end(vec![], vec![end], ms(t1, 100)), &mut s);

        assert_eq!(outcome.gesture, Some(Gesture::Swipe(SwipeDirection::Left)));
        assert_eq!(s.page(), 2);
        assert!(!gi.is_tracking());
    }

    #[test]
    fn cancel_discards_the_sequence() {
        let mut s = session(5);
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();
        gi.handle(
            &TouchEvent::start(vec![TouchPoint::new(1, 200.0, 100.0)], t0),
            &mut s,
        );
        gi.handle(&TouchEvent::cancel(ms(t0, 50)), &mut s);
        let outcome = gi.handle(
            &TouchEvent::end(vec![], vec![TouchPoint::new(1, 100.0, 100.0)], ms(t0, 100)),
            &mut s,
        );
        assert_eq!(outcome, Outcome::default());
        assert_eq!(s.page(), 1);
    }
}
