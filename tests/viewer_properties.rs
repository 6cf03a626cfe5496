use std::sync::Arc;
use std::time::{Duration, Instant};

use docshelf::test_utils::test_helpers::{StubBackend, wait_until};
use docshelf::viewer::{
    Command, Document, DocumentKind, Gesture, GestureInterpreter, HeadlessPlatform,
    IndicatorKind, Indicators, Offset, Size, TouchEvent, TouchPoint, Viewer, ViewerConfig,
    ViewerSession,
};

const CONTAINER: Size = Size {
    width: 400.0,
    height: 300.0,
};

fn session(pages: usize) -> ViewerSession {
    let doc = Document::new("guide.pdf", "Guide", DocumentKind::Document);
    let mut session = ViewerSession::open(doc, ViewerConfig::default(), CONTAINER);
    let _ = session.apply(Command::SetPageCount(pages));
    let _ = session.apply(Command::SetPageSize(Size::new(600.0, 800.0)));
    session
}

fn after(t: Instant, millis: u64) -> Instant {
    t + Duration::from_millis(millis)
}

#[test]
fn requested_page_is_clamped_to_document() {
    for pages in [1, 2, 7, 40] {
        let mut s = session(pages);
        for requested in [0, 1, 2, pages, pages + 1, 1000, usize::MAX] {
            let _ = s.apply(Command::GoToPage(requested));
            assert_eq!(s.page(), requested.clamp(1, pages), "{requested} of {pages}");
        }
    }
}

#[test]
fn requested_scale_is_clamped_to_configured_range() {
    let config = ViewerConfig::default();
    let mut s = session(3);
    for requested in [-2.0, 0.0, 0.1, 0.5, 0.75, 1.0, 2.5, 3.0, 3.5, 100.0] {
        let _ = s.apply(Command::SetScale(requested));
        assert_eq!(
            s.scale(),
            requested.clamp(config.min_scale, config.max_scale),
            "requested {requested}"
        );
    }
}

#[test]
fn pan_offset_never_leaves_content_bounds() {
    let mut s = session(1);
    for scale in [0.5_f32, 1.0, 1.5, 3.0] {
        let _ = s.apply(Command::SetScale(scale));
        for target in [-5000.0_f32, -40.0, 0.0, 40.0, 5000.0] {
            let _ = s.apply(Command::PanTo(Offset::new(target, -target)));
            let max = s.bounds().max_offset(s.scale());
            assert!(s.offset().x.abs() <= max.x + f32::EPSILON);
            assert!(s.offset().y.abs() <= max.y + f32::EPSILON);
        }
    }
}

#[test]
fn pinch_scales_by_distance_ratio() {
    let config = ViewerConfig::default();
    for (start_scale, from, to) in [(1.0_f32, 100.0_f32, 150.0_f32), (2.0, 200.0, 100.0), (1.0, 50.0, 400.0)] {
        let mut s = session(1);
        let _ = s.apply(Command::SetScale(start_scale));
        let mut gi = GestureInterpreter::new();
        let t0 = Instant::now();

        gi.handle(
            &TouchEvent::start(
                vec![TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, from, 0.0)],
                t0,
            ),
            &mut s,
        );
        let outcome = gi.handle(
            &TouchEvent::moved(
                vec![TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, to, 0.0)],
                after(t0, 50),
            ),
            &mut s,
        );
        assert_eq!(outcome.gesture, Some(Gesture::Pinch));
        let expected = (start_scale * to / from).clamp(config.min_scale, config.max_scale);
        assert!((s.scale() - expected).abs() < 1e-4, "{} vs {expected}", s.scale());
    }
}

#[test]
fn double_tap_toggles_zoom() {
    let config = ViewerConfig::default();
    let mut s = session(1);
    let mut gi = GestureInterpreter::new();
    let t0 = Instant::now();
    let center = (200.0, 150.0);

    let mut tap = |s: &mut ViewerSession, at: Instant| {
        let finger = TouchPoint::new(9, center.0, center.1);
        gi.handle(&TouchEvent::start(vec![finger], at), s);
        gi.handle(&TouchEvent::end(vec![], vec![finger], after(at, 30)), s)
    };

    tap(&mut s, t0);
    let outcome = tap(&mut s, after(t0, 150));
    assert_eq!(outcome.gesture, Some(Gesture::DoubleTap));
    assert_eq!(s.scale(), config.zoomed_scale);

    let _ = s.apply(Command::PanTo(Offset::new(50.0, 50.0)));
    tap(&mut s, after(t0, 1000));
    tap(&mut s, after(t0, 1150));
    assert_eq!(s.scale(), 1.0);
    assert_eq!(s.offset(), Offset::ZERO);
}

#[test]
fn swipe_turns_page_at_rest_and_pans_when_zoomed() {
    let t0 = Instant::now();
    let swipe = |gi: &mut GestureInterpreter, s: &mut ViewerSession, dx: f32, t: Instant| {
        let start = TouchPoint::new(1, 200.0, 150.0);
        let end = TouchPoint::new(1, 200.0 + dx, 150.0);
        gi.handle(&TouchEvent::start(vec![start], t), s);
        gi.handle(&TouchEvent::moved(vec![end], after(t, 75)), s);
        gi.handle(&TouchEvent::end(vec![], vec![end], after(t, 150)), s)
    };

    let mut s = session(5);
    let _ = s.apply(Command::GoToPage(3));
    let mut gi = GestureInterpreter::new();
    swipe(&mut gi, &mut s, -40.0, t0);
    assert_eq!(s.page(), 4);
    swipe(&mut gi, &mut s, 40.0, after(t0, 1000));
    assert_eq!(s.page(), 3);

    let _ = s.apply(Command::SetScale(2.0));
    let outcome = swipe(&mut gi, &mut s, -40.0, after(t0, 2000));
    assert_eq!(s.page(), 3);
    assert_eq!(outcome.gesture, Some(Gesture::Pan));
    // Dragged 40 units left, stopped at the content edge
    assert_eq!(s.offset().x, -s.bounds().max_offset(2.0).x);
    assert!(s.offset().x < 0.0);
}

#[test]
fn opening_a_document_starts_fresh() {
    let mut viewer = Viewer::new(
        ViewerConfig::default(),
        Arc::new(StubBackend { pages: 9 }),
        Box::new(HeadlessPlatform::new(true)),
    );
    viewer.set_container(CONTAINER);
    viewer.open(Document::new("a.pdf", "A", DocumentKind::Document));
    wait_until(
        &mut viewer,
        |v| {
            v.tick(Instant::now());
        },
        |v| v.status().is_some_and(|s| s.page_count == Some(9)),
    );

    let now = Instant::now();
    viewer.apply(Command::GoToPage(6), now);
    viewer.apply(Command::SetScale(2.5), now);
    viewer.apply(Command::PanTo(Offset::new(80.0, -60.0)), now);

    viewer.open(Document::new("b.pdf", "B", DocumentKind::Document));
    let session = viewer.session().unwrap();
    assert_eq!(session.page(), 1);
    assert_eq!(session.scale(), 1.0);
    assert_eq!(session.offset(), Offset::ZERO);
    assert!(!viewer.indicators().is_visible(IndicatorKind::Zoom, now));
}

#[test]
fn zoom_indicator_hides_after_last_trigger() {
    let delay = ViewerConfig::default().indicator_delay();
    let mut indicators = Indicators::new(delay);
    let t0 = Instant::now();

    indicators.trigger(IndicatorKind::Zoom, t0);
    indicators.trigger(IndicatorKind::Zoom, after(t0, 1000));

    assert!(!indicators.update(after(t0, 1600)));
    assert!(indicators.is_visible(IndicatorKind::Zoom, after(t0, 1600)));
    assert!(indicators.is_visible(IndicatorKind::Zoom, after(t0, 2499)));
    assert!(indicators.update(after(t0, 2500)));
    assert!(!indicators.is_visible(IndicatorKind::Zoom, after(t0, 2500)));
    assert!(!indicators.is_visible(IndicatorKind::Page, after(t0, 1000)));
}
