use super::*;
use crate::config::color::Color;
use crate::loader::source::{LoadFailurePolicy, MemorySource};
use crate::playback::events::{EventLog, PlaybackEvent};
use crate::strokes::model::RawStroke;
use crate::surface::svg::SvgBackend;

const GRID_LINES: usize = 2;

fn data(chars: &[&[f64]]) -> Vec<CharStrokes> {
    chars
        .iter()
        .map(|c| {
            c.iter()
                .map(|l| RawStroke::new(format!("M0,0 L{l},0")))
                .collect()
        })
        .collect()
}

fn engine_with(mut opts: Options, chars: &[&[f64]]) -> (Dmak<SvgBackend>, EventLog) {
    opts.skip_load = true;
    let log = EventLog::new();
    let mut e = Dmak::with_source(
        "test",
        opts,
        SvgBackend::new(),
        &MemorySource::new(),
        log.clone(),
    )
    .expect("valid options");
    e.deliver(data(chars));
    (e, log)
}

fn manual() -> Options {
    Options {
        autoplay: false,
        ..Options::default()
    }
}

fn stroke_paths(e: &Dmak<SvgBackend>, char_index: usize) -> usize {
    e.backend().elements_on(e.surfaces()[char_index]).len() - GRID_LINES
}

fn assert_handles_match_pointer(e: &Dmak<SvgBackend>) {
    for (i, s) in e.strokes().iter().enumerate() {
        assert_eq!(s.is_rendered(), i < e.pointer(), "stroke {i}");
        if let Some(h) = s.rendered {
            assert!(e.backend().contains(h.path), "stroke {i} element alive");
        }
    }
}

#[test]
fn autoplay_draws_at_accumulated_delays() {
    let (mut e, log) = engine_with(Options::default(), &[&[10.0, 20.0, 30.0]]);
    assert_eq!(log.events()[0], PlaybackEvent::Loaded(3));
    assert_eq!(e.pointer(), 1);
    assert_eq!(e.state(), EngineState::Playing);
    assert_eq!(e.pending_timers(TimerKind::Play), 2);

    e.advance_to(Millis(299.0));
    assert_eq!(e.pointer(), 1);
    e.advance_to(Millis(300.0));
    assert_eq!(e.pointer(), 2);
    e.advance_to(Millis(899.0));
    assert_eq!(e.pointer(), 2);
    e.advance_to(Millis(900.0));
    assert_eq!(e.pointer(), 3);
    assert_eq!(e.state(), EngineState::Idle);
    assert_eq!(log.drawn(), vec![0, 1, 2]);
    assert_handles_match_pointer(&e);
}

#[test]
fn second_render_while_busy_is_rejected() {
    let (mut e, _) = engine_with(Options::default(), &[&[10.0, 20.0]]);
    assert_eq!(e.render(None), Err(Rejected::Busy));
    assert_eq!(e.render_next_strokes(1), Err(Rejected::Busy));
    assert_eq!(e.erase(None), Err(Rejected::Busy));
    assert_eq!(e.pointer(), 1);
    e.run_until_idle();
    assert_eq!(e.pointer(), 2);
}

#[test]
fn render_past_the_end_is_rejected() {
    let (mut e, log) = engine_with(manual(), &[&[10.0, 20.0, 30.0]]);
    assert_eq!(
        e.render(Some(4)),
        Err(Rejected::OutOfRange {
            target: 4,
            count: 3
        })
    );
    assert_eq!(e.pointer(), 0);
    assert!(log.drawn().is_empty());
}

#[test]
fn render_before_load_is_rejected() {
    let opts = Options {
        skip_load: true,
        ..Options::default()
    };
    let mut e = Dmak::with_source("x", opts, SvgBackend::new(), &MemorySource::new(), ())
        .expect("valid options");
    assert!(!e.is_loaded());
    assert_eq!(e.render(None), Err(Rejected::NotLoaded));
    assert_eq!(e.erase(None).map(|_| ()), Err(Rejected::NotLoaded));
    assert_eq!(
        e.render_frame(0, "frame").map(|_| ()),
        Err(Rejected::NotLoaded)
    );
}

#[test]
fn erase_walks_down_and_settles_after_the_longest_retract() {
    let (mut e, log) = engine_with(Options::default(), &[&[10.0, 20.0, 30.0]]);
    e.run_until_idle();
    log.drain();
    let t0 = e.now();

    let done = e.erase(None).expect("erase accepted");
    assert_eq!(log.erased(), vec![2, 1, 0]);
    assert_eq!(e.pointer(), 0);
    assert_eq!(done.settles_at(), t0 + Millis(900.0));
    assert_eq!(e.state(), EngineState::Erasing);
    assert!(!e.is_settled(&done));

    e.advance_to(done.settles_at());
    assert!(e.is_settled(&done));
    assert_eq!(e.state(), EngineState::Idle);
    assert_eq!(e.pending_timers(TimerKind::Erasing), 0);
    assert_eq!(stroke_paths(&e, 0), 0);
    assert_handles_match_pointer(&e);
}

#[test]
fn erase_rejections_leave_state_alone() {
    let (mut e, _) = engine_with(manual(), &[&[10.0, 20.0, 30.0]]);
    assert_eq!(e.erase(None).map(|_| ()), Err(Rejected::NothingToErase));
    e.render(None).expect("render accepted");
    e.run_until_idle();
    assert_eq!(e.erase(Some(3)).map(|_| ()), Err(Rejected::NothingToErase));
    assert_eq!(e.erase(Some(5)).map(|_| ()), Err(Rejected::NothingToErase));
    assert_eq!(e.pointer(), 3);
}

#[test]
fn erase_last_strokes_is_a_relative_erase() {
    let (mut e, log) = engine_with(manual(), &[&[10.0, 20.0, 30.0]]);
    e.render(None).expect("render accepted");
    e.run_until_idle();
    e.erase_last_strokes(1).expect("erase accepted");
    assert_eq!(e.pointer(), 2);
    assert_eq!(log.erased(), vec![2]);

    e.erase_last_strokes(10).expect("erase accepted");
    assert_eq!(e.pointer(), 0);
    assert_eq!(log.erased(), vec![2, 1, 0]);
}

#[test]
fn render_next_strokes_is_a_relative_render() {
    let (mut e, log) = engine_with(manual(), &[&[10.0, 20.0, 30.0]]);
    e.render_next_strokes(2).expect("render accepted");
    e.run_until_idle();
    assert_eq!(e.pointer(), 2);
    e.render_next_strokes(1).expect("render accepted");
    assert_eq!(e.pointer(), 3);
    assert_eq!(log.drawn(), vec![0, 1, 2]);
    assert!(matches!(
        e.render_next_strokes(1),
        Err(Rejected::OutOfRange { target: 4, .. })
    ));
}

#[test]
fn pause_freezes_the_pointer() {
    let (mut e, _) = engine_with(Options::default(), &[&[10.0, 20.0, 30.0]]);
    e.pause();
    e.pause();
    assert_eq!(e.pending_timers(TimerKind::Play), 0);
    assert_eq!(e.state(), EngineState::Idle);
    e.run_until_idle();
    assert_eq!(e.pointer(), 1);

    e.render(None).expect("render resumes");
    e.run_until_idle();
    assert_eq!(e.pointer(), 3);
}

#[test]
fn render_finalises_outstanding_retracts() {
    let (mut e, _) = engine_with(manual(), &[&[10.0, 20.0]]);
    e.render(None).expect("render accepted");
    e.run_until_idle();
    e.erase(None).expect("erase accepted");
    e.advance(Millis(100.0));
    assert_eq!(stroke_paths(&e, 0), 2);

    e.render(None).expect("render accepted");
    assert_eq!(e.pending_timers(TimerKind::Erasing), 0);
    assert_eq!(stroke_paths(&e, 0), 1);
    assert_handles_match_pointer(&e);

    e.run_until_idle();
    assert_eq!(stroke_paths(&e, 0), 2);
    assert_handles_match_pointer(&e);
}

#[test]
fn restart_renders_once_the_erase_settles() {
    let (mut e, log) = engine_with(manual(), &[&[10.0, 20.0]]);
    e.render(None).expect("render accepted");
    e.run_until_idle();
    let t0 = e.now();
    log.drain();

    e.restart().expect("restart accepted");
    assert_eq!(e.pointer(), 0);
    assert_eq!(e.pending_timers(TimerKind::Control), 1);
    e.advance_to(t0 + Millis(599.0));
    assert_eq!(e.pointer(), 0);
    e.advance_to(t0 + Millis(600.0));
    assert_eq!(e.pointer(), 1);
    e.run_until_idle();
    assert_eq!(e.pointer(), 2);
    assert_eq!(log.erased(), vec![1, 0]);
    assert_eq!(log.drawn(), vec![0, 1]);
    assert_handles_match_pointer(&e);
}

#[test]
fn restart_from_the_start_renders_immediately() {
    let (mut e, log) = engine_with(manual(), &[&[10.0, 20.0]]);
    e.restart().expect("restart accepted");
    assert_eq!(e.pointer(), 1);
    assert_eq!(log.drawn(), vec![0]);
    assert_eq!(e.pending_timers(TimerKind::Control), 0);
}

#[test]
fn restart_interrupts_a_running_render() {
    let (mut e, _) = engine_with(Options::default(), &[&[10.0, 20.0, 30.0]]);
    e.advance_to(Millis(300.0));
    assert_eq!(e.pointer(), 2);
    e.restart().expect("restart accepted");
    assert_eq!(e.pointer(), 0);
    e.run_until_idle();
    assert_eq!(e.pointer(), 3);
}

#[test]
fn destroy_during_restart_cancels_the_deferred_render() {
    let (mut e, log) = engine_with(manual(), &[&[10.0, 20.0]]);
    e.render(None).expect("render accepted");
    e.run_until_idle();
    e.restart().expect("restart accepted");
    e.destroy();
    log.drain();

    assert_eq!(e.next_due(), None);
    e.run_until_idle();
    assert!(log.events().is_empty());
    assert_eq!(e.pointer(), 0);
}

#[test]
fn destroy_releases_everything_and_is_idempotent() {
    let (mut e, log) = engine_with(Options::default(), &[&[10.0, 20.0], &[30.0]]);
    let frame = e.render_frame(0, "thumb").expect("frame painted");
    assert_eq!(frame.surfaces().len(), 2);

    e.destroy();
    e.destroy();
    assert_eq!(e.state(), EngineState::Destroyed);
    for kind in [
        TimerKind::Play,
        TimerKind::Erasing,
        TimerKind::Drawing,
        TimerKind::Control,
    ] {
        assert_eq!(e.pending_timers(kind), 0, "{kind:?}");
    }
    assert_eq!(e.next_due(), None);
    assert_eq!(e.backend().live_surfaces(), 0);
    assert!(e.surfaces().is_empty());
    assert!(e.strokes().iter().all(|s| !s.is_rendered()));

    log.drain();
    assert_eq!(e.render(None), Err(Rejected::Destroyed));
    assert_eq!(e.erase(None).map(|_| ()), Err(Rejected::Destroyed));
    assert_eq!(e.restart(), Err(Rejected::Destroyed));
    assert_eq!(
        e.render_frame(0, "thumb").map(|_| ()),
        Err(Rejected::Destroyed)
    );
    e.pause();
    e.deliver(data(&[&[10.0]]));
    e.attach_surfaces(vec![SurfaceId(99)]);
    e.release_frame(frame);
    e.run_until_idle();
    assert!(log.events().is_empty());
    assert!(e.surfaces().is_empty());
}

#[test]
fn zero_step_draws_everything_at_once() {
    let opts = Options {
        step: 0.0,
        ..Options::default()
    };
    let (e, log) = engine_with(opts, &[&[10.0, 20.0, 30.0]]);
    assert_eq!(e.pointer(), 3);
    assert_eq!(log.drawn(), vec![0, 1, 2]);
    assert_eq!(e.pending_timers(TimerKind::Play), 0);
    assert_eq!(e.state(), EngineState::Idle);
}

#[test]
fn static_drawing_ignores_durations() {
    let mut opts = Options::default();
    opts.stroke.animated.drawing = false;
    let (e, log) = engine_with(opts, &[&[10.0, 20.0, 30.0]]);
    assert_eq!(e.pointer(), 3);
    assert_eq!(log.drawn(), vec![0, 1, 2]);
    assert_eq!(e.next_due(), None);
}

#[test]
fn render_at_fast_forwards_without_autoplay() {
    let opts = Options {
        autoplay: false,
        render_at: Some(2),
        ..Options::default()
    };
    let (mut e, _) = engine_with(opts, &[&[10.0, 20.0, 30.0]]);
    e.run_until_idle();
    assert_eq!(e.pointer(), 2);
}

#[test]
fn manual_engines_wait_for_render() {
    let (e, log) = engine_with(manual(), &[&[10.0]]);
    assert_eq!(e.pointer(), 0);
    assert_eq!(log.events(), vec![PlaybackEvent::Loaded(1)]);
}

#[test]
fn strokes_settle_to_their_resting_colour() {
    let (mut e, _) = engine_with(Options::default(), &[&[10.0]]);
    let el = e.strokes()[0].rendered.map(|h| h.path).expect("drawn");
    assert_eq!(e.pending_timers(TimerKind::Drawing), 1);
    e.run_until_idle();
    assert_eq!(e.pending_timers(TimerKind::Drawing), 0);
    e.advance(Millis(400.0));
    assert_eq!(
        e.backend_mut().style(el).and_then(|s| s.stroke),
        Some(Color::rgb(0x2c, 0x2c, 0x2c))
    );
}

#[test]
fn strokes_paint_on_their_own_character_surface() {
    let (mut e, _) = engine_with(manual(), &[&[10.0], &[], &[20.0, 30.0]]);
    assert_eq!(e.surfaces().len(), 3);
    e.render(None).expect("render accepted");
    e.run_until_idle();
    assert_eq!(stroke_paths(&e, 0), 1);
    assert_eq!(stroke_paths(&e, 1), 0);
    assert_eq!(stroke_paths(&e, 2), 2);
}

#[test]
fn render_frame_is_a_side_channel() {
    let (mut e, _) = engine_with(manual(), &[&[10.0, 20.0], &[30.0]]);
    let frame = e.render_frame(1, "thumb").expect("frame painted");
    assert_eq!(e.pointer(), 0);
    assert_eq!(e.next_due(), None);
    assert_eq!(e.backend().surfaces_in("thumb"), frame.surfaces().to_vec());

    let first = frame.surfaces()[0];
    let els = e.backend().elements_on(first);
    // Grid, two strokes, arrow.
    assert_eq!(els.len(), GRID_LINES + 3);
    let highlight = e.options().series_active_style.stroke;
    let resting = Color::rgb(0x2c, 0x2c, 0x2c);
    let backend = e.backend_mut();
    assert_eq!(backend.style(els[2]).and_then(|s| s.stroke), Some(resting));
    assert_eq!(backend.style(els[3]).and_then(|s| s.stroke), Some(highlight));
    assert_eq!(backend.elements_on(frame.surfaces()[1]).len(), GRID_LINES);

    assert!(matches!(
        e.render_frame(3, "thumb"),
        Err(Rejected::OutOfRange {
            target: 3,
            count: 3
        })
    ));

    e.release_frame(frame);
    assert!(e.backend().surfaces_in("thumb").is_empty());
    assert_eq!(e.backend().live_surfaces(), 2);
}

#[test]
fn skip_papers_uses_attached_surfaces() {
    let opts = Options {
        skip_papers: true,
        autoplay: false,
        ..Options::default()
    };
    let (mut e, log) = engine_with(opts, &[&[10.0]]);
    assert!(e.surfaces().is_empty());
    assert_eq!(e.backend().live_surfaces(), 0);

    let s = e.backend_mut().create_surface("host", 109, 109);
    e.attach_surfaces(vec![s]);
    e.render(None).expect("render accepted");
    assert_eq!(e.backend().elements_on(s).len(), 1);
    assert_eq!(log.drawn(), vec![0]);
}

#[test]
fn missing_surfaces_still_advance_the_pointer() {
    let opts = Options {
        skip_papers: true,
        autoplay: false,
        ..Options::default()
    };
    let (mut e, log) = engine_with(opts, &[&[10.0]]);
    e.render(None).expect("render accepted");
    assert_eq!(e.pointer(), 1);
    assert_eq!(log.drawn(), vec![0]);
    assert!(!e.strokes()[0].is_rendered());
}

#[test]
fn loads_through_the_stroke_source() {
    let mut source = MemorySource::new();
    source.insert('一', data(&[&[10.0]]).remove(0));
    source.insert('二', data(&[&[10.0, 20.0]]).remove(0));
    let log = EventLog::new();
    let e = Dmak::with_source(
        "一 二",
        manual(),
        SvgBackend::new(),
        &source,
        log.clone(),
    )
    .expect("valid options");
    assert!(e.is_loaded());
    let idx: Vec<usize> = e.strokes().iter().map(Stroke::char_index).collect();
    assert_eq!(idx, vec![0, 2, 2]);
    assert_eq!(e.surfaces().len(), 3);
    assert_eq!(log.events(), vec![PlaybackEvent::Loaded(3)]);
}

#[test]
fn load_failure_policies() {
    let source = MemorySource::new();
    let lenient = Dmak::with_source("一", manual(), SvgBackend::new(), &source, ())
        .expect("valid options");
    assert!(lenient.is_loaded());
    assert!(lenient.strokes().is_empty());
    assert_eq!(lenient.surfaces().len(), 1);

    let strict = Options {
        load_failure: LoadFailurePolicy::Abort,
        ..manual()
    };
    let aborted =
        Dmak::with_source("一", strict, SvgBackend::new(), &source, ()).expect("valid options");
    assert!(!aborted.is_loaded());
    assert_eq!(aborted.backend().live_surfaces(), 0);
}

#[test]
fn invalid_options_fail_construction() {
    let opts = Options {
        step: -1.0,
        ..Options::default()
    };
    assert!(Dmak::with_source("一", opts, SvgBackend::new(), &MemorySource::new(), ()).is_err());
}

#[test]
fn second_delivery_is_ignored() {
    let (mut e, log) = engine_with(manual(), &[&[10.0]]);
    e.deliver(data(&[&[10.0], &[20.0]]));
    assert_eq!(e.strokes().len(), 1);
    assert_eq!(log.events(), vec![PlaybackEvent::Loaded(1)]);
}

#[test]
fn non_finite_clock_targets_are_ignored() {
    let (mut e, _) = engine_with(Options::default(), &[&[10.0, 20.0]]);
    assert_eq!(e.pointer(), 1);

    e.advance_to(Millis(f64::NAN));
    e.advance_to(Millis(f64::INFINITY));
    assert_eq!(e.now(), Millis::ZERO);
    assert_eq!(e.pointer(), 1);

    e.advance(Millis(300.0));
    assert_eq!(e.pointer(), 2);
}
