use super::*;

fn drain(tl: &mut Timeline<&'static str>, until: f64) -> Vec<&'static str> {
    let mut out = Vec::new();
    while let Some((_, task)) = tl.pop_due(Millis(until)) {
        out.push(task);
    }
    out
}

#[test]
fn fires_by_due_time_then_scheduling_order() {
    let mut tl = Timeline::new();
    tl.schedule(Millis(20.0), "c");
    tl.schedule(Millis(10.0), "a");
    tl.schedule(Millis(10.0), "b");
    tl.schedule(Millis(0.0), "first");
    assert_eq!(drain(&mut tl, 100.0), vec!["first", "a", "b", "c"]);
    assert_eq!(tl.now(), Millis(20.0));
}

#[test]
fn stops_at_the_horizon() {
    let mut tl = Timeline::new();
    tl.schedule(Millis(5.0), "early");
    tl.schedule(Millis(50.0), "late");
    assert_eq!(drain(&mut tl, 10.0), vec!["early"]);
    assert_eq!(tl.now(), Millis(5.0));
    assert_eq!(tl.next_due(), Some(Millis(50.0)));
}

#[test]
fn cancelled_tasks_never_fire() {
    let mut tl = Timeline::new();
    let a = tl.schedule(Millis(1.0), "a");
    tl.schedule(Millis(2.0), "b");
    assert_eq!(tl.cancel(a), Some("a"));
    assert_eq!(tl.cancel(a), None);
    assert_eq!(tl.next_due(), Some(Millis(2.0)));
    assert_eq!(drain(&mut tl, 10.0), vec!["b"]);
    assert_eq!(tl.next_due(), None);
}

#[test]
fn delays_are_relative_to_the_clock() {
    let mut tl = Timeline::new();
    tl.set_now(Millis(100.0));
    tl.schedule(Millis(-5.0), "now");
    tl.schedule(Millis(10.0), "later");
    assert_eq!(tl.next_due(), Some(Millis(100.0)));
    assert_eq!(drain(&mut tl, 105.0), vec!["now"]);
    tl.set_now(Millis(50.0));
    assert_eq!(tl.now(), Millis(100.0));
    tl.set_now(Millis(f64::NAN));
    tl.set_now(Millis(f64::INFINITY));
    assert_eq!(tl.now(), Millis(100.0));
}

#[test]
fn cancelled_heads_are_dropped_eagerly() {
    let mut tl = Timeline::new();
    let ids: Vec<_> = (0..100).map(|i| tl.schedule(Millis(f64::from(i)), "x")).collect();
    let keep = tl.schedule(Millis(500.0), "keep");
    for id in &ids {
        tl.cancel(*id);
    }
    assert_eq!(tl.queue.len(), 1);
    assert_eq!(tl.next_due(), Some(Millis(500.0)));

    // A cancelled entry behind the head is dropped once the head fires.
    let behind = tl.schedule(Millis(600.0), "behind");
    tl.cancel(behind);
    assert_eq!(tl.queue.len(), 2);
    assert_eq!(tl.pop_due(Millis(500.0)).map(|(id, _)| id), Some(keep));
    assert!(tl.queue.is_empty());
    assert_eq!(tl.next_due(), None);
}
