use super::*;

#[test]
fn clones_share_one_log() {
    let log = EventLog::new();
    let mut handle = log.clone();
    handle.loaded(&[]);
    handle.drew(0);
    handle.drew(1);
    PlaybackObserver::erased(&mut handle, 1);
    assert_eq!(
        log.events(),
        vec![
            PlaybackEvent::Loaded(0),
            PlaybackEvent::Drew(0),
            PlaybackEvent::Drew(1),
            PlaybackEvent::Erased(1),
        ]
    );
    assert_eq!(log.drawn(), vec![0, 1]);
    assert_eq!(log.erased(), vec![1]);
}

#[test]
fn drain_empties_the_log() {
    let log = EventLog::new();
    let mut handle = log.clone();
    handle.drew(3);
    assert_eq!(log.drain(), vec![PlaybackEvent::Drew(3)]);
    assert!(log.events().is_empty());
}

#[test]
fn unit_observer_ignores_everything() {
    PlaybackObserver::loaded(&mut (), &[]);
    PlaybackObserver::drew(&mut (), 0);
    PlaybackObserver::erased(&mut (), 0);
}
