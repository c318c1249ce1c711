//! Easing curves and time-based tweens used by transition-capable backends.

pub(crate) mod ease;
pub(crate) mod tween;
