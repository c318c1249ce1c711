use crate::animation::ease::Ease;
use crate::config::color::Color;
use crate::foundation::core::Millis;

/// Interpolation contract for tweenable values.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
        }
    }
}

/// A running property transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    /// Value at `start`.
    pub from: T,
    /// Value once `duration` has elapsed.
    pub to: T,
    /// Clock time the transition began.
    pub start: Millis,
    /// Transition length.
    pub duration: Millis,
    /// Progress curve.
    pub ease: Ease,
}

impl<T> Tween<T>
where
    T: Lerp + Clone,
{
    /// Normalized progress at `now`, in `[0, 1]`.
    pub fn progress(&self, now: Millis) -> f64 {
        if !self.duration.is_positive() {
            return 1.0;
        }
        (now.since(self.start).0 / self.duration.0).clamp(0.0, 1.0)
    }

    /// Interpolated value at `now`.
    pub fn sample(&self, now: Millis) -> T {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to.clone();
        }
        T::lerp(&self.from, &self.to, self.ease.apply(p))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
