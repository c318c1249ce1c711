use kurbo::{CubicBez, ParamCurve};

/// CSS timing functions used to map normalized transition progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// CSS `linear`.
    #[serde(rename = "linear")]
    Linear,
    /// CSS `ease`, i.e. `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    #[default]
    #[serde(rename = "ease")]
    Css,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Css => css_ease(t),
        }
    }
}

fn css_ease(t: f64) -> f64 {
    let curve = CubicBez::new((0.0, 0.0), (0.25, 0.1), (0.25, 1.0), (1.0, 1.0));
    // x(s) is monotonic for this curve, so bisection on s converges.
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..40 {
        let mid = 0.5 * (lo + hi);
        if curve.eval(mid).x < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    curve.eval(0.5 * (lo + hi)).y
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
