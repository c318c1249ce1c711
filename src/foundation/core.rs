use crate::foundation::error::{DmakError, DmakResult};

pub use kurbo::{BezPath, Point, Vec2};

/// Wall-clock time or duration in milliseconds.
///
/// Ordering uses IEEE total order so values can key the timer queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Millis(pub f64);

impl Millis {
    /// Zero milliseconds.
    pub const ZERO: Self = Self(0.0);

    /// Raw value in milliseconds.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Larger of two values.
    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 { self } else { other }
    }

    /// `self - earlier`, clamped at zero.
    pub fn since(self, earlier: Self) -> Self {
        Self((self.0 - earlier.0).max(0.0))
    }

    /// Return `true` for strictly positive, finite durations.
    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl std::ops::Add for Millis {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Millis {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Eq for Millis {}

impl PartialOrd for Millis {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Millis {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// SVG `viewBox` rectangle in user units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    /// Minimum x.
    pub x: f64,
    /// Minimum y.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl ViewBox {
    /// Create a validated view box with finite origin and positive extent.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> DmakResult<Self> {
        let vb = Self { x, y, w, h };
        vb.validate()?;
        Ok(vb)
    }

    /// Check finiteness and positive extent.
    pub fn validate(&self) -> DmakResult<()> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(DmakError::config("viewBox origin must be finite"));
        }
        if !(self.w.is_finite() && self.h.is_finite()) || self.w <= 0.0 || self.h <= 0.0 {
            return Err(DmakError::config("viewBox w/h must be finite and > 0"));
        }
        Ok(())
    }

    /// Centre point of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 109.0,
            h: 109.0,
        }
    }
}

/// Handle to one drawing surface owned by a backend.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SurfaceId(pub u32);

/// Handle to one element (path or text) living on a surface.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub u64);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
