use crate::foundation::core::{BezPath, Point, Vec2};
use crate::foundation::error::{DmakError, DmakResult};
use kurbo::{ParamCurve, ParamCurveArclen, ParamCurveDeriv, PathSeg};

/// Arc-length accuracy in user units.
pub const ARCLEN_ACCURACY: f64 = 1e-6;

/// A point on a path together with the direction of travel there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPoint {
    /// Position in user units.
    pub point: Point,
    /// Direction of travel in radians (`atan2(dy, dx)`, y pointing down).
    pub angle: f64,
}

impl PathPoint {
    /// Unit vector along [`PathPoint::angle`].
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }
}

/// Parse SVG path data (`d` attribute syntax).
pub fn parse_path(d: &str) -> DmakResult<BezPath> {
    BezPath::from_svg(d).map_err(|e| DmakError::load(format!("parse path data \"{d}\": {e}")))
}

/// Total arc length of every segment of `path`.
pub fn path_length(path: &BezPath) -> f64 {
    path.segments().map(|s| s.arclen(ARCLEN_ACCURACY)).sum()
}

/// Position and heading at arc length `length` from the start, clamped to the path.
///
/// Zero-length segments are skipped, so the path end reports the heading of the last segment
/// with extent. `None` when the path has no extent at all.
pub fn point_at_length(path: &BezPath, length: f64) -> Option<PathPoint> {
    let mut remaining = length.max(0.0);
    let mut tail = None;
    for seg in path.segments() {
        let seg_len = seg.arclen(ARCLEN_ACCURACY);
        if seg_len <= 0.0 {
            continue;
        }
        if remaining < seg_len {
            return Some(sample(&seg, seg.inv_arclen(remaining, ARCLEN_ACCURACY)));
        }
        remaining -= seg_len;
        tail = Some(seg);
    }
    tail.map(|seg| sample(&seg, 1.0))
}

fn sample(seg: &PathSeg, t: f64) -> PathPoint {
    PathPoint {
        point: seg.eval(t),
        angle: heading(seg, t).atan2(),
    }
}

/// Closed triangular arrow head placed just past `at`, pointing along its heading.
pub fn arrow_head(at: PathPoint, size: f64) -> BezPath {
    let dir = at.direction();
    let normal = Vec2::new(-dir.y, dir.x);
    let base = at.point + dir * (size * 0.25);
    let tip = base + dir * size;
    let half = size * 0.5;

    let mut out = BezPath::new();
    out.move_to(tip);
    out.line_to(base + normal * half);
    out.line_to(base - normal * half);
    out.close_path();
    out
}

fn heading(seg: &PathSeg, t: f64) -> Vec2 {
    let d = match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    };
    if d.hypot2() > 1e-18 {
        return d;
    }
    // Coincident control points: fall back to the chord.
    seg.end() - seg.start()
}

#[cfg(test)]
#[path = "../../tests/unit/strokes/geometry.rs"]
mod tests;
