use crate::animation::ease::Ease;
use crate::config::color::Color;
use crate::config::options::{LineCap, LineJoin};
use crate::foundation::core::{BezPath, ElementId, Millis, Point, SurfaceId, ViewBox};
use crate::strokes::geometry::{self, PathPoint};

/// Property a [`Transition`] animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionProperty {
    /// Stroke colour.
    Stroke,
    /// `stroke-dashoffset`.
    DashOffset,
}

/// Timed transition applied to later changes of one property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Animated property.
    pub property: TransitionProperty,
    /// Transition length.
    pub duration: Millis,
    /// Progress curve.
    pub ease: Ease,
}

/// One style property assignment.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleProp {
    /// Stroke colour.
    Stroke(Color),
    /// Fill colour; `None` means no fill.
    Fill(Option<Color>),
    /// Line width.
    StrokeWidth(f64),
    /// Line cap.
    LineCap(LineCap),
    /// Line join.
    LineJoin(LineJoin),
    /// Dash pattern; empty means solid.
    DashArray(Vec<f64>),
    /// Dash offset.
    DashOffset(f64),
    /// Font size of text elements.
    FontSize(f64),
    /// Transition applied to subsequent changes; `None` cancels running transitions.
    Transition(Option<Transition>),
}

/// Drawing-surface capability consumed by the playback core.
///
/// Style changes are not observed by the renderer until styles are resolved. A change made with a
/// transition in effect animates from the last resolved value; [`DrawingBackend::flush_layout`]
/// forces that resolution synchronously. Operations on unknown or removed handles are no-ops.
pub trait DrawingBackend {
    /// Create a surface of `width`x`height` pixels under the mount point `mount`.
    fn create_surface(&mut self, mount: &str, width: u32, height: u32) -> SurfaceId;

    /// Set the user-space view box of a surface.
    fn set_view_box(&mut self, surface: SurfaceId, view_box: ViewBox);

    /// Attach a styling class marker to a surface.
    fn set_surface_class(&mut self, surface: SurfaceId, class: &str);

    /// Destroy a surface and every element on it.
    fn destroy_surface(&mut self, surface: SurfaceId);

    /// Append a path element.
    fn add_path(&mut self, surface: SurfaceId, path: &BezPath) -> ElementId;

    /// Append a text element with its baseline origin at `at`.
    fn add_text(&mut self, surface: SurfaceId, at: Point, value: &str) -> ElementId;

    /// Assign style properties, in order.
    fn set_style(&mut self, element: ElementId, props: &[StyleProp]);

    /// Force pending style changes of `element` (and everything else) to resolve now.
    fn flush_layout(&mut self, element: ElementId);

    /// Remove an element from its surface.
    fn remove(&mut self, element: ElementId);

    /// Next colour of the named-colour generator (used for `"random"` strokes).
    fn next_color(&mut self) -> Color;

    /// Inform the backend that the playback clock reached `now`.
    fn sync_clock(&mut self, _now: Millis) {}

    /// Arc length of `path`.
    fn path_length(&self, path: &BezPath) -> f64 {
        geometry::path_length(path)
    }

    /// Position and heading at arc length `length`.
    fn point_at_length(&self, path: &BezPath, length: f64) -> Option<PathPoint> {
        geometry::point_at_length(path, length)
    }
}
