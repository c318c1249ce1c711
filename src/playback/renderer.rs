use crate::config::color::{Color, StrokeColor};
use crate::config::options::Options;
use crate::foundation::core::{ElementId, Millis, Point, SurfaceId};
use crate::strokes::geometry::arrow_head;
use crate::strokes::model::{RenderedHandle, Stroke};
use crate::surface::backend::{DrawingBackend, StyleProp, Transition, TransitionProperty};

/// Length of the colour transition back to the resting colour once a reveal ends.
pub(crate) const SETTLE_TRANSITION: Millis = Millis(400.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Reveal,
    Retract,
}

/// Paints and removes individual strokes on backend surfaces, styled by one options set.
pub(crate) struct StrokeRenderer<'a> {
    opts: &'a Options,
}

impl<'a> StrokeRenderer<'a> {
    pub(crate) fn new(opts: &'a Options) -> Self {
        Self { opts }
    }

    /// Paint `stroke` on `surface` and start its reveal when drawing is animated.
    ///
    /// Returns the path element and the delay after which [`StrokeRenderer::settle`] is due.
    pub(crate) fn draw<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        surface: SurfaceId,
        stroke: &mut Stroke,
    ) -> Option<(ElementId, Millis)> {
        self.discard(backend, stroke);

        let resting = self.resting_color(backend);
        let path = backend.add_path(surface, stroke.path().bez());
        backend.set_style(path, &self.path_style(resting));
        let label = self.paint_label(backend, surface, stroke);
        stroke.rendered = Some(RenderedHandle {
            path,
            label,
            resting,
            fading: false,
        });

        if !self.opts.stroke.animated.drawing {
            return None;
        }
        self.animate(backend, path, stroke, Direction::Reveal);
        Some((path, stroke.duration()))
    }

    /// Revert a revealed stroke to its resting colour.
    ///
    /// No-op unless `element` is the stroke's live, non-fading path.
    pub(crate) fn settle<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        stroke: &Stroke,
        element: ElementId,
    ) -> bool {
        let Some(h) = stroke.rendered else {
            return false;
        };
        if h.path != element || h.fading {
            return false;
        }
        backend.set_style(
            element,
            &[
                StyleProp::Transition(Some(Transition {
                    property: TransitionProperty::Stroke,
                    duration: SETTLE_TRANSITION,
                    ease: self.opts.stroke.animated.timing,
                })),
                StyleProp::Stroke(h.resting),
            ],
        );
        true
    }

    /// Remove the label now and the path either now or after a retract.
    ///
    /// Returns the path element and the delay after which [`StrokeRenderer::finish_erase`] is
    /// due, when a retract was started.
    pub(crate) fn erase<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        stroke: &mut Stroke,
    ) -> Option<(ElementId, Millis)> {
        let h = stroke.rendered.as_mut()?;
        if h.fading {
            return None;
        }
        if let Some(label) = h.label.take() {
            backend.remove(label);
        }
        let path = h.path;

        if !self.opts.stroke.animated.erasing {
            backend.remove(path);
            stroke.rendered = None;
            return None;
        }
        h.fading = true;
        self.animate(backend, path, stroke, Direction::Retract);
        Some((path, stroke.duration()))
    }

    /// Complete a retract: remove the path and clear the handle.
    ///
    /// No-op unless `element` is still the stroke's path.
    pub(crate) fn finish_erase<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        stroke: &mut Stroke,
        element: ElementId,
    ) -> bool {
        if stroke.rendered.map(|h| h.path) != Some(element) {
            return false;
        }
        self.discard(backend, stroke);
        true
    }

    /// Paint `stroke` without animation, in `highlight` when given, else its resting colour.
    pub(crate) fn paint_static<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        surface: SurfaceId,
        stroke: &Stroke,
        highlight: Option<Color>,
    ) -> ElementId {
        let color = match highlight {
            Some(c) => c,
            None => self.resting_color(backend),
        };
        let path = backend.add_path(surface, stroke.path().bez());
        backend.set_style(path, &self.path_style(color));
        self.paint_label(backend, surface, stroke);
        path
    }

    /// Paint the direction arrow at the end of `stroke`, when enabled and the path has extent.
    pub(crate) fn paint_arrow<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        surface: SurfaceId,
        stroke: &Stroke,
    ) -> Option<ElementId> {
        let style = &self.opts.series_active_style.arrow;
        if !style.visible {
            return None;
        }
        let bez = stroke.path().bez();
        let len = backend.path_length(bez);
        if len <= 0.0 {
            return None;
        }
        let at = backend.point_at_length(bez, len)?;
        let el = backend.add_path(surface, &arrow_head(at, style.size));
        backend.set_style(el, &[StyleProp::Fill(Some(style.fill))]);
        Some(el)
    }

    /// Remove whatever is painted for `stroke` and clear its handle.
    pub(crate) fn discard<B: DrawingBackend + ?Sized>(&self, backend: &mut B, stroke: &mut Stroke) {
        if let Some(h) = stroke.rendered.take() {
            if let Some(label) = h.label {
                backend.remove(label);
            }
            backend.remove(h.path);
        }
    }

    fn resting_color<B: DrawingBackend + ?Sized>(&self, backend: &mut B) -> Color {
        match self.opts.stroke.attr.stroke {
            StrokeColor::Fixed(c) => c,
            StrokeColor::Random => backend.next_color(),
        }
    }

    fn path_style(&self, color: Color) -> [StyleProp; 5] {
        let attr = &self.opts.stroke.attr;
        [
            StyleProp::Fill(None),
            StyleProp::Stroke(color),
            StyleProp::StrokeWidth(attr.stroke_width),
            StyleProp::LineCap(attr.stroke_linecap),
            StyleProp::LineJoin(attr.stroke_linejoin),
        ]
    }

    fn paint_label<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        surface: SurfaceId,
        stroke: &Stroke,
    ) -> Option<ElementId> {
        let order = &self.opts.stroke.order;
        if !order.visible {
            return None;
        }
        let label = stroke.label()?;
        let el = backend.add_text(surface, Point::new(label.x, label.y), &label.value);
        backend.set_style(
            el,
            &[
                StyleProp::FontSize(order.attr.font_size),
                StyleProp::Fill(Some(order.attr.fill)),
            ],
        );
        Some(el)
    }

    /// Dash-offset transition: start position, forced style resolution, then the target.
    fn animate<B: DrawingBackend + ?Sized>(
        &self,
        backend: &mut B,
        element: ElementId,
        stroke: &Stroke,
        direction: Direction,
    ) {
        let len = stroke.length();
        let (from, to) = match direction {
            Direction::Reveal => (len, 0.0),
            Direction::Retract => (0.0, len),
        };
        backend.set_style(
            element,
            &[
                StyleProp::Stroke(self.opts.stroke.attr.active),
                StyleProp::Transition(None),
                StyleProp::DashArray(vec![len, len]),
                StyleProp::DashOffset(from),
            ],
        );
        backend.flush_layout(element);
        backend.set_style(
            element,
            &[
                StyleProp::Transition(Some(Transition {
                    property: TransitionProperty::DashOffset,
                    duration: stroke.duration(),
                    ease: self.opts.stroke.animated.timing,
                })),
                StyleProp::DashOffset(to),
            ],
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/renderer.rs"]
mod tests;
