use crate::config::options::{GridAttr, Options};
use crate::foundation::core::{BezPath, SurfaceId, ViewBox};
use crate::surface::backend::{DrawingBackend, StyleProp};

/// Class marker every provisioned surface carries.
pub const SURFACE_CLASS: &str = "dmak-svg";

/// Create `count` surfaces under `mount`; `surfaces[i]` hosts character `i`.
///
/// Each surface gets the configured pixel size, view box and class marker, and the crosshair grid
/// when enabled, before any stroke content.
#[tracing::instrument(skip(backend, opts))]
pub fn provision_surfaces<B: DrawingBackend + ?Sized>(
    backend: &mut B,
    opts: &Options,
    mount: &str,
    count: usize,
) -> Vec<SurfaceId> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let s = backend.create_surface(mount, opts.width, opts.height);
        backend.set_view_box(s, opts.view_box);
        backend.set_surface_class(s, SURFACE_CLASS);
        if opts.grid.show {
            paint_grid(backend, s, opts.view_box, &opts.grid.attr);
        }
        out.push(s);
    }
    tracing::debug!(surfaces = out.len(), "surfaces provisioned");
    out
}

/// Paint the centred crosshair on one surface.
pub fn paint_grid<B: DrawingBackend + ?Sized>(
    backend: &mut B,
    surface: SurfaceId,
    vb: ViewBox,
    attr: &GridAttr,
) {
    let c = vb.center();
    let mut vertical = BezPath::new();
    vertical.move_to((c.x, vb.y));
    vertical.line_to((c.x, vb.y + vb.h));
    let mut horizontal = BezPath::new();
    horizontal.move_to((vb.x, c.y));
    horizontal.line_to((vb.x + vb.w, c.y));

    let style = [
        StyleProp::Fill(None),
        StyleProp::Stroke(attr.stroke),
        StyleProp::StrokeWidth(attr.stroke_width),
        StyleProp::DashArray(attr.stroke_dasharray.clone()),
    ];
    for line in [vertical, horizontal] {
        let el = backend.add_path(surface, &line);
        backend.set_style(el, &style);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/provision.rs"]
mod tests;
