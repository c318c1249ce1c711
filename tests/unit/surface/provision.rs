use super::*;
use crate::surface::svg::{ElementKind, SvgBackend};
use kurbo::PathEl;

#[test]
fn provisions_one_surface_per_character() {
    let mut b = SvgBackend::new();
    let opts = Options::default();
    let surfaces = provision_surfaces(&mut b, &opts, "draw", 3);
    assert_eq!(surfaces.len(), 3);
    assert_eq!(b.surfaces_in("draw"), surfaces);
    for s in &surfaces {
        assert_eq!(b.surface_size(*s), Some((109, 109)));
        assert_eq!(b.view_box(*s), Some(ViewBox::default()));
        assert_eq!(b.surface_class(*s), Some(SURFACE_CLASS));
        assert_eq!(b.elements_on(*s).len(), 2);
    }
}

#[test]
fn grid_is_a_centred_crosshair() {
    let mut b = SvgBackend::new();
    let opts = Options::default();
    let s = provision_surfaces(&mut b, &opts, "draw", 1)[0];
    let els = b.elements_on(s);

    let Some(ElementKind::Path(v)) = b.kind(els[0]).cloned() else {
        panic!("vertical grid line missing");
    };
    assert_eq!(
        v.elements(),
        &[
            PathEl::MoveTo((54.5, 0.0).into()),
            PathEl::LineTo((54.5, 109.0).into())
        ]
    );
    let Some(ElementKind::Path(h)) = b.kind(els[1]).cloned() else {
        panic!("horizontal grid line missing");
    };
    assert_eq!(
        h.elements(),
        &[
            PathEl::MoveTo((0.0, 54.5).into()),
            PathEl::LineTo((109.0, 54.5).into())
        ]
    );

    let style = b.style(els[0]).unwrap_or_default();
    assert_eq!(style.stroke, Some(opts.grid.attr.stroke));
    assert_eq!(style.stroke_width, Some(0.5));
    assert_eq!(style.dash_array, vec![4.0, 1.5]);
    assert_eq!(style.fill, None);
}

#[test]
fn grid_can_be_disabled() {
    let mut b = SvgBackend::new();
    let mut opts = Options::default();
    opts.grid.show = false;
    let surfaces = provision_surfaces(&mut b, &opts, "draw", 2);
    assert!(surfaces.iter().all(|s| b.elements_on(*s).is_empty()));
}

#[test]
fn zero_characters_provision_nothing() {
    let mut b = SvgBackend::new();
    assert!(provision_surfaces(&mut b, &Options::default(), "draw", 0).is_empty());
    assert_eq!(b.live_surfaces(), 0);
}
