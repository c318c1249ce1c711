use super::*;
use std::f64::consts::FRAC_PI_2;

#[test]
fn line_lengths_are_exact() {
    let p = parse_path("M0,0 L10,0").unwrap();
    assert!((path_length(&p) - 10.0).abs() < 1e-9);

    let p = parse_path("M0,0 L3,4 l0,5").unwrap();
    assert!((path_length(&p) - 10.0).abs() < 1e-9);
}

#[test]
fn kanjivg_style_relative_curves_parse() {
    let p = parse_path("M11,54.25c3.19,0.62,6.25,0.75,9.73,0.5c20.64-1.5,50.39-5.12,68.58-5.24")
        .unwrap();
    let len = path_length(&p);
    // The chord from (11,54.25) to (89.31,49.51) bounds the length from below.
    assert!(len > 78.0 && len < 82.0, "len={len}");
}

#[test]
fn bad_path_data_is_a_load_error() {
    let err = parse_path("M0,0 X").unwrap_err();
    assert!(matches!(err, DmakError::Load(_)));
}

#[test]
fn point_at_length_walks_segments() {
    let p = parse_path("M0,0 L10,0 L10,10").unwrap();

    let a = point_at_length(&p, 5.0).unwrap();
    assert!((a.point - Point::new(5.0, 0.0)).hypot() < 1e-5);
    assert!(a.angle.abs() < 1e-9);

    let b = point_at_length(&p, 15.0).unwrap();
    assert!((b.point - Point::new(10.0, 5.0)).hypot() < 1e-5);
    assert!((b.angle - FRAC_PI_2).abs() < 1e-9);

    let clamped = point_at_length(&p, 1e9).unwrap();
    assert!((clamped.point - Point::new(10.0, 10.0)).hypot() < 1e-5);

    assert!(point_at_length(&BezPath::new(), 1.0).is_none());
    assert!(point_at_length(&parse_path("M3,3 L3,3").unwrap(), 0.0).is_none());
}

#[test]
fn path_end_ignores_degenerate_tail() {
    let p = parse_path("M0,0 L0,10 L0,10").unwrap();
    let end = point_at_length(&p, path_length(&p)).unwrap();
    assert_eq!(end.point, Point::new(0.0, 10.0));
    assert!((end.angle - FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn path_end_uses_cubic_end_tangent() {
    // Ends travelling straight up regardless of the chord direction.
    let p = parse_path("M0,0 C10,0 20,10 20,0").unwrap();
    let end = point_at_length(&p, path_length(&p)).unwrap();
    assert!((end.angle + FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn arrow_points_along_heading() {
    let at = PathPoint {
        point: Point::new(10.0, 0.0),
        angle: 0.0,
    };
    let arrow = arrow_head(at, 4.0);
    let bbox = kurbo::Shape::bounding_box(&arrow);
    assert!(bbox.x0 >= 10.0);
    assert!((bbox.x1 - 15.0).abs() < 1e-9);
    assert!((bbox.height() - 4.0).abs() < 1e-9);
}
