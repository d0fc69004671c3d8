// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Degenerate and hostile input: empty contours, coincident and collinear
// vertices, zero-area shapes, out-of-range coordinates.

mod helpers;

use approx::assert_abs_diff_eq;
use tess_sweep::{ElementType, TessError, TessStatus, Tessellator, WindingRule};

fn run(contours: &[&[f32]]) -> (Tessellator, Result<(), TessError>) {
    helpers::init_logging();
    let mut tess = Tessellator::new();
    for c in contours {
        tess.add_contour(2, c);
    }
    let result = tess.tessellate(WindingRule::Positive, ElementType::Polygons, 3, 2, None);
    (tess, result)
}

fn assert_empty(contours: &[&[f32]]) {
    let (tess, result) = run(contours);
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(tess.element_count(), 0);
    assert_eq!(tess.status(), TessStatus::Ok);
}

#[test]
fn empty_and_tiny_contours_produce_nothing() {
    assert_empty(&[&[]]);
    assert_empty(&[&[1.0, 2.0]]);
    assert_empty(&[&[0.0, 0.0, 1.0, 1.0]]);
}

#[test]
fn zero_area_contours_produce_nothing() {
    // All on one point.
    assert_empty(&[&[3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0]]);
    // A line walked forth and back.
    assert_empty(&[&[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 1.0, 0.0]]);
    // Collinear triangle.
    assert_empty(&[&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]]);
}

#[test]
fn repeated_vertices_are_merged() {
    let square_with_repeats: &[f32] = &[
        0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 2.0, 0.0, 0.0,
    ];
    let (tess, result) = run(&[square_with_repeats]);
    result.unwrap();
    assert_eq!(tess.element_count(), 2);
    assert_eq!(tess.vertex_count(), 4);
    assert_abs_diff_eq!(helpers::total_tessellation_area(&tess), 4.0, epsilon = 1e-6);
}

#[test]
fn shared_vertices_between_contours_are_merged() {
    // Two triangles touching at (1, 1).
    let (tess, result) = run(&[&[0.0, 0.0, 1.0, 1.0, 0.0, 2.0], &[1.0, 1.0, 2.0, 0.0, 2.0, 2.0]]);
    result.unwrap();
    assert_eq!(tess.element_count(), 2);
    assert_eq!(tess.vertex_count(), 5);
    assert!(tess.sweep_stats().merged_vertices >= 1);
}

#[test]
fn collinear_vertices_on_an_edge_are_kept() {
    let (tess, result) = run(&[&[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0]]);
    result.unwrap();
    assert_eq!(tess.vertex_count(), 5);
    assert_eq!(tess.element_count(), 3);
    assert_abs_diff_eq!(helpers::total_tessellation_area(&tess), 4.0, epsilon = 1e-6);
}

#[test]
fn vertex_touching_an_edge() {
    // The second triangle's tip lies on the first one's edge.
    let (tess, result) = run(&[&[0.0, 0.0, 4.0, 0.0, 2.0, 2.0], &[2.0, 0.0, 3.0, -2.0, 4.0, -1.0]]);
    result.unwrap();
    helpers::verify_valid_output(&tess);
    let expected = 4.0 + helpers::polygon_signed_area(&[2.0, 0.0, 3.0, -2.0, 4.0, -1.0]).abs();
    assert_abs_diff_eq!(helpers::total_tessellation_area(&tess), expected, epsilon = 1e-5);
}

#[test]
fn overlapping_collinear_edges() {
    // Two squares sharing the edge x = 2 over part of its length.
    let (tess, result) = run(&[&helpers::square(0.0, 0.0, 2.0), &helpers::square(2.0, 1.0, 2.0)]);
    result.unwrap();
    helpers::verify_valid_output(&tess);
    assert_abs_diff_eq!(helpers::total_tessellation_area(&tess), 8.0, epsilon = 1e-5);
}

#[test]
fn out_of_range_coordinates_are_invalid_input() {
    let cases: [&[f32]; 4] = [
        &[-2e38, 0.0, 0.0, 0.0, 2e38, -1.0],
        &[0.0, 0.0, 0.0, 2e38, -1.0, -2e38],
        &[-2e37, 0.0, 0.0, 5.0, 1e37, -5.0],
        &[f32::MIN, f32::MIN, f32::MIN, f32::MAX, f32::MAX, f32::MAX],
    ];
    for verts in cases {
        let (tess, result) = run(&[verts]);
        assert!(matches!(result, Err(TessError::InvalidInput { .. })));
        assert_eq!(tess.status(), TessStatus::InvalidInput);
        assert_eq!(tess.element_count(), 0);
    }
}

#[test]
fn non_finite_coordinates_are_invalid_input() {
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let (tess, result) = run(&[&[0.0, 0.0, bad, 1.0, 1.0, 1.0]]);
        assert!(result.is_err());
        assert_eq!(tess.status(), TessStatus::InvalidInput);
    }
}

#[test]
fn tangled_contour_does_not_panic() {
    let tangle: &[f32] = &[
        -1.0, 0.0, 0.868218958, 0.0, 0.902460039, 0.0649746507, -0.0, 0.854620099, -1.0,
        0.784999669, 0.0, 0.0, -1.0, 1.0, 1.0, 1.0, 0.0, -1.0, 1e6, 1e6, -1.0, -1.0, -0.0,
        0.442898333, 0.33078745, -0.0, -0.0, 1.0, -1.0, 0.0, 1.0, -0.0, 0.0, 0.186138511,
        0.212649569, 0.886535764, 1.0, 0.34795785, 0.0, 0.788870096, 0.853441715, -1.0, -1.0,
        1.0, 1.0, -0.994903505, 1.0, 0.105880626, 1e6, 1e6, -1.0, 1e6, -0.0, 0.34419331, 1.0,
        1.0,
    ];
    let (tess, result) = run(&[tangle]);
    if result.is_ok() {
        helpers::verify_valid_output(&tess);
    } else {
        assert_eq!(tess.element_count(), 0);
    }
}

#[test]
fn long_flat_spikes_do_not_panic() {
    let spikes: &[f32] = &[
        -0.5, 1.0, 1e6, 0.0, 0.349171013, 1.0, 1.0, 0.0, 1.0, -0.0, 0.594775498, -0.0, 0.0, -0.0,
        -0.0, 1.0, 0.0, 1.0, 2.20929384, 1.0, 1.0, 1.0, -0.0, -0.0, 1e6, -0.0, -1.0, 0.0, 5e5,
        0.391036272, 1e6, 0.371295959, 1e6, -0.0, 0.0, 0.234747186, -1.0, 1.0, -1.0, -0.0, 1e6,
        1.0, -0.0, -0.0, 1e6, 1.0, 0.434241712, 0.0, 1.0, 0.211511821, 1e6, 1.0,
    ];
    for rule in [WindingRule::Odd, WindingRule::NonZero, WindingRule::Positive] {
        let mut tess = Tessellator::new();
        tess.add_contour(2, spikes);
        if tess.tessellate(rule, ElementType::Polygons, 3, 2, None).is_ok() {
            helpers::verify_valid_output(&tess);
        }
    }
}
