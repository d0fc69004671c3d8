// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// ConnectedPolygons and BoundaryContours output, and primitive emission.

mod helpers;

use approx::assert_abs_diff_eq;
use tess_sweep::{
    ElementType, PrimitiveKind, PrimitiveSink, TessOption, Tessellator, WindingRule, UNDEF,
};

fn polygon_with_hole() -> Tessellator {
    helpers::init_logging();
    let mut tess = Tessellator::new();
    tess.add_contour(2, &helpers::square(0.0, 0.0, 10.0));
    tess.set_option(TessOption::ReverseContours, true);
    tess.add_contour(2, &helpers::square(3.0, 3.0, 4.0));
    tess
}

/// Decodes `[first, count]` pairs into flat contours.
fn boundary_loops(tess: &Tessellator) -> Vec<Vec<f32>> {
    let verts = tess.vertices();
    tess.elements()
        .chunks_exact(2)
        .map(|pair| {
            let (start, count) = (pair[0] as usize, pair[1] as usize);
            verts[start * 2..(start + count) * 2].to_vec()
        })
        .collect()
}

#[derive(Default)]
struct Collect {
    kinds: Vec<PrimitiveKind>,
    sizes: Vec<usize>,
}

impl PrimitiveSink for Collect {
    fn begin(&mut self, kind: PrimitiveKind) {
        self.kinds.push(kind);
        self.sizes.push(0);
    }

    fn vertex(&mut self, _index: u32, position: &[f32]) {
        assert!(position.iter().all(|c| c.is_finite()));
        if let Some(n) = self.sizes.last_mut() {
            *n += 1;
        }
    }

    fn end(&mut self) {}
}

// --- ConnectedPolygons ---

#[test]
fn connected_quad_triangles_see_each_other() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &helpers::square(0.0, 0.0, 1.0));
    tess.tessellate(WindingRule::Positive, ElementType::ConnectedPolygons, 3, 2, None)
        .unwrap();
    assert_eq!(tess.element_count(), 2);
    let elems = tess.elements();
    assert_eq!(elems.len(), 2 * 3 * 2);

    for (i, element) in elems.chunks_exact(6).enumerate() {
        let (corners, neighbours) = element.split_at(3);
        assert!(corners.iter().all(|&v| (v as usize) < tess.vertex_count()));
        let shared: Vec<u32> = neighbours.iter().copied().filter(|&n| n != UNDEF).collect();
        assert_eq!(shared, vec![1 - i as u32], "element {i}");
    }
}

#[test]
fn connected_neighbours_are_symmetric() {
    let mut tess = polygon_with_hole();
    tess.tessellate(WindingRule::Positive, ElementType::ConnectedPolygons, 3, 2, None)
        .unwrap();
    let elems = tess.elements();
    let count = tess.element_count();
    assert_eq!(count, 8);
    for i in 0..count {
        for &n in &elems[i * 6 + 3..i * 6 + 6] {
            if n == UNDEF {
                continue;
            }
            let back = &elems[n as usize * 6 + 3..n as usize * 6 + 6];
            assert!(back.contains(&(i as u32)), "{i} -> {n} is one-way");
        }
    }
}

// --- BoundaryContours ---

#[test]
fn boundary_of_a_quad_is_the_quad() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &helpers::square(0.0, 0.0, 1.0));
    tess.tessellate(WindingRule::Positive, ElementType::BoundaryContours, 0, 2, None)
        .unwrap();
    assert_eq!(tess.element_count(), 1);
    assert_eq!(tess.elements(), &[0, 4]);
    let loops = boundary_loops(&tess);
    assert_abs_diff_eq!(helpers::polygon_signed_area(&loops[0]), 1.0, epsilon = 1e-6);
}

#[test]
fn boundary_of_a_polygon_with_hole_has_two_loops() {
    let mut tess = polygon_with_hole();
    tess.tessellate(WindingRule::Positive, ElementType::BoundaryContours, 0, 2, None)
        .unwrap();
    assert_eq!(tess.element_count(), 2);
    let mut areas: Vec<f32> = boundary_loops(&tess)
        .iter()
        .map(|l| helpers::polygon_signed_area(l))
        .collect();
    areas.sort_by(f32::total_cmp);
    // The hole runs clockwise.
    assert_abs_diff_eq!(areas[0], -16.0, epsilon = 1e-4);
    assert_abs_diff_eq!(areas[1], 100.0, epsilon = 1e-4);
}

#[test]
fn boundary_of_overlapping_squares_is_their_union() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &helpers::square(0.0, 0.0, 4.0));
    tess.add_contour(2, &helpers::square(2.0, 2.0, 4.0));
    tess.tessellate(WindingRule::NonZero, ElementType::BoundaryContours, 0, 2, None)
        .unwrap();
    assert_eq!(tess.element_count(), 1);
    let loops = boundary_loops(&tess);
    // Six corners plus the two crossings.
    assert_eq!(loops[0].len() / 2, 8);
    assert_abs_diff_eq!(helpers::polygon_signed_area(&loops[0]), 28.0, epsilon = 1e-4);
}

#[test]
fn boundary_contours_can_be_re_tessellated() {
    let mut tess = polygon_with_hole();
    tess.tessellate(WindingRule::Positive, ElementType::BoundaryContours, 0, 2, None)
        .unwrap();

    let retess = helpers::tessellate_contours(&boundary_loops(&tess), WindingRule::Positive);
    helpers::verify_valid_output(&retess);
    assert_eq!(retess.element_count(), 8);
    assert_abs_diff_eq!(helpers::total_tessellation_area(&retess), 84.0, epsilon = 1e-3);
}

#[test]
fn odd_nested_squares_give_two_loops() {
    let contours = [helpers::square(-5.0, -5.0, 10.0), helpers::square(-2.0, -2.0, 4.0)];
    let mut tess = Tessellator::new();
    for c in &contours {
        tess.add_contour(2, c);
    }
    tess.tessellate(WindingRule::Odd, ElementType::BoundaryContours, 0, 2, None)
        .unwrap();
    assert_eq!(tess.element_count(), 2);
}

// --- Emission ---

#[test]
fn emit_polygons_per_element() {
    let mut tess = polygon_with_hole();
    tess.tessellate(WindingRule::Positive, ElementType::Polygons, 4, 2, None)
        .unwrap();
    let mut sink = Collect::default();
    tess.emit(&mut sink);
    assert_eq!(sink.kinds.len(), tess.element_count());
    assert!(sink.kinds.iter().all(|&k| k == PrimitiveKind::Polygon));
    assert!(sink.sizes.iter().all(|&n| (3..=4).contains(&n)));
}

#[test]
fn emit_connected_polygons_skips_neighbours() {
    let mut tess = Tessellator::new();
    tess.add_contour(2, &helpers::square(0.0, 0.0, 1.0));
    tess.tessellate(WindingRule::Positive, ElementType::ConnectedPolygons, 3, 2, None)
        .unwrap();
    let mut sink = Collect::default();
    tess.emit(&mut sink);
    assert_eq!(sink.sizes, vec![3, 3]);
}

#[test]
fn emit_line_loops_for_boundaries() {
    let mut tess = polygon_with_hole();
    tess.tessellate(WindingRule::Positive, ElementType::BoundaryContours, 0, 2, None)
        .unwrap();
    let mut sink = Collect::default();
    tess.emit(&mut sink);
    assert_eq!(sink.kinds, vec![PrimitiveKind::LineLoop; 2]);
    assert_eq!(sink.sizes, vec![4, 4]);
}
