// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Shared test utilities for the integration tests.

#![allow(dead_code)]

use tess_sweep::{ElementType, Tessellator, WindingRule, UNDEF};

/// Routes `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Signed area of a triangle given 3 vertices (2D).
pub fn triangle_area(x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    0.5 * ((x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0))
}

fn xy(tess: &Tessellator, i: u32, vertex_size: usize) -> (f32, f32) {
    let at = i as usize * vertex_size;
    (tess.vertices()[at], tess.vertices()[at + 1])
}

/// Signed areas of all output triangles. Assumes `Polygons` with
/// `poly_size = 3` and 2D vertices.
pub fn triangle_areas(tess: &Tessellator) -> Vec<f32> {
    tess.elements()
        .chunks_exact(3)
        .map(|tri| {
            let (x0, y0) = xy(tess, tri[0], 2);
            let (x1, y1) = xy(tess, tri[1], 2);
            let (x2, y2) = xy(tess, tri[2], 2);
            triangle_area(x0, y0, x1, y1, x2, y2)
        })
        .collect()
}

pub fn total_tessellation_area(tess: &Tessellator) -> f32 {
    triangle_areas(tess).iter().map(|a| a.abs()).sum()
}

pub fn total_tessellation_signed_area(tess: &Tessellator) -> f32 {
    triangle_areas(tess).iter().sum()
}

/// Area covered by `Polygons` output of any poly size, 2D vertices.
pub fn total_polygon_area(tess: &Tessellator, poly_size: usize) -> f32 {
    tess.elements()
        .chunks_exact(poly_size)
        .map(|poly| {
            let corners: Vec<f32> = poly
                .iter()
                .take_while(|&&i| i != UNDEF)
                .flat_map(|&i| {
                    let (x, y) = xy(tess, i, 2);
                    [x, y]
                })
                .collect();
            polygon_signed_area(&corners)
        })
        .sum()
}

/// Indices in range, coordinates finite.
pub fn verify_valid_output(tess: &Tessellator) {
    for (i, &v) in tess.vertices().iter().enumerate() {
        assert!(v.is_finite(), "vertex component [{i}] = {v} is not finite");
    }
    let vert_count = tess.vertex_count();
    for (i, &idx) in tess.elements().iter().enumerate() {
        if idx == UNDEF {
            continue;
        }
        assert!(
            (idx as usize) < vert_count,
            "element[{i}] = {idx} out of range (vertex_count={vert_count})"
        );
    }
}

/// Every output triangle is counter-clockwise with area above `epsilon`.
pub fn verify_ccw_triangles(tess: &Tessellator, epsilon: f32) {
    for (i, area) in triangle_areas(tess).into_iter().enumerate() {
        assert!(area > epsilon, "triangle {i} has area {area}");
    }
}

/// Triangulates `contours` with `rule`, 2D in and out.
pub fn tessellate_contours(contours: &[Vec<f32>], rule: WindingRule) -> Tessellator {
    init_logging();
    let mut tess = Tessellator::new();
    for contour in contours {
        tess.add_contour(2, contour);
    }
    if let Err(err) = tess.tessellate(rule, ElementType::Polygons, 3, 2, None) {
        panic!("tessellation failed for {rule:?}: {err}");
    }
    tess
}

/// Signed area of a simple polygon given as flat `[x0, y0, x1, y1, ...]`.
pub fn polygon_signed_area(verts: &[f32]) -> f32 {
    let n = verts.len() / 2;
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += verts[i * 2] * verts[j * 2 + 1];
        area -= verts[j * 2] * verts[i * 2 + 1];
    }
    area * 0.5
}

/// Axis-aligned square, counter-clockwise.
pub fn square(x: f32, y: f32, size: f32) -> Vec<f32> {
    vec![x, y, x + size, y, x + size, y + size, x, y + size]
}

/// Axis-aligned square, clockwise.
pub fn square_cw(x: f32, y: f32, size: f32) -> Vec<f32> {
    vec![x, y, x, y + size, x + size, y + size, x + size, y]
}

/// Regular polygon with `n` corners, counter-clockwise.
pub fn regular_polygon(n: usize, radius: f32) -> Vec<f32> {
    (0..n)
        .flat_map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}
