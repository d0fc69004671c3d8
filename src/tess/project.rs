// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Projection of the 3D input onto the sweep plane.

use crate::geom::{Point, Real};
use crate::mesh::{Mesh, VertexId};

fn dot(u: [Real; 3], v: [Real; 3]) -> Real {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn sub(u: [Real; 3], v: [Real; 3]) -> [Real; 3] {
    [u[0] - v[0], u[1] - v[1], u[2] - v[2]]
}

fn cross(u: [Real; 3], v: [Real; 3]) -> [Real; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub(crate) fn long_axis(v: [Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

pub(crate) fn short_axis(v: [Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() < v[0].abs() {
        i = 1;
    }
    if v[2].abs() < v[i].abs() {
        i = 2;
    }
    i
}

/// Estimates the plane normal: the two vertices farthest apart along the
/// widest axis, plus the vertex making the largest triangle with them.
pub(crate) fn compute_normal(mesh: &Mesh) -> [Real; 3] {
    let Some(first) = mesh.vertices().next() else {
        return [0.0, 0.0, 1.0];
    };
    let c0 = mesh[first].coords;
    let (mut min_val, mut max_val) = (c0, c0);
    let (mut min_vert, mut max_vert) = ([first; 3], [first; 3]);
    for v in mesh.vertices() {
        let c = mesh[v].coords;
        for i in 0..3 {
            if c[i] < min_val[i] {
                min_val[i] = c[i];
                min_vert[i] = v;
            }
            if c[i] > max_val[i] {
                max_val[i] = c[i];
                max_vert[i] = v;
            }
        }
    }

    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices coincide.
        return [0.0, 0.0, 1.0];
    }

    let far = mesh[max_vert[i]].coords;
    let d1 = sub(mesh[min_vert[i]].coords, far);
    let mut norm = [0.0; 3];
    let mut max_len2 = 0.0;
    for v in mesh.vertices() {
        let n = cross(d1, sub(mesh[v].coords, far));
        let len2 = dot(n, n);
        if len2 > max_len2 {
            max_len2 = len2;
            norm = n;
        }
    }

    if max_len2 <= 0.0 {
        // Collinear input: any normal perpendicular to the line will do.
        norm = [0.0; 3];
        norm[short_axis(d1)] = 1.0;
    }
    norm
}

/// Twice the signed area of all positively wound loops, in (s, t).
fn positive_loop_area(mesh: &Mesh) -> Real {
    let mut area = 0.0;
    for f in mesh.faces() {
        let start = mesh[f].an_edge;
        if mesh[start].winding <= 0 {
            continue;
        }
        for e in mesh.face_loop(start) {
            let (o, d) = (mesh.pos(mesh.org(e)), mesh.pos(mesh.dst(e)));
            area += (o.s - d.s) * (o.t + d.t);
        }
    }
    area
}

/// Projects every vertex onto the plane perpendicular to the normal's long
/// axis and returns the (s, t) bounding box.
///
/// When the normal is estimated, `t` is flipped if needed so that
/// positively wound contours come out counter-clockwise.
pub(crate) fn project(mesh: &mut Mesh, normal: Option<[Real; 3]>) -> (Point, Point) {
    let (norm, estimated) = match normal {
        Some(n) if n != [0.0; 3] => (n, false),
        _ => (compute_normal(mesh), true),
    };

    let i = long_axis(norm);
    let mut s_unit = [0.0; 3];
    let mut t_unit = [0.0; 3];
    s_unit[(i + 1) % 3] = 1.0;
    t_unit[(i + 2) % 3] = if norm[i] > 0.0 { 1.0 } else { -1.0 };

    update_positions(mesh, |c| Point::new(dot(c, s_unit), dot(c, t_unit)));
    if estimated && positive_loop_area(mesh) < 0.0 {
        update_positions(mesh, |c| Point::new(dot(c, s_unit), -dot(c, t_unit)));
    }

    let mut points = mesh.vertices().map(|v| mesh.pos(v));
    let Some(first) = points.next() else {
        return (Point::default(), Point::default());
    };
    points.fold((first, first), |(min, max), p| {
        (
            Point::new(min.s.min(p.s), min.t.min(p.t)),
            Point::new(max.s.max(p.s), max.t.max(p.t)),
        )
    })
}

fn update_positions(mesh: &mut Mesh, to_plane: impl Fn([Real; 3]) -> Point) {
    let mut v = mesh.next_vertex(VertexId::HEAD);
    while v != VertexId::HEAD {
        let c = mesh[v].coords;
        mesh[v].pos = to_plane(c);
        v = mesh.next_vertex(v);
    }
}
