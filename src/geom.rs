// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep-plane geometry: ordering and orientation predicates on projected
// (s, t) positions, and the edge intersection used by the sweep.

pub type Real = f32;

/// Largest coordinate magnitude accepted as input. Beyond this the `f32`
/// spacing exceeds 1 and the predicates below lose their guarantees.
pub const MAX_VALID_COORD: Real = (1u32 << 23) as Real;

/// A position on the sweep plane. The sweep advances along `s`; `t` is the
/// coordinate along the sweep line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub s: Real,
    pub t: Real,
}

impl Point {
    #[inline]
    pub const fn new(s: Real, t: Real) -> Self {
        Point { s, t }
    }

    /// Sweep order: lexicographic on `(s, t)`.
    #[inline]
    pub fn leq(self, other: Point) -> bool {
        self.s < other.s || (self.s == other.s && self.t <= other.t)
    }

    /// Same as `leq` with the roles of `s` and `t` exchanged.
    #[cfg(test)]
    #[inline]
    pub(crate) fn trans_leq(self, other: Point) -> bool {
        self.t < other.t || (self.t == other.t && self.s <= other.s)
    }

    #[inline]
    pub fn coincident(self, other: Point) -> bool {
        self.s == other.s && self.t == other.t
    }

    #[inline]
    pub fn transposed(self) -> Point {
        Point { s: self.t, t: self.s }
    }

    #[inline]
    pub fn l1_dist(self, other: Point) -> Real {
        (self.s - other.s).abs() + (self.t - other.t).abs()
    }
}

/// For `u <= v <= w` in sweep order, the signed vertical distance from the
/// segment `uw` to `v`, measured at `v.s`. Positive when `v` lies above
/// `uw`. Zero when `uw` is vertical.
pub fn edge_eval(u: Point, v: Point, w: Point) -> Real {
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r <= 0.0 {
        return 0.0;
    }
    // Interpolate from the nearer endpoint to keep the error small.
    if gap_l < gap_r {
        (v.t - u.t) + (u.t - w.t) * (gap_l / (gap_l + gap_r))
    } else {
        (v.t - w.t) + (w.t - u.t) * (gap_r / (gap_l + gap_r))
    }
}

/// Sign-compatible with [`edge_eval`]. Evaluated through `edge_eval` since the
/// unnormalised product form misorders nearly vertical edges.
#[inline]
pub fn edge_sign(u: Point, v: Point, w: Point) -> Real {
    edge_eval(u, v, w)
}

/// [`edge_eval`] in the transposed frame (distance along `s`, measured at `v.t`).
#[cfg(test)]
#[inline]
pub(crate) fn trans_eval(u: Point, v: Point, w: Point) -> Real {
    edge_eval(u.transposed(), v.transposed(), w.transposed())
}

/// True if `u`, `v`, `w` turn counter-clockwise (or are collinear).
#[inline]
pub fn ccw(u: Point, v: Point, w: Point) -> bool {
    u.s * (v.t - w.t) + v.s * (w.t - u.t) + w.s * (u.t - v.t) >= 0.0
}

/// `(b*x + a*y) / (a + b)` with negative weights clamped to zero. The result
/// always lies between `x` and `y`; with both weights zero it is the midpoint.
#[inline]
pub fn interpolate(a: Real, x: Real, b: Real, y: Real) -> Real {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            x / 2.0 + y / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of segments `o1-d1` and `o2-d2`. The point always lies in the
/// bounding box of both segments even when they only touch or are parallel.
pub fn edge_intersect(o1: Point, d1: Point, o2: Point, d2: Point) -> Point {
    let s = intersect_coordinate(o1, d1, o2, d2);
    let t = intersect_coordinate(o1.transposed(), d1.transposed(), o2.transposed(), d2.transposed());
    Point { s, t }
}

/// The `s` coordinate of the crossing. Sorting the four endpoints first makes
/// the computation independent of argument order.
fn intersect_coordinate(o1: Point, d1: Point, o2: Point, d2: Point) -> Real {
    let (mut a, mut b) = if o1.leq(d1) { (o1, d1) } else { (d1, o1) };
    let (mut c, mut d) = if o2.leq(d2) { (o2, d2) } else { (d2, o2) };
    if !a.leq(c) {
        std::mem::swap(&mut a, &mut c);
        std::mem::swap(&mut b, &mut d);
    }

    if !c.leq(b) {
        // No overlap along s: split the gap.
        return c.s / 2.0 + b.s / 2.0;
    }
    if b.leq(d) {
        // c and b both lie inside the other segment's span.
        let (z1, z2) = same_sign(edge_eval(a, c, b), edge_eval(c, b, d));
        interpolate(z1, c.s, z2, b.s)
    } else {
        // cd lies inside ab.
        let (z1, z2) = same_sign(edge_sign(a, c, b), -edge_sign(a, d, b));
        interpolate(z1, c.s, z2, d.s)
    }
}

#[inline]
fn same_sign(z1: Real, z2: Real) -> (Real, Real) {
    if z1 + z2 < 0.0 {
        (-z1, -z2)
    } else {
        (z1, z2)
    }
}
