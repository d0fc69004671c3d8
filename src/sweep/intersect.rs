// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Keeping adjacent regions consistent: endpoints that fall on the wrong side
// of a neighbouring edge are spliced into it, and edges that cross are split
// at a new vertex which is queued as a future event.

use log::trace;

use super::{add_winding, RegionId, Sweep};
use crate::error::{Result, TessError};
use crate::geom::{edge_intersect, edge_sign, Point, Real};
use crate::mesh::{Mesh, VertexId, UNDEF};
use crate::tess::CombineRequest;

/// Share of an edge's half of the total weight given to each endpoint,
/// inversely proportional to its L1 distance from `at`.
fn endpoint_weights(mesh: &Mesh, at: Point, org: VertexId, dst: VertexId) -> [Real; 2] {
    let t1 = mesh.pos(org).l1_dist(at);
    let t2 = mesh.pos(dst).l1_dist(at);
    let sum = t1 + t2;
    if sum <= 0.0 {
        return [0.25, 0.25];
    }
    [0.5 * t2 / sum, 0.5 * t1 / sum]
}

impl Sweep<'_> {
    /// Checks the right endpoints of the edges of `reg_up` and the region
    /// below it. If one lies on the wrong side of the other edge, it is
    /// spliced into that edge (or merged, if the two endpoints coincide).
    /// Returns true if the mesh changed.
    pub(super) fn check_for_right_splice(&mut self, reg_up: RegionId) -> Result<bool> {
        let reg_lo = self.below(reg_up)?;
        let e_up = self[reg_up].e_up;
        let e_lo = self[reg_lo].e_up;
        let m = &*self.mesh;
        let (org_up, org_lo, dst_lo, dst_up) = (m.org(e_up), m.org(e_lo), m.dst(e_lo), m.dst(e_up));

        if self.mesh.vert_leq(org_up, org_lo) {
            if edge_sign(m.pos(dst_lo), m.pos(org_up), m.pos(org_lo)) > 0.0 {
                return Ok(false);
            }
            // org_up lies below e_lo.
            if !self.mesh.vert_eq(org_up, org_lo) {
                self.mesh.split_edge(e_lo.sym())?;
                let lo_prev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, lo_prev)?;
                self[reg_up].dirty = true;
                self[reg_lo].dirty = true;
            } else if org_up != org_lo {
                // Same position: keep org_lo and drop org_up from the queue.
                self.pq_delete(org_up);
                self.stats.merged_vertices += 1;
                let lo_prev = self.mesh.oprev(e_lo);
                self.mesh.splice(lo_prev, e_up)?;
            }
        } else {
            if edge_sign(m.pos(dst_up), m.pos(org_lo), m.pos(org_up)) < 0.0 {
                return Ok(false);
            }
            // org_lo lies above e_up.
            self.mark_above_dirty(reg_up)?;
            self[reg_up].dirty = true;
            self.mesh.split_edge(e_up.sym())?;
            let lo_prev = self.mesh.oprev(e_lo);
            self.mesh.splice(lo_prev, e_up)?;
        }
        Ok(true)
    }

    /// The left-endpoint counterpart of [`Self::check_for_right_splice`]. The
    /// two left endpoints must not coincide.
    pub(super) fn check_for_left_splice(&mut self, reg_up: RegionId) -> Result<bool> {
        let reg_lo = self.below(reg_up)?;
        let e_up = self[reg_up].e_up;
        let e_lo = self[reg_lo].e_up;
        let m = &*self.mesh;
        let (org_up, org_lo, dst_lo, dst_up) = (m.org(e_up), m.org(e_lo), m.dst(e_lo), m.dst(e_up));
        debug_assert!(!m.vert_eq(dst_up, dst_lo));

        if self.mesh.vert_leq(dst_up, dst_lo) {
            if edge_sign(m.pos(dst_up), m.pos(dst_lo), m.pos(org_up)) < 0.0 {
                return Ok(false);
            }
            // dst_lo lies above e_up.
            self.mark_above_dirty(reg_up)?;
            self[reg_up].dirty = true;
            let e = self.mesh.split_edge(e_up)?;
            self.mesh.splice(e_lo.sym(), e)?;
            let f = self.mesh.lface(e);
            self.mesh[f].inside = self[reg_up].inside;
        } else {
            if edge_sign(m.pos(dst_lo), m.pos(dst_up), m.pos(org_lo)) > 0.0 {
                return Ok(false);
            }
            // dst_up lies below e_lo.
            self[reg_up].dirty = true;
            self[reg_lo].dirty = true;
            let e = self.mesh.split_edge(e_lo)?;
            let up_next = self.mesh.lnext(e_up);
            self.mesh.splice(up_next, e_lo.sym())?;
            let f = self.mesh.rface(e);
            self.mesh[f].inside = self[reg_up].inside;
        }
        Ok(true)
    }

    /// Tests the upper edges of `reg_up` and the region below for a crossing
    /// to the right of the current event. A crossing is resolved by splitting
    /// both edges at a shared new vertex, which is queued as an event.
    ///
    /// Returns true if the regions were rebuilt and dirty regions were
    /// already walked as part of that.
    pub(super) fn check_for_intersect(&mut self, reg_up: RegionId) -> Result<bool> {
        let reg_lo = self.below(reg_up)?;
        let e_up = self[reg_up].e_up;
        let e_lo = self[reg_lo].e_up;
        let event = self.event;
        let m = &*self.mesh;
        let (org_up, org_lo, dst_up, dst_lo) = (m.org(e_up), m.org(e_lo), m.dst(e_up), m.dst(e_lo));
        let (p_org_up, p_org_lo, p_dst_up, p_dst_lo) =
            (m.pos(org_up), m.pos(org_lo), m.pos(dst_up), m.pos(dst_lo));
        let ev = m.pos(event);

        debug_assert!(!p_dst_lo.coincident(p_dst_up));
        debug_assert!(!self[reg_up].fix_upper_edge && !self[reg_lo].fix_upper_edge);

        if org_up == org_lo {
            return Ok(false);
        }
        // The t ranges do not overlap.
        if p_org_up.t.min(p_dst_up.t) > p_org_lo.t.max(p_dst_lo.t) {
            return Ok(false);
        }
        if p_org_up.leq(p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return Ok(false);
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return Ok(false);
        }

        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);
        // Keep the new vertex at or after the event, and no further right than
        // the nearer right endpoint.
        if isect.leq(ev) {
            isect = ev;
        }
        let p_org_min = if p_org_up.leq(p_org_lo) { p_org_up } else { p_org_lo };
        if p_org_min.leq(isect) {
            isect = p_org_min;
        }

        if isect.coincident(p_org_up) || isect.coincident(p_org_lo) {
            // The crossing is at one of the right endpoints.
            self.check_for_right_splice(reg_up)?;
            return Ok(false);
        }

        if (!p_dst_up.coincident(ev) && edge_sign(p_dst_up, ev, isect) >= 0.0)
            || (!p_dst_lo.coincident(ev) && edge_sign(p_dst_lo, ev, isect) <= 0.0)
        {
            // The crossing would land left of the sweep line; the event itself
            // becomes the crossing point.
            if dst_lo == event {
                // Splice dst_lo into e_up and rebuild the regions around it.
                self.mesh.split_edge(e_up.sym())?;
                self.mesh.splice(e_lo.sym(), e_up)?;
                let reg_up = self.top_left_region(reg_up)?;
                let below = self.below(reg_up)?;
                let e_up = self[below].e_up;
                self.finish_left_regions(below, Some(reg_lo))?;
                let first = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, first, e_up, Some(e_up), true)?;
                return Ok(true);
            }
            if dst_up == event {
                // Splice dst_up into e_lo and rebuild the regions around it.
                self.mesh.split_edge(e_lo.sym())?;
                let (up_next, lo_prev) = (self.mesh.lnext(e_up), self.mesh.oprev(e_lo));
                self.mesh.splice(up_next, lo_prev)?;
                let reg_lo = reg_up;
                let reg_up = self.top_right_region(reg_up)?;
                let below = self.below(reg_up)?;
                let e_top_left = self.mesh.rprev(self[below].e_up);
                self[reg_lo].e_up = self.mesh.oprev(e_lo);
                let e_lo = self.finish_left_regions(reg_lo, None)?;
                let (first, last) = (self.mesh.onext(e_lo), self.mesh.rprev(e_up));
                self.add_right_edges(reg_up, first, last, Some(e_top_left), true)?;
                return Ok(true);
            }
            // Reached from a right vertex: split any edge passing on the wrong
            // side of the event and leave the splicing to the caller.
            if edge_sign(p_dst_up, ev, isect) >= 0.0 {
                self.mark_above_dirty(reg_up)?;
                self[reg_up].dirty = true;
                self.mesh.split_edge(e_up.sym())?;
                let v = self.mesh.org(e_up);
                self.mesh[v].pos = ev;
            }
            if edge_sign(p_dst_lo, ev, isect) <= 0.0 {
                self[reg_up].dirty = true;
                self[reg_lo].dirty = true;
                self.mesh.split_edge(e_lo.sym())?;
                let v = self.mesh.org(e_lo);
                self.mesh[v].pos = ev;
            }
            return Ok(false);
        }

        // General case: split both edges and join them at the new vertex.
        self.mesh.split_edge(e_up.sym())?;
        self.mesh.split_edge(e_lo.sym())?;
        let lo_prev = self.mesh.oprev(e_lo);
        self.mesh.splice(lo_prev, e_up)?;
        let v = self.mesh.org(e_up);
        self.mesh[v].pos = isect;
        let h = self.pq_insert(v)?;
        self.mesh[v].pq_handle = h;
        self.intersection_data(v, (org_up, dst_up), (org_lo, dst_lo))?;
        self.stats.intersections += 1;
        trace!("edges cross at ({}, {})", isect.s, isect.t);

        self.mark_above_dirty(reg_up)?;
        self[reg_up].dirty = true;
        self[reg_lo].dirty = true;
        Ok(false)
    }

    /// Interpolates the 3D position of the crossing vertex `v` from the
    /// endpoints of the two edges and asks the combine callback for its index.
    fn intersection_data(
        &mut self,
        v: VertexId,
        up: (VertexId, VertexId),
        lo: (VertexId, VertexId),
    ) -> Result<()> {
        let at = self.mesh.pos(v);
        let [w0, w1] = endpoint_weights(self.mesh, at, up.0, up.1);
        let [w2, w3] = endpoint_weights(self.mesh, at, lo.0, lo.1);
        let sources = [up.0, up.1, lo.0, lo.1];
        let weights = [w0, w1, w2, w3];

        let mut position = [0.0; 3];
        for (src, w) in sources.iter().zip(weights) {
            for (p, c) in position.iter_mut().zip(self.mesh[*src].coords) {
                *p += w * c;
            }
        }

        let idx = match self.combine.as_deref_mut() {
            Some(combine) => {
                let request = CombineRequest {
                    position,
                    sources: sources.map(|s| self.mesh[s].idx),
                    weights,
                };
                combine(&request).ok_or_else(|| TessError::CombineFailed {
                    s: at.s.to_string(),
                    t: at.t.to_string(),
                })?
            }
            None => UNDEF,
        };

        let vert = &mut self.mesh[v];
        vert.coords = position;
        vert.idx = idx;
        Ok(())
    }

    /// Re-validates every dirty region from `reg_up` downwards and upwards
    /// until none is left: edge order at both endpoints is restored, crossings
    /// are split, and two-edge loops are collapsed.
    pub(super) fn walk_dirty_regions(&mut self, reg_up: RegionId) -> Result<()> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up)?;

        loop {
            // Start from the lowest dirty region.
            while self[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.below(reg_lo)?;
            }
            if !self[reg_up].dirty {
                reg_lo = reg_up;
                match self.region_above(reg_up) {
                    Some(r) if self[r].dirty => reg_up = r,
                    _ => return Ok(()),
                }
            }
            self[reg_up].dirty = false;
            let mut e_up = self[reg_up].e_up;
            let mut e_lo = self[reg_lo].e_up;

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up)? {
                // A temporary edge is no longer needed once real edges reach
                // its vertex.
                if self[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo)?;
                    reg_lo = self.below(reg_up)?;
                    e_lo = self[reg_lo].e_up;
                } else if self[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up)?;
                    reg_up = self.above(reg_lo)?;
                    e_up = self[reg_up].e_up;
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let (dst_up, dst_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
                if dst_up != dst_lo
                    && !self[reg_up].fix_upper_edge
                    && !self[reg_lo].fix_upper_edge
                    && (dst_up == self.event || dst_lo == self.event)
                {
                    // The event lies between the two edges, so it can serve as
                    // the crossing point if all else fails.
                    if self.check_for_intersect(reg_up)? {
                        // Regions were rebuilt and walked recursively.
                        return Ok(());
                    }
                } else {
                    self.check_for_right_splice(reg_up)?;
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // Two edges forming a loop of their own.
                add_winding(self.mesh, e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up)?;
                reg_up = self.above(reg_lo)?;
            }
        }
    }
}
