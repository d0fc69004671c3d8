// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Events whose vertex has edges on one side only. These are the places where
// extra edges are added to the mesh, so that every face left behind by the
// sweep is monotone.

use super::{RegionId, Sweep};
use crate::error::{Result, TessError};
use crate::geom::edge_sign;
use crate::mesh::{HalfEdgeId, VertexId};

impl Sweep<'_> {
    /// The event has left-going edges only. `e_bottom_left` is the lowest of
    /// them; the regions they bounded have been closed and `reg_up` is the
    /// region above all of them.
    ///
    /// The event is joined to the nearer right endpoint of the edges above
    /// and below with a temporary edge, which keeps the region between them
    /// bounded until a real right-going edge turns up.
    pub(super) fn connect_right_vertex(
        &mut self,
        reg_up: RegionId,
        e_bottom_left: HalfEdgeId,
    ) -> Result<()> {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.below(reg_up)?;
        let e_up = self[reg_up].e_up;
        let e_lo = self[reg_lo].e_up;
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up)?;
        }

        // The edge above or below may now pass through the event, or end at a
        // crossing vertex placed on it.
        let event = self.event;
        if self.mesh.vert_eq(self.mesh.org(e_up), event) {
            let top_prev = self.mesh.oprev(e_top_left);
            self.mesh.splice(top_prev, e_up)?;
            reg_up = self.top_left_region(reg_up)?;
            let below = self.below(reg_up)?;
            e_top_left = self[below].e_up;
            self.finish_left_regions(below, Some(reg_lo))?;
            degenerate = true;
        }
        if self.mesh.vert_eq(self.mesh.org(e_lo), event) {
            let lo_prev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, lo_prev)?;
            e_bottom_left = self.finish_left_regions(reg_lo, None)?;
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            return self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true);
        }

        let target = if self.mesh.vert_leq(self.mesh.org(e_lo), self.mesh.org(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let from = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(from, target)?;

        // No cleanup yet: e_new must be marked temporary before anything can
        // remove it.
        let next = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, next, Some(next), false)?;
        let region = self.mesh[e_new.sym()]
            .active_region
            .ok_or(TessError::Topology("temporary edge has no region"))?;
        self[region].fix_upper_edge = true;
        self.stats.fixable_edges += 1;
        self.walk_dirty_regions(reg_up)
    }

    /// The event lies on the upper edge of `reg_up` (or at one of its ends).
    fn connect_left_degenerate(&mut self, reg_up: RegionId, v: VertexId) -> Result<()> {
        let e = self[reg_up].e_up;

        if self.mesh.vert_eq(self.mesh.org(e), v) {
            // An unprocessed vertex at the same place: merge, and let the
            // merged vertex come out of the queue later.
            self.stats.merged_vertices += 1;
            let an_edge = self.mesh[v].an_edge;
            return self.mesh.splice(e, an_edge);
        }

        if !self.mesh.vert_eq(self.mesh.dst(e), v) {
            // The edge passes through the event: split it there.
            self.mesh.split_edge(e.sym())?;
            if self[reg_up].fix_upper_edge {
                // Drop the now unneeded far half of the temporary edge.
                let far = self.mesh.onext(e);
                self.mesh.delete_edge(far)?;
                self[reg_up].fix_upper_edge = false;
            }
            let an_edge = self.mesh[v].an_edge;
            self.mesh.splice(an_edge, e)?;
            return self.sweep_event(v);
        }

        // The event coincides with the left end of e, which was already swept.
        // Its new right-going edges join those already there.
        let reg_up = self.top_right_region(reg_up)?;
        let reg = self.below(reg_up)?;
        let mut e_top_right = self[reg].e_up.sym();
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = Some(e_last);
        if self[reg].fix_upper_edge {
            // A real right-going edge replaces the temporary one.
            debug_assert!(e_last != e_top_right);
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right)?;
            e_top_right = self.mesh.oprev(e_last);
        }
        let an_edge = self.mesh[v].an_edge;
        self.mesh.splice(an_edge, e_top_right)?;
        if !self.mesh.edge_goes_left(e_last) {
            // No left-going edges at this vertex.
            e_top_left = None;
        }
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true)
    }

    /// The event has right-going edges only. If it lies inside the polygon it
    /// is joined to the nearer right endpoint of the edges above and below,
    /// which turns it into a regular vertex.
    pub(super) fn connect_left_vertex(&mut self, v: VertexId) -> Result<()> {
        // Locate the region containing the event using any of its edges,
        // reversed so that it ends at the event.
        let query = self.mesh[v].an_edge.sym();
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict
                .search(|r| super::edge_leq(mesh, event, query, regions[r.index()].e_up))
        };
        let reg_up = self
            .dict
            .key(node)
            .ok_or(TessError::Topology("event lies above the top sentinel"))?;
        let reg_lo = self.below(reg_up)?;
        let e_up = self[reg_up].e_up;
        let e_lo = self[reg_lo].e_up;

        let m = &*self.mesh;
        if edge_sign(m.pos(m.dst(e_up)), m.pos(v), m.pos(m.org(e_up))) == 0.0 {
            return self.connect_left_degenerate(reg_up, v);
        }

        // Join the event to whichever swept endpoint is nearer.
        let reg = if self.mesh.vert_leq(self.mesh.dst(e_lo), self.mesh.dst(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self[reg_up].inside || self[reg].fix_upper_edge {
            let an_edge = self.mesh[v].an_edge;
            let e_new = if reg == reg_up {
                let up_next = self.mesh.lnext(e_up);
                self.mesh.connect(an_edge.sym(), up_next)?
            } else {
                let lo_dnext = self.mesh.dnext(e_lo);
                self.mesh.connect(lo_dnext, an_edge)?.sym()
            };
            if self[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new)?;
            } else {
                let r = self.add_region_below(reg_up, e_new)?;
                self.compute_winding(r)?;
            }
            self.sweep_event(v)
        } else {
            // Outside the polygon there is no need to join the vertex to
            // anything.
            let an_edge = self.mesh[v].an_edge;
            self.add_right_edges(reg_up, an_edge, an_edge, None, true)
        }
    }
}
