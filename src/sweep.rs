// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep-line pass over the projected mesh.
//
// Vertices are processed in sweep order. Between adjacent edges crossing the
// sweep line lie active regions, kept in a `Dict` ordered bottom to top. Each
// region carries the winding number of the area it covers; when both of its
// edges end, the mesh face it covered is labelled inside or outside.
// Along the way crossing edges are split at their intersection and extra
// edges are added so that every inside face comes out monotone.

mod connect;
mod intersect;

use std::ops::{Index, IndexMut};

use log::{debug, trace};

use crate::dict::{Dict, NodeId};
use crate::error::{reserve, Result, TessError};
use crate::geom::{edge_eval, edge_sign, Point};
use crate::mesh::{FaceId, HalfEdgeId, Mesh, VertexId};
use crate::priorityq::{PqHandle, PriorityQ};
use crate::tess::{CombineFn, WindingRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u32);

impl RegionId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The area between two edges that are adjacent on the sweep line.
#[derive(Debug, Clone)]
pub struct ActiveRegion {
    /// Upper edge, directed right to left.
    pub e_up: HalfEdgeId,
    pub node_up: NodeId,
    pub winding_number: i32,
    pub inside: bool,
    /// One of the two bounding edges placed beyond the input.
    pub sentinel: bool,
    /// An edge of this region changed; the pair needs re-checking for
    /// ordering and intersections.
    pub dirty: bool,
    /// `e_up` is a temporary edge added for a vertex with no right-going
    /// edges, to be replaced once a real edge is known.
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: HalfEdgeId) -> Self {
        ActiveRegion {
            e_up,
            node_up: NodeId::INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Counters collected during one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepStats {
    /// Vertices taken from the event queue.
    pub events: usize,
    /// Vertices created where two edges cross.
    pub intersections: usize,
    /// Vertices merged into another at the same position.
    pub merged_vertices: usize,
    /// Temporary edges added for vertices without right-going edges.
    pub fixable_edges: usize,
}

pub(crate) struct Sweep<'a> {
    mesh: &'a mut Mesh,
    rule: WindingRule,
    bounds: (Point, Point),
    dict: Dict<RegionId>,
    pq: PriorityQ<VertexId>,
    regions: Vec<ActiveRegion>,
    free_regions: Vec<RegionId>,
    /// Vertex currently being swept; the region ordering is relative to it.
    event: VertexId,
    combine: Option<&'a mut CombineFn>,
    stats: SweepStats,
}

impl Index<RegionId> for Sweep<'_> {
    type Output = ActiveRegion;
    #[inline]
    fn index(&self, r: RegionId) -> &ActiveRegion {
        &self.regions[r.index()]
    }
}

impl IndexMut<RegionId> for Sweep<'_> {
    #[inline]
    fn index_mut(&mut self, r: RegionId) -> &mut ActiveRegion {
        &mut self.regions[r.index()]
    }
}

/// Ordering of two region upper edges at the current event.
///
/// Both edges must cross the sweep line at `event` (or end there). Edges
/// ending at the event are ordered by slope; otherwise by where they cross
/// the sweep line.
fn edge_leq(mesh: &Mesh, event: VertexId, e1: HalfEdgeId, e2: HalfEdgeId) -> bool {
    let ev = mesh.pos(event);
    let (o1, d1) = (mesh.org(e1), mesh.dst(e1));
    let (o2, d2) = (mesh.org(e2), mesh.dst(e2));

    if d1 == event {
        if d2 == event {
            if mesh.vert_leq(o1, o2) {
                return edge_sign(mesh.pos(d2), mesh.pos(o1), mesh.pos(o2)) <= 0.0;
            }
            return edge_sign(mesh.pos(d1), mesh.pos(o2), mesh.pos(o1)) >= 0.0;
        }
        return edge_sign(mesh.pos(d2), ev, mesh.pos(o2)) <= 0.0;
    }
    if d2 == event {
        return edge_sign(mesh.pos(d1), ev, mesh.pos(o1)) >= 0.0;
    }

    let t1 = edge_eval(mesh.pos(d1), ev, mesh.pos(o1));
    let t2 = edge_eval(mesh.pos(d2), ev, mesh.pos(o2));
    t1 >= t2
}

/// Folds the winding of `src` into `dst` before `src` is removed.
fn add_winding(mesh: &mut Mesh, dst: HalfEdgeId, src: HalfEdgeId) {
    mesh[dst].winding += mesh[src].winding;
    mesh[dst.sym()].winding += mesh[src.sym()].winding;
}

impl<'a> Sweep<'a> {
    /// `bounds` is the (min, max) corner of the projected input.
    pub(crate) fn new(
        mesh: &'a mut Mesh,
        rule: WindingRule,
        bounds: (Point, Point),
        combine: Option<&'a mut CombineFn>,
    ) -> Self {
        Sweep {
            mesh,
            rule,
            bounds,
            dict: Dict::new(),
            pq: PriorityQ::new(),
            regions: Vec::new(),
            free_regions: Vec::new(),
            event: VertexId::INVALID,
            combine,
            stats: SweepStats::default(),
        }
    }

    /// Labels every face of the mesh inside or outside. On return all inside
    /// faces are monotone and no two edges cross.
    pub(crate) fn run(mut self) -> Result<SweepStats> {
        self.remove_degenerate_edges()?;
        self.init_event_queue()?;
        self.init_edge_dict()?;
        debug!(
            "sweeping {} events with {:?} winding",
            self.pq.len(),
            self.rule
        );

        while let Some(v) = self.pq_extract() {
            // Coincident vertices become one event.
            while let Some(next) = self.pq.minimum() {
                if !self.mesh.vert_eq(next, v) {
                    break;
                }
                self.pq_extract();
                self.stats.merged_vertices += 1;
                let (keep, gone) = (self.mesh[v].an_edge, self.mesh[next].an_edge);
                self.mesh.splice(keep, gone)?;
            }
            self.stats.events += 1;
            self.sweep_event(v)?;
        }

        self.done_edge_dict();
        self.remove_degenerate_faces()?;
        self.mesh.check();
        debug!("sweep finished: {:?}", self.stats);
        Ok(self.stats)
    }

    // ── Event queue ─────────────────────────────────────────────────────────

    fn init_event_queue(&mut self) -> Result<()> {
        self.pq = PriorityQ::with_capacity(self.mesh.vertex_count() + 8)?;
        let mut v = self.mesh.next_vertex(VertexId::HEAD);
        while v != VertexId::HEAD {
            let h = self.pq_insert(v)?;
            self.mesh[v].pq_handle = h;
            v = self.mesh.next_vertex(v);
        }
        let mesh = &*self.mesh;
        self.pq.init(|a, b| mesh.vert_precedes(a, b));
        Ok(())
    }

    fn pq_insert(&mut self, v: VertexId) -> Result<PqHandle> {
        let mesh = &*self.mesh;
        self.pq.insert(v, |a, b| mesh.vert_precedes(a, b))
    }

    fn pq_extract(&mut self) -> Option<VertexId> {
        let mesh = &*self.mesh;
        let v = self.pq.extract_min(|a, b| mesh.vert_precedes(a, b))?;
        self.mesh[v].pq_handle = PqHandle::INVALID;
        Some(v)
    }

    fn pq_delete(&mut self, v: VertexId) {
        let h = self.mesh[v].pq_handle;
        let mesh = &*self.mesh;
        self.pq.delete(h, |a, b| mesh.vert_precedes(a, b));
        self.mesh[v].pq_handle = PqHandle::INVALID;
    }

    // ── Regions ─────────────────────────────────────────────────────────────

    fn alloc_region(&mut self, region: ActiveRegion) -> Result<RegionId> {
        if let Some(r) = self.free_regions.pop() {
            self[r] = region;
            return Ok(r);
        }
        reserve(&mut self.regions, 1, "active region")?;
        self.regions.push(region);
        Ok(RegionId(self.regions.len() as u32 - 1))
    }

    fn region_above(&self, r: RegionId) -> Option<RegionId> {
        self.dict.key(self.dict.succ(self[r].node_up))
    }

    fn region_below(&self, r: RegionId) -> Option<RegionId> {
        self.dict.key(self.dict.pred(self[r].node_up))
    }

    /// The region above `r`, which exists for everything but the top sentinel.
    fn above(&self, r: RegionId) -> Result<RegionId> {
        self.region_above(r)
            .ok_or(TessError::Topology("region has nothing above it"))
    }

    fn below(&self, r: RegionId) -> Result<RegionId> {
        self.region_below(r)
            .ok_or(TessError::Topology("region has nothing below it"))
    }

    fn mark_above_dirty(&mut self, r: RegionId) -> Result<()> {
        let above = self.above(r)?;
        self[above].dirty = true;
        Ok(())
    }

    /// New region for `e_new_up`, placed just below `reg_above`.
    fn add_region_below(&mut self, reg_above: RegionId, e_new_up: HalfEdgeId) -> Result<RegionId> {
        let r = self.alloc_region(ActiveRegion::new(e_new_up))?;
        let hint = self[reg_above].node_up;
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict.insert_before(hint, r, |a, b| {
                edge_leq(mesh, event, regions[a.index()].e_up, regions[b.index()].e_up)
            })?
        };
        self[r].node_up = node;
        self.mesh[e_new_up].active_region = Some(r);
        Ok(r)
    }

    fn delete_region(&mut self, r: RegionId) {
        let ActiveRegion {
            e_up,
            node_up,
            fix_upper_edge,
            ..
        } = self[r];
        // A temporary edge has no winding of its own and must not have
        // picked any up.
        debug_assert!(!fix_upper_edge || self.mesh[e_up].winding == 0);
        self.mesh[e_up].active_region = None;
        self.dict.delete(node_up);
        self.free_regions.push(r);
    }

    /// Swaps the temporary upper edge of `r` for `new_edge`.
    fn fix_upper_edge(&mut self, r: RegionId, new_edge: HalfEdgeId) -> Result<()> {
        debug_assert!(self[r].fix_upper_edge);
        self.mesh.delete_edge(self[r].e_up)?;
        self[r].fix_upper_edge = false;
        self[r].e_up = new_edge;
        self.mesh[new_edge].active_region = Some(r);
        Ok(())
    }

    fn compute_winding(&mut self, r: RegionId) -> Result<()> {
        let above = self.above(r)?;
        let winding = self[above].winding_number + self.mesh[self[r].e_up].winding;
        self[r].winding_number = winding;
        self[r].inside = self.rule.is_inside(winding);
        Ok(())
    }

    /// Hands the region's inside flag to the face below its upper edge and
    /// retires the region.
    fn finish_region(&mut self, r: RegionId) {
        let e = self[r].e_up;
        let f = self.mesh.lface(e);
        self.mesh[f].inside = self[r].inside;
        self.mesh[f].an_edge = e;
        self.delete_region(r);
    }

    /// Finds the region above the uppermost edge sharing the origin of
    /// `reg`'s upper edge, fixing a temporary edge met on the way.
    fn top_left_region(&mut self, reg: RegionId) -> Result<RegionId> {
        let org = self.mesh.org(self[reg].e_up);
        let mut reg = reg;
        loop {
            reg = self.above(reg)?;
            if self.mesh.org(self[reg].e_up) != org {
                break;
            }
        }

        if self[reg].fix_upper_edge {
            let below = self.below(reg)?;
            let from = self[below].e_up.sym();
            let to = self.mesh.lnext(self[reg].e_up);
            let e = self.mesh.connect(from, to)?;
            self.fix_upper_edge(reg, e)?;
            reg = self.above(reg)?;
        }
        Ok(reg)
    }

    /// Finds the region above the uppermost edge sharing the destination of
    /// `reg`'s upper edge.
    fn top_right_region(&self, reg: RegionId) -> Result<RegionId> {
        let dst = self.mesh.dst(self[reg].e_up);
        let mut reg = reg;
        loop {
            reg = self.above(reg)?;
            if self.mesh.dst(self[reg].e_up) != dst {
                return Ok(reg);
            }
        }
    }

    /// Closes the regions from `reg_first` downwards whose edges end at the
    /// current event, relinking the mesh so the left-going edges of the event
    /// follow the region order. Stops at `reg_last` or at the first region
    /// whose upper edge does not end here. Returns the lowest left-going
    /// edge.
    fn finish_left_regions(
        &mut self,
        reg_first: RegionId,
        reg_last: Option<RegionId>,
    ) -> Result<HalfEdgeId> {
        let mut reg_prev = reg_first;
        let mut e_prev = self[reg_first].e_up;

        while Some(reg_prev) != reg_last {
            self[reg_prev].fix_upper_edge = false;
            let reg = self.below(reg_prev)?;
            let mut e = self[reg].e_up;

            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self[reg].fix_upper_edge {
                    // No more edges from this origin in the dictionary, though
                    // the vertex may have others in the mesh.
                    self.finish_region(reg_prev);
                    break;
                }
                // The edge below was temporary; replace it now.
                e = self.mesh.connect(self.mesh.lprev(e_prev), e.sym())?;
                self.fix_upper_edge(reg, e)?;
            }

            if self.mesh.onext(e_prev) != e {
                self.mesh.splice(self.mesh.oprev(e), e)?;
                self.mesh.splice(e_prev, e)?;
            }
            self.finish_region(reg_prev);
            e_prev = self[reg].e_up;
            reg_prev = reg;
        }
        Ok(e_prev)
    }

    /// Adds regions for the right-going edges `e_first ..= e_last` (walking
    /// `onext`) below `reg_up`, then walks every right-going edge of the
    /// event in region order, fixing the mesh order and the winding numbers.
    /// `e_top_left` is the edge just above the new ones in `onext` order, or
    /// `None` if the event has no left-going edges.
    fn add_right_edges(
        &mut self,
        reg_up: RegionId,
        e_first: HalfEdgeId,
        e_last: HalfEdgeId,
        e_top_left: Option<HalfEdgeId>,
        clean_up: bool,
    ) -> Result<()> {
        let mut e = e_first;
        loop {
            debug_assert!(self.mesh.edge_goes_right(e));
            self.add_region_below(reg_up, e.sym())?;
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = match e_top_left {
            Some(e) => e,
            None => {
                let below = self.below(reg_up)?;
                self.mesh.rprev(self[below].e_up)
            }
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first = true;
        loop {
            let reg = self.below(reg_prev)?;
            let e = self[reg].e_up.sym();
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Move e to sit just below e_prev.
                self.mesh.splice(self.mesh.oprev(e), e)?;
                self.mesh.splice(self.mesh.oprev(e_prev), e)?;
            }
            let winding = self[reg_prev].winding_number - self.mesh[e].winding;
            self[reg].winding_number = winding;
            self[reg].inside = self.rule.is_inside(winding);

            // Outgoing edges with the same slope are merged before any
            // intersection test.
            self[reg_prev].dirty = true;
            if !first && self.check_for_right_splice(reg_prev)? {
                add_winding(self.mesh, e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev)?;
            }
            first = false;
            reg_prev = reg;
            e_prev = e;
        }
        self[reg_prev].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev)?;
        }
        Ok(())
    }

    // ── Events ──────────────────────────────────────────────────────────────

    fn sweep_event(&mut self, v: VertexId) -> Result<()> {
        self.event = v;

        // An edge of v that is already in the dictionary locates v directly.
        let start = self.mesh[v].an_edge;
        let mut e = start;
        let active = loop {
            if let Some(r) = self.mesh[e].active_region {
                break r;
            }
            e = self.mesh.onext(e);
            if e == start {
                trace!("event {:?} at {:?}: local minimum", v, self.mesh.pos(v));
                return self.connect_left_vertex(v);
            }
        };

        // Close every region bounded on both sides by edges ending here.
        let reg_up = self.top_left_region(active)?;
        let reg = self.below(reg_up)?;
        let e_top_left = self[reg].e_up;
        let e_bottom_left = self.finish_left_regions(reg, None)?;

        if self.mesh.onext(e_bottom_left) == e_top_left {
            trace!("event {:?} at {:?}: local maximum", v, self.mesh.pos(v));
            self.connect_right_vertex(reg_up, e_bottom_left)
        } else {
            trace!("event {:?} at {:?}: regular", v, self.mesh.pos(v));
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, Some(e_top_left), true)
        }
    }

    // ── Setup and teardown ──────────────────────────────────────────────────

    fn add_sentinel(&mut self, s_min: f32, s_max: f32, t: f32) -> Result<()> {
        let e = self.mesh.make_edge()?;
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh[org].pos = Point::new(s_max, t);
        self.mesh[dst].pos = Point::new(s_min, t);
        self.event = dst;

        let r = self.alloc_region(ActiveRegion {
            sentinel: true,
            ..ActiveRegion::new(e)
        })?;
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict.insert(r, |a, b| {
                edge_leq(mesh, event, regions[a.index()].e_up, regions[b.index()].e_up)
            })?
        };
        self[r].node_up = node;
        Ok(())
    }

    /// Two horizontal sentinel edges below and above everything, so that every
    /// real edge has a region on each side.
    fn init_edge_dict(&mut self) -> Result<()> {
        let (min, max) = self.bounds;
        // Widen an empty box so the sentinels never coincide.
        let w = (max.s - min.s) + 0.01;
        let h = (max.t - min.t) + 0.01;
        self.add_sentinel(min.s - w, max.s + w, min.t - h)?;
        self.add_sentinel(min.s - w, max.s + w, max.t + h)
    }

    fn done_edge_dict(&mut self) {
        let mut fixable = 0;
        while let Some(r) = self.dict.key(self.dict.min()) {
            // Only the sentinels and at most one temporary edge survive.
            if !self[r].sentinel {
                debug_assert!(self[r].fix_upper_edge);
                fixable += 1;
                debug_assert!(fixable == 1);
            }
            debug_assert_eq!(self[r].winding_number, 0);
            self.delete_region(r);
        }
    }

    /// Drops zero-length edges and contours of one or two edges.
    fn remove_degenerate_edges(&mut self) -> Result<()> {
        let mut e = self.mesh.next_edge(HalfEdgeId::HEAD);
        while e != HalfEdgeId::HEAD {
            let mut e_next = self.mesh.next_edge(e);
            let mut e_cur = e;
            let mut e_lnext = self.mesh.lnext(e_cur);

            if self.mesh.vert_eq(self.mesh.org(e_cur), self.mesh.dst(e_cur))
                && self.mesh.lnext(e_lnext) != e_cur
            {
                // Zero-length edge in a contour of three or more edges: merge
                // its endpoints, which leaves it a self-loop.
                self.stats.merged_vertices += 1;
                self.mesh.splice(e_lnext, e_cur)?;
                self.mesh.delete_edge(e_cur)?;
                e_cur = e_lnext;
                e_lnext = self.mesh.lnext(e_cur);
            }

            if self.mesh.lnext(e_lnext) == e_cur {
                // Contour of one or two edges.
                if e_lnext != e_cur {
                    if e_lnext.same_edge(e_next) {
                        e_next = self.mesh.next_edge(e_next);
                    }
                    self.mesh.delete_edge(e_lnext)?;
                }
                if e_cur.same_edge(e_next) {
                    e_next = self.mesh.next_edge(e_next);
                }
                self.mesh.delete_edge(e_cur)?;
            }
            e = e_next;
        }
        Ok(())
    }

    /// Removes faces bounded by only two edges, keeping their winding on the
    /// surviving edge.
    fn remove_degenerate_faces(&mut self) -> Result<()> {
        let mut f = self.mesh.next_face(FaceId::HEAD);
        while f != FaceId::HEAD {
            let f_next = self.mesh.next_face(f);
            let e = self.mesh[f].an_edge;
            debug_assert!(self.mesh.lnext(e) != e);
            if self.mesh.lnext(self.mesh.lnext(e)) == e {
                let survivor = self.mesh.onext(e);
                add_winding(self.mesh, survivor, e);
                self.mesh.delete_edge(e)?;
            }
            f = f_next;
        }
        Ok(())
    }
}
