// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh (Guibas/Stolfi style) stored in index arenas.
//
// Layout:
//   - Half-edges are allocated in pairs at indices 2k and 2k+1, so the
//     symmetric half is `id ^ 1`.
//   - Vertices and faces form doubly linked rings closed by a head record at
//     index 0. Edge pairs form the same kind of ring through `PairLink`,
//     with the head pair at half-edge indices 0 and 1.
//   - Released records go on a free list and are reused by later allocations.
//
// Every public operation keeps the loop invariants
// `e.lnext.onext.sym == e` and `e.onext.sym.lnext == e` for all live half-edges.

mod check;

use std::ops::{Index, IndexMut};

use crate::error::{reserve, Result};
use crate::geom::{ccw, Point, Real};
use crate::priorityq::PqHandle;
use crate::sweep::RegionId;

/// Marker for "no output index / no input index".
pub const UNDEF: u32 = u32::MAX;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);
            pub const HEAD: $name = $name(0);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }
    };
}

arena_id!(
    /// Stable index of a vertex record.
    VertexId
);
arena_id!(
    /// Stable index of a face record.
    FaceId
);
arena_id!(
    /// Stable index of a half-edge. Its twin is [`HalfEdgeId::sym`].
    HalfEdgeId
);

impl HalfEdgeId {
    #[inline]
    pub fn sym(self) -> HalfEdgeId {
        HalfEdgeId(self.0 ^ 1)
    }

    /// True if both halves belong to the same edge pair.
    #[inline]
    pub fn same_edge(self, other: HalfEdgeId) -> bool {
        self.0 >> 1 == other.0 >> 1
    }

    /// The even half of this edge's pair, used as the key of the pair.
    #[inline]
    fn even(self) -> HalfEdgeId {
        HalfEdgeId(self.0 & !1)
    }

    #[inline]
    fn pair(self) -> usize {
        (self.0 >> 1) as usize
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub next: VertexId,
    pub prev: VertexId,
    /// Any half-edge with this vertex as origin.
    pub an_edge: HalfEdgeId,
    pub coords: [Real; 3],
    /// Projection onto the sweep plane.
    pub pos: Point,
    pub pq_handle: PqHandle,
    /// Output index, assigned during output collection.
    pub n: u32,
    /// Input index, or the index supplied by the combine callback.
    pub idx: u32,
}

impl Vertex {
    fn detached() -> Self {
        Vertex {
            next: VertexId::INVALID,
            prev: VertexId::INVALID,
            an_edge: HalfEdgeId::INVALID,
            coords: [0.0; 3],
            pos: Point::default(),
            pq_handle: PqHandle::INVALID,
            n: UNDEF,
            idx: UNDEF,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Face {
    pub next: FaceId,
    pub prev: FaceId,
    /// Any half-edge with this face on its left.
    pub an_edge: HalfEdgeId,
    /// Output element index, assigned during output collection.
    pub n: u32,
    pub inside: bool,
}

impl Face {
    fn detached() -> Self {
        Face {
            next: FaceId::INVALID,
            prev: FaceId::INVALID,
            an_edge: HalfEdgeId::INVALID,
            n: UNDEF,
            inside: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HalfEdge {
    /// Next half-edge counter-clockwise around the origin.
    pub onext: HalfEdgeId,
    /// Next half-edge counter-clockwise around the left face.
    pub lnext: HalfEdgeId,
    pub org: VertexId,
    pub lface: FaceId,
    /// Region whose upper edge this is, while the edge crosses the sweep line.
    pub active_region: Option<RegionId>,
    /// Change in winding number when crossing from the right face to the left.
    pub winding: i32,
}

impl HalfEdge {
    fn detached() -> Self {
        HalfEdge {
            onext: HalfEdgeId::INVALID,
            lnext: HalfEdgeId::INVALID,
            org: VertexId::INVALID,
            lface: FaceId::INVALID,
            active_region: None,
            winding: 0,
        }
    }
}

/// Which rings two half-edges had in common before a splice.
#[derive(Debug, Clone, Copy)]
struct SharedRings {
    origin: bool,
    face: bool,
}

/// Position of an edge pair in the global edge ring. Links name the even half.
#[derive(Debug, Clone, Copy)]
struct PairLink {
    next: HalfEdgeId,
    prev: HalfEdgeId,
}

pub struct Mesh {
    verts: Vec<Vertex>,
    faces: Vec<Face>,
    edges: Vec<HalfEdge>,
    pairs: Vec<PairLink>,
    free_verts: Vec<VertexId>,
    free_faces: Vec<FaceId>,
    free_pairs: Vec<HalfEdgeId>,
}

impl Index<VertexId> for Mesh {
    type Output = Vertex;
    #[inline]
    fn index(&self, v: VertexId) -> &Vertex {
        &self.verts[v.index()]
    }
}

impl IndexMut<VertexId> for Mesh {
    #[inline]
    fn index_mut(&mut self, v: VertexId) -> &mut Vertex {
        &mut self.verts[v.index()]
    }
}

impl Index<FaceId> for Mesh {
    type Output = Face;
    #[inline]
    fn index(&self, f: FaceId) -> &Face {
        &self.faces[f.index()]
    }
}

impl IndexMut<FaceId> for Mesh {
    #[inline]
    fn index_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.index()]
    }
}

impl Index<HalfEdgeId> for Mesh {
    type Output = HalfEdge;
    #[inline]
    fn index(&self, e: HalfEdgeId) -> &HalfEdge {
        &self.edges[e.index()]
    }
}

impl IndexMut<HalfEdgeId> for Mesh {
    #[inline]
    fn index_mut(&mut self, e: HalfEdgeId) -> &mut HalfEdge {
        &mut self.edges[e.index()]
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        let mut v_head = Vertex::detached();
        v_head.next = VertexId::HEAD;
        v_head.prev = VertexId::HEAD;
        let mut f_head = Face::detached();
        f_head.next = FaceId::HEAD;
        f_head.prev = FaceId::HEAD;

        Mesh {
            verts: vec![v_head],
            faces: vec![f_head],
            edges: vec![HalfEdge::detached(), HalfEdge::detached()],
            pairs: vec![PairLink {
                next: HalfEdgeId::HEAD,
                prev: HalfEdgeId::HEAD,
            }],
            free_verts: Vec::new(),
            free_faces: Vec::new(),
            free_pairs: Vec::new(),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    #[inline]
    pub fn onext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e].onext
    }

    #[inline]
    pub fn lnext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e].lnext
    }

    #[inline]
    pub fn org(&self, e: HalfEdgeId) -> VertexId {
        self[e].org
    }

    #[inline]
    pub fn dst(&self, e: HalfEdgeId) -> VertexId {
        self[e.sym()].org
    }

    #[inline]
    pub fn lface(&self, e: HalfEdgeId) -> FaceId {
        self[e].lface
    }

    #[inline]
    pub fn rface(&self, e: HalfEdgeId) -> FaceId {
        self[e.sym()].lface
    }

    #[inline]
    pub fn oprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e.sym()].lnext
    }

    #[inline]
    pub fn lprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e].onext.sym()
    }

    #[inline]
    pub fn dprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e].lnext.sym()
    }

    #[inline]
    pub fn rprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e.sym()].onext
    }

    #[inline]
    pub fn dnext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.rprev(e).sym()
    }

    #[inline]
    pub fn rnext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.oprev(e).sym()
    }

    #[inline]
    pub fn pos(&self, v: VertexId) -> Point {
        self[v].pos
    }

    #[inline]
    pub fn vert_leq(&self, u: VertexId, v: VertexId) -> bool {
        self.pos(u).leq(self.pos(v))
    }

    #[inline]
    pub fn vert_eq(&self, u: VertexId, v: VertexId) -> bool {
        self.pos(u).coincident(self.pos(v))
    }

    /// Sweep order made strict: equal positions fall back to the vertex id.
    #[inline]
    pub fn vert_precedes(&self, u: VertexId, v: VertexId) -> bool {
        let (a, b) = (self.pos(u), self.pos(v));
        if a.coincident(b) {
            u <= v
        } else {
            a.leq(b)
        }
    }

    #[inline]
    pub fn edge_goes_left(&self, e: HalfEdgeId) -> bool {
        self.vert_leq(self.dst(e), self.org(e))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: HalfEdgeId) -> bool {
        self.vert_leq(self.org(e), self.dst(e))
    }

    #[inline]
    pub fn face_inside(&self, f: FaceId) -> bool {
        f.is_valid() && self[f].inside
    }

    // ── Iteration over the global rings ─────────────────────────────────────

    #[inline]
    pub fn next_vertex(&self, v: VertexId) -> VertexId {
        self[v].next
    }

    #[inline]
    pub fn next_face(&self, f: FaceId) -> FaceId {
        self[f].next
    }

    /// Next edge in the global ring, named by its even half. Pass
    /// [`HalfEdgeId::HEAD`] to start; the walk ends when `HEAD` comes back.
    #[inline]
    pub fn next_edge(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.pairs[e.pair()].next
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        ring(VertexId::HEAD, move |v| self.next_vertex(v))
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        ring(FaceId::HEAD, move |f| self.next_face(f))
    }

    pub fn edges(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        ring(HalfEdgeId::HEAD, move |e| self.next_edge(e))
    }

    /// Half-edges around the left face of `e`, starting with `e`.
    pub fn face_loop(&self, e: HalfEdgeId) -> impl Iterator<Item = HalfEdgeId> + '_ {
        let mut cur = Some(e);
        std::iter::from_fn(move || {
            let this = cur?;
            let next = self.lnext(this);
            cur = (next != e).then_some(next);
            Some(this)
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn face_count(&self) -> usize {
        self.faces().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    pub fn count_face_verts(&self, f: FaceId) -> usize {
        self.face_loop(self[f].an_edge).count()
    }

    // ── Allocation ──────────────────────────────────────────────────────────

    fn alloc_pair(&mut self) -> Result<HalfEdgeId> {
        if let Some(e) = self.free_pairs.pop() {
            return Ok(e);
        }
        reserve(&mut self.edges, 2, "half-edge")?;
        reserve(&mut self.pairs, 1, "half-edge")?;
        let e = HalfEdgeId(self.edges.len() as u32);
        self.edges.push(HalfEdge::detached());
        self.edges.push(HalfEdge::detached());
        self.pairs.push(PairLink {
            next: HalfEdgeId::INVALID,
            prev: HalfEdgeId::INVALID,
        });
        Ok(e)
    }

    fn alloc_vertex(&mut self) -> Result<VertexId> {
        if let Some(v) = self.free_verts.pop() {
            self[v] = Vertex::detached();
            return Ok(v);
        }
        reserve(&mut self.verts, 1, "vertex")?;
        self.verts.push(Vertex::detached());
        Ok(VertexId(self.verts.len() as u32 - 1))
    }

    fn alloc_face(&mut self) -> Result<FaceId> {
        if let Some(f) = self.free_faces.pop() {
            self[f] = Face::detached();
            return Ok(f);
        }
        reserve(&mut self.faces, 1, "face")?;
        self.faces.push(Face::detached());
        Ok(FaceId(self.faces.len() as u32 - 1))
    }

    /// New isolated pair forming a two-sided loop, linked into the edge ring
    /// just before `before`. Origin and face are left unset.
    fn new_pair(&mut self, before: HalfEdgeId) -> Result<HalfEdgeId> {
        let e = self.alloc_pair()?;
        let es = e.sym();
        self[e] = HalfEdge {
            onext: e,
            lnext: es,
            ..HalfEdge::detached()
        };
        self[es] = HalfEdge {
            onext: es,
            lnext: e,
            ..HalfEdge::detached()
        };

        let before = before.even();
        let prev = self.pairs[before.pair()].prev;
        self.pairs[e.pair()] = PairLink { next: before, prev };
        self.pairs[prev.pair()].next = e;
        self.pairs[before.pair()].prev = e;
        Ok(e)
    }

    /// New vertex for the origin ring of `e_orig`, placed before `v_next`.
    fn new_vertex(&mut self, e_orig: HalfEdgeId, v_next: VertexId) -> Result<VertexId> {
        let v = self.alloc_vertex()?;
        let v_prev = self[v_next].prev;
        {
            let vert = &mut self[v];
            vert.next = v_next;
            vert.prev = v_prev;
            vert.an_edge = e_orig;
        }
        self[v_prev].next = v;
        self[v_next].prev = v;

        let mut e = e_orig;
        loop {
            self[e].org = v;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        Ok(v)
    }

    /// New face for the left ring of `e_orig`, placed before `f_next` and
    /// inheriting its `inside` flag.
    fn new_face(&mut self, e_orig: HalfEdgeId, f_next: FaceId) -> Result<FaceId> {
        let f = self.alloc_face()?;
        let f_prev = self[f_next].prev;
        let inside = self[f_next].inside;
        {
            let face = &mut self[f];
            face.next = f_next;
            face.prev = f_prev;
            face.an_edge = e_orig;
            face.inside = inside;
        }
        self[f_prev].next = f;
        self[f_next].prev = f;

        let mut e = e_orig;
        loop {
            self[e].lface = f;
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        Ok(f)
    }

    /// Retire `v_del`, handing its origin ring to `new_org` (may be INVALID).
    fn absorb_vertex(&mut self, v_del: VertexId, new_org: VertexId) {
        let e_start = self[v_del].an_edge;
        let mut e = e_start;
        loop {
            self[e].org = new_org;
            e = self.onext(e);
            if e == e_start {
                break;
            }
        }
        let (prev, next) = (self[v_del].prev, self[v_del].next);
        self[next].prev = prev;
        self[prev].next = next;
        self[v_del] = Vertex::detached();
        self.free_verts.push(v_del);
    }

    /// Retire `f_del`, handing its left ring to `new_lface` (may be INVALID).
    fn absorb_face(&mut self, f_del: FaceId, new_lface: FaceId) {
        let e_start = self[f_del].an_edge;
        let mut e = e_start;
        loop {
            self[e].lface = new_lface;
            e = self.lnext(e);
            if e == e_start {
                break;
            }
        }
        let (prev, next) = (self[f_del].prev, self[f_del].next);
        self[next].prev = prev;
        self[prev].next = next;
        self[f_del] = Face::detached();
        self.free_faces.push(f_del);
    }

    fn release_pair(&mut self, e: HalfEdgeId) {
        let e = e.even();
        let PairLink { next, prev } = self.pairs[e.pair()];
        self.pairs[next.pair()].prev = prev;
        self.pairs[prev.pair()].next = next;
        self[e] = HalfEdge::detached();
        self[e.sym()] = HalfEdge::detached();
        self.free_pairs.push(e);
    }

    /// Exchange `a.onext` and `b.onext`, fixing the `lnext` links that point
    /// back at them. Rings are merged if distinct and split if shared.
    fn swap_onext(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        self[a_onext.sym()].lnext = b;
        self[b_onext.sym()].lnext = a;
        self[a].onext = b_onext;
        self[b].onext = a_onext;
    }

    // ── Public operations ───────────────────────────────────────────────────

    /// A new edge with two new endpoints and a single face on both sides.
    pub fn make_edge(&mut self) -> Result<HalfEdgeId> {
        let e = self.new_pair(HalfEdgeId::HEAD)?;
        self.new_vertex(e, VertexId::HEAD)?;
        self.new_vertex(e.sym(), VertexId::HEAD)?;
        self.new_face(e, FaceId::HEAD)?;
        Ok(e)
    }

    /// Joins or splits the origin rings of `e_org` and `e_dst`, and the
    /// corresponding left-face rings.
    ///
    /// Distinct rings are joined: `e_dst`'s vertex (or face) is retired and
    /// its edges adopt `e_org`'s. A shared ring is split in two and the part
    /// containing `e_dst` gets a fresh vertex (or face). Splicing an edge with
    /// itself is a no-op.
    pub fn splice(&mut self, e_org: HalfEdgeId, e_dst: HalfEdgeId) -> Result<()> {
        if e_org == e_dst {
            return Ok(());
        }
        let shared = SharedRings {
            origin: self.org(e_org) == self.org(e_dst),
            face: self.lface(e_org) == self.lface(e_dst),
        };
        self.join_rings(e_org, e_dst, shared);
        self.swap_onext(e_dst, e_org);
        self.split_rings(e_org, e_dst, shared)
    }

    /// Retires `e_dst`'s vertex and face when they differ from `e_org`'s.
    fn join_rings(&mut self, e_org: HalfEdgeId, e_dst: HalfEdgeId, shared: SharedRings) {
        if !shared.origin {
            let (retire, keep) = (self.org(e_dst), self.org(e_org));
            self.absorb_vertex(retire, keep);
        }
        if !shared.face {
            let (retire, keep) = (self.lface(e_dst), self.lface(e_org));
            self.absorb_face(retire, keep);
        }
    }

    /// After the exchange, a ring that was shared has become two; the one
    /// holding `e_dst` gets a new record.
    fn split_rings(&mut self, e_org: HalfEdgeId, e_dst: HalfEdgeId, shared: SharedRings) -> Result<()> {
        if shared.origin {
            let org = self.org(e_org);
            self.new_vertex(e_dst, org)?;
            self[org].an_edge = e_org;
        }
        if shared.face {
            let lface = self.lface(e_org);
            self.new_face(e_dst, lface)?;
            self[lface].an_edge = e_org;
        }
        Ok(())
    }

    /// Removes the edge `e_del`. Faces on either side are merged; an endpoint
    /// left without edges is removed too.
    pub fn delete_edge(&mut self, e_del: HalfEdgeId) -> Result<()> {
        let e_sym = e_del.sym();
        let joining_loops = self.lface(e_del) != self.rface(e_del);
        if joining_loops {
            let (lf, rf) = (self.lface(e_del), self.rface(e_del));
            self.absorb_face(lf, rf);
        }

        if self.onext(e_del) == e_del {
            let org = self.org(e_del);
            self.absorb_vertex(org, VertexId::INVALID);
        } else {
            let rf = self.rface(e_del);
            self[rf].an_edge = self.oprev(e_del);
            let org = self.org(e_del);
            self[org].an_edge = self.onext(e_del);

            self.swap_onext(e_del, self.oprev(e_del));
            if !joining_loops {
                // Removing the edge split one loop into two.
                let lf = self.lface(e_del);
                self.new_face(e_del, lf)?;
            }
        }

        if self.onext(e_sym) == e_sym {
            let (org, lf) = (self.org(e_sym), self.lface(e_sym));
            self.absorb_vertex(org, VertexId::INVALID);
            self.absorb_face(lf, FaceId::INVALID);
        } else {
            let lf = self.lface(e_del);
            self[lf].an_edge = self.oprev(e_sym);
            let org = self.org(e_sym);
            self[org].an_edge = self.onext(e_sym);
            self.swap_onext(e_sym, self.oprev(e_sym));
        }

        self.release_pair(e_del);
        Ok(())
    }

    /// New edge from `dst(e_org)` to a new vertex, following `e_org` around
    /// its left face.
    pub fn add_edge_vertex(&mut self, e_org: HalfEdgeId) -> Result<HalfEdgeId> {
        let e_new = self.new_pair(e_org)?;
        let e_new_sym = e_new.sym();

        self.swap_onext(e_new, self.lnext(e_org));
        let dst = self.dst(e_org);
        self[e_new].org = dst;
        self.new_vertex(e_new_sym, dst)?;

        let lf = self.lface(e_org);
        self[e_new].lface = lf;
        self[e_new_sym].lface = lf;
        Ok(e_new)
    }

    /// Splits `e_org` at a new vertex. `e_org` keeps its origin and ends at
    /// the new vertex; the returned edge runs from the new vertex to the old
    /// destination and carries the same winding.
    pub fn split_edge(&mut self, e_org: HalfEdgeId) -> Result<HalfEdgeId> {
        let e_new = self.add_edge_vertex(e_org)?.sym();
        let e_org_sym = e_org.sym();

        self.swap_onext(e_org_sym, self.oprev(e_org_sym));
        self.swap_onext(e_org_sym, e_new);

        let mid = self.org(e_new);
        self[e_org_sym].org = mid;
        let far = self.dst(e_new);
        self[far].an_edge = e_new.sym();
        let rf = self.rface(e_org);
        self[e_new.sym()].lface = rf;
        self[e_new].winding = self[e_org].winding;
        self[e_new.sym()].winding = self[e_org_sym].winding;
        Ok(e_new)
    }

    /// New edge from `dst(e_org)` to `org(e_dst)`. If both lie on the same
    /// face loop the face is split, otherwise the two loops merge.
    pub fn connect(&mut self, e_org: HalfEdgeId, e_dst: HalfEdgeId) -> Result<HalfEdgeId> {
        let e_new = self.new_pair(e_org)?;
        let e_new_sym = e_new.sym();

        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            let (gone, kept) = (self.lface(e_dst), self.lface(e_org));
            self.absorb_face(gone, kept);
        }

        self.swap_onext(e_new, self.lnext(e_org));
        self.swap_onext(e_new_sym, e_dst);

        self[e_new].org = self.dst(e_org);
        self[e_new_sym].org = self.org(e_dst);
        let lf = self.lface(e_org);
        self[e_new].lface = lf;
        self[e_new_sym].lface = lf;
        self[lf].an_edge = e_new_sym;

        if !joining_loops {
            self.new_face(e_new, lf)?;
        }
        Ok(e_new)
    }

    /// Destroys face `f_zap`. Its edges lose their left face; edges with no
    /// face on either side are removed together with any vertex they
    /// isolate.
    pub fn zap_face(&mut self, f_zap: FaceId) {
        let e_start = self[f_zap].an_edge;
        let mut e_next = self.lnext(e_start);
        loop {
            let e = e_next;
            e_next = self.lnext(e);
            self[e].lface = FaceId::INVALID;

            if !self.rface(e).is_valid() {
                for half in [e, e.sym()] {
                    if self.onext(half) == half {
                        let org = self.org(half);
                        self.absorb_vertex(org, VertexId::INVALID);
                    } else {
                        let org = self.org(half);
                        self[org].an_edge = self.onext(half);
                        self.swap_onext(half, self.oprev(half));
                    }
                }
                self.release_pair(e);
            }
            if e == e_start {
                break;
            }
        }

        let (prev, next) = (self[f_zap].prev, self[f_zap].next);
        self[next].prev = prev;
        self[prev].next = next;
        self[f_zap] = Face::detached();
        self.free_faces.push(f_zap);
    }

    /// Zaps every face not marked inside.
    pub fn discard_exterior(&mut self) {
        let mut f = self.next_face(FaceId::HEAD);
        while f != FaceId::HEAD {
            let next = self.next_face(f);
            if !self[f].inside {
                self.zap_face(f);
            }
            f = next;
        }
    }

    /// Boundary edges between inside and outside get winding `value` (sign
    /// chosen so the inside is on the left); other edges get zero or, with
    /// `keep_only_boundary`, are deleted so inside faces merge into their
    /// boundary loops.
    pub fn set_winding_number(&mut self, value: i32, keep_only_boundary: bool) -> Result<()> {
        let mut e = self.next_edge(HalfEdgeId::HEAD);
        while e != HalfEdgeId::HEAD {
            let e_next = self.next_edge(e);
            let left = self.face_inside(self.lface(e));
            if self.face_inside(self.rface(e)) != left {
                self[e].winding = if left { value } else { -value };
            } else if keep_only_boundary {
                self.delete_edge(e)?;
            } else {
                self[e].winding = 0;
            }
            e = e_next;
        }
        Ok(())
    }

    /// Greedily removes edges between two inside faces when the union stays
    /// convex and has at most `max_verts` vertices.
    pub fn merge_convex_faces(&mut self, max_verts: usize) -> Result<()> {
        let mut e = self.next_edge(HalfEdgeId::HEAD);
        while e != HalfEdgeId::HEAD {
            let mut e_next = self.next_edge(e);
            let es = e.sym();

            let (lf, rf) = (self.lface(e), self.lface(es));
            if !self.face_inside(lf) || !self.face_inside(rf) {
                e = e_next;
                continue;
            }
            let merged = self.count_face_verts(lf) + self.count_face_verts(rf) - 2;
            if merged > max_verts {
                e = e_next;
                continue;
            }

            //      vf--ve--vd
            //          ^|
            // left   e ||   right
            //          |v
            //      va--vb--vc
            let p = |v: VertexId| self.pos(v);
            let va = p(self.org(self.lprev(e)));
            let vb = p(self.org(e));
            let vc = p(self.dst(self.lnext(es)));
            let vd = p(self.org(self.lprev(es)));
            let ve = p(self.org(es));
            let vf = p(self.dst(self.lnext(e)));

            if ccw(va, vb, vc) && ccw(vd, ve, vf) {
                if e_next.same_edge(e) {
                    e_next = self.next_edge(e_next);
                }
                self.delete_edge(e)?;
            }
            e = e_next;
        }
        Ok(())
    }
}

/// Walks a head-closed ring, yielding every element after the head.
fn ring<T, F>(head: T, mut step: F) -> impl Iterator<Item = T>
where
    T: Copy + PartialEq,
    F: FnMut(T) -> T,
{
    let mut cur = step(head);
    std::iter::from_fn(move || {
        if cur == head {
            return None;
        }
        let this = cur;
        cur = step(cur);
        Some(this)
    })
}
