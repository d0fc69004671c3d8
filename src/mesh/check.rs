// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Structural validation of the half-edge rings.

use super::{FaceId, HalfEdgeId, Mesh, VertexId};
use crate::error::{Result, TessError};

fn corrupt(what: String) -> TessError {
    TessError::CorruptMesh(what)
}

impl Mesh {
    /// Asserts the mesh invariants. Active in debug builds or with the
    /// `mesh-check` feature.
    #[cfg(any(debug_assertions, feature = "mesh-check"))]
    pub fn check(&self) {
        if let Err(err) = self.verify() {
            panic!("{err}");
        }
    }

    #[cfg(not(any(debug_assertions, feature = "mesh-check")))]
    #[inline(always)]
    pub fn check(&self) {}

    /// Walks every face, vertex and edge ring and reports the first broken
    /// link.
    pub fn verify(&self) -> Result<()> {
        let limit = self.edges.len() + 1;

        let mut f_prev = FaceId::HEAD;
        let mut f = self.next_face(f_prev);
        while f != FaceId::HEAD {
            if self[f].prev != f_prev {
                return Err(corrupt(format!("face {f:?} has a stale prev link")));
            }
            let start = self[f].an_edge;
            let mut e = start;
            let mut steps = 0;
            loop {
                self.verify_edge_links(e)?;
                if self.lface(e) != f {
                    return Err(corrupt(format!("edge {e:?} is on the loop of face {f:?} but names {:?}", self.lface(e))));
                }
                e = self.lnext(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > limit {
                    return Err(corrupt(format!("loop of face {f:?} never closes")));
                }
            }
            f_prev = f;
            f = self.next_face(f);
        }
        if self[FaceId::HEAD].prev != f_prev {
            return Err(corrupt("face ring head has a stale prev link".into()));
        }

        let mut v_prev = VertexId::HEAD;
        let mut v = self.next_vertex(v_prev);
        while v != VertexId::HEAD {
            if self[v].prev != v_prev {
                return Err(corrupt(format!("vertex {v:?} has a stale prev link")));
            }
            let start = self[v].an_edge;
            let mut e = start;
            let mut steps = 0;
            loop {
                self.verify_edge_links(e)?;
                if self.org(e) != v {
                    return Err(corrupt(format!("edge {e:?} is around vertex {v:?} but names {:?}", self.org(e))));
                }
                e = self.onext(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > limit {
                    return Err(corrupt(format!("edge ring of vertex {v:?} never closes")));
                }
            }
            v_prev = v;
            v = self.next_vertex(v);
        }
        if self[VertexId::HEAD].prev != v_prev {
            return Err(corrupt("vertex ring head has a stale prev link".into()));
        }

        let mut e_prev = HalfEdgeId::HEAD;
        let mut e = self.next_edge(e_prev);
        while e != HalfEdgeId::HEAD {
            if self.pairs[e.pair()].prev != e_prev {
                return Err(corrupt(format!("edge {e:?} has a stale prev link")));
            }
            self.verify_edge_links(e)?;
            if !self.org(e).is_valid() || !self.dst(e).is_valid() {
                return Err(corrupt(format!("edge {e:?} is missing an endpoint")));
            }
            e_prev = e;
            e = self.next_edge(e);
        }
        Ok(())
    }

    fn verify_edge_links(&self, e: HalfEdgeId) -> Result<()> {
        if e.sym() == e || e.sym().sym() != e {
            return Err(corrupt(format!("edge {e:?} is not paired")));
        }
        if self.onext(self.lnext(e)).sym() != e {
            return Err(corrupt(format!("edge {e:?}: lnext.onext.sym does not return")));
        }
        if self.lnext(self.onext(e).sym()) != e {
            return Err(corrupt(format!("edge {e:?}: onext.sym.lnext does not return")));
        }
        Ok(())
    }
}
