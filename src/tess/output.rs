// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Collection of the finished mesh into flat output buffers.

use super::{ElementType, PrimitiveKind, PrimitiveSink};
use crate::error::{reserve, Result};
use crate::geom::Real;
use crate::mesh::{FaceId, Mesh, VertexId, UNDEF};

fn filled<T: Copy>(len: usize, value: T, what: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    reserve(&mut v, len, what)?;
    v.resize(len, value);
    Ok(v)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Output {
    pub vertices: Vec<Real>,
    pub vertex_indices: Vec<u32>,
    pub elements: Vec<u32>,
    pub vertex_count: usize,
    pub element_count: usize,
    element_type: ElementType,
    poly_size: usize,
    vertex_size: usize,
}

impl Output {
    fn write_vertex(&mut self, slot: usize, mesh: &Mesh, v: VertexId) {
        let vs = self.vertex_size;
        let coords = &mesh[v].coords;
        self.vertices[slot * vs..(slot + 1) * vs].copy_from_slice(&coords[..vs]);
        self.vertex_indices[slot] = mesh[v].idx;
    }

    /// Numbers the vertices and faces of the inside region and writes one
    /// element per inside face, padded with `UNDEF` to `poly_size`.
    pub(crate) fn polymesh(
        mesh: &mut Mesh,
        element_type: ElementType,
        poly_size: usize,
        vertex_size: usize,
    ) -> Result<Output> {
        let mut v = mesh.next_vertex(VertexId::HEAD);
        while v != VertexId::HEAD {
            mesh[v].n = UNDEF;
            v = mesh.next_vertex(v);
        }

        let mut vertex_count = 0u32;
        let mut element_count = 0u32;
        let mut f = mesh.next_face(FaceId::HEAD);
        while f != FaceId::HEAD {
            mesh[f].n = UNDEF;
            if mesh[f].inside {
                debug_assert!(mesh.count_face_verts(f) <= poly_size);
                let start = mesh[f].an_edge;
                let mut e = start;
                loop {
                    let v = mesh.org(e);
                    if mesh[v].n == UNDEF {
                        mesh[v].n = vertex_count;
                        vertex_count += 1;
                    }
                    e = mesh.lnext(e);
                    if e == start {
                        break;
                    }
                }
                mesh[f].n = element_count;
                element_count += 1;
            }
            f = mesh.next_face(f);
        }
        let mesh = &*mesh;

        let stride = match element_type {
            ElementType::ConnectedPolygons => poly_size * 2,
            _ => poly_size,
        };
        let (nv, ne) = (vertex_count as usize, element_count as usize);
        let mut out = Output {
            vertices: filled(nv * vertex_size, 0.0, "output vertex")?,
            vertex_indices: filled(nv, UNDEF, "output vertex")?,
            elements: filled(ne * stride, UNDEF, "output element")?,
            vertex_count: nv,
            element_count: ne,
            element_type,
            poly_size,
            vertex_size,
        };

        for v in mesh.vertices() {
            let n = mesh[v].n;
            if n != UNDEF {
                out.write_vertex(n as usize, mesh, v);
            }
        }

        let mut chunks = out.elements.chunks_exact_mut(stride);
        for f in mesh.faces().filter(|&f| mesh[f].inside) {
            let Some(element) = chunks.next() else { break };
            let (corners, neighbours) = element.split_at_mut(poly_size);
            for (slot, e) in corners.iter_mut().zip(mesh.face_loop(mesh[f].an_edge)) {
                *slot = mesh[mesh.org(e)].n;
            }
            if element_type == ElementType::ConnectedPolygons {
                for (slot, e) in neighbours.iter_mut().zip(mesh.face_loop(mesh[f].an_edge)) {
                    let rf = mesh.rface(e);
                    *slot = if mesh.face_inside(rf) { mesh[rf].n } else { UNDEF };
                }
            }
        }
        Ok(out)
    }

    /// Writes every inside face as a contour: its vertices in loop order, and
    /// one `[first vertex, vertex count]` element.
    pub(crate) fn contours(mesh: &Mesh, vertex_size: usize) -> Result<Output> {
        let inside = || mesh.faces().filter(|&f| mesh[f].inside);
        let nv: usize = inside().map(|f| mesh.count_face_verts(f)).sum();
        let ne = inside().count();

        let mut out = Output {
            vertices: filled(nv * vertex_size, 0.0, "output vertex")?,
            vertex_indices: filled(nv, UNDEF, "output vertex")?,
            elements: filled(ne * 2, UNDEF, "output element")?,
            vertex_count: nv,
            element_count: ne,
            element_type: ElementType::BoundaryContours,
            poly_size: 0,
            vertex_size,
        };

        let mut slot = 0usize;
        for (k, f) in inside().enumerate() {
            let first = slot;
            for e in mesh.face_loop(mesh[f].an_edge) {
                out.write_vertex(slot, mesh, mesh.org(e));
                slot += 1;
            }
            out.elements[k * 2] = first as u32;
            out.elements[k * 2 + 1] = (slot - first) as u32;
        }
        Ok(out)
    }

    fn position(&self, n: u32) -> &[Real] {
        let vs = self.vertex_size;
        let at = n as usize * vs;
        &self.vertices[at..at + vs]
    }

    pub(crate) fn emit(&self, sink: &mut impl PrimitiveSink) {
        if self.element_count == 0 {
            return;
        }
        match self.element_type {
            ElementType::BoundaryContours => {
                for pair in self.elements.chunks_exact(2) {
                    let (first, count) = (pair[0], pair[1]);
                    sink.begin(PrimitiveKind::LineLoop);
                    for n in first..first + count {
                        sink.vertex(n, self.position(n));
                    }
                    sink.end();
                }
            }
            ElementType::Polygons | ElementType::ConnectedPolygons => {
                let stride = if self.element_type == ElementType::ConnectedPolygons {
                    self.poly_size * 2
                } else {
                    self.poly_size
                };
                for element in self.elements.chunks_exact(stride) {
                    sink.begin(PrimitiveKind::Polygon);
                    for &n in element[..self.poly_size].iter().take_while(|&&n| n != UNDEF) {
                        sink.vertex(n, self.position(n));
                    }
                    sink.end();
                }
            }
        }
    }
}
