// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Triangulation of the monotone faces left by the sweep.
//
// The sweep adds an edge at every vertex that would otherwise break
// monotonicity, so once it finishes each inside face has one leftmost and
// one rightmost vertex joined by an upper and a lower chain. Such a face is
// triangulated in a single left-to-right pass.

use log::debug;

use crate::error::Result;
use crate::geom::edge_sign;
use crate::mesh::{FaceId, HalfEdgeId, Mesh};

impl Mesh {
    /// Triangulates the monotone face `face` by adding diagonals.
    ///
    /// Both chains are walked from the rightmost vertex towards the left.
    /// Whichever chain has the next vertex further right advances; before it
    /// does, the pending vertices behind it are fanned off wherever the
    /// diagonal lies inside the face. A face with `n` vertices ends up as
    /// `n - 2` triangles.
    pub fn tessellate_mono_region(&mut self, face: FaceId) -> Result<()> {
        let mut up = self[face].an_edge;
        debug_assert!(self.lnext(up) != up && self.lnext(self.lnext(up)) != up);

        // Edges run counter-clockwise. Settle on the edge leaving the
        // rightmost vertex.
        while self.vert_leq(self.dst(up), self.org(up)) {
            up = self.lprev(up);
        }
        while self.vert_leq(self.org(up), self.dst(up)) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if self.vert_leq(self.dst(up), self.org(lo)) {
                // The upper chain's next vertex is further left, so triangles
                // can be cut off the lower chain.
                while self.lnext(lo) != up && self.lower_fan_fits(lo) {
                    let from = self.lnext(lo);
                    lo = self.connect(from, lo)?.sym();
                }
                lo = self.lprev(lo);
            } else {
                while self.lnext(lo) != up && self.upper_fan_fits(up) {
                    let to = self.lprev(up);
                    up = self.connect(up, to)?.sym();
                }
                up = self.lnext(up);
            }
        }

        // The last vertex sees every pending one.
        debug_assert!(self.lnext(lo) != up);
        while self.lnext(self.lnext(lo)) != up {
            let from = self.lnext(lo);
            lo = self.connect(from, lo)?.sym();
        }
        Ok(())
    }

    fn lower_fan_fits(&self, lo: HalfEdgeId) -> bool {
        let next = self.lnext(lo);
        self.edge_goes_left(next)
            || edge_sign(
                self.pos(self.org(lo)),
                self.pos(self.dst(lo)),
                self.pos(self.dst(next)),
            ) <= 0.0
    }

    fn upper_fan_fits(&self, up: HalfEdgeId) -> bool {
        let prev = self.lprev(up);
        self.edge_goes_right(prev)
            || edge_sign(
                self.pos(self.dst(up)),
                self.pos(self.org(up)),
                self.pos(self.org(prev)),
            ) >= 0.0
    }

    /// Triangulates every inside face.
    pub fn tessellate_interior(&mut self) -> Result<()> {
        let mut f = self.next_face(FaceId::HEAD);
        let mut regions = 0usize;
        while f != FaceId::HEAD {
            // Faces created by the split are linked before `f`, so they are
            // not visited again.
            let next = self.next_face(f);
            if self[f].inside {
                self.tessellate_mono_region(f)?;
                regions += 1;
            }
            f = next;
        }
        debug!("triangulated {regions} monotone regions");
        Ok(())
    }

    /// True if walking the boundary of `face` changes sweep direction at
    /// most twice, i.e. it has a single leftmost and rightmost vertex.
    #[cfg(test)]
    pub(crate) fn is_monotone(&self, face: FaceId) -> bool {
        let start = self[face].an_edge;
        let dirs: Vec<bool> = self.face_loop(start).map(|e| self.edge_goes_right(e)).collect();
        let turns = dirs
            .iter()
            .zip(dirs.iter().cycle().skip(1))
            .filter(|(a, b)| a != b)
            .count();
        turns <= 2
    }
}
