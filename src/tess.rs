// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Public tessellator: contour input, run configuration and output access.
//
// A run goes: contours → mesh of edge loops → projection onto the sweep plane
// → sweep (winding classification, intersections, monotone split) →
// triangulation or boundary extraction → output buffers. The mesh is consumed
// by the run; the next run starts from new contours.

mod output;
mod project;

use log::debug;

use crate::error::{Result, TessError};
use crate::geom::{Real, MAX_VALID_COORD};
use crate::mesh::{HalfEdgeId, Mesh};
use crate::sweep::{Sweep, SweepStats};

use self::output::Output;

/// Which winding numbers count as inside.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum WindingRule {
    #[default]
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    pub fn is_inside(self, n: i32) -> bool {
        match self {
            WindingRule::Odd => n & 1 != 0,
            WindingRule::NonZero => n != 0,
            WindingRule::Positive => n > 0,
            WindingRule::Negative => n < 0,
            WindingRule::AbsGeqTwo => n.abs() >= 2,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// Convex polygons of at most `poly_size` vertices.
    #[default]
    Polygons,
    /// Polygons followed by the indices of their neighbours.
    ConnectedPolygons,
    /// The outlines of the inside region as `[first vertex, count]` pairs.
    BoundaryContours,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TessOption {
    /// Contours added while set are wound the opposite way.
    ReverseContours,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TessStatus {
    Ok,
    OutOfMemory,
    InvalidInput,
    CombineFailed,
}

impl From<&TessError> for TessStatus {
    fn from(err: &TessError) -> Self {
        match err {
            TessError::OutOfMemory(_) => TessStatus::OutOfMemory,
            TessError::InvalidInput { .. } => TessStatus::InvalidInput,
            TessError::CombineFailed { .. } => TessStatus::CombineFailed,
            // A broken sweep leaves nothing usable, like a failed allocation.
            TessError::Topology(_) | TessError::CorruptMesh(_) => TessStatus::OutOfMemory,
        }
    }
}

/// Parameters of one run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct TessConfig {
    pub winding_rule: WindingRule,
    pub element_type: ElementType,
    /// Maximum vertices per output polygon, at least 3.
    pub poly_size: usize,
    /// Coordinates per output vertex, 2 or 3.
    pub vertex_size: usize,
    /// Plane normal. Estimated from the input when absent.
    pub normal: Option<[Real; 3]>,
    /// Flip the orientation of every contour after projection, on top of
    /// any [`TessOption::ReverseContours`] in effect when it was added.
    /// Positive and negative regions trade places even when the normal is
    /// estimated.
    pub reverse_contours: bool,
}

impl Default for TessConfig {
    fn default() -> Self {
        TessConfig {
            winding_rule: WindingRule::Odd,
            element_type: ElementType::Polygons,
            poly_size: 3,
            vertex_size: 2,
            normal: None,
            reverse_contours: false,
        }
    }
}

/// A vertex the sweep had to create where two edges cross.
#[derive(Clone, Debug, PartialEq)]
pub struct CombineRequest {
    /// Interpolated position.
    pub position: [Real; 3],
    /// Input indices of the upper edge's endpoints, then the lower edge's.
    /// `UNDEF` for vertices that were themselves created by the sweep without
    /// an index.
    pub sources: [u32; 4],
    /// Interpolation weights of `sources`; they sum to 1.
    pub weights: [Real; 4],
}

/// Returns the index to report for a new crossing vertex, or `None` to abort
/// the run.
pub type CombineFn = dyn FnMut(&CombineRequest) -> Option<u32>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Polygon,
    LineLoop,
}

/// Receiver for [`Tessellator::emit`].
pub trait PrimitiveSink {
    fn begin(&mut self, kind: PrimitiveKind);
    /// `index` is the output vertex index, `position` its coordinates.
    fn vertex(&mut self, index: u32, position: &[Real]);
    fn end(&mut self);
}

pub struct Tessellator {
    mesh: Option<Mesh>,
    status: TessStatus,
    /// First input error, reported by the next run.
    pending: Option<TessError>,
    reverse_contours: bool,
    vertex_index_counter: u32,
    contour_count: usize,
    combine: Option<Box<CombineFn>>,
    output: Output,
    stats: SweepStats,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tessellator {
    pub fn new() -> Self {
        Tessellator {
            mesh: None,
            status: TessStatus::Ok,
            pending: None,
            reverse_contours: false,
            vertex_index_counter: 0,
            contour_count: 0,
            combine: None,
            output: Output::default(),
            stats: SweepStats::default(),
        }
    }

    pub fn set_option(&mut self, option: TessOption, value: bool) {
        match option {
            TessOption::ReverseContours => self.reverse_contours = value,
        }
    }

    /// Installs the callback consulted for every vertex created at an edge
    /// crossing.
    pub fn set_combine_callback<F>(&mut self, f: F)
    where
        F: FnMut(&CombineRequest) -> Option<u32> + 'static,
    {
        self.combine = Some(Box::new(f));
    }

    /// Adds a closed contour. `size` is 2 or 3 coordinates per vertex and
    /// `vertices` holds them back to back. Invalid coordinates make the next
    /// run fail with [`TessError::InvalidInput`].
    pub fn add_contour(&mut self, size: usize, vertices: &[Real]) {
        if self.pending.is_some() {
            return;
        }
        if let Err(err) = self.append_contour(size, vertices) {
            self.status = TessStatus::from(&err);
            self.pending = Some(err);
        }
        self.contour_count += 1;
    }

    fn append_contour(&mut self, size: usize, vertices: &[Real]) -> Result<()> {
        let size = size.clamp(2, 3);
        let contour = self.contour_count;
        if let Some(&bad) = vertices
            .iter()
            .find(|c| !c.is_finite() || c.abs() > MAX_VALID_COORD)
        {
            return Err(TessError::invalid_coord(contour, bad));
        }

        let winding = if self.reverse_contours { -1 } else { 1 };
        let mesh = self.mesh.get_or_insert_with(Mesh::new);
        let mut e = HalfEdgeId::INVALID;
        for chunk in vertices.chunks_exact(size) {
            if e.is_valid() {
                // Insert the new vertex after the last one.
                mesh.split_edge(e)?;
                e = mesh.lnext(e);
            } else {
                // A self-loop: one vertex, one edge.
                e = mesh.make_edge()?;
                mesh.splice(e, e.sym())?;
            }

            let v = mesh.org(e);
            let vert = &mut mesh[v];
            vert.coords = [chunk[0], chunk[1], chunk.get(2).copied().unwrap_or(0.0)];
            vert.idx = self.vertex_index_counter;
            self.vertex_index_counter += 1;

            mesh[e].winding = winding;
            mesh[e.sym()].winding = -winding;
        }
        Ok(())
    }

    /// Runs the tessellation with the libtess2-style parameter list.
    pub fn tessellate(
        &mut self,
        winding_rule: WindingRule,
        element_type: ElementType,
        poly_size: usize,
        vertex_size: usize,
        normal: Option<[Real; 3]>,
    ) -> Result<()> {
        self.tessellate_with(&TessConfig {
            winding_rule,
            element_type,
            poly_size,
            vertex_size,
            normal,
            reverse_contours: false,
        })
    }

    /// Tessellates everything added since the last run. On failure the
    /// output is empty and [`Self::status`] reports the kind of error.
    pub fn tessellate_with(&mut self, config: &TessConfig) -> Result<()> {
        let result = self.run(config);
        match &result {
            Ok(()) => self.status = TessStatus::Ok,
            Err(err) => {
                debug!("tessellation failed: {err}");
                self.status = TessStatus::from(err);
                self.output = Output::default();
            }
        }
        result
    }

    fn run(&mut self, config: &TessConfig) -> Result<()> {
        self.output = Output::default();
        self.stats = SweepStats::default();
        let mut mesh = self.mesh.take().unwrap_or_default();
        self.vertex_index_counter = 0;
        self.contour_count = 0;
        if let Some(err) = self.pending.take() {
            return Err(err);
        }

        let poly_size = config.poly_size.max(3);
        let vertex_size = config.vertex_size.clamp(2, 3);
        debug!(
            "tessellating {} vertices: {:?} rule, {:?}, poly size {}",
            mesh.vertex_count(),
            config.winding_rule,
            config.element_type,
            poly_size
        );

        // Projection may pick the orientation from the windings, so the
        // reversal goes on top of its result.
        let bounds = project::project(&mut mesh, config.normal);
        if config.reverse_contours {
            flip_windings(&mut mesh);
        }

        let combine = self.combine.as_deref_mut();
        self.stats = Sweep::new(&mut mesh, config.winding_rule, bounds, combine).run()?;

        self.output = if config.element_type == ElementType::BoundaryContours {
            mesh.set_winding_number(1, true)?;
            mesh.check();
            Output::contours(&mesh, vertex_size)?
        } else {
            mesh.tessellate_interior()?;
            mesh.discard_exterior();
            if poly_size > 3 {
                mesh.merge_convex_faces(poly_size)?;
            }
            mesh.check();
            Output::polymesh(&mut mesh, config.element_type, poly_size, vertex_size)?
        };
        debug!(
            "produced {} elements over {} vertices",
            self.output.element_count, self.output.vertex_count
        );
        Ok(())
    }

    /// Discards all input, output and error state.
    pub fn reset(&mut self) {
        self.mesh = None;
        self.status = TessStatus::Ok;
        self.pending = None;
        self.vertex_index_counter = 0;
        self.contour_count = 0;
        self.output = Output::default();
        self.stats = SweepStats::default();
    }

    /// Replays the last output as primitives.
    pub fn emit(&self, sink: &mut impl PrimitiveSink) {
        self.output.emit(sink);
    }

    // ─────── Accessors ────────────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.output.vertex_count
    }

    pub fn element_count(&self) -> usize {
        self.output.element_count
    }

    pub fn vertices(&self) -> &[Real] {
        &self.output.vertices
    }

    pub fn vertex_indices(&self) -> &[u32] {
        &self.output.vertex_indices
    }

    pub fn elements(&self) -> &[u32] {
        &self.output.elements
    }

    pub fn status(&self) -> TessStatus {
        self.status
    }

    pub fn sweep_stats(&self) -> SweepStats {
        self.stats
    }
}

fn flip_windings(mesh: &mut Mesh) {
    let mut e = mesh.next_edge(HalfEdgeId::HEAD);
    while e != HalfEdgeId::HEAD {
        mesh[e].winding = -mesh[e].winding;
        mesh[e.sym()].winding = -mesh[e.sym()].winding;
        e = mesh.next_edge(e);
    }
}
