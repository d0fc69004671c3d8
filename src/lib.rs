// tess-sweep: sweep-line polygon tessellation in the libtess2 tradition
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

//! Turns arbitrary 2D or planar 3D contours into triangles (or convex
//! polygons, or boundary loops) under a chosen winding rule.
//!
//! ```
//! use tess_sweep::{ElementType, Tessellator, WindingRule};
//!
//! let mut tess = Tessellator::new();
//! tess.add_contour(2, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
//! tess.tessellate(WindingRule::Odd, ElementType::Polygons, 3, 2, None)?;
//! assert_eq!(tess.element_count(), 2);
//! # Ok::<(), tess_sweep::TessError>(())
//! ```

pub mod dict;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod monotone;
pub mod priorityq;
pub mod sweep;
pub mod tess;

pub use error::TessError;
pub use geom::Real;
pub use mesh::UNDEF;
pub use sweep::SweepStats;
pub use tess::{
    CombineFn, CombineRequest, ElementType, PrimitiveKind, PrimitiveSink, TessConfig, TessOption,
    TessStatus, Tessellator, WindingRule,
};
