// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

use thiserror::Error;

/// Failure of a tessellation run. Any error discards the partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TessError {
    #[error("out of memory while growing the {0} storage")]
    OutOfMemory(&'static str),

    #[error("input coordinate {value} in contour {contour} is not finite or exceeds the valid range")]
    InvalidInput { contour: usize, value: String },

    #[error("combine callback produced no vertex for the intersection at ({s}, {t})")]
    CombineFailed { s: String, t: String },

    #[error("sweep invariant violated: {0}")]
    Topology(&'static str),

    #[error("mesh is corrupt: {0}")]
    CorruptMesh(String),
}

impl TessError {
    pub(crate) fn invalid_coord(contour: usize, value: f32) -> Self {
        TessError::InvalidInput {
            contour,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TessError>;

/// Grow `v` by `extra` slots or report which storage ran out.
#[inline]
pub(crate) fn reserve<T>(v: &mut Vec<T>, extra: usize, what: &'static str) -> Result<()> {
    v.try_reserve(extra).map_err(|_| TessError::OutOfMemory(what))
}
