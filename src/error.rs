//! Error types for cell geometry, node kernels and material models.

use thiserror::Error;

use crate::math::{Index, Real};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CellError {
    #[error("cell {cell}: no shape function assigned")]
    MissingShapeFn { cell: Index },

    #[error("cell {cell}: {found} of {expected} nodes bound")]
    IncompleteNodes {
        cell: Index,
        expected: usize,
        found: usize,
    },

    #[error("cell {cell}: volume has not been computed")]
    VolumeNotComputed { cell: Index },

    #[error("cell {cell}: shape function has {found} functions, cell expects {expected} nodes")]
    ShapeFnMismatch {
        cell: Index,
        expected: usize,
        found: usize,
    },

    #[error("cell {cell}: shape function is {found}D, cell is {expected}D")]
    DimensionMismatch {
        cell: Index,
        expected: usize,
        found: usize,
    },

    #[error("cell {cell}: bound node {node} is not in the node registry")]
    MissingNode { cell: Index, node: Index },

    #[error("cell {cell}: phase {phase} out of range for node {node} with {nphases} phases")]
    InvalidPhase {
        cell: Index,
        node: Index,
        phase: usize,
        nphases: usize,
    },

    #[error("cell {cell}: degenerate volume {volume}")]
    DegenerateVolume { cell: Index, volume: Real },

    #[error("cell {cell}: singular Jacobian")]
    SingularJacobian { cell: Index },
}

pub type CellResult<T> = std::result::Result<T, CellError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MaterialError {
    #[error("unknown material model: {0}")]
    UnknownModel(String),

    #[error("missing material property: {0}")]
    MissingProperty(String),

    #[error("invalid material property {name}: {value}")]
    InvalidProperty { name: String, value: Real },
}

pub type MaterialResult<T> = std::result::Result<T, MaterialError>;
