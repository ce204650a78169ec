//! Error types for diplib-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] diplib_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The seed of a chain code has no background neighbour
    #[error("start coordinates not on object boundary: ({x}, {y})")]
    NotOnBoundary { x: usize, y: usize },

    /// A chain code with exactly one code cannot be closed
    #[error("received a weird chain code as input (N==1)")]
    DegenerateChainCode,

    /// The operation needs an 8-connected chain code
    #[error("this method is only defined for 8-connected chain codes")]
    NotEightConnected,

    /// Convex hull of a polygon without area
    #[error("all vertices are colinear, cannot compute convex hull")]
    CollinearVertices,

    /// Convex hull of a polygon whose edges cross
    #[error("the polygon is self-intersecting, cannot compute convex hull")]
    SelfIntersecting,
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
