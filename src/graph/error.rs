//! src/graph/error.rs
//!
//! Construction errors for the graph engine. Everything that can go wrong
//! after construction is logged and degraded instead of returned.

use thiserror::Error;

/// Result alias for engine construction.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// No valid (x, y) pair survived parsing.
    #[error("dataset contains no valid points")]
    EmptySeries,

    /// Fewer than two distinct pixel columns: either every x is identical
    /// or the distinct x values all round onto one column.
    #[error("degenerate x range: the points do not span two distinct columns")]
    DegenerateXRange,

    /// The surface leaves no drawable space once margins are removed.
    #[error("surface {width}x{height} has no drawable area")]
    InvalidSurface { width: f64, height: f64 },
}
