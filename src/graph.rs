//! src/graph.rs
//!
//! Top-level `graph` module: the engine, its drawing surface and the frame
//! scheduler that drives it.

pub mod config;
pub mod data;
pub mod demo;
pub mod display_list;
pub mod engine;
pub mod error;
pub mod explanation;
pub mod render;
pub mod reveal;
pub mod scheduler;
pub mod shared;
pub mod surface;
pub mod transform;

/// Re-exports
pub use config::{GraphConfig, ScaleMode, Theme};
pub use display_list::{DisplayList, DrawCommand, TextMetrics};
pub use engine::Graph;
pub use error::GraphError;
pub use reveal::RevealPhase;
pub use scheduler::{FrameOutcome, FrameScheduler};
pub use surface::{Point, Surface, SurfaceSize};
