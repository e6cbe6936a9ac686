//! src/graph/shared.rs
//!
//! Shared per-graph state: the engine, terminal view-state, locking, and
//! metadata.

use std::sync::{Arc, RwLock};

use super::engine::Graph;

/// Pointer state tracked by the terminal between events.
#[derive(Debug, Default)]
pub struct GraphViewState {
    /// Left button held; movement is treated as a drag.
    pub pointer_down: bool,
    /// Pointer currently over the canvas.
    pub hovering: bool,
}

impl GraphViewState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The authoritative shared graph object.
pub struct GraphShared {
    pub graph: Graph,
    pub view: GraphViewState,
    pub name: String,
}

impl GraphShared {
    pub fn new(graph: Graph, name: &str) -> Self {
        Self {
            graph,
            view: GraphViewState::new(),
            name: name.to_string(),
        }
    }
}

/// Alias: Arc<RwLock<GraphShared>>
pub type SharedGraph = Arc<RwLock<GraphShared>>;
