//! src/panels.rs
//!
//! Top-level panels module and re-exports.

pub mod graph;
pub mod info;
pub mod paragraph;
pub mod points;
pub mod title;

pub use graph::GraphPanel;
pub use info::InfoPanel;
pub use paragraph::ParagraphPanel;
pub use points::PointsPanel;
pub use title::TitlePanel;
