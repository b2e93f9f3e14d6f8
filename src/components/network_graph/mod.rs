//! Canvas relationship graph: data model, layout, interaction and drawing.

mod component;
pub mod config;
pub mod error;
mod expansion;
pub mod fetch;
pub mod input;
pub mod payload;
mod physics;
mod render;
pub mod scheduler;
pub mod state;
pub mod types;
pub mod viewport;

pub use component::NetworkGraphCanvas;
pub use config::EngineConfig;
pub use error::{GraphError, Result};
pub use types::{GraphEdge, GraphNode, NodeFilters, RiskLevel, short_address};
