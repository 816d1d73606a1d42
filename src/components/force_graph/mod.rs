//! Force-directed graph visualization component.
//!
//! Renders a node-link graph on an HTML canvas with:
//! - An explicit layout engine (link springs, Barnes-Hut repulsion, centring)
//! - Node dragging that pins the node and reheats the layout
//! - Group-based coloring from a fixed categorical palette
//!
//! # Example
//!
//! ```ignore
//! use force_directed_graph::{ForceGraphCanvas, GraphData, parse_dataset};
//!
//! let data = parse_dataset(r#"{"nodes":[{"id":"A","group":1},{"id":"B","group":1}],
//!                              "links":[{"source":"A","target":"B","value":1}]}"#)?;
//!
//! view! { <ForceGraphCanvas data=Signal::derive(move || Some(data.clone())) /> }
//! ```

mod component;
pub mod error;
pub mod loader;
mod render;
pub mod simulation;
pub mod state;
pub mod theme;
mod types;

pub use component::ForceGraphCanvas;
pub use error::GraphError;
pub use loader::{DEFAULT_DATA_PATH, DatasetState, fetch_dataset, parse_dataset};
pub use simulation::{InteractionController, PinTable, Simulation, SimulationConfig};
pub use state::ForceGraphState;
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode, Group};

/// Logical canvas width in pixels.
pub const CANVAS_WIDTH: f64 = 954.0;
/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 600.0;
