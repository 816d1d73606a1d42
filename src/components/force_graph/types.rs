//! Graph data structures for input to the force graph component.

use std::fmt;

use serde::Deserialize;

/// Categorical group of a node. Only used to pick a colour.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum Group {
	/// Numeric group, as in `{"group": 1}`.
	Number(i64),
	/// Named group, as in `{"group": "rebels"}`.
	Name(String),
}

impl fmt::Display for Group {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Group::Number(n) => write!(f, "{n}"),
			Group::Name(s) => f.write_str(s),
		}
	}
}

/// A node in the graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Optional group for palette-based coloring.
	#[serde(default)]
	pub group: Option<Group>,
}

/// An edge between two nodes, referenced by id.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Link weight. Drawn as stroke width `sqrt(value)`.
	#[serde(default = "default_link_value")]
	pub value: f64,
}

fn default_link_value() -> f64 {
	1.0
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// All nodes, in dataset order.
	pub nodes: Vec<GraphNode>,
	/// All links, in dataset order.
	pub links: Vec<GraphLink>,
}
