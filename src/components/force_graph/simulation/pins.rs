//! Pinned-position overrides, keyed by node index.
//!
//! The table is written only by the interaction controller and read by the
//! integration step. A pinned axis holds the node exactly at the pin value.

use std::collections::HashMap;

use super::NodeIndex;

/// A fixed position for one node. Each axis may be pinned independently.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pin {
	/// Fixed x, if any.
	pub x: Option<f64>,
	/// Fixed y, if any.
	pub y: Option<f64>,
}

impl Pin {
	/// Pin both axes.
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x: Some(x),
			y: Some(y),
		}
	}
}

/// Node index to pinned position.
#[derive(Clone, Debug, Default)]
pub struct PinTable {
	pins: HashMap<NodeIndex, Pin>,
}

impl PinTable {
	/// Create an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Pin a node on both axes.
	pub fn pin(&mut self, node: NodeIndex, x: f64, y: f64) {
		self.pins.insert(node, Pin::at(x, y));
	}

	/// Set pins per axis. Passing `None` on both axes removes the entry.
	pub fn pin_axis(&mut self, node: NodeIndex, x: Option<f64>, y: Option<f64>) {
		if x.is_none() && y.is_none() {
			self.pins.remove(&node);
		} else {
			self.pins.insert(node, Pin { x, y });
		}
	}

	/// Release a node back to force-driven motion.
	pub fn unpin(&mut self, node: NodeIndex) -> Option<Pin> {
		self.pins.remove(&node)
	}

	/// The pin for a node, if set.
	pub fn get(&self, node: NodeIndex) -> Option<Pin> {
		self.pins.get(&node).copied()
	}

	/// Whether any axis of the node is pinned.
	pub fn is_pinned(&self, node: NodeIndex) -> bool {
		self.pins.contains_key(&node)
	}

	/// Remove every pin.
	pub fn clear(&mut self) {
		self.pins.clear();
	}

	/// Number of pinned nodes.
	pub fn len(&self) -> usize {
		self.pins.len()
	}

	/// True when no node is pinned.
	pub fn is_empty(&self) -> bool {
		self.pins.is_empty()
	}
}
