//! Drag interaction: turns pointer gestures into pins and energy changes.

use log::debug;

use super::pins::PinTable;
use super::{NodeIndex, Simulation};

/// Energy target while at least one drag is active.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

/// An in-progress node drag.
#[derive(Clone, Copy, Debug)]
struct Gesture {
	node: NodeIndex,
	start_x: f64,
	start_y: f64,
	node_start_x: f64,
	node_start_y: f64,
}

/// Translates press/move/release on a node into pin updates.
///
/// This is the only writer of the [`PinTable`]. The first concurrent drag
/// reheats the simulation by setting its alpha target to
/// [`DRAG_ALPHA_TARGET`], even if alpha is already higher. The last release
/// drops the target back to zero so the layout settles again.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	gestures: Vec<Gesture>,
}

impl InteractionController {
	/// Create a controller with no active gestures.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of gestures currently in progress.
	pub fn active(&self) -> usize {
		self.gestures.len()
	}

	/// Node being dragged by the most recent gesture.
	pub fn dragged_node(&self) -> Option<NodeIndex> {
		self.gestures.last().map(|g| g.node)
	}

	/// Grab `node` with the pointer at `(px, py)`.
	///
	/// The node is pinned where it currently is; later moves keep the grab
	/// offset between pointer and node.
	pub fn drag_start(
		&mut self,
		simulation: &mut Simulation,
		pins: &mut PinTable,
		node: NodeIndex,
		px: f64,
		py: f64,
	) -> bool {
		let Some((nx, ny)) = simulation.node(node).map(|n| (n.x, n.y)) else {
			return false;
		};

		if self.gestures.is_empty() {
			simulation.set_alpha_target(DRAG_ALPHA_TARGET);
			simulation.restart();
		}

		self.gestures.retain(|g| g.node != node);
		self.gestures.push(Gesture {
			node,
			start_x: px,
			start_y: py,
			node_start_x: nx,
			node_start_y: ny,
		});
		pins.pin(node, nx, ny);
		debug!("force-directed-graph: drag start on node {}", node.0);
		true
	}

	/// Move the pointer of the gesture holding `node` to `(px, py)`.
	pub fn drag_move(&mut self, pins: &mut PinTable, node: NodeIndex, px: f64, py: f64) -> bool {
		let Some(g) = self.gestures.iter().find(|g| g.node == node) else {
			return false;
		};
		pins.pin(
			node,
			g.node_start_x + (px - g.start_x),
			g.node_start_y + (py - g.start_y),
		);
		true
	}

	/// Release `node`. It rejoins force-driven motion on the next step.
	pub fn drag_end(&mut self, simulation: &mut Simulation, pins: &mut PinTable, node: NodeIndex) -> bool {
		let before = self.gestures.len();
		self.gestures.retain(|g| g.node != node);
		if self.gestures.len() == before {
			return false;
		}

		if self.gestures.is_empty() {
			simulation.set_alpha_target(0.0);
		}
		pins.unpin(node);
		debug!("force-directed-graph: drag end on node {}", node.0);
		true
	}

	/// Release every active gesture, e.g. when the pointer leaves the surface.
	pub fn cancel_all(&mut self, simulation: &mut Simulation, pins: &mut PinTable) {
		let nodes: Vec<NodeIndex> = self.gestures.iter().map(|g| g.node).collect();
		for node in nodes {
			self.drag_end(simulation, pins, node);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::Pin;
	use crate::components::force_graph::types::{GraphData, GraphLink, GraphNode};

	fn triangle() -> Simulation {
		let node = |id: &str| GraphNode {
			id: id.into(),
			group: None,
		};
		let link = |s: &str, t: &str| GraphLink {
			source: s.into(),
			target: t.into(),
			value: 1.0,
		};
		let data = GraphData {
			nodes: vec![node("A"), node("B"), node("C")],
			links: vec![link("A", "B"), link("B", "C"), link("C", "A")],
		};
		Simulation::new(&data, (477.0, 300.0)).unwrap()
	}

	#[test]
	fn drag_start_pins_at_current_position_and_reheats() {
		let mut sim = triangle();
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();
		sim.stop();

		let a = sim.nodes()[0].clone();
		assert!(ctl.drag_start(&mut sim, &mut pins, a.index, 5.0, 5.0));
		assert_eq!(pins.get(a.index), Some(Pin::at(a.x, a.y)));
		assert_eq!(sim.alpha_target(), DRAG_ALPHA_TARGET);
		assert!(sim.is_running());
	}

	#[test]
	fn drag_start_resets_target_even_when_alpha_is_higher() {
		let mut sim = triangle();
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();
		sim.set_alpha(0.9);
		ctl.drag_start(&mut sim, &mut pins, NodeIndex(0), 0.0, 0.0);
		assert_eq!(sim.alpha_target(), DRAG_ALPHA_TARGET);
		assert_eq!(sim.alpha(), 0.9);
	}

	#[test]
	fn drag_move_keeps_grab_offset() {
		let mut sim = triangle();
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();
		let (x, y) = (sim.nodes()[1].x, sim.nodes()[1].y);

		ctl.drag_start(&mut sim, &mut pins, NodeIndex(1), 10.0, 10.0);
		assert!(ctl.drag_move(&mut pins, NodeIndex(1), 30.0, 5.0));
		let pin = pins.get(NodeIndex(1)).unwrap();
		assert_eq!(pin.x, Some(x + 20.0));
		assert_eq!(pin.y, Some(y - 5.0));
	}

	#[test]
	fn move_without_gesture_is_ignored() {
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();
		assert!(!ctl.drag_move(&mut pins, NodeIndex(0), 1.0, 1.0));
		assert!(pins.is_empty());
	}

	#[test]
	fn target_drops_only_when_last_gesture_ends() {
		let mut sim = triangle();
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();

		ctl.drag_start(&mut sim, &mut pins, NodeIndex(0), 0.0, 0.0);
		ctl.drag_start(&mut sim, &mut pins, NodeIndex(1), 0.0, 0.0);
		assert_eq!(ctl.active(), 2);

		ctl.drag_end(&mut sim, &mut pins, NodeIndex(0));
		assert_eq!(sim.alpha_target(), DRAG_ALPHA_TARGET);
		assert!(!pins.is_pinned(NodeIndex(0)));
		assert!(pins.is_pinned(NodeIndex(1)));

		ctl.drag_end(&mut sim, &mut pins, NodeIndex(1));
		assert_eq!(sim.alpha_target(), 0.0);
		assert!(pins.is_empty());
	}

	#[test]
	fn cancel_all_releases_everything() {
		let mut sim = triangle();
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();
		ctl.drag_start(&mut sim, &mut pins, NodeIndex(0), 0.0, 0.0);
		ctl.drag_start(&mut sim, &mut pins, NodeIndex(2), 0.0, 0.0);
		ctl.cancel_all(&mut sim, &mut pins);
		assert_eq!(ctl.active(), 0);
		assert!(pins.is_empty());
		assert_eq!(sim.alpha_target(), 0.0);
	}

	#[test]
	fn unknown_node_is_rejected() {
		let mut sim = triangle();
		let mut pins = PinTable::new();
		let mut ctl = InteractionController::new();
		assert!(!ctl.drag_start(&mut sim, &mut pins, NodeIndex(99), 0.0, 0.0));
		assert_eq!(ctl.active(), 0);
		assert_eq!(sim.alpha_target(), 0.0);
	}
}
