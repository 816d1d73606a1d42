//! Graph view state: layout engine, pins, drag tracking, and styling.
//!
//! Wraps the [`Simulation`] with the pin table and interaction controller
//! that gestures write to, plus the per-element styling computed once when
//! the dataset is loaded.

use super::error::Result;
use super::simulation::{InteractionController, NodeIndex, PinTable, PositionSet, Simulation, SimulationConfig};
use super::theme::{OrdinalScale, Theme};
use super::types::{GraphData, Group};

/// Styling fixed at setup: one fill per node, one stroke width per edge.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// CSS fill for each node, indexed like the simulation's nodes.
	pub node_colors: Vec<String>,
	/// Stroke width for each edge, indexed like the simulation's edges.
	pub edge_widths: Vec<f64>,
}

impl Scene {
	/// Color nodes by group through the theme's ordinal palette and size
	/// edges by `sqrt(value)`.
	pub fn new(simulation: &Simulation, theme: &Theme) -> Self {
		let mut scale: OrdinalScale<Option<Group>> = OrdinalScale::new(theme.palette.clone());
		let node_colors = simulation
			.nodes()
			.iter()
			.map(|n| scale.color(&n.group).to_css())
			.collect();
		let edge_widths = simulation
			.edges()
			.iter()
			.map(|e| theme.edge.base_width * e.value.max(0.0).sqrt())
			.collect();
		Self {
			node_colors,
			edge_widths,
		}
	}
}

/// Core graph state combining the layout engine with interaction tracking.
///
/// Created once per dataset when the canvas is mounted, then mutated by the
/// animation loop and by pointer handlers. Both run on the same thread, so
/// a gesture's pin update is always visible to the next step.
pub struct ForceGraphState {
	/// Layout engine for the loaded dataset.
	pub simulation: Simulation,
	/// Pins written by drags, read by every step.
	pub pins: PinTable,
	/// Active drag gestures.
	pub interaction: InteractionController,
	/// Per-element styling.
	pub scene: Scene,
	/// Visual theme.
	pub theme: Theme,
	/// Node under the pointer when no drag is active.
	pub hovered: Option<NodeIndex>,
	/// Logical canvas width.
	pub width: f64,
	/// Logical canvas height.
	pub height: f64,
}

impl ForceGraphState {
	/// Build the view state with default physics, centred on the canvas.
	pub fn new(data: &GraphData, width: f64, height: f64, theme: Theme) -> Result<Self> {
		Self::with_config(data, width, height, theme, SimulationConfig::default())
	}

	/// Build the view state with explicit physics constants.
	pub fn with_config(
		data: &GraphData,
		width: f64,
		height: f64,
		theme: Theme,
		config: SimulationConfig,
	) -> Result<Self> {
		let simulation = Simulation::with_config(data, (width / 2.0, height / 2.0), config)?;
		let scene = Scene::new(&simulation, &theme);
		Ok(Self {
			simulation,
			pins: PinTable::new(),
			interaction: InteractionController::new(),
			scene,
			theme,
			hovered: None,
			width,
			height,
		})
	}

	/// Topmost node under the point, using the theme's hit radius.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<NodeIndex> {
		self.simulation.find(x, y, self.theme.node.hit_radius)
	}

	/// Pointer pressed at `(x, y)`. Starts a drag if a node is hit.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<NodeIndex> {
		let idx = self.node_at_position(x, y)?;
		self.interaction
			.drag_start(&mut self.simulation, &mut self.pins, idx, x, y)
			.then_some(idx)
	}

	/// Pointer moved to `(x, y)`. Updates the drag pin or the hovered node.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		match self.interaction.dragged_node() {
			Some(idx) => {
				self.interaction.drag_move(&mut self.pins, idx, x, y);
			}
			None => self.hovered = self.node_at_position(x, y),
		}
	}

	/// Pointer released. Ends the active drag, if any.
	pub fn pointer_up(&mut self) {
		if let Some(idx) = self.interaction.dragged_node() {
			self.interaction.drag_end(&mut self.simulation, &mut self.pins, idx);
		}
	}

	/// Pointer left the surface. Ends every drag and clears hover.
	pub fn pointer_leave(&mut self) {
		self.interaction.cancel_all(&mut self.simulation, &mut self.pins);
		self.hovered = None;
	}

	/// Id of the hovered node, for the tooltip.
	pub fn hovered_id(&self) -> Option<&str> {
		self.hovered
			.and_then(|idx| self.simulation.node(idx))
			.map(|n| n.id.as_str())
	}

	/// One clock tick. Returns whether the layout moved.
	pub fn tick(&mut self) -> bool {
		self.simulation.advance(&self.pins)
	}

	/// Stop the clock, release every pin and drop every step listener.
	/// Called when the view unmounts.
	pub fn teardown(&mut self) {
		self.interaction.cancel_all(&mut self.simulation, &mut self.pins);
		self.simulation.stop();
		self.simulation.clear_listeners();
		self.hovered = None;
	}

	/// Current positions for an immediate redraw.
	pub fn positions(&self) -> PositionSet<'_> {
		self.simulation.positions()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::loader::parse_dataset;

	const DATA: &str = r#"{
		"nodes": [
			{"id": "A", "group": 1},
			{"id": "B", "group": 1},
			{"id": "C", "group": 2}
		],
		"links": [
			{"source": "A", "target": "B", "value": 4},
			{"source": "B", "target": "C", "value": 1}
		]
	}"#;

	fn state() -> ForceGraphState {
		let data = parse_dataset(DATA).unwrap();
		ForceGraphState::new(&data, 954.0, 600.0, Theme::default()).unwrap()
	}

	#[test]
	fn scene_colors_by_group_and_sizes_by_weight() {
		let s = state();
		assert_eq!(s.scene.node_colors[0], s.scene.node_colors[1]);
		assert_ne!(s.scene.node_colors[0], s.scene.node_colors[2]);
		assert_eq!(s.scene.node_colors[0], "#1f77b4");
		assert_eq!(s.scene.edge_widths, vec![2.0, 1.0]);
	}

	#[test]
	fn simulation_is_centred_on_canvas() {
		assert_eq!(state().simulation.center(), (477.0, 300.0));
	}

	#[test]
	fn press_move_release_round_trip() {
		let mut s = state();
		let (x, y) = {
			let b = &s.simulation.nodes()[1];
			(b.x, b.y)
		};
		assert_eq!(s.pointer_down(x, y), Some(NodeIndex(1)));
		s.pointer_move(x + 50.0, y + 10.0);
		let pin = s.pins.get(NodeIndex(1)).unwrap();
		assert!((pin.x.unwrap() - (x + 50.0)).abs() < 1e-9);
		assert!((pin.y.unwrap() - (y + 10.0)).abs() < 1e-9);

		s.tick();
		let b = &s.simulation.nodes()[1];
		assert_eq!((Some(b.x), Some(b.y)), (pin.x, pin.y));

		s.pointer_up();
		assert!(s.pins.is_empty());
		assert_eq!(s.simulation.alpha_target(), 0.0);
	}

	#[test]
	fn press_on_empty_space_does_nothing() {
		let mut s = state();
		assert_eq!(s.pointer_down(-500.0, -500.0), None);
		assert_eq!(s.interaction.active(), 0);
	}

	#[test]
	fn teardown_stops_clock_and_drops_listeners() {
		let mut s = state();
		s.simulation.on_step(|_| {});
		let (x, y) = (s.simulation.nodes()[0].x, s.simulation.nodes()[0].y);
		s.pointer_down(x, y);
		assert_eq!(s.simulation.listener_count(), 1);

		s.teardown();
		assert_eq!(s.simulation.listener_count(), 0);
		assert!(!s.simulation.is_running());
		assert!(!s.tick());
		assert!(s.pins.is_empty());
		assert_eq!(s.interaction.active(), 0);
	}

	#[test]
	fn hover_tracks_node_under_pointer() {
		let mut s = state();
		let (x, y) = (s.simulation.nodes()[2].x, s.simulation.nodes()[2].y);
		s.pointer_move(x, y);
		assert_eq!(s.hovered_id(), Some("C"));
		s.pointer_leave();
		assert_eq!(s.hovered_id(), None);
	}
}
