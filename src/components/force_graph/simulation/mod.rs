//! Force-directed layout engine.
//!
//! A [`Simulation`] owns the nodes and edges of one dataset and refines their
//! positions one step at a time:
//!
//! 1. alpha moves toward its target by `alpha_decay`
//! 2. link springs, many-body charge, and centring adjust the nodes
//! 3. velocities are integrated, with pinned axes held at their pin
//!
//! Pins live in a separate [`PinTable`] passed into every step, written only
//! by the [`InteractionController`]. The engine is driven by an external
//! clock through [`Simulation::advance`], which notifies step listeners and
//! stops once alpha drops below `alpha_min`.

mod forces;
mod interaction;
mod lcg;
mod pins;
mod quadtree;

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, info};
use serde::Deserialize;

use super::error::{GraphError, Result};
use super::types::{GraphData, Group};

pub use forces::{CenterForceConfig, ChargeForceConfig, LinkForceConfig};
pub use interaction::{DRAG_ALPHA_TARGET, InteractionController};
pub use lcg::Lcg;
pub use pins::{Pin, PinTable};
pub use quadtree::QuadTree;

const INITIAL_RADIUS: f64 = 10.0;

/// Dense index of a node within its simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// A node and its physical state.
#[derive(Clone, Debug)]
pub struct Node {
	/// Identifier from the dataset.
	pub id: String,
	/// Group from the dataset, for coloring.
	pub group: Option<Group>,
	/// Position of this node in [`Simulation::nodes`].
	pub index: NodeIndex,
	/// Current x position.
	pub x: f64,
	/// Current y position.
	pub y: f64,
	/// Current x velocity.
	pub vx: f64,
	/// Current y velocity.
	pub vy: f64,
}

/// A link with both endpoints resolved to node indices.
#[derive(Clone, Debug)]
pub struct Edge {
	/// Position of this edge in [`Simulation::edges`].
	pub index: usize,
	/// Source node.
	pub source: NodeIndex,
	/// Target node.
	pub target: NodeIndex,
	/// Weight from the dataset.
	pub value: f64,
	/// Spring strength.
	pub strength: f64,
	/// Share of each correction applied to the target.
	pub bias: f64,
}

/// Physics constants. All fields fall back to their defaults when omitted
/// from a JSON document.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Starting energy.
	pub alpha: f64,
	/// The clock stops once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per step.
	pub alpha_decay: f64,
	/// Resting energy. Raised while dragging.
	pub alpha_target: f64,
	/// Fraction of velocity lost per step.
	pub velocity_decay: f64,
	/// Edge springs.
	pub link: LinkForceConfig,
	/// Node repulsion.
	pub charge: ChargeForceConfig,
	/// Centring.
	pub center: CenterForceConfig,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			alpha: 1.0,
			alpha_min,
			// Reaches alpha_min from 1.0 in about 300 steps.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			link: LinkForceConfig::default(),
			charge: ChargeForceConfig::default(),
			center: CenterForceConfig::default(),
		}
	}
}

/// Read-only view of all positions after a step.
#[derive(Clone, Copy, Debug)]
pub struct PositionSet<'a> {
	/// All nodes.
	pub nodes: &'a [Node],
	/// All edges.
	pub edges: &'a [Edge],
}

impl<'a> PositionSet<'a> {
	/// Endpoints of an edge as `((x1, y1), (x2, y2))`.
	pub fn endpoints(&self, edge: &Edge) -> ((f64, f64), (f64, f64)) {
		let (s, t) = (&self.nodes[edge.source.0], &self.nodes[edge.target.0]);
		((s.x, s.y), (t.x, t.y))
	}

	/// Edges paired with their endpoints.
	pub fn segments(&self) -> impl Iterator<Item = (&'a Edge, (f64, f64), (f64, f64))> + 'a {
		let positions = *self;
		self.edges.iter().map(move |e| {
			let (a, b) = positions.endpoints(e);
			(e, a, b)
		})
	}
}

/// Handle for removing a step listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type StepListener = Box<dyn FnMut(PositionSet<'_>)>;

/// The layout engine.
pub struct Simulation {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	id_to_idx: HashMap<String, NodeIndex>,
	config: SimulationConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	running: bool,
	rng: Lcg,
	listeners: Vec<(ListenerId, StepListener)>,
	next_listener: u64,
}

impl Simulation {
	/// Build a simulation with default physics, centred at `center`.
	pub fn new(data: &GraphData, center: (f64, f64)) -> Result<Self> {
		Self::with_config(data, center, SimulationConfig::default())
	}

	/// Build a simulation with explicit physics constants.
	///
	/// Fails if two nodes share an id or a link names an unknown node. No
	/// step runs before validation completes.
	pub fn with_config(data: &GraphData, center: (f64, f64), config: SimulationConfig) -> Result<Self> {
		let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
		let mut nodes = Vec::with_capacity(data.nodes.len());

		let initial_angle = PI * (3.0 - 5f64.sqrt());
		for (i, node) in data.nodes.iter().enumerate() {
			if id_to_idx.insert(node.id.clone(), NodeIndex(i)).is_some() {
				return Err(GraphError::DuplicateNode(node.id.clone()));
			}
			// Phyllotaxis spiral: evenly spread, deterministic.
			let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * initial_angle;
			nodes.push(Node {
				id: node.id.clone(),
				group: node.group.clone(),
				index: NodeIndex(i),
				x: radius * angle.cos(),
				y: radius * angle.sin(),
				vx: 0.0,
				vy: 0.0,
			});
		}

		let resolve = |id: &String| {
			id_to_idx
				.get(id)
				.copied()
				.ok_or_else(|| GraphError::UnknownNode { id: id.clone() })
		};
		let mut edges = Vec::with_capacity(data.links.len());
		for (i, link) in data.links.iter().enumerate() {
			edges.push(Edge {
				index: i,
				source: resolve(&link.source)?,
				target: resolve(&link.target)?,
				value: link.value,
				strength: 0.0,
				bias: 0.0,
			});
		}
		forces::initialize_links(&mut edges, nodes.len(), &config.link);

		info!(
			"force-directed-graph: simulation ready ({} nodes, {} edges)",
			nodes.len(),
			edges.len()
		);

		Ok(Self {
			nodes,
			edges,
			id_to_idx,
			alpha: config.alpha,
			alpha_target: config.alpha_target,
			config,
			center,
			running: true,
			rng: Lcg::default(),
			listeners: Vec::new(),
			next_listener: 0,
		})
	}

	/// One step over all nodes. Does not notify listeners.
	pub fn step(&mut self, pins: &PinTable) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		forces::apply_link(&mut self.nodes, &self.edges, &self.config.link, alpha, &mut self.rng);
		forces::apply_many_body(&mut self.nodes, &self.config.charge, alpha, &mut self.rng);
		forces::apply_center(&mut self.nodes, self.center.0, self.center.1, &self.config.center);
		forces::integrate(&mut self.nodes, pins, self.config.velocity_decay);
	}

	/// Run `n` steps without notifying listeners.
	pub fn tick(&mut self, pins: &PinTable, n: usize) {
		for _ in 0..n {
			self.step(pins);
		}
	}

	/// Clock entry point: step once if running, notify listeners, and stop
	/// once alpha has decayed below `alpha_min`. Returns whether a step ran.
	pub fn advance(&mut self, pins: &PinTable) -> bool {
		if !self.running {
			return false;
		}
		self.step(pins);
		self.notify();
		if self.alpha < self.config.alpha_min {
			self.running = false;
			debug!("force-directed-graph: layout settled (alpha {:.5})", self.alpha);
		}
		true
	}

	fn notify(&mut self) {
		let positions = PositionSet {
			nodes: &self.nodes,
			edges: &self.edges,
		};
		for (_, listener) in &mut self.listeners {
			listener(positions);
		}
	}

	/// Register a listener invoked synchronously after every clock step.
	pub fn on_step(&mut self, listener: impl FnMut(PositionSet<'_>) + 'static) -> ListenerId {
		let id = ListenerId(self.next_listener);
		self.next_listener += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	/// Remove one listener. Returns false if it was already gone.
	pub fn remove_listener(&mut self, id: ListenerId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(lid, _)| *lid != id);
		self.listeners.len() != before
	}

	/// Drop every listener.
	pub fn clear_listeners(&mut self) {
		self.listeners.clear();
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Resume the clock.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Halt the clock. Manual [`step`](Self::step) calls still work.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Whether the clock is running.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Overwrite the current energy.
	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha.clamp(0.0, 1.0);
	}

	/// Energy the simulation decays toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Set the energy the simulation decays toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Energy threshold below which the clock stops.
	pub fn alpha_min(&self) -> f64 {
		self.config.alpha_min
	}

	/// Set the energy threshold below which the clock stops.
	pub fn set_alpha_min(&mut self, alpha_min: f64) {
		self.config.alpha_min = alpha_min.clamp(0.0, 1.0);
	}

	/// Set the fraction of the gap to `alpha_target` closed per step.
	pub fn set_alpha_decay(&mut self, alpha_decay: f64) {
		self.config.alpha_decay = alpha_decay.clamp(0.0, 1.0);
	}

	/// Set the fraction of velocity lost per step.
	pub fn set_velocity_decay(&mut self, velocity_decay: f64) {
		self.config.velocity_decay = velocity_decay.clamp(0.0, 1.0);
	}

	/// Re-target the centring force.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Centring target.
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Physics constants in use.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// All nodes, indexed by [`NodeIndex`].
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// All edges.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// A node by index.
	pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
		self.nodes.get(idx.0)
	}

	/// Index of the node with the given id.
	pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
		self.id_to_idx.get(id).copied()
	}

	/// Current positions, as passed to listeners.
	pub fn positions(&self) -> PositionSet<'_> {
		PositionSet {
			nodes: &self.nodes,
			edges: &self.edges,
		}
	}

	/// Node closest to `(x, y)` within `radius`.
	pub fn find(&self, x: f64, y: f64, radius: f64) -> Option<NodeIndex> {
		let r2 = radius * radius;
		self.nodes
			.iter()
			.map(|n| (n.index, (n.x - x).powi(2) + (n.y - y).powi(2)))
			.filter(|&(_, d2)| d2 < r2)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(idx, _)| idx)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn data(ids: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: ids
				.iter()
				.map(|id| GraphNode {
					id: id.to_string(),
					group: Some(Group::Number(1)),
				})
				.collect(),
			links: links
				.iter()
				.map(|(s, t)| GraphLink {
					source: s.to_string(),
					target: t.to_string(),
					value: 1.0,
				})
				.collect(),
		}
	}

	#[test]
	fn edges_resolve_to_existing_nodes() {
		let d = data(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
		let sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		assert_eq!(sim.edges().len(), 2);
		for (edge, link) in sim.edges().iter().zip(&d.links) {
			assert_eq!(sim.nodes()[edge.source.0].id, link.source);
			assert_eq!(sim.nodes()[edge.target.0].id, link.target);
		}
	}

	#[test]
	fn unknown_endpoint_fails_construction() {
		let d = data(&["A", "B"], &[("A", "C")]);
		let err = Simulation::new(&d, (0.0, 0.0)).err().unwrap();
		assert!(matches!(err, GraphError::UnknownNode { ref id } if id == "C"));
		assert_eq!(err.to_string(), "node not found: C");
	}

	#[test]
	fn index_of_resolves_every_id() {
		let d = data(&["A", "B", "C"], &[("A", "C")]);
		let sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		for node in sim.nodes() {
			assert_eq!(sim.index_of(&node.id), Some(node.index));
		}
		assert_eq!(sim.index_of("D"), None);
	}

	#[test]
	fn duplicate_ids_fail_construction() {
		let d = data(&["A", "A"], &[]);
		assert!(matches!(
			Simulation::new(&d, (0.0, 0.0)),
			Err(GraphError::DuplicateNode(id)) if id == "A"
		));
	}

	#[test]
	fn initial_positions_are_distinct_and_finite() {
		let ids: Vec<String> = (0..20).map(|i| i.to_string()).collect();
		let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
		let sim = Simulation::new(&data(&refs, &[]), (0.0, 0.0)).unwrap();
		for (i, a) in sim.nodes().iter().enumerate() {
			assert!(a.x.is_finite() && a.y.is_finite());
			for b in &sim.nodes()[i + 1..] {
				assert!((a.x - b.x).abs() + (a.y - b.y).abs() > 1e-6);
			}
		}
	}

	#[test]
	fn alpha_decays_toward_target() {
		let d = data(&["A", "B"], &[("A", "B")]);
		let mut sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		let pins = PinTable::new();
		let mut prev = (sim.alpha() - sim.alpha_target()).abs();
		for _ in 0..50 {
			sim.step(&pins);
			let gap = (sim.alpha() - sim.alpha_target()).abs();
			assert!(gap <= prev);
			prev = gap;
		}
	}

	#[test]
	fn clock_stops_below_alpha_min() {
		let d = data(&["A", "B"], &[("A", "B")]);
		let mut sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		let pins = PinTable::new();
		let mut steps = 0;
		while sim.advance(&pins) {
			steps += 1;
			assert!(steps < 1000);
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < sim.alpha_min());
		assert!((290..=310).contains(&steps), "settled after {steps} steps");
		sim.restart();
		assert!(sim.advance(&pins));
	}

	#[test]
	fn listeners_are_notified_per_clock_step_and_removable() {
		let d = data(&["A", "B"], &[("A", "B")]);
		let mut sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		let pins = PinTable::new();
		let calls = Rc::new(Cell::new(0));
		let seen = calls.clone();
		let id = sim.on_step(move |positions| {
			assert_eq!(positions.nodes.len(), 2);
			assert_eq!(positions.segments().count(), 1);
			seen.set(seen.get() + 1);
		});

		sim.advance(&pins);
		sim.advance(&pins);
		sim.tick(&pins, 5);
		assert_eq!(calls.get(), 2);

		assert!(sim.remove_listener(id));
		assert!(!sim.remove_listener(id));
		sim.advance(&pins);
		assert_eq!(calls.get(), 2);
	}

	#[test]
	fn zero_decay_freezes_alpha() {
		let d = data(&["A", "B"], &[("A", "B")]);
		let mut sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		let pins = PinTable::new();
		sim.set_alpha_decay(0.0);
		sim.set_velocity_decay(1.0);
		sim.tick(&pins, 10);
		assert_eq!(sim.alpha(), 1.0);

		sim.set_alpha(0.5);
		sim.set_alpha_min(0.6);
		assert!(sim.advance(&pins));
		assert!(!sim.is_running());
	}

	#[test]
	fn find_returns_nearest_within_radius() {
		let d = data(&["A", "B"], &[]);
		let sim = Simulation::new(&d, (0.0, 0.0)).unwrap();
		let b = &sim.nodes()[1];
		assert_eq!(sim.find(b.x + 1.0, b.y, 5.0), Some(NodeIndex(1)));
		assert_eq!(sim.find(1000.0, 1000.0, 5.0), None);
	}

	#[test]
	fn config_deserializes_with_defaults() {
		let config: SimulationConfig =
			serde_json::from_str(r#"{"velocity_decay": 0.2, "charge": {"strength": -60}}"#).unwrap();
		assert_eq!(config.velocity_decay, 0.2);
		assert_eq!(config.charge.strength, -60.0);
		assert_eq!(config.charge.theta, 0.9);
		assert_eq!(config.link.distance, 30.0);
		assert_eq!(config.alpha_min, 0.001);
	}
}
