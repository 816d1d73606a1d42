//! Force implementations applied once per step.
//!
//! Link and many-body forces accumulate into node velocities scaled by the
//! current alpha. The centre force translates positions directly. The
//! integration pass then moves nodes and enforces pins.

use serde::Deserialize;

use super::lcg::Lcg;
use super::pins::PinTable;
use super::quadtree::{CellKind, QuadTree};
use super::{Edge, Node};

/// Spring force along edges.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LinkForceConfig {
	/// Rest length of every edge.
	pub distance: f64,
	/// Passes over the edge list per step. More passes make links stiffer.
	pub iterations: usize,
	/// Fixed spring strength. `None` uses `1 / min(degree(source), degree(target))`,
	/// which weakens links attached to hubs.
	pub strength: Option<f64>,
}

impl Default for LinkForceConfig {
	fn default() -> Self {
		Self {
			distance: 30.0,
			iterations: 1,
			strength: None,
		}
	}
}

/// Pairwise charge between all nodes. Negative values repel.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ChargeForceConfig {
	/// Charge of every node.
	pub strength: f64,
	/// Barnes-Hut accuracy. `0.0` computes every pair exactly.
	pub theta: f64,
	/// Distances below this are clamped to avoid huge forces.
	pub distance_min: f64,
	/// Pairs further apart than this are ignored. `None` means unbounded.
	pub distance_max: Option<f64>,
}

impl Default for ChargeForceConfig {
	fn default() -> Self {
		Self {
			strength: -30.0,
			theta: 0.9,
			distance_min: 1.0,
			distance_max: None,
		}
	}
}

/// Pull toward the target centre.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CenterForceConfig {
	/// Fraction of the offset between the mean position and the centre
	/// removed per step. `1.0` recentres fully.
	pub strength: f64,
}

impl Default for CenterForceConfig {
	fn default() -> Self {
		Self { strength: 1.0 }
	}
}

/// Compute per-edge spring strength and bias from node degrees.
///
/// Bias splits each correction between the endpoints so that the less
/// connected endpoint moves more.
pub fn initialize_links(edges: &mut [Edge], node_count: usize, config: &LinkForceConfig) {
	let mut degree = vec![0usize; node_count];
	for edge in edges.iter() {
		degree[edge.source.0] += 1;
		degree[edge.target.0] += 1;
	}
	for edge in edges.iter_mut() {
		let (ds, dt) = (degree[edge.source.0] as f64, degree[edge.target.0] as f64);
		edge.bias = ds / (ds + dt);
		edge.strength = config.strength.unwrap_or_else(|| 1.0 / ds.min(dt));
	}
}

/// Spring force along each edge toward the configured rest length.
pub fn apply_link(nodes: &mut [Node], edges: &[Edge], config: &LinkForceConfig, alpha: f64, rng: &mut Lcg) {
	for _ in 0..config.iterations {
		for edge in edges {
			let (s, t) = (&nodes[edge.source.0], &nodes[edge.target.0]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = rng.jiggle();
			}
			if dy == 0.0 {
				dy = rng.jiggle();
			}

			let len = (dx * dx + dy * dy).sqrt();
			let l = (len - config.distance) / len * alpha * edge.strength;
			let (fx, fy) = (dx * l, dy * l);

			let target = &mut nodes[edge.target.0];
			target.vx -= fx * edge.bias;
			target.vy -= fy * edge.bias;
			let source = &mut nodes[edge.source.0];
			source.vx += fx * (1.0 - edge.bias);
			source.vy += fy * (1.0 - edge.bias);
		}
	}
}

/// Many-body charge via a Barnes-Hut quadtree.
pub fn apply_many_body(nodes: &mut [Node], config: &ChargeForceConfig, alpha: f64, rng: &mut Lcg) {
	if nodes.len() < 2 || config.strength == 0.0 {
		return;
	}

	// Velocities change, positions don't, so snapshot positions for the tree.
	let positions: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
	let charges = vec![config.strength; nodes.len()];
	let tree = QuadTree::build(&positions, &charges);

	let theta2 = config.theta * config.theta;
	let dmin2 = config.distance_min * config.distance_min;
	let dmax2 = config.distance_max.map_or(f64::INFINITY, |d| d * d);

	let mut stack = Vec::new();
	for (i, node) in nodes.iter_mut().enumerate() {
		let (x, y) = positions[i];
		let (mut ax, mut ay) = (0.0, 0.0);

		stack.clear();
		stack.push(0);
		while let Some(idx) = stack.pop() {
			let cell = tree.cell(idx);
			if cell.charge == 0.0 {
				continue;
			}

			let (mut dx, mut dy) = (cell.cx - x, cell.cy - y);
			let mut l = dx * dx + dy * dy;

			// Far enough away to treat the whole cell as one particle.
			if cell.width * cell.width < l * theta2 {
				if l < dmax2 {
					if l < dmin2 {
						l = (dmin2 * l).sqrt();
					}
					ax += dx * cell.charge * alpha / l;
					ay += dy * cell.charge * alpha / l;
				}
				continue;
			}

			match &cell.kind {
				CellKind::Internal(children) => {
					stack.extend(children.iter().flatten().copied());
				}
				CellKind::Leaf(points) => {
					for &j in points {
						if j == i {
							continue;
						}
						dx = positions[j].0 - x;
						dy = positions[j].1 - y;
						if dx == 0.0 {
							dx = rng.jiggle();
						}
						if dy == 0.0 {
							dy = rng.jiggle();
						}
						l = dx * dx + dy * dy;
						if l >= dmax2 {
							continue;
						}
						if l < dmin2 {
							l = (dmin2 * l).sqrt();
						}
						let w = charges[j] * alpha / l;
						ax += dx * w;
						ay += dy * w;
					}
				}
			}
		}

		node.vx += ax;
		node.vy += ay;
	}
}

/// Shift all nodes so their mean position moves toward `(cx, cy)`.
pub fn apply_center(nodes: &mut [Node], cx: f64, cy: f64, config: &CenterForceConfig) {
	if nodes.is_empty() {
		return;
	}
	let n = nodes.len() as f64;
	let (sx, sy) = nodes.iter().fold((0.0, 0.0), |(ax, ay), node| (ax + node.x, ay + node.y));
	let (sx, sy) = ((sx / n - cx) * config.strength, (sy / n - cy) * config.strength);
	for node in nodes {
		node.x -= sx;
		node.y -= sy;
	}
}

/// Integrate velocities into positions. Pinned axes snap to the pin and
/// lose their velocity.
pub fn integrate(nodes: &mut [Node], pins: &PinTable, velocity_decay: f64) {
	let keep = 1.0 - velocity_decay;
	for node in nodes {
		let pin = pins.get(node.index).unwrap_or_default();
		match pin.x {
			Some(fx) => {
				node.x = fx;
				node.vx = 0.0;
			}
			None => {
				node.vx *= keep;
				node.x += node.vx;
			}
		}
		match pin.y {
			Some(fy) => {
				node.y = fy;
				node.vy = 0.0;
			}
			None => {
				node.vy *= keep;
				node.y += node.vy;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::NodeIndex;

	fn node(i: usize, x: f64, y: f64) -> Node {
		Node {
			id: format!("n{i}"),
			group: None,
			index: NodeIndex(i),
			x,
			y,
			vx: 0.0,
			vy: 0.0,
		}
	}

	fn edge(i: usize, s: usize, t: usize) -> Edge {
		Edge {
			index: i,
			source: NodeIndex(s),
			target: NodeIndex(t),
			value: 1.0,
			strength: 0.0,
			bias: 0.0,
		}
	}

	/// Exact pairwise sum, the reference for the tree walk.
	fn pairwise(nodes: &[Node], strength: f64, alpha: f64) -> Vec<(f64, f64)> {
		nodes
			.iter()
			.map(|a| {
				nodes.iter().filter(|b| b.index != a.index).fold((0.0, 0.0), |(ax, ay), b| {
					let (dx, dy) = (b.x - a.x, b.y - a.y);
					let mut l = dx * dx + dy * dy;
					if l < 1.0 {
						l = l.sqrt();
					}
					(ax + dx * strength * alpha / l, ay + dy * strength * alpha / l)
				})
			})
			.collect()
	}

	#[test]
	fn degree_based_strength_and_bias() {
		// 0 is a hub with three spokes.
		let mut edges = vec![edge(0, 0, 1), edge(1, 0, 2), edge(2, 0, 3)];
		initialize_links(&mut edges, 4, &LinkForceConfig::default());
		for e in &edges {
			assert_eq!(e.strength, 1.0);
			assert_eq!(e.bias, 0.75);
		}
	}

	#[test]
	fn stretched_link_pulls_endpoints_together() {
		let mut nodes = vec![node(0, 0.0, 0.0), node(1, 100.0, 0.0)];
		let mut edges = vec![edge(0, 0, 1)];
		let config = LinkForceConfig::default();
		initialize_links(&mut edges, 2, &config);
		apply_link(&mut nodes, &edges, &config, 1.0, &mut Lcg::default());
		assert!(nodes[0].vx > 0.0);
		assert!(nodes[1].vx < 0.0);
	}

	#[test]
	fn compressed_link_pushes_endpoints_apart() {
		let mut nodes = vec![node(0, 0.0, 0.0), node(1, 5.0, 0.0)];
		let mut edges = vec![edge(0, 0, 1)];
		let config = LinkForceConfig::default();
		initialize_links(&mut edges, 2, &config);
		apply_link(&mut nodes, &edges, &config, 1.0, &mut Lcg::default());
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
	}

	#[test]
	fn exact_tree_walk_matches_pairwise_sum() {
		let mut nodes: Vec<Node> = (0..12)
			.map(|i| node(i, (i * 37 % 23) as f64 * 7.0, (i * 11 % 17) as f64 * 5.0))
			.collect();
		let expected = pairwise(&nodes, -30.0, 0.5);
		let config = ChargeForceConfig {
			theta: 0.0,
			..Default::default()
		};
		apply_many_body(&mut nodes, &config, 0.5, &mut Lcg::default());
		for (n, (ex, ey)) in nodes.iter().zip(expected) {
			assert!((n.vx - ex).abs() < 1e-9, "{} vs {}", n.vx, ex);
			assert!((n.vy - ey).abs() < 1e-9, "{} vs {}", n.vy, ey);
		}
	}

	#[test]
	fn approximation_stays_close_to_exact() {
		let mut nodes: Vec<Node> = (0..60)
			.map(|i| node(i, (i * 37 % 61) as f64 * 3.0, (i * 29 % 53) as f64 * 4.0))
			.collect();
		let expected = pairwise(&nodes, -30.0, 1.0);
		apply_many_body(&mut nodes, &ChargeForceConfig::default(), 1.0, &mut Lcg::default());
		let (mut err, mut mag) = (0.0, 0.0);
		for (n, (ex, ey)) in nodes.iter().zip(expected) {
			err += ((n.vx - ex).powi(2) + (n.vy - ey).powi(2)).sqrt();
			mag += (ex * ex + ey * ey).sqrt();
		}
		assert!(err / mag < 0.15, "relative error {}", err / mag);
	}

	#[test]
	fn coincident_nodes_are_pushed_apart() {
		let mut nodes = vec![node(0, 10.0, 10.0), node(1, 10.0, 10.0)];
		apply_many_body(&mut nodes, &ChargeForceConfig::default(), 1.0, &mut Lcg::default());
		assert!(nodes.iter().all(|n| n.vx.is_finite() && n.vy.is_finite()));
		assert!(nodes[0].vx != 0.0 || nodes[0].vy != 0.0);
	}

	#[test]
	fn center_moves_mean_onto_target() {
		let mut nodes = vec![node(0, 0.0, 0.0), node(1, 10.0, 20.0)];
		apply_center(&mut nodes, 100.0, 100.0, &CenterForceConfig::default());
		let mx = (nodes[0].x + nodes[1].x) / 2.0;
		let my = (nodes[0].y + nodes[1].y) / 2.0;
		assert!((mx - 100.0).abs() < 1e-9);
		assert!((my - 100.0).abs() < 1e-9);
	}

	#[test]
	fn integrate_respects_each_pinned_axis() {
		let mut nodes = vec![node(0, 0.0, 0.0)];
		nodes[0].vx = 5.0;
		nodes[0].vy = 5.0;
		let mut pins = PinTable::new();
		pins.pin_axis(NodeIndex(0), Some(42.0), None);
		integrate(&mut nodes, &pins, 0.4);
		assert_eq!(nodes[0].x, 42.0);
		assert_eq!(nodes[0].vx, 0.0);
		assert!((nodes[0].y - 3.0).abs() < 1e-12);
	}
}
