//! Barnes-Hut quadtree for many-body force approximation.
//!
//! The tree recursively subdivides a square around all nodes and records
//! the total charge and charge-weighted centre of every cell. Distant cells
//! are then treated as one pseudo-particle, so a full repulsion pass costs
//! O(n log n) instead of O(n²).

/// Maximum subdivision depth. Points still sharing a cell at this depth
/// are kept together in one leaf.
const MAX_DEPTH: usize = 24;

/// What a cell holds.
#[derive(Clone, Debug)]
pub enum CellKind {
	/// Terminal cell with one or more point indices.
	Leaf(Vec<usize>),
	/// Subdivided cell. Children are indexed by quadrant
	/// (`0` = top-left, `1` = top-right, `2` = bottom-left, `3` = bottom-right).
	Internal([Option<usize>; 4]),
}

/// One square cell of the tree.
#[derive(Clone, Debug)]
pub struct Cell {
	/// Left edge.
	pub x0: f64,
	/// Top edge.
	pub y0: f64,
	/// Side length.
	pub width: f64,
	/// Sum of the charges of all points below this cell.
	pub charge: f64,
	/// Charge-weighted centre, x.
	pub cx: f64,
	/// Charge-weighted centre, y.
	pub cy: f64,
	/// Leaf points or child cells.
	pub kind: CellKind,
}

/// Flattened Barnes-Hut quadtree. The root, when present, is cell `0`.
#[derive(Clone, Debug, Default)]
pub struct QuadTree {
	cells: Vec<Cell>,
}

impl QuadTree {
	/// Build a tree over `positions`, weighting each point by `charges[i]`.
	pub fn build(positions: &[(f64, f64)], charges: &[f64]) -> Self {
		debug_assert_eq!(positions.len(), charges.len());
		if positions.is_empty() {
			return Self::default();
		}

		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for &(x, y) in positions {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}

		// Square bounds, nudged outward so max-edge points fall inside.
		let width = (max_x - min_x).max(max_y - min_y).max(1.0) * (1.0 + 1e-9);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

		let mut builder = TreeBuilder {
			positions,
			charges,
			cells: Vec::with_capacity(positions.len() * 2),
		};
		let indices: Vec<usize> = (0..positions.len()).collect();
		builder.build_cell(indices, cx - width / 2.0, cy - width / 2.0, width, 0);

		Self {
			cells: builder.cells,
		}
	}

	/// Root cell, or `None` for an empty tree.
	pub fn root(&self) -> Option<&Cell> {
		self.cells.first()
	}

	/// Cell by index.
	pub fn cell(&self, idx: usize) -> &Cell {
		&self.cells[idx]
	}

	/// Number of cells.
	pub fn len(&self) -> usize {
		self.cells.len()
	}

	/// True for a tree built from no points.
	pub fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}
}

struct TreeBuilder<'a> {
	positions: &'a [(f64, f64)],
	charges: &'a [f64],
	cells: Vec<Cell>,
}

impl TreeBuilder<'_> {
	fn build_cell(&mut self, indices: Vec<usize>, x0: f64, y0: f64, width: f64, depth: usize) -> usize {
		let cell_idx = self.cells.len();

		let (charge, cx, cy) = self.aggregate(&indices);
		self.cells.push(Cell {
			x0,
			y0,
			width,
			charge,
			cx,
			cy,
			kind: CellKind::Leaf(Vec::new()),
		});

		if indices.len() == 1 || depth >= MAX_DEPTH || self.all_coincident(&indices) {
			self.cells[cell_idx].kind = CellKind::Leaf(indices);
			return cell_idx;
		}

		let half = width / 2.0;
		let (mx, my) = (x0 + half, y0 + half);
		let mut quadrants: [Vec<usize>; 4] = Default::default();
		for i in indices {
			let (x, y) = self.positions[i];
			let q = usize::from(x >= mx) | (usize::from(y >= my) << 1);
			quadrants[q].push(i);
		}

		let mut children = [None; 4];
		for (q, points) in quadrants.into_iter().enumerate() {
			if points.is_empty() {
				continue;
			}
			let qx = if q & 1 == 0 { x0 } else { mx };
			let qy = if q & 2 == 0 { y0 } else { my };
			children[q] = Some(self.build_cell(points, qx, qy, half, depth + 1));
		}
		self.cells[cell_idx].kind = CellKind::Internal(children);
		cell_idx
	}

	/// Total charge and centre weighted by absolute charge.
	fn aggregate(&self, indices: &[usize]) -> (f64, f64, f64) {
		let (mut charge, mut weight, mut sx, mut sy) = (0.0, 0.0, 0.0, 0.0);
		for &i in indices {
			let c = self.charges[i];
			let (x, y) = self.positions[i];
			charge += c;
			weight += c.abs();
			sx += c.abs() * x;
			sy += c.abs() * y;
		}
		if weight > 0.0 {
			(charge, sx / weight, sy / weight)
		} else {
			let n = indices.len() as f64;
			let (mx, my) = indices.iter().fold((0.0, 0.0), |(ax, ay), &i| {
				(ax + self.positions[i].0, ay + self.positions[i].1)
			});
			(charge, mx / n, my / n)
		}
	}

	fn all_coincident(&self, indices: &[usize]) -> bool {
		let first = self.positions[indices[0]];
		indices.iter().all(|&i| self.positions[i] == first)
	}
}
