//! Visual theming for the force graph.
//!
//! Provides the categorical palette, the group-to-color scale, and the
//! stroke/fill styles used by the renderer.

use std::collections::HashMap;
use std::hash::Hash;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity, 0 to 1.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Hex when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// A fixed list of categorical colors.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Colors in assignment order.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// The ten-color categorical palette (blue, orange, green, red, ...).
	pub fn category10() -> Self {
		Self {
			colors: vec![
				Color::rgb(0x1f, 0x77, 0xb4),
				Color::rgb(0xff, 0x7f, 0x0e),
				Color::rgb(0x2c, 0xa0, 0x2c),
				Color::rgb(0xd6, 0x27, 0x28),
				Color::rgb(0x94, 0x67, 0xbd),
				Color::rgb(0x8c, 0x56, 0x4b),
				Color::rgb(0xe3, 0x77, 0xc2),
				Color::rgb(0x7f, 0x7f, 0x7f),
				Color::rgb(0xbc, 0xbd, 0x22),
				Color::rgb(0x17, 0xbe, 0xcf),
			],
		}
	}

	/// Color at `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}
}

/// Maps categorical keys onto a palette in order of first appearance.
///
/// The first distinct key gets the first color, the second key the second,
/// and so on, wrapping after the palette is exhausted. A key keeps its color
/// for the lifetime of the scale.
#[derive(Clone, Debug)]
pub struct OrdinalScale<K> {
	palette: NodePalette,
	domain: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> OrdinalScale<K> {
	/// Empty scale over `palette`.
	pub fn new(palette: NodePalette) -> Self {
		Self {
			palette,
			domain: HashMap::new(),
		}
	}

	/// Color for `key`, extending the domain if the key is new.
	pub fn color(&mut self, key: &K) -> Color {
		let next = self.domain.len();
		let slot = *self.domain.entry(key.clone()).or_insert(next);
		self.palette.get(slot)
	}

	/// Number of distinct keys seen so far.
	pub fn domain_len(&self) -> usize {
		self.domain.len()
	}
}

/// Background fill behind the graph.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Fill color.
	pub color: Color,
}

/// Link stroke style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Stroke color, alpha included.
	pub color: Color,
	/// Stroke width for a link of weight 1. Scaled by `sqrt(value)`.
	pub base_width: f64,
}

/// Node circle style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Circle radius.
	pub radius: f64,
	/// Pointer hit radius. Slightly larger than the circle for easier grabbing.
	pub hit_radius: f64,
	/// Outline color.
	pub border_color: Color,
	/// Outline width (0 = no border).
	pub border_width: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Theme identifier.
	pub name: &'static str,
	/// Canvas background.
	pub background: BackgroundStyle,
	/// Link style.
	pub edge: EdgeStyle,
	/// Node style.
	pub node: NodeStyle,
	/// Group colors.
	pub palette: NodePalette,
}

impl Theme {
	/// White background, grey links, white-outlined nodes.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(255, 255, 255),
			},
			edge: EdgeStyle {
				color: Color::rgba(0x99, 0x99, 0x99, 0.6),
				base_width: 1.0,
			},
			node: NodeStyle {
				radius: 5.0,
				hit_radius: 8.0,
				border_color: Color::rgb(255, 255, 255),
				border_width: 1.5,
			},
			palette: NodePalette::category10(),
		}
	}

	/// Same layout on a dark background.
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.5),
				base_width: 1.0,
			},
			node: NodeStyle {
				border_color: Color::rgb(22, 27, 34),
				..Self::light().node
			},
			palette: NodePalette::category10(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}
