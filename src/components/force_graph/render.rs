//! Canvas rendering for the force graph.
//!
//! Called from the simulation's step listener with the latest positions.
//! Links are drawn first so nodes sit on top of them.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::simulation::PositionSet;
use super::state::Scene;
use super::theme::Theme;

/// Fixed-size drawing target handed to the step listener.
#[derive(Clone)]
pub struct Surface {
	pub ctx: CanvasRenderingContext2d,
	pub width: f64,
	pub height: f64,
}

/// Renders the complete graph to the canvas.
pub fn render(surface: &Surface, scene: &Scene, theme: &Theme, positions: PositionSet<'_>) {
	let ctx = &surface.ctx;
	ctx.set_fill_style_str(&theme.background.color.to_css());
	ctx.fill_rect(0.0, 0.0, surface.width, surface.height);

	draw_edges(ctx, scene, theme, positions);
	draw_nodes(ctx, scene, theme, positions);
}

fn draw_edges(ctx: &CanvasRenderingContext2d, scene: &Scene, theme: &Theme, positions: PositionSet<'_>) {
	ctx.set_stroke_style_str(&theme.edge.color.to_css());
	for (edge, (x1, y1), (x2, y2)) in positions.segments() {
		ctx.set_line_width(scene.edge_widths[edge.index]);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_nodes(ctx: &CanvasRenderingContext2d, scene: &Scene, theme: &Theme, positions: PositionSet<'_>) {
	let style = &theme.node;
	ctx.set_stroke_style_str(&style.border_color.to_css());
	ctx.set_line_width(style.border_width);

	for node in positions.nodes {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&scene.node_colors[node.index.0]);
		ctx.fill();
		if style.border_width > 0.0 {
			ctx.stroke();
		}
	}
}
