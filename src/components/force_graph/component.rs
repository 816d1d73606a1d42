//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates a fixed-size canvas, builds the layout engine once
//! both the canvas and the dataset are available, and registers a step
//! listener that redraws the canvas. An animation loop via
//! `requestAnimationFrame` acts as the simulation clock. Mouse handlers
//! translate drags into pins.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::error::{GraphError, Result};
use super::render::{self, Surface};
use super::simulation::SimulationConfig;
use super::state::ForceGraphState;
use super::theme::Theme;
use super::types::GraphData;
use super::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Size the canvas, acquire its 2d context, build the graph state, and hook
/// the renderer onto the simulation's step listener.
fn mount(
	canvas: &HtmlCanvasElement,
	data: &GraphData,
	width: f64,
	height: f64,
	theme: Theme,
	config: SimulationConfig,
) -> Result<ForceGraphState> {
	canvas.set_width(width as u32);
	canvas.set_height(height as u32);

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|e| GraphError::Canvas(format!("{e:?}")))?
		.ok_or_else(|| GraphError::Canvas("2d context unavailable".into()))?
		.dyn_into()
		.map_err(|_| GraphError::Canvas("context is not 2d".into()))?;

	let mut state = ForceGraphState::with_config(data, width, height, theme, config)?;
	let surface = Surface { ctx, width, height };
	let (scene, theme) = (state.scene.clone(), state.theme.clone());

	render::render(&surface, &scene, &theme, state.positions());
	state
		.simulation
		.on_step(move |positions| render::render(&surface, &scene, &theme, positions));
	Ok(state)
}

/// Map a mouse event to canvas pixels, undoing any CSS scaling of the element.
fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	let scale = |pixels: u32, css: f64| if css > 0.0 { pixels as f64 / css } else { 1.0 };
	(
		(ev.client_x() as f64 - rect.left()) * scale(canvas.width(), rect.width()),
		(ev.client_y() as f64 - rect.top()) * scale(canvas.height(), rect.height()),
	)
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor);
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass the dataset via the reactive `data` signal; while it is `None` the
/// component waits. Construction errors (such as a link to an unknown node)
/// are logged and passed to `on_error`. The canvas has a fixed logical size
/// and scales down with its container.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<Option<GraphData>>,
	#[prop(default = CANVAS_WIDTH)] width: f64,
	#[prop(default = CANVAS_HEIGHT)] height: f64,
	#[prop(default = false)] dark: bool,
	#[prop(optional)] config: Option<SimulationConfig>,
	#[prop(optional)] on_error: Option<Callback<GraphError>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let unmounted = Arc::new(AtomicBool::new(false));
	let (context_init, animate_init, unmounted_init) =
		(context.clone(), animate.clone(), unmounted.clone());

	Effect::new(move |_| {
		let theme = if dark { Theme::dark() } else { Theme::default() };
		let config = config.clone().unwrap_or_default();
		let canvas = canvas_ref.get();
		let mounted = data.get().ok_or(GraphError::DataUnavailable).and_then(|data| {
			let canvas: HtmlCanvasElement = canvas.ok_or(GraphError::RenderTargetMissing)?.into();
			mount(&canvas, &data, width, height, theme, config)
		});

		match mounted {
			Ok(state) => *context_init.borrow_mut() = Some(state),
			Err(e) if e.is_transient() => {
				debug!("force-directed-graph: {e}, deferring draw");
				return;
			}
			Err(e) => {
				error!("force-directed-graph: setup failed: {e}");
				*context_init.borrow_mut() = None;
				if let Some(cb) = on_error.as_ref() {
					cb.run(e);
				}
				return;
			}
		}

		if animate_init.borrow().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let (context_anim, animate_inner, unmounted_anim) =
			(context_init.clone(), animate_init.clone(), unmounted_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if unmounted_anim.load(Ordering::Relaxed) {
				if let Some(mut state) = context_anim.borrow_mut().take() {
					state.teardown();
				}
				info!("force-directed-graph: view unmounted, animation stopped");
				return;
			}
			if let Some(ref mut state) = *context_anim.borrow_mut() {
				state.tick();
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	on_cleanup(move || unmounted.store(true, Ordering::Relaxed));

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);
		if let Some(ref mut state) = *context_md.borrow_mut() {
			if state.pointer_down(x, y).is_some() {
				set_cursor(&canvas, "grabbing");
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);
		if let Some(ref mut state) = *context_mm.borrow_mut() {
			state.pointer_move(x, y);
			canvas.set_title(state.hovered_id().unwrap_or_default());
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut state) = *context_mu.borrow_mut() {
			state.pointer_up();
		}
		if let Some(canvas) = canvas_ref.get() {
			let canvas: HtmlCanvasElement = canvas.into();
			set_cursor(&canvas, "grab");
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut state) = *context_ml.borrow_mut() {
			state.pointer_leave();
		}
		if let Some(canvas) = canvas_ref.get() {
			let canvas: HtmlCanvasElement = canvas.into();
			set_cursor(&canvas, "grab");
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; max-width: 100%; height: auto; cursor: grab;"
		/>
	}
}
