//! force-directed-graph: a node-link graph laid out by a force simulation.
//!
//! This crate provides a WASM-based graph component that fetches a static
//! JSON dataset, lays it out with an explicit force-directed engine, and
//! lets users drag nodes to perturb the layout.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, info, warn};

pub mod components;

pub use components::force_graph::simulation::{
	NodeIndex, Pin, PositionSet, Simulation, SimulationConfig,
};
pub use components::force_graph::{
	CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_DATA_PATH, DatasetState, ForceGraphCanvas,
	ForceGraphState, GraphData, GraphError, GraphLink, GraphNode, Group, InteractionController,
	PinTable, Theme, fetch_dataset, parse_dataset,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("force-directed-graph: logging initialized");
}

/// Main application component.
/// Fetches the dataset once and renders the force-directed visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let (dataset, set_dataset) = signal(DatasetState::Pending);
	spawn_local(async move {
		let result = fetch_dataset(DEFAULT_DATA_PATH).await;
		if let Err(ref e) = result {
			warn!("force-directed-graph: {e}");
		}
		set_dataset.set(result.into());
	});

	let data = Signal::derive(move || dataset.with(|d| d.ready().cloned()));
	let (setup_error, set_setup_error) = signal(None::<String>);
	let on_error = Callback::new(move |e: GraphError| set_setup_error.set(Some(e.to_string())));

	let status = move || {
		setup_error.get().or_else(|| {
			dataset.with(|d| match d {
				DatasetState::Pending => Some("Loading…".to_string()),
				DatasetState::Failed(msg) => Some(msg.clone()),
				DatasetState::Ready(_) => None,
			})
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />
		<Title text="Force-Directed Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-view">
			<ForceGraphCanvas data=data on_error=on_error />
			<p class="graph-status">{status}</p>
			<p class="subtitle">"Drag nodes to reposition them."</p>
		</div>
	}
}
