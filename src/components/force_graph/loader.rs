//! Dataset loading: a single fetch of a static JSON document.

use log::{info, warn};

use super::error::{GraphError, Result};
use super::types::GraphData;

/// Default location of the dataset, relative to the page.
pub const DEFAULT_DATA_PATH: &str = "/data/miserables.json";

/// Load progress of the dataset.
#[derive(Clone, Debug, Default)]
pub enum DatasetState {
	/// Request not yet resolved.
	#[default]
	Pending,
	/// Dataset parsed successfully.
	Ready(GraphData),
	/// Request or parse failed. No retry is attempted.
	Failed(String),
}

impl DatasetState {
	/// The parsed dataset, or `None` while pending or after a failure.
	pub fn ready(&self) -> Option<&GraphData> {
		match self {
			DatasetState::Ready(data) => Some(data),
			_ => None,
		}
	}

	/// Like [`ready`](Self::ready) but reports the missing data as an error.
	pub fn require(&self) -> Result<&GraphData> {
		self.ready().ok_or(GraphError::DataUnavailable)
	}
}

impl From<Result<GraphData>> for DatasetState {
	fn from(result: Result<GraphData>) -> Self {
		match result {
			Ok(data) => DatasetState::Ready(data),
			Err(e) => DatasetState::Failed(e.to_string()),
		}
	}
}

/// Parse a dataset document of the form `{ nodes: [...], links: [...] }`.
pub fn parse_dataset(json_text: &str) -> Result<GraphData> {
	let data: GraphData = serde_json::from_str(json_text)?;
	info!(
		"force-directed-graph: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}

/// Fetch and parse the dataset at `path`.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_dataset(path: &str) -> Result<GraphData> {
	use gloo_net::http::Request;

	let resp = Request::get(path)
		.send()
		.await
		.map_err(|e| GraphError::Fetch(format!("network error: {e}")))?;

	if !resp.ok() {
		let err = GraphError::Fetch(format!("HTTP {}: {}", resp.status(), resp.status_text()));
		warn!("force-directed-graph: {err}");
		return Err(err);
	}

	let text = resp
		.text()
		.await
		.map_err(|e| GraphError::Fetch(format!("body read error: {e}")))?;
	parse_dataset(&text)
}

/// Fetch and parse the dataset at `path`.
///
/// Outside the browser there is nothing to fetch from, so this always fails.
#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_dataset(path: &str) -> Result<GraphData> {
	let err = GraphError::Fetch(format!("{path}: fetch is only available in the browser"));
	warn!("force-directed-graph: {err}");
	Err(err)
}
