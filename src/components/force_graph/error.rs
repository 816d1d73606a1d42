//! Error types for dataset loading, layout construction, and rendering.

use thiserror::Error;

/// Errors raised while loading a dataset or building the graph view.
#[derive(Error, Debug)]
pub enum GraphError {
	/// The dataset has not been loaded yet. Callers wait and retry on the next change.
	#[error("dataset not yet available")]
	DataUnavailable,

	/// A link names a node that is not in the node set.
	#[error("node not found: {id}")]
	UnknownNode {
		/// The unresolved node identifier.
		id: String,
	},

	/// Two nodes share the same identifier.
	#[error("duplicate node id: {0}")]
	DuplicateNode(String),

	/// The canvas is not attached yet. Drawing is deferred until it is.
	#[error("render target is not mounted")]
	RenderTargetMissing,

	/// The dataset is not valid JSON or does not match the expected shape.
	#[error("failed to parse dataset: {0}")]
	Parse(#[from] serde_json::Error),

	/// The dataset request failed.
	#[error("failed to fetch dataset: {0}")]
	Fetch(String),

	/// The canvas 2d context could not be acquired.
	#[error("canvas error: {0}")]
	Canvas(String),
}

impl GraphError {
	/// Whether the error only defers work rather than aborting setup.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::DataUnavailable | Self::RenderTargetMissing)
	}
}

/// Result alias used throughout the graph component.
pub type Result<T> = std::result::Result<T, GraphError>;
