//! Errors raised while obtaining a graph payload or engine configuration.
//!
//! None of these reach the user: the loader logs them and substitutes the
//! fallback graph (or default configuration).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
	/// Not running inside a browser window.
	#[error("no browser window available")]
	NoWindow,

	/// The request never produced a response.
	#[error("request to {url} failed: {message}")]
	Network { url: String, message: String },

	/// The server answered with a non-success status.
	#[error("HTTP {status} from {url}")]
	Http { url: String, status: u16 },

	/// The body was not a graph payload (missing `nodes`/`edges`, wrong types).
	#[error("malformed graph payload: {0}")]
	Decode(#[from] serde_json::Error),

	/// The payload decoded but contained no nodes.
	#[error("graph payload has no nodes")]
	EmptyPayload,

	#[error("invalid engine configuration: {0}")]
	InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
