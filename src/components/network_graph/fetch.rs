use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::config::EngineConfig;
use super::error::{GraphError, Result};
use super::payload::{GraphPayload, resolve_payload};

/// Route prefixes tried under each base; Express mounts the API under `/api`.
const API_PREFIXES: &[&str] = &["", "/api"];

/// Every URL that might serve the graph for `address`, in the order they are tried.
pub fn candidate_urls(bases: &[String], address: &str) -> Vec<String> {
	let address = address.trim();
	bases
		.iter()
		.flat_map(|base| {
			let base = base.trim_end_matches('/');
			API_PREFIXES
				.iter()
				.map(move |prefix| format!("{base}{prefix}/graph/{address}"))
		})
		.collect()
}

/// Fetches the graph around `address` from the first backend that answers.
pub async fn fetch_graph(config: &EngineConfig, address: &str) -> Result<GraphPayload> {
	let mut last_error = GraphError::NoWindow;
	for url in candidate_urls(&config.api_bases, address) {
		match fetch_text(&url).await {
			Ok(body) => return GraphPayload::from_json(&body)?.non_empty(),
			Err(e) => {
				debug!("graph endpoint {} unavailable: {}", url, e);
				last_error = e;
			}
		}
	}
	Err(last_error)
}

/// Like [`fetch_graph`], but always yields something to draw.
pub async fn load_graph(config: &EngineConfig, address: &str) -> GraphPayload {
	resolve_payload(fetch_graph(config, address).await, address)
}

async fn fetch_text(url: &str) -> Result<String> {
	let window = web_sys::window().ok_or(GraphError::NoWindow)?;
	let network = |e: JsValue| GraphError::Network {
		url: url.to_string(),
		message: format!("{e:?}"),
	};

	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(network)?
		.dyn_into()
		.map_err(network)?;
	if !response.ok() {
		return Err(GraphError::Http {
			url: url.to_string(),
			status: response.status(),
		});
	}

	let body = JsFuture::from(response.text().map_err(network)?)
		.await
		.map_err(network)?;
	body.as_string()
		.ok_or_else(|| network(JsValue::from_str("response body is not text")))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_base_is_tried_with_and_without_api_prefix() {
		let bases = vec!["http://localhost:5001/".to_string(), "http://localhost:8000".to_string()];
		assert_eq!(
			candidate_urls(&bases, " 0xabc "),
			vec![
				"http://localhost:5001/graph/0xabc",
				"http://localhost:5001/api/graph/0xabc",
				"http://localhost:8000/graph/0xabc",
				"http://localhost:8000/api/graph/0xabc",
			]
		);
	}

	#[test]
	fn no_bases_means_no_requests() {
		assert!(candidate_urls(&[], "0xabc").is_empty());
	}
}
