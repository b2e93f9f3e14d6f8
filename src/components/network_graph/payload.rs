use glam::DVec2;
use log::{error, info, warn};
use serde::{Deserialize, Deserializer};

use super::error::{GraphError, Result};
use super::types::RiskLevel;

const FALLBACK_GRAPH_JSON: &str = include_str!("fallback_graph.json");

pub const ETH_ICON_URL: &str = "assets/eth.svg";
pub const BTC_ICON_URL: &str = "assets/btc.svg";

/// A node as delivered by the data service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
	#[serde(default)]
	pub id: String,
	pub address: Option<String>,
	pub label: Option<String>,
	pub category: Option<String>,
	pub risk_level: Option<RiskLevel>,
	/// Enrichment score, used only when `riskLevel` is absent.
	pub confidence: Option<u8>,
	#[serde(default, alias = "connectedNodes")]
	pub connected_node_ids: Vec<String>,
	#[serde(default, deserialize_with = "position")]
	pub position: Option<DVec2>,
	#[serde(alias = "icon")]
	pub icon_url: Option<String>,
}

/// The service sends `{ "x", "y" }` objects; `[x, y]` pairs are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Position {
	Point { x: f64, y: f64 },
	Pair(DVec2),
}

fn position<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<DVec2>, D::Error> {
	Ok(Option::<Position>::deserialize(de)?.map(|p| match p {
		Position::Point { x, y } => DVec2::new(x, y),
		Position::Pair(v) => v,
	}))
}

impl NodeRecord {
	/// The node's key: `id`, or its address when the service omits ids.
	pub fn key(&self) -> Option<&str> {
		if !self.id.is_empty() {
			Some(&self.id)
		} else {
			self.address.as_deref().filter(|a| !a.is_empty())
		}
	}

	pub fn resolved_risk(&self) -> RiskLevel {
		self.risk_level
			.or_else(|| self.confidence.map(RiskLevel::from_confidence))
			.unwrap_or_default()
	}

	pub fn resolved_category(&self) -> String {
		self.category.clone().unwrap_or_else(|| "Wallet".into())
	}
}

/// An edge as delivered by the data service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
	pub id: Option<String>,
	#[serde(alias = "source")]
	pub source_id: String,
	#[serde(alias = "target")]
	pub target_id: String,
	#[serde(default)]
	pub amount: String,
	#[serde(alias = "token", alias = "asset")]
	pub asset_label: Option<String>,
	pub timestamp: Option<String>,
}

impl EdgeRecord {
	pub fn resolved_id(&self, index: usize) -> String {
		self.id
			.clone()
			.unwrap_or_else(|| format!("{}-{}-{}", self.source_id, self.target_id, index))
	}
}

/// `{nodes, edges}` plus an optional catalogue of nodes reachable only by expansion.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
	pub nodes: Vec<NodeRecord>,
	#[serde(alias = "links")]
	pub edges: Vec<EdgeRecord>,
	#[serde(default)]
	pub child_nodes: Vec<NodeRecord>,
}

impl GraphPayload {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn non_empty(self) -> Result<Self> {
		if self.nodes.is_empty() {
			Err(GraphError::EmptyPayload)
		} else {
			Ok(self)
		}
	}
}

/// The graph shown whenever the data service cannot supply one.
pub fn fallback_graph() -> GraphPayload {
	match GraphPayload::from_json(FALLBACK_GRAPH_JSON) {
		Ok(payload) => payload,
		Err(e) => {
			error!("embedded fallback graph is unreadable: {}", e);
			GraphPayload::default()
		}
	}
}

/// Chain logo for an address: `0x` addresses are Ethereum, the rest Bitcoin.
pub fn chain_icon(address: &str) -> &'static str {
	if address.starts_with("0x") {
		ETH_ICON_URL
	} else {
		BTC_ICON_URL
	}
}

/// The fallback graph with `address` prepended as a high-risk root node.
pub fn fallback_graph_for(address: &str) -> GraphPayload {
	let mut graph = fallback_graph();
	let address = address.trim();
	if address.is_empty() || graph.nodes.iter().any(|n| n.key() == Some(address)) {
		return graph;
	}
	graph.nodes.insert(
		0,
		NodeRecord {
			id: address.to_string(),
			address: Some(address.to_string()),
			risk_level: Some(RiskLevel::High),
			icon_url: Some(chain_icon(address).to_string()),
			..Default::default()
		},
	);
	graph
}

/// Turns a fetch outcome for `address` into something displayable; failures never propagate.
pub fn resolve_payload(result: Result<GraphPayload>, address: &str) -> GraphPayload {
	match result.and_then(GraphPayload::non_empty) {
		Ok(payload) => {
			info!(
				"graph loaded: {} nodes, {} edges",
				payload.nodes.len(),
				payload.edges.len()
			);
			payload
		}
		Err(e) => {
			warn!("graph unavailable ({}), using fallback graph", e);
			fallback_graph_for(address)
		}
	}
}
