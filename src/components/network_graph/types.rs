use std::fmt;

use glam::DVec2;
use serde::Deserialize;

/// Investigator-assigned risk of an address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum RiskLevel {
	High,
	#[default]
	Medium,
	Low,
}

impl RiskLevel {
	/// Buckets a 1..=5 confidence score the way the enrichment service reports it.
	pub fn from_confidence(confidence: u8) -> Self {
		match confidence {
			4.. => RiskLevel::High,
			2..=3 => RiskLevel::Medium,
			_ => RiskLevel::Low,
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"High" => Some(RiskLevel::High),
			"Medium" => Some(RiskLevel::Medium),
			"Low" => Some(RiskLevel::Low),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RiskLevel::High => "High",
			RiskLevel::Medium => "Medium",
			RiskLevel::Low => "Low",
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			RiskLevel::High => "#EF4444",
			RiskLevel::Medium => "#EAB308",
			RiskLevel::Low => "#22C55E",
		}
	}
}

impl fmt::Display for RiskLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Fill colour and glyph drawn for a category tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryStyle {
	pub color: &'static str,
	pub icon: &'static str,
}

pub const DEFAULT_CATEGORY_STYLE: CategoryStyle = CategoryStyle {
	color: "#6B7280",
	icon: "⚪",
};

/// Category tags are an open set; anything unknown gets [`DEFAULT_CATEGORY_STYLE`].
pub fn category_style(category: &str) -> CategoryStyle {
	let (color, icon) = match category {
		"Scam" => ("#EF4444", "⚠️"),
		"Exchange" => ("#22C55E", "🏦"),
		"Wallet" => ("#EAB308", "👛"),
		"Drugs" => ("#A855F7", "💊"),
		"Terror" => ("#1F2937", "💣"),
		"Bridge" => ("#3B82F6", "🌉"),
		"Mixer" => ("#EC4899", "🌀"),
		"DeFi" => ("#10B981", "💰"),
		"Storage" => ("#6366F1", "🔐"),
		"Bot" => ("#F59E0B", "🤖"),
		"Ransomware" => ("#F97316", "🔒"),
		"Money Laundering" => ("#16A34A", "💸"),
		"Fraud" => ("#CA8A04", "🕵️"),
		"Terrorist Financing" => ("#B91C1C", "🏴"),
		"Sanctioned Entities" => ("#4B5563", "🚫"),
		_ => return DEFAULT_CATEGORY_STYLE,
	};
	CategoryStyle { color, icon }
}

/// A materialized vertex of the visible graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	pub address: String,
	pub category: String,
	pub risk_level: RiskLevel,
	pub icon_url: Option<String>,
	pub position: DVec2,
	pub velocity: DVec2,
	pub radius: f64,
	pub connected_node_ids: Vec<String>,
	/// Set only for nodes created by expanding `parent_id`.
	pub parent_id: Option<String>,
}

impl GraphNode {
	pub fn is_expandable(&self) -> bool {
		!self.connected_node_ids.is_empty()
	}

	pub fn style(&self) -> CategoryStyle {
		category_style(&self.category)
	}
}

/// A fund-flow between two nodes. Amount, asset and timestamp are display-only.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub source_id: String,
	pub target_id: String,
	pub amount: String,
	pub asset_label: String,
	pub timestamp: Option<String>,
	/// The node whose expansion created this edge.
	pub origin: Option<String>,
}

impl GraphEdge {
	pub fn touches(&self, id: &str) -> bool {
		self.source_id == id || self.target_id == id
	}

	pub fn label(&self) -> String {
		match (self.amount.is_empty(), self.asset_label.is_empty()) {
			(false, false) if !self.amount.ends_with(self.asset_label.as_str()) => {
				format!("{} {}", self.amount, self.asset_label)
			}
			(true, false) => self.asset_label.clone(),
			_ => self.amount.clone(),
		}
	}
}

/// Declarative node filters supplied by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeFilters {
	pub category: Option<String>,
	pub risk_level: Option<RiskLevel>,
}

impl NodeFilters {
	/// Builds filters from select-box values where `"All"` or empty means unfiltered.
	pub fn from_selects(category: &str, risk_level: &str) -> Self {
		let category = match category {
			"" | "All" => None,
			c => Some(c.to_string()),
		};
		Self {
			category,
			risk_level: RiskLevel::parse(risk_level),
		}
	}

	pub fn matches(&self, node: &GraphNode, search_query: &str) -> bool {
		if let Some(category) = &self.category {
			if &node.category != category {
				return false;
			}
		}
		if let Some(risk) = self.risk_level {
			if node.risk_level != risk {
				return false;
			}
		}
		let query = search_query.trim().to_lowercase();
		query.is_empty()
			|| node.label.to_lowercase().contains(&query)
			|| node.address.to_lowercase().contains(&query)
	}
}

/// Shortens long addresses to `0x1234…abcd`.
pub fn short_address(address: &str) -> String {
	let chars: Vec<char> = address.chars().collect();
	if chars.len() <= 12 {
		return address.to_string();
	}
	let head: String = chars[..6].iter().collect();
	let tail: String = chars[chars.len() - 4..].iter().collect();
	format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(label: &str, address: &str, category: &str, risk: RiskLevel) -> GraphNode {
		GraphNode {
			id: address.into(),
			label: label.into(),
			address: address.into(),
			category: category.into(),
			risk_level: risk,
			icon_url: None,
			position: DVec2::ZERO,
			velocity: DVec2::ZERO,
			radius: 24.0,
			connected_node_ids: vec![],
			parent_id: None,
		}
	}

	#[test]
	fn unknown_category_uses_default_style() {
		assert_eq!(category_style("Casino"), DEFAULT_CATEGORY_STYLE);
		assert_eq!(category_style("Scam").color, "#EF4444");
	}

	#[test]
	fn confidence_buckets() {
		assert_eq!(RiskLevel::from_confidence(5), RiskLevel::High);
		assert_eq!(RiskLevel::from_confidence(4), RiskLevel::High);
		assert_eq!(RiskLevel::from_confidence(2), RiskLevel::Medium);
		assert_eq!(RiskLevel::from_confidence(1), RiskLevel::Low);
	}

	#[test]
	fn filters_combine_category_risk_and_search() {
		let n = node("KyberSwap Exploiter", "0x5027a3b2", "Scam", RiskLevel::High);
		assert!(NodeFilters::default().matches(&n, ""));
		assert!(NodeFilters::from_selects("Scam", "All").matches(&n, ""));
		assert!(!NodeFilters::from_selects("Exchange", "All").matches(&n, ""));
		assert!(!NodeFilters::from_selects("All", "Low").matches(&n, ""));
		assert!(NodeFilters::default().matches(&n, "kyber"));
		assert!(NodeFilters::default().matches(&n, "0X5027"));
		assert!(!NodeFilters::default().matches(&n, "binance"));
	}

	#[test]
	fn edge_label_avoids_repeating_asset() {
		let mut edge = GraphEdge {
			id: "e".into(),
			source_id: "a".into(),
			target_id: "b".into(),
			amount: "2.5 ETH".into(),
			asset_label: "ETH".into(),
			timestamp: None,
			origin: None,
		};
		assert_eq!(edge.label(), "2.5 ETH");
		edge.amount = "2.5".into();
		assert_eq!(edge.label(), "2.5 ETH");
	}

	#[test]
	fn short_address_keeps_head_and_tail() {
		assert_eq!(short_address("0x742d35Cc6634C0532925a3b8D400E4d4d8C5c2E9"), "0x742d…c2E9");
		assert_eq!(short_address("scam-1"), "scam-1");
	}
}
