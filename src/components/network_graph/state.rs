use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use glam::DVec2;
use log::{info, warn};

use super::config::EngineConfig;
use super::payload::{GraphPayload, NodeRecord};
use super::physics;
use super::types::{GraphEdge, GraphNode, NodeFilters, short_address};
use super::viewport::Viewport;

/// Radius of the ring base nodes start on when the payload has no positions.
const SEED_RING_RADIUS: f64 = 150.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_id: Option<String>,
	/// Screen position of the pointer-down that started the gesture.
	pub press: DVec2,
	/// Set once the pointer strays far enough for the gesture to stop being a click.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last: DVec2,
}

/// Everything the engine knows about the current view. Owned by the canvas
/// component and handed by reference to physics, input and rendering.
pub struct GraphState {
	pub config: EngineConfig,
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	/// Detail records for ids that only appear in `connected_node_ids`.
	pub(super) catalogue: HashMap<String, NodeRecord>,
	pub(super) expanded: HashSet<String>,
	/// Numbers the edges created by expansion.
	pub(super) edge_serial: u64,
	pub filters: NodeFilters,
	pub search_query: String,
	pub viewport: Viewport,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<String>,
	pub selected: Option<String>,
	pub width: f64,
	pub height: f64,
	pub animating: bool,
	pub frame: u64,
}

impl GraphState {
	pub fn new(config: EngineConfig, width: f64, height: f64) -> Self {
		let viewport = Viewport::new(config.viewport.clone());
		Self {
			config,
			nodes: Vec::new(),
			edges: Vec::new(),
			catalogue: HashMap::new(),
			expanded: HashSet::new(),
			edge_serial: 0,
			filters: NodeFilters::default(),
			search_query: String::new(),
			viewport,
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			selected: None,
			width,
			height,
			animating: true,
			frame: 0,
		}
	}

	/// Replaces the whole graph, dropping every expansion and interaction.
	pub fn load_payload(&mut self, payload: GraphPayload) {
		self.nodes.clear();
		self.edges.clear();
		self.expanded.clear();
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = None;
		self.selected = None;

		let center = self.center();
		let count = payload.nodes.len().max(1) as f64;
		let mut seen = HashSet::new();
		for (i, record) in payload.nodes.iter().enumerate() {
			let Some(id) = record.key() else {
				warn!("skipping graph node without id or address");
				continue;
			};
			if !seen.insert(id.to_string()) {
				warn!("skipping duplicate graph node {}", id);
				continue;
			}
			let angle = i as f64 * 2.0 * PI / count;
			let position = record.position.unwrap_or_else(|| {
				center + DVec2::new(angle.cos(), angle.sin()) * SEED_RING_RADIUS
			});
			let radius = self.config.geometry.root_radius;
			self.nodes.push(node_from_record(record, id, position, radius, None));
		}

		self.edges = payload
			.edges
			.iter()
			.enumerate()
			.map(|(i, e)| GraphEdge {
				id: e.resolved_id(i),
				source_id: e.source_id.clone(),
				target_id: e.target_id.clone(),
				amount: e.amount.clone(),
				asset_label: e.asset_label.clone().unwrap_or_default(),
				timestamp: e.timestamp.clone(),
				origin: None,
			})
			.collect();

		self.catalogue = payload
			.child_nodes
			.into_iter()
			.filter_map(|r| r.key().map(str::to_string).map(|k| (k, r)))
			.collect();

		info!(
			"graph seeded with {} nodes, {} edges, {} expandable records",
			self.nodes.len(),
			self.edges.len(),
			self.catalogue.len()
		);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn center(&self) -> DVec2 {
		DVec2::new(self.width / 2.0, self.height / 2.0)
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn set_filters(&mut self, filters: NodeFilters, search_query: String) {
		self.filters = filters;
		self.search_query = search_query;
		if self.is_hidden(self.hover.as_deref()) {
			self.hover = None;
		}
		if self.is_hidden(self.selected.as_deref()) {
			self.selected = None;
		}
		if self.is_hidden(self.drag.node_id.as_deref()) {
			self.drag = DragState::default();
		}
	}

	fn is_hidden(&self, id: Option<&str>) -> bool {
		id.and_then(|id| self.node(id))
			.is_some_and(|n| !self.is_visible(n))
	}

	pub fn is_visible(&self, node: &GraphNode) -> bool {
		self.filters.matches(node, &self.search_query)
	}

	/// Nodes passing the filters, in materialization order.
	pub fn visible_nodes(&self) -> impl DoubleEndedIterator<Item = &GraphNode> {
		self.nodes.iter().filter(|n| self.is_visible(n))
	}

	pub fn visible_ids(&self) -> HashSet<&str> {
		self.visible_nodes().map(|n| n.id.as_str()).collect()
	}

	/// Edges whose endpoints are both visible; dangling edges are simply absent.
	pub fn visible_edges(&self) -> Vec<&GraphEdge> {
		let ids = self.visible_ids();
		self.edges
			.iter()
			.filter(|e| ids.contains(e.source_id.as_str()) && ids.contains(e.target_id.as_str()))
			.collect()
	}

	/// Visible nodes sharing a visible edge with `id`.
	pub fn neighbors(&self, id: &str) -> HashSet<&str> {
		self.visible_edges()
			.into_iter()
			.filter_map(|e| {
				if e.source_id == id {
					Some(e.target_id.as_str())
				} else if e.target_id == id {
					Some(e.source_id.as_str())
				} else {
					None
				}
			})
			.collect()
	}

	pub fn set_animating(&mut self, animating: bool) {
		self.animating = animating;
	}

	pub fn toggle_animation(&mut self) -> bool {
		self.animating = !self.animating;
		self.animating
	}

	/// One simulation step over the visible graph; a no-op while paused.
	pub fn tick(&mut self) {
		self.frame = self.frame.wrapping_add(1);
		if !self.animating {
			return;
		}
		let active: Vec<bool> = self.nodes.iter().map(|n| self.is_visible(n)).collect();
		let center = self.center();
		physics::tick(
			&mut self.nodes,
			&self.edges,
			&self.config.physics,
			center,
			&active,
			self.drag.node_id.as_deref(),
		);
	}
}

pub(super) fn node_from_record(
	record: &NodeRecord,
	id: &str,
	position: DVec2,
	radius: f64,
	parent_id: Option<String>,
) -> GraphNode {
	let address = record.address.clone().unwrap_or_else(|| id.to_string());
	GraphNode {
		id: id.to_string(),
		label: record.label.clone().unwrap_or_else(|| short_address(&address)),
		category: record.resolved_category(),
		risk_level: record.resolved_risk(),
		icon_url: record.icon_url.clone(),
		address,
		position,
		velocity: DVec2::ZERO,
		radius,
		connected_node_ids: record.connected_node_ids.clone(),
		parent_id,
	}
}
