use std::collections::HashSet;
use std::f64::consts::PI;

use glam::DVec2;
use log::debug;

use super::payload::NodeRecord;
use super::state::{DragState, GraphState, node_from_record};
use super::types::GraphEdge;

impl GraphState {
	pub fn is_expanded(&self, id: &str) -> bool {
		self.expanded.contains(id)
	}

	/// Materializes the neighbourhood of `id` on a ring around it.
	///
	/// Returns `false` without touching anything when the node is unknown,
	/// already expanded, or has nothing to expand into.
	pub fn expand(&mut self, id: &str) -> bool {
		if self.expanded.contains(id) {
			return false;
		}
		let Some(parent) = self.node(id) else {
			return false;
		};
		if !parent.is_expandable() {
			return false;
		}

		let connected = parent.connected_node_ids.clone();
		let (origin, category, risk) = (parent.position, parent.category.clone(), parent.risk_level);
		let geometry = self.config.geometry.clone();
		let count = connected.len() as f64;
		let mut added = 0;

		for (index, child_id) in connected.iter().enumerate() {
			if child_id == id {
				continue;
			}
			if self.node(child_id).is_none() {
				let angle = 2.0 * PI * index as f64 / count;
				let position =
					origin + DVec2::new(angle.cos(), angle.sin()) * geometry.expansion_radius;
				let placeholder;
				let record = match self.catalogue.get(child_id) {
					Some(record) => record,
					None => {
						placeholder = NodeRecord {
							category: Some(category.clone()),
							risk_level: Some(risk),
							..Default::default()
						};
						&placeholder
					}
				};
				let child = node_from_record(
					record,
					child_id,
					position,
					geometry.child_radius,
					Some(id.to_string()),
				);
				self.nodes.push(child);
				added += 1;
			}
			let linked = self.edges.iter().any(|e| {
				e.origin.as_deref() == Some(id) && e.source_id == id && &e.target_id == child_id
			});
			if !linked {
				self.edge_serial += 1;
				self.edges.push(GraphEdge {
					id: format!("expansion-{}", self.edge_serial),
					source_id: id.to_string(),
					target_id: child_id.clone(),
					amount: String::new(),
					asset_label: String::new(),
					timestamp: None,
					origin: Some(id.to_string()),
				});
			}
		}

		self.expanded.insert(id.to_string());
		debug!("expanded {} into {} new nodes", id, added);
		true
	}

	/// Removes everything the expansion of `id` introduced, recursively.
	pub fn collapse(&mut self, id: &str) -> bool {
		if !self.expanded.remove(id) {
			return false;
		}

		let mut removed: HashSet<String> = HashSet::new();
		let mut pending = vec![id.to_string()];
		while let Some(parent) = pending.pop() {
			for node in &self.nodes {
				if node.parent_id.as_deref() == Some(parent.as_str()) && removed.insert(node.id.clone())
				{
					pending.push(node.id.clone());
				}
			}
		}
		for gone in &removed {
			self.expanded.remove(gone);
		}

		self.nodes.retain(|n| !removed.contains(&n.id));
		// Payload edges stay; visibility hides them while an endpoint is gone.
		self.edges.retain(|e| {
			!e.origin
				.as_deref()
				.is_some_and(|o| o == id || removed.contains(o))
		});

		let stale = |slot: &Option<String>| slot.as_ref().is_some_and(|s| removed.contains(s));
		if stale(&self.hover) {
			self.hover = None;
		}
		if stale(&self.selected) {
			self.selected = None;
		}
		if stale(&self.drag.node_id) {
			self.drag = DragState::default();
		}

		debug!("collapsed {}, removed {} nodes", id, removed.len());
		true
	}

	/// Expands a collapsed node or collapses an expanded one; returns the new state.
	pub fn toggle_expansion(&mut self, id: &str) -> bool {
		if self.is_expanded(id) {
			self.collapse(id);
			false
		} else {
			self.expand(id)
		}
	}
}

#[cfg(test)]
mod tests {
	use glam::DVec2;

	use crate::components::network_graph::payload::{GraphPayload, fallback_graph};
	use crate::components::network_graph::state::GraphState;
	use crate::components::network_graph::state::tests::{edge_record, record, state_with};

	fn snapshot(state: &GraphState) -> (Vec<String>, Vec<String>) {
		(
			state.nodes.iter().map(|n| n.id.clone()).collect(),
			state.edges.iter().map(|e| e.id.clone()).collect(),
		)
	}

	fn abc() -> GraphState {
		state_with(GraphPayload {
			nodes: vec![record("A", "Scam", &["B", "C"], Some(DVec2::new(100.0, 100.0)))],
			..Default::default()
		})
	}

	#[test]
	fn expanding_places_children_on_a_ring() {
		let mut state = abc();
		let radius = state.config.geometry.expansion_radius;
		assert!(state.expand("A"));

		assert_eq!(state.nodes.len(), 3);
		let a = state.node("A").unwrap().position;
		let b = state.node("B").unwrap();
		let c = state.node("C").unwrap();
		assert_eq!(b.parent_id.as_deref(), Some("A"));
		assert_eq!(b.radius, state.config.geometry.child_radius);
		assert!((b.position.distance(a) - radius).abs() < 1e-9);
		assert!((c.position.distance(a) - radius).abs() < 1e-9);
		// 180 degrees apart: diametrically opposite through A.
		assert!((b.position.distance(c.position) - 2.0 * radius).abs() < 1e-9);

		let edges: Vec<(&str, &str)> = state
			.edges
			.iter()
			.map(|e| (e.source_id.as_str(), e.target_id.as_str()))
			.collect();
		assert_eq!(edges, vec![("A", "B"), ("A", "C")]);

		assert!(state.collapse("A"));
		assert_eq!(snapshot(&state), (vec!["A".to_string()], vec![]));
	}

	#[test]
	fn expand_is_idempotent() {
		let mut once = abc();
		once.expand("A");
		let mut twice = abc();
		twice.expand("A");
		assert!(!twice.expand("A"));
		assert_eq!(snapshot(&once), snapshot(&twice));
	}

	#[test]
	fn collapse_restores_pre_expansion_sets() {
		let mut state = state_with(fallback_graph());
		let before = snapshot(&state);
		assert!(state.expand("scam-1"));
		assert_eq!(state.nodes.len(), before.0.len() + 3);
		assert!(state.collapse("scam-1"));
		assert_eq!(snapshot(&state), before);
	}

	#[test]
	fn wrong_state_requests_are_no_ops() {
		let mut state = abc();
		assert!(!state.collapse("A"));
		assert!(!state.expand("missing"));
		state.expand("A");
		assert!(!state.expand("B"), "leaf has nothing to expand into");
		assert!(!state.collapse("B"));
	}

	#[test]
	fn catalogue_records_supply_child_details() {
		let mut state = state_with(fallback_graph());
		state.expand("scam-1");
		let child = state.node("scam-1-child-1").unwrap();
		assert_eq!(child.label, "Tornado Cash");
		assert_eq!(child.category, "Mixer");
	}

	#[test]
	fn unknown_children_inherit_parent_tags() {
		let mut state = abc();
		state.expand("A");
		let b = state.node("B").unwrap();
		assert_eq!(b.category, "Scam");
		assert_eq!(b.label, "B");
	}

	#[test]
	fn collapse_removes_nested_expansions() {
		let mut payload = GraphPayload {
			nodes: vec![record("root", "Wallet", &["mid"], Some(DVec2::new(400.0, 300.0)))],
			..Default::default()
		};
		payload.child_nodes = vec![record("mid", "Mixer", &["leaf1", "leaf2"], None)];
		let mut state = state_with(payload);
		let before = snapshot(&state);

		state.expand("root");
		assert!(state.expand("mid"));
		assert_eq!(state.nodes.len(), 4);
		state.selected = Some("leaf2".into());

		assert!(state.collapse("root"));
		assert_eq!(snapshot(&state), before);
		assert!(!state.is_expanded("mid"));
		assert!(state.selected.is_none());
	}

	#[test]
	fn existing_nodes_are_linked_not_duplicated() {
		let mut state = state_with(GraphPayload {
			nodes: vec![
				record("A", "Scam", &["B"], None),
				record("B", "Wallet", &[], None),
			],
			edges: vec![edge_record("base", "B", "A")],
			..Default::default()
		});
		let before = snapshot(&state);
		state.expand("A");
		assert_eq!(state.nodes.len(), 2);
		assert_eq!(state.edges.len(), 2);
		state.collapse("A");
		assert_eq!(snapshot(&state), before);
	}

	#[test]
	fn re_expansion_starts_from_a_fresh_ring() {
		let mut state = abc();
		state.expand("A");
		let fresh = state.node("B").unwrap().position;
		state.node_mut("B").unwrap().position = DVec2::new(-500.0, -500.0);
		state.collapse("A");
		assert!(state.toggle_expansion("A"));
		assert_eq!(state.node("B").unwrap().position, fresh);
		assert!(!state.toggle_expansion("A"));
		assert_eq!(state.nodes.len(), 1);
	}

	#[test]
	fn payload_edges_to_catalogue_children_survive_collapse() {
		let mut payload = GraphPayload {
			nodes: vec![
				record("A", "Scam", &["B"], Some(DVec2::new(100.0, 100.0))),
				record("X", "Wallet", &[], Some(DVec2::new(400.0, 100.0))),
			],
			edges: vec![edge_record("x-to-b", "X", "B")],
			..Default::default()
		};
		payload.child_nodes = vec![record("B", "Mixer", &[], None)];
		let mut state = state_with(payload);
		let visible = |state: &GraphState| -> Vec<String> {
			state.visible_edges().iter().map(|e| e.id.clone()).collect()
		};
		assert!(visible(&state).is_empty());

		state.expand("A");
		let first = visible(&state);
		assert!(first.contains(&"x-to-b".to_string()));
		assert_eq!(first.len(), 2);

		state.collapse("A");
		assert!(visible(&state).is_empty());
		assert!(state.edges.iter().any(|e| e.id == "x-to-b"));

		state.expand("A");
		assert_eq!(visible(&state).len(), 2);
		assert!(visible(&state).contains(&"x-to-b".to_string()));
	}

	#[test]
	fn hyphenated_ids_still_get_their_own_spring_edge() {
		let mut state = state_with(GraphPayload {
			nodes: vec![
				record("a", "Scam", &["b-c"], Some(DVec2::new(100.0, 100.0))),
				record("a-b", "Wallet", &["c"], Some(DVec2::new(400.0, 100.0))),
			],
			..Default::default()
		});
		state.expand("a-b");
		state.expand("a");

		let mut pairs: Vec<(&str, &str)> = state
			.edges
			.iter()
			.map(|e| (e.source_id.as_str(), e.target_id.as_str()))
			.collect();
		pairs.sort();
		assert_eq!(pairs, vec![("a", "b-c"), ("a-b", "c")]);
		let ids: std::collections::HashSet<&str> = state.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids.len(), 2);
	}
}
