//! Pointer handling: hit-testing in world space and the drag/pan/click router.
//!
//! Hit-testing is a linear scan over visible nodes, newest first, so the most
//! recently materialized node wins where nodes overlap.

use glam::DVec2;
use log::debug;

use super::config::NodeGeometry;
use super::state::{DragState, GraphState, PanState};
use super::types::GraphNode;

/// Screen-space travel after which a press counts as a drag rather than a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Wheel zoom factor per notch.
const WHEEL_ZOOM: f64 = 1.1;

/// Small circular buttons drawn around a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affordance {
	/// Right of the node: toggles its expansion.
	Expand,
	/// Left of the node: opens the detail view.
	Details,
	/// Below the node: opens the address in a block explorer.
	ExternalLink,
}

impl Affordance {
	/// Click resolution order.
	pub const PRIORITY: [Affordance; 3] =
		[Affordance::Expand, Affordance::Details, Affordance::ExternalLink];

	pub fn center(self, node: &GraphNode, geometry: &NodeGeometry) -> DVec2 {
		let reach = node.radius + geometry.affordance_offset;
		let p = node.position;
		match self {
			Affordance::Expand => DVec2::new(p.x + reach, p.y),
			Affordance::Details => DVec2::new(p.x - reach, p.y),
			Affordance::ExternalLink => DVec2::new(p.x, p.y + reach),
		}
	}

	pub fn radius(self, geometry: &NodeGeometry) -> f64 {
		match self {
			Affordance::Expand | Affordance::Details => geometry.button_radius,
			Affordance::ExternalLink => geometry.link_radius,
		}
	}

	/// Leaves have no expand button; every node has the other two.
	pub fn offered_by(self, node: &GraphNode) -> bool {
		match self {
			Affordance::Expand => node.is_expandable(),
			Affordance::Details | Affordance::ExternalLink => true,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickTarget {
	Affordance(Affordance, String),
	Body(String),
}

/// What a click means to the host.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	Select(GraphNode),
	OpenExternal(GraphNode),
	ExpansionChanged { id: String, expanded: bool },
}

impl GraphState {
	/// The visible node whose body covers `screen`, if any.
	pub fn node_at(&self, screen: DVec2) -> Option<&GraphNode> {
		let world = self.viewport.screen_to_world(screen);
		self.visible_nodes()
			.rev()
			.find(|n| n.position.distance(world) <= n.radius)
	}

	/// Resolves a click to exactly one target: affordances first, then bodies.
	pub fn resolve_click(&self, screen: DVec2) -> Option<ClickTarget> {
		let world = self.viewport.screen_to_world(screen);
		let geometry = &self.config.geometry;
		for kind in Affordance::PRIORITY {
			let hit = self.visible_nodes().rev().find(|n| {
				kind.offered_by(n) && kind.center(n, geometry).distance(world) <= kind.radius(geometry)
			});
			if let Some(node) = hit {
				return Some(ClickTarget::Affordance(kind, node.id.clone()));
			}
		}
		self.node_at(screen).map(|n| ClickTarget::Body(n.id.clone()))
	}

	/// Starts dragging (and selects) the node under the pointer, or starts panning.
	pub fn pointer_down(&mut self, screen: DVec2) -> bool {
		let hit = self.node_at(screen).map(|n| n.id.clone());
		self.drag = DragState {
			node_id: hit.clone(),
			press: screen,
			moved: false,
		};
		match hit {
			Some(id) => {
				if let Some(node) = self.node_mut(&id) {
					node.velocity = DVec2::ZERO;
				}
				self.selected = Some(id);
				true
			}
			None => {
				self.pan = PanState {
					active: true,
					last: screen,
				};
				false
			}
		}
	}

	pub fn pointer_move(&mut self, screen: DVec2) {
		let pressed = self.drag.node_id.is_some() || self.pan.active;
		if pressed && screen.distance(self.drag.press) > CLICK_SLOP {
			self.drag.moved = true;
		}

		if let Some(id) = self.drag.node_id.clone() {
			let world = self.viewport.screen_to_world(screen);
			if let Some(node) = self.node_mut(&id) {
				node.position = world;
				node.velocity = DVec2::ZERO;
			}
		} else if self.pan.active {
			self.viewport.pan_by(screen - self.pan.last);
			self.pan.last = screen;
		} else {
			self.hover = self.node_at(screen).map(|n| n.id.clone());
		}
	}

	pub fn pointer_up(&mut self) {
		self.drag.node_id = None;
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.hover = None;
	}

	/// Applies a click. Clicks ending a drag or pan are swallowed.
	pub fn click(&mut self, screen: DVec2) -> Option<GraphEvent> {
		if std::mem::take(&mut self.drag.moved) {
			return None;
		}
		match self.resolve_click(screen)? {
			ClickTarget::Affordance(Affordance::Expand, id) => {
				let expanded = self.toggle_expansion(&id);
				debug!("expansion of {} now {}", id, expanded);
				Some(GraphEvent::ExpansionChanged { id, expanded })
			}
			ClickTarget::Affordance(Affordance::ExternalLink, id) => {
				self.node(&id).cloned().map(GraphEvent::OpenExternal)
			}
			ClickTarget::Affordance(Affordance::Details, id) | ClickTarget::Body(id) => {
				self.selected = Some(id.clone());
				self.node(&id).cloned().map(GraphEvent::Select)
			}
		}
	}

	/// Zooms around the pointer; positive `delta_y` zooms out.
	pub fn wheel(&mut self, screen: DVec2, delta_y: f64) {
		let factor = if delta_y > 0.0 { 1.0 / WHEEL_ZOOM } else { WHEEL_ZOOM };
		self.viewport.zoom_at(screen, factor);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::payload::{GraphPayload, fallback_graph};
	use crate::components::network_graph::state::tests::{record, state_with};
	use crate::components::network_graph::types::NodeFilters;

	fn two_nodes() -> GraphState {
		state_with(GraphPayload {
			nodes: vec![
				record("A", "Scam", &["B", "C"], Some(DVec2::new(100.0, 100.0))),
				record("D", "Wallet", &[], Some(DVec2::new(500.0, 300.0))),
			],
			..Default::default()
		})
	}

	#[test]
	fn node_centers_hit_under_any_zoom_and_pan() {
		let mut state = state_with(fallback_graph());
		for zoom in [0.3, 1.0, 3.0] {
			for pan in [DVec2::ZERO, DVec2::new(500.0, -200.0)] {
				state.viewport.set_zoom(zoom);
				state.viewport.pan = pan;
				for node in state.nodes.clone() {
					let screen = state.viewport.world_to_screen(node.position);
					assert_eq!(
						state.node_at(screen).map(|n| n.id.as_str()),
						Some(node.id.as_str()),
						"zoom {zoom} pan {pan:?}"
					);
					assert!(state.pointer_down(screen));
					assert_eq!(state.drag.node_id.as_deref(), Some(node.id.as_str()));
					assert_eq!(state.selected.as_deref(), Some(node.id.as_str()));
					state.pointer_up();
				}
			}
		}
	}

	#[test]
	fn later_nodes_win_on_overlap() {
		let state = state_with(GraphPayload {
			nodes: vec![
				record("first", "Wallet", &[], Some(DVec2::new(100.0, 100.0))),
				record("second", "Wallet", &[], Some(DVec2::new(110.0, 100.0))),
			],
			..Default::default()
		});
		assert_eq!(state.node_at(DVec2::new(105.0, 100.0)).unwrap().id, "second");
		assert_eq!(state.node_at(DVec2::new(80.0, 100.0)).unwrap().id, "first");
	}

	#[test]
	fn filtered_nodes_cannot_be_hit() {
		let mut state = two_nodes();
		state.set_filters(NodeFilters::from_selects("Wallet", "All"), String::new());
		assert!(state.node_at(DVec2::new(100.0, 100.0)).is_none());
		assert!(state.resolve_click(DVec2::new(100.0 + 24.0 + 15.0, 100.0)).is_none());
		assert!(state.node_at(DVec2::new(500.0, 300.0)).is_some());
	}

	#[test]
	fn drag_pins_node_to_pointer_while_paused() {
		let mut state = two_nodes();
		state.set_animating(false);
		let other_before = state.node("D").unwrap().position;

		assert!(state.pointer_down(DVec2::new(100.0, 100.0)));
		state.pointer_move(DVec2::new(200.0, 80.0));
		state.tick();
		state.pointer_move(DVec2::new(300.0, 50.0));
		state.pointer_up();
		state.tick();

		let a = state.node("A").unwrap();
		assert_eq!(a.position, DVec2::new(300.0, 50.0));
		assert_eq!(a.velocity, DVec2::ZERO);
		assert_eq!(state.node("D").unwrap().position, other_before);
	}

	#[test]
	fn drag_wins_over_running_simulation() {
		let mut state = two_nodes();
		state.viewport.set_zoom(2.0);
		state.viewport.pan = DVec2::new(-40.0, 25.0);
		let press = state.viewport.world_to_screen(DVec2::new(100.0, 100.0));
		state.pointer_down(press);
		let target = state.viewport.world_to_screen(DVec2::new(250.0, 250.0));
		state.pointer_move(target);
		for _ in 0..5 {
			state.tick();
		}
		let a = state.node("A").unwrap();
		assert!(a.position.distance(DVec2::new(250.0, 250.0)) < 1e-9);
		assert_eq!(a.velocity, DVec2::ZERO);
	}

	#[test]
	fn click_after_drag_is_swallowed() {
		let mut state = two_nodes();
		state.pointer_down(DVec2::new(100.0, 100.0));
		state.pointer_move(DVec2::new(160.0, 100.0));
		state.pointer_up();
		assert_eq!(state.click(DVec2::new(160.0, 100.0)), None);
		// The next click is a real one.
		assert!(matches!(
			state.click(DVec2::new(160.0, 100.0)),
			Some(GraphEvent::Select(n)) if n.id == "A"
		));
	}

	#[test]
	fn background_drag_pans() {
		let mut state = two_nodes();
		assert!(!state.pointer_down(DVec2::new(700.0, 50.0)));
		state.pointer_move(DVec2::new(720.0, 80.0));
		state.pointer_up();
		assert_eq!(state.viewport.pan, DVec2::new(20.0, 30.0));
		assert_eq!(state.click(DVec2::new(720.0, 80.0)), None);
	}

	#[test]
	fn affordances_resolve_in_priority_order() {
		let mut state = two_nodes();
		let geometry = state.config.geometry.clone();
		let a = state.node("A").unwrap().clone();
		let at = |kind: Affordance| kind.center(&a, &geometry);

		assert_eq!(
			state.resolve_click(at(Affordance::Details)),
			Some(ClickTarget::Affordance(Affordance::Details, "A".into()))
		);
		assert!(matches!(
			state.click(at(Affordance::ExternalLink)),
			Some(GraphEvent::OpenExternal(n)) if n.id == "A"
		));
		assert!(matches!(
			state.click(at(Affordance::Details)),
			Some(GraphEvent::Select(n)) if n.id == "A"
		));
		assert_eq!(
			state.click(at(Affordance::Expand)),
			Some(GraphEvent::ExpansionChanged {
				id: "A".into(),
				expanded: true
			})
		);
		assert_eq!(state.nodes.len(), 4);
		assert_eq!(
			state.click(at(Affordance::Expand)),
			Some(GraphEvent::ExpansionChanged {
				id: "A".into(),
				expanded: false
			})
		);
		assert_eq!(state.nodes.len(), 2);
	}

	#[test]
	fn leaves_offer_no_expand_button() {
		let state = two_nodes();
		let d = state.node("D").unwrap();
		let spot = Affordance::Expand.center(d, &state.config.geometry);
		assert_eq!(state.resolve_click(spot), None);
	}

	#[test]
	fn body_click_selects_and_empty_click_does_nothing() {
		let mut state = two_nodes();
		assert!(matches!(
			state.click(DVec2::new(505.0, 300.0)),
			Some(GraphEvent::Select(n)) if n.id == "D"
		));
		assert_eq!(state.selected.as_deref(), Some("D"));
		assert_eq!(state.click(DVec2::new(300.0, 500.0)), None);
	}

	#[test]
	fn hover_tracks_pointer_when_idle() {
		let mut state = two_nodes();
		state.pointer_move(DVec2::new(100.0, 110.0));
		assert_eq!(state.hover.as_deref(), Some("A"));
		state.pointer_move(DVec2::new(300.0, 300.0));
		assert_eq!(state.hover, None);
		state.pointer_move(DVec2::new(500.0, 300.0));
		state.pointer_leave();
		assert_eq!(state.hover, None);
	}

	#[test]
	fn wheel_zoom_respects_bounds() {
		let mut state = two_nodes();
		for _ in 0..100 {
			state.wheel(DVec2::new(400.0, 300.0), -1.0);
		}
		assert_eq!(state.viewport.zoom, 3.0);
		for _ in 0..100 {
			state.wheel(DVec2::new(400.0, 300.0), 1.0);
		}
		assert_eq!(state.viewport.zoom, 0.3);
	}
}
