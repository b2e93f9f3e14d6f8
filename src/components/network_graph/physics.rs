//! One explicit-Euler step of the force layout.
//!
//! Forces are computed from a snapshot of positions, so the result does not
//! depend on node order. Repulsion is O(n²) over active nodes, springs O(e).

use std::collections::HashMap;

use glam::DVec2;

use super::config::PhysicsParams;
use super::types::{GraphEdge, GraphNode};

/// Advances every active node by one frame.
///
/// `active[i]` says whether `nodes[i]` takes part at all; inactive nodes keep
/// their state and exert no force. The `pinned` node (being dragged) pushes
/// and pulls the others but is not moved, and its velocity stays zero.
pub fn tick(
	nodes: &mut [GraphNode],
	edges: &[GraphEdge],
	params: &PhysicsParams,
	center: DVec2,
	active: &[bool],
	pinned: Option<&str>,
) {
	debug_assert_eq!(nodes.len(), active.len());
	let positions: Vec<DVec2> = nodes.iter().map(|n| n.position).collect();
	let mut forces = vec![DVec2::ZERO; nodes.len()];
	let live: Vec<usize> = (0..nodes.len()).filter(|&i| active[i]).collect();

	for (a, &i) in live.iter().enumerate() {
		for &j in &live[a + 1..] {
			let delta = positions[i] - positions[j];
			let distance = delta.length();
			// Coincident nodes have no direction to push along; springs and
			// centering separate them on later ticks.
			if distance <= 0.0 || distance >= params.repulsion_cutoff {
				continue;
			}
			let push = delta * (params.repulsion / (distance * distance * distance));
			forces[i] += push;
			forces[j] -= push;
		}
	}

	let index: HashMap<&str, usize> = live.iter().map(|&i| (nodes[i].id.as_str(), i)).collect();
	for edge in edges {
		let (Some(&s), Some(&t)) = (
			index.get(edge.source_id.as_str()),
			index.get(edge.target_id.as_str()),
		) else {
			continue;
		};
		let delta = positions[t] - positions[s];
		let distance = delta.length();
		if s == t || distance <= 0.0 {
			continue;
		}
		let pull = delta * ((distance - params.spring_length) * params.spring_constant / distance);
		forces[s] += pull;
		forces[t] -= pull;
	}

	for &i in &live {
		let node = &mut nodes[i];
		if pinned == Some(node.id.as_str()) {
			node.velocity = DVec2::ZERO;
			continue;
		}
		let force = (forces[i] + (center - positions[i]) * params.centering)
			.clamp_length_max(params.max_force);
		node.velocity = (node.velocity + force) * params.damping;
		node.position += node.velocity;
	}
}
