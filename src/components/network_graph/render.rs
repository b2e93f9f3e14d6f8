use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use glam::DVec2;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::config::NodeGeometry;
use super::input::Affordance;
use super::state::GraphState;
use super::types::{GraphEdge, GraphNode, short_address};

const BACKGROUND: &str = "#0A0A0A";
const EDGE_COLOR: &str = "rgba(203, 213, 225, 0.75)";
const EDGE_HIGHLIGHT: &str = "#3B82F6";
const ARROW_SIZE: f64 = 10.0;
const TOOLTIP_PADDING: f64 = 10.0;
const TOOLTIP_LINE: f64 = 16.0;

/// Straight edge between two node rims, with its arrowhead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
	pub start: DVec2,
	/// Where the line stops and the arrowhead's base begins.
	pub end: DVec2,
	pub tip: DVec2,
	pub barb_left: DVec2,
	pub barb_right: DVec2,
	pub mid: DVec2,
}

/// `None` when the nodes overlap and there is no visible line to draw.
pub fn edge_segment(source: &GraphNode, target: &GraphNode) -> Option<EdgeSegment> {
	let delta = target.position - source.position;
	let dist = delta.length();
	if dist <= source.radius + target.radius {
		return None;
	}
	let unit = delta * (1.0 / dist);
	let normal = DVec2::new(-unit.y, unit.x) * (ARROW_SIZE * 0.5);
	let start = source.position + unit * source.radius;
	let tip = target.position - unit * target.radius;
	let end = tip - unit * ARROW_SIZE;
	Some(EdgeSegment {
		start,
		end,
		tip,
		barb_left: end + normal,
		barb_right: end - normal,
		mid: (start + tip) * 0.5,
	})
}

pub fn tooltip_lines(node: &GraphNode, connections: usize) -> Vec<String> {
	let style = node.style();
	let mut lines = vec![
		node.label.clone(),
		short_address(&node.address),
		format!("{} {}", style.icon, node.category),
		format!("Risk: {}", node.risk_level),
		format!("Connections: {connections}"),
	];
	if node.is_expandable() {
		lines.push(format!("{} linked addresses", node.connected_node_ids.len()));
	}
	lines
}

/// Keeps a `size` box anchored at `anchor` inside the canvas.
pub fn place_tooltip(anchor: DVec2, size: DVec2, canvas: DVec2) -> DVec2 {
	let mut x = anchor.x;
	let mut y = anchor.y - size.y / 2.0;
	if x + size.x > canvas.x {
		x = (anchor.x - size.x - 2.0 * TOOLTIP_PADDING).max(0.0);
	}
	y = y.clamp(0.0, (canvas.y - size.y).max(0.0));
	DVec2::new(x, y)
}

/// Lazily loaded node icons keyed by URL.
#[derive(Default)]
pub struct IconCache {
	images: HashMap<String, HtmlImageElement>,
}

impl IconCache {
	/// Starts loading any icon referenced by `state` that is not cached yet.
	pub fn prefetch(&mut self, state: &GraphState) {
		for url in state.nodes.iter().filter_map(|n| n.icon_url.as_ref()) {
			if self.images.contains_key(url) {
				continue;
			}
			if let Ok(img) = HtmlImageElement::new() {
				img.set_src(url);
				self.images.insert(url.clone(), img);
			}
		}
	}

	fn ready(&self, url: &str) -> Option<&HtmlImageElement> {
		self.images
			.get(url)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

/// Draws one frame. Reads `state`, never writes it.
pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d, icons: &IconCache) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let vp = &state.viewport;
	ctx.save();
	let _ = ctx.translate(vp.pan.x, vp.pan.y);
	let _ = ctx.scale(vp.zoom, vp.zoom);

	let focus = state.hover.as_deref().or(state.selected.as_deref());
	let neighbors = focus.map(|id| state.neighbors(id)).unwrap_or_default();
	draw_edges(state, ctx, focus);
	draw_nodes(state, ctx, icons, focus, &neighbors);
	ctx.restore();

	draw_tooltip(state, ctx);
}

fn draw_edges(state: &GraphState, ctx: &CanvasRenderingContext2d, focus: Option<&str>) {
	let by_id: HashMap<&str, &GraphNode> =
		state.visible_nodes().map(|n| (n.id.as_str(), n)).collect();

	for edge in state.visible_edges() {
		let (Some(source), Some(target)) = (
			by_id.get(edge.source_id.as_str()),
			by_id.get(edge.target_id.as_str()),
		) else {
			continue;
		};
		let Some(seg) = edge_segment(source, target) else {
			continue;
		};
		let highlighted = focus.is_some_and(|id| edge.touches(id));
		let is_child_edge = edge.origin.is_some();
		let color = if highlighted { EDGE_HIGHLIGHT } else { EDGE_COLOR };

		ctx.set_stroke_style_str(color);
		ctx.set_line_width(match (highlighted, is_child_edge) {
			(true, _) => 4.0,
			(false, true) => 2.0,
			(false, false) => 3.0,
		});
		let dash = if is_child_edge {
			js_sys::Array::of2(&JsValue::from_f64(8.0), &JsValue::from_f64(4.0))
		} else {
			js_sys::Array::new()
		};
		let _ = ctx.set_line_dash(&dash);
		ctx.begin_path();
		ctx.move_to(seg.start.x, seg.start.y);
		ctx.line_to(seg.end.x, seg.end.y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(color);
		ctx.begin_path();
		ctx.move_to(seg.tip.x, seg.tip.y);
		ctx.line_to(seg.barb_left.x, seg.barb_left.y);
		ctx.line_to(seg.barb_right.x, seg.barb_right.y);
		ctx.close_path();
		ctx.fill();

		draw_edge_label(ctx, edge, seg.mid);
	}
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, edge: &GraphEdge, mid: DVec2) {
	let text = edge.label();
	if text.is_empty() {
		return;
	}
	ctx.set_font("600 11px sans-serif");
	let width = ctx
		.measure_text(&text)
		.map(|m| m.width())
		.unwrap_or(text.len() as f64 * 6.0);
	ctx.set_fill_style_str("rgba(38, 38, 38, 0.95)");
	ctx.fill_rect(mid.x - width / 2.0 - 6.0, mid.y - 9.0, width + 12.0, 18.0);
	ctx.set_fill_style_str("#F3F3F3");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&text, mid.x, mid.y);
}

fn draw_nodes(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	icons: &IconCache,
	focus: Option<&str>,
	neighbors: &HashSet<&str>,
) {
	let geometry = &state.config.geometry;
	for node in state.visible_nodes() {
		let (x, y, r) = (node.position.x, node.position.y, node.radius);
		let style = node.style();
		let is_hovered = state.hover.as_deref() == Some(node.id.as_str());
		let is_selected = state.selected.as_deref() == Some(node.id.as_str());
		let dimmed = focus.is_some_and(|f| f != node.id && !neighbors.contains(node.id.as_str()));

		ctx.set_global_alpha(if dimmed { 0.35 } else { 1.0 });

		if is_hovered || is_selected {
			ctx.set_shadow_color(style.color);
			ctx.set_shadow_blur(20.0);
		}
		ctx.begin_path();
		let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.color);
		ctx.fill();
		ctx.set_shadow_blur(0.0);

		match node.icon_url.as_deref().and_then(|url| icons.ready(url)) {
			Some(img) => {
				let side = r * 1.2;
				let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
					img,
					x - side / 2.0,
					y - side / 2.0,
					side,
					side,
				);
			}
			None => {
				ctx.set_font(&format!("{}px sans-serif", (r * 0.9).round()));
				ctx.set_text_align("center");
				ctx.set_text_baseline("middle");
				let _ = ctx.fill_text(style.icon, x, y);
			}
		}

		// Risk ring
		ctx.begin_path();
		let _ = ctx.arc(x, y, r + 3.0, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(node.risk_level.color());
		ctx.set_line_width(3.0);
		ctx.stroke();

		if is_selected {
			ctx.begin_path();
			let _ = ctx.arc(x, y, r + 8.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("#FFFFFF");
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		if node.is_expandable() && node.parent_id.is_none() {
			let (bx, by) = (x - r * 0.75, y + r * 0.75);
			ctx.begin_path();
			let _ = ctx.arc(bx, by, 8.0, 0.0, 2.0 * PI);
			ctx.set_fill_style_str("#3B82F6");
			ctx.fill();
			ctx.set_fill_style_str("#FFFFFF");
			ctx.set_font("bold 10px sans-serif");
			let _ = ctx.fill_text(&node.connected_node_ids.len().to_string(), bx, by);
		}

		ctx.set_fill_style_str("#F3F3F3");
		ctx.set_font("600 12px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("bottom");
		let _ = ctx.fill_text(&node.label, x, y - r - 8.0);

		let emphasis = if is_hovered || is_selected { 1.0 } else { 0.55 };
		ctx.set_global_alpha(if dimmed { 0.35 * emphasis } else { emphasis });
		for kind in Affordance::PRIORITY {
			if kind.offered_by(node) {
				draw_affordance(ctx, kind, node, state.is_expanded(&node.id), geometry);
			}
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_affordance(
	ctx: &CanvasRenderingContext2d,
	kind: Affordance,
	node: &GraphNode,
	expanded: bool,
	geometry: &NodeGeometry,
) {
	let c = kind.center(node, geometry);
	let (fill, glyph) = match kind {
		Affordance::Expand if expanded => ("#3B82F6", "−"),
		Affordance::Expand => ("#6B7280", "+"),
		Affordance::Details => ("#22C55E", "👁"),
		Affordance::ExternalLink => ("#8B5CF6", "↗"),
	};
	ctx.begin_path();
	let _ = ctx.arc(c.x, c.y, kind.radius(geometry), 0.0, 2.0 * PI);
	ctx.set_fill_style_str(fill);
	ctx.fill();
	ctx.set_fill_style_str("#FFFFFF");
	ctx.set_font("bold 12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(glyph, c.x, c.y);
}

fn draw_tooltip(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	let Some(node) = state
		.hover
		.as_deref()
		.and_then(|id| state.node(id))
		.filter(|n| state.is_visible(n))
	else {
		return;
	};
	let lines = tooltip_lines(node, state.neighbors(&node.id).len());

	ctx.set_font("12px sans-serif");
	let text_width = lines
		.iter()
		.filter_map(|l| ctx.measure_text(l).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);
	let size = DVec2::new(
		text_width + 2.0 * TOOLTIP_PADDING,
		lines.len() as f64 * TOOLTIP_LINE + 2.0 * TOOLTIP_PADDING,
	);
	let screen = state.viewport.world_to_screen(node.position);
	let anchor = screen + DVec2::new(node.radius * state.viewport.zoom + 12.0, 0.0);
	let at = place_tooltip(anchor, size, DVec2::new(state.width, state.height));

	ctx.set_fill_style_str("rgba(26, 26, 26, 0.95)");
	ctx.fill_rect(at.x, at.y, size.x, size.y);
	ctx.set_stroke_style_str(node.style().color);
	ctx.set_line_width(1.0);
	ctx.stroke_rect(at.x, at.y, size.x, size.y);

	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	for (i, line) in lines.iter().enumerate() {
		let color = match i {
			0 => "#FFFFFF",
			3 => node.risk_level.color(),
			_ => "#D1D5DB",
		};
		ctx.set_fill_style_str(color);
		ctx.set_font(if i == 0 { "bold 13px sans-serif" } else { "12px sans-serif" });
		let _ = ctx.fill_text(
			line,
			at.x + TOOLTIP_PADDING,
			at.y + TOOLTIP_PADDING + i as f64 * TOOLTIP_LINE,
		);
	}
}
