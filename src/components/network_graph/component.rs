use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use glam::DVec2;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::EngineConfig;
use super::fetch::load_graph;
use super::input::GraphEvent;
use super::payload::fallback_graph;
use super::render::{self, IconCache};
use super::scheduler::{AnimationFrameLoop, FrameScheduler};
use super::state::GraphState;
use super::types::{GraphNode, NodeFilters};

/// Interactive relationship graph drawn on a canvas.
///
/// Loads the neighbourhood of `address` (falling back to a built-in graph),
/// runs the force layout every frame and reports node clicks to the host.
#[component]
pub fn NetworkGraphCanvas(
	#[prop(into)] address: Signal<Option<String>>,
	#[prop(into)] filters: Signal<NodeFilters>,
	#[prop(into)] search_query: Signal<String>,
	#[prop(into, optional)] on_node_select: Option<Callback<GraphNode>>,
	#[prop(into, optional)] on_node_open_external: Option<Callback<GraphNode>>,
	#[prop(optional)] config: Option<EngineConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let config = config.unwrap_or_else(EngineConfig::load_from_dom);
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(GraphState::new(
		config.clone(),
		width.unwrap_or(800.0),
		height.unwrap_or(600.0),
	)));
	state.borrow_mut().load_payload(fallback_graph());

	let icons = Rc::new(RefCell::new(IconCache::default()));
	let frames = Rc::new(RefCell::new(AnimationFrameLoop::new()));
	let resize_listener: Arc<Mutex<Option<WindowListenerHandle>>> = Arc::default();
	let (animating, set_animating) = signal(true);

	let (loop_handle, listener) = (frames.borrow().handle(), resize_listener.clone());
	on_cleanup(move || {
		loop_handle.stop();
		if let Ok(mut slot) = listener.lock() {
			if let Some(handle) = slot.take() {
				handle.remove();
			}
		}
	});

	// Newer requests win; a slow response for an old address is discarded.
	let generation = Rc::new(Cell::new(0u64));
	let (state_load, generation_load) = (state.clone(), generation.clone());
	Effect::new(move |_| {
		let Some(addr) = address.get().filter(|a| !a.trim().is_empty()) else {
			return;
		};
		let ticket = generation_load.get() + 1;
		generation_load.set(ticket);
		let (state, generation, config) = (state_load.clone(), generation_load.clone(), config.clone());
		spawn_local(async move {
			let payload = load_graph(&config, &addr).await;
			if generation.get() == ticket {
				info!("showing graph for {}", addr);
				state.borrow_mut().load_payload(payload);
			}
		});
	});

	let state_filters = state.clone();
	Effect::new(move |_| {
		let (f, q) = (filters.get(), search_query.get());
		state_filters.borrow_mut().set_filters(f, q);
	});

	let (state_init, icons_init, frames_init) = (state.clone(), icons.clone(), frames.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if frames_init.borrow().is_running() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state_init.borrow_mut().resize(w, h);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			return;
		};

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			let handle = window_event_listener(leptos::ev::resize, move |_| {
				let Some((nw, nh)) = web_sys::window().and_then(|win| window_size(&win)) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			});
			if let Ok(mut slot) = resize_listener.lock() {
				*slot = Some(handle);
			}
		}

		let (state_anim, icons_anim) = (state_init.clone(), icons_init.clone());
		let mut frames = frames_init.borrow_mut();
		frames.on_frame(Box::new(move || {
			let mut s = state_anim.borrow_mut();
			s.tick();
			let mut icons = icons_anim.borrow_mut();
			icons.prefetch(&s);
			render::render(&s, &ctx, &icons);
		}));
		frames.start();
	});

	let emit = move |event: Option<GraphEvent>| match event {
		Some(GraphEvent::Select(node)) => {
			if let Some(cb) = on_node_select {
				cb.run(node);
			}
		}
		Some(GraphEvent::OpenExternal(node)) => {
			if let Some(cb) = on_node_open_external {
				cb.run(node);
			}
		}
		Some(GraphEvent::ExpansionChanged { .. }) | None => {}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(p) = pointer(canvas_ref, &ev) {
			state_md.borrow_mut().pointer_down(p);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(p) = pointer(canvas_ref, &ev) {
			state_mm.borrow_mut().pointer_move(p);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| state_mu.borrow_mut().pointer_up();

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| state_ml.borrow_mut().pointer_leave();

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		// The borrow must end before host callbacks can touch reactive state.
		let event = state_click.borrow_mut().click(p);
		emit(event);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = pointer(canvas_ref, &ev) {
			state_wh.borrow_mut().wheel(p, ev.delta_y());
		}
	};

	let state_zi = state.clone();
	let zoom_in = move |_| state_zi.borrow_mut().viewport.zoom_in();
	let state_zo = state.clone();
	let zoom_out = move |_| state_zo.borrow_mut().viewport.zoom_out();
	let state_reset = state.clone();
	let reset_view = move |_| state_reset.borrow_mut().viewport.reset();
	let state_play = state.clone();
	let toggle_animation = move |_| {
		let running = state_play.borrow_mut().toggle_animation();
		set_animating.set(running);
	};

	view! {
		<div class="network-graph">
			<canvas
				node_ref=canvas_ref
				class="network-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:click=on_click
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button title="Zoom in" on:click=zoom_in>"+"</button>
				<button title="Zoom out" on:click=zoom_out>"−"</button>
				<button title="Reset view" on:click=reset_view>"⟲"</button>
				<button
					title=move || if animating.get() { "Pause layout" } else { "Resume layout" }
					on:click=toggle_animation
				>
					{move || if animating.get() { "❚❚" } else { "▶" }}
				</button>
			</div>
		</div>
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Pointer position relative to the canvas' top-left corner.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<DVec2> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(DVec2::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
