use leptos::prelude::*;
use log::{info, warn};

use crate::components::network_graph::{
	EngineConfig, GraphNode, NetworkGraphCanvas, NodeFilters, short_address,
};

const CATEGORIES: &[&str] = &[
	"All", "Scam", "Exchange", "Wallet", "Bridge", "Mixer", "DeFi", "Drugs", "Terror",
];
const RISK_LEVELS: &[&str] = &["All", "High", "Medium", "Low"];

/// Investigation page: address lookup, filters and the graph itself.
#[component]
pub fn Home() -> impl IntoView {
	let config = EngineConfig::load_from_dom();
	let explorer = config.clone();

	let (draft, set_draft) = signal(String::new());
	let (address, set_address) = signal(None::<String>);
	let (category, set_category) = signal("All".to_string());
	let (risk, set_risk) = signal("All".to_string());
	let (search, set_search) = signal(String::new());
	let (selected, set_selected) = signal(None::<GraphNode>);

	let filters = Signal::derive(move || NodeFilters::from_selects(&category.get(), &risk.get()));

	let on_node_select = Callback::new(move |node: GraphNode| set_selected.set(Some(node)));
	let on_node_open_external = Callback::new(move |node: GraphNode| {
		let url = explorer.explorer_link(&node.address);
		info!("opening {}", url);
		let opened = web_sys::window().map(|w| w.open_with_url_and_target(&url, "_blank"));
		if !matches!(opened, Some(Ok(_))) {
			warn!("could not open {}", url);
		}
	});

	let submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let value = draft.get_untracked().trim().to_string();
		set_address.set((!value.is_empty()).then_some(value));
	};

	let options = |values: &'static [&'static str]| {
		values
			.iter()
			.map(|v| view! { <option value=*v>{*v}</option> })
			.collect_view()
	};

	view! {
		<div class="fullscreen-graph">
			<NetworkGraphCanvas
				address=address
				filters=filters
				search_query=search
				on_node_select=on_node_select
				on_node_open_external=on_node_open_external
				config=config
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Address Graph Explorer"</h1>
				<form on:submit=submit>
					<input
						type="text"
						placeholder="0x… address"
						prop:value=draft
						on:input=move |ev| set_draft.set(event_target_value(&ev))
					/>
					<button type="submit">"Investigate"</button>
				</form>
				<div class="filters">
					<select on:change=move |ev| set_category.set(event_target_value(&ev))>
						{options(CATEGORIES)}
					</select>
					<select on:change=move |ev| set_risk.set(event_target_value(&ev))>
						{options(RISK_LEVELS)}
					</select>
					<input
						type="search"
						placeholder="Search label or address"
						prop:value=search
						on:input=move |ev| set_search.set(event_target_value(&ev))
					/>
				</div>
				<p class="subtitle">
					"Click ＋ to expand a node, 👁 for details, ↗ to open it in the explorer."
				</p>
			</div>
			{move || {
				selected
					.get()
					.map(|node| {
						let connections = node.connected_node_ids.len();
						view! {
							<aside class="node-details">
								<button class="close" on:click=move |_| set_selected.set(None)>
									"×"
								</button>
								<h2>{node.label.clone()}</h2>
								<dl>
									<dt>"Address"</dt>
									<dd title=node.address.clone()>{short_address(&node.address)}</dd>
									<dt>"Category"</dt>
									<dd>{node.category.clone()}</dd>
									<dt>"Risk"</dt>
									<dd style=format!("color: {}", node.risk_level.color())>
										{node.risk_level.to_string()}
									</dd>
									<dt>"Connections"</dt>
									<dd>{connections}</dd>
								</dl>
							</aside>
						}
					})
			}}
		</div>
	}
}
