use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use super::error::{GraphError, Result};

/// DOM id of the optional JSON config block.
pub const CONFIG_ELEMENT_ID: &str = "graph-config";

/// Force-simulation constants. One tick is one animation frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsParams {
	pub repulsion: f64,
	/// Pairs further apart than this exert no repulsion.
	pub repulsion_cutoff: f64,
	pub spring_length: f64,
	pub spring_constant: f64,
	pub centering: f64,
	pub damping: f64,
	/// Upper bound on the net force applied to one node in one tick.
	pub max_force: f64,
}

impl Default for PhysicsParams {
	fn default() -> Self {
		Self {
			repulsion: 100.0,
			repulsion_cutoff: 150.0,
			spring_length: 120.0,
			spring_constant: 0.01,
			centering: 0.001,
			damping: 0.9,
			max_force: 10.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportLimits {
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub zoom_step: f64,
}

impl Default for ViewportLimits {
	fn default() -> Self {
		Self {
			min_zoom: 0.3,
			max_zoom: 3.0,
			zoom_step: 1.2,
		}
	}
}

/// Node sizes and the placement of the per-node affordances, in world units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeGeometry {
	pub root_radius: f64,
	pub child_radius: f64,
	pub expansion_radius: f64,
	/// Gap between a node's rim and the centre of each affordance.
	pub affordance_offset: f64,
	pub button_radius: f64,
	pub link_radius: f64,
}

impl Default for NodeGeometry {
	fn default() -> Self {
		Self {
			root_radius: 24.0,
			child_radius: 16.0,
			expansion_radius: 120.0,
			affordance_offset: 15.0,
			button_radius: 12.0,
			link_radius: 10.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
	pub physics: PhysicsParams,
	pub viewport: ViewportLimits,
	pub geometry: NodeGeometry,
	/// Backend roots tried in order when fetching a graph.
	pub api_bases: Vec<String>,
	/// Block-explorer link; `{address}` is replaced with the node's address.
	pub explorer_url: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			physics: PhysicsParams::default(),
			viewport: ViewportLimits::default(),
			geometry: NodeGeometry::default(),
			api_bases: vec![
				"http://localhost:5001".into(),
				"http://127.0.0.1:5001".into(),
				"http://localhost:8000".into(),
				"http://127.0.0.1:8000".into(),
			],
			explorer_url: "https://etherscan.io/address/{address}".into(),
		}
	}
}

impl EngineConfig {
	pub fn from_json(json: &str) -> Result<Self> {
		let config: EngineConfig = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		let p = &self.physics;
		if !(p.damping > 0.0 && p.damping < 1.0) {
			return Err(GraphError::InvalidConfig(format!(
				"damping must lie in (0, 1), got {}",
				p.damping
			)));
		}
		if p.max_force <= 0.0 || p.repulsion_cutoff <= 0.0 {
			return Err(GraphError::InvalidConfig(
				"maxForce and repulsionCutoff must be positive".into(),
			));
		}
		let v = &self.viewport;
		if v.min_zoom <= 0.0 || v.min_zoom > v.max_zoom || v.zoom_step <= 1.0 {
			return Err(GraphError::InvalidConfig(format!(
				"zoom bounds [{}, {}] with step {} are unusable",
				v.min_zoom, v.max_zoom, v.zoom_step
			)));
		}
		Ok(())
	}

	pub fn explorer_link(&self, address: &str) -> String {
		self.explorer_url.replace("{address}", address)
	}

	/// Reads the `graph-config` script block, falling back to defaults.
	pub fn load_from_dom() -> Self {
		let Some(json) = config_script_text() else {
			return Self::default();
		};
		match Self::from_json(&json) {
			Ok(config) => {
				info!("graph config loaded from #{}", CONFIG_ELEMENT_ID);
				config
			}
			Err(e) => {
				warn!("ignoring graph config: {}", e);
				Self::default()
			}
		}
	}
}

fn config_script_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_other_defaults() {
		let config = EngineConfig::from_json(
			r#"{"physics": {"damping": 0.8}, "explorerUrl": "https://blockstream.info/address/{address}"}"#,
		)
		.unwrap();
		assert_eq!(config.physics.damping, 0.8);
		assert_eq!(config.physics.repulsion_cutoff, 150.0);
		assert_eq!(config.viewport, ViewportLimits::default());
		assert_eq!(
			config.explorer_link("bc1qxy"),
			"https://blockstream.info/address/bc1qxy"
		);
	}

	#[test]
	fn damping_at_or_above_one_is_rejected() {
		let err = EngineConfig::from_json(r#"{"physics": {"damping": 1.0}}"#).unwrap_err();
		assert!(matches!(err, GraphError::InvalidConfig(_)));
	}

	#[test]
	fn inverted_zoom_bounds_are_rejected() {
		let err =
			EngineConfig::from_json(r#"{"viewport": {"minZoom": 4.0, "maxZoom": 2.0}}"#).unwrap_err();
		assert!(matches!(err, GraphError::InvalidConfig(_)));
	}

	#[test]
	fn non_json_is_a_decode_error() {
		assert!(matches!(
			EngineConfig::from_json("not json"),
			Err(GraphError::Decode(_))
		));
	}

	#[test]
	fn default_explorer_is_etherscan() {
		assert_eq!(
			EngineConfig::default().explorer_link("0xabc"),
			"https://etherscan.io/address/0xabc"
		);
	}
}
