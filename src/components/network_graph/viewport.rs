use glam::DVec2;

use super::config::ViewportLimits;

/// Zoom/pan mapping: `screen = world * zoom + pan`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub zoom: f64,
	pub pan: DVec2,
	limits: ViewportLimits,
}

impl Viewport {
	pub fn new(limits: ViewportLimits) -> Self {
		Self {
			zoom: 1.0,
			pan: DVec2::ZERO,
			limits,
		}
	}

	pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
		world * self.zoom + self.pan
	}

	pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
		(screen - self.pan) * (1.0 / self.zoom)
	}

	pub fn set_zoom(&mut self, zoom: f64) {
		self.zoom = zoom.clamp(self.limits.min_zoom, self.limits.max_zoom);
	}

	pub fn zoom_in(&mut self) {
		self.set_zoom(self.zoom * self.limits.zoom_step);
	}

	pub fn zoom_out(&mut self) {
		self.set_zoom(self.zoom / self.limits.zoom_step);
	}

	/// Scales by `factor` keeping the world point under `anchor` fixed on screen.
	pub fn zoom_at(&mut self, anchor: DVec2, factor: f64) {
		let world = self.screen_to_world(anchor);
		self.set_zoom(self.zoom * factor);
		self.pan = anchor - world * self.zoom;
	}

	pub fn pan_by(&mut self, delta: DVec2) {
		self.pan += delta;
	}

	pub fn reset(&mut self) {
		self.zoom = 1.0;
		self.pan = DVec2::ZERO;
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(ViewportLimits::default())
	}
}
