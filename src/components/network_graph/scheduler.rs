use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use log::debug;
use wasm_bindgen::prelude::*;

/// Drives a per-frame callback. Physics and rendering share the one callback.
pub trait FrameScheduler {
	/// Replaces the callback run on each frame.
	fn on_frame(&mut self, callback: Box<dyn FnMut()>);
	fn start(&mut self);
	/// Stops the loop; any frame already requested is cancelled.
	fn stop(&mut self);
	fn is_running(&self) -> bool;
}

/// Frames advanced by hand, for hosts without an animation-frame source.
#[derive(Default)]
pub struct ManualFrames {
	callback: Option<Box<dyn FnMut()>>,
	running: bool,
	frames: u64,
}

impl ManualFrames {
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs one frame if started; returns whether the callback ran.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		let Some(callback) = self.callback.as_mut() else {
			return false;
		};
		callback();
		self.frames += 1;
		true
	}

	pub fn frames(&self) -> u64 {
		self.frames
	}
}

impl FrameScheduler for ManualFrames {
	fn on_frame(&mut self, callback: Box<dyn FnMut()>) {
		self.callback = Some(callback);
	}

	fn start(&mut self) {
		self.running = true;
	}

	fn stop(&mut self) {
		self.running = false;
	}

	fn is_running(&self) -> bool {
		self.running
	}
}

/// Thread-safe stop switch for an [`AnimationFrameLoop`], usable from
/// teardown hooks that demand `Send + Sync`.
#[derive(Clone, Debug, Default)]
pub struct LoopHandle {
	running: Arc<AtomicBool>,
	/// Id of the outstanding `requestAnimationFrame`, 0 when none.
	pending: Arc<AtomicI32>,
}

impl LoopHandle {
	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::Acquire)
	}

	pub fn stop(&self) {
		self.running.store(false, Ordering::Release);
		let id = self.pending.swap(0, Ordering::AcqRel);
		if id != 0 {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
	}
}

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` loop that re-arms itself after every frame.
pub struct AnimationFrameLoop {
	callback: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
	frame: FrameClosure,
	handle: LoopHandle,
}

impl AnimationFrameLoop {
	pub fn new() -> Self {
		Self {
			callback: Rc::new(RefCell::new(None)),
			frame: Rc::new(RefCell::new(None)),
			handle: LoopHandle::default(),
		}
	}

	pub fn handle(&self) -> LoopHandle {
		self.handle.clone()
	}

	fn request(frame: &FrameClosure, handle: &LoopHandle) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref cb) = *frame.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				handle.pending.store(id, Ordering::Release);
			}
		}
	}
}

impl Default for AnimationFrameLoop {
	fn default() -> Self {
		Self::new()
	}
}

impl FrameScheduler for AnimationFrameLoop {
	fn on_frame(&mut self, callback: Box<dyn FnMut()>) {
		*self.callback.borrow_mut() = Some(callback);
	}

	fn start(&mut self) {
		if self.handle.is_running() {
			return;
		}
		self.handle.running.store(true, Ordering::Release);

		let (callback, frame, handle) = (self.callback.clone(), self.frame.clone(), self.handle.clone());
		*self.frame.borrow_mut() = Some(Closure::new(move || {
			handle.pending.store(0, Ordering::Release);
			if !handle.is_running() {
				return;
			}
			if let Some(ref mut cb) = *callback.borrow_mut() {
				cb();
			}
			if handle.is_running() {
				Self::request(&frame, &handle);
			}
		}));
		Self::request(&self.frame, &self.handle);
		debug!("animation loop started");
	}

	fn stop(&mut self) {
		self.handle.stop();
		// Dropping the closure breaks its self-reference.
		self.frame.borrow_mut().take();
		debug!("animation loop stopped");
	}

	fn is_running(&self) -> bool {
		self.handle.is_running()
	}
}

impl Drop for AnimationFrameLoop {
	// A loop already stopped through its `LoopHandle` still owns the closure.
	fn drop(&mut self) {
		self.handle.stop();
		self.frame.borrow_mut().take();
		self.callback.borrow_mut().take();
	}
}
