//! Browser-backed host capability.
//!
//! Wraps the real History API: `window.location` for snapshots,
//! `history.pushState` / `replaceState` / `go` for navigation, and the
//! `popstate` event (plus `hashchange` on engines that need the fallback)
//! for externally triggered changes such as the user pressing back or
//! forward.
//!
//! The host itself is only compiled for `wasm32` targets; native builds
//! run against [`MemoryHost`](crate::host::memory::MemoryHost) instead.
//! The listener options are available on every target so server-side code
//! can construct and pass them through unchanged.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use crate::host::{HistoryHost, HostError, OnNavigation};
#[cfg(target_arch = "wasm32")]
use crate::location::Location;

/// Policy for registering the legacy `hashchange` fallback event.
///
/// Older engines do not raise `popstate` reliably; the original History
/// API integrations register `hashchange` alongside it there. Modern
/// engines raise both events for fragment-only changes, so registering the
/// fallback unconditionally would double-fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackEvent {
	/// Register the fallback only when the user agent reports an engine
	/// that needs it (Trident).
	#[default]
	Auto,
	/// Always register the fallback alongside `popstate`.
	Always,
	/// Register the modern event only.
	Never,
}

/// Options controlling how the browser host attaches its listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHostOptions {
	/// Fallback-event registration policy.
	pub fallback: FallbackEvent,
}

impl BrowserHostOptions {
	/// Creates the default options (auto-detected fallback).
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the fallback-event policy.
	pub fn fallback(mut self, fallback: FallbackEvent) -> Self {
		self.fallback = fallback;
		self
	}
}

/// Host capability backed by the browser's History API.
#[cfg(target_arch = "wasm32")]
pub struct BrowserHost {
	window: web_sys::Window,
	history: web_sys::History,
	options: BrowserHostOptions,
}

#[cfg(target_arch = "wasm32")]
impl BrowserHost {
	/// Acquires the global window and its History API.
	///
	/// Fails only outside a browser-like environment; every capability
	/// call after construction is infallible.
	pub fn new() -> Result<Self, HostError> {
		Self::with_options(BrowserHostOptions::default())
	}

	/// Acquires the host with explicit listener options.
	pub fn with_options(options: BrowserHostOptions) -> Result<Self, HostError> {
		let window = web_sys::window().ok_or(HostError::WindowUnavailable)?;
		let history = window
			.history()
			.map_err(|err| HostError::HistoryUnavailable(format!("{:?}", err)))?;
		Ok(Self {
			window,
			history,
			options,
		})
	}

	fn wants_fallback(&self) -> bool {
		match self.options.fallback {
			FallbackEvent::Always => true,
			FallbackEvent::Never => false,
			FallbackEvent::Auto => self
				.window
				.navigator()
				.user_agent()
				.map(|ua| ua.contains("Trident"))
				.unwrap_or(false),
		}
	}

	fn capture(location: &web_sys::Location) -> Location {
		Location {
			href: location.href().unwrap_or_default(),
			host: location.host().unwrap_or_default(),
			hostname: location.hostname().unwrap_or_default(),
			protocol: location.protocol().unwrap_or_default(),
			origin: location.origin().unwrap_or_default(),
			port: location.port().unwrap_or_default(),
			pathname: location.pathname().unwrap_or_default(),
			search: location.search().unwrap_or_default(),
			hash: location.hash().unwrap_or_default(),
			// window.location carries no credentials
			username: String::new(),
			password: String::new(),
		}
	}
}

#[cfg(target_arch = "wasm32")]
impl HistoryHost for BrowserHost {
	type Listener = BrowserListener;

	fn location(&self) -> Location {
		Self::capture(&self.window.location())
	}

	fn push(&self, url: &str) -> Location {
		let _ = self
			.history
			.push_state_with_url(&JsValue::NULL, "", Some(url));
		self.location()
	}

	fn replace(&self, url: &str) -> Location {
		let _ = self
			.history
			.replace_state_with_url(&JsValue::NULL, "", Some(url));
		self.location()
	}

	fn travel(&self, delta: i32) {
		let _ = self.history.go_with_delta(delta);
	}

	fn load(&self, url: &str) {
		let _ = self.window.location().assign(url);
	}

	fn reload(&self, skip_cache: bool) {
		let location = self.window.location();
		let _ = if skip_cache {
			location.reload_with_forceget(true)
		} else {
			location.reload()
		};
	}

	fn listen(&self, on_change: OnNavigation) -> BrowserListener {
		let window = self.window.clone();
		let closure = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new({
			let window = window.clone();
			move |_event| {
				on_change(BrowserHost::capture(&window.location()));
			}
		}));

		let mut events: Vec<&'static str> = vec!["popstate"];
		if self.wants_fallback() {
			events.push("hashchange");
		}
		for name in &events {
			let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
		}
		crate::info_log!("navigation listener attached ({})", events.join(", "));

		BrowserListener {
			window,
			events,
			closure,
		}
	}
}

/// Guard keeping the native listeners attached.
///
/// Dropping the guard removes every event listener it registered, so the
/// page stops receiving navigation notifications.
#[cfg(target_arch = "wasm32")]
pub struct BrowserListener {
	window: web_sys::Window,
	events: Vec<&'static str>,
	closure: Closure<dyn FnMut(web_sys::Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Drop for BrowserListener {
	fn drop(&mut self) {
		for name in &self.events {
			let _ = self
				.window
				.remove_event_listener_with_callback(name, self.closure.as_ref().unchecked_ref());
		}
		crate::info_log!("navigation listener detached");
	}
}
