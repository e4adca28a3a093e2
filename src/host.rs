//! External navigation capability.
//!
//! Every interaction with the platform's history stack goes through the
//! narrow [`HistoryHost`] trait: query the current address-bar state, push
//! or replace entries, traverse the stack, and listen for navigation
//! changes the application did not itself initiate. Keeping the surface
//! this small lets the in-memory fake in [`memory`] stand in for the real
//! browser in [`browser`], so the whole bridge is testable without a host
//! environment.
//!
//! Within their intended environment the capabilities never fail: pushing,
//! replacing and traversing are defined by the platform to succeed (an
//! out-of-range traversal is a no-op, not an error). The only fallible
//! step is acquiring the real browser host in the first place.

pub mod browser;
pub mod memory;

use std::rc::Rc;

use thiserror::Error;

use crate::location::Location;

/// Callback a host listener invokes with each freshly captured snapshot.
pub type OnNavigation = Rc<dyn Fn(Location)>;

/// Error raised when the real browser host cannot be constructed.
#[derive(Debug, Error)]
pub enum HostError {
	/// No global `window` object is available.
	#[error("no global window object available")]
	WindowUnavailable,
	/// The window exposes no usable History API.
	#[error("history API unavailable: {0}")]
	HistoryUnavailable(String),
}

/// The platform's navigation capability.
pub trait HistoryHost {
	/// Guard for an attached navigation listener. Dropping it detaches
	/// every native listener it registered.
	type Listener;

	/// Captures the current address-bar state.
	///
	/// Never fails; the platform always has some address-bar state.
	fn location(&self) -> Location;

	/// Adds a new history entry for `url` and returns the resulting state.
	fn push(&self, url: &str) -> Location;

	/// Replaces the current history entry with `url` and returns the
	/// resulting state.
	fn replace(&self, url: &str) -> Location;

	/// Moves `delta` entries within the existing history stack.
	///
	/// A no-op when the stack has no entry in that direction. The
	/// resulting location change is announced through the listener rather
	/// than returned: traversal is not synchronously observable.
	fn travel(&self, delta: i32);

	/// Leaves the application and performs a full page load of `url`.
	fn load(&self, url: &str);

	/// Reloads the current page, bypassing the cache when asked to.
	fn reload(&self, skip_cache: bool);

	/// Registers `on_change` for the platform's navigation-change
	/// notifications and returns the guard keeping it attached.
	fn listen(&self, on_change: OnNavigation) -> Self::Listener;
}
