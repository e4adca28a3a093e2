//! In-memory host capability.
//!
//! A deterministic fake of the platform history stack. It plays two roles:
//! the default host on non-WASM targets, and the test double that makes
//! the bridge fully observable. Every capability call is recorded in a
//! [`CallLog`], and navigation events raised by traversal are queued until
//! [`MemoryHost::flush_events`] pumps them: the real platform announces
//! traversal asynchronously, and the pump lets tests decide exactly when
//! that announcement arrives.
//!
//! Snapshots are synthesized against a configurable origin with a minimal
//! path/query/fragment split; full URL parsing is deliberately out of
//! scope for this crate.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::host::{HistoryHost, OnNavigation};
use crate::location::Location;

/// Record of every capability call, for assertions in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
	/// URLs handed to the push capability, in order.
	pub pushes: Vec<String>,
	/// URLs handed to the replace capability, in order.
	pub replaces: Vec<String>,
	/// Deltas handed to the traverse capability, in order.
	pub travels: Vec<i32>,
	/// URLs handed to the full-load capability, in order.
	pub loads: Vec<String>,
	/// `skip_cache` flags handed to the reload capability, in order.
	pub reloads: Vec<bool>,
}

struct MemoryHostInner {
	origin: String,
	stack: RefCell<Vec<String>>,
	cursor: Cell<usize>,
	listeners: RefCell<Vec<(u64, OnNavigation)>>,
	next_listener: Cell<u64>,
	pending: RefCell<VecDeque<Location>>,
	calls: RefCell<CallLog>,
}

/// Host capability backed by an in-memory history stack.
///
/// Clones share the same stack, the way every part of a page shares the
/// same browser history.
#[derive(Clone)]
pub struct MemoryHost {
	inner: Rc<MemoryHostInner>,
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for MemoryHost {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHost")
			.field("origin", &self.inner.origin)
			.field("stack", &self.inner.stack.borrow())
			.field("cursor", &self.inner.cursor.get())
			.field("listeners", &self.listener_count())
			.finish()
	}
}

impl MemoryHost {
	/// Creates a host whose stack holds a single root entry `/`.
	pub fn new() -> Self {
		Self::with_origin("http://localhost")
	}

	/// Creates a host that synthesizes snapshots against `origin`,
	/// e.g. `https://app.example.org`.
	pub fn with_origin(origin: impl Into<String>) -> Self {
		let origin = origin.into().trim_end_matches('/').to_string();
		Self {
			inner: Rc::new(MemoryHostInner {
				origin,
				stack: RefCell::new(vec!["/".to_string()]),
				cursor: Cell::new(0),
				listeners: RefCell::new(Vec::new()),
				next_listener: Cell::new(0),
				pending: RefCell::new(VecDeque::new()),
				calls: RefCell::new(CallLog::default()),
			}),
		}
	}

	/// The URL string of the current history entry.
	pub fn current_url(&self) -> String {
		let stack = self.inner.stack.borrow();
		stack[self.inner.cursor.get()].clone()
	}

	/// Every history entry, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.inner.stack.borrow().clone()
	}

	/// Number of navigation listeners currently attached.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.borrow().len()
	}

	/// Snapshot of the recorded capability calls.
	pub fn calls(&self) -> CallLog {
		self.inner.calls.borrow().clone()
	}

	/// Delivers every queued navigation event to the attached listeners.
	///
	/// Events queue up when traversal moves the cursor; nothing reaches a
	/// listener until this pump runs, mirroring the platform's own
	/// asynchronous announcement.
	pub fn flush_events(&self) {
		loop {
			let next = self.inner.pending.borrow_mut().pop_front();
			let Some(location) = next else {
				break;
			};
			let listeners: Vec<OnNavigation> = self
				.inner
				.listeners
				.borrow()
				.iter()
				.map(|(_, on_change)| Rc::clone(on_change))
				.collect();
			for listener in listeners {
				listener(location.clone());
			}
		}
	}

	/// Queues a navigation event for the current entry without moving the
	/// cursor, as if the address bar changed under the application.
	pub fn emit_navigation(&self) {
		let location = self.snapshot(&self.current_url());
		self.inner.pending.borrow_mut().push_back(location);
	}

	fn snapshot(&self, url: &str) -> Location {
		let (rest, hash) = match url.find('#') {
			Some(i) => (&url[..i], url[i..].to_string()),
			None => (url, String::new()),
		};
		let (pathname, search) = match rest.find('?') {
			Some(i) => (rest[..i].to_string(), rest[i..].to_string()),
			None => (rest.to_string(), String::new()),
		};

		let origin = self.inner.origin.clone();
		let (protocol, host) = match origin.split_once("//") {
			Some((scheme, host)) => (scheme.to_string(), host.to_string()),
			None => ("http:".to_string(), origin.clone()),
		};
		let (hostname, port) = match host.rsplit_once(':') {
			Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
				(name.to_string(), port.to_string())
			}
			_ => (host.clone(), String::new()),
		};

		Location {
			href: format!("{}{}", origin, url),
			host,
			hostname,
			protocol,
			origin,
			port,
			pathname,
			search,
			hash,
			username: String::new(),
			password: String::new(),
		}
	}

	fn append_entry(&self, url: &str) {
		let mut stack = self.inner.stack.borrow_mut();
		let cursor = self.inner.cursor.get();
		// pushing drops the forward tail, as the platform does
		stack.truncate(cursor + 1);
		stack.push(url.to_string());
		self.inner.cursor.set(cursor + 1);
	}
}

impl HistoryHost for MemoryHost {
	type Listener = MemoryListener;

	fn location(&self) -> Location {
		self.snapshot(&self.current_url())
	}

	fn push(&self, url: &str) -> Location {
		self.inner.calls.borrow_mut().pushes.push(url.to_string());
		self.append_entry(url);
		self.snapshot(url)
	}

	fn replace(&self, url: &str) -> Location {
		self.inner
			.calls
			.borrow_mut()
			.replaces
			.push(url.to_string());
		{
			let mut stack = self.inner.stack.borrow_mut();
			let cursor = self.inner.cursor.get();
			stack[cursor] = url.to_string();
		}
		self.snapshot(url)
	}

	fn travel(&self, delta: i32) {
		self.inner.calls.borrow_mut().travels.push(delta);
		let target = self.inner.cursor.get() as i64 + delta as i64;
		let len = self.inner.stack.borrow().len() as i64;
		if target < 0 || target >= len {
			// nothing to traverse to
			return;
		}
		self.inner.cursor.set(target as usize);
		let location = self.snapshot(&self.current_url());
		self.inner.pending.borrow_mut().push_back(location);
	}

	fn load(&self, url: &str) {
		self.inner.calls.borrow_mut().loads.push(url.to_string());
		// a full load tears the document down and lands on a new entry
		self.append_entry(url);
	}

	fn reload(&self, skip_cache: bool) {
		self.inner.calls.borrow_mut().reloads.push(skip_cache);
	}

	fn listen(&self, on_change: OnNavigation) -> MemoryListener {
		let id = self.inner.next_listener.get();
		self.inner.next_listener.set(id + 1);
		self.inner.listeners.borrow_mut().push((id, on_change));
		MemoryListener {
			host: Rc::downgrade(&self.inner),
			id,
		}
	}
}

/// Guard for an attached listener; dropping it detaches the callback.
pub struct MemoryListener {
	host: Weak<MemoryHostInner>,
	id: u64,
}

impl Drop for MemoryListener {
	fn drop(&mut self) {
		if let Some(host) = self.host.upgrade() {
			host.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
		}
	}
}
