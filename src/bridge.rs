//! History bridge.
//!
//! The bridge reconciles what one update cycle declared (a list of
//! navigation commands and a list of location subscriptions) against the
//! host capability and the previously running listener. Commands execute
//! sequentially and exhaustively; push and replace fan their resulting
//! [`Location`] out to every registered subscriber synchronously, while
//! traversal stays silent until the platform's own navigation event
//! arrives. The listener exists exactly while the subscription list is
//! non-empty.
//!
//! Natively raised events land on an internal queue (the bridge's
//! self-channel) and drain with fan-out from there, so a host that raises
//! events synchronously cannot re-enter the bridge while it is working.
//! Subscriber messages leave through a [`MessageSender`], which enqueues
//! and returns; delivery is fire-and-forget relative to the bridge's own
//! control flow.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::command::Command;
use crate::host::{HistoryHost, OnNavigation};
use crate::location::Location;

/// A registered interest mapping every location change to an application
/// message.
///
/// Subscriptions are cheaply cloneable; clones share the conversion
/// function.
pub struct Subscription<Msg> {
	map: Arc<dyn Fn(Location) -> Msg>,
}

impl<Msg> Subscription<Msg> {
	/// Creates a subscription from a conversion function.
	pub fn new<F>(map: F) -> Self
	where
		F: Fn(Location) -> Msg + 'static,
	{
		Self { map: Arc::new(map) }
	}

	/// Maps a location to this subscriber's message.
	pub fn apply(&self, location: Location) -> Msg {
		(self.map)(location)
	}
}

impl<Msg> Clone for Subscription<Msg> {
	fn clone(&self) -> Self {
		Self {
			map: Arc::clone(&self.map),
		}
	}
}

impl<Msg> fmt::Debug for Subscription<Msg> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("map", &"<function>")
			.finish()
	}
}

/// Sink receiving the messages produced by subscription fan-out.
///
/// Implementations enqueue and return; they must not run update cycles
/// inline, or a cycle could observe the bridge mid-reconciliation.
pub struct MessageSender<Msg> {
	send: Arc<dyn Fn(Msg)>,
}

impl<Msg> MessageSender<Msg> {
	/// Creates a sender from an enqueue function.
	pub fn new<F>(send: F) -> Self
	where
		F: Fn(Msg) + 'static,
	{
		Self {
			send: Arc::new(send),
		}
	}

	/// Hands one message to the application's queue.
	pub fn send(&self, msg: Msg) {
		(self.send)(msg)
	}
}

impl<Msg> Clone for MessageSender<Msg> {
	fn clone(&self) -> Self {
		Self {
			send: Arc::clone(&self.send),
		}
	}
}

impl<Msg> fmt::Debug for MessageSender<Msg> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MessageSender")
			.field("send", &"<function>")
			.finish()
	}
}

/// Reconciles declared commands and subscriptions against the host.
pub struct HistoryBridge<H: HistoryHost, Msg> {
	host: Rc<H>,
	sender: MessageSender<Msg>,
	subscriptions: Rc<RefCell<Vec<Subscription<Msg>>>>,
	inbox: Rc<RefCell<VecDeque<Location>>>,
	draining: Rc<Cell<bool>>,
	listener: Option<H::Listener>,
}

impl<H: HistoryHost, Msg> fmt::Debug for HistoryBridge<H, Msg> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HistoryBridge")
			.field("subscriptions", &self.subscriptions.borrow().len())
			.field("has_listener", &self.listener.is_some())
			.finish()
	}
}

impl<H, Msg> HistoryBridge<H, Msg>
where
	H: HistoryHost,
	Msg: 'static,
{
	/// Creates a bridge with no subscriptions and no listener.
	pub fn new(host: Rc<H>, sender: MessageSender<Msg>) -> Self {
		Self {
			host,
			sender,
			subscriptions: Rc::new(RefCell::new(Vec::new())),
			inbox: Rc::new(RefCell::new(VecDeque::new())),
			draining: Rc::new(Cell::new(false)),
			listener: None,
		}
	}

	/// Whether the listener task is currently attached.
	pub fn has_listener(&self) -> bool {
		self.listener.is_some()
	}

	/// Runs one reconciliation cycle.
	///
	/// Adopts `subscriptions` as the registered set, executes `commands`
	/// in the order supplied, then brings the listener in line with the
	/// subscription count: attached while subscribers exist, detached
	/// otherwise. Exactly one cycle runs at a time; messages produced
	/// along the way are enqueued, never processed inline.
	pub fn run_cycle(&mut self, commands: Vec<Command>, subscriptions: Vec<Subscription<Msg>>) {
		*self.subscriptions.borrow_mut() = subscriptions;
		for command in commands {
			self.execute(command);
		}
		self.reconcile_listener();
	}

	fn execute(&mut self, command: Command) {
		match command {
			Command::Jump(delta) => {
				// Unobservable synchronously: the platform raises its own
				// navigation event once the traversal lands, and the
				// listener path picks that up. Notifying here as well
				// would double-fire.
				self.host.travel(delta);
			}
			Command::PushUrl(url) => {
				let location = self.host.push(&url);
				self.fan_out(location);
			}
			Command::ReplaceUrl(url) => {
				let location = self.host.replace(&url);
				self.fan_out(location);
			}
			Command::Load(url) => self.host.load(&url),
			Command::Reload { skip_cache } => self.host.reload(skip_cache),
		}
	}

	/// Delivers `location` to every currently registered subscriber, in
	/// registration order, one message each.
	fn fan_out(&self, location: Location) {
		let subscribers: Vec<Subscription<Msg>> = self.subscriptions.borrow().clone();
		for subscriber in subscribers {
			self.sender.send(subscriber.apply(location.clone()));
		}
	}

	fn reconcile_listener(&mut self) {
		let active = !self.subscriptions.borrow().is_empty();
		match (active, self.listener.is_some()) {
			(true, false) => {
				self.listener = Some(self.host.listen(self.navigation_callback()));
				crate::info_log!("history listener attached");
			}
			(false, true) => {
				// dropping the guard detaches the native listeners
				self.listener = None;
				crate::info_log!("history listener detached");
			}
			_ => {}
		}
	}

	/// Builds the listener callback: events enqueue on the self-channel,
	/// and the first frame on the channel drains it with fan-out. The
	/// subscriber list is re-read per event, so a reconciliation that runs
	/// between deliveries takes effect immediately.
	fn navigation_callback(&self) -> OnNavigation {
		let inbox = Rc::clone(&self.inbox);
		let draining = Rc::clone(&self.draining);
		let subscriptions = Rc::clone(&self.subscriptions);
		let sender = self.sender.clone();
		Rc::new(move |location: Location| {
			inbox.borrow_mut().push_back(location);
			if draining.get() {
				return;
			}
			draining.set(true);
			loop {
				let next = inbox.borrow_mut().pop_front();
				let Some(location) = next else {
					break;
				};
				let subscribers: Vec<Subscription<Msg>> = subscriptions.borrow().clone();
				for subscriber in subscribers {
					sender.send(subscriber.apply(location.clone()));
				}
			}
			draining.set(false);
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::command::{back, modify_url, new_url};
	use crate::host::memory::MemoryHost;

	fn collector() -> (MessageSender<Location>, Rc<RefCell<Vec<Location>>>) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sender = MessageSender::new({
			let seen = Rc::clone(&seen);
			move |msg| seen.borrow_mut().push(msg)
		});
		(sender, seen)
	}

	fn subscription() -> Subscription<Location> {
		Subscription::new(|location| location)
	}

	fn bridge() -> (HistoryBridge<MemoryHost, Location>, MemoryHost, Rc<RefCell<Vec<Location>>>) {
		let host = MemoryHost::new();
		let (sender, seen) = collector();
		let bridge = HistoryBridge::new(Rc::new(host.clone()), sender);
		(bridge, host, seen)
	}

	#[test]
	fn test_push_without_subscribers_notifies_nobody() {
		let (mut bridge, host, seen) = bridge();

		bridge.run_cycle(vec![new_url("/a")], Vec::new());

		assert!(!bridge.has_listener());
		assert_eq!(host.calls().pushes, vec!["/a".to_string()]);
		assert!(seen.borrow().is_empty());
	}

	#[test]
	fn test_push_notifies_each_subscriber_once() {
		let (mut bridge, host, seen) = bridge();

		bridge.run_cycle(
			vec![new_url("/b")],
			vec![subscription(), subscription(), subscription()],
		);

		assert_eq!(host.calls().pushes, vec!["/b".to_string()]);
		let seen = seen.borrow();
		assert_eq!(seen.len(), 3);
		assert!(seen.iter().all(|location| location.pathname == "/b"));
		assert!(seen.iter().all(|location| *location == seen[0]));
	}

	#[test]
	fn test_commands_execute_in_order() {
		let (mut bridge, host, _seen) = bridge();

		bridge.run_cycle(
			vec![new_url("/a"), modify_url("/b"), new_url("/c")],
			Vec::new(),
		);

		assert_eq!(host.calls().pushes, vec!["/a".to_string(), "/c".to_string()]);
		assert_eq!(host.calls().replaces, vec!["/b".to_string()]);
		assert_eq!(host.entries(), vec!["/", "/b", "/c"]);
	}

	#[test]
	fn test_jump_never_notifies_synchronously() {
		let (mut bridge, host, seen) = bridge();
		host.push("/a");
		host.push("/b");

		bridge.run_cycle(vec![back(2)], vec![subscription()]);

		assert_eq!(host.calls().travels, vec![-2]);
		assert!(seen.borrow().is_empty());

		// the platform announces the traversal later; only then do
		// subscribers hear about it
		host.flush_events();
		let seen = seen.borrow();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].pathname, "/");
	}

	#[test]
	fn test_listener_tracks_subscription_count() {
		let (mut bridge, host, _seen) = bridge();
		assert!(!bridge.has_listener());
		assert_eq!(host.listener_count(), 0);

		bridge.run_cycle(Vec::new(), vec![subscription()]);
		assert!(bridge.has_listener());
		assert_eq!(host.listener_count(), 1);

		// still subscribed: the running listener is left untouched
		bridge.run_cycle(Vec::new(), vec![subscription(), subscription()]);
		assert!(bridge.has_listener());
		assert_eq!(host.listener_count(), 1);

		bridge.run_cycle(Vec::new(), Vec::new());
		assert!(!bridge.has_listener());
		assert_eq!(host.listener_count(), 0);
	}

	#[test]
	fn test_detached_listener_delivers_nothing() {
		let (mut bridge, host, seen) = bridge();
		bridge.run_cycle(Vec::new(), vec![subscription()]);
		bridge.run_cycle(Vec::new(), Vec::new());

		host.emit_navigation();
		host.flush_events();

		assert!(seen.borrow().is_empty());
	}

	#[test]
	fn test_native_event_reaches_current_subscribers() {
		let (mut bridge, host, seen) = bridge();
		bridge.run_cycle(Vec::new(), vec![subscription(), subscription()]);

		host.emit_navigation();
		host.flush_events();

		let seen = seen.borrow();
		assert_eq!(seen.len(), 2);
		assert_eq!(seen[0], seen[1]);
	}
}
