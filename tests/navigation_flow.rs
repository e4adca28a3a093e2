//! End-to-end navigation behavior over the in-memory host.
//!
//! These tests drive the public API the way an application would: a
//! program (or a bare bridge) wired to a `MemoryHost`, whose recorded
//! capability calls and explicit event pump make every property of the
//! bridge observable without a browser.

use std::cell::RefCell;
use std::rc::Rc;

use grappelli::{
	Application, Command, HistoryBridge, HistoryHost, Location, MemoryHost, MessageSender,
	Program, Subscription, back, modify_url, new_url,
};

enum Msg {
	UrlChanged(Location),
	Navigate(Command),
}

struct Model {
	visited: Vec<Location>,
}

struct Recorder;

impl Application for Recorder {
	type Flags = ();
	type Model = Model;
	type Msg = Msg;
	type View = String;

	fn init(&self, _flags: (), location: Location) -> (Model, Vec<Command>) {
		(
			Model {
				visited: vec![location],
			},
			Vec::new(),
		)
	}

	fn update(&self, msg: Msg, model: &mut Model) -> Vec<Command> {
		match msg {
			Msg::UrlChanged(location) => {
				model.visited.push(location);
				Vec::new()
			}
			Msg::Navigate(command) => vec![command],
		}
	}

	fn view(&self, model: &Model) -> String {
		model
			.visited
			.last()
			.map(|location| location.pathname.clone())
			.unwrap_or_default()
	}
}

fn recorder() -> (Program<Recorder, MemoryHost>, MemoryHost) {
	let host = MemoryHost::new();
	let program = Program::with_host(host.clone(), Msg::UrlChanged, Recorder, ());
	(program, host)
}

fn collecting_bridge() -> (
	HistoryBridge<MemoryHost, Location>,
	MemoryHost,
	Rc<RefCell<Vec<Location>>>,
) {
	let host = MemoryHost::new();
	let seen = Rc::new(RefCell::new(Vec::new()));
	let sender = MessageSender::new({
		let seen = Rc::clone(&seen);
		move |location| seen.borrow_mut().push(location)
	});
	let bridge = HistoryBridge::new(Rc::new(host.clone()), sender);
	(bridge, host, seen)
}

fn pass_through() -> Subscription<Location> {
	Subscription::new(|location| location)
}

#[test]
fn push_then_back_restores_previous_location() {
	let (program, host) = recorder();
	program.dispatch(Msg::Navigate(new_url("/before")));
	let before = host.location();

	program.dispatch(Msg::Navigate(new_url("/after")));
	program.dispatch(Msg::Navigate(back(1)));
	host.flush_events();

	assert_eq!(host.location(), before);
	program.with_model(|model| {
		assert_eq!(model.visited.last(), Some(&before));
	});
}

#[test]
fn repeated_modify_changes_one_entry() {
	let (program, host) = recorder();
	program.dispatch(Msg::Navigate(new_url("/draft")));
	let entries_before = host.entries().len();

	program.dispatch(Msg::Navigate(modify_url("/draft?step=2")));
	program.dispatch(Msg::Navigate(modify_url("/draft?step=2")));

	assert_eq!(host.entries().len(), entries_before);
	assert_eq!(host.current_url(), "/draft?step=2");
	assert_eq!(host.calls().replaces.len(), 2);
}

#[test]
fn fan_out_delivers_one_equal_message_per_subscriber() {
	let (mut bridge, _host, seen) = collecting_bridge();
	let subscribers = vec![pass_through(), pass_through(), pass_through(), pass_through()];

	bridge.run_cycle(vec![new_url("/shared")], subscribers);

	let seen = seen.borrow();
	assert_eq!(seen.len(), 4);
	assert!(seen.iter().all(|location| *location == seen[0]));
	assert_eq!(seen[0].pathname, "/shared");
}

#[test]
fn listener_exists_iff_subscribed() {
	let (mut bridge, host, _seen) = collecting_bridge();

	// observation points between cycles
	assert!(!bridge.has_listener());

	bridge.run_cycle(Vec::new(), vec![pass_through()]);
	assert!(bridge.has_listener());
	assert_eq!(host.listener_count(), 1);

	bridge.run_cycle(Vec::new(), vec![pass_through()]);
	assert_eq!(host.listener_count(), 1);

	bridge.run_cycle(Vec::new(), Vec::new());
	assert!(!bridge.has_listener());
	assert_eq!(host.listener_count(), 0);
}

#[test]
fn push_without_subscribers_stays_silent() {
	let (mut bridge, host, seen) = collecting_bridge();

	bridge.run_cycle(vec![new_url("/a")], Vec::new());

	assert!(!bridge.has_listener());
	assert_eq!(host.calls().pushes, vec!["/a".to_string()]);
	assert!(seen.borrow().is_empty());
}

#[test]
fn push_with_one_subscriber_notifies_once() {
	let (mut bridge, host, seen) = collecting_bridge();

	bridge.run_cycle(vec![new_url("/b")], vec![pass_through()]);

	assert_eq!(host.calls().pushes, vec!["/b".to_string()]);
	let seen = seen.borrow();
	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].pathname, "/b");
}

#[test]
fn back_two_is_one_travel_call_and_no_sync_notification() {
	let (mut bridge, host, seen) = collecting_bridge();
	host.push("/a");
	host.push("/b");

	bridge.run_cycle(vec![back(2)], vec![pass_through()]);

	assert_eq!(host.calls().travels, vec![-2]);
	assert!(seen.borrow().is_empty());

	// the notification arrives only through the simulated native path
	host.flush_events();
	assert_eq!(seen.borrow().len(), 1);
	assert_eq!(seen.borrow()[0].pathname, "/");
}

#[test]
fn unsubscribing_silences_later_host_events() {
	let (mut bridge, host, seen) = collecting_bridge();
	bridge.run_cycle(Vec::new(), vec![pass_through()]);
	bridge.run_cycle(Vec::new(), Vec::new());
	assert_eq!(host.listener_count(), 0);

	host.emit_navigation();
	host.flush_events();

	assert!(seen.borrow().is_empty());
}

#[test]
fn user_navigation_reaches_the_application() {
	let (program, host) = recorder();
	program.dispatch(Msg::Navigate(new_url("/settings")));
	program.dispatch(Msg::Navigate(new_url("/settings/profile")));

	// the user presses back: nothing happens until the platform speaks
	program.dispatch(Msg::Navigate(back(1)));
	assert_eq!(program.view(), "/settings/profile");

	host.flush_events();
	assert_eq!(program.view(), "/settings");
}

#[test]
fn every_navigation_message_carries_a_fresh_snapshot() {
	let (program, _host) = recorder();
	program.dispatch(Msg::Navigate(new_url("/one")));
	program.dispatch(Msg::Navigate(new_url("/two?tab=queue#now")));

	program.with_model(|model| {
		let last = model.visited.last().unwrap();
		assert_eq!(last.pathname, "/two");
		assert_eq!(last.search, "?tab=queue");
		assert_eq!(last.hash, "#now");
		assert_eq!(last.href, "http://localhost/two?tab=queue#now");

		// earlier snapshots are superseded, not rewritten
		let earlier = &model.visited[model.visited.len() - 2];
		assert_eq!(earlier.pathname, "/one");
	});
}
