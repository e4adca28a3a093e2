//! Runtime adapter.
//!
//! Wraps an application's init/update/view/subscriptions contract so that
//! every location change (whether the application navigated itself or the
//! user pressed back) arrives as an ordinary message, and so that
//! navigation [`Command`]s issued from `update` are carried out between
//! messages. The adapter holds no state machine of its own; it composes
//! the pieces once at startup and then drives a run-to-completion message
//! queue.
//!
//! [`program`] and [`program_with_flags`] run against [`DefaultHost`]: the
//! real browser history on `wasm32`, the in-memory stack everywhere else.
//! [`Program::with_host`] accepts an explicit host, which is how the test
//! suites drive the whole loop deterministically.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::bridge::{HistoryBridge, MessageSender, Subscription};
use crate::command::Command;
use crate::host::{HistoryHost, HostError};
use crate::location::Location;

#[cfg(target_arch = "wasm32")]
use crate::host::browser::BrowserHost;
#[cfg(not(target_arch = "wasm32"))]
use crate::host::memory::MemoryHost;

/// Host used by [`program`] and [`program_with_flags`].
#[cfg(target_arch = "wasm32")]
pub type DefaultHost = BrowserHost;

/// Host used by [`program`] and [`program_with_flags`]. Non-WASM builds
/// run against the in-memory stack, which keeps server-side rendering and
/// tests deterministic.
#[cfg(not(target_arch = "wasm32"))]
pub type DefaultHost = MemoryHost;

/// An application's init/update/view/subscriptions contract.
pub trait Application {
	/// Startup data threaded through to `init` unchanged.
	type Flags;
	/// Application state.
	type Model;
	/// Application message.
	type Msg: 'static;
	/// Rendered output handed to the renderer callback.
	type View;

	/// Builds the initial model from the startup flags and the location
	/// the program started on, plus any commands to run immediately.
	fn init(&self, flags: Self::Flags, location: Location) -> (Self::Model, Vec<Command>);

	/// Applies one message to the model and returns the navigation
	/// commands to run this cycle.
	fn update(&self, msg: Self::Msg, model: &mut Self::Model) -> Vec<Command>;

	/// Renders the current model.
	fn view(&self, model: &Self::Model) -> Self::View;

	/// The location subscriptions the application declares for the
	/// current model. These are merged after the program's standing
	/// URL-change subscription.
	fn subscriptions(&self, model: &Self::Model) -> Vec<Subscription<Self::Msg>> {
		let _ = model;
		Vec::new()
	}
}

type Renderer<View> = Rc<dyn Fn(&View)>;

struct Runtime<A: Application, H: HistoryHost> {
	app: A,
	host: Rc<H>,
	model: RefCell<A::Model>,
	queue: RefCell<VecDeque<A::Msg>>,
	processing: Cell<bool>,
	bridge: RefCell<HistoryBridge<H, A::Msg>>,
	on_url_change: Arc<dyn Fn(Location) -> A::Msg>,
	renderer: RefCell<Option<Renderer<A::View>>>,
}

impl<A, H> Runtime<A, H>
where
	A: Application + 'static,
	H: HistoryHost + 'static,
{
	/// Drains the queue to completion: one update and one bridge cycle
	/// per message. Messages enqueued while draining (subscriber fan-out,
	/// native navigation events) are picked up by the same drain. The
	/// `processing` flag keeps nested sends from re-entering the bridge.
	fn process(runtime: &Rc<Self>) {
		if runtime.processing.get() {
			return;
		}
		runtime.processing.set(true);
		loop {
			let next = runtime.queue.borrow_mut().pop_front();
			let Some(msg) = next else {
				break;
			};
			let commands = {
				let mut model = runtime.model.borrow_mut();
				runtime.app.update(msg, &mut model)
			};
			runtime.cycle(commands);
		}
		runtime.processing.set(false);
		runtime.render();
	}

	/// Runs one bridge reconciliation cycle with the currently declared
	/// subscription set.
	fn cycle(&self, commands: Vec<Command>) {
		let subscriptions = self.merged_subscriptions();
		self.bridge.borrow_mut().run_cycle(commands, subscriptions);
	}

	/// The standing URL-change subscription, followed by whatever the
	/// application declares for the current model.
	fn merged_subscriptions(&self) -> Vec<Subscription<A::Msg>> {
		let standing = Subscription::new({
			let on_url_change = Arc::clone(&self.on_url_change);
			move |location| on_url_change(location)
		});
		let model = self.model.borrow();
		let mut subscriptions = vec![standing];
		subscriptions.extend(self.app.subscriptions(&model));
		subscriptions
	}

	fn render(&self) {
		let renderer = self.renderer.borrow().clone();
		if let Some(renderer) = renderer {
			let model = self.model.borrow();
			renderer(&self.app.view(&model));
		}
	}
}

/// A running application wired to the history bridge.
pub struct Program<A: Application, H: HistoryHost> {
	runtime: Rc<Runtime<A, H>>,
}

impl<A, H> Program<A, H>
where
	A: Application + 'static,
	H: HistoryHost + 'static,
{
	/// Starts `app` against an explicit host.
	///
	/// Captures the host's current location, runs `init` with it, then
	/// runs the first reconciliation cycle with the commands `init`
	/// returned and the merged subscription set.
	pub fn with_host(
		host: H,
		on_url_change: impl Fn(Location) -> A::Msg + 'static,
		app: A,
		flags: A::Flags,
	) -> Self {
		let host = Rc::new(host);
		let location = host.location();
		let (model, commands) = app.init(flags, location);

		let runtime = Rc::new_cyclic(|weak: &Weak<Runtime<A, H>>| {
			let sender = MessageSender::new({
				let weak = weak.clone();
				move |msg| {
					if let Some(runtime) = weak.upgrade() {
						runtime.queue.borrow_mut().push_back(msg);
						Runtime::process(&runtime);
					}
				}
			});
			Runtime {
				app,
				host: Rc::clone(&host),
				model: RefCell::new(model),
				queue: RefCell::new(VecDeque::new()),
				processing: Cell::new(false),
				bridge: RefCell::new(HistoryBridge::new(host, sender)),
				on_url_change: Arc::new(on_url_change),
				renderer: RefCell::new(None),
			}
		});

		// first cycle: init commands, subscriptions, listener
		runtime.processing.set(true);
		runtime.cycle(commands);
		runtime.processing.set(false);
		Runtime::process(&runtime);

		Program { runtime }
	}

	/// Feeds one message into the update loop.
	pub fn dispatch(&self, msg: A::Msg) {
		self.runtime.queue.borrow_mut().push_back(msg);
		Runtime::process(&self.runtime);
	}

	/// Registers the callback receiving each rendered view, and renders
	/// the current model immediately.
	pub fn on_render(&self, renderer: impl Fn(&A::View) + 'static) {
		*self.runtime.renderer.borrow_mut() = Some(Rc::new(renderer));
		self.runtime.render();
	}

	/// Renders the current model once.
	pub fn view(&self) -> A::View {
		let model = self.runtime.model.borrow();
		self.runtime.app.view(&model)
	}

	/// Runs `f` against the current model.
	pub fn with_model<R>(&self, f: impl FnOnce(&A::Model) -> R) -> R {
		f(&self.runtime.model.borrow())
	}

	/// The host this program runs against.
	pub fn host(&self) -> Rc<H> {
		Rc::clone(&self.runtime.host)
	}

	/// Whether the bridge's listener is attached.
	pub fn has_listener(&self) -> bool {
		self.runtime.bridge.borrow().has_listener()
	}
}

/// Starts an application whose messages track every location change.
///
/// `on_url_change` converts each captured [`Location`] into an application
/// message; the program keeps a standing subscription with it, so both
/// self-initiated and user-initiated navigation reach `update`. The
/// starting location is handed to `init`, letting first-render state
/// depend on the URL the application was opened on.
pub fn program<A>(
	on_url_change: impl Fn(Location) -> A::Msg + 'static,
	app: A,
) -> Result<Program<A, DefaultHost>, HostError>
where
	A: Application<Flags = ()> + 'static,
{
	program_with_flags(on_url_change, app, ())
}

/// Same as [`program`], threading startup flags into `init` unchanged.
pub fn program_with_flags<A>(
	on_url_change: impl Fn(Location) -> A::Msg + 'static,
	app: A,
	flags: A::Flags,
) -> Result<Program<A, DefaultHost>, HostError>
where
	A: Application + 'static,
{
	#[cfg(target_arch = "wasm32")]
	let host = BrowserHost::new()?;
	#[cfg(not(target_arch = "wasm32"))]
	let host = MemoryHost::new();

	Ok(Program::with_host(host, on_url_change, app, flags))
}
