//! Grappelli - Browser History for WASM Single-Page Applications
//!
//! A small integration layer between the browser's History API and a
//! message-driven application loop: application code changes the visible
//! URL and reacts to URL changes without full page reloads, and every
//! navigation (self-initiated or user-initiated) arrives as an ordinary
//! application message.
//!
//! ## Features
//!
//! - **Narrow host capability**: all platform access goes through the
//!   [`HistoryHost`] trait, so an in-memory fake substitutes for the real
//!   browser and the whole loop is testable without a host environment
//! - **Commands as values**: [`back`], [`forward`], [`new_url`],
//!   [`modify_url`], [`load`] and [`reload`] return plain [`Command`]
//!   values that `update` hands back to the runtime
//! - **Listener lifecycle**: native `popstate` (and `hashchange` where the
//!   engine needs it) listeners exist exactly while subscribers do
//! - **Low-level only**: built on wasm-bindgen, web-sys, and js-sys
//!
//! ## Architecture
//!
//! - [`location`]: the immutable address-bar snapshot
//! - [`command`]: navigation commands and their constructors
//! - [`host`]: the platform capability, `BrowserHost` on `wasm32` and
//!   [`MemoryHost`] everywhere else (and in every test)
//! - [`bridge`]: per-cycle reconciliation of commands, subscriptions and
//!   the listener task
//! - [`program`]: the runtime adapter wrapping an [`Application`]
//!
//! ## Example
//!
//! ```ignore
//! use grappelli::{new_url, program, Application, Command, Location};
//!
//! enum Msg {
//!     UrlChanged(Location),
//!     OpenSettings,
//! }
//!
//! struct App;
//!
//! impl Application for App {
//!     type Flags = ();
//!     type Model = String;
//!     type Msg = Msg;
//!     type View = String;
//!
//!     fn init(&self, _flags: (), location: Location) -> (String, Vec<Command>) {
//!         (location.pathname, Vec::new())
//!     }
//!
//!     fn update(&self, msg: Msg, model: &mut String) -> Vec<Command> {
//!         match msg {
//!             Msg::UrlChanged(location) => {
//!                 *model = location.pathname;
//!                 Vec::new()
//!             }
//!             Msg::OpenSettings => vec![new_url("/settings")],
//!         }
//!     }
//!
//!     fn view(&self, model: &String) -> String {
//!         format!("current page: {model}")
//!     }
//! }
//!
//! let app = program(Msg::UrlChanged, App)?;
//! app.dispatch(Msg::OpenSettings);
//! ```

#![warn(missing_docs)]

// Core modules
pub mod bridge;
pub mod command;
pub mod host;
pub mod location;
pub mod logging;
pub mod program;

pub use bridge::{HistoryBridge, MessageSender, Subscription};
pub use command::{
	Command, back, forward, load, modify_url, new_url, reload, reload_and_skip_cache,
};
#[cfg(target_arch = "wasm32")]
pub use host::browser::BrowserHost;
pub use host::browser::{BrowserHostOptions, FallbackEvent};
pub use host::memory::{CallLog, MemoryHost};
pub use host::{HistoryHost, HostError};
pub use location::Location;
pub use program::{Application, DefaultHost, Program, program, program_with_flags};
