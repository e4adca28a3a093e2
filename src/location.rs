//! Address-bar snapshot.
//!
//! A [`Location`] describes the address bar at the moment of capture. It is
//! plain data: the host capability produces a fresh snapshot on every
//! navigation, and the previous one is simply superseded. Nothing in this
//! crate parses or validates the captured strings; the fields mirror the
//! platform's own decomposition of the current URL.

use serde::{Deserialize, Serialize};

/// An immutable snapshot of the address-bar state.
///
/// Snapshots have no identity beyond their field values. Two captures of
/// the same address compare equal, and application code is expected to keep
/// the most recent snapshot rather than mutate an old one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
	/// The full URL, e.g. `https://example.org:8080/path?q=1#top`.
	pub href: String,
	/// Host including the port when present, e.g. `example.org:8080`.
	pub host: String,
	/// Host without the port, e.g. `example.org`.
	pub hostname: String,
	/// URL scheme including the trailing colon, e.g. `https:`.
	pub protocol: String,
	/// Scheme and host together, e.g. `https://example.org:8080`.
	pub origin: String,
	/// Port as a string; empty when the URL carries none.
	pub port: String,
	/// Path component, e.g. `/path`.
	pub pathname: String,
	/// Query string including the leading `?`; empty when absent.
	pub search: String,
	/// Fragment including the leading `#`; empty when absent.
	pub hash: String,
	/// Username from the URL authority; usually empty.
	pub username: String,
	/// Password from the URL authority; usually empty.
	pub password: String,
}
