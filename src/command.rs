//! Navigation commands.
//!
//! A [`Command`] is a requested, not-yet-applied navigation action issued by
//! application code during a single update cycle. The history bridge
//! executes the commands of a cycle sequentially, in the order they were
//! issued. URLs are carried as opaque strings; no validation is performed.

use serde::{Deserialize, Serialize};

/// A requested navigation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
	/// Move within the existing history stack. Negative steps go back,
	/// positive steps go forward. Steps beyond the available entries are
	/// a no-op.
	Jump(i32),
	/// Add a new history entry for the given URL.
	PushUrl(String),
	/// Replace the current history entry with the given URL.
	ReplaceUrl(String),
	/// Leave the application and perform a full page load of the given URL.
	Load(String),
	/// Reload the current page.
	Reload {
		/// Ask the host to bypass its cache when reloading.
		skip_cache: bool,
	},
}

/// Step back `n` entries in the history stack.
pub fn back(n: u32) -> Command {
	Command::Jump(-(n as i32))
}

/// Step forward `n` entries in the history stack.
pub fn forward(n: u32) -> Command {
	Command::Jump(n as i32)
}

/// Push a new history entry for `url` and notify subscribers.
pub fn new_url(url: impl Into<String>) -> Command {
	Command::PushUrl(url.into())
}

/// Replace the current history entry with `url` and notify subscribers.
pub fn modify_url(url: impl Into<String>) -> Command {
	Command::ReplaceUrl(url.into())
}

/// Leave the application entirely and load `url` as a new document.
pub fn load(url: impl Into<String>) -> Command {
	Command::Load(url.into())
}

/// Reload the current page.
pub fn reload() -> Command {
	Command::Reload { skip_cache: false }
}

/// Reload the current page, bypassing the host's cache.
pub fn reload_and_skip_cache() -> Command {
	Command::Reload { skip_cache: true }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_back_is_negative_jump() {
		assert_eq!(back(1), Command::Jump(-1));
		assert_eq!(back(3), Command::Jump(-3));
	}

	#[test]
	fn test_forward_is_positive_jump() {
		assert_eq!(forward(1), Command::Jump(1));
		assert_eq!(forward(2), Command::Jump(2));
	}

	#[test]
	fn test_url_commands_keep_strings_opaque() {
		// No validation: anything the caller supplies is carried as-is
		assert_eq!(
			new_url("not a url at all"),
			Command::PushUrl("not a url at all".to_string())
		);
		assert_eq!(
			modify_url("/profile?tab=2"),
			Command::ReplaceUrl("/profile?tab=2".to_string())
		);
	}

	#[test]
	fn test_reload_variants() {
		assert_eq!(reload(), Command::Reload { skip_cache: false });
		assert_eq!(
			reload_and_skip_cache(),
			Command::Reload { skip_cache: true }
		);
	}
}
