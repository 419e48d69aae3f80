//! Platform history integration
//!
//! The router core relies on a [`PlatformHistory`] to talk to whatever owns the
//! native navigation state. On the web that is `window.history` and the
//! `popstate` event; in tests and non-web hosts it is [`MemoryHistory`].
//!
//! A [`PlatformHistory`] stores the active entry (a props payload plus the URL
//! it is reachable under) and notifies a single subscriber whenever the
//! platform activates an entry on its own, i.e. through back/forward
//! navigation. The notification carries only the entry's props: the platform
//! cannot tell the subscriber which direction was taken.

use std::rc::Rc;

mod memory;
pub use memory::*;

/// The props payload attached to every navigable entry.
///
/// Values are structured: a prop can be a string, a number, a bool, or nested
/// JSON. The router's codec is responsible for mapping this to and from the
/// URL query string.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Callback invoked when the platform activates a history entry.
///
/// The payload is `None` for the synthetic event some platforms fire right
/// after page load. Subscribers must ignore those.
pub type EntryCallback = Rc<dyn Fn(Option<Props>)>;

/// An integration with some kind of native navigation history.
///
/// All methods take `&self`; implementations are expected to live on a single
/// thread and use interior mutability, matching the cooperative scheduling
/// model of the router core.
pub trait PlatformHistory {
    /// The full URL of the currently active entry.
    #[must_use]
    fn current_url(&self) -> String;

    /// The query portion of the current URL, without the leading `?`.
    ///
    /// Returns `None` when the URL carries no query string.
    #[must_use]
    fn current_query(&self) -> Option<String>;

    /// Replace the active entry in place. Does not notify the subscriber.
    ///
    /// Used to record the initial entry so that navigating back past the
    /// first view restores its props instead of a payload-less state.
    fn replace(&self, props: Props, url: &str);

    /// Push a new entry and make it active. Does not notify the subscriber;
    /// programmatic pushes and platform-driven activations are handled
    /// separately by the caller.
    fn push(&self, props: Props, url: &str);

    /// Whether this platform supports in-place entry manipulation.
    ///
    /// When this is `false` the router falls back to hard loads via
    /// [`external`](PlatformHistory::external).
    #[must_use]
    fn can_push(&self) -> bool {
        true
    }

    /// Perform a hard load of `url`, leaving the current document entirely.
    fn external(&self, url: &str);

    /// Register the subscriber for entry-activated events. A later call
    /// replaces the earlier subscriber; there is at most one.
    fn subscribe(&self, callback: EntryCallback);

    /// Drop the subscriber. Entry activations after this are not delivered.
    fn unsubscribe(&self);
}
