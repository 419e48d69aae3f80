use std::cell::RefCell;

use tracing::debug;

use crate::{EntryCallback, PlatformHistory, Props};

struct MemoryHistoryState {
    current: (Props, String),
    past: Vec<(Props, String)>,
    future: Vec<(Props, String)>,
    callback: Option<EntryCallback>,
    external: Option<String>,
}

/// A [`PlatformHistory`] that stores all navigation information in memory.
///
/// Beyond the trait surface it exposes [`go_back`](MemoryHistory::go_back) and
/// [`go_forward`](MemoryHistory::go_forward), which play the part of the
/// browser's back and forward buttons: they activate a neighbouring entry and
/// fire the subscribed callback with that entry's props.
pub struct MemoryHistory {
    state: RefCell<MemoryHistoryState>,
    push_support: bool,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::with_initial_url("nebula://index.html/")
    }
}

impl MemoryHistory {
    /// Create a [`MemoryHistory`] whose first entry is reachable under `url`.
    ///
    /// The first entry starts with empty props; a router records the real
    /// initial props via [`replace`](PlatformHistory::replace).
    pub fn with_initial_url(url: impl ToString) -> Self {
        Self {
            state: RefCell::new(MemoryHistoryState {
                current: (Props::new(), url.to_string()),
                past: Vec::new(),
                future: Vec::new(),
                callback: None,
                external: None,
            }),
            push_support: true,
        }
    }

    /// Disable in-place entry manipulation, forcing callers onto the hard
    /// load fallback. Models legacy platforms without `pushState`.
    pub fn without_push_support(mut self) -> Self {
        self.push_support = false;
        self
    }

    /// Activate the previous entry and notify the subscriber, like a
    /// browser's back button.
    pub fn go_back(&self) {
        let activated = {
            let mut state = self.state.borrow_mut();
            let Some(prev) = state.past.pop() else {
                return;
            };
            let old = std::mem::replace(&mut state.current, prev);
            state.future.push(old);
            state.current.0.clone()
        };
        self.notify(Some(activated));
    }

    /// Activate the next entry and notify the subscriber, like a browser's
    /// forward button.
    pub fn go_forward(&self) {
        let activated = {
            let mut state = self.state.borrow_mut();
            let Some(next) = state.future.pop() else {
                return;
            };
            let old = std::mem::replace(&mut state.current, next);
            state.past.push(old);
            state.current.0.clone()
        };
        self.notify(Some(activated));
    }

    /// Fire the payload-less event some browsers deliver right after page
    /// load. Subscribers are expected to ignore it.
    pub fn emit_synthetic_event(&self) {
        self.notify(None);
    }

    /// The number of entries the platform knows about.
    pub fn len(&self) -> usize {
        let state = self.state.borrow();
        state.past.len() + 1 + state.future.len()
    }

    /// Whether the history holds only its initial entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// The URL handed to [`external`](PlatformHistory::external), if a hard
    /// load was requested.
    pub fn external_target(&self) -> Option<String> {
        self.state.borrow().external.clone()
    }

    fn notify(&self, payload: Option<Props>) {
        // the callback may re-enter the history, so call it without the borrow
        let callback = self.state.borrow().callback.clone();
        if let Some(callback) = callback {
            callback(payload);
        }
    }
}

impl PlatformHistory for MemoryHistory {
    fn current_url(&self) -> String {
        self.state.borrow().current.1.clone()
    }

    fn current_query(&self) -> Option<String> {
        let state = self.state.borrow();
        state
            .current
            .1
            .split_once('?')
            .map(|(_, query)| query.to_string())
    }

    fn replace(&self, props: Props, url: &str) {
        let mut state = self.state.borrow_mut();
        state.current = (props, url.to_string());
    }

    fn push(&self, props: Props, url: &str) {
        let mut state = self.state.borrow_mut();
        let old = std::mem::replace(&mut state.current, (props, url.to_string()));
        state.past.push(old);
        state.future.clear();
    }

    fn can_push(&self) -> bool {
        self.push_support
    }

    fn external(&self, url: &str) {
        debug!(url, "hard load requested");
        self.state.borrow_mut().external = Some(url.to_string());
    }

    fn subscribe(&self, callback: EntryCallback) {
        self.state.borrow_mut().callback = Some(callback);
    }

    fn unsubscribe(&self) {
        self.state.borrow_mut().callback = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    fn props(pairs: &[(&str, serde_json::Value)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn push_clears_future() {
        let history = MemoryHistory::default();
        history.push(props(&[("a", json!(1))]), "?a=1");
        history.go_back();
        assert_eq!(history.len(), 2);
        history.push(props(&[("b", json!(2))]), "?b=2");
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_url(), "?b=2");
    }

    #[test]
    fn replace_keeps_length() {
        let history = MemoryHistory::default();
        history.replace(props(&[("a", json!(1))]), "?a=1");
        assert!(history.is_empty());
        assert_eq!(history.current_query().as_deref(), Some("a=1"));
    }

    #[test]
    fn back_and_forward_notify_with_activated_props() {
        let history = MemoryHistory::default();
        let seen: Rc<RefCell<Vec<Option<Props>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        history.subscribe(Rc::new(move |payload| sink.borrow_mut().push(payload)));

        history.replace(props(&[("a", json!(1))]), "?a=1");
        history.push(props(&[("b", json!(2))]), "?b=2");
        history.go_back();
        history.go_forward();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Some(props(&[("a", json!(1))])));
        assert_eq!(seen[1], Some(props(&[("b", json!(2))])));
    }

    #[test]
    fn synthetic_event_has_no_payload() {
        let history = MemoryHistory::default();
        let seen: Rc<RefCell<Vec<Option<Props>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        history.subscribe(Rc::new(move |payload| sink.borrow_mut().push(payload)));
        history.emit_synthetic_event();
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let history = MemoryHistory::default();
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        history.subscribe(Rc::new(move |_| *sink.borrow_mut() += 1));
        history.push(Props::new(), "?x=1");
        history.unsubscribe();
        history.go_back();
        assert_eq!(*seen.borrow(), 0);
    }
}
