//! The transition-classified history stack.
//!
//! Stores a history of previous view configurations with a stateful index
//! pointing at the current position, similar to the native pushState history
//! but with access to all previous entries (which can be updated at any
//! time). Entries are identified by their encoded query string, which lets
//! the stack recognize a push as a return to a neighbouring entry and reuse
//! that entry — live state included — instead of loading it from scratch.

use tracing::trace;

use crate::codec::{self, Props};
use crate::transition::Rect;

/// Classification of a [`HistoryStack::push`] outcome.
///
/// Not stored anywhere: it is returned once to the caller, which uses it to
/// decide rendering and animation behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionType {
    /// The pushed entry is identical to the current one; nothing changed.
    Noop,
    /// The stack was empty; this is the first entry.
    Initial,
    /// The pushed entry starts a new branch, discarding any forward entries.
    New,
    /// The pushed entry matches the immediate predecessor, which is reused.
    Back,
    /// The pushed entry matches the immediate successor, which is reused.
    Forward,
}

/// One navigable configuration plus its cached identity string and arbitrary
/// metadata.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// The view configuration. May be overwritten later with a live snapshot
    /// of the mounted view; the cached identity string is not recomputed
    /// when that happens.
    pub props: Props,
    /// Arbitrary data riding along with the entry.
    pub meta_data: Props,
    /// The on-screen rectangle of the element that triggered the navigation
    /// to this entry, used to anchor zoom transitions away from it.
    pub origin_bounds: Option<Rect>,
    query_string: String,
}

impl HistoryEntry {
    /// Create an entry for `props`. The identity string is computed when the
    /// entry is pushed, not here.
    pub fn new(props: Props) -> Self {
        Self {
            props,
            meta_data: Props::new(),
            origin_bounds: None,
            query_string: String::new(),
        }
    }

    /// Attach the bounds of the element that triggered this navigation.
    pub fn with_origin_bounds(mut self, bounds: Rect) -> Self {
        self.origin_bounds = Some(bounds);
        self
    }

    /// Attach metadata to the entry.
    pub fn with_meta_data(mut self, meta_data: Props) -> Self {
        self.meta_data = meta_data;
        self
    }

    /// The cached identity string, memoized at push time. This is the sole
    /// equality key between entries; props are never compared structurally.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Copy everything except identity off `pushed`: metadata keys overwrite
    /// existing ones, a present `origin_bounds` replaces the stored one.
    /// Props and query string of the reused entry win.
    fn merge_from(&mut self, pushed: HistoryEntry) {
        for (key, value) in pushed.meta_data {
            self.meta_data.insert(key, value);
        }
        if pushed.origin_bounds.is_some() {
            self.origin_bounds = pushed.origin_bounds;
        }
    }
}

/// Ordered sequence of [`HistoryEntry`]s with a current-index pointer.
///
/// Only [`push`](HistoryStack::push) mutates the index or the length (a NEW
/// transition truncates the forward entries irrecoverably — there is no
/// "redo after branch"). A stack starts empty; routers build a fresh one
/// whenever the platform history stops being explainable by this one.
#[derive(Default)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl HistoryStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `entry` and classify the result.
    ///
    /// The entry's identity string is computed here, then compared against
    /// the current entry and its direct neighbours:
    ///
    /// - equal to the current entry → [`TransitionType::Noop`], the stack is
    ///   left completely untouched;
    /// - equal to the predecessor → [`TransitionType::Back`], the index moves
    ///   back and the existing entry is reused verbatim (the pushed entry is
    ///   discarded);
    /// - equal to the successor → [`TransitionType::Forward`], the index
    ///   moves forward and the pushed metadata is merged onto the existing
    ///   entry (reused props win over the pushed ones);
    /// - anything else → [`TransitionType::New`], every entry after the old
    ///   index is dropped and the pushed entry appended.
    pub fn push(&mut self, mut entry: HistoryEntry) -> TransitionType {
        entry.query_string = codec::encode(&entry.props);

        if self.entries.is_empty() {
            self.index = 0;
            self.entries.push(entry);
            trace!(index = self.index, "history: initial entry");
            return TransitionType::Initial;
        }

        if entry.query_string == self.entries[self.index].query_string {
            trace!(index = self.index, "history: noop push");
            return TransitionType::Noop;
        }

        if self.index > 0 && entry.query_string == self.entries[self.index - 1].query_string {
            self.index -= 1;
            trace!(index = self.index, "history: back to previous entry");
            return TransitionType::Back;
        }

        self.index += 1;
        if let Some(next) = self.entries.get_mut(self.index) {
            if next.query_string == entry.query_string {
                next.merge_from(entry);
                trace!(index = self.index, "history: forward to next entry");
                return TransitionType::Forward;
            }
        }

        // a new branch erases any previously recorded future
        self.entries.truncate(self.index);
        self.entries.push(entry);
        trace!(
            index = self.index,
            len = self.entries.len(),
            "history: new entry"
        );
        TransitionType::New
    }

    /// Whether pushing `props` would reuse an existing entry (or be a noop)
    /// instead of creating a new branch.
    ///
    /// Same three-way neighbour comparison as [`push`](HistoryStack::push),
    /// without any mutation. Callers use this to check whether an incoming
    /// platform navigation is explainable by this stack before trusting it
    /// for direction inference.
    pub fn can_reuse_props_in_history(&self, props: &Props) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let query_string = codec::encode(props);
        [self.index.checked_sub(1), Some(self.index), Some(self.index + 1)]
            .into_iter()
            .flatten()
            .filter_map(|index| self.entries.get(index))
            .any(|entry| entry.query_string == query_string)
    }

    /// The entry at the current index, if any.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    /// Mutable access to the entry at the current index, if any.
    ///
    /// Used by the router to overwrite the current entry's props with a live
    /// snapshot before navigating away. The identity string is deliberately
    /// left as computed at push time.
    pub fn current_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.entries.get_mut(self.index)
    }

    /// The entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// The current index. Meaningless while the stack is empty.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry(name: &str) -> HistoryEntry {
        let mut props = Props::new();
        props.insert("component".into(), json!(name));
        HistoryEntry::new(props)
    }

    #[test]
    fn first_push_is_initial() {
        let mut stack = HistoryStack::new();
        assert_eq!(stack.push(entry("A")), TransitionType::Initial);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.index(), 0);
    }

    #[test]
    fn identical_push_is_a_complete_noop() {
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        stack.push(entry("B"));
        assert_eq!(stack.push(entry("B")), TransitionType::Noop);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.index(), 1);
    }

    #[test]
    fn pushing_the_predecessor_goes_back() {
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        stack.push(entry("B"));
        stack.push(entry("C"));
        assert_eq!(stack.push(entry("B")), TransitionType::Back);
        assert_eq!(stack.index(), 1);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn only_the_immediate_predecessor_counts_as_back() {
        // A is in the stack, but it is not C's predecessor, so pushing it
        // must branch instead of rewinding two steps.
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        stack.push(entry("B"));
        stack.push(entry("C"));
        assert_eq!(stack.push(entry("A")), TransitionType::New);
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.index(), 3);
    }

    #[test]
    fn back_reuses_the_existing_entry_verbatim() {
        let mut stack = HistoryStack::new();
        let mut first = entry("A");
        first.props.insert("state".into(), json!({"scroll": 120}));
        stack.push(first);
        stack.push(entry("B"));

        // pushing A's identity with extra metadata rewinds; the stored entry
        // keeps its own props and the pushed metadata is discarded
        let mut back = entry("A");
        back.props.insert("state".into(), json!({"scroll": 120}));
        back.meta_data.insert("ignored".into(), json!(true));
        assert_eq!(stack.push(back), TransitionType::Back);
        let current = stack.current().unwrap();
        assert_eq!(current.props["state"], json!({"scroll": 120}));
        assert!(current.meta_data.is_empty());
    }

    #[test]
    fn new_branch_truncates_the_future() {
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        stack.push(entry("B"));
        stack.push(entry("C"));
        stack.push(entry("B")); // back, index 1, C still stored

        assert_eq!(stack.push(entry("D")), TransitionType::New);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.index(), 2);
        assert_eq!(stack.get(2).unwrap().query_string(), "component=D");
        // C is gone for good
        assert!(!stack.can_reuse_props_in_history(&entry("C").props));
    }

    #[test]
    fn forward_merges_metadata_but_keeps_reused_props() {
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        let mut second = entry("B");
        second.props.insert("state".into(), json!({"page": 2}));
        second.meta_data.insert("kept".into(), json!("old"));
        stack.push(second);
        stack.push(entry("A")); // back to index 0

        let mut forward = entry("B");
        forward.props.insert("state".into(), json!({"page": 2}));
        forward.meta_data.insert("foo".into(), json!(1));
        assert_eq!(stack.push(forward), TransitionType::Forward);
        assert_eq!(stack.index(), 1);

        let current = stack.current().unwrap();
        assert_eq!(current.meta_data["foo"], json!(1));
        assert_eq!(current.meta_data["kept"], json!("old"));
        assert_eq!(current.props["state"], json!({"page": 2}));
    }

    #[test]
    fn forward_merge_replaces_origin_bounds_when_present() {
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        stack.push(entry("B").with_origin_bounds(Rect {
            width: 10.0,
            height: 10.0,
            x: 0.0,
            y: 0.0,
        }));
        stack.push(entry("A"));

        let bounds = Rect {
            width: 50.0,
            height: 50.0,
            x: 10.0,
            y: 20.0,
        };
        stack.push(entry("B").with_origin_bounds(bounds));
        assert_eq!(stack.current().unwrap().origin_bounds, Some(bounds));
    }

    #[test]
    fn reuse_predicate_checks_only_direct_neighbours() {
        let mut stack = HistoryStack::new();
        assert!(!stack.can_reuse_props_in_history(&entry("A").props));
        stack.push(entry("A"));
        stack.push(entry("B"));
        stack.push(entry("C"));
        stack.push(entry("B")); // index 1

        assert!(stack.can_reuse_props_in_history(&entry("A").props));
        assert!(stack.can_reuse_props_in_history(&entry("B").props));
        assert!(stack.can_reuse_props_in_history(&entry("C").props));
        assert!(!stack.can_reuse_props_in_history(&entry("D").props));

        stack.push(entry("C")); // index 2, at the end
        assert!(!stack.can_reuse_props_in_history(&entry("A").props));
    }

    #[test]
    fn snapshot_overwrite_keeps_the_identity_string() {
        let mut stack = HistoryStack::new();
        stack.push(entry("A"));
        let before = stack.current().unwrap().query_string().to_string();
        stack
            .current_mut()
            .unwrap()
            .props
            .insert("state".into(), json!({"scroll": 7}));
        assert_eq!(stack.current().unwrap().query_string(), before);
        // the live state does not change the entry's identity
        assert!(stack.can_reuse_props_in_history(&entry("A").props));
    }
}
