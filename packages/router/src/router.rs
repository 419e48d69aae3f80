//! The router controller.
//!
//! A [`Router`] owns one [`HistoryStack`] and reconciles it with the
//! platform's native history: programmatic navigations push both, while
//! platform-driven activations (back/forward) arrive through the
//! subscription and are classified against the stack. Before a view is
//! switched away its live state is snapshotted back into its entry, which is
//! what makes going back restore the exact prior state instead of the state
//! the view started in.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use nebula_history::PlatformHistory;

use crate::codec::{self, Props};
use crate::error::RouterError;
use crate::renderer::{ContainerId, FirstRenderCallback, Renderer, ViewHandle};
use crate::scheduler::{FrameScheduler, SchedulerId};
use crate::stack::{HistoryEntry, HistoryStack, TransitionType};
use crate::transition::{Rect, ZoomOptions, ZoomTransition};

static NEXT_ROUTER_ID: AtomicU64 = AtomicU64::new(0);

/// Settings of the animated transition between views.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Length of one transition in seconds.
    pub duration_seconds: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 0.5,
        }
    }
}

/// Configuration for [`Router::start`], following the builder pattern.
///
/// The three collaborators are mandatory; everything else has a default:
/// initial props come from the current URL, no default props, no transition
/// (views replace each other in the single root container).
pub struct RouterConfig {
    history: Rc<dyn PlatformHistory>,
    renderer: Rc<dyn Renderer>,
    scheduler: Rc<dyn FrameScheduler>,
    props: Option<Props>,
    default_props: Option<Props>,
    transition: Option<TransitionConfig>,
}

impl RouterConfig {
    /// Create a configuration over the given collaborators.
    pub fn new(
        history: Rc<dyn PlatformHistory>,
        renderer: Rc<dyn Renderer>,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Self {
        Self {
            history,
            renderer,
            scheduler,
            props: None,
            default_props: None,
            transition: None,
        }
    }

    /// Override the initial props instead of resolving them from the URL.
    pub fn props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    /// Props to substitute when the resolved initial props are empty.
    ///
    /// Empty, not absent: an explicit empty override suppresses the URL but
    /// still picks up these defaults.
    pub fn default_props(mut self, props: Props) -> Self {
        self.default_props = Some(props);
        self
    }

    /// Animate between views with a zoom transition.
    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = Some(transition);
        self
    }
}

struct RouterInner {
    stack: HistoryStack,
    current_view: Option<Rc<dyn ViewHandle>>,
    current_container: Option<ContainerId>,
    transition: Option<TransitionConfig>,
    history: Rc<dyn PlatformHistory>,
    renderer: Rc<dyn Renderer>,
    scheduler: Rc<dyn FrameScheduler>,
    id: SchedulerId,
    stopped: bool,
}

/// The router. One instance is expected per page/app session.
pub struct Router {
    inner: Rc<RefCell<RouterInner>>,
}

impl Router {
    /// Start routing: resolve the initial props, record them as the initial
    /// native entry (replace, not push, so backing past the first view
    /// behaves), subscribe to platform activations and load the first view.
    ///
    /// Fails when the initial props cannot be resolved to a registered view.
    pub fn start(config: RouterConfig) -> Result<Self, RouterError> {
        let RouterConfig {
            history,
            renderer,
            scheduler,
            props,
            default_props,
            transition,
        } = config;

        let mut initial_props = match props {
            Some(props) => props,
            None => history
                .current_query()
                .map(|query| codec::decode(&query))
                .unwrap_or_default(),
        };
        if initial_props.is_empty() {
            if let Some(defaults) = default_props {
                initial_props = defaults;
            }
        }

        let id = SchedulerId(NEXT_ROUTER_ID.fetch_add(1, Ordering::Relaxed));
        let inner = Rc::new(RefCell::new(RouterInner {
            stack: HistoryStack::new(),
            current_view: None,
            current_container: None,
            transition,
            history: history.clone(),
            renderer,
            scheduler,
            id,
            stopped: false,
        }));

        let weak = Rc::downgrade(&inner);
        history.subscribe(Rc::new(move |payload| {
            // some platforms fire a payload-less event right after page
            // load; there is nothing to do for it
            let Some(props) = payload else { return };
            let Some(inner) = weak.upgrade() else { return };
            Self::handle_platform_entry(&inner, props);
        }));

        // the initial native entry must carry the first view's props for
        // when the user navigates back to it
        history.replace(initial_props.clone(), &history.current_url());

        Self::reset_history(&inner);
        let router = Self { inner };
        router.load_entry(HistoryEntry::new(initial_props))?;
        Ok(router)
    }

    /// Navigate to `href`, optionally anchoring the transition to the
    /// bounds of the element that triggered it.
    ///
    /// The props are decoded from the suffix after the last `?` of `href`.
    /// On platforms without native entry manipulation this degrades to a
    /// hard load and reports [`TransitionType::Noop`], since the in-memory
    /// state is left untouched.
    pub fn navigate(
        &self,
        href: &str,
        origin_bounds: Option<Rect>,
    ) -> Result<TransitionType, RouterError> {
        {
            let r = self.inner.borrow();
            if r.stopped {
                return Ok(TransitionType::Noop);
            }
            if !r.history.can_push() {
                r.history.external(href);
                return Ok(TransitionType::Noop);
            }
        }

        let query = href.rsplit_once('?').map(|(_, query)| query).unwrap_or("");
        let props = codec::decode(query);

        // a programmatic push does not fire the platform's entry-activated
        // event, so the entry is loaded here as well
        let history = self.inner.borrow().history.clone();
        history.push(props.clone(), href);

        let mut entry = HistoryEntry::new(props);
        entry.origin_bounds = origin_bounds;
        Self::load_entry_inner(&self.inner, entry)
    }

    /// Push `entry` through the history stack and mount the resulting view.
    ///
    /// A [`TransitionType::Noop`] outcome changes nothing at all. For every
    /// other outcome the entry actually at the new index is mounted — it can
    /// differ from the pushed one, since BACK and FORWARD reuse stored
    /// entries.
    pub fn load_entry(&self, entry: HistoryEntry) -> Result<TransitionType, RouterError> {
        Self::load_entry_inner(&self.inner, entry)
    }

    /// Unbind from platform events. The router mutates nothing after this.
    pub fn stop(&self) {
        let history = {
            let mut r = self.inner.borrow_mut();
            r.stopped = true;
            r.history.clone()
        };
        history.unsubscribe();
    }

    /// Read access to the in-memory history stack.
    pub fn history(&self) -> Ref<'_, HistoryStack> {
        Ref::map(self.inner.borrow(), |r| &r.stack)
    }

    fn handle_platform_entry(inner: &Rc<RefCell<RouterInner>>, props: Props) {
        let needs_reset = {
            let r = inner.borrow();
            if r.stopped {
                return;
            }
            // The native history can outlive this stack (it survives a page
            // reload, the stack does not). An activated entry the stack
            // cannot explain means the two have diverged, and direction
            // inference is only sound for entries this router has observed.
            !r.stack.is_empty() && !r.stack.can_reuse_props_in_history(&props)
        };
        if needs_reset {
            debug!("platform entry not explainable by in-memory history, resetting");
            Self::reset_history(inner);
        }
        if let Err(err) = Self::load_entry_inner(inner, HistoryEntry::new(props)) {
            error!(error = %err, "failed to load platform-activated entry");
        }
    }

    fn reset_history(inner: &Rc<RefCell<RouterInner>>) {
        let renderer = {
            let mut r = inner.borrow_mut();
            r.stack = HistoryStack::new();
            r.current_view = None;
            r.current_container = None;
            r.renderer.clone()
        };
        renderer.clear_root();
    }

    fn load_entry_inner(
        inner: &Rc<RefCell<RouterInner>>,
        entry: HistoryEntry,
    ) -> Result<TransitionType, RouterError> {
        let mut r = inner.borrow_mut();

        // write the live view's state back into the entry being left, so
        // that returning to it later resumes its exact form
        let snapshot = r.current_view.as_ref().map(|view| view.generate_snapshot());
        if let Some(snapshot) = snapshot {
            if let Some(current) = r.stack.current_mut() {
                current.props = snapshot;
            }
        }

        let transition_type = r.stack.push(entry);
        if transition_type == TransitionType::Noop {
            return Ok(transition_type);
        }

        // re-read the entry at the new index; BACK and FORWARD reuse stored
        // entries, so it can differ from the one pushed above
        let current = r
            .stack
            .current()
            .expect("stack holds an entry after a non-noop push");
        let entry_props = current.props.clone();
        let query_string = current.query_string().to_string();

        // transitions need both views on screen at once, each in its own
        // container; static routing reuses the single root container
        let container = if r.transition.is_some() {
            r.renderer.create_container(&query_string)
        } else {
            r.renderer.root_container()
        };
        let prev_container = r.current_container.replace(container);

        let renderer = r.renderer.clone();
        let duration = r.transition.map(|transition| transition.duration_seconds);
        let weak = Rc::downgrade(inner);
        let on_first_render: FirstRenderCallback = Box::new(move || {
            // the container joins the visible tree only after the view in it
            // has rendered once
            renderer.attach_container(container);
            let Some(duration_seconds) = duration else { return };
            let Some(inner) = weak.upgrade() else { return };
            let r = inner.borrow();
            ZoomTransition::run(
                &r.renderer,
                r.scheduler.as_ref(),
                r.id,
                &r.stack,
                ZoomOptions {
                    prev_container,
                    next_container: container,
                    transition_type,
                    duration_seconds,
                },
            );
        });

        let renderer = r.renderer.clone();
        drop(r);
        match renderer.mount(&entry_props, container, on_first_render) {
            Ok(handle) => {
                inner.borrow_mut().current_view = Some(handle);
                Ok(transition_type)
            }
            Err(err) => {
                inner.borrow_mut().current_container = prev_container;
                Err(err)
            }
        }
    }
}
