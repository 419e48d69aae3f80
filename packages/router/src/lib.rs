//! nebula-router
//!
//! A component router for single-page apps. Views are addressed by a props
//! payload that round-trips through the URL query string, navigations are
//! classified against an in-memory history stack (so going "back" restores
//! the exact state a view was left in), and moving between views can be
//! animated with a shared-element zoom transition anchored to the element
//! that triggered the navigation.
//!
//! The router renders nothing itself. Rendering, DOM glue and frame timing
//! are collaborators behind the [`renderer::Renderer`] and
//! [`scheduler::FrameScheduler`] traits; the native navigation state lives
//! behind [`nebula_history::PlatformHistory`].

#![deny(missing_docs)]

/// Bidirectional mapping between a props payload and a URL query string.
pub mod codec;

/// Error types surfaced by the router.
pub mod error;

/// Name-to-view-factory registry and a renderer built on top of it.
pub mod registry;

/// The rendering collaborator seam.
pub mod renderer;

/// The router controller.
pub mod router;

/// The per-frame scheduler seam.
pub mod scheduler;

/// The transition-classified history stack.
pub mod stack;

/// Geometry and driver for zoom transitions.
pub mod transition;

/// A collection of useful items most applications might need.
pub mod prelude {
    pub use crate::codec::{self, Props};
    pub use crate::error::RouterError;
    pub use crate::registry::{RegistryRenderer, ViewFactory, ViewRegistry};
    pub use crate::renderer::{ContainerId, FirstRenderCallback, Renderer, ViewHandle};
    pub use crate::router::{Router, RouterConfig, TransitionConfig};
    pub use crate::scheduler::{FrameScheduler, ManualScheduler, SchedulerId};
    pub use crate::stack::{HistoryEntry, HistoryStack, TransitionType};
    pub use crate::transition::{Anchor, FrameStyle, Rect, Transform, Viewport};
    pub use nebula_history::{EntryCallback, MemoryHistory, PlatformHistory};
}
