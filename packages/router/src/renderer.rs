//! The rendering collaborator seam.
//!
//! The router never inspects a view beyond [`ViewHandle::generate_snapshot`];
//! mounting, unmounting and all DOM work happen behind [`Renderer`]. The
//! container operations exist because zoom transitions need the outgoing and
//! incoming views on screen at the same time, each in its own container.

use std::rc::Rc;

use crate::codec::Props;
use crate::error::RouterError;
use crate::transition::{FrameStyle, Viewport};

/// Opaque id of a view container handed out by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(
    /// The renderer-assigned raw id.
    pub u64,
);

/// Invoked once, after the mounted view completes its first render.
pub type FirstRenderCallback = Box<dyn FnOnce()>;

/// A live mounted view.
pub trait ViewHandle {
    /// A full snapshot of the view's present configuration — its current
    /// live state, not the props it was mounted with. Routers write this
    /// back into the history entry being left so that going back restores
    /// the view exactly as it was.
    fn generate_snapshot(&self) -> Props;
}

/// Mounts and unmounts views and owns their containers.
pub trait Renderer {
    /// Mount the view described by `props` into `container`.
    ///
    /// `on_first_render` must be invoked exactly once, after the view's
    /// first render completes. Fails when `props` cannot be resolved to a
    /// view implementation — the one fatal error in the router core.
    fn mount(
        &self,
        props: &Props,
        container: ContainerId,
        on_first_render: FirstRenderCallback,
    ) -> Result<Rc<dyn ViewHandle>, RouterError>;

    /// Unmount whatever view lives in `container`.
    fn unmount(&self, container: ContainerId);

    /// The root container views are rendered into when no transition is
    /// configured.
    fn root_container(&self) -> ContainerId;

    /// Create a fresh, detached sub-container.
    fn create_container(&self, container_id_hint: &str) -> ContainerId;

    /// Attach a previously created sub-container to the visible tree. Called
    /// after the view inside it has rendered for the first time.
    fn attach_container(&self, container: ContainerId);

    /// Detach and drop a sub-container.
    fn remove_container(&self, container: ContainerId);

    /// Empty the root container. The router calls this when it resets its
    /// in-memory history.
    fn clear_root(&self);

    /// The rectangle containers are laid out in.
    fn viewport(&self) -> Viewport;

    /// Raise `container` above its siblings in stacking order.
    fn raise(&self, container: ContainerId);

    /// Apply one frame of a transition to `container`.
    fn apply_frame(&self, container: ContainerId, style: FrameStyle);
}
