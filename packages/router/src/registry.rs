//! View resolution.
//!
//! Props address their view through the `component` key. A [`ViewRegistry`]
//! maps those names to factory functions, populated once at process start —
//! an explicit lookup, not reflection. [`RegistryRenderer`] is a
//! [`Renderer`] built over a registry; it performs no real DOM work, which
//! makes it the rendering collaborator for tests and headless embeddings,
//! and the reference for what a real renderer integration must do.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::error;

use crate::codec::Props;
use crate::error::RouterError;
use crate::renderer::{ContainerId, FirstRenderCallback, Renderer, ViewHandle};
use crate::transition::{FrameStyle, Viewport};

/// Builds a view from its mount props.
pub type ViewFactory = Box<dyn Fn(&Props) -> Rc<dyn ViewHandle>>;

/// An explicit mapping from component names to view factories.
#[derive(Default)]
pub struct ViewRegistry {
    views: FxHashMap<String, ViewFactory>,
}

impl ViewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: impl Into<String>, factory: ViewFactory) {
        self.views.insert(name.into(), factory);
    }

    /// Look up the factory registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<&ViewFactory> {
        self.views.get(name)
    }

    /// Resolve the view named by `props` and build it.
    ///
    /// This is the only place a [`RouterError`] can originate: props without
    /// a string `component` key, or naming an unregistered component, cannot
    /// be rendered and have no sensible fallback.
    pub fn build(&self, props: &Props) -> Result<Rc<dyn ViewHandle>, RouterError> {
        let name = props
            .get("component")
            .and_then(Value::as_str)
            .ok_or(RouterError::MissingComponentName)?;
        match self.resolve(name) {
            Some(factory) => Ok(factory(props)),
            None => {
                error!(component = name, "cannot resolve configuration");
                Err(RouterError::UnknownComponent(name.to_string()))
            }
        }
    }
}

struct RendererState {
    next_container: u64,
    attached: Vec<ContainerId>,
    removed: Vec<ContainerId>,
    raised: Vec<ContainerId>,
    mounted: FxHashMap<ContainerId, Rc<dyn ViewHandle>>,
    mounted_props: FxHashMap<ContainerId, Props>,
    frames: FxHashMap<ContainerId, FrameStyle>,
}

/// A DOM-less [`Renderer`] over a [`ViewRegistry`].
///
/// Views render synchronously: `mount` builds the view, records it and
/// immediately reports the first render. Container operations are recorded
/// and can be inspected afterwards, which is what the integration tests are
/// built on.
pub struct RegistryRenderer {
    registry: ViewRegistry,
    viewport: Viewport,
    state: RefCell<RendererState>,
}

/// The root container id every [`RegistryRenderer`] starts with.
pub const ROOT_CONTAINER: ContainerId = ContainerId(0);

impl RegistryRenderer {
    /// Create a renderer over `registry` with the given viewport.
    pub fn new(registry: ViewRegistry, viewport: Viewport) -> Self {
        Self {
            registry,
            viewport,
            state: RefCell::new(RendererState {
                next_container: 1,
                attached: vec![ROOT_CONTAINER],
                removed: Vec::new(),
                raised: Vec::new(),
                mounted: FxHashMap::default(),
                mounted_props: FxHashMap::default(),
                frames: FxHashMap::default(),
            }),
        }
    }

    /// The containers currently attached, in attachment order.
    pub fn attached_containers(&self) -> Vec<ContainerId> {
        self.state.borrow().attached.clone()
    }

    /// The containers that were removed, in removal order.
    pub fn removed_containers(&self) -> Vec<ContainerId> {
        self.state.borrow().removed.clone()
    }

    /// The containers that were raised in stacking order.
    pub fn raised_containers(&self) -> Vec<ContainerId> {
        self.state.borrow().raised.clone()
    }

    /// Whether a view is mounted in `container`.
    pub fn is_mounted(&self, container: ContainerId) -> bool {
        self.state.borrow().mounted.contains_key(&container)
    }

    /// The props the view in `container` was mounted with.
    pub fn mounted_props(&self, container: ContainerId) -> Option<Props> {
        self.state.borrow().mounted_props.get(&container).cloned()
    }

    /// The last transition frame applied to `container`.
    pub fn last_frame(&self, container: ContainerId) -> Option<FrameStyle> {
        self.state.borrow().frames.get(&container).copied()
    }
}

impl Renderer for RegistryRenderer {
    fn mount(
        &self,
        props: &Props,
        container: ContainerId,
        on_first_render: FirstRenderCallback,
    ) -> Result<Rc<dyn ViewHandle>, RouterError> {
        let handle = self.registry.build(props)?;
        {
            let mut state = self.state.borrow_mut();
            state.mounted.insert(container, handle.clone());
            state.mounted_props.insert(container, props.clone());
        }
        on_first_render();
        Ok(handle)
    }

    fn unmount(&self, container: ContainerId) {
        let mut state = self.state.borrow_mut();
        state.mounted.remove(&container);
        state.mounted_props.remove(&container);
    }

    fn root_container(&self) -> ContainerId {
        ROOT_CONTAINER
    }

    fn create_container(&self, _container_id_hint: &str) -> ContainerId {
        let mut state = self.state.borrow_mut();
        let id = ContainerId(state.next_container);
        state.next_container += 1;
        id
    }

    fn attach_container(&self, container: ContainerId) {
        self.state.borrow_mut().attached.push(container);
    }

    fn remove_container(&self, container: ContainerId) {
        let mut state = self.state.borrow_mut();
        state.attached.retain(|attached| *attached != container);
        state.frames.remove(&container);
        state.removed.push(container);
    }

    fn clear_root(&self) {
        let mut state = self.state.borrow_mut();
        state.attached.retain(|attached| *attached == ROOT_CONTAINER);
        state.mounted.clear();
        state.mounted_props.clear();
        state.frames.clear();
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn raise(&self, container: ContainerId) {
        self.state.borrow_mut().raised.push(container);
    }

    fn apply_frame(&self, container: ContainerId, style: FrameStyle) {
        self.state.borrow_mut().frames.insert(container, style);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct StaticView(Props);

    impl ViewHandle for StaticView {
        fn generate_snapshot(&self) -> Props {
            self.0.clone()
        }
    }

    fn list_registry() -> ViewRegistry {
        let mut registry = ViewRegistry::new();
        registry.register(
            "List",
            Box::new(|props| Rc::new(StaticView(props.clone()))),
        );
        registry
    }

    fn props(name: &str) -> Props {
        let mut props = Props::new();
        props.insert("component".into(), json!(name));
        props
    }

    #[test]
    fn resolves_registered_components() {
        let registry = list_registry();
        let handle = registry.build(&props("List")).unwrap();
        assert_eq!(handle.generate_snapshot(), props("List"));
    }

    #[test]
    fn unknown_component_is_fatal() {
        let registry = list_registry();
        assert!(matches!(
            registry.build(&props("Missing")),
            Err(RouterError::UnknownComponent(name)) if name == "Missing"
        ));
    }

    #[test]
    fn props_without_component_name_are_fatal() {
        let registry = list_registry();
        let mut props = Props::new();
        props.insert("component".into(), json!(7));
        assert!(matches!(
            registry.build(&props),
            Err(RouterError::MissingComponentName)
        ));
        assert!(matches!(
            registry.build(&Props::new()),
            Err(RouterError::MissingComponentName)
        ));
    }

    #[test]
    fn mount_reports_the_first_render() {
        let renderer = RegistryRenderer::new(
            list_registry(),
            Viewport {
                width: 100.0,
                height: 100.0,
            },
        );
        let rendered = Rc::new(std::cell::Cell::new(false));
        let flag = rendered.clone();
        let container = renderer.create_container("component=List");
        renderer
            .mount(&props("List"), container, Box::new(move || flag.set(true)))
            .unwrap();
        assert!(rendered.get());
        assert!(renderer.is_mounted(container));
    }
}
