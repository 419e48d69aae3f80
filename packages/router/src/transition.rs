//! Zoom transition geometry and driver.
//!
//! A zoom transition makes the incoming view appear to grow out of the
//! on-screen element that triggered the navigation (its *origin bounds*),
//! while the outgoing view inflates past the viewport. Going back plays the
//! mirror image. The engine computes per-frame `(scale, x, y, opacity)`
//! styles for both containers; timing comes from an external
//! [`FrameScheduler`](crate::scheduler::FrameScheduler) and applying styles
//! to real elements is the renderer's job.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::renderer::{ContainerId, Renderer};
use crate::scheduler::{FrameScheduler, SchedulerId};
use crate::stack::{HistoryStack, TransitionType};

/// Viewport-relative bounding box of the element that triggered a
/// navigation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Width of the element.
    pub width: f64,
    /// Height of the element.
    pub height: f64,
    /// Left edge, relative to the hosting container.
    pub x: f64,
    /// Top edge, relative to the hosting container.
    pub y: f64,
}

/// The size of the rectangle both views are laid out in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

/// One endpoint of a geometric interpolation: a scale factor and the anchor
/// point the top-left corner aligns to at that endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Scale factor relative to the viewport.
    pub scale: f64,
    /// Horizontal anchor offset.
    pub x: f64,
    /// Vertical anchor offset.
    pub y: f64,
}

/// A rendered transform at one instant of the interpolation: the values to
/// hand to `scale()` and `translate()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Current scale factor.
    pub scale: f64,
    /// Rendered top-left x translation.
    pub x: f64,
    /// Rendered top-left y translation.
    pub y: f64,
}

/// The full per-frame style of one container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStyle {
    /// Current scale factor.
    pub scale: f64,
    /// Rendered top-left x translation.
    pub x: f64,
    /// Rendered top-left y translation.
    pub y: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// The three anchors every zoom transition interpolates between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionAnchors {
    /// The view at rest, filling the viewport.
    pub full_screen: Anchor,
    /// Shrunk into the origin bounds, behind the screen plane.
    pub away_from_screen: Anchor,
    /// Inflated past the viewport, in front of the screen plane.
    pub in_front_of_screen: Anchor,
}

impl TransitionAnchors {
    /// Compute the anchors for a transition whose incoming view grows out of
    /// `origin` inside `viewport`.
    pub fn for_origin(viewport: Viewport, origin: Rect) -> Self {
        let deflated = origin.width / viewport.width;
        Self {
            full_screen: Anchor {
                scale: 1.0,
                x: 0.0,
                y: 0.0,
            },
            away_from_screen: Anchor {
                scale: deflated,
                x: -origin.x,
                y: -origin.y,
            },
            in_front_of_screen: Anchor {
                scale: 1.0 / deflated,
                x: origin.x,
                y: origin.y,
            },
        }
    }
}

/// Interpolate between two anchors at `ratio ∈ [0, 1]` and translate the
/// result into a rendered transform.
///
/// The translation compensates for scaling about the rectangle's center: the
/// top-left corner is first moved to the middle of the viewport, then pulled
/// back to the viewport's top-left in scale-relative units, then offset by
/// the interpolated anchor point (adapted to the current scale, since the
/// offsets are expressed at the target scale).
///
/// ```
/// use nebula_router::transition::{translate, Anchor, Viewport};
///
/// let viewport = Viewport { width: 200.0, height: 200.0 };
/// let from = Anchor { scale: 1.0, x: 0.0, y: 0.0 };
/// let to = Anchor { scale: 2.0, x: 100.0, y: 100.0 };
/// // zooming so that at the end only the bottom-right quarter is visible
/// assert_eq!(translate(viewport, from, to, 1.0).x, -50.0);
/// ```
pub fn translate(viewport: Viewport, from: Anchor, to: Anchor, ratio: f64) -> Transform {
    let scale = from.scale + (to.scale - from.scale) * ratio;
    let reversed_scale = to.scale / scale;
    let offset_x = from.x + (to.x - from.x) * ratio;
    let offset_y = from.y + (to.y - from.y) * ratio;

    let mut x = viewport.width / 2.0;
    let mut y = viewport.height / 2.0;
    x -= viewport.width / 2.0 / scale;
    y -= viewport.height / 2.0 / scale;
    x -= offset_x * reversed_scale;
    y -= offset_y * reversed_scale;

    Transform { scale, x, y }
}

/// Compute the styles of both containers at `ratio`.
///
/// Moving deeper (NEW or FORWARD): the outgoing view interpolates
/// `full_screen → in_front_of_screen` at constant opacity while the incoming
/// one interpolates `away_from_screen → full_screen`, fading in. A BACK
/// transition runs both interpolations of the mirrored pairing on the
/// reversed ratio `1 - t`, with the outgoing view fading out instead.
pub fn frame_styles(
    anchors: &TransitionAnchors,
    viewport: Viewport,
    transition_type: TransitionType,
    ratio: f64,
) -> (FrameStyle, FrameStyle) {
    let (prev, next, prev_opacity, next_opacity) = if transition_type == TransitionType::Back {
        let reversed = 1.0 - ratio;
        (
            translate(viewport, anchors.away_from_screen, anchors.full_screen, reversed),
            translate(viewport, anchors.full_screen, anchors.in_front_of_screen, reversed),
            1.0 - ratio,
            1.0,
        )
    } else {
        (
            translate(viewport, anchors.full_screen, anchors.in_front_of_screen, ratio),
            translate(viewport, anchors.away_from_screen, anchors.full_screen, ratio),
            1.0,
            ratio,
        )
    };
    (
        FrameStyle {
            scale: prev.scale,
            x: prev.x,
            y: prev.y,
            opacity: prev_opacity,
        },
        FrameStyle {
            scale: next.scale,
            x: next.x,
            y: next.y,
            opacity: next_opacity,
        },
    )
}

/// Everything a zoom run needs besides the collaborators.
pub struct ZoomOptions {
    /// Container of the outgoing view, if one is on screen.
    pub prev_container: Option<ContainerId>,
    /// Container of the incoming view.
    pub next_container: ContainerId,
    /// How the navigation was classified.
    pub transition_type: TransitionType,
    /// Length of the animation in seconds.
    pub duration_seconds: f64,
}

/// The zoom transition driver.
pub struct ZoomTransition;

impl ZoomTransition {
    /// Animate between the outgoing and incoming containers.
    ///
    /// Initial transitions do nothing: the first view's container is already
    /// fully visible. For a BACK transition the outgoing container is raised
    /// above the incoming one first, so the stacking order mirrors the
    /// forward transition it undoes. When the entry being left carries no
    /// origin bounds there is nothing to anchor the zoom to and the run
    /// jumps straight to its terminal frame.
    ///
    /// Starting a run reuses the router's scheduler id, so the scheduler
    /// force-flushes any transition still in flight before this one begins —
    /// its outgoing container is removed there, never orphaned.
    ///
    /// The terminal frame (ratio `1`) unmounts the outgoing view and removes
    /// its container, exactly once per run.
    pub fn run(
        renderer: &Rc<dyn Renderer>,
        scheduler: &dyn FrameScheduler,
        id: SchedulerId,
        stack: &HistoryStack,
        options: ZoomOptions,
    ) {
        if options.transition_type == TransitionType::Initial {
            return;
        }
        let Some(prev_container) = options.prev_container else {
            return;
        };

        // the entry being left holds the bounds the zoom is anchored to; on
        // BACK that entry is the one in front of the new index
        let origin_index = if options.transition_type == TransitionType::Back {
            stack.index() + 1
        } else {
            stack.index()
        };
        let origin = stack.get(origin_index).and_then(|entry| entry.origin_bounds);

        let Some(origin) = origin else {
            debug!(transition_type = ?options.transition_type, "no origin bounds, skipping zoom");
            renderer.unmount(prev_container);
            renderer.remove_container(prev_container);
            return;
        };

        let viewport = renderer.viewport();
        let anchors = TransitionAnchors::for_origin(viewport, origin);
        let transition_type = options.transition_type;
        let next_container = options.next_container;

        // the next container is inserted after the previous one; when going
        // backwards the previous must still sit on top
        if transition_type == TransitionType::Back {
            renderer.raise(prev_container);
        }

        debug!(?transition_type, "starting zoom transition");
        let renderer = renderer.clone();
        scheduler.start(
            id,
            options.duration_seconds,
            Box::new(move |ratio| {
                let (prev_style, next_style) =
                    frame_styles(&anchors, viewport, transition_type, ratio);
                renderer.apply_frame(prev_container, prev_style);
                renderer.apply_frame(next_container, next_style);
                if ratio >= 1.0 {
                    renderer.unmount(prev_container);
                    renderer.remove_container(prev_container);
                }
            }),
        );
    }
}
