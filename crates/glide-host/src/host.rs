//! The trait seam between the animation core and the platform.
//!
//! The core never touches a render tree directly. Everything it needs from
//! the platform is expressed here: reading committed geometry and resolved
//! style, toggling classes and inline styles, moving nodes, starting native
//! declarative animations, and the three cooperative scheduling primitives.
//!
//! Implementations are single-threaded: every callback runs to completion on
//! the scripting thread before the next scheduled callback starts.

use std::fmt;

use crate::geometry::Rect;
use crate::keyframe::{AnimationTiming, Keyframe};

/// A deferred unit of work handed to the [`Scheduler`].
pub type HostCallback = Box<dyn FnOnce()>;

/// Handle to one in-flight native animation.
pub trait AnimationHandle {
    /// Cancel the animation. A cancelled animation never fires its finish
    /// callback and its styling effect is dropped immediately.
    fn cancel(&self);

    /// Register a callback invoked once when the animation finishes
    /// normally. Replaces any previously registered callback.
    fn set_on_finish(&self, callback: HostCallback);
}

/// Render-tree operations the core consumes.
///
/// `computed_style` and `rect` must reflect committed layout: the core only
/// calls them at points where the host guarantees geometry is not stale.
pub trait RenderHost {
    /// A cheap, cloneable reference to one renderable node. `'static`
    /// because node references outlive the scripting turn that captured
    /// them (deferred callbacks hold them across frames).
    type Node: Clone + PartialEq + fmt::Debug + 'static;
    /// Handle type returned by [`start_animation`](Self::start_animation).
    type Handle: AnimationHandle + 'static;

    /// The node's layout rectangle in viewport coordinates.
    fn rect(&self, node: &Self::Node) -> Rect;

    /// One resolved style property by CSS name, or `None` if the host has no
    /// value for it.
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Add a CSS class to the node.
    fn add_class(&self, node: &Self::Node, class: &str);

    /// Remove a CSS class from the node.
    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Set an inline style property, overriding any animated value.
    fn set_inline_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Remove an inline style property.
    fn remove_inline_style(&self, node: &Self::Node, property: &str);

    /// Set an attribute on the node (used for debug inspection only).
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    /// Remove an attribute from the node.
    fn remove_attribute(&self, node: &Self::Node, name: &str);

    /// The node's layout parent, or `None` for detached/root nodes.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The node's next sibling in its parent's child list.
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Insert `node` into `parent` before `reference` (append when `None`).
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);

    /// Physically remove the node from the tree.
    fn remove_node(&self, node: &Self::Node);

    /// Whether the node is attached to the live tree.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Start a native animation interpolating through `keyframes` with the
    /// given timing. The animation runs outside the scripting thread; the
    /// returned handle is the only way to cancel it or observe its end.
    fn start_animation(
        &self,
        node: &Self::Node,
        keyframes: &[Keyframe],
        timing: &AnimationTiming,
    ) -> Self::Handle;
}

/// The three cooperative suspension primitives the core relies on.
pub trait Scheduler {
    /// Run `callback` after the next frame has been rendered (layout
    /// committed, animations advanced one step).
    fn after_next_frame(&self, callback: HostCallback);

    /// Run `callback` once the current microtask queue has drained, before
    /// the next frame.
    fn after_microtasks(&self, callback: HostCallback);

    /// Run `callback` one macrotask tick later, after at least `delay_ms`
    /// milliseconds. Microtasks scheduled in between flush first.
    fn after_tick(&self, delay_ms: u32, callback: HostCallback);
}

/// Convenience alias for the full platform surface the core needs.
pub trait Host: RenderHost + Scheduler + 'static {}

impl<T: RenderHost + Scheduler + 'static> Host for T {}
