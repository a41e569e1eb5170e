//! Exempt ("unflip") descendants and their counter-scaling loop.
//!
//! An unflip node opts out of its enclosing unit's scale/translate so inner
//! content keeps its visual size while the container flies. There is no
//! closed-form keyframe that cancels an arbitrary easing curve, so the
//! correction is applied per rendered frame: sample the container's
//! instantaneous computed scale, invert it, and pin the exempt node to its
//! captured position with inline overrides. The loop self-terminates the
//! frame after the container's computed scale stops reading as a finite
//! pair (its animation ended and the style reverted).

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use glide_host::{Host, Rect, RenderHost};

use crate::nested::NestedScope;
use crate::snapshot::{StyleSnapshot, parse_scale};

/// One exemption declaration: which nodes it covers and which scope they
/// were registered with. Re-declaring replaces the previous registration.
#[derive(Debug)]
pub struct UnflipRegistration<H: RenderHost> {
    scope: RefCell<Option<Rc<NestedScope<H>>>>,
    nodes: RefCell<Vec<H::Node>>,
}

impl<H: RenderHost> Default for UnflipRegistration<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: RenderHost> UnflipRegistration<H> {
    /// Create an empty declaration.
    pub fn new() -> Self {
        Self {
            scope: RefCell::new(None),
            nodes: RefCell::new(Vec::new()),
        }
    }

    /// Register `nodes` as exempt from `target_key`'s scale animation, or
    /// from the nearest enclosing unit when no key is given. Replaces any
    /// previous registration by this declaration.
    ///
    /// Declarations with no nodes, outside any unit, or naming a key that is
    /// not an enclosing scope are logged and no-op: the tree still renders,
    /// just without the exemption.
    pub fn declare(
        &self,
        nearest: Option<&Rc<NestedScope<H>>>,
        target_key: Option<&str>,
        nodes: Vec<H::Node>,
    ) {
        self.clear();

        if nodes.is_empty() {
            warn!("unflip declaration has no renderable nodes");
            return;
        }
        let Some(nearest) = nearest else {
            warn!("unflip declared outside any flip unit");
            return;
        };
        let target = match target_key {
            Some(key) => match nearest.find(key) {
                Some(scope) => scope,
                None => {
                    warn!(key, "no enclosing flip unit matches the unflip target");
                    return;
                }
            },
            None => Rc::clone(nearest),
        };

        target.add_unflips(&nodes);
        *self.scope.borrow_mut() = Some(target);
        *self.nodes.borrow_mut() = nodes;
    }

    /// Withdraw this declaration's registration, if any.
    pub fn clear(&self) {
        if let Some(scope) = self.scope.borrow_mut().take() {
            scope.remove_unflips(&self.nodes.borrow());
        }
        self.nodes.borrow_mut().clear();
    }
}

/// Start the per-frame counter-scaling loop for one exempt node.
///
/// `first` is the exempt node's geometry captured at animation start;
/// `container_last` is the container's committed end geometry, which anchors
/// the exempt node's offset.
pub(crate) fn start_counter_scale<H: Host>(
    host: Rc<H>,
    container: H::Node,
    target: H::Node,
    first: StyleSnapshot,
    container_last: Rect,
) {
    CounterScale {
        host,
        container,
        target,
        width: first.rect.width,
        height: first.rect.height,
        anchor_x: first.rect.left - container_last.left,
        anchor_y: first.rect.top - container_last.top,
    }
    .apply();
}

struct CounterScale<H: Host> {
    host: Rc<H>,
    container: H::Node,
    target: H::Node,
    width: f64,
    height: f64,
    anchor_x: f64,
    anchor_y: f64,
}

impl<H: Host> CounterScale<H> {
    fn apply(self) {
        let scale = self
            .host
            .computed_style(&self.container, "scale")
            .and_then(|value| parse_scale(&value).ok().flatten());
        let Some((scale_x, scale_y)) = scale else {
            // The container's animation ended and its scale reverted; drop
            // the overrides and stop.
            self.host.remove_inline_style(&self.target, "scale");
            self.host.remove_inline_style(&self.target, "translate");
            return;
        };

        let inverse_x = 1.0 / scale_x;
        let inverse_y = 1.0 / scale_y;
        let offset_x = self.width * (inverse_x - 1.0) / 2.0 + self.anchor_x * (inverse_x - 1.0);
        let offset_y = self.height * (inverse_y - 1.0) / 2.0 + self.anchor_y * (inverse_y - 1.0);

        self.host.set_inline_style(
            &self.target,
            "translate",
            &format!("{offset_x}px {offset_y}px"),
        );
        self.host
            .set_inline_style(&self.target, "scale", &format!("{inverse_x} {inverse_y}"));

        let host = Rc::clone(&self.host);
        host.after_next_frame(Box::new(move || self.apply()));
    }
}
