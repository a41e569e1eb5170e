//! The per-node animation controller.
//!
//! A [`FlipUnit`] drives one key-addressed animated node through its
//! lifecycle: it records the baseline on mount or trigger change, asks the
//! delta engine for the inverse transform when the trigger changes, starts
//! and cancels the native animation, plays enter/exit classes, and keeps the
//! shared registry consistent while racing against re-attachment.
//!
//! The embedding layer owns reactivity and drives the unit through explicit
//! callbacks, in this order per logical update:
//!
//! 1. [`will_update`](FlipUnit::will_update) before the new layout applies
//!    (the previous committed geometry is still readable),
//! 2. [`did_update`](FlipUnit::did_update) after it commits,
//!
//! plus [`mounted`](FlipUnit::mounted), [`set_key`](FlipUnit::set_key) and
//! [`unmounted`](FlipUnit::unmounted) for the remaining lifecycle edges.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::warn;

use glide_host::{AnimationHandle, AnimationTiming, FillMode, Host, Keyframe};

use crate::config::{ResolvedOptions, Trigger, UnitOptions};
use crate::debug::mirror_animated_styles;
use crate::delta::{compute_delta, end_keyframe, exit_bias, start_keyframe};
use crate::nested::NestedScope;
use crate::scope::FlipScope;
use crate::snapshot::StyleSnapshot;
use crate::unflip::start_counter_scale;

/// Lifecycle phase of one animated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipPhase {
    /// No baseline snapshot recorded yet.
    Unbaselined,
    /// A baseline exists; no animation is running.
    Baselined,
    /// A native animation is in flight.
    Animating,
    /// Detached from the logical tree, playing an exit transition.
    Exiting,
    /// Terminal: the node is gone.
    Removed,
}

/// Controller for one animated unit.
pub struct FlipUnit<H: Host> {
    scope: Rc<FlipScope<H>>,
    options: ResolvedOptions,
    key: RefCell<String>,
    nested: Rc<NestedScope<H>>,
    parent: Option<Rc<NestedScope<H>>>,
    node: RefCell<Option<H::Node>>,
    /// Former layout position (parent, next sibling), for exit re-insertion.
    anchor: RefCell<Option<(H::Node, Option<H::Node>)>>,
    animation: RefCell<Option<H::Handle>>,
    /// Liveness flag shared with the debug mirroring loop of the current
    /// animation; flipped off on finish or cancel.
    active: RefCell<Option<Rc<Cell<bool>>>>,
    trigger: RefCell<Option<Trigger>>,
    pending: Cell<bool>,
    phase: Cell<FlipPhase>,
}

impl<H: Host> FlipUnit<H> {
    /// Create a unit under the given provider scope.
    ///
    /// `parent` is the nested scope of the enclosing animated unit, if any;
    /// the unit's own scope (for its descendants) is created here.
    /// Construction attaches the key to the registry.
    pub fn new(
        scope: Rc<FlipScope<H>>,
        parent: Option<Rc<NestedScope<H>>>,
        options: UnitOptions,
    ) -> Rc<Self> {
        let resolved = options.resolve(scope.defaults());
        let key = options.key;
        scope.registry().attach(&key);
        let nested = NestedScope::new(key.clone(), Rc::clone(scope.registry()), parent.clone());

        Rc::new(Self {
            scope,
            options: resolved,
            key: RefCell::new(key),
            nested,
            parent,
            node: RefCell::new(None),
            anchor: RefCell::new(None),
            animation: RefCell::new(None),
            active: RefCell::new(None),
            trigger: RefCell::new(None),
            pending: Cell::new(false),
            phase: Cell::new(FlipPhase::Unbaselined),
        })
    }

    /// The unit's current animation key.
    pub fn key(&self) -> String {
        self.key.borrow().clone()
    }

    /// The unit's current lifecycle phase.
    pub fn phase(&self) -> FlipPhase {
        self.phase.get()
    }

    /// The nested scope this unit exposes to its descendants (child units
    /// and exemption declarations).
    pub fn nested(&self) -> &Rc<NestedScope<H>> {
        &self.nested
    }

    /// Tell the unit what its rendered content is.
    ///
    /// Pass `None` when the rendered content is not a single concrete node
    /// (a fragment, a list, raw text); geometry operations then log a
    /// diagnostic and no-op for the cycle, and the tree still renders.
    pub fn set_rendered_node(&self, node: Option<H::Node>) {
        *self.node.borrow_mut() = node;
    }

    /// The rendered content was mounted and committed.
    pub fn mounted(self: &Rc<Self>) {
        let Some(node) = self.single_node() else {
            return;
        };
        if self.options.debug {
            self.host().set_attribute(&node, "data-flip-id", &self.key());
        }
        self.remember_position(&node);
        if !self.options.enabled {
            return;
        }
        if self.host().parent(&node).is_none() {
            return;
        }
        self.flip();
    }

    /// A render is about to apply new layout. Must be called while the
    /// previous committed geometry is still readable.
    ///
    /// When the trigger differs from the last seen value, the current
    /// geometry is re-recorded as the baseline the upcoming flip starts
    /// from.
    pub fn will_update(&self, trigger: &Trigger) {
        let changed = self.trigger.borrow().as_ref() != Some(trigger);
        *self.trigger.borrow_mut() = Some(trigger.clone());
        if !changed || !self.options.enabled {
            return;
        }
        self.pending.set(true);

        let Some(node) = self.single_node() else {
            return;
        };
        let stored = self.scope.registry().record_first(
            &*self.host(),
            &self.key(),
            &node,
            &self.options.properties,
        );
        if stored && self.phase.get() == FlipPhase::Unbaselined {
            self.phase.set(FlipPhase::Baselined);
        }
    }

    /// The render observed by the last [`will_update`](Self::will_update)
    /// has committed its layout. Runs the flip routine when the trigger
    /// changed.
    pub fn did_update(self: &Rc<Self>) {
        if !self.options.enabled || !self.pending.take() {
            return;
        }
        self.flip();
    }

    /// The animation key itself changed reactively. Re-registers under the
    /// new key; the old key's entry is cleaned up with the same deferred
    /// guard as an unmount.
    pub fn set_key(&self, key: impl Into<String>) {
        let key = key.into();
        if *self.key.borrow() == key {
            return;
        }
        let old = self.key.replace(key.clone());

        let registry = self.scope.registry();
        registry.attach(&key);
        registry.detach(&old);
        self.schedule_cleanup(old);
        self.nested.set_key(key.clone());

        if self.options.debug {
            if let Some(node) = self.rendered_node() {
                self.host().set_attribute(&node, "data-flip-id", &key);
            }
        }
    }

    /// The unit is being removed from the logical tree.
    ///
    /// Records where the node was (so a remount under the same key sees it),
    /// plays the exit transition if one is configured and the former parent
    /// is still connected, and schedules the tick-deferred registry cleanup
    /// that the re-attachment race guard can veto.
    pub fn unmounted(self: &Rc<Self>) {
        let key = self.key();
        let registry = self.scope.registry();
        registry.detach(&key);

        if self.options.enabled {
            if let Some(node) = self.single_node() {
                registry.record_first(&*self.host(), &key, &node, &self.options.properties);

                if let Some(exit_class) = self.options.exit.clone() {
                    let anchor = self.anchor.borrow().clone();
                    if let Some((parent, sibling)) = anchor {
                        if self.host().is_connected(&parent) {
                            self.phase.set(FlipPhase::Exiting);
                            let unit = Rc::clone(self);
                            self.host().after_microtasks(Box::new(move || {
                                unit.run_exit(node, parent, sibling, exit_class);
                            }));
                        }
                    }
                }
            }
        }

        if self.phase.get() != FlipPhase::Exiting {
            self.phase.set(FlipPhase::Removed);
        }
        self.schedule_cleanup(key);
    }

    /// The flip routine: baseline if unbaselined (flashing the enter class
    /// when configured), otherwise capture "last" and start the inversion on
    /// the next rendered frame.
    fn flip(self: &Rc<Self>) {
        let Some(node) = self.single_node() else {
            return;
        };
        let host = self.host();
        let registry = self.scope.registry();
        let key = self.key();

        let mut first = registry.first(&key);
        if first.is_none() {
            if let Some(enter_class) = &self.options.enter {
                // Flash the entering style: it defines the start state but
                // is never visible for a rendered frame.
                host.add_class(&node, enter_class);
                let capture = StyleSnapshot::capture(&*host, &node, &self.options.properties);
                host.remove_class(&node, enter_class);
                registry.set_first(&key, Some(capture.clone()));
                first = Some(capture);
            }
        }

        match first {
            Some(first) => {
                self.cancel_animation();
                let last = StyleSnapshot::capture(&*host, &node, &self.options.properties);
                registry.set_last(&key, Some(last.clone()));
                self.remember_position(&node);
                if self.phase.get() == FlipPhase::Unbaselined {
                    self.phase.set(FlipPhase::Baselined);
                }

                // Geometry must reflect the committed layout before the
                // inversion is computed against ancestor state.
                let unit = Rc::clone(self);
                host.after_next_frame(Box::new(move || unit.animate(first, last)));
            }
            None => {
                if registry.record_first(&*host, &key, &node, &self.options.properties) {
                    self.phase.set(FlipPhase::Baselined);
                }
            }
        }
    }

    /// Compute the inverse transform and start playback, one frame after
    /// the flip captured its states.
    fn animate(self: &Rc<Self>, first: StyleSnapshot, last: StyleSnapshot) {
        let Some(node) = self.single_node() else {
            return;
        };
        let host = self.host();

        let (parent_first, parent_last) = match self.parent.as_deref() {
            Some(parent) => (parent.composed_first(), parent.composed_last()),
            None => (None, None),
        };
        let delta = compute_delta(&first, &last, parent_first.as_ref(), parent_last.as_ref());
        let start = start_keyframe(&first, &delta, &self.options.properties);
        let timing = AnimationTiming::new(self.options.duration_ms, self.options.easing);

        // Exempt descendants are captured once, before the container's
        // animation perturbs their measured geometry.
        let unflips = self.nested.unflips();
        let unflip_first: Vec<StyleSnapshot> = unflips
            .iter()
            .map(|target| StyleSnapshot::capture(&*host, target, &[]))
            .collect();

        let handle = host.start_animation(&node, &[start, Keyframe::new()], &timing);
        let flag = self.install_animation(handle, FlipPhase::Baselined);

        for (target, state) in unflips.into_iter().zip(unflip_first) {
            start_counter_scale(Rc::clone(&host), node.clone(), target, state, last.rect);
        }
        if self.options.debug {
            mirror_animated_styles(
                Rc::clone(&host),
                node.clone(),
                self.debug_properties(),
                flag,
            );
        }
    }

    /// Play the exit transition: re-insert the node at its former sibling
    /// position with the exit class applied, animate from the pre-removal
    /// state to the biased end state, and physically remove the node when
    /// the animation finishes.
    fn run_exit(
        self: &Rc<Self>,
        node: H::Node,
        parent: H::Node,
        sibling: Option<H::Node>,
        exit_class: String,
    ) {
        let registry = self.scope.registry();
        let key = self.key();

        // A key re-attached during the same flush is back in the tree under
        // a new unit; replaying its exit would remove the live node.
        if registry.is_attached(&key) {
            self.phase.set(FlipPhase::Removed);
            return;
        }

        let host = self.host();
        host.add_class(&node, &exit_class);
        host.insert_before(&parent, &node, sibling.as_ref());

        let last = StyleSnapshot::capture(&*host, &node, &self.options.properties);
        registry.set_last(&key, Some(last.clone()));
        let Some(first) = registry.first(&key) else {
            host.remove_node(&node);
            self.phase.set(FlipPhase::Removed);
            return;
        };

        let bias = exit_bias(&first, &last, self.options.preserve);
        let delta = compute_delta(&first, &last, None, None);
        let start = start_keyframe(&first, &delta, &self.options.properties);
        let end = end_keyframe(&bias);
        let timing = AnimationTiming::new(self.options.duration_ms, self.options.easing)
            .with_fill(FillMode::Forwards);

        self.cancel_animation();
        let handle = host.start_animation(&node, &[start, end], &timing);

        let flag = Rc::new(Cell::new(true));
        let weak = Rc::downgrade(self);
        let finish_host = Rc::clone(&host);
        let finish_node = node.clone();
        let finish_flag = Rc::clone(&flag);
        handle.set_on_finish(Box::new(move || {
            finish_flag.set(false);
            finish_host.remove_node(&finish_node);
            if let Some(unit) = weak.upgrade() {
                unit.animation.borrow_mut().take();
                unit.active.borrow_mut().take();
                unit.phase.set(FlipPhase::Removed);
            }
        }));
        *self.animation.borrow_mut() = Some(handle);
        *self.active.borrow_mut() = Some(Rc::clone(&flag));

        if self.options.debug {
            mirror_animated_styles(Rc::clone(&host), node, self.debug_properties(), flag);
        }
    }

    /// Store a freshly started flip animation and wire its finish callback.
    fn install_animation(self: &Rc<Self>, handle: H::Handle, finish_phase: FlipPhase) -> Rc<Cell<bool>> {
        let flag = Rc::new(Cell::new(true));
        let weak = Rc::downgrade(self);
        let finish_flag = Rc::clone(&flag);
        handle.set_on_finish(Box::new(move || {
            finish_flag.set(false);
            if let Some(unit) = weak.upgrade() {
                unit.animation.borrow_mut().take();
                unit.active.borrow_mut().take();
                if unit.phase.get() == FlipPhase::Animating {
                    unit.phase.set(finish_phase);
                }
            }
        }));
        *self.animation.borrow_mut() = Some(handle);
        *self.active.borrow_mut() = Some(Rc::clone(&flag));
        self.phase.set(FlipPhase::Animating);
        flag
    }

    /// Cancel the in-flight animation, if any. Starting a new animation
    /// always goes through here first: cancel-then-restart, never queue.
    fn cancel_animation(&self) {
        if let Some(handle) = self.animation.borrow_mut().take() {
            handle.cancel();
        }
        if let Some(flag) = self.active.borrow_mut().take() {
            flag.set(false);
        }
    }

    /// Remember the node's layout parent and next sibling so an exit
    /// transition can re-insert it where it was.
    fn remember_position(&self, node: &H::Node) {
        let host = self.host();
        *self.anchor.borrow_mut() = host
            .parent(node)
            .map(|parent| (parent, host.next_sibling(node)));
    }

    fn host(&self) -> Rc<H> {
        Rc::clone(self.scope.host())
    }

    fn rendered_node(&self) -> Option<H::Node> {
        self.node.borrow().clone()
    }

    /// The rendered node, logging the shape violation when there is none.
    fn single_node(&self) -> Option<H::Node> {
        let node = self.rendered_node();
        if node.is_none() {
            warn!(key = %self.key(), "flip content is not a single renderable node");
        }
        node
    }

    /// Clear the registry entry one tick after a detach, unless the key was
    /// re-attached in the meantime.
    fn schedule_cleanup(&self, key: String) {
        let registry = Rc::clone(self.scope.registry());
        self.host().after_tick(0, Box::new(move || {
            if registry.is_attached(&key) {
                return;
            }
            registry.clear_entry(&key);
        }));
    }

    /// Every style property the current animation touches, for debug
    /// mirroring.
    fn debug_properties(&self) -> Vec<String> {
        let mut properties: Vec<String> = [
            "translate",
            "scale",
            "background-color",
            "opacity",
            "border-top-left-radius",
            "border-top-right-radius",
            "border-bottom-left-radius",
            "border-bottom-right-radius",
        ]
        .iter()
        .map(|property| property.to_string())
        .collect();
        properties.extend(self.options.properties.iter().cloned());
        properties
    }
}
