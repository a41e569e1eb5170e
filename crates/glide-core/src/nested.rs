//! Nested coordination between enclosing and enclosed animated units.
//!
//! Every animated unit owns a [`NestedScope`] that its descendants receive.
//! Through it a child reads the ancestor-composed first/last snapshot — the
//! enclosing unit's rect accumulated through however many ancestor scopes
//! exist — which the delta engine needs to avoid double-counting a parent's
//! own FLIP inversion. The scope also owns the list of "unflip" nodes that
//! opted out of this unit's scale animation.
//!
//! The parent link is non-owning and mirrors static containment, so the
//! scope graph is a tree by construction. Composed reads are derived on
//! demand from the registry; nothing is cached.

use std::cell::RefCell;
use std::rc::Rc;

use glide_host::RenderHost;

use crate::registry::FlipRegistry;
use crate::snapshot::StyleSnapshot;

/// The coordination scope one animated unit exposes to its descendants.
#[derive(Debug)]
pub struct NestedScope<H: RenderHost> {
    key: RefCell<String>,
    registry: Rc<FlipRegistry>,
    parent: Option<Rc<NestedScope<H>>>,
    unflips: RefCell<Vec<H::Node>>,
}

impl<H: RenderHost> NestedScope<H> {
    /// Create the scope for a unit with the given animation key.
    pub fn new(
        key: impl Into<String>,
        registry: Rc<FlipRegistry>,
        parent: Option<Rc<NestedScope<H>>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            key: RefCell::new(key.into()),
            registry,
            parent,
            unflips: RefCell::new(Vec::new()),
        })
    }

    /// The owning unit's current animation key.
    pub fn key(&self) -> String {
        self.key.borrow().clone()
    }

    /// Track a reactive key change on the owning unit.
    pub fn set_key(&self, key: impl Into<String>) {
        *self.key.borrow_mut() = key.into();
    }

    /// The enclosing unit's scope, if this unit is nested.
    pub fn parent(&self) -> Option<&Rc<NestedScope<H>>> {
        self.parent.as_ref()
    }

    /// Walk up the scope chain (starting at this scope) looking for the
    /// scope with the given key.
    pub fn find(self: &Rc<Self>, key: &str) -> Option<Rc<NestedScope<H>>> {
        let mut current = Some(Rc::clone(self));
        while let Some(scope) = current {
            if scope.key() == key {
                return Some(scope);
            }
            current = scope.parent.clone();
        }
        None
    }

    /// The owning unit's first snapshot with its rect expressed relative to
    /// the root of the scope chain: the unit's own rect offset by the
    /// parent's composed first rect, recursively. `None` when the unit has
    /// no first snapshot recorded. The root scope contributes zero offset.
    pub fn composed_first(&self) -> Option<StyleSnapshot> {
        let own = self.registry.first(&self.key())?;
        Some(self.composed(own, |parent| parent.composed_first()))
    }

    /// Symmetric to [`composed_first`](Self::composed_first), using last
    /// snapshots.
    pub fn composed_last(&self) -> Option<StyleSnapshot> {
        let own = self.registry.last(&self.key())?;
        Some(self.composed(own, |parent| parent.composed_last()))
    }

    fn composed(
        &self,
        own: StyleSnapshot,
        read_parent: impl Fn(&NestedScope<H>) -> Option<StyleSnapshot>,
    ) -> StyleSnapshot {
        let (dx, dy) = self
            .parent
            .as_deref()
            .and_then(read_parent)
            .map(|parent| (parent.rect.left, parent.rect.top))
            .unwrap_or((0.0, 0.0));
        let rect = own.rect.translated(dx, dy);
        own.with_rect(rect)
    }

    /// The unflip nodes registered with this scope.
    pub fn unflips(&self) -> Vec<H::Node> {
        self.unflips.borrow().clone()
    }

    /// Replace the unflip registrations.
    pub fn set_unflips(&self, nodes: Vec<H::Node>) {
        *self.unflips.borrow_mut() = nodes;
    }

    /// Append unflip registrations (descendants declare themselves).
    pub fn add_unflips(&self, nodes: &[H::Node]) {
        self.unflips.borrow_mut().extend_from_slice(nodes);
    }

    /// Remove specific unflip registrations, e.g. when a declaration
    /// re-targets.
    pub fn remove_unflips(&self, nodes: &[H::Node]) {
        self.unflips
            .borrow_mut()
            .retain(|node| !nodes.contains(node));
    }
}
