//! The scripted node arena and manual scheduler.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use glide_host::{
    AnimationHandle, AnimationTiming, HostCallback, Keyframe, Rect, RenderHost, Scheduler,
};

/// Index into the [`MockHost`] node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockNode(pub usize);

#[derive(Debug, Default)]
struct NodeData {
    rect: Rect,
    computed: BTreeMap<String, String>,
    inline: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Root-level connectivity; non-roots derive theirs from ancestors.
    connected: bool,
}

struct AnimationRecord {
    node: MockNode,
    keyframes: Vec<Keyframe>,
    timing: AnimationTiming,
    cancelled: bool,
    finished: bool,
    on_finish: Option<HostCallback>,
}

/// A copyable view of one recorded animation, for assertions.
#[derive(Debug, Clone)]
pub struct AnimationView {
    pub node: MockNode,
    pub keyframes: Vec<Keyframe>,
    pub timing: AnimationTiming,
    pub cancelled: bool,
    pub finished: bool,
}

/// Handle returned by the mock's `start_animation`.
#[derive(Clone)]
pub struct MockAnimation(Rc<RefCell<AnimationRecord>>);

impl AnimationHandle for MockAnimation {
    fn cancel(&self) {
        let mut record = self.0.borrow_mut();
        if !record.finished {
            record.cancelled = true;
            record.on_finish = None;
        }
    }

    fn set_on_finish(&self, callback: HostCallback) {
        self.0.borrow_mut().on_finish = Some(callback);
    }
}

/// In-memory host: scripted render tree + manually pumped scheduler.
pub struct MockHost {
    nodes: RefCell<Vec<NodeData>>,
    animations: RefCell<Vec<Rc<RefCell<AnimationRecord>>>>,
    frames: RefCell<VecDeque<HostCallback>>,
    microtasks: RefCell<VecDeque<HostCallback>>,
    ticks: RefCell<VecDeque<HostCallback>>,
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHost")
            .field("nodes", &self.nodes.borrow().len())
            .field("animations", &self.animations.borrow().len())
            .finish()
    }
}

impl MockHost {
    /// Create an empty host.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            nodes: RefCell::new(Vec::new()),
            animations: RefCell::new(Vec::new()),
            frames: RefCell::new(VecDeque::new()),
            microtasks: RefCell::new(VecDeque::new()),
            ticks: RefCell::new(VecDeque::new()),
        })
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    /// Create a connected root node with the given rect.
    pub fn create_root(&self, rect: Rect) -> MockNode {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            rect,
            connected: true,
            ..Default::default()
        });
        MockNode(nodes.len() - 1)
    }

    /// Create a node appended to `parent`'s children.
    pub fn create_child(&self, parent: MockNode, rect: Rect) -> MockNode {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            rect,
            parent: Some(parent.0),
            ..Default::default()
        });
        let id = nodes.len() - 1;
        nodes[parent.0].children.push(id);
        MockNode(id)
    }

    /// Script a node's committed layout rectangle.
    pub fn set_rect(&self, node: MockNode, rect: Rect) {
        self.nodes.borrow_mut()[node.0].rect = rect;
    }

    /// Script a node's computed style property.
    pub fn set_computed(&self, node: MockNode, property: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .computed
            .insert(property.to_string(), value.to_string());
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// A node's inline style property, if set by the core.
    pub fn inline_style(&self, node: MockNode, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0].inline.get(property).cloned()
    }

    /// A node's attribute, if set by the core.
    pub fn attribute(&self, node: MockNode, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attributes.get(name).cloned()
    }

    /// Whether a node currently carries a class.
    pub fn has_class(&self, node: MockNode, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.contains(class)
    }

    /// The children of a node, in order.
    pub fn children(&self, node: MockNode) -> Vec<MockNode> {
        self.nodes.borrow()[node.0]
            .children
            .iter()
            .map(|&id| MockNode(id))
            .collect()
    }

    /// Total number of animations ever started.
    pub fn animation_count(&self) -> usize {
        self.animations.borrow().len()
    }

    /// Number of animations on `node` that are neither finished nor
    /// cancelled.
    pub fn live_animation_count(&self, node: MockNode) -> usize {
        self.animations
            .borrow()
            .iter()
            .filter(|record| {
                let record = record.borrow();
                record.node == node && !record.finished && !record.cancelled
            })
            .count()
    }

    /// Views of every recorded animation, in start order.
    pub fn animation_views(&self) -> Vec<AnimationView> {
        self.animations
            .borrow()
            .iter()
            .map(|record| {
                let record = record.borrow();
                AnimationView {
                    node: record.node,
                    keyframes: record.keyframes.clone(),
                    timing: record.timing.clone(),
                    cancelled: record.cancelled,
                    finished: record.finished,
                }
            })
            .collect()
    }

    /// The most recently started animation.
    pub fn last_animation(&self) -> Option<AnimationView> {
        self.animation_views().pop()
    }

    // ------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------

    /// Finish every live animation, firing finish callbacks in start order.
    /// Cancelled animations never fire.
    pub fn finish_animations(&self) {
        let records: Vec<_> = self.animations.borrow().clone();
        for record in records {
            let callback = {
                let mut record = record.borrow_mut();
                if record.finished || record.cancelled {
                    continue;
                }
                record.finished = true;
                record.on_finish.take()
            };
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    /// Render one frame: run the callbacks waiting for it. Callbacks
    /// scheduled while running land in the next frame.
    pub fn run_frame(&self) {
        let callbacks: Vec<_> = self.frames.borrow_mut().drain(..).collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Drain the microtask queue, including cascading microtasks.
    pub fn run_microtasks(&self) {
        loop {
            let callback = self.microtasks.borrow_mut().pop_front();
            match callback {
                Some(callback) => callback(),
                None => break,
            }
        }
    }

    /// Run one macrotask tick: every callback scheduled before this call.
    pub fn run_tick(&self) {
        let callbacks: Vec<_> = self.ticks.borrow_mut().drain(..).collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Pump microtasks, a frame, and a tick until everything scheduled has
    /// run. Bounded, because per-frame loops may legitimately re-schedule
    /// forever while an animation-driven style is still scripted.
    pub fn settle(&self) {
        for _ in 0..64 {
            if self.microtasks.borrow().is_empty()
                && self.frames.borrow().is_empty()
                && self.ticks.borrow().is_empty()
            {
                return;
            }
            self.run_microtasks();
            self.run_frame();
            self.run_tick();
        }
    }

    /// Callbacks currently waiting for the next frame.
    pub fn pending_frame_callbacks(&self) -> usize {
        self.frames.borrow().len()
    }

    fn root_of(&self, node: usize) -> usize {
        let nodes = self.nodes.borrow();
        let mut current = node;
        while let Some(parent) = nodes[current].parent {
            current = parent;
        }
        current
    }
}

impl RenderHost for MockHost {
    type Node = MockNode;
    type Handle = MockAnimation;

    fn rect(&self, node: &MockNode) -> Rect {
        self.nodes.borrow()[node.0].rect
    }

    fn computed_style(&self, node: &MockNode, property: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];
        data.inline
            .get(property)
            .or_else(|| data.computed.get(property))
            .cloned()
    }

    fn add_class(&self, node: &MockNode, class: &str) {
        self.nodes.borrow_mut()[node.0]
            .classes
            .insert(class.to_string());
    }

    fn remove_class(&self, node: &MockNode, class: &str) {
        self.nodes.borrow_mut()[node.0].classes.remove(class);
    }

    fn set_inline_style(&self, node: &MockNode, property: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .inline
            .insert(property.to_string(), value.to_string());
    }

    fn remove_inline_style(&self, node: &MockNode, property: &str) {
        self.nodes.borrow_mut()[node.0].inline.remove(property);
    }

    fn set_attribute(&self, node: &MockNode, name: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, node: &MockNode, name: &str) {
        self.nodes.borrow_mut()[node.0].attributes.remove(name);
    }

    fn parent(&self, node: &MockNode) -> Option<MockNode> {
        self.nodes.borrow()[node.0].parent.map(MockNode)
    }

    fn next_sibling(&self, node: &MockNode) -> Option<MockNode> {
        let nodes = self.nodes.borrow();
        let parent = nodes[node.0].parent?;
        let siblings = &nodes[parent].children;
        let index = siblings.iter().position(|&id| id == node.0)?;
        siblings.get(index + 1).map(|&id| MockNode(id))
    }

    fn insert_before(&self, parent: &MockNode, node: &MockNode, reference: Option<&MockNode>) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(old_parent) = nodes[node.0].parent {
            nodes[old_parent].children.retain(|&id| id != node.0);
        }
        nodes[node.0].parent = Some(parent.0);
        let children = &mut nodes[parent.0].children;
        let index = reference
            .and_then(|reference| children.iter().position(|&id| id == reference.0))
            .unwrap_or(children.len());
        children.insert(index, node.0);
    }

    fn remove_node(&self, node: &MockNode) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent].children.retain(|&id| id != node.0);
        }
        nodes[node.0].connected = false;
    }

    fn is_connected(&self, node: &MockNode) -> bool {
        let root = self.root_of(node.0);
        self.nodes.borrow()[root].connected
    }

    fn start_animation(
        &self,
        node: &MockNode,
        keyframes: &[Keyframe],
        timing: &AnimationTiming,
    ) -> MockAnimation {
        let record = Rc::new(RefCell::new(AnimationRecord {
            node: *node,
            keyframes: keyframes.to_vec(),
            timing: timing.clone(),
            cancelled: false,
            finished: false,
            on_finish: None,
        }));
        self.animations.borrow_mut().push(Rc::clone(&record));
        MockAnimation(record)
    }
}

impl Scheduler for MockHost {
    fn after_next_frame(&self, callback: HostCallback) {
        self.frames.borrow_mut().push_back(callback);
    }

    fn after_microtasks(&self, callback: HostCallback) {
        self.microtasks.borrow_mut().push_back(callback);
    }

    fn after_tick(&self, _delay_ms: u32, callback: HostCallback) {
        self.ticks.borrow_mut().push_back(callback);
    }
}
