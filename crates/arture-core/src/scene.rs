//! The observable scene graph.
//!
//! A `StableDiGraph` of [`SceneObject`] values with edges going parent → child.
//! Every structural change goes through a `Scene` method so that exactly one
//! [`SceneEvent`] is dispatched per mutation, after the mutation is applied.
//!
//! Listeners are registered per event kind and held by an RAII
//! [`Subscription`]: dropping the handle unsubscribes. The scene is
//! single-threaded (`Rc`/`RefCell`), matching the UI event loop it serves.

use crate::id::ObjectId;
use crate::model::{ObjectKind, Paint, SceneObject};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

// ─── Events ──────────────────────────────────────────────────────────────

/// The kinds of mutation a scene reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEventKind {
    ObjectAdded,
    ObjectModified,
    ObjectRemoved,
}

impl SceneEventKind {
    pub const ALL: [SceneEventKind; 3] = [
        SceneEventKind::ObjectAdded,
        SceneEventKind::ObjectModified,
        SceneEventKind::ObjectRemoved,
    ];
}

/// A dispatched mutation: what happened, and to which object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneEvent {
    pub kind: SceneEventKind,
    pub target: ObjectId,
}

type Listener = Rc<dyn Fn(&Scene, &SceneEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    kind: SceneEventKind,
    callback: Listener,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    fn insert(&mut self, kind: SceneEventKind, callback: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(ListenerEntry { id, kind, callback });
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}

/// Handle for a registered scene listener. Dropping it unsubscribes.
///
/// Holds only a weak reference to the scene's listener registry, so an
/// outstanding subscription never keeps a dropped scene alive.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    registry: Weak<RefCell<ListenerRegistry>>,
    id: ListenerId,
    kind: SceneEventKind,
}

impl Subscription {
    pub fn kind(&self) -> SceneEventKind {
        self.kind
    }

    /// Whether the listener is still registered on a live scene.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }

    /// Release the listener now. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade()
            && registry.borrow_mut().remove(self.id)
        {
            log::debug!("released {:?} listener {}", self.kind, self.id.0);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id.0)
            .field("kind", &self.kind)
            .finish()
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// The canvas document: a tree of objects under a root.
pub struct Scene {
    graph: StableDiGraph<SceneObject, ()>,
    root: NodeIndex,
    id_index: HashMap<ObjectId, NodeIndex>,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root_id = ObjectId::intern("root");
        let root = graph.add_node(SceneObject::new(root_id, ObjectKind::Root));

        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);

        Self {
            graph,
            root,
            id_index,
            listeners: Rc::default(),
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    /// Register `callback` for events of `kind`.
    ///
    /// Callbacks receive the scene after the mutation has been applied.
    /// They may register or release listeners while being dispatched.
    pub fn on(
        &self,
        kind: SceneEventKind,
        callback: impl Fn(&Scene, &SceneEvent) + 'static,
    ) -> Subscription {
        let id = self.listeners.borrow_mut().insert(kind, Rc::new(callback));
        log::debug!("registered {kind:?} listener {}", id.0);
        Subscription {
            registry: Rc::downgrade(&self.listeners),
            id,
            kind,
        }
    }

    /// Number of live listeners for `kind`.
    pub fn listener_count(&self, kind: SceneEventKind) -> usize {
        self.listeners
            .borrow()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    fn emit(&self, kind: SceneEventKind, target: ObjectId) {
        let event = SceneEvent { kind, target };
        let pending: SmallVec<[(ListenerId, Listener); 4]> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| (e.id, Rc::clone(&e.callback)))
            .collect();

        log::trace!("EMIT {kind:?} {target:?} -> {} listener(s)", pending.len());
        for (id, callback) in pending {
            // A listener released earlier in this dispatch must not run.
            if self.listeners.borrow().contains(id) {
                callback(self, &event);
            }
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Add an object at the top level. `None` if its id is already taken.
    pub fn add(&mut self, object: SceneObject) -> Option<NodeIndex> {
        self.add_to(self.root, object)
    }

    /// Add an object as the last child of `parent`.
    ///
    /// Returns `None`, without firing an event, when `parent` is no longer in
    /// the scene or another object already uses the id.
    pub fn add_to(&mut self, parent: NodeIndex, object: SceneObject) -> Option<NodeIndex> {
        let id = object.id;
        if !self.graph.contains_node(parent) {
            log::warn!("add {id:?}: parent {parent:?} is not in the scene");
            return None;
        }
        if self.id_index.contains_key(&id) {
            log::warn!("add {id:?}: id already in use");
            return None;
        }
        let idx = self.graph.add_node(object);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        self.emit(SceneEventKind::ObjectAdded, id);
        Some(idx)
    }

    /// Apply `edit` to the object with `id`. Returns false if there is no such
    /// object. Fires `ObjectModified` even if `edit` changed nothing, the way
    /// an editing tool reports the end of every modification gesture.
    ///
    /// Ids are fixed once added; an id changed by `edit` is put back.
    pub fn modify(&mut self, id: ObjectId, edit: impl FnOnce(&mut SceneObject)) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == self.root {
            return false;
        }
        let object = &mut self.graph[idx];
        edit(object);
        object.id = id;
        self.emit(SceneEventKind::ObjectModified, id);
        true
    }

    pub fn set_fill(&mut self, id: ObjectId, fill: Option<Paint>) -> bool {
        self.modify(id, |obj| obj.fill = fill)
    }

    pub fn set_stroke(&mut self, id: ObjectId, stroke: Option<Paint>) -> bool {
        self.modify(id, |obj| obj.stroke = stroke)
    }

    /// Remove an object together with its descendants.
    /// Fires a single `ObjectRemoved` for `id`.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.index_of(id)?;
        if idx == self.root {
            return None;
        }

        let mut stack = self.children(idx);
        while let Some(child) = stack.pop() {
            stack.extend(self.children(child));
            if let Some(obj) = self.graph.remove_node(child) {
                self.id_index.remove(&obj.id);
            }
        }

        let removed = self.graph.remove_node(idx)?;
        self.id_index.remove(&removed.id);
        self.emit(SceneEventKind::ObjectRemoved, id);
        Some(removed)
    }

    /// Remove every object, one `ObjectRemoved` per top-level object.
    pub fn clear(&mut self) {
        for idx in self.children(self.root) {
            let id = self.graph[idx].id;
            self.remove(id);
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.index_of(id)
            .filter(|idx| *idx != self.root)
            .map(|idx| &self.graph[idx])
    }

    pub fn index_of(&self, id: ObjectId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in insertion (z) order.
    ///
    /// Node indices are reused after removals, so the order comes from the
    /// adjacency list (newest edge first), reversed.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    /// Every object in document order: depth-first, parents before their
    /// children, siblings back to front. The root is not included.
    pub fn objects(&self) -> Objects<'_> {
        let mut stack = self.children(self.root);
        stack.reverse();
        Objects { scene: self, stack }
    }

    /// Number of objects, excluding the root.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.len())
            .field("listeners", &self.listeners.borrow().entries.len())
            .finish()
    }
}

/// Depth-first iterator over a scene's objects. See [`Scene::objects`].
pub struct Objects<'a> {
    scene: &'a Scene,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = &'a SceneObject;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let mut children = self.scene.children(idx);
        children.reverse();
        self.stack.extend(children);
        Some(&self.scene.graph[idx])
    }
}
