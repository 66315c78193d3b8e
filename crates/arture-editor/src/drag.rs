//! Drag-and-drop between the sidebar and the canvas workspace.
//!
//! The sidebar (origin) and the workspace (destination) never talk to each
//! other directly. Both hold the same [`SharedDragTracker`]: the origin calls
//! [`begin_drag`](DragInteractionTracker::begin_drag), the host's pointer
//! handlers feed [`update_drag_position`](DragInteractionTracker::update_drag_position),
//! and the workspace registers a drop handler and watches the state for
//! visual feedback.
//!
//! Lifecycle: `Idle → Dragging → Idle`, leaving `Dragging` on end or cancel.
//! Only one gesture is tracked. Beginning a drag while one is in progress
//! restarts the state (last writer wins).

use arture_core::model::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// ─── State ───────────────────────────────────────────────────────────────

/// What kind of sidebar item is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragItemKind {
    Shape,
    Text,
    Image,
    Template,
}

/// The dragged payload, opaque to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragItem {
    #[serde(rename = "type")]
    pub kind: DragItemKind,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Shared drag state.
///
/// `is_over_workspace`, `workspace_bounds`, `item` and `pointer` only mean
/// something while `is_dragging` is true.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DragState {
    pub is_dragging: bool,
    pub is_over_workspace: bool,
    pub workspace_bounds: Option<Rect>,
    pub item: Option<DragItem>,
    pub pointer: Option<Point>,
}

impl DragState {
    /// True when a drop released now would land on the workspace.
    pub fn can_drop(&self) -> bool {
        self.is_dragging && self.is_over_workspace && self.workspace_bounds.is_some()
    }
}

/// How a drag starts: the item being dragged and where the pointer is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragStart {
    pub item: Option<DragItem>,
    pub pointer: Option<Point>,
}

/// A completed drop onto the workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragDrop {
    pub item: DragItem,
    /// Pointer position relative to the workspace's top-left corner.
    pub position: Point,
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Supplies the workspace's current bounding rectangle in viewport pixels.
///
/// Queried on every position update; implementations must not cache, so
/// layout changes during a drag are picked up. `None` means the workspace is
/// not currently laid out.
pub trait BoundsProvider {
    fn workspace_bounds(&self) -> Option<Rect>;
}

impl<F> BoundsProvider for F
where
    F: Fn() -> Option<Rect>,
{
    fn workspace_bounds(&self) -> Option<Rect> {
        self()
    }
}

impl BoundsProvider for Rect {
    fn workspace_bounds(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl BoundsProvider for Option<Rect> {
    fn workspace_bounds(&self) -> Option<Rect> {
        *self
    }
}

// ─── Tracker ─────────────────────────────────────────────────────────────

/// Identifies a state watcher registered with [`DragInteractionTracker::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

type DropHandler = Box<dyn FnMut(&DragDrop)>;
type Watcher = Box<dyn FnMut(&DragState)>;

/// Single shared drag-state cell with its transitions.
#[derive(Default)]
pub struct DragInteractionTracker {
    state: DragState,
    on_drop: Option<DropHandler>,
    watchers: Vec<(WatchId, Watcher)>,
    next_watch: u64,
}

/// The tracker as injected into both origin and destination components.
pub type SharedDragTracker = Rc<RefCell<DragInteractionTracker>>;

impl DragInteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDragTracker {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// Register the destination's drop handler, replacing any previous one.
    pub fn set_drop_handler(&mut self, handler: impl FnMut(&DragDrop) + 'static) {
        self.on_drop = Some(Box::new(handler));
    }

    pub fn clear_drop_handler(&mut self) {
        self.on_drop = None;
    }

    /// Call `watcher` with the new state after every transition.
    pub fn watch(&mut self, watcher: impl FnMut(&DragState) + 'static) -> WatchId {
        let id = WatchId(self.next_watch);
        self.next_watch += 1;
        self.watchers.push((id, Box::new(watcher)));
        id
    }

    pub fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(w, _)| *w != id);
        self.watchers.len() != before
    }

    fn notify(&mut self) {
        for (_, watcher) in &mut self.watchers {
            watcher(&self.state);
        }
    }

    /// Enter `Dragging`. Not over the workspace and no known bounds until the
    /// first position update.
    pub fn begin_drag(&mut self, start: DragStart) {
        if self.state.is_dragging {
            // Overlapping gestures are not supported; the newest one wins.
            log::warn!("drag restarted while another drag was in progress");
        }
        self.state = DragState {
            is_dragging: true,
            is_over_workspace: false,
            workspace_bounds: None,
            item: start.item,
            pointer: start.pointer,
        };
        log::debug!("drag begin {:?}", self.state.item.as_ref().map(|i| i.kind));
        self.notify();
    }

    /// Track the pointer. Bounds are fetched from `bounds` on every call.
    /// Does nothing while idle.
    pub fn update_drag_position(&mut self, pointer: Point, bounds: &impl BoundsProvider) {
        if !self.state.is_dragging {
            return;
        }
        let rect = bounds.workspace_bounds();
        self.state.pointer = Some(pointer);
        self.state.workspace_bounds = rect;
        self.state.is_over_workspace = rect.is_some_and(|r| r.contains(pointer));
        log::trace!(
            "DRAG ({}, {}) over={}",
            pointer.x,
            pointer.y,
            self.state.is_over_workspace
        );
        self.notify();
    }

    /// Finish the gesture and return to `Idle`.
    ///
    /// If the last update put the pointer over the workspace and an item is
    /// being dragged, the drop is handed to the drop handler and returned.
    /// Does nothing while idle.
    pub fn end_drag(&mut self) -> Option<DragDrop> {
        if !self.state.is_dragging {
            return None;
        }

        let state = std::mem::take(&mut self.state);
        let dropped = match (state.can_drop(), state.item, state.pointer, state.workspace_bounds) {
            (true, Some(item), Some(pointer), Some(bounds)) => Some(DragDrop {
                item,
                position: bounds.to_local(pointer),
            }),
            _ => None,
        };

        if let Some(drop) = &dropped {
            log::debug!(
                "drop {:?} at ({}, {})",
                drop.item.kind,
                drop.position.x,
                drop.position.y
            );
            if let Some(handler) = self.on_drop.as_mut() {
                handler(drop);
            }
        }
        self.notify();
        dropped
    }

    /// Abandon the gesture (e.g. Escape) without dropping. Idempotent.
    pub fn cancel_drag(&mut self) {
        if !self.state.is_dragging {
            return;
        }
        self.state = DragState::default();
        log::debug!("drag cancelled");
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const WORKSPACE: Rect = Rect::new(100.0, 50.0, 800.0, 600.0);

    fn shape_item() -> DragItem {
        DragItem {
            kind: DragItemKind::Shape,
            data: serde_json::json!({ "shape": "circle" }),
        }
    }

    #[test]
    fn begin_sets_dragging_not_over() {
        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart::default());
        assert!(tracker.state().is_dragging);
        assert!(!tracker.state().is_over_workspace);
        assert_eq!(tracker.state().workspace_bounds, None);
    }

    #[test]
    fn update_inside_and_outside() {
        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart::default());

        tracker.update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);
        assert!(tracker.state().is_over_workspace);
        assert_eq!(tracker.state().workspace_bounds, Some(WORKSPACE));

        tracker.update_drag_position(Point::new(20.0, 200.0), &WORKSPACE);
        assert!(!tracker.state().is_over_workspace);
    }

    #[test]
    fn edges_count_as_inside() {
        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart::default());
        tracker.update_drag_position(Point::new(900.0, 650.0), &WORKSPACE);
        assert!(tracker.state().is_over_workspace);
    }

    #[test]
    fn bounds_are_queried_live() {
        let layout = Rc::new(Cell::new(WORKSPACE));
        let l = Rc::clone(&layout);
        let provider = move || Some(l.get());

        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart::default());
        tracker.update_drag_position(Point::new(120.0, 60.0), &provider);
        assert!(tracker.state().is_over_workspace);

        // Sidebar opens and the workspace shifts right.
        layout.set(Rect::new(400.0, 50.0, 500.0, 600.0));
        tracker.update_drag_position(Point::new(120.0, 60.0), &provider);
        assert!(!tracker.state().is_over_workspace);
        assert_eq!(tracker.state().workspace_bounds, Some(layout.get()));
    }

    #[test]
    fn unmounted_workspace_is_not_a_target() {
        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart::default());
        tracker.update_drag_position(Point::new(300.0, 200.0), &None::<Rect>);
        assert!(!tracker.state().is_over_workspace);
        assert_eq!(tracker.state().workspace_bounds, None);
    }

    #[test]
    fn end_resets_to_idle() {
        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart::default());
        tracker.update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);
        tracker.end_drag();
        assert_eq!(tracker.state(), &DragState::default());
    }

    #[test]
    fn drop_over_workspace_reports_local_position() {
        let dropped = Rc::new(RefCell::new(None));
        let d = Rc::clone(&dropped);

        let mut tracker = DragInteractionTracker::new();
        tracker.set_drop_handler(move |drop| *d.borrow_mut() = Some(drop.clone()));
        tracker.begin_drag(DragStart {
            item: Some(shape_item()),
            pointer: Some(Point::new(10.0, 10.0)),
        });
        tracker.update_drag_position(Point::new(150.0, 80.0), &WORKSPACE);

        let drop = tracker.end_drag().expect("dropped on workspace");
        assert_eq!(drop.position, Point::new(50.0, 30.0));
        assert_eq!(drop.item, shape_item());
        assert_eq!(dropped.borrow().as_ref(), Some(&drop));
    }

    #[test]
    fn release_outside_does_not_drop() {
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);

        let mut tracker = DragInteractionTracker::new();
        tracker.set_drop_handler(move |_| f.set(true));
        tracker.begin_drag(DragStart {
            item: Some(shape_item()),
            pointer: None,
        });
        tracker.update_drag_position(Point::new(5.0, 5.0), &WORKSPACE);

        assert_eq!(tracker.end_drag(), None);
        assert!(!fired.get());
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn idle_operations_are_noops() {
        let notified = Rc::new(Cell::new(0));
        let n = Rc::clone(&notified);
        let mut tracker = DragInteractionTracker::new();
        tracker.watch(move |_| n.set(n.get() + 1));

        tracker.update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);
        assert_eq!(tracker.end_drag(), None);
        tracker.cancel_drag();
        tracker.cancel_drag();

        assert_eq!(tracker.state(), &DragState::default());
        assert_eq!(notified.get(), 0);
    }

    #[test]
    fn cancel_clears_without_dropping() {
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let mut tracker = DragInteractionTracker::new();
        tracker.set_drop_handler(move |_| f.set(true));

        tracker.begin_drag(DragStart {
            item: Some(shape_item()),
            pointer: None,
        });
        tracker.update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);
        tracker.cancel_drag();

        assert_eq!(tracker.state(), &DragState::default());
        assert!(!fired.get());
    }

    #[test]
    fn begin_while_dragging_restarts() {
        let mut tracker = DragInteractionTracker::new();
        tracker.begin_drag(DragStart {
            item: Some(shape_item()),
            pointer: None,
        });
        tracker.update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);

        let text = DragItem {
            kind: DragItemKind::Text,
            data: serde_json::Value::Null,
        };
        tracker.begin_drag(DragStart {
            item: Some(text.clone()),
            pointer: None,
        });

        assert!(tracker.state().is_dragging);
        assert!(!tracker.state().is_over_workspace);
        assert_eq!(tracker.state().workspace_bounds, None);
        assert_eq!(tracker.state().item, Some(text));
    }

    #[test]
    fn watchers_see_every_transition() {
        let log: Rc<RefCell<Vec<(bool, bool)>>> = Rc::default();
        let l = Rc::clone(&log);
        let mut tracker = DragInteractionTracker::new();
        let id = tracker.watch(move |s| l.borrow_mut().push((s.is_dragging, s.is_over_workspace)));

        tracker.begin_drag(DragStart::default());
        tracker.update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);
        tracker.end_drag();
        assert_eq!(*log.borrow(), vec![(true, false), (true, true), (false, false)]);

        assert!(tracker.unwatch(id));
        tracker.begin_drag(DragStart::default());
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn shared_tracker_connects_origin_and_destination() {
        let tracker = DragInteractionTracker::shared();
        let origin = Rc::clone(&tracker);
        let destination = Rc::clone(&tracker);

        origin.borrow_mut().begin_drag(DragStart {
            item: Some(shape_item()),
            pointer: None,
        });
        destination
            .borrow_mut()
            .update_drag_position(Point::new(300.0, 200.0), &WORKSPACE);

        assert!(tracker.borrow().state().can_drop());
    }

    #[test]
    fn item_json_shape() {
        let item: DragItem =
            serde_json::from_str(r#"{"type":"image","data":{"url":"https://img.example/a.png"}}"#)
                .unwrap();
        assert_eq!(item.kind, DragItemKind::Image);
        assert_eq!(item.data["url"], "https://img.example/a.png");
    }
}
