//! Editor-side plumbing for the Arture canvas: the live document palette,
//! sidebar → workspace drag tracking, the drop-zone highlight, and the
//! session gate in front of editor routes.

pub mod drag;
pub mod drop_zone;
pub mod guard;
pub mod observer;

pub use drag::{
    BoundsProvider, DragDrop, DragInteractionTracker, DragItem, DragItemKind, DragStart,
    DragState, SharedDragTracker,
};
pub use drop_zone::{DropZoneFrame, DropZoneIndicator, DropZoneStyle};
pub use guard::{AuthGuard, GuardConfig, GuardDecision, Session, SessionError, SessionProvider};
pub use observer::SceneColorObserver;
