//! Live document palette.
//!
//! `SceneColorObserver` attaches to a [`Scene`], recomputes the document
//! colors immediately, and again after every added / modified / removed
//! event. Each event triggers exactly one full recomputation; nothing is
//! batched or diffed, the palette is always replaced wholesale.

use arture_core::palette::{DocumentColor, extract_colors};
use arture_core::scene::{Scene, SceneEventKind, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

type PaletteListener = Rc<dyn Fn(&[DocumentColor])>;

#[derive(Default)]
struct Published {
    colors: Vec<DocumentColor>,
    revision: u64,
    listener: Option<PaletteListener>,
}

/// Recompute and publish. Shared by attach, manual refresh and the scene
/// listeners.
fn publish(published: &RefCell<Published>, scene: &Scene) {
    let colors = extract_colors(scene);
    let listener = {
        let mut state = published.borrow_mut();
        state.colors = colors;
        state.revision += 1;
        log::trace!(
            "PALETTE rev {} -> {} color(s)",
            state.revision,
            state.colors.len()
        );
        state.listener.clone()
    };

    if let Some(listener) = listener {
        let state = published.borrow();
        listener(&state.colors);
    }
}

/// Keeps the document color palette in sync with a scene.
///
/// Holds no reference to the scene itself: only the three listener
/// [`Subscription`]s, which are released on [`detach`](Self::detach), on
/// re-attach and on drop.
#[derive(Default)]
pub struct SceneColorObserver {
    published: Rc<RefCell<Published>>,
    subscriptions: Vec<Subscription>,
}

impl SceneColorObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` with the new palette after every recomputation.
    /// Replaces any previous listener.
    ///
    /// The listener may read the observer but must not replace itself.
    pub fn set_listener(&mut self, listener: impl Fn(&[DocumentColor]) + 'static) {
        self.published.borrow_mut().listener = Some(Rc::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.published.borrow_mut().listener = None;
    }

    /// Attach to `scene`, detaching from any previous scene first.
    ///
    /// With `Some`, the palette is recomputed right away and then on every
    /// mutation event. With `None` the observer ends up detached and the
    /// last published palette is kept.
    pub fn attach(&mut self, scene: Option<&Scene>) {
        self.detach();
        let Some(scene) = scene else {
            log::debug!("palette observer attached to no scene; keeping last palette");
            return;
        };

        publish(&self.published, scene);
        for kind in SceneEventKind::ALL {
            let published = Rc::clone(&self.published);
            let sub = scene.on(kind, move |scene, _event| publish(&published, scene));
            self.subscriptions.push(sub);
        }
        log::debug!("palette observer attached ({} subscriptions)", self.subscriptions.len());
    }

    /// Release every scene subscription. No recomputation happens after this
    /// until the next `attach`.
    pub fn detach(&mut self) {
        if !self.subscriptions.is_empty() {
            log::debug!("palette observer detached");
        }
        self.subscriptions.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Recompute from `scene` on demand. A missing scene is a no-op that
    /// keeps the previously published palette.
    pub fn refresh(&self, scene: Option<&Scene>) {
        if let Some(scene) = scene {
            publish(&self.published, scene);
        }
    }

    /// The current palette.
    pub fn colors(&self) -> Vec<DocumentColor> {
        self.published.borrow().colors.clone()
    }

    /// Number of recomputations so far.
    pub fn revision(&self) -> u64 {
        self.published.borrow().revision
    }
}
