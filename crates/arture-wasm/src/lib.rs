//! WASM bridge for Arture: exposes the scene, the document palette and the
//! sidebar drag tracker to the web editor.
//!
//! Compiled via `wasm-pack build --target web`. Structured values cross the
//! boundary as JSON strings.

use arture_core::id::ObjectId;
use arture_core::model::{Paint, Point, Rect, SceneObject};
use arture_core::palette::generate_shades as shade_ramp;
use arture_core::scene::Scene;
use arture_core::Color;
use arture_editor::drag::{DragInteractionTracker, DragItem, DragStart};
use arture_editor::drop_zone::{DropZoneIndicator, DropZoneStyle};
use arture_editor::guard::{AuthGuard, GuardDecision, Session, SessionError};
use arture_editor::observer::SceneColorObserver;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// The WASM-facing editor controller.
///
/// Owns the scene and keeps the document palette attached to it. The drag
/// tracker is fed by the host's sidebar and pointer handlers.
#[wasm_bindgen]
pub struct ArtureCanvas {
    scene: Scene,
    palette: SceneColorObserver,
    /// Set by the palette listener, cleared by `take_palette_changed`.
    palette_dirty: Rc<Cell<bool>>,
    drag: DragInteractionTracker,
    drop_zone: DropZoneIndicator,
    /// Last workspace rectangle reported by the host, in viewport pixels.
    workspace: Option<Rect>,
}

#[wasm_bindgen]
impl ArtureCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();

        let scene = Scene::new();
        let palette_dirty = Rc::new(Cell::new(false));
        let mut palette = SceneColorObserver::new();
        let dirty = Rc::clone(&palette_dirty);
        palette.set_listener(move |_| dirty.set(true));
        palette.attach(Some(&scene));

        Self {
            scene,
            palette,
            palette_dirty,
            drag: DragInteractionTracker::new(),
            drop_zone: DropZoneIndicator::default(),
            workspace: None,
        }
    }

    /// Replace the drop-zone style from JSON; missing fields keep defaults.
    /// Returns `false` on malformed JSON.
    pub fn set_drop_zone_style(&mut self, json: &str) -> bool {
        match serde_json::from_str::<DropZoneStyle>(json) {
            Ok(style) => {
                self.drop_zone = DropZoneIndicator::new(style);
                true
            }
            Err(e) => {
                log::warn!("bad drop zone style: {e}");
                false
            }
        }
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    /// Add an object from its JSON form. Returns `false` on malformed JSON or
    /// an id already in use.
    pub fn add_object(&mut self, json: &str) -> bool {
        let object: SceneObject = match serde_json::from_str(json) {
            Ok(object) => object,
            Err(e) => {
                log::warn!("bad object json: {e}");
                return false;
            }
        };
        self.scene.add(object).is_some()
    }

    /// Set an object's fill to a CSS color; an empty string clears it.
    pub fn set_fill(&mut self, id: &str, css: &str) -> bool {
        self.scene.set_fill(ObjectId::intern(id), paint_from_css(css))
    }

    /// Set an object's stroke to a CSS color; an empty string clears it.
    pub fn set_stroke(&mut self, id: &str, css: &str) -> bool {
        self.scene.set_stroke(ObjectId::intern(id), paint_from_css(css))
    }

    pub fn remove_object(&mut self, id: &str) -> bool {
        self.scene.remove(ObjectId::intern(id)).is_some()
    }

    pub fn clear(&mut self) {
        self.scene.clear();
    }

    pub fn object_count(&self) -> usize {
        self.scene.len()
    }

    /// Get every object as a JSON array, in document order.
    pub fn objects_json(&self) -> String {
        let objects: Vec<&SceneObject> = self.scene.objects().collect();
        serde_json::to_string(&objects).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Get the document palette as JSON: `[{"color":..,"shades":[..4]}]`.
    pub fn document_colors(&self) -> String {
        serde_json::to_string(&self.palette.colors()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Whether the palette was recomputed since the last call.
    pub fn take_palette_changed(&self) -> bool {
        self.palette_dirty.replace(false)
    }

    // ─── Drag & drop ─────────────────────────────────────────────────────

    /// Record where the workspace currently sits in the viewport. Read on
    /// every drag update.
    pub fn set_workspace_bounds(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.workspace = Some(Rect::new(left, top, width, height));
    }

    pub fn clear_workspace_bounds(&mut self) {
        self.workspace = None;
    }

    /// Start dragging a sidebar item (`{"type":"shape","data":{..}}`).
    /// Returns `false` on malformed JSON; the tracker is left untouched.
    pub fn begin_drag(&mut self, item_json: &str, x: f32, y: f32, now_ms: f64) -> bool {
        let item: DragItem = match serde_json::from_str(item_json) {
            Ok(item) => item,
            Err(e) => {
                log::warn!("bad drag item json: {e}");
                return false;
            }
        };
        self.drag.begin_drag(DragStart {
            item: Some(item),
            pointer: Some(Point::new(x, y)),
        });
        self.drop_zone.update(self.drag.state(), now_ms);
        true
    }

    pub fn update_drag(&mut self, x: f32, y: f32, now_ms: f64) {
        self.drag.update_drag_position(Point::new(x, y), &self.workspace);
        self.drop_zone.update(self.drag.state(), now_ms);
    }

    /// Finish the drag. Returns the drop as JSON
    /// (`{"item":..,"position":{"x":..,"y":..}}`, workspace-relative) or
    /// `"null"` when the item was released outside the workspace.
    pub fn end_drag(&mut self, now_ms: f64) -> String {
        let dropped = self.drag.end_drag();
        self.drop_zone.update(self.drag.state(), now_ms);
        serde_json::to_string(&dropped).unwrap_or_else(|_| "null".to_string())
    }

    pub fn cancel_drag(&mut self, now_ms: f64) {
        self.drag.cancel_drag();
        self.drop_zone.update(self.drag.state(), now_ms);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Get the current drag state as JSON.
    pub fn drag_state(&self) -> String {
        serde_json::to_string(self.drag.state()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the drop-zone frame to draw at `now_ms` as JSON, or `"null"` when
    /// the indicator is fully hidden.
    pub fn drop_zone_frame(&self, now_ms: f64) -> String {
        serde_json::to_string(&self.drop_zone.frame(now_ms)).unwrap_or_else(|_| "null".to_string())
    }
}

impl Default for ArtureCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn paint_from_css(css: &str) -> Option<Paint> {
    let css = css.trim();
    (!css.is_empty()).then(|| Paint::color(css))
}

/// Install a panic hook that forwards panics to `console.error`.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Arture WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Shade ramp for any CSS color as a JSON array of hex strings, or `[]` when
/// `css` is not a color.
#[wasm_bindgen]
pub fn generate_shades(css: &str) -> String {
    let Some(base) = Color::parse(css) else {
        return "[]".to_string();
    };
    let shades = shade_ramp(&base).map(|c| c.to_hex());
    serde_json::to_string(&shades).unwrap_or_else(|_| "[]".to_string())
}

/// Decide where an editor route goes, given the session endpoint's JSON
/// response.
///
/// `session_json` is `null` when signed out, a session object when signed
/// in, or an empty string when the request failed. Returns `""` to stay on
/// the page or the redirect target.
#[wasm_bindgen]
pub fn guard_route(current_path: &str, share_token: Option<String>, session_json: &str) -> String {
    let provider = || -> Result<Option<Session>, SessionError> {
        if session_json.trim().is_empty() {
            return Err(SessionError::Transport("no response".into()));
        }
        serde_json::from_str(session_json).map_err(|e| SessionError::Decode(e.to_string()))
    };
    match AuthGuard::new(provider).check(current_path, share_token.as_deref()) {
        GuardDecision::Proceed => String::new(),
        GuardDecision::Redirect(to) => to,
    }
}
