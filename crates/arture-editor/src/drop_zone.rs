//! Drop-zone highlight drawn over the workspace while a dragged item hovers it.

use crate::drag::DragState;
use arture_core::model::Rect;
use serde::{Deserialize, Serialize};

// ─── Config ──────────────────────────────────────────────────────────────

/// Visual parameters for the drop-zone outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropZoneStyle {
    /// Margin between the workspace bounds and the outline, in px. Default: **4**.
    pub inset: f32,
    /// Outline width in px. Default: **3**.
    pub border_width: f32,
    /// Outline color (CSS). Default: `#3b82f6`.
    pub border_color: String,
    /// Translucent fill under the outline (CSS). Default: `rgba(59, 130, 246, 0.08)`.
    pub fill_color: String,
    pub corner_radius: f32,
    /// Fade in/out duration in milliseconds. Default: **150**.
    pub fade_ms: f64,
}

impl Default for DropZoneStyle {
    fn default() -> Self {
        Self {
            inset: 4.0,
            border_width: 3.0,
            border_color: "#3b82f6".into(),
            fill_color: "rgba(59, 130, 246, 0.08)".into(),
            corner_radius: 8.0,
            fade_ms: 150.0,
        }
    }
}

// ─── Indicator ───────────────────────────────────────────────────────────

/// Outline rectangle for `state`, or `None` when nothing should be shown.
///
/// Shown only while dragging over the workspace with known bounds.
pub fn outline_rect(state: &DragState, style: &DropZoneStyle) -> Option<Rect> {
    if !state.can_drop() {
        return None;
    }
    state.workspace_bounds.map(|b| b.inset(style.inset))
}

/// Everything a renderer needs to draw one frame of the indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropZoneFrame {
    pub rect: Rect,
    /// 0.0 (invisible) ..= 1.0 (fully shown).
    pub opacity: f32,
    pub border_width: f32,
    pub border_color: String,
    pub fill_color: String,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    /// Whether the outline is fading in (`true`) or out.
    showing: bool,
    started_ms: f64,
    /// Opacity when the fade started, so reversing mid-fade does not jump.
    from: f32,
}

/// Stateful indicator: follows a [`DragState`] and fades the outline.
#[derive(Debug, Clone)]
pub struct DropZoneIndicator {
    style: DropZoneStyle,
    /// Last outline shown; kept during fade-out so the frame does not vanish.
    rect: Option<Rect>,
    fade: Option<Fade>,
}

impl Default for DropZoneIndicator {
    fn default() -> Self {
        Self::new(DropZoneStyle::default())
    }
}

impl DropZoneIndicator {
    pub fn new(style: DropZoneStyle) -> Self {
        Self {
            style,
            rect: None,
            fade: None,
        }
    }

    pub fn style(&self) -> &DropZoneStyle {
        &self.style
    }

    /// Whether the outline is (or is fading toward) shown.
    pub fn is_shown(&self) -> bool {
        self.fade.is_some_and(|f| f.showing)
    }

    /// Feed the latest drag state, observed at `now_ms`.
    pub fn update(&mut self, state: &DragState, now_ms: f64) {
        let target = outline_rect(state, &self.style);
        let showing = target.is_some();

        if showing != self.is_shown() {
            let from = self.opacity(now_ms);
            self.fade = Some(Fade {
                showing,
                started_ms: now_ms,
                from,
            });
            log::trace!("DROPZONE {} at {now_ms}", if showing { "in" } else { "out" });
        }
        if target.is_some() {
            self.rect = target;
        }
    }

    /// Opacity at `now_ms`, interpolated linearly over the fade duration.
    pub fn opacity(&self, now_ms: f64) -> f32 {
        let Some(fade) = self.fade else {
            return 0.0;
        };
        let to = if fade.showing { 1.0 } else { 0.0 };
        let t = if self.style.fade_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - fade.started_ms) / self.style.fade_ms).clamp(0.0, 1.0) as f32
        };
        fade.from + (to - fade.from) * t
    }

    /// The frame to draw at `now_ms`, or `None` once fully hidden.
    pub fn frame(&self, now_ms: f64) -> Option<DropZoneFrame> {
        let opacity = self.opacity(now_ms);
        if opacity <= 0.0 {
            return None;
        }
        Some(DropZoneFrame {
            rect: self.rect?,
            opacity,
            border_width: self.style.border_width,
            border_color: self.style.border_color.clone(),
            fill_color: self.style.fill_color.clone(),
            corner_radius: self.style.corner_radius,
        })
    }
}
