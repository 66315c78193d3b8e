//! Document color palette: the distinct colors a scene uses, each with a
//! tonal ramp of shades for quick recoloring.

use crate::color::Color;
use crate::scene::Scene;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Number of shades generated per document color.
pub const SHADE_COUNT: usize = 4;

/// Lightness shift of the first shade, in percentage points.
pub const SHADE_START: f32 = 20.0;

/// Increment between consecutive shades, in percentage points.
pub const SHADE_STEP: f32 = 15.0;

/// A distinct color found in the scene plus its shade ramp.
///
/// `color` is the string exactly as it appears on the objects; `shades` are
/// lowercase `#rrggbb` (alpha is dropped), ordered from least to most shifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentColor {
    pub color: String,
    pub shades: [String; SHADE_COUNT],
}

impl DocumentColor {
    /// Build the entry for a raw color string, or `None` if it is not a
    /// parseable CSS color.
    pub fn from_css(raw: &str) -> Option<Self> {
        let base = Color::parse(raw)?;
        Some(Self {
            color: raw.to_string(),
            shades: generate_shades(&base).map(|c| c.to_rgb_hex()),
        })
    }
}

/// Which way a shade ramp moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Dark colors are ramped toward white.
    Dark,
    /// Light colors are ramped toward black.
    Light,
}

impl Tone {
    pub fn of(color: &Color) -> Self {
        if color.is_dark() { Tone::Dark } else { Tone::Light }
    }
}

/// The lightness shifts for each shade: 20, 35, 50, 65.
pub fn shade_amounts() -> [f32; SHADE_COUNT] {
    std::array::from_fn(|i| SHADE_START + SHADE_STEP * i as f32)
}

/// Generate the shade ramp for `base`.
///
/// Dark colors are lightened and light colors darkened by each amount from
/// [`shade_amounts`], so a ramp never crosses into the opposite tonal range
/// before it clamps.
pub fn generate_shades(base: &Color) -> [Color; SHADE_COUNT] {
    let tone = Tone::of(base);
    shade_amounts().map(|amount| match tone {
        Tone::Dark => base.lighten(amount),
        Tone::Light => base.darken(amount),
    })
}

/// Collect the distinct plain-color fills and strokes of every object in
/// `scene`, in first-seen order, each with its shades.
///
/// Strings are compared verbatim: `"#f00"` and `"#ff0000"` are two entries.
/// Gradients, patterns and strings that do not parse as colors are skipped.
pub fn extract_colors(scene: &Scene) -> Vec<DocumentColor> {
    let unique: IndexSet<&str> = scene.objects().flat_map(|obj| obj.color_strings()).collect();

    unique
        .into_iter()
        .filter_map(|raw| {
            let entry = DocumentColor::from_css(raw);
            if entry.is_none() {
                log::debug!("skipping unparseable color {raw:?}");
            }
            entry
        })
        .collect()
}
