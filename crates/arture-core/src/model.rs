//! Scene object model for the Arture canvas.
//!
//! Objects keep their paints exactly as the editing tools wrote them: a solid
//! color is the raw CSS string, gradients and patterns are structured values.
//! Anything derived from paints (the document palette, shade ramps) is computed
//! elsewhere and never written back here.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Inclusive containment: points on any edge count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Shrink every side by `margin`. Never produces a negative size.
    pub fn inset(&self, margin: f32) -> Self {
        let dx = margin.min(self.width / 2.0);
        let dy = margin.min(self.height / 2.0);
        Self {
            left: self.left + dx,
            top: self.top + dy,
            width: self.width - dx * 2.0,
            height: self.height - dy * 2.0,
        }
    }

    /// Express `p` relative to this rectangle's top-left corner.
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.left, p.y - self.top)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

// ─── Paint ───────────────────────────────────────────────────────────────

/// A gradient stop. `color` is a raw CSS color string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32, // 0.0 .. 1.0
    pub color: String,
}

/// Fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Paint {
    /// Solid color, stored as the string the tool produced.
    Color { value: String },
    LinearGradient {
        angle: f32, // degrees
        stops: SmallVec<[GradientStop; 2]>,
    },
    RadialGradient {
        stops: SmallVec<[GradientStop; 2]>,
    },
    /// Image pattern fill.
    Pattern { source: String },
}

impl Paint {
    pub fn color(value: impl Into<String>) -> Self {
        Paint::Color {
            value: value.into(),
        }
    }

    /// The raw string when this is a plain color paint.
    pub fn as_color_str(&self) -> Option<&str> {
        match self {
            Paint::Color { value } => Some(value),
            _ => None,
        }
    }
}

// ─── Objects ─────────────────────────────────────────────────────────────

/// What an object on the canvas is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObjectKind {
    /// Root of the scene. Never enumerated as a drawable object.
    Root,
    Rect {
        corner_radius: f32,
    },
    Ellipse,
    /// Freehand or pen path, as SVG path data.
    Path {
        data: String,
    },
    Text {
        content: String,
        font_family: String,
        font_size: f32,
    },
    Image {
        src: String,
    },
    /// Container; its children are objects in their own right.
    Group,
}

/// A drawable object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub fill: Option<Paint>,
    #[serde(default)]
    pub stroke: Option<Paint>,
    #[serde(default)]
    pub stroke_width: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub bounds: Rect,
}

fn default_opacity() -> f32 {
    1.0
}

impl SceneObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
            bounds: Rect::default(),
        }
    }

    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.fill = Some(paint);
        self
    }

    pub fn with_stroke(mut self, paint: Paint, width: f32) -> Self {
        self.stroke = Some(paint);
        self.stroke_width = width;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Plain color strings used by this object, fill first.
    pub fn color_strings(&self) -> impl Iterator<Item = &str> {
        [&self.fill, &self.stroke]
            .into_iter()
            .filter_map(|paint| paint.as_ref().and_then(Paint::as_color_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_containment_is_inclusive() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(Point::new(10.0, 20.0)));
        assert!(r.contains(Point::new(110.0, 70.0)));
        assert!(r.contains(Point::new(60.0, 45.0)));
        assert!(!r.contains(Point::new(9.9, 45.0)));
        assert!(!r.contains(Point::new(60.0, 70.1)));
    }

    #[test]
    fn inset_shrinks_all_sides() {
        let r = Rect::new(0.0, 0.0, 100.0, 40.0).inset(4.0);
        assert_eq!(r, Rect::new(4.0, 4.0, 92.0, 32.0));

        let tiny = Rect::new(0.0, 0.0, 6.0, 6.0).inset(4.0);
        assert_eq!(tiny.width, 0.0);
        assert_eq!(tiny.center(), Point::new(3.0, 3.0));
    }

    #[test]
    fn local_coordinates() {
        let r = Rect::new(200.0, 80.0, 640.0, 480.0);
        assert_eq!(r.to_local(Point::new(250.0, 100.0)), Point::new(50.0, 20.0));
    }

    #[test]
    fn color_strings_skip_gradients() {
        let obj = SceneObject::new(ObjectId::intern("card"), ObjectKind::Rect { corner_radius: 8.0 })
            .with_fill(Paint::LinearGradient {
                angle: 90.0,
                stops: SmallVec::from_vec(vec![
                    GradientStop {
                        offset: 0.0,
                        color: "#fff".into(),
                    },
                    GradientStop {
                        offset: 1.0,
                        color: "#000".into(),
                    },
                ]),
            })
            .with_stroke(Paint::color("#222222"), 2.0);

        let colors: Vec<&str> = obj.color_strings().collect();
        assert_eq!(colors, vec!["#222222"]);
    }
}
