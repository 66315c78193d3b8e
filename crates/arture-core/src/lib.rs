pub mod color;
pub mod id;
pub mod model;
pub mod palette;
pub mod scene;

pub use color::{Color, Hsl};
pub use id::ObjectId;
pub use model::*;
pub use palette::{DocumentColor, SHADE_COUNT, Tone, extract_colors, generate_shades};
pub use scene::{Scene, SceneEvent, SceneEventKind, Subscription};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
