//! Integration tests: palette extraction over a realistic poster scene.

use arture_core::id::ObjectId;
use arture_core::model::*;
use arture_core::palette::{SHADE_COUNT, extract_colors};
use arture_core::scene::Scene;
use arture_core::{Color, Tone};
use pretty_assertions::assert_eq;

fn load_poster() -> Scene {
    let objects: Vec<SceneObject> =
        serde_json::from_str(include_str!("fixtures/poster.json")).unwrap();
    let mut scene = Scene::new();
    for obj in objects {
        scene.add(obj);
    }
    scene
}

fn palette_names(scene: &Scene) -> Vec<String> {
    extract_colors(scene).into_iter().map(|c| c.color).collect()
}

#[test]
fn fixture_decodes_all_object_kinds() {
    let scene = load_poster();
    assert_eq!(scene.len(), 5);
    let headline = scene.get(ObjectId::intern("headline")).unwrap();
    assert!(matches!(headline.kind, ObjectKind::Text { .. }));
    assert_eq!(scene.get(ObjectId::intern("sun")).unwrap().stroke_width, 4.0);
}

#[test]
fn poster_palette_is_first_seen_and_unique() {
    let scene = load_poster();
    assert_eq!(palette_names(&scene), vec!["#fdf6e3", "#2d3436", "tomato"]);
}

#[test]
fn every_entry_has_a_full_ramp_in_the_right_direction() {
    let scene = load_poster();
    for entry in extract_colors(&scene) {
        assert_eq!(entry.shades.len(), SHADE_COUNT);
        let base = Color::parse(&entry.color).unwrap();
        let base_l = base.to_hsl().l;
        for shade in &entry.shades {
            let l = Color::parse(shade).unwrap().to_hsl().l;
            match Tone::of(&base) {
                Tone::Dark => assert!(l > base_l, "{} -> {shade}", entry.color),
                Tone::Light => assert!(l < base_l, "{} -> {shade}", entry.color),
            }
        }
    }
}

#[test]
fn edits_change_the_next_extraction() {
    let mut scene = load_poster();
    scene.set_stroke(ObjectId::intern("sun"), None);
    scene.add(
        SceneObject::new(ObjectId::intern("cta"), ObjectKind::Rect { corner_radius: 12.0 })
            .with_fill(Paint::color("rgb(108, 92, 231)")),
    );
    scene.remove(ObjectId::intern("date_badge"));

    assert_eq!(
        palette_names(&scene),
        vec!["#fdf6e3", "#2d3436", "rgb(108, 92, 231)"]
    );
}

#[test]
fn group_children_contribute_colors() {
    let mut scene = Scene::new();
    let group = scene
        .add(SceneObject::new(ObjectId::intern("legend"), ObjectKind::Group))
        .unwrap();
    scene.add_to(
        group,
        SceneObject::new(ObjectId::intern("legend_dot"), ObjectKind::Ellipse)
            .with_fill(Paint::color("#00b894")),
    );
    scene.add(
        SceneObject::new(ObjectId::intern("legend_label"), ObjectKind::Path { data: "M0 0 L10 0".into() })
            .with_stroke(Paint::color("#0984e3"), 1.0),
    );

    assert_eq!(palette_names(&scene), vec!["#00b894", "#0984e3"]);
}
