mod common;

use std::sync::Arc;

use decal_engine::scene::{Drawable, Material, Scene};
use decal_engine::texture::{ColorSpace, Texture2d};
use decal_engine::{PickError, Picker, Session, Viewport};

use common::*;

// Screen x of a world x under the test camera, for a square 64 px viewport.
// The view spans [-1, 1] so world 0.5 lands on pixel 48.

#[test]
fn distinct_drawables_resolve_to_their_handles() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("left", quad(-0.5, 0.0, 0.0, 0.3, 0.0, 1.0)));
    scene.add(drawable("right", quad(0.5, 0.0, 0.0, 0.3, 0.0, 1.0)));
    let mut session = session(scene);
    let before = bindings(&session);

    let mut picker = Picker::default();
    let left = picker.pick(&gpu, &mut session, 16, 32).unwrap();
    let right = picker.pick(&gpu, &mut session, 48, 32).unwrap();

    assert_eq!(left, Some(handle(&session, "left")));
    assert_eq!(right, Some(handle(&session, "right")));
    assert_same_bindings(&before, &session);
}

#[test]
fn background_is_none() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("center", quad(0.0, 0.0, 0.0, 0.2, 0.0, 1.0)));
    let mut session = session(scene);

    let mut picker = Picker::default();
    assert_eq!(picker.pick(&gpu, &mut session, 2, 2).unwrap(), None);
}

#[test]
fn outline_materials_are_not_pickable() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(Drawable::new(
        "hair",
        quad(0.0, 0.0, 0.0, 0.5, 0.0, 1.0),
        Material::new("Hair_Outline").with_double_sided(true),
    ));
    let mut session = session(scene);
    let before = bindings(&session);

    let mut picker = Picker::default();
    assert_eq!(picker.pick(&gpu, &mut session, 32, 32).unwrap(), None);
    assert_same_bindings(&before, &session);
}

#[test]
fn alpha_tested_texels_are_not_pickable() {
    let Some(gpu) = gpu() else { return };
    let clear = Texture2d::solid(&gpu, "clear", [255, 255, 255, 0], ColorSpace::Srgb);

    let mut scene = Scene::new();
    scene.add(Drawable::new(
        "lace",
        quad(0.0, 0.0, 0.0, 0.5, 0.0, 1.0),
        Material::new("Lace")
            .with_diffuse(Some(clear))
            .with_alpha_cutoff(Some(0.5)),
    ));
    let mut session = session(scene);

    let mut picker = Picker::default();
    assert_eq!(picker.pick(&gpu, &mut session, 32, 32).unwrap(), None);
}

#[test]
fn nearest_surface_wins() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("front", quad(0.0, 0.0, 0.5, 0.3, 0.0, 1.0)));
    scene.add(drawable("back", quad(0.0, 0.0, 0.0, 0.6, 0.0, 1.0)));
    let mut session = session(scene);

    let mut picker = Picker::default();
    let hit = picker.pick(&gpu, &mut session, 32, 32).unwrap();
    assert_eq!(hit, Some(handle(&session, "front")));
}

#[test]
fn picking_is_idempotent() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("a", quad(0.0, 0.0, 0.0, 0.4, 0.0, 1.0)));
    let mut session = session(scene);

    let mut picker = Picker::default();
    let first = picker.pick(&gpu, &mut session, 30, 34).unwrap();
    let second = picker.pick(&gpu, &mut session, 30, 34).unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn multi_slot_drawables_substitute_every_slot() {
    let Some(gpu) = gpu() else { return };
    let geometry = quad(0.0, 0.0, 0.0, 0.5, 0.0, 1.0)
        .with_groups(vec![
            decal_engine::scene::Group::new(0, 3, 0),
            decal_engine::scene::Group::new(3, 3, 1),
        ])
        .unwrap();
    let mut scene = Scene::new();
    scene.add(Drawable::new(
        "dress",
        geometry,
        vec![
            Arc::new(Material::new("cloth")),
            Arc::new(Material::new("lining")),
        ],
    ));
    let mut session = session(scene);
    let before = bindings(&session);

    let mut picker = Picker::default();
    // One pixel in each triangle of the quad.
    let a = picker.pick(&gpu, &mut session, 40, 40).unwrap();
    let b = picker.pick(&gpu, &mut session, 24, 24).unwrap();
    assert_eq!(a, Some(handle(&session, "dress")));
    assert_eq!(a, b);
    assert_same_bindings(&before, &session);
}

#[test]
fn screen_rows_count_down_from_the_top() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("top", quad(0.0, 0.5, 0.0, 0.4, 0.0, 1.0)));
    scene.add(drawable("bottom", quad(0.0, -0.5, 0.0, 0.4, 0.0, 1.0)));
    let mut session = session(scene);

    let mut picker = Picker::default();
    let upper = picker.pick(&gpu, &mut session, 32, 16).unwrap();
    let lower = picker.pick(&gpu, &mut session, 32, 48).unwrap();
    assert_eq!(upper, Some(handle(&session, "top")));
    assert_eq!(lower, Some(handle(&session, "bottom")));
}

#[test]
fn out_of_viewport_coordinates_are_none() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("a", quad(0.0, 0.0, 0.0, 1.0, 0.0, 1.0)));
    let mut session = session(scene);

    let mut picker = Picker::default();
    assert_eq!(picker.pick(&gpu, &mut session, 64, 10).unwrap(), None);
    assert_eq!(picker.pick(&gpu, &mut session, 10, 500).unwrap(), None);
}

#[test]
fn unconfigured_session_is_an_error() {
    let Some(gpu) = gpu() else { return };
    let mut session = Session::new(VIEWPORT);
    let mut picker = Picker::default();
    assert!(matches!(
        picker.pick(&gpu, &mut session, 0, 0),
        Err(PickError::NotConfigured)
    ));
    assert_eq!(picker.target_size(), None);
}

#[test]
fn resize_between_picks_reallocates_the_target() {
    let Some(gpu) = gpu() else { return };
    let mut scene = Scene::new();
    scene.add(drawable("a", quad(-0.6, 0.0, 0.0, 0.2, 0.0, 1.0)));
    scene.add(drawable("b", quad(0.0, 0.0, 0.0, 0.2, 0.0, 1.0)));
    scene.add(drawable("c", quad(0.6, 0.0, 0.0, 0.2, 0.0, 1.0)));
    let mut session = session(scene);
    let names = |s: &Session, hits: [Option<decal_engine::scene::DrawableHandle>; 3]| {
        hits.map(|h| h.map(|h| s.scene().unwrap().get(h).unwrap().name.clone()))
    };

    let mut picker = Picker::default();
    let square = [13, 32, 51].map(|x| picker.pick(&gpu, &mut session, x, 32).unwrap());
    assert_eq!(picker.target_size(), Some(VIEWPORT));
    assert_eq!(
        names(&session, square),
        [Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
    );

    // Twice as wide: the orthographic view now spans [-2, 2] horizontally.
    let wide = Viewport::new(128, 64);
    session.resize(wide);
    let hits = [45, 64, 83].map(|x| picker.pick(&gpu, &mut session, x, 32).unwrap());
    assert_eq!(picker.target_size(), Some(wide));
    assert_eq!(
        names(&session, hits),
        [Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
    );
}
