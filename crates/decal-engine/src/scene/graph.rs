use std::sync::Arc;

use super::{Drawable, DrawableHandle, Material, MaterialSlots};

/// Ordered collection of drawables owned by the host.
///
/// Order is insertion order and is the traversal order used for pick ids.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    drawables: Vec<Drawable>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, drawable: Drawable) -> DrawableHandle {
        self.drawables.push(drawable);
        DrawableHandle(self.drawables.len() - 1)
    }

    #[inline]
    pub fn get(&self, handle: DrawableHandle) -> Option<&Drawable> {
        self.drawables.get(handle.0)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: DrawableHandle) -> Option<&mut Drawable> {
        self.drawables.get_mut(handle.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// All drawables in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (DrawableHandle, &Drawable)> {
        self.drawables
            .iter()
            .enumerate()
            .map(|(i, d)| (DrawableHandle(i), d))
    }

    /// Visible drawables in traversal order.
    pub fn traverse_visible(&self) -> impl Iterator<Item = (DrawableHandle, &Drawable)> {
        self.iter().filter(|(_, d)| d.visible)
    }

    /// First drawable with the given name.
    pub fn find(&self, name: &str) -> Option<DrawableHandle> {
        self.iter().find(|(_, d)| d.name == name).map(|(h, _)| h)
    }

    /// Rebinds every slot holding `look_for` (by identity) to `replace_with`.
    ///
    /// Returns the number of slots replaced.
    pub fn replace_material(&mut self, look_for: &Arc<Material>, replace_with: &Arc<Material>) -> usize {
        let mut count = 0;
        for drawable in &mut self.drawables {
            let hits = drawable
                .materials
                .iter()
                .filter(|m| Arc::ptr_eq(m, look_for))
                .count();
            if hits == 0 {
                continue;
            }
            count += hits;
            drawable.materials = drawable.materials.map(|m| {
                if Arc::ptr_eq(m, look_for) {
                    replace_with.clone()
                } else {
                    m.clone()
                }
            });
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material};

    fn drawable(name: &str, visible: bool) -> Drawable {
        Drawable::new(name, Geometry::default(), Material::new(name)).with_visible(visible)
    }

    #[test]
    fn traversal_skips_hidden_and_keeps_order() {
        let mut scene = Scene::new();
        scene.add(drawable("a", true));
        scene.add(drawable("b", false));
        scene.add(drawable("c", true));

        let names: Vec<_> = scene.traverse_visible().map(|(_, d)| d.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn replace_material_matches_identity_only() {
        let shared = Arc::new(Material::new("skin"));
        let lookalike = Arc::new(Material::new("skin"));
        let mut scene = Scene::new();
        scene.add(Drawable::new("a", Geometry::default(), shared.clone()));
        scene.add(Drawable::new(
            "b",
            Geometry::default(),
            MaterialSlots::Multi(vec![shared.clone(), lookalike.clone(), shared.clone()]),
        ));

        let replacement = Arc::new(Material::new("grid"));
        assert_eq!(scene.replace_material(&shared, &replacement), 3);

        let (_, b) = scene.iter().nth(1).unwrap();
        assert!(Arc::ptr_eq(b.materials.get(1).unwrap(), &lookalike));
        assert!(Arc::ptr_eq(b.materials.get(2).unwrap(), &replacement));
    }

    #[test]
    fn find_by_name() {
        let mut scene = Scene::new();
        scene.add(drawable("body", true));
        let hair = scene.add(drawable("hair", true));
        assert_eq!(scene.find("hair"), Some(hair));
        assert_eq!(scene.find("shoes"), None);
    }
}
