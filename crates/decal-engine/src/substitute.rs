//! Temporary material substitution.
//!
//! Picking and preview renders draw the host's scene with purpose-built
//! materials. [`Substitution`] swaps drawables' material bindings and puts the
//! originals back when it is dropped, on every exit path including `?` and
//! unwinding.

use std::sync::Arc;

use crate::scene::{DrawableHandle, Material, MaterialSlots, Scene};

/// Exclusive borrow of a scene whose material bindings may be swapped.
///
/// Only one substitution can be alive per scene at a time; the borrow checker
/// enforces it.
pub struct Substitution<'s> {
    scene: &'s mut Scene,
    saved: Vec<(DrawableHandle, MaterialSlots)>,
}

impl<'s> Substitution<'s> {
    pub fn begin(scene: &'s mut Scene) -> Self {
        Self {
            scene,
            saved: Vec::new(),
        }
    }

    /// Replaces every slot of `handle` with `f(original)`, slot for slot.
    ///
    /// Replacing the same drawable twice keeps the first original, so the
    /// restore always goes back to the host's binding. Returns `false` for an
    /// unknown handle.
    pub fn replace_with(
        &mut self,
        handle: DrawableHandle,
        f: impl FnMut(&Arc<Material>) -> Arc<Material>,
    ) -> bool {
        let Some(drawable) = self.scene.get_mut(handle) else {
            return false;
        };

        let substitute = drawable.materials.map(f);
        let original = std::mem::replace(&mut drawable.materials, substitute);

        if !self.saved.iter().any(|(h, _)| *h == handle) {
            self.saved.push((handle, original));
        }
        true
    }

    /// The scene as currently substituted.
    #[inline]
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Number of drawables whose bindings are swapped.
    #[inline]
    pub fn substituted(&self) -> usize {
        self.saved.len()
    }

    /// Restores the originals now. Equivalent to dropping the guard.
    pub fn restore(self) {}
}

impl Drop for Substitution<'_> {
    fn drop(&mut self) {
        // Reverse order so nested replacements unwind correctly.
        for (handle, original) in self.saved.drain(..).rev() {
            if let Some(drawable) = self.scene.get_mut(handle) {
                drawable.materials = original;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Drawable, Geometry};

    fn scene_with(n: usize) -> (Scene, Vec<MaterialSlots>) {
        let mut scene = Scene::new();
        for i in 0..n {
            scene.add(Drawable::new(
                format!("d{i}"),
                Geometry::default(),
                Material::new(format!("m{i}")),
            ));
        }
        let originals = scene.iter().map(|(_, d)| d.materials.clone()).collect();
        (scene, originals)
    }

    fn assert_restored(scene: &Scene, originals: &[MaterialSlots]) {
        for ((_, d), original) in scene.iter().zip(originals) {
            assert!(d.materials.ptr_eq(original), "{} not restored", d.name);
        }
    }

    #[test]
    fn drop_restores_pointer_identical_materials() {
        let (mut scene, originals) = scene_with(3);
        {
            let mut sub = Substitution::begin(&mut scene);
            for i in 0..3 {
                assert!(sub.replace_with(DrawableHandle(i), |_| Arc::new(Material::invisible())));
            }
            assert_eq!(sub.substituted(), 3);
            assert!(sub.scene().iter().all(|(_, d)| !d.materials.ptr_eq(&originals[0])));
        }
        assert_restored(&scene, &originals);
    }

    #[test]
    fn double_replacement_restores_first_original() {
        let (mut scene, originals) = scene_with(1);
        let mut sub = Substitution::begin(&mut scene);
        sub.replace_with(DrawableHandle(0), |_| Arc::new(Material::new("x")));
        sub.replace_with(DrawableHandle(0), |_| Arc::new(Material::new("y")));
        assert_eq!(sub.substituted(), 1);
        sub.restore();
        assert_restored(&scene, &originals);
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let (mut scene, _) = scene_with(1);
        let mut sub = Substitution::begin(&mut scene);
        assert!(!sub.replace_with(DrawableHandle(7), |m| m.clone()));
        assert_eq!(sub.substituted(), 0);
    }

    #[test]
    fn early_return_restores() {
        fn failing(scene: &mut Scene) -> Result<(), &'static str> {
            let mut sub = Substitution::begin(scene);
            sub.replace_with(DrawableHandle(0), |_| Arc::new(Material::invisible()));
            Err("render failed")?;
            Ok(())
        }

        let (mut scene, originals) = scene_with(2);
        assert!(failing(&mut scene).is_err());
        assert_restored(&scene, &originals);
    }

    #[test]
    fn unwinding_restores() {
        let (mut scene, originals) = scene_with(2);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut sub = Substitution::begin(&mut scene);
            sub.replace_with(DrawableHandle(1), |_| Arc::new(Material::invisible()));
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_restored(&scene, &originals);
    }
}
