//! Host-owned render session state.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::coords::Viewport;
use crate::scene::{Camera, DrawableHandle, Material, MaterialSlots, Scene};

/// Scene, camera, viewport and selection of the host application.
///
/// The picker and baker borrow a session per call; they never keep one.
#[derive(Debug, Default)]
pub struct Session {
    scene: Option<Scene>,
    camera: Option<Camera>,
    viewport: Viewport,
    selection: Option<(DrawableHandle, MaterialSlots)>,
}

impl Session {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Installs a scene, dropping the previous one and its selection.
    pub fn set_scene(&mut self, scene: Scene) {
        self.selection = None;
        self.scene = Some(scene);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    #[inline]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    #[inline]
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    #[inline]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    #[inline]
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Host window resize. The camera aspect follows.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(camera) = self.camera.as_mut() {
            camera.set_aspect(viewport.aspect());
        }
    }

    /// Marks `handle` as selected by showing `display` on all of its slots.
    ///
    /// A previous selection is undone first. Returns `false` (and leaves the
    /// session unchanged) if there is no scene or the handle is unknown.
    pub fn select(&mut self, handle: DrawableHandle, display: Arc<Material>) -> bool {
        self.unselect();
        let Some(drawable) = self.scene.as_mut().and_then(|s| s.get_mut(handle)) else {
            return false;
        };
        let shown = drawable.materials.map(|_| display.clone());
        let original = std::mem::replace(&mut drawable.materials, shown);
        self.selection = Some((handle, original));
        true
    }

    /// Restores the selected drawable's own materials.
    pub fn unselect(&mut self) -> Option<DrawableHandle> {
        let (handle, original) = self.selection.take()?;
        if let Some(drawable) = self.scene.as_mut().and_then(|s| s.get_mut(handle)) {
            drawable.materials = original;
        }
        Some(handle)
    }

    #[inline]
    pub fn selected(&self) -> Option<DrawableHandle> {
        self.selection.as_ref().map(|(h, _)| *h)
    }

    /// Scene, camera and viewport together, if the session is configured.
    pub(crate) fn stage_mut(&mut self) -> Option<(&mut Scene, &Camera, Viewport)> {
        let viewport = self.viewport;
        match (self.scene.as_mut(), self.camera.as_ref()) {
            (Some(scene), Some(camera)) => Some((scene, camera, viewport)),
            _ => None,
        }
    }

    /// Sets the viewport to `viewport` until the returned guard is dropped.
    ///
    /// The camera projection is left alone: a bake renders the camera's view
    /// into a target of a different size.
    pub fn swap_viewport(&mut self, viewport: Viewport) -> ViewportRestore<'_> {
        let previous = std::mem::replace(&mut self.viewport, viewport);
        ViewportRestore {
            session: self,
            previous,
        }
    }
}

/// Puts the previous viewport back on drop.
pub struct ViewportRestore<'a> {
    session: &'a mut Session,
    previous: Viewport,
}

impl ViewportRestore<'_> {
    /// Viewport that will be restored.
    #[inline]
    pub fn previous(&self) -> Viewport {
        self.previous
    }
}

impl Deref for ViewportRestore<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for ViewportRestore<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for ViewportRestore<'_> {
    fn drop(&mut self) {
        self.session.viewport = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Drawable, Geometry};

    fn session() -> (Session, DrawableHandle) {
        let mut scene = Scene::new();
        scene.add(Drawable::new("a", Geometry::default(), Material::new("a")));
        let b = scene.add(Drawable::new(
            "b",
            Geometry::default(),
            vec![Arc::new(Material::new("b0")), Arc::new(Material::new("b1"))],
        ));
        let mut s = Session::new(Viewport::new(640, 480));
        s.set_scene(scene);
        (s, b)
    }

    #[test]
    fn select_swaps_every_slot_and_unselect_restores() {
        let (mut s, b) = session();
        let original = s.scene().unwrap().get(b).unwrap().materials.clone();
        let grid = Arc::new(Material::new("uv grid"));

        assert!(s.select(b, grid.clone()));
        let shown = &s.scene().unwrap().get(b).unwrap().materials;
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|m| Arc::ptr_eq(m, &grid)));

        assert_eq!(s.unselect(), Some(b));
        assert!(s.scene().unwrap().get(b).unwrap().materials.ptr_eq(&original));
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn reselect_restores_previous_selection() {
        let (mut s, b) = session();
        let a = DrawableHandle(0);
        let a_original = s.scene().unwrap().get(a).unwrap().materials.clone();
        let grid = Arc::new(Material::new("uv grid"));

        s.select(a, grid.clone());
        s.select(b, grid);
        assert_eq!(s.selected(), Some(b));
        assert!(s.scene().unwrap().get(a).unwrap().materials.ptr_eq(&a_original));
    }

    #[test]
    fn swap_viewport_restores_on_drop() {
        let (mut s, _) = session();
        {
            let guard = s.swap_viewport(Viewport::new(1024, 1024));
            assert_eq!(guard.viewport(), Viewport::new(1024, 1024));
            assert_eq!(guard.previous(), Viewport::new(640, 480));
        }
        assert_eq!(s.viewport(), Viewport::new(640, 480));
    }

    #[test]
    fn stage_requires_scene_and_camera() {
        let (mut s, _) = session();
        assert!(s.stage_mut().is_none());
        s.set_camera(Camera::perspective(30.0, 1.0, 0.1, 100.0));
        assert!(s.stage_mut().is_some());
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let (mut s, _) = session();
        s.set_camera(Camera::perspective(30.0, 1.0, 0.1, 100.0));
        s.resize(Viewport::new(200, 100));
        assert!(matches!(
            s.camera().unwrap().projection,
            crate::scene::Projection::Perspective { aspect, .. } if aspect == 2.0
        ));
    }
}
