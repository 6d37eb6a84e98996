#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use decal_engine::logging::{init_logging, LoggingConfig};
use decal_engine::scene::{Camera, Drawable, DrawableHandle, Geometry, Material, Scene};
use decal_engine::{Gpu, GpuInit, Session, Viewport};
use image::{Rgba, RgbaImage};

pub const VIEWPORT: Viewport = Viewport::new(64, 64);

fn init() {
    init_logging(LoggingConfig {
        is_test: true,
        ..LoggingConfig::default()
    });
}

/// Headless GPU, or `None` (test skipped) on machines without an adapter.
pub fn gpu() -> Option<Gpu> {
    init();
    match Gpu::headless_blocking(GpuInit::default()) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            log::warn!("skipping GPU test: {e:#}");
            None
        }
    }
}

pub async fn gpu_async() -> Option<Gpu> {
    init();
    match Gpu::headless(GpuInit::default()).await {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            log::warn!("skipping GPU test: {e:#}");
            None
        }
    }
}

/// Axis-aligned quad in the plane `z`, centered at `(cx, cy)`, front face +Z.
///
/// UVs span `u0..u1` left to right and `0..1` top to bottom.
pub fn quad(cx: f32, cy: f32, z: f32, half: f32, u0: f32, u1: f32) -> Geometry {
    Geometry::new(
        vec![
            [cx - half, cy - half, z],
            [cx + half, cy - half, z],
            [cx + half, cy + half, z],
            [cx - half, cy + half, z],
        ],
        vec![[u0, 1.0], [u1, 1.0], [u1, 0.0], [u0, 0.0]],
        vec![0, 1, 2, 0, 2, 3],
    )
    .unwrap()
}

/// Orthographic camera on +Z looking at the origin; the view spans
/// `[-1, 1]` vertically.
pub fn camera(viewport: Viewport) -> Camera {
    Camera::orthographic(1.0, viewport.aspect(), 0.1, 100.0)
        .looking_at(glam::Vec3::new(0.0, 0.0, 5.0), glam::Vec3::ZERO)
}

pub fn session(scene: Scene) -> Session {
    let mut session = Session::new(VIEWPORT);
    session.set_scene(scene);
    session.set_camera(camera(VIEWPORT));
    session
}

pub fn drawable(name: &str, geometry: Geometry) -> Drawable {
    Drawable::new(name, geometry, Material::new(name))
}

/// Pointer snapshot of every drawable's bindings.
pub fn bindings(session: &Session) -> Vec<Vec<Arc<Material>>> {
    session
        .scene()
        .unwrap()
        .iter()
        .map(|(_, d)| d.materials.iter().cloned().collect())
        .collect()
}

pub fn assert_same_bindings(before: &[Vec<Arc<Material>>], session: &Session) {
    let after = bindings(session);
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.len(), a.len());
        assert!(b.iter().zip(a).all(|(x, y)| Arc::ptr_eq(x, y)));
    }
}

pub fn handle(session: &Session, name: &str) -> DrawableHandle {
    session.scene().unwrap().find(name).unwrap()
}

pub fn png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    png(&RgbaImage::from_pixel(8, 8, Rgba(rgba)))
}
