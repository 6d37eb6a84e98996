//! glTF / VRM import into an engine [`Scene`].
//!
//! One drawable per mesh node. A mesh's primitives are merged into a single
//! geometry with one group (and one material slot) per primitive.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use decal_engine::Gpu;
use decal_engine::scene::{Drawable, Geometry, Group, Material, MaterialSlots, Scene};
use decal_engine::texture::{ColorSpace, Texture2d, TextureHandle};
use glam::Mat4;
use gltf::image::Format;
use gltf::material::AlphaMode;
use gltf::mesh::Mode;
use image::RgbaImage;

/// glTF's default `alphaCutoff` for `MASK` materials.
const DEFAULT_ALPHA_CUTOFF: f32 = 0.5;

#[derive(Debug, Copy, Clone, Default)]
pub struct ImportOptions {
    /// VRM 0.x avatars face -Z; turn them 180° to face the default camera.
    pub vrm_facing: bool,
}

impl ImportOptions {
    fn root_transform(self) -> Mat4 {
        if self.vrm_facing {
            Mat4::from_rotation_y(PI)
        } else {
            Mat4::IDENTITY
        }
    }
}

/// Reads a `.gltf`, `.glb` or `.vrm` file and builds a scene from it.
///
/// Parsing runs on the blocking pool; textures are uploaded on the caller's
/// thread.
pub async fn load_scene(gpu: &Gpu, path: &Path, options: ImportOptions) -> Result<Scene> {
    let owned = path.to_path_buf();
    let (document, buffers, images) = tokio::task::spawn_blocking(move || gltf::import(owned))
        .await
        .context("glTF import task failed")?
        .with_context(|| format!("failed to import {}", path.display()))?;

    let scene = build_scene(gpu, &document, &buffers, &images, options)?;
    log::info!(
        "imported {}: {} drawables",
        path.display(),
        scene.len()
    );
    Ok(scene)
}

pub(crate) fn build_scene(
    gpu: &Gpu,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    options: ImportOptions,
) -> Result<Scene> {
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("glTF file has no scene")?;

    let mut importer = Importer {
        gpu,
        buffers,
        images,
        textures: HashMap::new(),
        materials: HashMap::new(),
        scene: Scene::new(),
    };
    let root = options.root_transform();
    for node in gltf_scene.nodes() {
        importer.visit(&node, root, root)?;
    }
    Ok(importer.scene)
}

struct Importer<'a> {
    gpu: &'a Gpu,
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    /// Keyed by image index.
    textures: HashMap<usize, TextureHandle>,
    /// Keyed by material index; `None` is glTF's default material.
    materials: HashMap<Option<usize>, Arc<Material>>,
    scene: Scene,
}

impl Importer<'_> {
    fn visit(&mut self, node: &gltf::Node<'_>, parent: Mat4, root: Mat4) -> Result<()> {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            // Skinned vertices are already in bind pose; the node transform
            // does not apply to them.
            let transform = if node.skin().is_some() { root } else { world };
            self.add_mesh(node, &mesh, transform)?;
        }

        for child in node.children() {
            self.visit(&child, world, root)?;
        }
        Ok(())
    }

    fn add_mesh(&mut self, node: &gltf::Node<'_>, mesh: &gltf::Mesh<'_>, transform: Mat4) -> Result<()> {
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh {}", mesh.index()));

        let buffers = self.buffers;
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut uvs: Vec<[f32; 2]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut groups = Vec::new();
        let mut slots = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::warn!("{name}: skipping {:?} primitive", primitive.mode());
                continue;
            }
            let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
            let Some(prim_positions) = reader.read_positions() else {
                log::warn!("{name}: primitive without positions");
                continue;
            };
            let prim_positions: Vec<[f32; 3]> = prim_positions.collect();
            let count = prim_positions.len();

            let mut prim_uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().collect())
                .unwrap_or_default();
            if prim_uvs.len() != count {
                if !prim_uvs.is_empty() {
                    log::warn!("{name}: uv count mismatch, ignoring uvs");
                }
                prim_uvs = vec![[0.0; 2]; count];
            }

            let prim_indices: Vec<u32> = reader
                .read_indices()
                .map(|i| i.into_u32().collect())
                .unwrap_or_else(|| (0..count as u32).collect());

            let prim_normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(ns) => ns.collect(),
                None => Geometry::new(prim_positions.clone(), prim_uvs.clone(), prim_indices.clone())
                    .with_context(|| format!("{name}: invalid primitive"))?
                    .compute_vertex_normals(),
            };

            let base = positions.len() as u32;
            groups.push(Group::new(
                indices.len() as u32,
                prim_indices.len() as u32,
                slots.len(),
            ));
            indices.extend(prim_indices.iter().map(|i| i + base));
            positions.extend(prim_positions);
            uvs.extend(prim_uvs);
            normals.extend(prim_normals);
            slots.push(self.material(&primitive.material()));
        }

        if slots.is_empty() {
            return Ok(());
        }

        let mut geometry = Geometry::new(positions, uvs, indices)
            .and_then(|g| g.with_normals(normals))
            .with_context(|| format!("{name}: invalid geometry"))?;
        let materials = if slots.len() == 1 {
            MaterialSlots::Single(slots.remove(0))
        } else {
            geometry = geometry
                .with_groups(groups)
                .with_context(|| format!("{name}: invalid groups"))?;
            MaterialSlots::Multi(slots)
        };

        log::debug!("{name}: {} slots", materials.len());
        self.scene
            .add(Drawable::new(name, geometry, materials).with_transform(transform));
        Ok(())
    }

    fn material(&mut self, material: &gltf::Material<'_>) -> Arc<Material> {
        if let Some(m) = self.materials.get(&material.index()) {
            return m.clone();
        }

        let pbr = material.pbr_metallic_roughness();
        let diffuse = pbr
            .base_color_texture()
            .and_then(|info| self.texture(info.texture().source().index()));
        let cutoff = match material.alpha_mode() {
            AlphaMode::Mask => Some(material.alpha_cutoff().unwrap_or(DEFAULT_ALPHA_CUTOFF)),
            AlphaMode::Opaque | AlphaMode::Blend => None,
        };

        let converted = Arc::new(
            Material::new(material.name().unwrap_or("default"))
                .with_base_color(pbr.base_color_factor())
                .with_diffuse(diffuse)
                .with_alpha_cutoff(cutoff)
                .with_double_sided(material.double_sided()),
        );
        self.materials.insert(material.index(), converted.clone());
        converted
    }

    fn texture(&mut self, image_index: usize) -> Option<TextureHandle> {
        if let Some(t) = self.textures.get(&image_index) {
            return Some(t.clone());
        }
        let data = self.images.get(image_index)?;
        let Some(rgba) = rgba_from_gltf(data.format, data.width, data.height, &data.pixels) else {
            log::warn!("image {image_index}: unsupported {:?} pixels", data.format);
            return None;
        };
        let texture = match Texture2d::from_rgba8(
            self.gpu,
            &format!("gltf image {image_index}"),
            &rgba,
            ColorSpace::Srgb,
        ) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("image {image_index}: {e}");
                return None;
            }
        };
        self.textures.insert(image_index, texture.clone());
        Some(texture)
    }
}

/// Expands 8-bit glTF image data to RGBA8. Returns `None` for empty images,
/// short pixel data and 16/32-bit formats.
pub(crate) fn rgba_from_gltf(format: Format, width: u32, height: u32, pixels: &[u8]) -> Option<RgbaImage> {
    let channels = match format {
        Format::R8 => 1,
        Format::R8G8 => 2,
        Format::R8G8B8 => 3,
        Format::R8G8B8A8 => 4,
        _ => return None,
    };
    let expected = width as usize * height as usize * channels;
    if expected == 0 || pixels.len() < expected {
        return None;
    }

    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for px in pixels[..expected].chunks_exact(channels) {
        let rgba = match *px {
            [l] => [l, l, l, 255],
            [l, a] => [l, l, l, a],
            [r, g, b] => [r, g, b, 255],
            [r, g, b, a, ..] => [r, g, b, a],
            [] => [0, 0, 0, 255],
        };
        out.extend_from_slice(&rgba);
    }
    RgbaImage::from_raw(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decal_engine::GpuInit;
    use glam::Vec3;

    #[test]
    fn expands_gray_and_rgb() {
        let img = rgba_from_gltf(Format::R8G8, 2, 1, &[10, 20, 30, 40]).unwrap();
        assert_eq!(img.as_raw(), &[10, 10, 10, 20, 30, 30, 30, 40]);

        let img = rgba_from_gltf(Format::R8G8B8, 1, 1, &[1, 2, 3]).unwrap();
        assert_eq!(img.as_raw(), &[1, 2, 3, 255]);
    }

    #[test]
    fn rejects_short_or_wide_data() {
        assert!(rgba_from_gltf(Format::R8G8B8A8, 2, 2, &[0; 15]).is_none());
        assert!(rgba_from_gltf(Format::R16, 1, 1, &[0; 2]).is_none());
        assert!(rgba_from_gltf(Format::R8, 0, 4, &[]).is_none());
    }

    #[test]
    fn vrm_facing_turns_around() {
        let m = ImportOptions { vrm_facing: true }.root_transform();
        let forward = m.transform_vector3(Vec3::Z);
        assert!((forward + Vec3::Z).length() < 1e-5);
        assert_eq!(ImportOptions::default().root_transform(), Mat4::IDENTITY);
    }

    // Two unindexed triangles in one mesh, one per material; no normals.
    const TWO_PRIMITIVES: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "Body", "mesh": 0, "translation": [1, 0, 0] }],
        "meshes": [{ "primitives": [
            { "attributes": { "POSITION": 0 }, "material": 0 },
            { "attributes": { "POSITION": 1 }, "material": 1 }
        ] }],
        "materials": [
            { "name": "Skin" },
            { "name": "Hair", "alphaMode": "MASK", "doubleSided": true }
        ],
        "accessors": [
            { "bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0, 0, 0], "max": [1, 1, 0] },
            { "bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [-1, -1, 0], "max": [0, 0, 0] }
        ],
        "bufferViews": [{ "buffer": 0, "byteLength": 72 }],
        "buffers": [{ "byteLength": 72, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAACAvwAAAAAAAAAAAAAAAAAAgL8AAAAA" }]
    }"#;

    #[test]
    fn primitives_become_groups_and_slots() {
        let Ok(gpu) = Gpu::headless_blocking(GpuInit::default()) else {
            log::warn!("no GPU adapter; skipping");
            return;
        };
        let (document, buffers, images) = gltf::import_slice(TWO_PRIMITIVES.as_bytes()).unwrap();
        let scene = build_scene(&gpu, &document, &buffers, &images, ImportOptions::default()).unwrap();

        let handle = scene.find("Body").unwrap();
        let body = scene.get(handle).unwrap();
        assert_eq!(
            body.geometry.groups(),
            &[Group::new(0, 3, 0), Group::new(3, 3, 1)]
        );
        assert_eq!(body.geometry.indices(), &[0, 1, 2, 3, 4, 5]);
        for n in body.geometry.normals().unwrap() {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-5);
        }

        let names: Vec<_> = body.materials.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, ["Skin", "Hair"]);
        let hair = body.materials.get(1).unwrap();
        assert_eq!(hair.alpha_cutoff(), Some(DEFAULT_ALPHA_CUTOFF));
        assert!(hair.is_double_sided());
        assert_eq!(body.transform.w_axis.truncate(), Vec3::X);
    }
}
