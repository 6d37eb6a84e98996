use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::coords::DecalRect;
use crate::scene::{Camera, Material};

/// Per-draw uniform block shared by every shader variant.
///
/// Layout matches `DrawUniform` in `shaders/common.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Inverse-transpose of `view * model`, for view-space normals.
    pub normal_view: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x = alpha cutoff (0 disables), y = 1 for orthographic cameras.
    pub params: [f32; 4],
    /// Decal rectangle as (min.x, min.y, max.x, max.y).
    pub decal_rect: [f32; 4],
}

impl DrawUniform {
    pub(crate) fn new(
        model: Mat4,
        camera: &Camera,
        material: &Material,
        decal_rect: Option<DecalRect>,
    ) -> Self {
        let view_model = camera.view * model;
        Self {
            model: model.to_cols_array_2d(),
            view: camera.view.to_cols_array_2d(),
            view_proj: camera.view_projection().to_cols_array_2d(),
            normal_view: view_model.inverse().transpose().to_cols_array_2d(),
            color: material.base_color(),
            params: [
                material.alpha_cutoff().unwrap_or(0.0),
                if camera.is_orthographic() { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
            decal_rect: decal_rect.map_or([0.0, 0.0, 1.0, 1.0], DecalRect::to_array),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_uniform_aligned() {
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 4 * 64 + 3 * 16);
    }

    #[test]
    fn params_carry_cutoff_and_projection_kind() {
        let cam = Camera::orthographic(2.5, 1.0, 0.1, 100.0);
        let mat = Material::new("m").with_alpha_cutoff(Some(0.5));
        let u = DrawUniform::new(Mat4::IDENTITY, &cam, &mat, None);
        assert_eq!(u.params[0], 0.5);
        assert_eq!(u.params[1], 1.0);
        assert_eq!(u.decal_rect, [0.0, 0.0, 1.0, 1.0]);
    }
}
