use glam::{Mat4, Vec3};

/// Projection half of a camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        /// Half of the visible world-space height.
        half_height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Clip-space matrix (wgpu depth range `[0, 1]`, right-handed).
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far),
            Self::Orthographic {
                half_height,
                aspect,
                near,
                far,
            } => {
                let half_width = half_height * aspect;
                Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, near, far)
            }
        }
    }
}

/// View + projection supplied by the host each frame.
///
/// The engine only needs the combined transform (and whether it is
/// orthographic, for view-direction math in the lit projector).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Projection,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Projection::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            },
        }
    }

    pub fn orthographic(half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Projection::Orthographic {
                half_height,
                aspect,
                near,
                far,
            },
        }
    }

    /// Places the camera at `eye` looking at `target`, +Y up.
    pub fn looking_at(mut self, eye: Vec3, target: Vec3) -> Self {
        self.view = Mat4::look_at_rh(eye, target, Vec3::Y);
        self
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view
    }

    #[inline]
    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    /// World-space eye position.
    pub fn eye(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    /// Follows a viewport resize. Orthographic cameras keep their height and
    /// widen or narrow horizontally.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        match &mut self.projection {
            Projection::Perspective { aspect, .. } | Projection::Orthographic { aspect, .. } => {
                *aspect = new_aspect;
            }
        }
    }

    /// Changes the vertical field of view; no-op for orthographic cameras.
    pub fn set_fov(&mut self, degrees: f32) {
        if let Projection::Perspective { fov_y_degrees, .. } = &mut self.projection {
            *fov_y_degrees = degrees;
        }
    }

    /// Projects a world point to `[0, 1]` screen space (+Y up), or `None`
    /// when the point is behind the camera.
    pub fn project_to_screen(&self, world: Vec3) -> Option<glam::Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate().truncate() / clip.w;
        Some(ndc * 0.5 + glam::Vec2::splat(0.5))
    }
}
