use crate::scene::ShaderVariant;

/// How the decal is projected onto the surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProjectionMode {
    /// Every texel inside the placement is written, whichever way it faces.
    #[default]
    Unlit,
    /// Texels whose surface faces away from the camera are left untouched.
    Lit,
}

impl ProjectionMode {
    #[inline]
    pub fn variant(self) -> ShaderVariant {
        match self {
            Self::Unlit => ShaderVariant::UnlitDecalProjector,
            Self::Lit => ShaderVariant::LitDecalProjector,
        }
    }

    #[inline]
    pub fn needs_normals(self) -> bool {
        matches!(self, Self::Lit)
    }
}

/// Baker configuration.
#[derive(Debug, Copy, Clone)]
pub struct BakerConfig {
    pub mode: ProjectionMode,
    /// Filter used to sample the decal image.
    pub filter: wgpu::FilterMode,
}

impl Default for BakerConfig {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Unlit,
            filter: wgpu::FilterMode::Linear,
        }
    }
}

impl BakerConfig {
    pub fn with_mode(mode: ProjectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}
