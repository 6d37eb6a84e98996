use std::sync::Arc;

use crate::texture::TextureHandle;

/// Shader program a material is drawn with.
///
/// Each variant is a fixed pipeline built once per target format; materials
/// select one instead of patching shader text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ShaderVariant {
    /// Unlit textured surface (preview renders).
    #[default]
    Surface,
    /// Flat color carrying a pick id; honors alpha cutoff.
    FlatId,
    /// UV-space projector, ignores surface orientation.
    UnlitDecalProjector,
    /// UV-space projector that discards texels facing away from the camera.
    LitDecalProjector,
}

/// Surface description attached to a drawable slot.
///
/// The fields are exposed through a fixed set of queries (`name`,
/// `is_visible`, `alpha_cutoff`, `diffuse`) so substitutes can be derived
/// without knowing where the material came from.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    visible: bool,
    alpha_cutoff: Option<f32>,
    diffuse: Option<TextureHandle>,
    base_color: [f32; 4],
    double_sided: bool,
    variant: ShaderVariant,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            alpha_cutoff: None,
            diffuse: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            double_sided: false,
            variant: ShaderVariant::Surface,
        }
    }

    /// A material that never produces fragments.
    pub fn invisible() -> Self {
        Self::new("").with_visible(false)
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Alpha-test threshold; fragments with alpha below it are discarded.
    /// A cutoff of zero (or `None`) disables the test.
    pub fn with_alpha_cutoff(mut self, cutoff: Option<f32>) -> Self {
        self.alpha_cutoff = cutoff.filter(|c| *c > 0.0);
        self
    }

    pub fn with_diffuse(mut self, diffuse: Option<TextureHandle>) -> Self {
        self.diffuse = diffuse;
        self
    }

    /// Linear RGBA multiplier applied to the diffuse texel.
    pub fn with_base_color(mut self, base_color: [f32; 4]) -> Self {
        self.base_color = base_color;
        self
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn with_variant(mut self, variant: ShaderVariant) -> Self {
        self.variant = variant;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn alpha_cutoff(&self) -> Option<f32> {
        self.alpha_cutoff
    }

    #[inline]
    pub fn diffuse(&self) -> Option<&TextureHandle> {
        self.diffuse.as_ref()
    }

    #[inline]
    pub fn base_color(&self) -> [f32; 4] {
        self.base_color
    }

    #[inline]
    pub fn is_double_sided(&self) -> bool {
        self.double_sided
    }

    #[inline]
    pub fn variant(&self) -> ShaderVariant {
        self.variant
    }
}

/// The material binding of one drawable: a single material for the whole
/// geometry, or one per group slot.
#[derive(Debug, Clone)]
pub enum MaterialSlots {
    Single(Arc<Material>),
    Multi(Vec<Arc<Material>>),
}

impl MaterialSlots {
    /// Material used for `slot`. A single material serves every slot.
    pub fn get(&self, slot: usize) -> Option<&Arc<Material>> {
        match self {
            Self::Single(m) => Some(m),
            Self::Multi(ms) => ms.get(slot),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(ms) => ms.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Material>> {
        let (single, multi) = match self {
            Self::Single(m) => (Some(m), [].iter()),
            Self::Multi(ms) => (None, ms.iter()),
        };
        single.into_iter().chain(multi)
    }

    /// Builds a binding of the same shape, slot for slot.
    pub fn map(&self, mut f: impl FnMut(&Arc<Material>) -> Arc<Material>) -> Self {
        match self {
            Self::Single(m) => Self::Single(f(m)),
            Self::Multi(ms) => Self::Multi(ms.iter().map(f).collect()),
        }
    }

    /// Pointer identity of every slot (not structural equality).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => Arc::ptr_eq(a, b),
            (Self::Multi(a), Self::Multi(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
            }
            _ => false,
        }
    }
}

impl From<Material> for MaterialSlots {
    fn from(m: Material) -> Self {
        Self::Single(Arc::new(m))
    }
}

impl From<Arc<Material>> for MaterialSlots {
    fn from(m: Arc<Material>) -> Self {
        Self::Single(m)
    }
}

impl From<Vec<Arc<Material>>> for MaterialSlots {
    fn from(ms: Vec<Arc<Material>>) -> Self {
        Self::Multi(ms)
    }
}
