use std::fmt;
use std::sync::Arc;

use crate::scene::Material;

/// Decides which materials are outlines and must never be picked.
#[derive(Clone)]
pub enum OutlineRule {
    /// Every material is pickable.
    Never,
    /// Case-insensitive substring match on the material name.
    NameContains(Vec<String>),
    Custom(Arc<dyn Fn(&Material) -> bool + Send + Sync>),
}

impl OutlineRule {
    pub fn is_outline(&self, material: &Material) -> bool {
        match self {
            Self::Never => false,
            Self::NameContains(patterns) => {
                let name = material.name().to_lowercase();
                patterns
                    .iter()
                    .any(|p| name.contains(&p.to_lowercase()))
            }
            Self::Custom(f) => f(material),
        }
    }
}

impl Default for OutlineRule {
    fn default() -> Self {
        Self::NameContains(vec!["outline".to_string()])
    }
}

impl fmt::Debug for OutlineRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::NameContains(p) => f.debug_tuple("NameContains").field(p).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Picker configuration.
#[derive(Debug, Clone, Default)]
pub struct PickerConfig {
    pub outline: OutlineRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_matches_outline_case_insensitively() {
        let rule = OutlineRule::default();
        assert!(rule.is_outline(&Material::new("Hair_OUTLINE")));
        assert!(rule.is_outline(&Material::new("outline")));
        assert!(!rule.is_outline(&Material::new("Body")));
    }

    #[test]
    fn custom_rule() {
        let rule = OutlineRule::Custom(Arc::new(|m: &Material| m.name().ends_with("_edge")));
        assert!(rule.is_outline(&Material::new("face_edge")));
        assert!(!OutlineRule::Never.is_outline(&Material::new("outline")));
    }
}
