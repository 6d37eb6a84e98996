//! Studio settings: camera, viewport and output defaults, optionally loaded
//! from a TOML file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use decal_engine::scene::Camera;
use decal_engine::{BakerConfig, OutlineRule, PickerConfig, ProjectionMode, Viewport};
use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid size {0:?}, expected WIDTHxHEIGHT")]
    InvalidSize(String),
}

/// Pixel size written as `WIDTHxHEIGHT` on the command line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn viewport(self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidSize(s.to_string());
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Unlit,
    Lit,
}

impl From<Projection> for ProjectionMode {
    fn from(p: Projection) -> Self {
        match p {
            Projection::Unlit => ProjectionMode::Unlit,
            Projection::Lit => ProjectionMode::Lit,
        }
    }
}

/// Camera placement shortcuts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum CameraPreset {
    /// Back to the configured position and target.
    Reset,
    /// Look straight along -Z, keeping the distance and target.
    Front,
    /// Move the target onto the Y axis at eye height, keeping the offset.
    Center,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov: f32,
    pub orthographic: bool,
    /// Half of the visible height for the orthographic camera.
    pub half_height: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 30.0,
            orthographic: false,
            half_height: 2.5,
            position: [0.0, 1.0, 5.0],
            target: [0.0, 1.0, 0.0],
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraSettings {
    /// Eye and target after applying `preset`.
    pub fn placement(&self, preset: CameraPreset) -> (Vec3, Vec3) {
        let eye = Vec3::from(self.position);
        let target = Vec3::from(self.target);
        match preset {
            CameraPreset::Reset => (eye, target),
            CameraPreset::Front => (target + Vec3::Z * eye.distance(target), target),
            CameraPreset::Center => {
                let new_target = Vec3::new(0.0, eye.y, 0.0);
                (eye + (new_target - target), new_target)
            }
        }
    }

    pub fn build(&self, viewport: Viewport, preset: CameraPreset) -> Camera {
        let (eye, target) = self.placement(preset);
        let camera = if self.orthographic {
            Camera::orthographic(self.half_height, viewport.aspect(), self.near, self.far)
        } else {
            Camera::perspective(self.fov, viewport.aspect(), self.near, self.far)
        };
        camera.looking_at(eye, target)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StudioSettings {
    pub camera: CameraSettings,
    pub viewport: Size,
    pub texture: Size,
    /// Material name fragments treated as outlines when picking.
    pub outline_patterns: Vec<String>,
    pub projection: Projection,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            viewport: Size::new(1280, 720),
            texture: Size::new(1024, 1024),
            outline_patterns: vec!["outline".to_string()],
            projection: Projection::Unlit,
        }
    }
}

impl StudioSettings {
    /// Defaults, or the file at `path` layered over them.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&text)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn outline_rule(&self) -> OutlineRule {
        if self.outline_patterns.is_empty() {
            OutlineRule::Never
        } else {
            OutlineRule::NameContains(self.outline_patterns.clone())
        }
    }

    pub fn picker_config(&self) -> PickerConfig {
        PickerConfig {
            outline: self.outline_rule(),
        }
    }

    pub fn baker_config(&self) -> BakerConfig {
        BakerConfig::with_mode(self.projection.into())
    }
}
