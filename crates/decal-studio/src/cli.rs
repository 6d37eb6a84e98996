use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use decal_engine::PlacementRect;

use crate::settings::{CameraPreset, Projection, Size, StudioSettings};

#[derive(Parser)]
#[command(name = "decal-studio")]
#[command(about = "Pick meshes and bake screen-space decals into their textures")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "decal_engine=trace"
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Viewport size the placement and pick coordinates refer to
    #[arg(long, global = true, value_name = "WxH")]
    pub viewport: Option<Size>,

    /// Bake output size
    #[arg(long, global = true, value_name = "WxH")]
    pub texture: Option<Size>,

    /// Use the orthographic camera
    #[arg(long, global = true)]
    pub ortho: bool,

    /// Vertical field of view in degrees
    #[arg(long, global = true)]
    pub fov: Option<f32>,

    /// Camera placement
    #[arg(long, global = true, value_enum, default_value = "reset")]
    pub camera: CameraPreset,
}

impl Cli {
    /// Layers command-line overrides over loaded settings.
    pub fn apply(&self, settings: &mut StudioSettings) {
        if let Some(v) = self.viewport {
            settings.viewport = v;
        }
        if let Some(t) = self.texture {
            settings.texture = t;
        }
        if self.ortho {
            settings.camera.orthographic = true;
        }
        if let Some(fov) = self.fov {
            settings.camera.fov = fov;
        }
        if let Commands::Bake { lit: true, .. } = self.command {
            settings.projection = Projection::Lit;
        }
    }
}

#[derive(Args)]
pub struct ModelArgs {
    /// glTF, GLB or VRM file
    pub model: PathBuf,

    /// Turn the model 180° around Y (VRM 0.x avatars face away)
    #[arg(long)]
    pub vrm_facing: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the mesh under a viewport pixel
    Pick {
        #[command(flatten)]
        model: ModelArgs,

        /// Pixel as x,y (top-left origin)
        #[arg(long)]
        at: ScreenPoint,
    },

    /// Bake an image into a mesh's texture space
    Bake {
        #[command(flatten)]
        model: ModelArgs,

        /// Decal image
        #[arg(short, long)]
        image: PathBuf,

        /// Target mesh by name
        #[arg(long, conflicts_with = "at", required_unless_present = "at")]
        mesh: Option<String>,

        /// Target mesh by picking this pixel (x,y)
        #[arg(long)]
        at: Option<ScreenPoint>,

        /// Material slot to bake
        #[arg(long, default_value_t = 0)]
        slot: usize,

        /// Placement as x,y,w,h in viewport pixels; the image aspect is kept otherwise
        #[arg(long, value_parser = parse_rect)]
        rect: Option<PlacementRect>,

        /// Center the placement horizontally
        #[arg(long)]
        center: bool,

        /// Existing texture to paint over
        #[arg(long)]
        base: Option<PathBuf>,

        /// Skip texels facing away from the camera
        #[arg(long)]
        lit: bool,

        /// Output PNG (default: <unix millis>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the model as the camera sees it
    Preview {
        #[command(flatten)]
        model: ModelArgs,

        /// Show the UV grid on the mesh under this pixel (x,y)
        #[arg(long)]
        select: Option<ScreenPoint>,

        /// Output PNG (default: <unix millis>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the UV test texture
    Uvgrid {
        /// Edge length in pixels
        #[arg(long, default_value_t = 1024)]
        size: u32,

        /// Output PNG (default: <unix millis>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A viewport pixel written as `x,y`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: u32,
    pub y: u32,
}

impl FromStr for ScreenPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected x,y, got {s:?}"))?;
        let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("{v:?}: {e}"));
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

fn parse_rect(s: &str) -> Result<PlacementRect, String> {
    let parts = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, w, h] => Ok(PlacementRect::new(x, y, w, h)),
        _ => Err(format!("expected x,y,w,h, got {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bake_requires_a_target() {
        assert!(Cli::try_parse_from(["decal-studio", "bake", "a.vrm", "-i", "d.png"]).is_err());
        assert!(
            Cli::try_parse_from([
                "decal-studio", "bake", "a.vrm", "-i", "d.png", "--mesh", "Body", "--at", "1,2"
            ])
            .is_err()
        );
    }

    #[test]
    fn overrides_layer_over_settings() {
        let cli = Cli::try_parse_from([
            "decal-studio", "--viewport", "640x480", "--ortho", "bake", "a.vrm", "-i", "d.png",
            "--at", "10,20", "--lit", "--rect", "1,2,3,4",
        ])
        .unwrap();
        let mut settings = StudioSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.viewport, Size::new(640, 480));
        assert!(settings.camera.orthographic);
        assert_eq!(settings.projection, Projection::Lit);

        let Commands::Bake { at, rect, .. } = cli.command else {
            panic!("expected bake");
        };
        assert_eq!(at, Some(ScreenPoint { x: 10, y: 20 }));
        assert_eq!(rect, Some(PlacementRect::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn point_and_rect_parsing() {
        assert_eq!(" 3, 4".parse::<ScreenPoint>().unwrap(), ScreenPoint { x: 3, y: 4 });
        assert!("3".parse::<ScreenPoint>().is_err());
        assert!("-1,2".parse::<ScreenPoint>().is_err());
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("1,2,x,4").is_err());
    }
}
