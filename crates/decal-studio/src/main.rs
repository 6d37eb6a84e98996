//! decal-studio: command-line front end for the decal engine.
//!
//! Loads a glTF/VRM model, then picks meshes, bakes decal images into their
//! UV space, or renders previews, all off-screen.

mod cli;
mod import;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use decal_engine::logging::{LoggingConfig, init_logging};
use decal_engine::pixels::timestamped_png_name;
use decal_engine::preview::PreviewRenderer;
use decal_engine::scene::{DrawableHandle, Material};
use decal_engine::texture::{ColorSpace, Texture2d};
use decal_engine::{
    BakeRequest, DecalBaker, Gpu, GpuInit, ImageSource, Picker, PlacementRect, Session, uv_grid,
};

use cli::{Cli, Commands, ModelArgs, ScreenPoint};
use import::ImportOptions;
use settings::StudioSettings;

const UV_GRID_SIZE: u32 = 512;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(
        cli.log
            .clone()
            .map(LoggingConfig::with_filter)
            .unwrap_or_default(),
    );

    let mut settings = StudioSettings::load(cli.settings.as_deref())?;
    cli.apply(&mut settings);

    match cli.command {
        Commands::Uvgrid { size, output } => {
            let output = output.unwrap_or_else(timestamped_png_name);
            uv_grid::generate(size)
                .save_with_format(&output, image::ImageFormat::Png)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("{}", output.display());
        }

        Commands::Pick { model, at } => {
            let gpu = Gpu::headless(GpuInit::default()).await?;
            let mut session = open_session(&gpu, &settings, &model, cli.camera).await?;
            let mut picker = Picker::new(settings.picker_config());

            match picker.pick(&gpu, &mut session, at.x, at.y)? {
                Some(handle) => print_drawable(&session, handle),
                None => println!("nothing at {},{}", at.x, at.y),
            }
        }

        Commands::Bake {
            model,
            image,
            mesh,
            at,
            slot,
            rect,
            center,
            base,
            lit: _,
            output,
        } => {
            let gpu = Gpu::headless(GpuInit::default()).await?;
            let mut session = open_session(&gpu, &settings, &model, cli.camera).await?;

            let target = match (mesh, at) {
                (Some(name), _) => find_mesh(&session, &name)?,
                (None, Some(at)) => pick_mesh(&gpu, &settings, &mut session, at)?,
                (None, None) => bail!("a target mesh is required"),
            };

            let source = ImageSource::from(image);
            let mut rect = match rect {
                Some(r) => r,
                None => {
                    let (w, h) = source.dimensions()?;
                    PlacementRect::default().fit_aspect(w, h)
                }
            };
            if center {
                rect = rect.centered_horizontally(session.viewport());
            }

            let mut request = BakeRequest::new(target, source, rect, settings.texture.viewport())
                .with_slot(slot);
            if let Some(base) = base {
                let base = image::open(&base)
                    .with_context(|| format!("failed to open {}", base.display()))?;
                request = request.with_base(base.to_rgba8());
            }

            let mut baker = DecalBaker::new(settings.baker_config());
            let pixels = baker.bake(&gpu, &mut session, request).await?;
            save(&pixels, output)?;
        }

        Commands::Preview {
            model,
            select,
            output,
        } => {
            let gpu = Gpu::headless(GpuInit::default()).await?;
            let mut session = open_session(&gpu, &settings, &model, cli.camera).await?;

            if let Some(at) = select {
                let handle = pick_mesh(&gpu, &settings, &mut session, at)?;
                print_drawable(&session, handle);
                let grid = Texture2d::from_rgba8(
                    &gpu,
                    "uv grid",
                    &uv_grid::generate(UV_GRID_SIZE),
                    ColorSpace::Srgb,
                )?;
                let display = Material::new("uv grid")
                    .with_diffuse(Some(grid))
                    .with_double_sided(true);
                session.select(handle, Arc::new(display));
            }

            let mut renderer = PreviewRenderer::new();
            let pixels = renderer
                .render(&gpu, &session)
                .await?
                .context("session has no scene to render")?;
            save(&pixels, output)?;
        }
    }

    Ok(())
}

async fn open_session(
    gpu: &Gpu,
    settings: &StudioSettings,
    model: &ModelArgs,
    preset: settings::CameraPreset,
) -> Result<Session> {
    let options = ImportOptions {
        vrm_facing: model.vrm_facing,
    };
    let scene = import::load_scene(gpu, &model.model, options).await?;

    let viewport = settings.viewport.viewport();
    let mut session = Session::new(viewport);
    session.set_scene(scene);
    session.set_camera(settings.camera.build(viewport, preset));
    Ok(session)
}

fn find_mesh(session: &Session, name: &str) -> Result<DrawableHandle> {
    session
        .scene()
        .and_then(|s| s.find(name))
        .with_context(|| format!("no mesh named {name:?}"))
}

fn pick_mesh(
    gpu: &Gpu,
    settings: &StudioSettings,
    session: &mut Session,
    at: ScreenPoint,
) -> Result<DrawableHandle> {
    let mut picker = Picker::new(settings.picker_config());
    picker
        .pick(gpu, session, at.x, at.y)?
        .with_context(|| format!("no mesh at {},{}", at.x, at.y))
}

fn print_drawable(session: &Session, handle: DrawableHandle) {
    let Some(drawable) = session.scene().and_then(|s| s.get(handle)) else {
        return;
    };
    let materials: Vec<&str> = drawable.materials.iter().map(|m| m.name()).collect();
    println!("{} [{}]", drawable.name, materials.join(", "));
}

fn save(pixels: &decal_engine::PixelBuffer, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(timestamped_png_name);
    pixels
        .save_png(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("wrote {}x{} {}", pixels.width(), pixels.height(), output.display());
    println!("{}", output.display());
    Ok(())
}
