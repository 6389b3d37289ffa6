use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{load_obj, Config};
use lumen_renderer::{Camera, PngSink, Renderer, Scene};

#[derive(Parser)]
#[command(name = "lumen", version, about = "Offline Monte Carlo path tracer")]
struct Cli {
    /// Wavefront OBJ scene
    scene: PathBuf,

    /// Directory holding the scene's MTL files and textures
    materials: PathBuf,

    /// JSON render configuration
    config: PathBuf,

    /// Output PNG, rewritten at every autosave
    #[arg(default_value = "render.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    log::info!("Loading {}", cli.scene.display());
    let mesh = load_obj(&cli.scene, &cli.materials, &config.loader)
        .with_context(|| format!("loading scene {}", cli.scene.display()))?;
    log::info!(
        "Loaded {} triangles, {} vertices, {} materials",
        mesh.triangle_count(),
        mesh.vertex_count(),
        mesh.materials.len()
    );

    let camera = Camera::from_config(&config.camera);
    let scene = Scene::from_mesh(mesh, camera);

    let renderer = Renderer::from_config(&config, PngSink);
    renderer
        .render(&scene, &cli.output)
        .with_context(|| format!("rendering to {}", cli.output.display()))?;

    log::info!("Saved {}", cli.output.display());
    Ok(())
}
