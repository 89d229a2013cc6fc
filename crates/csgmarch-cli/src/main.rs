//! csgmarch CLI - Render and inspect implicit surface CSG scenes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use csgmarch_math::Vector3;
use csgmarch_render::{MarchParams, Raymarcher, RenderConfig, load_scene, save_scene};
use csgmarch_sdf::{ImplicitSurface, SceneId, Surface, build_shader};
use tracing::Level;

#[derive(Parser)]
#[command(name = "csgmarch")]
#[command(about = "Ray-marched CSG of implicit surfaces", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output (frame timings, scene swaps)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to an image file
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Output image file (.png)
        #[arg(short, long, default_value = "render.png")]
        output: PathBuf,
    },

    /// Render frames while orbiting the camera around the scene
    Turntable {
        #[command(flatten)]
        scene: SceneArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Directory for the numbered frames
        #[arg(short, long, default_value = "turntable")]
        output_dir: PathBuf,

        /// Number of frames
        #[arg(long, default_value = "24")]
        frames: u32,

        /// Orbit speed in radians per second
        #[arg(long, default_value = "0.5")]
        speed: f64,

        /// Frames per second of the sequence
        #[arg(long, default_value = "12")]
        fps: u32,

        /// Orbit radius
        #[arg(long, default_value = "5.0")]
        radius: f64,
    },

    /// Print or write the generated WGSL shader for a scene
    Shader {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate distance and normal at a point
    Eval {
        #[command(flatten)]
        scene: SceneArgs,

        /// Point as x,y,z
        #[arg(value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
        point: Vec<f64>,
    },

    /// List the built-in scenes
    Scenes,

    /// Write a scene tree as JSON
    ExportScene {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Which scene to work on
#[derive(Args)]
struct SceneArgs {
    /// Built-in scene by name or key (1-5, C)
    #[arg(short, long, conflicts_with = "scene_file")]
    scene: Option<SceneId>,

    /// Scene tree JSON file
    #[arg(long)]
    scene_file: Option<PathBuf>,
}

impl SceneArgs {
    fn load(&self) -> Result<Surface> {
        if let Some(path) = &self.scene_file {
            return load_scene(path)
                .with_context(|| format!("Failed to load scene {}", path.display()));
        }
        let id = self.scene.unwrap_or_default();
        tracing::info!(scene = %id, "{}", id.title());
        Ok(id.build())
    }
}

/// Render settings: an optional config file plus flag overrides
#[derive(Args)]
struct RenderArgs {
    /// Render config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image width
    #[arg(long)]
    width: Option<u32>,

    /// Image height
    #[arg(long)]
    height: Option<u32>,

    /// Vertical field of view in degrees
    #[arg(long)]
    fov: Option<f64>,

    /// Maximum march iterations per ray
    #[arg(long)]
    max_steps: Option<u32>,

    /// Distance at which a ray counts as a miss
    #[arg(long)]
    max_distance: Option<f64>,

    /// Surface hit threshold
    #[arg(long)]
    epsilon: Option<f64>,
}

impl RenderArgs {
    fn resolve(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(fov) = self.fov {
            config.camera.fov = fov;
        }

        let march = config.march;
        config.march = MarchParams::new(
            self.max_steps.unwrap_or(march.max_steps()),
            self.max_distance.unwrap_or(march.max_distance()),
            self.epsilon.unwrap_or(march.epsilon()),
        )?;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match cli.command {
        Commands::Render {
            scene,
            render,
            output,
        } => {
            run_render(&scene, &render, &output)?;
        }
        Commands::Turntable {
            scene,
            render,
            output_dir,
            frames,
            speed,
            fps,
            radius,
        } => {
            run_turntable(&scene, &render, &output_dir, frames, speed, fps, radius)?;
        }
        Commands::Shader { scene, output } => {
            run_shader(&scene, output.as_deref())?;
        }
        Commands::Eval { scene, point } => {
            run_eval(&scene, &point)?;
        }
        Commands::Scenes => {
            list_scenes();
        }
        Commands::ExportScene { scene, output } => {
            let surface = scene.load()?;
            save_scene(&surface, &output)?;
            println!("Saved to: {}", output.display());
        }
    }

    Ok(())
}

fn run_render(scene: &SceneArgs, render: &RenderArgs, output: &Path) -> Result<()> {
    let surface = scene.load()?;
    let config = render.resolve()?;

    println!(
        "Rendering to {} ({}x{})...",
        output.display(),
        config.width,
        config.height
    );

    let raymarcher = Raymarcher::with_config(surface, &config);
    raymarcher.render_to_file(config.width, config.height, output)?;

    println!("Saved to: {}", output.display());
    Ok(())
}

fn run_turntable(
    scene: &SceneArgs,
    render: &RenderArgs,
    output_dir: &Path,
    frames: u32,
    speed: f64,
    fps: u32,
    radius: f64,
) -> Result<()> {
    if frames == 0 || fps == 0 {
        bail!("frames and fps must be at least 1");
    }
    if !(radius.is_finite() && radius > 0.0) {
        bail!("radius must be positive, got {}", radius);
    }

    let surface = scene.load()?;
    let config = render.resolve()?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut raymarcher = Raymarcher::with_config(surface, &config);

    println!(
        "Rendering {} frames to {} ({}x{})...",
        frames,
        output_dir.display(),
        config.width,
        config.height
    );

    for frame in 0..frames {
        let angle = f64::from(frame) / f64::from(fps) * speed;
        raymarcher.camera_mut().orbit_y(angle, radius);
        let path = output_dir.join(format!("frame_{:04}.png", frame));
        raymarcher.render_to_file(config.width, config.height, &path)?;
    }

    println!("Saved {} frames to: {}", frames, output_dir.display());
    Ok(())
}

fn run_shader(scene: &SceneArgs, output: Option<&Path>) -> Result<()> {
    let surface = scene.load()?;
    let shader = build_shader(&surface);

    match output {
        Some(path) => {
            fs::write(path, shader)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved to: {}", path.display());
        }
        None => print!("{}", shader),
    }
    Ok(())
}

fn run_eval(scene: &SceneArgs, point: &[f64]) -> Result<()> {
    let [x, y, z] = point else {
        bail!("expected a point as x,y,z, got {} values", point.len());
    };
    let p = Vector3::new(*x, *y, *z);
    let surface = scene.load()?;

    let distance = surface.evaluate(p);
    let normal = surface.gradient(p);
    let side = if distance < 0.0 {
        "inside"
    } else if distance > 0.0 {
        "outside"
    } else {
        "on surface"
    };

    println!("point:    ({}, {}, {})", p.x, p.y, p.z);
    println!("distance: {:.6} ({})", distance, side);
    println!("normal:   ({:.6}, {:.6}, {:.6})", normal.x, normal.y, normal.z);
    Ok(())
}

fn list_scenes() {
    println!("Built-in scenes:\n");
    for id in SceneId::ALL {
        let marker = if id == SceneId::default() {
            " (default)"
        } else {
            ""
        };
        println!(
            "  [{}] {:<14} {}{}",
            id.key(),
            id.name(),
            id.title(),
            marker
        );
    }
}
