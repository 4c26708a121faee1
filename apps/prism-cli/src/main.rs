use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use prism_input::{Action, InputState, MoveAction};
use prism_render::{DebugTextRenderer, FrameAssembler, FramePacket, Renderer};
use prism_scene::{Scene, SceneConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prism-cli", about = "Headless tools for the prism demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default scene config, or validate a config file
    Config {
        /// Config file to validate
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Run the frame loop without a window and print the last frame
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct SimulateArgs {
    /// Number of frames to run
    #[arg(short, long, default_value_t = 60)]
    frames: u32,
    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Movement held for the whole run, e.g. `forward,left`
    #[arg(long, value_delimiter = ',', value_parser = parse_move)]
    hold: Vec<MoveAction>,
    /// Pointer delta applied every frame with look active, e.g. `4,-2`
    #[arg(long, value_parser = parse_look, allow_hyphen_values = true)]
    look: Option<Vec2>,
    /// Switch to the next camera every K frames
    #[arg(long)]
    cycle_every: Option<u32>,
    /// Scene config file (defaults to the built-in demo scene)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the active camera as JSON instead of the frame dump
    #[arg(long)]
    json: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            frames: 60,
            dt: 1.0 / 60.0,
            hold: Vec::new(),
            look: None,
            cycle_every: None,
            config: None,
            json: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct CameraReport {
    frames: u32,
    elapsed: f32,
    camera: usize,
    position: [f32; 3],
    pitch_yaw_roll: [f32; 3],
    fov_degrees: f32,
    aspect_ratio: f32,
    draws: usize,
}

impl CameraReport {
    fn new(frames: u32, scene: &Scene, packet: &FramePacket) -> Self {
        let camera = scene.active_camera();
        Self {
            frames,
            elapsed: scene.elapsed(),
            camera: scene.active_camera_index(),
            position: camera.position().to_array(),
            pitch_yaw_roll: camera.transform().pitch_yaw_roll().to_array(),
            fov_degrees: camera.field_of_view().to_degrees(),
            aspect_ratio: camera.aspect_ratio(),
            draws: packet.draws.len(),
        }
    }
}

fn parse_move(s: &str) -> Result<MoveAction, String> {
    MoveAction::from_name(s).ok_or_else(|| format!("unknown movement `{s}`"))
}

fn parse_look(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `dx,dy`, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad number `{v}`: {e}"))
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

/// Run the update/assemble loop `frames` times and return the final state.
fn simulate(args: &SimulateArgs) -> anyhow::Result<(Scene, FramePacket)> {
    let config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::default(),
    };
    let mut scene = Scene::from_config(&config, config.window.aspect_ratio())?;
    let mut assembler = FrameAssembler::new();
    let mut input = InputState::new();
    for action in &args.hold {
        input.press(*action);
    }
    input.set_look_active(args.look.is_some());

    let mut packet = assembler.assemble(&mut scene)?;
    for frame in 1..=args.frames {
        if let Some(every) = args.cycle_every.filter(|k| *k > 0) {
            if frame % every == 0 {
                input.trigger(Action::NextCamera);
            }
        }
        if let Some(delta) = args.look {
            input.add_pointer_delta(delta.x, delta.y);
        }
        let snapshot = input.take_snapshot();
        scene.update(args.dt, &snapshot);
        packet = assembler.assemble(&mut scene)?;
    }

    tracing::info!(
        frames = args.frames,
        camera = scene.active_camera_index(),
        "simulation finished"
    );
    Ok((scene, packet))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("prism-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", prism_common::crate_info());
            println!("input: {}", prism_input::crate_info());
            println!("assets: {}", prism_assets::crate_info());
            println!("scene: {}", prism_scene::crate_info());
            println!("render: {}", prism_render::crate_info());
        }
        Commands::Config { path } => match path {
            Some(path) => {
                let config = SceneConfig::load(&path)
                    .with_context(|| format!("validating {}", path.display()))?;
                println!(
                    "{}: OK ({} cameras, {} materials, {} entities)",
                    path.display(),
                    config.cameras.len(),
                    config.materials.len(),
                    config.entities.len()
                );
            }
            None => print!("{}", SceneConfig::default().to_yaml()?),
        },
        Commands::Simulate(args) => {
            let (scene, packet) = simulate(&args)?;
            if args.json {
                let report = CameraReport::new(args.frames, &scene, &packet);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", DebugTextRenderer::new().render(&packet, scene.assets()));
            }
        }
    }

    Ok(())
}
