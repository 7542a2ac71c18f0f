#![deny(unsafe_code)]
//! CLI binary for shadegraph.
//!
//! Subcommands:
//! - `list`: print the standard primitives grouped by kind
//! - `compile <chain.json>`: compile a chain to a fragment shader
//! - `plan <scene.json>`: run a scene on the recording backend and print
//!   the draw and clear calls each frame would issue

mod error;

use clap::{ArgAction, Parser, Subcommand};
use error::CliError;
use serde_json::{json, Map, Value};
use shadegraph_core::pipeline::{Command as ApiCommand, HeadlessApi, Renderer};
use shadegraph_core::{scene, CompiledProgram, PrimitiveKind, PrimitiveRegistry, Scene};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const KINDS: [PrimitiveKind; 5] = [
    PrimitiveKind::Source,
    PrimitiveKind::Coord,
    PrimitiveKind::Color,
    PrimitiveKind::Combine,
    PrimitiveKind::CombineCoord,
];

#[derive(Parser)]
#[command(name = "shadegraph", about = "Shader-graph compiler and render planner")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log more (-v debug, -vv trace). RUST_LOG applies when absent.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the standard primitives grouped by kind.
    List,
    /// Compile a chain description to GLSL.
    Compile {
        /// JSON chain: an array of `{ "op", "args" }` nodes.
        chain: PathBuf,

        /// Write the fragment source here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a scene headlessly and print the backend calls per frame.
    Plan {
        /// JSON scene description.
        scene: PathBuf,

        /// Number of frames to tick.
        #[arg(short, long, default_value_t = 1)]
        frames: usize,

        /// Seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Primitive names keyed by kind, in registration order.
fn primitive_listing(registry: &PrimitiveRegistry) -> Map<String, Value> {
    KINDS
        .iter()
        .map(|&kind| (kind.as_str().to_string(), json!(registry.names_of_kind(kind))))
        .collect()
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn compile_file(path: &Path) -> Result<CompiledProgram, CliError> {
    let value: Value = serde_json::from_str(&read_input(path)?).map_err(|e| CliError::Parse {
        path: path.display().to_string(),
        message: format!("invalid chain JSON: {e}"),
    })?;
    let chain = scene::parse_chain(&value).map_err(|e| CliError::in_file(path, e))?;
    Ok(shadegraph_library::standard_compiler().compile(&chain)?)
}

fn program_json(program: &CompiledProgram) -> Value {
    let uniforms: Vec<Value> = program
        .uniforms
        .iter()
        .map(|u| json!({"name": u.name, "type": u.ty.to_string()}))
        .collect();
    json!({
        "return_type": program.return_type.to_string(),
        "uniforms": uniforms,
        "source": program.source,
    })
}

/// Backend calls recorded while setting up a scene and then per frame.
struct Plan {
    setup: Vec<ApiCommand>,
    frames: Vec<(f64, Vec<ApiCommand>)>,
}

fn plan_scene(scene: &Scene, frames: usize, dt: f64) -> Result<Plan, CliError> {
    let compiler = shadegraph_library::standard_compiler();
    let mut renderer = Renderer::new(HeadlessApi::new(), compiler, &scene.config)?;
    scene.apply(&mut renderer)?;
    let setup = renderer.api_mut().take_commands();

    let mut recorded = Vec::with_capacity(frames);
    for _ in 0..frames {
        renderer.tick(dt)?;
        let commands = renderer.api_mut().take_commands();
        recorded.push((renderer.time(), commands));
    }
    Ok(Plan {
        setup,
        frames: recorded,
    })
}

fn describe(command: &ApiCommand) -> String {
    match command {
        ApiCommand::CreateTarget { target, width, height } => {
            format!("create target {} ({width}x{height})", target.0)
        }
        ApiCommand::ResizeTarget { target, width, height } => {
            format!("resize target {} ({width}x{height})", target.0)
        }
        ApiCommand::DestroyTarget { target } => format!("destroy target {}", target.0),
        ApiCommand::CreateProgram { program } => format!("create program {}", program.0),
        ApiCommand::Draw(draw) => {
            let blend = if draw.blend.is_some() { "blended" } else { "opaque" };
            format!(
                "draw program {} -> target {} ({}, {} items, {} uniforms, {blend})",
                draw.program.0,
                draw.target.0,
                draw.topology.as_str(),
                draw.count,
                draw.uniforms.len()
            )
        }
        ApiCommand::Clear { target, color } => format!("clear target {} to {color:?}", target.0),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let registry = shadegraph_library::standard_registry();
            if cli.json {
                let listing = primitive_listing(&registry);
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                for kind in KINDS {
                    println!("{}:", kind.as_str());
                    println!("  {}", registry.names_of_kind(kind).join(", "));
                }
            }
        }
        Command::Compile { chain, output } => {
            let program = compile_file(&chain)?;
            if let Some(path) = &output {
                std::fs::write(path, &program.source).map_err(|e| CliError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            }
            if cli.json {
                let mut info = program_json(&program);
                if let Some(path) = &output {
                    info["output"] = json!(path.display().to_string());
                }
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let Some(path) = &output {
                eprintln!(
                    "compiled {} ({} uniforms) -> {}",
                    chain.display(),
                    program.uniforms.len(),
                    path.display()
                );
            } else {
                print!("{}", program.source);
            }
        }
        Command::Plan { scene, frames, dt } => {
            let loaded = Scene::from_json(&read_input(&scene)?).map_err(|e| CliError::in_file(&scene, e))?;
            let plan = plan_scene(&loaded, frames, dt)?;
            if cli.json {
                let frames: Vec<Value> = plan
                    .frames
                    .iter()
                    .enumerate()
                    .map(|(i, (time, commands))| json!({"frame": i, "time": time, "commands": commands}))
                    .collect();
                let info = json!({"setup": plan.setup, "frames": frames});
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("setup:");
                for command in &plan.setup {
                    println!("  {}", describe(command));
                }
                for (i, (time, commands)) in plan.frames.iter().enumerate() {
                    println!("frame {i} (t = {time:.3}):");
                    for command in commands {
                        println!("  {}", describe(command));
                    }
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
