//! Echo Warden - headless scenario runner
//!
//! Loads a scene, runs it for a fixed number of ticks and prints what the
//! agents heard and did, as text or JSON.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use echo_warden::core::config::SimulationConfig;
use echo_warden::core::error::Result;
use echo_warden::core::types::SoundTag;
use echo_warden::simulation::{run_simulation_tick, Scenario, SimulationEvent};

/// Run a sound propagation scenario headless
#[derive(Parser, Debug)]
#[command(name = "echo-warden")]
#[command(about = "Run a sound propagation scenario and report agent behaviour")]
struct Args {
    /// Scenario file, or the name of a bundled scenario under data/scenarios/
    #[arg(long, default_value = "cavern")]
    scenario: String,

    /// Optional TOML config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct AgentSummary {
    name: String,
    state: String,
    position: [f32; 3],
    suspicion: Vec<(SoundTag, f32)>,
}

#[derive(Serialize)]
struct RunReport {
    scenario: String,
    seed: u64,
    ticks: u64,
    elapsed: f32,
    active_waves: usize,
    agents: Vec<AgentSummary>,
    events: Vec<SimulationEvent>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echo_warden=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    let path = {
        let direct = PathBuf::from(&args.scenario);
        if direct.exists() {
            direct
        } else {
            Scenario::bundled_path(&args.scenario)
        }
    };
    let scenario = Scenario::load(&path)?;
    let mut world = scenario.build(config, seed)?;

    tracing::info!(scenario = %scenario.name, seed, ticks = args.ticks, dt = args.dt, "running");

    let mut events = Vec::new();
    for _ in 0..args.ticks {
        let tick_events = run_simulation_tick(&mut world, args.dt);
        if args.format == "text" {
            for event in &tick_events {
                println!("{}", event);
            }
        }
        events.extend(tick_events);
    }

    let agents = world
        .npcs
        .iter()
        .map(|npc| AgentSummary {
            name: npc.name.clone(),
            state: npc.brain.state().to_string(),
            position: npc.position().to_array(),
            suspicion: npc.brain.suspicion().entries().collect(),
        })
        .collect::<Vec<_>>();

    match args.format.as_str() {
        "json" => {
            let report = RunReport {
                scenario: scenario.name.clone(),
                seed,
                ticks: args.ticks,
                elapsed: world.now(),
                active_waves: world.field.active_waves(),
                agents,
                events,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!();
            println!("=== {} after {:.2}s (seed {}) ===", scenario.name, world.now(), seed);
            println!("{} events, {} waves in flight", events.len(), world.field.active_waves());
            for agent in &agents {
                println!(
                    "  {:<12} {:<12} at ({:.1}, {:.1}, {:.1})",
                    agent.name, agent.state, agent.position[0], agent.position[1], agent.position[2]
                );
            }
        }
    }

    Ok(())
}
