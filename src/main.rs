//! Ascend - headless traversal demo.
//!
//! Runs a scripted climb and wall run on the traversal course and logs what
//! happens. Pass a RON config path to override the defaults:
//!
//! ```text
//! RUST_LOG=ascend_physics=debug ascend config/traversal.ron
//! ```

use anyhow::Context;
use ascend_game::{ActionInput, Level, MovementEvent, PlayerInput, Simulation, SimulationConfig};
use ascend_physics::LocomotionHost;

/// Frames of the scripted run.
const WALK_FRAMES: u64 = 60;
const TOTAL_FRAMES: u64 = 480;

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("ascend=info".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path).with_context(|| format!("loading config {path}"))?,
        None => SimulationConfig::default(),
    };
    tracing::info!("Starting Ascend traversal demo at {} Hz", config.tick_rate);

    let mut sim = Simulation::new(config, Level::traversal_course());
    let climber = sim
        .add_character_at("Climber", "climb")
        .context("traversal course has no 'climb' spawn")?;
    let runner = sim
        .add_character_at("Runner", "wall_run")
        .context("traversal course has no 'wall_run' spawn")?;

    for frame in 0..TOTAL_FRAMES {
        let inputs = [climber_input(frame), runner_input(frame)];

        for event in sim.tick(&inputs) {
            let name = sim
                .get_character(event.character)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            match event.event {
                MovementEvent::ClimbEnded { reason } => {
                    tracing::info!("[{}] {} stopped climbing: {:?}", event.frame, name, reason);
                }
                other => tracing::info!("[{}] {} {:?}", event.frame, name, other),
            }
        }
    }

    for id in [climber, runner] {
        if let Some(character) = sim.get_character(id) {
            tracing::info!(
                "{}: position {:.2?}, mode {:?}",
                character.name,
                character.position(),
                character.body.movement_mode()
            );
        }
    }

    Ok(())
}

/// Walk to the block, then hold climb and forward.
fn climber_input(frame: u64) -> PlayerInput {
    let mut input = PlayerInput {
        frame: frame as u32,
        ..Default::default()
    };
    input.movement.forward = true;
    input.actions.climb = frame >= WALK_FRAMES;
    input
}

/// Jump next to the wall and let the run play out.
fn runner_input(frame: u64) -> PlayerInput {
    PlayerInput {
        frame: frame as u32,
        actions: ActionInput {
            jump: frame == 0,
            ..Default::default()
        },
        ..Default::default()
    }
}
