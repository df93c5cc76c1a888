#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that dry-runs the Waypoint planner against a
//! captured scenario and prints the commands it would issue.

mod dry_run;
mod scenario;

use std::{path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use waypoint_core::{Position, ProtocolSender};
use waypoint_system_movement::{MovementPlanner, MovementTuning};
use waypoint_system_region_order::{NearestNeighbor, RegionOrderer};
use waypoint_world::query;

use dry_run::{DryRunDispatcher, DryRunSender, Transcript};
use scenario::Scenario;

/// Dry-run tools for the Waypoint navigation engine.
#[derive(Debug, Parser)]
#[command(name = "waypoint", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a single movement tick and print the issued commands.
    Plan(PlanArgs),
    /// Print the nearest-neighbor room visitation order.
    Rooms(RoomsArgs),
}

#[derive(Debug, clap::Args)]
struct PlanArgs {
    /// Scenario TOML describing the captured tick.
    #[arg(long)]
    scenario: PathBuf,
    /// Movement tuning TOML; defaults apply when omitted.
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Seed for recovery randomness.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Destination as `x,y`; overrides the scenario destination.
    #[arg(long, value_parser = parse_position)]
    destination: Option<Position>,
    /// Walk duration in milliseconds bounding how far a walk aims; 0 is unbounded.
    #[arg(long, default_value_t = 0)]
    walk_ms: u64,
    /// Attach a protocol sender that accepts or rejects every command.
    #[arg(long, value_enum)]
    protocol: Option<ProtocolMode>,
}

#[derive(Debug, clap::Args)]
struct RoomsArgs {
    /// Scenario TOML describing the level.
    #[arg(long)]
    scenario: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProtocolMode {
    /// Every protocol command succeeds.
    Accept,
    /// Every protocol command fails.
    Reject,
}

/// Entry point for the Waypoint command-line interface.
fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let lines = match cli.command {
        Command::Plan(args) => plan(&args)?,
        Command::Rooms(args) => rooms(&args)?,
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn plan(args: &PlanArgs) -> Result<Vec<String>> {
    let scenario = Scenario::load(&args.scenario)?;
    tracing::debug!(scenario = %args.scenario.display(), seed = args.seed, "planning one tick");
    let tuning = match &args.tuning {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read tuning at {}", path.display()))?;
            MovementTuning::from_toml_str(&contents)
                .with_context(|| format!("invalid tuning in {}", path.display()))?
        }
        None => MovementTuning::default(),
    };
    let destination = args
        .destination
        .or(scenario.destination)
        .context("no destination: pass --destination or set one in the scenario")?;

    plan_tick(
        &scenario,
        tuning,
        destination,
        args.seed,
        Duration::from_millis(args.walk_ms),
        args.protocol,
    )
}

fn plan_tick(
    scenario: &Scenario,
    tuning: MovementTuning,
    destination: Position,
    seed: u64,
    walk_duration: Duration,
    protocol: Option<ProtocolMode>,
) -> Result<Vec<String>> {
    let snapshot = scenario.snapshot()?;
    let mut planner = MovementPlanner::new(scenario.viewport, tuning, seed);
    let mut lines = Vec::new();

    match query::path_to(&snapshot, destination) {
        Some(path) => {
            lines.push(format!("route: {} points", path.len()));
            lines.push(format!(
                "furthest on-screen index: {}",
                planner.last_path_index_on_screen(&path)
            ));
        }
        None => lines.push("route: none".to_owned()),
    }
    if let Some(obstruction) = query::door_between(&snapshot, snapshot.player, destination) {
        let door = obstruction.door();
        lines.push(format!(
            "door {} at ({}, {}) obstructs the route",
            door.id.get(),
            door.position.x(),
            door.position.y()
        ));
    }

    let transcript = Transcript::default();
    let mut dispatcher = DryRunDispatcher::new(Rc::clone(&transcript));
    let mut sender =
        protocol.map(|mode| DryRunSender::new(Rc::clone(&transcript), mode == ProtocolMode::Reject));

    let outcome = planner.move_to(
        &snapshot,
        destination,
        walk_duration,
        &mut dispatcher,
        sender.as_mut().map(|sender| sender as &mut dyn ProtocolSender),
    );

    lines.push(format!("strategy: {:?}", outcome.strategy));
    if outcome.degraded {
        lines.push("protocol command failed; fell back to simulated input".to_owned());
    }
    lines.extend(transcript.borrow().iter().cloned());
    Ok(lines)
}

fn rooms(args: &RoomsArgs) -> Result<Vec<String>> {
    let scenario = Scenario::load(&args.scenario)?;
    tracing::debug!(rooms = scenario.rooms.len(), "ordering rooms");
    Ok(room_order(&scenario, &NearestNeighbor))
}

fn room_order(scenario: &Scenario, orderer: &dyn RegionOrderer) -> Vec<String> {
    let ordered = orderer.order(&scenario.rooms(), scenario.player);
    let mut previous = scenario.player;
    ordered
        .iter()
        .enumerate()
        .map(|(step, room)| {
            let center = room.center();
            let line = format!(
                "{}. room {} centered at ({}, {}), {} units away",
                step + 1,
                room.id().get(),
                center.x(),
                center.y(),
                previous.distance(center)
            );
            previous = center;
            line
        })
        .collect()
}

fn parse_position(value: &str) -> Result<Position, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid y coordinate `{y}`: {error}"))?;
    Ok(Position::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const CORRIDOR: &str = r#"
        viewport = { width = 1280, height = 720 }
        player = { x = 101, y = 101 }
        area = 8
        force_move = { primary = [69, 0], secondary = [0, 0] }

        [grid]
        origin = { x = 100, y = 100 }
        rows = [
            "..........",
            "..........",
            "..........",
        ]

        [[objects]]
        id = 9
        kind = "door"
        position = { x = 105, y = 100 }

        [[rooms]]
        id = 1
        origin = { x = 100, y = 100 }
        width = 3
        height = 3

        [[rooms]]
        id = 2
        origin = { x = 106, y = 100 }
        width = 3
        height = 3

        [[rooms]]
        id = 3
        origin = { x = 103, y = 100 }
        width = 3
        height = 3
    "#;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn destination_argument_parses_pairs() {
        assert_eq!(parse_position("12, -4"), Ok(Position::new(12, -4)));
        assert!(parse_position("12").is_err());
        assert!(parse_position("a,4").is_err());
    }

    #[test]
    fn walking_plan_reports_route_door_and_inputs() {
        let scenario = Scenario::from_toml_str(CORRIDOR).expect("scenario");
        let lines = plan_tick(
            &scenario,
            MovementTuning::default(),
            Position::new(109, 101),
            0,
            Duration::ZERO,
            None,
        )
        .expect("plan");

        assert_eq!(lines[0], "route: 9 points");
        assert!(lines.contains(&"door 9 at (105, 100) obstructs the route".to_owned()));
        assert!(lines.contains(&"strategy: Walk".to_owned()));
        assert_eq!(lines.last().map(String::as_str), Some("wait 50 ms"));
    }

    #[test]
    fn rejected_protocol_falls_back_to_right_click() {
        let mut scenario = Scenario::from_toml_str(CORRIDOR).expect("scenario");
        scenario.can_teleport = true;
        scenario.right_skill = waypoint_core::SkillId::TELEPORT;
        let mut tuning = MovementTuning::default();
        tuning.protocol.use_for_teleport = true;
        // The corridor is narrow, so allow protocol casts right up to the edge.
        tuning.boundary_threshold = 0;

        let lines = plan_tick(
            &scenario,
            tuning,
            Position::new(109, 101),
            0,
            Duration::ZERO,
            Some(ProtocolMode::Reject),
        )
        .expect("plan");

        assert!(lines.contains(&"strategy: TeleportInput".to_owned()));
        assert!(lines.contains(&"protocol teleport to (109, 101)".to_owned()));
        assert!(lines
            .last()
            .is_some_and(|line| line.starts_with("Right click at")));
    }

    #[test]
    fn rooms_are_listed_in_nearest_neighbor_order() {
        let scenario = Scenario::from_toml_str(CORRIDOR).expect("scenario");
        let lines = room_order(&scenario, &NearestNeighbor);
        assert_eq!(
            lines,
            vec![
                "1. room 1 centered at (101, 101), 0 units away",
                "2. room 3 centered at (104, 101), 3 units away",
                "3. room 2 centered at (107, 101), 3 units away",
            ]
        );
    }
}
