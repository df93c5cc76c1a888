#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement planner that turns a route into exactly one input command per tick.
//!
//! Planning is split from execution. The `plan_*` methods are pure functions
//! of the snapshot, the tuning and the planner's seeded random stream, and
//! return a [`PlannedMove`]. [`MovementPlanner::execute`] drives the input
//! dispatcher and the optional protocol sender, applies settle delays and
//! degrades failed protocol teleports to a right click on the same pixel.

pub mod plan;
mod tuning;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use waypoint_core::{
    InputDispatcher, MouseButton, MovementCommand, MovementStrategy, Path, Position,
    ProtocolSender, ScreenPoint, SkillId, Viewport, WorldSnapshot,
};
use waypoint_world::query;

pub use tuning::{MovementTuning, ProtocolCasting, TuningError, MAX_FALLBACK_RADIUS};

/// A single movement decision waiting to be dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedMove {
    /// Strategy that produced the command.
    pub strategy: MovementStrategy,
    /// Command to issue.
    pub command: MovementCommand,
    /// Screen coordinate of the target; protocol fallbacks click here.
    pub screen: ScreenPoint,
    /// Skill to bind through the protocol sender before casting.
    pub skill_selection: Option<SkillId>,
    /// Pause applied after the command was issued successfully.
    pub settle: Duration,
}

/// What was actually sent to the game for a planned move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Strategy of the issued command.
    pub strategy: MovementStrategy,
    /// Command that reached the dispatcher or the protocol sender.
    pub command: MovementCommand,
    /// Whether a protocol teleport failed and was replaced by a right click.
    pub degraded: bool,
}

impl MoveOutcome {
    fn issued(planned: &PlannedMove) -> Self {
        Self {
            strategy: planned.strategy,
            command: planned.command,
            degraded: false,
        }
    }
}

/// Chooses and dispatches movement for one agent.
#[derive(Debug)]
pub struct MovementPlanner {
    viewport: Viewport,
    tuning: MovementTuning,
    rng: ChaCha8Rng,
}

impl MovementPlanner {
    /// Creates a planner for a game window of the given size. The seed drives
    /// direction shuffling and random recovery clicks.
    #[must_use]
    pub fn new(viewport: Viewport, tuning: MovementTuning, seed: u64) -> Self {
        Self {
            viewport,
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Viewport the planner projects into.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Active tuning.
    #[must_use]
    pub fn tuning(&self) -> &MovementTuning {
        &self.tuning
    }

    /// Strategy used to travel toward `target`: walking unless the player can
    /// teleport, then the protocol or the mouse depending on configuration,
    /// area and boundary distance.
    #[must_use]
    pub fn select_strategy(
        &self,
        snapshot: &WorldSnapshot,
        target: Position,
        protocol_available: bool,
    ) -> MovementStrategy {
        if snapshot.can_teleport {
            plan::teleport_method(snapshot, &self.tuning, target, protocol_available)
        } else {
            MovementStrategy::Walk
        }
    }

    /// Index of the furthest path point a teleport could reach this tick.
    #[must_use]
    pub fn last_path_index_on_screen(&self, path: &Path) -> usize {
        plan::last_path_index_on_screen(&self.viewport, &self.tuning, path)
    }

    /// Plans one step along the path. Returns `None` for an empty path or
    /// when no point of it is visible.
    #[must_use]
    pub fn plan_path(
        &self,
        snapshot: &WorldSnapshot,
        path: &Path,
        walk_duration: Duration,
        protocol_available: bool,
    ) -> Option<PlannedMove> {
        if !snapshot.can_teleport {
            let screen = plan::walk_target(&self.viewport, &self.tuning, path, walk_duration)?;
            return Some(self.walk_move(
                snapshot,
                MovementStrategy::Walk,
                screen,
                self.tuning.walk_settle(),
            ));
        }

        let (position, screen) = plan::teleport_target(&self.viewport, &self.tuning, path)?;
        let planned = match self.select_strategy(snapshot, position, protocol_available) {
            MovementStrategy::TeleportProtocol => {
                let rebind = self.tuning.protocol.use_for_skill_selection
                    && snapshot.right_skill != SkillId::TELEPORT;
                PlannedMove {
                    strategy: MovementStrategy::TeleportProtocol,
                    command: MovementCommand::ProtocolTeleport { position },
                    screen,
                    skill_selection: rebind.then_some(SkillId::TELEPORT),
                    settle: snapshot.cast_duration,
                }
            }
            _ => right_click(screen),
        };
        Some(planned)
    }

    /// Plans a short compass step to get unstuck. Returns `None` without a
    /// collision grid or when no candidate survives the screen checks.
    pub fn plan_directional(&mut self, snapshot: &WorldSnapshot) -> Option<PlannedMove> {
        let screen =
            plan::directional_target(&self.viewport, &self.tuning, snapshot, &mut self.rng)?;
        Some(self.walk_move(
            snapshot,
            MovementStrategy::DirectionalFallback,
            screen,
            self.tuning.directional_settle(),
        ))
    }

    /// Plans a recovery move: a directional step when one exists, otherwise a
    /// random point near the middle of the screen.
    pub fn plan_random(&mut self, snapshot: &WorldSnapshot) -> PlannedMove {
        if let Some(planned) = self.plan_directional(snapshot) {
            return planned;
        }
        let screen = plan::random_target(&self.viewport, &mut self.rng);
        self.walk_move(
            snapshot,
            MovementStrategy::RandomFallback,
            screen,
            self.tuning.random_settle(),
        )
    }

    /// Issues the planned command.
    ///
    /// Protocol teleports without a sender, or whose sender reports an error,
    /// are replaced by a right click at [`PlannedMove::screen`] and skip the
    /// cast settle delay.
    pub fn execute(
        &self,
        planned: &PlannedMove,
        dispatcher: &mut dyn InputDispatcher,
        sender: Option<&mut dyn ProtocolSender>,
    ) -> MoveOutcome {
        match planned.command {
            MovementCommand::ScreenClick { button, point } => {
                dispatcher.click(button, point);
            }
            MovementCommand::KeyPress { binding, cursor } => {
                dispatcher.move_pointer(cursor);
                dispatcher.press_key_binding(binding);
            }
            MovementCommand::ProtocolTeleport { position } => {
                let Some(sender) = sender else {
                    tracing::debug!("no protocol sender, casting teleport with the mouse");
                    return self.degrade(planned, dispatcher);
                };
                if let Some(skill) = planned.skill_selection {
                    match sender.select_skill(skill) {
                        Ok(()) => settle(dispatcher, self.tuning.skill_select_settle()),
                        Err(error) => {
                            tracing::warn!(%error, skill = skill.get(), "skill selection failed");
                        }
                    }
                }
                if let Err(error) = sender.teleport(position) {
                    tracing::warn!(
                        %error,
                        x = position.x(),
                        y = position.y(),
                        "protocol teleport failed, casting with the mouse"
                    );
                    return self.degrade(planned, dispatcher);
                }
            }
        }

        settle(dispatcher, planned.settle);
        MoveOutcome::issued(planned)
    }

    /// Plans and executes one step along a precomputed path.
    pub fn move_through_path(
        &mut self,
        snapshot: &WorldSnapshot,
        path: &Path,
        walk_duration: Duration,
        dispatcher: &mut dyn InputDispatcher,
        sender: Option<&mut dyn ProtocolSender>,
    ) -> Option<MoveOutcome> {
        let planned = self.plan_path(snapshot, path, walk_duration, sender.is_some())?;
        Some(self.execute(&planned, dispatcher, sender))
    }

    /// Searches a route to the destination and moves along it, recovering
    /// with a directional or random step when no route or visible point
    /// exists.
    pub fn move_to(
        &mut self,
        snapshot: &WorldSnapshot,
        destination: Position,
        walk_duration: Duration,
        dispatcher: &mut dyn InputDispatcher,
        sender: Option<&mut dyn ProtocolSender>,
    ) -> MoveOutcome {
        if let Some(path) = query::path_to(snapshot, destination) {
            if let Some(outcome) =
                self.move_through_path(snapshot, &path, walk_duration, dispatcher, sender)
            {
                return outcome;
            }
        } else {
            tracing::debug!(
                x = destination.x(),
                y = destination.y(),
                "no route to destination, attempting recovery"
            );
        }
        self.random_movement(snapshot, dispatcher)
    }

    /// Executes a directional recovery step. Returns `None` when nothing was
    /// dispatched.
    pub fn directional_movement(
        &mut self,
        snapshot: &WorldSnapshot,
        dispatcher: &mut dyn InputDispatcher,
    ) -> Option<MoveOutcome> {
        let planned = self.plan_directional(snapshot)?;
        Some(self.execute(&planned, dispatcher, None))
    }

    /// Executes a directional recovery step, or a random one when no
    /// direction qualifies.
    pub fn random_movement(
        &mut self,
        snapshot: &WorldSnapshot,
        dispatcher: &mut dyn InputDispatcher,
    ) -> MoveOutcome {
        let planned = self.plan_random(snapshot);
        self.execute(&planned, dispatcher, None)
    }

    fn walk_move(
        &self,
        snapshot: &WorldSnapshot,
        strategy: MovementStrategy,
        screen: ScreenPoint,
        delay: Duration,
    ) -> PlannedMove {
        PlannedMove {
            strategy,
            command: plan::walk_command(snapshot, screen),
            screen,
            skill_selection: None,
            settle: delay,
        }
    }

    fn degrade(&self, planned: &PlannedMove, dispatcher: &mut dyn InputDispatcher) -> MoveOutcome {
        let fallback = right_click(planned.screen);
        dispatcher.click(MouseButton::Right, planned.screen);
        MoveOutcome {
            strategy: fallback.strategy,
            command: fallback.command,
            degraded: true,
        }
    }
}

fn right_click(screen: ScreenPoint) -> PlannedMove {
    PlannedMove {
        strategy: MovementStrategy::TeleportInput,
        command: MovementCommand::ScreenClick {
            button: MouseButton::Right,
            point: screen,
        },
        screen,
        skill_selection: None,
        settle: Duration::ZERO,
    }
}

fn settle(dispatcher: &mut dyn InputDispatcher, delay: Duration) {
    if !delay.is_zero() {
        dispatcher.settle(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::{AreaId, CollisionGrid, KeyBinding, ProtocolError};

    #[derive(Debug, PartialEq, Eq)]
    enum Input {
        Move(ScreenPoint),
        Click(MouseButton, ScreenPoint),
        Press(KeyBinding),
        Settle(Duration),
    }

    #[derive(Default)]
    struct Recorder {
        inputs: Vec<Input>,
    }

    impl InputDispatcher for Recorder {
        fn move_pointer(&mut self, point: ScreenPoint) {
            self.inputs.push(Input::Move(point));
        }

        fn click(&mut self, button: MouseButton, point: ScreenPoint) {
            self.inputs.push(Input::Click(button, point));
        }

        fn press_key_binding(&mut self, binding: KeyBinding) {
            self.inputs.push(Input::Press(binding));
        }

        fn settle(&mut self, delay: Duration) {
            self.inputs.push(Input::Settle(delay));
        }
    }

    #[derive(Default)]
    struct Sender {
        fail_teleport: bool,
        teleports: Vec<Position>,
        skills: Vec<SkillId>,
    }

    impl ProtocolSender for Sender {
        fn teleport(&mut self, position: Position) -> Result<(), ProtocolError> {
            self.teleports.push(position);
            if self.fail_teleport {
                Err(ProtocolError::Disconnected)
            } else {
                Ok(())
            }
        }

        fn select_skill(&mut self, skill: SkillId) -> Result<(), ProtocolError> {
            self.skills.push(skill);
            Ok(())
        }
    }

    fn protocol_tuning() -> MovementTuning {
        let mut tuning = MovementTuning::default();
        tuning.protocol.use_for_teleport = true;
        tuning
    }

    fn teleport_snapshot() -> WorldSnapshot {
        let grid = CollisionGrid::open(Position::new(0, 0), 400, 400);
        let mut snapshot = WorldSnapshot::new(Position::new(200, 200), AreaId::new(1), Some(grid));
        snapshot.can_teleport = true;
        snapshot.right_skill = SkillId::TELEPORT;
        snapshot.cast_duration = Duration::from_millis(400);
        snapshot
    }

    fn short_path(from: Position) -> Path {
        Path::new((0..4).map(|step| from.offset(step, 0)).collect())
    }

    #[test]
    fn protocol_teleport_settles_for_cast_duration() {
        let planner = MovementPlanner::new(Viewport::new(1280, 720), protocol_tuning(), 0);
        let snapshot = teleport_snapshot();
        let path = short_path(snapshot.player);
        let mut recorder = Recorder::default();
        let mut sender = Sender::default();

        let planned = planner
            .plan_path(&snapshot, &path, Duration::ZERO, true)
            .expect("planned");
        let outcome = planner.execute(&planned, &mut recorder, Some(&mut sender));

        assert_eq!(outcome.strategy, MovementStrategy::TeleportProtocol);
        assert!(!outcome.degraded);
        assert_eq!(sender.teleports, vec![Position::new(203, 200)]);
        assert!(sender.skills.is_empty());
        assert_eq!(
            recorder.inputs,
            vec![Input::Settle(Duration::from_millis(400))]
        );
    }

    #[test]
    fn failed_protocol_teleport_right_clicks_same_point() {
        let planner = MovementPlanner::new(Viewport::new(1280, 720), protocol_tuning(), 0);
        let snapshot = teleport_snapshot();
        let path = short_path(snapshot.player);
        let mut recorder = Recorder::default();
        let mut sender = Sender {
            fail_teleport: true,
            ..Sender::default()
        };

        let planned = planner
            .plan_path(&snapshot, &path, Duration::ZERO, true)
            .expect("planned");
        let outcome = planner.execute(&planned, &mut recorder, Some(&mut sender));

        assert!(outcome.degraded);
        assert_eq!(outcome.strategy, MovementStrategy::TeleportInput);
        assert_eq!(
            recorder.inputs,
            vec![Input::Click(MouseButton::Right, planned.screen)]
        );
        assert_eq!(sender.teleports.len(), 1);
    }

    #[test]
    fn skill_is_bound_before_protocol_cast() {
        let mut tuning = protocol_tuning();
        tuning.protocol.use_for_skill_selection = true;
        let mut planner = MovementPlanner::new(Viewport::new(1280, 720), tuning, 0);
        let mut snapshot = teleport_snapshot();
        snapshot.right_skill = SkillId::new(36);
        let path = short_path(snapshot.player);
        let mut recorder = Recorder::default();
        let mut sender = Sender::default();

        let outcome = planner
            .move_through_path(&snapshot, &path, Duration::ZERO, &mut recorder, Some(&mut sender))
            .expect("moved");

        assert_eq!(outcome.strategy, MovementStrategy::TeleportProtocol);
        assert_eq!(sender.skills, vec![SkillId::TELEPORT]);
        assert_eq!(
            recorder.inputs,
            vec![
                Input::Settle(Duration::from_millis(50)),
                Input::Settle(Duration::from_millis(400)),
            ]
        );
    }

    #[test]
    fn missing_sender_casts_with_the_mouse() {
        let mut planner = MovementPlanner::new(Viewport::new(1280, 720), protocol_tuning(), 0);
        let snapshot = teleport_snapshot();
        let path = short_path(snapshot.player);
        let mut recorder = Recorder::default();

        let outcome = planner
            .move_through_path(&snapshot, &path, Duration::ZERO, &mut recorder, None)
            .expect("moved");

        assert_eq!(outcome.strategy, MovementStrategy::TeleportInput);
        assert!(!outcome.degraded);
        assert!(matches!(
            recorder.inputs.as_slice(),
            [Input::Click(MouseButton::Right, _)]
        ));
    }

    #[test]
    fn field_walk_presses_force_move_then_settles() {
        let mut planner = MovementPlanner::new(Viewport::new(1280, 720), MovementTuning::default(), 0);
        let mut snapshot = WorldSnapshot::new(
            Position::new(10, 10),
            AreaId::new(2),
            Some(CollisionGrid::open(Position::new(0, 0), 40, 40)),
        );
        snapshot.key_bindings.force_move = KeyBinding::key(b'E');
        let mut recorder = Recorder::default();

        let outcome = planner.move_to(
            &snapshot,
            Position::new(14, 10),
            Duration::ZERO,
            &mut recorder,
            None,
        );

        let target = Viewport::new(1280, 720).world_to_screen(snapshot.player, Position::new(14, 10));
        assert_eq!(outcome.strategy, MovementStrategy::Walk);
        assert_eq!(
            recorder.inputs,
            vec![
                Input::Move(target),
                Input::Press(KeyBinding::key(b'E')),
                Input::Settle(Duration::from_millis(50)),
            ]
        );
    }

    #[test]
    fn unreachable_destination_falls_back_to_recovery() {
        let mut planner =
            MovementPlanner::new(Viewport::new(1280, 720), MovementTuning::default(), 11);
        let grid = CollisionGrid::from_rows(
            Position::new(0, 0),
            &[
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
                "...........#....",
            ],
        )
        .expect("grid");
        let mut snapshot = WorldSnapshot::new(Position::new(5, 5), AreaId::new(2), Some(grid));
        snapshot.is_town = true;
        let mut recorder = Recorder::default();

        let outcome = planner.move_to(
            &snapshot,
            Position::new(14, 5),
            Duration::ZERO,
            &mut recorder,
            None,
        );

        assert_eq!(outcome.strategy, MovementStrategy::DirectionalFallback);
        assert!(matches!(
            recorder.inputs.as_slice(),
            [
                Input::Click(MouseButton::Left, _),
                Input::Settle(delay)
            ] if *delay == Duration::from_millis(150)
        ));
    }

    #[test]
    fn directional_without_grid_dispatches_nothing() {
        let mut planner =
            MovementPlanner::new(Viewport::new(1280, 720), MovementTuning::default(), 5);
        let snapshot = WorldSnapshot::new(Position::new(0, 0), AreaId::new(2), None);
        let mut recorder = Recorder::default();

        assert!(planner.directional_movement(&snapshot, &mut recorder).is_none());
        assert!(recorder.inputs.is_empty());

        let outcome = planner.random_movement(&snapshot, &mut recorder);
        assert_eq!(outcome.strategy, MovementStrategy::RandomFallback);
        assert_eq!(
            recorder.inputs.last(),
            Some(&Input::Settle(Duration::from_millis(100)))
        );
    }

    #[test]
    fn select_strategy_walks_without_teleport() {
        let planner = MovementPlanner::new(Viewport::new(1280, 720), protocol_tuning(), 0);
        let mut snapshot = teleport_snapshot();
        assert_eq!(
            planner.select_strategy(&snapshot, snapshot.player, true),
            MovementStrategy::TeleportProtocol
        );
        snapshot.can_teleport = false;
        assert_eq!(
            planner.select_strategy(&snapshot, snapshot.player, true),
            MovementStrategy::Walk
        );
    }
}
