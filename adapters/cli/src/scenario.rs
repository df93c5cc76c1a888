//! TOML description of a captured game tick used for dry runs.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use waypoint_core::{
    AreaId, CollisionGrid, InteractiveObject, KeyBinding, KeyBindings, ObjectId, ObjectKind,
    Position, Room, RoomId, SkillId, Viewport, WorldSnapshot,
};

/// Everything the snapshot provider would report for one tick.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Size of the game window.
    pub viewport: Viewport,
    /// World position of the player.
    pub player: Position,
    /// Area the player is in.
    pub area: AreaId,
    /// Whether the area is a town.
    #[serde(default)]
    pub town: bool,
    /// Whether the player can teleport.
    #[serde(default)]
    pub can_teleport: bool,
    /// Estimated cast duration in milliseconds.
    #[serde(default)]
    pub cast_duration_ms: u64,
    /// Skill bound to the right mouse button.
    #[serde(default = "unbound_skill")]
    pub right_skill: SkillId,
    /// Forced-move key binding.
    #[serde(default)]
    pub force_move: KeyBinding,
    /// Destination used when none is given on the command line.
    #[serde(default)]
    pub destination: Option<Position>,
    /// Collision grid of the area.
    #[serde(default)]
    pub grid: Option<GridSpec>,
    /// Interactive objects near the player.
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    /// Rooms of the level.
    #[serde(default)]
    pub rooms: Vec<RoomSpec>,
}

/// Grid rows of `.` walkable and `#` blocked cells anchored at `origin`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GridSpec {
    pub origin: Position,
    pub rows: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObjectSpec {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub position: Position,
    #[serde(default = "selectable_by_default")]
    pub selectable: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RoomSpec {
    pub id: RoomId,
    pub origin: Position,
    pub width: u32,
    pub height: u32,
}

fn unbound_skill() -> SkillId {
    SkillId::new(0)
}

fn selectable_by_default() -> bool {
    true
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid scenario in {}", path.display()))
    }

    /// Parses a scenario from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Rooms of the level.
    pub(crate) fn rooms(&self) -> Vec<Room> {
        self.rooms
            .iter()
            .map(|room| Room::new(room.id, room.origin, room.width, room.height))
            .collect()
    }

    /// Builds the read-only snapshot the planner consumes.
    pub(crate) fn snapshot(&self) -> Result<WorldSnapshot> {
        let grid = self
            .grid
            .as_ref()
            .map(|grid| CollisionGrid::from_rows(grid.origin, &grid.rows))
            .transpose()
            .context("scenario grid is malformed")?;

        let mut snapshot = WorldSnapshot::new(self.player, self.area, grid);
        snapshot.is_town = self.town;
        snapshot.can_teleport = self.can_teleport;
        snapshot.cast_duration = Duration::from_millis(self.cast_duration_ms);
        snapshot.right_skill = self.right_skill;
        snapshot.key_bindings = KeyBindings {
            force_move: self.force_move,
        };
        snapshot.rooms = self.rooms();
        snapshot.objects = self
            .objects
            .iter()
            .map(|object| InteractiveObject {
                id: object.id,
                kind: object.kind,
                position: object.position,
                selectable: object.selectable,
            })
            .collect();
        Ok(snapshot)
    }
}
