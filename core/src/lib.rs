#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint navigation engine.
//!
//! This crate defines the data surface that connects the external snapshot
//! provider, the pure query and planning systems, and the device adapters.
//! A [`WorldSnapshot`] is captured once per control tick outside of this
//! workspace, systems read it without mutating it, and the movement planner
//! answers with exactly one [`MovementCommand`] that adapters dispatch through
//! the [`InputDispatcher`] or the optional [`ProtocolSender`].

mod grid;
mod interfaces;
mod path;
mod projection;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use grid::{CollisionGrid, GridError};
pub use interfaces::{InputDispatcher, ProtocolError, ProtocolSender};
pub use path::Path;
pub use projection::{ScreenPoint, Viewport, ISOMETRIC_SCALE_X, ISOMETRIC_SCALE_Y};

/// Absolute in-game location expressed in whole world units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal world coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical world coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns the displaced position, or `None` when a coordinate overflows.
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// Euclidean distance to `other` in fractional world units.
    #[must_use]
    pub fn distance_f32(self, other: Position) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean distance to `other` truncated to whole world units.
    #[must_use]
    pub fn distance(self, other: Position) -> i32 {
        self.distance_f32(other) as i32
    }
}

/// Identifier of a game area (level).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AreaId(u32);

impl AreaId {
    /// Second level of the Claw Viper Temple.
    pub const CLAW_VIPER_TEMPLE_LEVEL_2: AreaId = AreaId(61);
    /// First level of the Maggot Lair.
    pub const MAGGOT_LAIR_LEVEL_1: AreaId = AreaId(62);
    /// Second level of the Maggot Lair.
    pub const MAGGOT_LAIR_LEVEL_2: AreaId = AreaId(63);
    /// Third level of the Maggot Lair.
    pub const MAGGOT_LAIR_LEVEL_3: AreaId = AreaId(64);
    /// The Arcane Sanctuary.
    pub const ARCANE_SANCTUARY: AreaId = AreaId(74);
    /// The Flayer Jungle.
    pub const FLAYER_JUNGLE: AreaId = AreaId(78);
    /// Lower Kurast.
    pub const LOWER_KURAST: AreaId = AreaId(79);
    /// The River of Flame.
    pub const RIVER_OF_FLAME: AreaId = AreaId(107);
    /// The Chaos Sanctuary.
    pub const CHAOS_SANCTUARY: AreaId = AreaId(108);

    /// Creates an area identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the area is made of narrow corridors where long casts
    /// frequently land on unwalkable ground.
    #[must_use]
    pub fn is_narrow_map(self) -> bool {
        matches!(
            self,
            Self::MAGGOT_LAIR_LEVEL_1
                | Self::MAGGOT_LAIR_LEVEL_2
                | Self::MAGGOT_LAIR_LEVEL_3
                | Self::ARCANE_SANCTUARY
                | Self::CLAW_VIPER_TEMPLE_LEVEL_2
                | Self::RIVER_OF_FLAME
                | Self::CHAOS_SANCTUARY
        )
    }
}

/// Identifier of a castable skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(u16);

impl SkillId {
    /// The teleport skill.
    pub const TELEPORT: SkillId = SkillId(54);

    /// Creates a skill identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Identifier of a room within the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a room identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned region of a level used to order exploration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Room {
    id: RoomId,
    origin: Position,
    width: u32,
    height: u32,
}

impl Room {
    /// Creates a room spanning `width` by `height` world units from `origin`.
    #[must_use]
    pub const fn new(id: RoomId, origin: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            origin,
            width,
            height,
        }
    }

    /// Identifier of the room.
    #[must_use]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Upper-left corner of the room.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Centroid of the room, rounded toward the origin.
    #[must_use]
    pub const fn center(&self) -> Position {
        self.origin
            .offset((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Reports whether the position lies inside the room. The lower edges are
    /// inclusive, the upper edges exclusive.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        let dx = i64::from(position.x()) - i64::from(self.origin.x());
        let dy = i64::from(position.y()) - i64::from(self.origin.y());
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }
}

/// Tags describing what an interactive object is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Door that may block a corridor until opened.
    Door,
    /// Container that can be opened for loot.
    Chest,
    /// Breakable clutter such as barrels, urns and crates.
    Destructible,
    /// Anything else the snapshot provider reports.
    Other,
}

/// Identifier of an interactive object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates an object identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable description of an interactive object near the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractiveObject {
    /// Identifier assigned by the snapshot provider.
    pub id: ObjectId,
    /// Kind of object.
    pub kind: ObjectKind,
    /// World position of the object.
    pub position: Position,
    /// Whether the object can currently be interacted with.
    pub selectable: bool,
}

impl InteractiveObject {
    /// Returns `true` for doors that can still be opened.
    #[must_use]
    pub fn is_selectable_door(&self) -> bool {
        self.selectable && self.kind == ObjectKind::Door
    }
}

/// Virtual key codes that address mouse buttons rather than keyboard keys.
const MOUSE_BUTTON_KEYS: [u8; 5] = [1, 2, 4, 5, 6];

/// Key binding composed of a primary and a secondary `[key, modifier]` slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Primary `[key, modifier]` pair.
    pub primary: [u8; 2],
    /// Secondary `[key, modifier]` pair used when the primary slot is unbound.
    pub secondary: [u8; 2],
}

impl KeyBinding {
    /// Creates a binding with only the primary slot populated.
    #[must_use]
    pub const fn key(key: u8) -> Self {
        Self {
            primary: [key, 0],
            secondary: [0, 0],
        }
    }

    /// The `[key, modifier]` pair the game honours. A primary key of `0` or
    /// `255` marks the slot as unbound.
    #[must_use]
    pub const fn effective(&self) -> [u8; 2] {
        if self.primary[0] == 0 || self.primary[0] == 255 {
            self.secondary
        } else {
            self.primary
        }
    }

    /// Reports whether the effective key addresses a mouse button.
    #[must_use]
    pub fn is_mouse_button(&self) -> bool {
        MOUSE_BUTTON_KEYS.contains(&self.effective()[0])
    }
}

/// Key bindings the planner relies on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Moves toward the cursor without attacking whatever stands there.
    pub force_move: KeyBinding,
}

/// Mouse buttons used by movement commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button: click-to-move in towns.
    Left,
    /// Secondary button: casts the bound right-hand skill.
    Right,
}

/// The single movement action produced by one planning call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementCommand {
    /// Click a mouse button at a screen coordinate.
    ScreenClick {
        /// Button to press.
        button: MouseButton,
        /// Screen coordinate of the click.
        point: ScreenPoint,
    },
    /// Move the cursor, then press a bound key.
    KeyPress {
        /// Binding to press.
        binding: KeyBinding,
        /// Cursor position at the time of the press.
        cursor: ScreenPoint,
    },
    /// Teleport through the protocol sender, bypassing simulated input.
    ProtocolTeleport {
        /// World position to land on.
        position: Position,
    },
}

/// Strategy the planner selected for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementStrategy {
    /// Walk toward the furthest reachable path point.
    Walk,
    /// Cast teleport with a simulated right click.
    TeleportInput,
    /// Cast teleport through the protocol sender.
    TeleportProtocol,
    /// Step a short distance in a compass direction to get unstuck.
    DirectionalFallback,
    /// Move to a random point near the middle of the screen.
    RandomFallback,
}

/// Read-only view of the game world captured for a single control tick.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    /// Current world position of the player.
    pub player: Position,
    /// Area the player is in.
    pub area: AreaId,
    /// Whether the area is a town, where monsters cannot be attacked by accident.
    pub is_town: bool,
    /// Walkability grid of the area, if the provider managed to read it.
    pub collision_grid: Option<CollisionGrid>,
    /// Interactive objects near the player.
    pub objects: Vec<InteractiveObject>,
    /// Rooms composing the current level.
    pub rooms: Vec<Room>,
    /// Active key bindings.
    pub key_bindings: KeyBindings,
    /// Whether the player can teleport right now.
    pub can_teleport: bool,
    /// Skill currently bound to the right mouse button.
    pub right_skill: SkillId,
    /// Estimated time for a cast to complete.
    pub cast_duration: Duration,
}

impl WorldSnapshot {
    /// Creates a snapshot with no objects, no rooms and walking-only movement.
    #[must_use]
    pub fn new(player: Position, area: AreaId, collision_grid: Option<CollisionGrid>) -> Self {
        Self {
            player,
            area,
            is_town: false,
            collision_grid,
            objects: Vec::new(),
            rooms: Vec::new(),
            key_bindings: KeyBindings::default(),
            can_teleport: false,
            right_skill: SkillId::new(0),
            cast_duration: Duration::ZERO,
        }
    }

    /// Reports whether the position is walkable; `false` without a grid.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.collision_grid
            .as_ref()
            .is_some_and(|grid| grid.is_walkable(position))
    }
}
