#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only spatial queries over a captured [`WorldSnapshot`].
//!
//! Nothing in this crate mutates the snapshot. Route search and raycasts are
//! exposed as pure functions over a [`CollisionGrid`] so they can be exercised
//! against synthetic grids, and [`query`] wraps them with the snapshot-level
//! lookups the movement planner and the calling orchestration rely on.
//!
//! [`WorldSnapshot`]: waypoint_core::WorldSnapshot
//! [`CollisionGrid`]: waypoint_core::CollisionGrid

mod navigation;
mod sight;

pub use navigation::find_path;
pub use sight::has_line_of_sight;

/// Radius around the origin searched for a door when no route exists.
pub const DOOR_VICINITY: f32 = 5.0;
/// Radius around a door within which a route is considered to cross it.
pub const DOOR_PATH_TOLERANCE: i32 = 4;
/// Radius searched for breakable clutter next to the player.
pub const DESTRUCTIBLE_VICINITY: f32 = 2.0;
/// Radius searched for chests.
pub const CHEST_VICINITY: f32 = 20.0;

/// Query functions that expose read-only views of a snapshot.
pub mod query {
    use glam::Vec2;
    use waypoint_core::{InteractiveObject, ObjectKind, Path, Position, Room, WorldSnapshot};

    use super::{
        find_path, has_line_of_sight, CHEST_VICINITY, DESTRUCTIBLE_VICINITY, DOOR_PATH_TOLERANCE,
        DOOR_VICINITY,
    };

    /// Door that explains why a destination is hard to reach.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum DoorObstruction<'a> {
        /// A route exists but passes through this door.
        OnPath(&'a InteractiveObject),
        /// No route exists and this door next to the origin is the likely cause.
        Unreachable(&'a InteractiveObject),
    }

    impl<'a> DoorObstruction<'a> {
        /// The door responsible for the obstruction.
        #[must_use]
        pub fn door(&self) -> &'a InteractiveObject {
            match *self {
                Self::OnPath(door) | Self::Unreachable(door) => door,
            }
        }
    }

    /// Computes a route from the player to the destination.
    #[must_use]
    pub fn path_to(snapshot: &WorldSnapshot, destination: Position) -> Option<Path> {
        path_between(snapshot, snapshot.player, destination)
    }

    /// Computes a route between two arbitrary positions of the snapshot.
    #[must_use]
    pub fn path_between(
        snapshot: &WorldSnapshot,
        origin: Position,
        destination: Position,
    ) -> Option<Path> {
        let grid = snapshot.collision_grid.as_ref()?;
        find_path(grid, origin, destination)
    }

    /// Line-of-sight check against the snapshot's grid. Without a grid only
    /// same-point queries succeed.
    #[must_use]
    pub fn line_of_sight(snapshot: &WorldSnapshot, origin: Position, destination: Position) -> bool {
        match snapshot.collision_grid.as_ref() {
            Some(grid) => has_line_of_sight(grid, origin, destination),
            None => origin == destination,
        }
    }

    /// Whole-unit distance between the player and the position.
    #[must_use]
    pub fn distance_from_player(snapshot: &WorldSnapshot, position: Position) -> i32 {
        snapshot.player.distance(position)
    }

    /// Room containing the player, if any.
    #[must_use]
    pub fn current_room(snapshot: &WorldSnapshot) -> Option<&Room> {
        snapshot
            .rooms
            .iter()
            .find(|room| room.contains(snapshot.player))
    }

    /// Closest selectable door strictly within [`DOOR_VICINITY`] of the position.
    #[must_use]
    pub fn closest_door(snapshot: &WorldSnapshot, position: Position) -> Option<&InteractiveObject> {
        closest_matching(snapshot, position, DOOR_VICINITY, |object| {
            object.kind == ObjectKind::Door
        })
    }

    /// Closest selectable breakable object strictly within
    /// [`DESTRUCTIBLE_VICINITY`] of the position.
    #[must_use]
    pub fn closest_destructible(
        snapshot: &WorldSnapshot,
        position: Position,
    ) -> Option<&InteractiveObject> {
        closest_matching(snapshot, position, DESTRUCTIBLE_VICINITY, |object| {
            object.kind == ObjectKind::Destructible
        })
    }

    /// Closest selectable chest strictly within [`CHEST_VICINITY`] of the
    /// position, optionally restricted to chests in line of sight.
    #[must_use]
    pub fn closest_chest(
        snapshot: &WorldSnapshot,
        position: Position,
        require_sight: bool,
    ) -> Option<&InteractiveObject> {
        closest_matching(snapshot, position, CHEST_VICINITY, |object| {
            object.kind == ObjectKind::Chest
                && (!require_sight || line_of_sight(snapshot, position, object.position))
        })
    }

    /// Looks for a door standing between two positions.
    ///
    /// When a route exists, the first selectable door within
    /// [`DOOR_PATH_TOLERANCE`] of any route point is reported as
    /// [`DoorObstruction::OnPath`]. When no route exists, the closest door
    /// next to the origin is reported as [`DoorObstruction::Unreachable`].
    #[must_use]
    pub fn door_between(
        snapshot: &WorldSnapshot,
        origin: Position,
        destination: Position,
    ) -> Option<DoorObstruction<'_>> {
        let Some(path) = path_between(snapshot, origin, destination) else {
            return closest_door(snapshot, origin).map(DoorObstruction::Unreachable);
        };

        snapshot
            .objects
            .iter()
            .filter(|object| object.is_selectable_door())
            .find(|door| path.intersects(door.position, DOOR_PATH_TOLERANCE))
            .map(DoorObstruction::OnPath)
    }

    /// Position `distance` units past `target` along the line from `start`.
    /// Identical points extend along the positive x axis.
    #[must_use]
    pub fn beyond_position(start: Position, target: Position, distance: i32) -> Position {
        let direction = Vec2::new(
            (target.x() - start.x()) as f32,
            (target.y() - start.y()) as f32,
        )
        .try_normalize()
        .unwrap_or(Vec2::X);
        let reach = direction * distance as f32;
        target.offset(reach.x as i32, reach.y as i32)
    }

    fn closest_matching<F>(
        snapshot: &WorldSnapshot,
        position: Position,
        radius: f32,
        mut accept: F,
    ) -> Option<&InteractiveObject>
    where
        F: FnMut(&InteractiveObject) -> bool,
    {
        let mut best: Option<(&InteractiveObject, f32)> = None;
        for object in snapshot.objects.iter().filter(|object| object.selectable) {
            let distance = position.distance_f32(object.position);
            if distance >= radius {
                continue;
            }
            if best.is_some_and(|(_, closest)| distance >= closest) {
                continue;
            }
            if accept(object) {
                best = Some((object, distance));
            }
        }
        best.map(|(object, _)| object)
    }
}
