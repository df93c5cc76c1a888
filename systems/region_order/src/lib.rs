#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Visitation ordering over the rooms of a level.
//!
//! Exploration code clears rooms one after another. The order only has to be
//! good enough that the agent does not zig-zag across the level, so the
//! default [`NearestNeighbor`] tour is a greedy approximation. Callers hold a
//! `&dyn RegionOrderer` so a stronger heuristic can be swapped in.

use waypoint_core::{Position, Room};

/// Strategy producing the order in which rooms are visited.
pub trait RegionOrderer {
    /// Returns every room exactly once, beginning with the room the player
    /// stands in.
    fn order(&self, rooms: &[Room], player: Position) -> Vec<Room>;
}

/// Greedy nearest-neighbor tour over room centroids.
///
/// Distances are whole world units between centroids. When several unvisited
/// rooms are equally near, the one listed first in the input wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NearestNeighbor;

impl RegionOrderer for NearestNeighbor {
    fn order(&self, rooms: &[Room], player: Position) -> Vec<Room> {
        let Some(start) = starting_room(rooms, player) else {
            return Vec::new();
        };

        let distances = DistanceMatrix::from_rooms(rooms);
        let mut visited = vec![false; rooms.len()];
        let mut ordered = Vec::with_capacity(rooms.len());
        let mut current = start;

        loop {
            visited[current] = true;
            ordered.push(rooms[current]);

            let mut next = None;
            let mut nearest = i32::MAX;
            for (candidate, seen) in visited.iter().enumerate() {
                if *seen {
                    continue;
                }
                let distance = distances.get(current, candidate);
                if next.is_none() || distance < nearest {
                    nearest = distance;
                    next = Some(candidate);
                }
            }

            match next {
                Some(candidate) => current = candidate,
                None => break,
            }
        }

        tracing::debug!(
            rooms = ordered.len(),
            start = ?rooms[start].id(),
            "ordered rooms for exploration"
        );
        ordered
    }
}

/// Index of the room the tour begins in: the first room containing the
/// player, otherwise the room whose centroid is nearest to the player.
/// Among overlapping rooms the earliest in input order wins, so callers
/// control the start by ordering their rooms.
fn starting_room(rooms: &[Room], player: Position) -> Option<usize> {
    if let Some(index) = rooms.iter().position(|room| room.contains(player)) {
        return Some(index);
    }

    let mut best: Option<(usize, i32)> = None;
    for (index, room) in rooms.iter().enumerate() {
        let distance = player.distance(room.center());
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Symmetric pairwise centroid distances, stored row-major.
#[derive(Debug)]
struct DistanceMatrix {
    size: usize,
    cells: Vec<i32>,
}

impl DistanceMatrix {
    fn from_rooms(rooms: &[Room]) -> Self {
        let size = rooms.len();
        let mut cells = vec![0; size * size];
        for (row, from) in rooms.iter().enumerate() {
            for (column, to) in rooms.iter().enumerate().skip(row + 1) {
                let distance = from.center().distance(to.center());
                cells[row * size + column] = distance;
                cells[column * size + row] = distance;
            }
        }
        Self { size, cells }
    }

    fn get(&self, from: usize, to: usize) -> i32 {
        self.cells[from * self.size + to]
    }
}
