//! Pure target selection. Nothing here touches the input devices.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng};
use waypoint_core::{
    MouseButton, MovementCommand, MovementStrategy, Path, Position, ScreenPoint, Viewport,
    WorldSnapshot,
};

use crate::MovementTuning;

/// Furthest screen point a walk command may aim at along the path.
///
/// Points are projected relative to the path origin and accepted in travel
/// order until one exceeds the walk budget, falls below the HUD line or
/// leaves the viewport. Later points are not reconsidered. A budget of zero
/// cells disables the distance bound.
#[must_use]
pub fn walk_target(
    viewport: &Viewport,
    tuning: &MovementTuning,
    path: &Path,
    walk_duration: Duration,
) -> Option<ScreenPoint> {
    let origin = path.from()?;
    let budget = (tuning.walk_speed * walk_duration.as_secs_f32()) as usize;
    let hud_line = viewport.hud_line(tuning.hud_exclusion_divisor);

    let mut accepted = None;
    for (index, point) in path.points().iter().enumerate() {
        if budget > 0 && index > budget {
            break;
        }
        let screen = viewport.world_to_screen(origin, *point);
        if screen.y > hud_line || !viewport.contains(screen) {
            break;
        }
        accepted = Some(screen);
    }
    accepted
}

/// Furthest path point that is visible above the HUD, scanning backward
/// from the destination.
#[must_use]
pub fn teleport_target(
    viewport: &Viewport,
    tuning: &MovementTuning,
    path: &Path,
) -> Option<(Position, ScreenPoint)> {
    let origin = path.from()?;
    let index = furthest_visible_index(viewport, tuning, path)?;
    let point = path.points()[index];
    Some((point, viewport.world_to_screen(origin, point)))
}

/// Index of the furthest on-screen path point above the HUD line, or `0`
/// when no point qualifies.
#[must_use]
pub fn last_path_index_on_screen(viewport: &Viewport, tuning: &MovementTuning, path: &Path) -> usize {
    furthest_visible_index(viewport, tuning, path).unwrap_or(0)
}

fn furthest_visible_index(
    viewport: &Viewport,
    tuning: &MovementTuning,
    path: &Path,
) -> Option<usize> {
    let origin = path.from()?;
    let hud_line = viewport.hud_line(tuning.hud_exclusion_divisor);
    path.points().iter().rposition(|point| {
        let screen = viewport.world_to_screen(origin, *point);
        screen.y <= hud_line && viewport.contains(screen)
    })
}

/// Chooses how a teleport toward `target` is cast.
///
/// The protocol channel is used only when it is enabled and available, the
/// area is not a click-only area, and the landing point keeps more than
/// `boundary_threshold` units from every edge of the area.
#[must_use]
pub fn teleport_method(
    snapshot: &WorldSnapshot,
    tuning: &MovementTuning,
    target: Position,
    protocol_available: bool,
) -> MovementStrategy {
    if !tuning.protocol.use_for_teleport || !protocol_available {
        return MovementStrategy::TeleportInput;
    }
    if tuning.is_click_teleport_area(snapshot.area) {
        tracing::debug!(
            area = snapshot.area.get(),
            "click-only teleport area, casting with the mouse"
        );
        return MovementStrategy::TeleportInput;
    }
    if near_area_boundary(snapshot, target, tuning.boundary_threshold) {
        tracing::debug!(
            x = target.x(),
            y = target.y(),
            "teleport target near the area boundary, casting with the mouse"
        );
        return MovementStrategy::TeleportInput;
    }
    MovementStrategy::TeleportProtocol
}

fn near_area_boundary(snapshot: &WorldSnapshot, position: Position, threshold: i32) -> bool {
    snapshot
        .collision_grid
        .as_ref()
        .is_some_and(|grid| grid.distance_to_edge(position) <= i64::from(threshold))
}

/// Command moving the player toward the screen point without attacking.
///
/// Towns use a plain left click. Elsewhere the forced-move binding is
/// pressed with the cursor on the point, or a left click is issued when the
/// binding is itself a mouse button.
#[must_use]
pub fn walk_command(snapshot: &WorldSnapshot, point: ScreenPoint) -> MovementCommand {
    let binding = snapshot.key_bindings.force_move;
    if snapshot.is_town || binding.is_mouse_button() {
        MovementCommand::ScreenClick {
            button: MouseButton::Left,
            point,
        }
    } else {
        MovementCommand::KeyPress {
            binding,
            cursor: point,
        }
    }
}

/// Short step away from the player's position used to get unstuck.
///
/// The eight compass offsets are shuffled once and tried in three passes:
/// the base radius on walkable cells, double the radius on walkable cells,
/// then the base radius without the walkability check. Candidates must
/// project inside the recovery margin and above the HUD line. Returns `None`
/// without a collision grid or when every candidate is rejected.
pub fn directional_target<R: Rng + ?Sized>(
    viewport: &Viewport,
    tuning: &MovementTuning,
    snapshot: &WorldSnapshot,
    rng: &mut R,
) -> Option<ScreenPoint> {
    if snapshot.collision_grid.is_none() {
        return None;
    }

    let radius = tuning.fallback_radius;
    let mut directions = [
        (0, -radius),
        (radius, -radius),
        (radius, 0),
        (radius, radius),
        (0, radius),
        (-radius, radius),
        (-radius, 0),
        (-radius, -radius),
    ];
    directions.shuffle(rng);

    let hud_line = viewport.hud_line(tuning.hud_exclusion_divisor);
    let player = snapshot.player;
    for (scale, check_walkable) in [(1, true), (2, true), (1, false)] {
        for (dx, dy) in directions {
            let Some(target) = dx
                .checked_mul(scale)
                .zip(dy.checked_mul(scale))
                .and_then(|(dx, dy)| player.checked_offset(dx, dy))
            else {
                continue;
            };
            if check_walkable && !snapshot.is_walkable(target) {
                continue;
            }
            let screen = viewport.world_to_screen(player, target);
            if within_recovery_margin(viewport, tuning.fallback_margin, hud_line, screen) {
                return Some(screen);
            }
        }
    }

    tracing::debug!(
        x = player.x(),
        y = player.y(),
        "no directional recovery candidate"
    );
    None
}

fn within_recovery_margin(
    viewport: &Viewport,
    margin: i32,
    hud_line: i32,
    screen: ScreenPoint,
) -> bool {
    screen.x > margin
        && screen.x < viewport.width - margin
        && screen.y > margin
        && screen.y < hud_line
}

/// Random point within the inner half of the viewport.
pub fn random_target<R: Rng + ?Sized>(viewport: &Viewport, rng: &mut R) -> ScreenPoint {
    let center = viewport.center();
    ScreenPoint::new(
        center.x + jitter(center.x, rng),
        center.y + jitter(center.y, rng),
    )
}

fn jitter<R: Rng + ?Sized>(half_extent: i32, rng: &mut R) -> i32 {
    if half_extent <= 0 {
        return 0;
    }
    rng.gen_range(0..half_extent) - half_extent / 2
}
