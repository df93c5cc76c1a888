use waypoint_core::{CollisionGrid, Position};

/// Reports whether a straight raster line from `origin` reaches `destination`
/// over walkable cells only.
///
/// The line is stepped with integer error accumulation. The origin itself is
/// not tested, so a query from a cell to itself is always clear.
#[must_use]
pub fn has_line_of_sight(grid: &CollisionGrid, origin: Position, destination: Position) -> bool {
    if origin == destination {
        return true;
    }

    let target = (i64::from(destination.x()), i64::from(destination.y()));
    let dx = (target.0 - i64::from(origin.x())).abs();
    let dy = (target.1 - i64::from(origin.y())).abs();
    let step_x = if origin.x() > destination.x() { -1 } else { 1 };
    let step_y = if origin.y() > destination.y() { -1 } else { 1 };

    let mut error = dx - dy;
    let (mut x, mut y) = (i64::from(origin.x()), i64::from(origin.y()));

    loop {
        let doubled = 2 * error;
        if doubled > -dy {
            error -= dy;
            x += step_x;
        }
        if doubled < dx {
            error += dx;
            y += step_y;
        }

        let (Ok(cell_x), Ok(cell_y)) = (i32::try_from(x), i32::try_from(y)) else {
            return false;
        };
        if !grid.is_walkable(Position::new(cell_x, cell_y)) {
            return false;
        }
        if (x, y) == target {
            return true;
        }
    }
}
