use crate::Position;

/// Ordered walkable route from an origin to a destination, both inclusive.
///
/// Index zero is the origin. Paths are computed on demand from the current
/// snapshot and must not be reused across ticks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    points: Vec<Position>,
}

impl Path {
    /// Creates a path from the provided points.
    #[must_use]
    pub fn new(points: Vec<Position>) -> Self {
        Self { points }
    }

    /// First point of the path.
    #[must_use]
    pub fn from(&self) -> Option<Position> {
        self.points.first().copied()
    }

    /// Last point of the path.
    #[must_use]
    pub fn to(&self) -> Option<Position> {
        self.points.last().copied()
    }

    /// Number of points, including origin and destination.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the path holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in travel order.
    #[must_use]
    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Reports whether any point of the path lies within `radius` world units
    /// of `position`.
    #[must_use]
    pub fn intersects(&self, position: Position, radius: i32) -> bool {
        let radius = radius.max(0) as f32;
        self.points
            .iter()
            .any(|point| point.distance_f32(position) <= radius)
    }
}

impl From<Vec<Position>> for Path {
    fn from(points: Vec<Position>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_point_order() {
        let path = Path::new(vec![
            Position::new(0, 0),
            Position::new(1, 1),
            Position::new(2, 1),
        ]);
        assert_eq!(path.from(), Some(Position::new(0, 0)));
        assert_eq!(path.to(), Some(Position::new(2, 1)));
        assert_eq!(path.len(), 3);
        assert!(Path::default().from().is_none());
    }

    #[test]
    fn intersects_uses_radius() {
        let path = Path::new(vec![Position::new(0, 0), Position::new(1, 0)]);
        assert!(path.intersects(Position::new(4, 2), 4));
        assert!(!path.intersects(Position::new(6, 0), 4));
        assert!(path.intersects(Position::new(1, 0), 0));
    }
}
