//! Isometric projection from world deltas into screen pixels.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::Position;

/// Horizontal pixels per unit of `dx - dy`.
pub const ISOMETRIC_SCALE_X: f32 = 19.8;
/// Vertical pixels per unit of `dx + dy`.
pub const ISOMETRIC_SCALE_Y: f32 = 9.9;

/// Pixel coordinate within the game viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenPoint {
    /// Horizontal pixel, growing to the right.
    pub x: i32,
    /// Vertical pixel, growing downward.
    pub y: i32,
}

impl ScreenPoint {
    /// Creates a new screen point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<IVec2> for ScreenPoint {
    fn from(value: IVec2) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Size of the game's render area in pixels. The player is always drawn at
/// its center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the render area.
    pub width: i32,
    /// Height of the render area.
    pub height: i32,
}

impl Viewport {
    /// Creates a viewport of the provided pixel size.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Pixel the player is drawn at.
    #[must_use]
    pub const fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2, self.height / 2)
    }

    /// Projects `target` onto the screen relative to a player standing at
    /// `player`. Zero displacement yields exactly [`Viewport::center`].
    #[must_use]
    pub fn world_to_screen(&self, player: Position, target: Position) -> ScreenPoint {
        let dx = target.x() - player.x();
        let dy = target.y() - player.y();
        let isometric = Vec2::new((dx - dy) as f32, (dx + dy) as f32)
            * Vec2::new(ISOMETRIC_SCALE_X, ISOMETRIC_SCALE_Y);
        let center = self.center();
        let projected = isometric + IVec2::new(center.x, center.y).as_vec2();
        ScreenPoint::from(projected.as_ivec2())
    }

    /// Screen row below which the fixed HUD occludes the game.
    #[must_use]
    pub fn hud_line(&self, divisor: f32) -> i32 {
        (self.height as f32 / divisor) as i32
    }

    /// Reports whether the point lies inside the viewport, edges included.
    #[must_use]
    pub const fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= 0 && point.y >= 0 && point.x <= self.width && point.y <= self.height
    }
}
