//! Rectangle geometry and bounded movement

use serde::Serialize;

/// Lower edge of the square arena on both axes
pub const GROUND_MIN: f64 = -2500.0;
/// Upper edge of the square arena on both axes
pub const GROUND_MAX: f64 = 2500.0;

/// Axis-aligned rectangle with a facing direction.
///
/// `x`/`y` is the top-left corner in world units, `angle` is in radians and
/// only affects the direction of [`Rect::attempt_move`], never the extents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            angle: 0.0,
        }
    }

    /// Edge-inclusive overlap test, touching rectangles overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && self.x + self.width >= other.x
            && self.y <= other.y + other.height
            && self.y + self.height >= other.y
    }

    /// Whether the whole rectangle lies inside the arena
    pub fn in_bounds(&self) -> bool {
        self.x >= GROUND_MIN
            && self.y >= GROUND_MIN
            && self.x + self.width <= GROUND_MAX
            && self.y + self.height <= GROUND_MAX
    }

    /// Translate `distance` units along `angle` (negative moves backward).
    ///
    /// The move is reverted and `false` returned if the candidate position
    /// leaves the arena or overlaps any obstacle.
    pub fn attempt_move<'a, I>(&mut self, distance: f64, obstacles: I) -> bool
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        let (previous_x, previous_y) = (self.x, self.y);

        self.x += distance * self.angle.cos();
        self.y += distance * self.angle.sin();

        let blocked = !self.in_bounds() || obstacles.into_iter().any(|o| self.overlaps(o));
        if blocked {
            self.x = previous_x;
            self.y = previous_y;
            return false;
        }

        true
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
