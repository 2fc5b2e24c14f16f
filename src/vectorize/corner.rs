//! Lattice-corner cursor for walking pixel boundaries.
//!
//! A `Corner` names the lattice intersection shared by four pixels.
//! Coordinates are y-up: `top_left` is the pixel above-left of the
//! intersection, `bottom_left` is one row lower (y − 1).
//!
//! ```text
//!   top_left    │ top_right
//!   ────────────┼────────────
//!   bottom_left │ bottom_right
//! ```

use kurbo::Point;

use crate::error::{Result, TraceError};
use crate::geom::GridPoint;

/// Cardinal direction of travel on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
    None,
}

impl Direction {
    /// Quarter turn counter-clockwise: Up → Left → Down → Right → Up.
    pub const fn rotate_ccw(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
            Direction::None => Direction::None,
        }
    }

    /// Quarter turn clockwise: Up → Right → Down → Left → Up.
    pub const fn rotate_cw(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::None => Direction::None,
        }
    }
}

/// The four pixels around one lattice intersection.
///
/// Equality and hashing compare the pixels only; `center` is derived.
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    pub top_left: GridPoint,
    pub top_right: GridPoint,
    pub bottom_left: GridPoint,
    pub bottom_right: GridPoint,
    center: Point,
}

impl Corner {
    /// The intersection at the lower-right corner of pixel `top_left`.
    pub fn new(top_left: GridPoint) -> Self {
        let bottom_left = top_left.down();
        Corner {
            top_left,
            top_right: top_left.right(),
            bottom_left,
            bottom_right: bottom_left.right(),
            center: Point::new(top_left.x as f64 + 0.5, top_left.y as f64 - 0.5),
        }
    }

    /// Position of the intersection in pixel-center coordinates.
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn left(&self) -> Corner {
        Corner::new(self.top_left.left())
    }

    pub fn right(&self) -> Corner {
        Corner::new(self.top_right)
    }

    pub fn up(&self) -> Corner {
        Corner::new(self.top_left.up())
    }

    pub fn down(&self) -> Corner {
        Corner::new(self.bottom_left)
    }

    /// One lattice step in `dir`. `Direction::None` stays put.
    pub fn shift(&self, dir: Direction) -> Corner {
        match dir {
            Direction::Up => self.up(),
            Direction::Left => self.left(),
            Direction::Down => self.down(),
            Direction::Right => self.right(),
            Direction::None => *self,
        }
    }

    /// Direction of travel that brought the cursor from `origin` to here.
    ///
    /// Vertical movement wins over horizontal. Fails with `StalledCursor`
    /// when both corners coincide.
    pub fn dir_from(&self, origin: &Corner) -> Result<Direction> {
        let (a, b) = (self.top_left, origin.top_left);
        let dir = if a.y > b.y {
            Direction::Up
        } else if a.y < b.y {
            Direction::Down
        } else if a.x > b.x {
            Direction::Right
        } else if a.x < b.x {
            Direction::Left
        } else {
            return Err(TraceError::StalledCursor { x: a.x, y: a.y });
        };
        Ok(dir)
    }

    /// Midpoint between both intersections.
    pub fn midpoint(&self, other: &Corner) -> Point {
        self.center.midpoint(other.center)
    }
}

impl PartialEq for Corner {
    fn eq(&self, other: &Self) -> bool {
        self.top_left == other.top_left
            && self.top_right == other.top_right
            && self.bottom_left == other.bottom_left
            && self.bottom_right == other.bottom_right
    }
}

impl Eq for Corner {}

impl std::hash::Hash for Corner {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.top_left.hash(state);
        self.top_right.hash(state);
        self.bottom_left.hash(state);
        self.bottom_right.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycles() {
        let mut d = Direction::Up;
        for expected in [Direction::Left, Direction::Down, Direction::Right, Direction::Up] {
            d = d.rotate_ccw();
            assert_eq!(d, expected);
        }
        assert_eq!(Direction::Up.rotate_cw(), Direction::Right);
        assert_eq!(Direction::Left.rotate_cw().rotate_ccw(), Direction::Left);
        assert_eq!(Direction::None.rotate_cw(), Direction::None);
    }

    #[test]
    fn neighbour_pixels_follow_y_up() {
        let c = Corner::new(GridPoint::new(3, 4));
        assert_eq!(c.top_right, GridPoint::new(4, 4));
        assert_eq!(c.bottom_left, GridPoint::new(3, 3));
        assert_eq!(c.bottom_right, GridPoint::new(4, 3));
        assert_eq!(c.center(), Point::new(3.5, 3.5));
    }

    #[test]
    fn moves_and_directions_agree() {
        let c = Corner::new(GridPoint::new(0, 0));
        for dir in [Direction::Up, Direction::Left, Direction::Down, Direction::Right] {
            let moved = c.shift(dir);
            assert_ne!(moved, c);
            assert_eq!(moved.dir_from(&c).unwrap(), dir);
            assert!((moved.center().distance(c.center()) - 1.0).abs() < 1e-12);
        }
        assert_eq!(c.shift(Direction::None), c);
    }

    #[test]
    fn coincident_corners_are_stalled() {
        let c = Corner::new(GridPoint::new(2, 2));
        assert!(matches!(
            c.dir_from(&c),
            Err(TraceError::StalledCursor { x: 2, y: 2 })
        ));
    }

    #[test]
    fn midpoint_lies_on_the_edge() {
        let c = Corner::new(GridPoint::new(5, 5));
        assert_eq!(c.midpoint(&c.up()), Point::new(5.5, 5.0));
        assert_eq!(c.midpoint(&c.left()), Point::new(5.0, 4.5));
    }
}
