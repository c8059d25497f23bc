//! Integer screen geometry shared by the host interface and the layout code.
//!
//! Hosts report window geometry in whole device pixels, so everything here is
//! `i32`. Two rectangles exist per window: the *frame* rect, which callers
//! reason about, and the *buffer* rect, which also covers client-side
//! decorations and shadows and is what the visual surface is positioned by.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Size { width, height } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect { origin: Point::ZERO, size: Size::new(0, 0) };

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min_x(&self) -> i32 { self.origin.x }

    pub fn max_x(&self) -> i32 { self.origin.x + self.size.width }

    pub fn min_y(&self) -> i32 { self.origin.y }

    pub fn max_y(&self) -> i32 { self.origin.y + self.size.height }

    /// Edges are inclusive on both sides.
    pub fn contains(&self, point: Point) -> bool {
        (self.min_x()..=self.max_x()).contains(&point.x)
            && (self.min_y()..=self.max_y()).contains(&point.y)
    }

    pub fn with_origin(&self, origin: Point) -> Rect { Rect { origin, size: self.size } }

    pub fn with_size(&self, size: Size) -> Rect { Rect { origin: self.origin, size } }
}

/// Translates a desired frame position into the position the window's visual
/// surface has to be moved to.
///
/// The decoration offset (`frame - buffer`) can change between calls, so it
/// must be computed from freshly queried rects before every move.
pub fn surface_target(desired: Point, frame: Rect, buffer: Rect) -> Point {
    let x_offset = frame.origin.x - buffer.origin.x;
    let y_offset = frame.origin.y - buffer.origin.y;
    Point::new(desired.x - x_offset, desired.y - y_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_inclusive() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(rect.contains(Point::new(50, 50)));
        assert!(rect.contains(Point::new(0, 0)));
        assert!(rect.contains(Point::new(100, 100)));
        assert!(!rect.contains(Point::new(101, 50)));
        assert!(!rect.contains(Point::new(-1, 50)));
    }

    #[test]
    fn test_edges() {
        let rect = Rect::new(10, 20, 300, 400);
        assert_eq!(rect.min_x(), 10);
        assert_eq!(rect.max_x(), 310);
        assert_eq!(rect.min_y(), 20);
        assert_eq!(rect.max_y(), 420);
    }

    #[test]
    fn test_surface_target_subtracts_decoration_offset() {
        // A client-side decorated window whose shadow extends 12px left and
        // 8px above the frame.
        let frame = Rect::new(112, 108, 400, 300);
        let buffer = Rect::new(100, 100, 424, 320);
        assert_eq!(surface_target(Point::new(500, 40), frame, buffer), Point::new(488, 32));
    }

    #[test]
    fn test_surface_target_without_decorations() {
        let frame = Rect::new(50, 50, 400, 300);
        assert_eq!(surface_target(Point::new(7, 9), frame, frame), Point::new(7, 9));
    }

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0, 0).distance_to(Point::new(3, 4)), 5.0);
    }
}
