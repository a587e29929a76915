//! Rectangles.

use crate::layout::Size;
use cgmath::{Point2, Vector2, Zero};

/// A point in the parent coordinate system.
pub type Point = Point2<f64>;

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    /// Returns a new rectangle with the given size.
    pub fn with_size(&self, size: Size) -> Rect {
        Rect {
            origin: self.origin,
            size,
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::zero()
    }
}

#[test]
fn test_rect_with_size() {
    let rect = Rect::new(Point2::new(0., 10.), Vector2::new(20., 5.));
    let resized = rect.with_size(Vector2::new(3., 4.));
    assert_eq!(resized.origin, rect.origin, "resizing a rectangle keeps its origin");
    assert_eq!(resized.size, Vector2::new(3., 4.));
    assert_eq!(Rect::default(), Rect::zero());
}
