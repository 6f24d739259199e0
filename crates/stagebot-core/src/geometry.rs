//! Match geometry
//!
//! Core types for representing where a template was found on screen.

use serde::{Deserialize, Serialize};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the rectangle
    pub fn area(&self) -> f64 {
        (self.width * self.height) as f64
    }

    /// Center point
    pub fn center(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Intersection over union with another rectangle
    pub fn iou(&self, other: &Rect) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = ((x2 - x1) * (y2 - y1)) as f64;
        let union = self.area() + other.area() - intersection;

        intersection / union
    }

    /// Check if this rectangle overlaps with another
    pub fn overlaps(&self, other: &Rect, threshold: f64) -> bool {
        self.iou(other) > threshold
    }
}

/// One located occurrence of a reference image within a captured frame.
///
/// Produced fresh on every poll tick; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Representative point of the match (rectangle center).
    pub point: Point,
    /// Bounding rectangle of the matched region.
    pub rect: Rect,
    /// Confidence score in [0, 1].
    pub confidence: f64,
}

impl Match {
    pub fn new(rect: Rect, confidence: f64) -> Self {
        Self {
            point: rect.center(),
            rect,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_iou() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);

        let iou = a.iou(&b);
        assert!(iou > 0.0 && iou < 1.0);

        let far = Rect::new(100, 100, 10, 10);
        assert_eq!(a.iou(&far), 0.0);
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::new(10, 20, 30, 40);
        let c = r.center();
        assert_eq!(c.x, 25.0);
        assert_eq!(c.y, 40.0);
    }

    #[test]
    fn test_match_point_is_rect_center() {
        let m = Match::new(Rect::new(0, 0, 8, 6), 0.9);
        assert_eq!(m.point, Point::new(4.0, 3.0));
    }
}
