//! Axis-aligned pixel rectangles.

use std::{cmp, fmt};

use crate::resolution::Resolution;

/// An axis-aligned rectangle in pixel coordinates.
///
/// The rectangle is stored as its two corners `(x_min, y_min)` and
/// `(x_max, y_max)`, with `x_min <= x_max` and `y_min <= y_max`. Rectangles
/// are allowed to have zero width and/or height.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

impl Rect {
    /// Creates a rectangle from two opposing corner points.
    ///
    /// # Panics
    ///
    /// Panics if `bottom_right` lies above or to the left of `top_left`.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        assert!(
            top_left.0 <= bottom_right.0 && top_left.1 <= bottom_right.1,
            "invalid rectangle corners {:?} / {:?}",
            top_left,
            bottom_right,
        );
        Self {
            x_min: top_left.0,
            y_min: top_left.1,
            x_max: bottom_right.0,
            y_max: bottom_right.1,
        }
    }

    /// Creates a rectangle extending downwards and right from a point.
    pub fn from_top_left(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x_min: x,
            y_min: y,
            x_max: x + width as i32,
            y_max: y + height as i32,
        }
    }

    /// Computes the tight axis-aligned bounding rectangle that encompasses
    /// `points`.
    ///
    /// Returns [`None`] if `points` is an empty iterator.
    pub fn bounding<I: IntoIterator<Item = (i32, i32)>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();

        let (x, y) = iter.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x, x, y, y);

        for (x, y) in iter {
            x_min = cmp::min(x_min, x);
            x_max = cmp::max(x_max, x);
            y_min = cmp::min(y_min, y);
            y_max = cmp::max(y_max, y);
        }

        Some(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Grows this rectangle by a margin relative to its width and height.
    ///
    /// `amount` times the rectangle's width is added to its left and right
    /// sides, and `amount` times its height to its top and bottom sides.
    /// Fractional margins are truncated toward zero.
    #[must_use]
    pub fn grow_rel(&self, amount: f32) -> Self {
        let pad_x = (self.width() as f32 * amount) as i32;
        let pad_y = (self.height() as f32 * amount) as i32;
        Self {
            x_min: self.x_min - pad_x,
            y_min: self.y_min - pad_y,
            x_max: self.x_max + pad_x,
            y_max: self.y_max + pad_y,
        }
    }

    /// Clamps this rectangle to the bounds of an image of resolution `res`.
    ///
    /// The result is fully contained in `[0, width] x [0, height]`. Note that
    /// the clamped rectangle may be empty.
    #[must_use]
    pub fn clamp(&self, res: Resolution) -> Self {
        let w = res.width() as i32;
        let h = res.height() as i32;
        Self {
            x_min: self.x_min.clamp(0, w),
            y_min: self.y_min.clamp(0, h),
            x_max: self.x_max.clamp(0, w),
            y_max: self.y_max.clamp(0, h),
        }
    }

    /// Computes the intersection of `self` and `other`.
    ///
    /// Returns [`None`] when the rectangles do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Returns whether this rectangle covers zero pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x_min == self.x_max || self.y_min == self.y_max
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x_min
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y_min
    }

    #[inline]
    pub fn x_max(&self) -> i32 {
        self.x_max
    }

    #[inline]
    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    #[inline]
    pub fn width(&self) -> u32 {
        (self.x_max - self.x_min) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.y_max - self.y_min) as u32
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x_min + (self.width() / 2) as i32,
            self.y_min + (self.height() / 2) as i32,
        )
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect ({},{})-({},{})",
            self.x_min, self.y_min, self.x_max, self.y_max,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding() {
        assert_eq!(Rect::bounding([]), None);
        assert_eq!(
            Rect::bounding([(3, 7)]),
            Some(Rect::from_corners((3, 7), (3, 7)))
        );
        assert_eq!(
            Rect::bounding([(10, 50), (50, 10)]),
            Some(Rect::from_corners((10, 10), (50, 50)))
        );
    }

    #[test]
    fn grow_rel_truncates() {
        let rect = Rect::from_corners((10, 10), (50, 50));
        assert_eq!(rect.grow_rel(0.2), Rect::from_corners((2, 2), (58, 58)));

        // 0.2 * 15 = 3.0, 0.2 * 17 = 3.4 -> 3
        let rect = Rect::from_corners((0, 0), (15, 17));
        assert_eq!(rect.grow_rel(0.2), Rect::from_corners((-3, -3), (18, 20)));
    }

    #[test]
    fn clamp_to_frame() {
        let res = Resolution::new(100, 100);
        let rect = Rect::from_corners((-2, -2), (12, 12)).clamp(res);
        assert_eq!(rect, Rect::from_corners((0, 0), (12, 12)));

        let rect = Rect::from_corners((90, 40), (130, 120)).clamp(res);
        assert_eq!(rect, Rect::from_corners((90, 40), (100, 100)));

        // Fully outside the frame -> clamps to an empty sliver on the edge.
        let rect = Rect::from_corners((-30, -30), (-10, -10)).clamp(res);
        assert!(rect.is_empty());
    }

    #[test]
    fn intersection() {
        let a = Rect::from_corners((0, 0), (10, 10));
        let b = Rect::from_corners((5, 5), (20, 20));
        assert_eq!(
            a.intersection(&b),
            Some(Rect::from_corners((5, 5), (10, 10)))
        );
        let c = Rect::from_corners((11, 11), (20, 20));
        assert_eq!(a.intersection(&c), None);
    }
}
