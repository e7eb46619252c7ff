//! Hand region extraction.
//!
//! Converts a set of normalized landmarks into a padded pixel bounding box
//! that can be cropped out of the frame and fed to the classifier.

use crate::landmark::Landmarks;
use crate::rect::Rect;
use crate::resolution::Resolution;

/// Relative padding added to each side of the tight landmark bounding box.
const PADDING: f32 = 0.2;

/// Computes the padded, clamped bounding box of `landmarks` in an image of
/// resolution `res`.
///
/// Each normalized landmark is converted to pixel space by rounding
/// `coord * dimension` to the nearest integer. The tight bounding box over
/// all landmarks is grown by 20% of its width and height on each side, then
/// clamped to the image bounds.
///
/// Returns [`None`] if the resulting box covers zero pixels (for example
/// when all landmarks collapse onto a single point, or the whole box lies
/// outside the frame). A returned rectangle is always a valid non-empty
/// sub-rectangle of the image.
pub fn hand_region(landmarks: &Landmarks, res: Resolution) -> Option<Rect> {
    let (w, h) = (res.width() as f32, res.height() as f32);
    let tight = Rect::bounding(landmarks.positions().iter().map(|&[x, y]| {
        ((x * w).round() as i32, (y * h).round() as i32)
    }))?;

    let padded = tight.grow_rel(PADDING).clamp(res);
    if padded.is_empty() {
        return None;
    }
    Some(padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmarks(points: &[(f32, f32)]) -> Landmarks {
        points.iter().map(|&(x, y)| [x, y]).collect()
    }

    #[test]
    fn deterministic() {
        let res = Resolution::new(640, 480);
        let lm = landmarks(&[(0.1, 0.2), (0.5, 0.6), (0.3, 0.3)]);
        let a = hand_region(&lm, res);
        let b = hand_region(&lm, res);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn padding_without_clamping() {
        // Tight box (10,10)-(50,50) in a 200x200 frame; padding is
        // 0.2 * 40 = 8 per axis, so the expanded box stays in bounds.
        let res = Resolution::new(200, 200);
        let lm = landmarks(&[(0.05, 0.05), (0.25, 0.25)]);
        assert_eq!(
            hand_region(&lm, res),
            Some(Rect::from_corners((2, 2), (58, 58)))
        );
    }

    #[test]
    fn padding_clamped_to_frame() {
        // Tight box (0,0)-(10,10) in a 100x100 frame; padding 2 expands to
        // (-2,-2)-(12,12), which clamps to (0,0)-(12,12).
        let res = Resolution::new(100, 100);
        let lm = landmarks(&[(0.0, 0.0), (0.1, 0.1)]);
        assert_eq!(
            hand_region(&lm, res),
            Some(Rect::from_corners((0, 0), (12, 12)))
        );
    }

    #[test]
    fn collapsed_landmarks_yield_no_region() {
        let res = Resolution::new(640, 480);
        let lm = landmarks(&[(0.5, 0.5); 21]);
        assert_eq!(hand_region(&lm, res), None);
    }

    #[test]
    fn region_stays_within_bounds() {
        let res = Resolution::new(100, 100);
        // Landmarks hugging the bottom-right corner.
        let lm = landmarks(&[(0.9, 0.9), (1.0, 1.0)]);
        let rect = hand_region(&lm, res).unwrap();
        assert!(rect.x() >= 0 && rect.y() >= 0);
        assert!(rect.x_max() <= 100 && rect.y_max() <= 100);
        assert!(!rect.is_empty());
    }

    #[test]
    fn no_landmarks_yield_no_region() {
        let res = Resolution::new(100, 100);
        assert_eq!(hand_region(&Landmarks::new(0), res), None);
    }
}
