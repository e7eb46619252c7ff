//! Hand landmark detection and visualization.

mod landmark;

pub use landmark::{HandLandmarker, LandmarkerOptions};

use crate::image::{draw, Color, Image};
use crate::landmark::Landmarks;

/// The number of landmarks placed on a hand.
pub const NUM_LANDMARKS: usize = 21;

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Landmark pairs connected by bones, for drawing the hand skeleton.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Surround the palm:
        (Wrist, ThumbCmc),
        (ThumbCmc, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// Draws the hand skeleton onto `image`.
///
/// Landmark coordinates are normalized, so the same landmark set can be drawn
/// onto frames of any resolution.
pub fn draw_skeleton(image: &mut Image, landmarks: &Landmarks) {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let to_px = |[x, y]: [f32; 2]| ((x * w).round() as i32, (y * h).round() as i32);

    if landmarks.len() == NUM_LANDMARKS {
        for &(a, b) in CONNECTIVITY {
            let (ax, ay) = to_px(landmarks.position(a as usize));
            let (bx, by) = to_px(landmarks.position(b as usize));
            draw::line(image, ax, ay, bx, by).color(Color::GREEN);
        }
    }
    for &pos in landmarks.positions() {
        let (x, y) = to_px(pos);
        draw::marker(image, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_markers_land_on_landmark_pixels() {
        let mut image = Image::new(10, 10);
        let landmarks: Landmarks = [[0.5, 0.5]].into_iter().collect();
        draw_skeleton(&mut image, &landmarks);
        assert_eq!(image.get(5, 5), Color::RED);
    }
}
