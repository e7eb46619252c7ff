//! Common types for visual landmark estimation.

use crate::image::Image;

/// A fixed-length collection of 2D landmarks in normalized image coordinates.
///
/// Both coordinates of every landmark are in range `[0, 1]`, relative to the
/// width and height of the image the landmarks were estimated on.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    positions: Box<[[f32; 2]]>,
}

impl Landmarks {
    /// Creates a new [`Landmarks`] collection containing `len` preallocated
    /// landmarks.
    ///
    /// All landmarks will start with all coordinates at `0.0`.
    pub fn new(len: usize) -> Self {
        Self {
            positions: vec![[0.0, 0.0]; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns a landmark's normalized position.
    #[inline]
    pub fn position(&self, index: usize) -> [f32; 2] {
        self.positions[index]
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [[f32; 2]] {
        &mut self.positions
    }
}

impl FromIterator<[f32; 2]> for Landmarks {
    fn from_iter<T: IntoIterator<Item = [f32; 2]>>(iter: T) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// A landmark detector capability.
///
/// Implementations locate a tracked object in a full camera frame and report
/// its landmarks, or report that no object is present. The pipeline only
/// depends on this contract, so detection backends can be swapped without
/// touching the pipeline logic (tests use a canned implementation).
pub trait Detector {
    /// Runs detection on `frame`.
    ///
    /// Returns `Ok(None)` if no tracked object is present in the frame. An
    /// `Err` indicates an inference failure; callers are expected to skip the
    /// frame's unit of work and continue.
    fn detect(&mut self, frame: &Image) -> anyhow::Result<Option<Landmarks>>;
}
