//! Hand landmark prediction.

use crate::image::Image;
use crate::iter::zip_exact;
use crate::landmark::{Detector, Landmarks};
use crate::nn::{Cnn, CnnInputShape, ColorMapper, NeuralNetwork};

use super::NUM_LANDMARKS;

/// Configuration for a [`HandLandmarker`].
#[derive(Debug, Clone, Copy)]
pub struct LandmarkerOptions {
    presence_threshold: f32,
    tracking_threshold: f32,
}

impl Default for LandmarkerOptions {
    fn default() -> Self {
        Self {
            presence_threshold: 0.7,
            tracking_threshold: 0.5,
        }
    }
}

impl LandmarkerOptions {
    /// Sets the presence score needed to *acquire* a hand.
    pub fn presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    /// Sets the presence score needed to *keep* a hand that was present in
    /// the previous frame.
    ///
    /// This is lower than the acquisition threshold so that a hand is not
    /// dropped and re-acquired on every borderline frame.
    pub fn tracking_threshold(mut self, threshold: f32) -> Self {
        self.tracking_threshold = threshold;
        self
    }
}

/// A CNN-backed hand landmark detector.
///
/// Runs the landmark network on the full camera frame and reports 21 hand
/// landmarks in normalized image coordinates, or nothing when the network's
/// presence score falls below the configured threshold.
pub struct HandLandmarker {
    cnn: Cnn,
    options: LandmarkerOptions,
    tracking: bool,
}

impl HandLandmarker {
    /// Creates a landmarker with default options.
    ///
    /// The network must have a single `[1, 3, H, W]` image input, a `[1, 63]`
    /// screen-landmark output, and a `[1, 1]` presence output.
    pub fn new(nn: NeuralNetwork) -> anyhow::Result<Self> {
        Self::with_options(nn, LandmarkerOptions::default())
    }

    pub fn with_options(nn: NeuralNetwork, options: LandmarkerOptions) -> anyhow::Result<Self> {
        let cnn = Cnn::new(nn, CnnInputShape::NCHW, ColorMapper::linear(0.0..=1.0))?;
        Ok(Self {
            cnn,
            options,
            tracking: false,
        })
    }
}

impl Detector for HandLandmarker {
    fn detect(&mut self, frame: &Image) -> anyhow::Result<Option<Landmarks>> {
        let outputs = self.cnn.estimate(frame.view(frame.rect()))?;
        anyhow::ensure!(
            outputs.len() >= 2,
            "landmark network must have landmark and presence outputs, got {}",
            outputs.len(),
        );
        anyhow::ensure!(
            outputs.shape(0) == [1, NUM_LANDMARKS * 3] && outputs.shape(1) == [1, 1],
            "unexpected landmark network output shapes {:?} / {:?}",
            outputs.shape(0),
            outputs.shape(1),
        );

        let presence = outputs.as_slice(1)?[0];
        let threshold = if self.tracking {
            self.options.tracking_threshold
        } else {
            self.options.presence_threshold
        };
        if presence < threshold {
            self.tracking = false;
            log::trace!("no hand (presence={presence:.2}, threshold={threshold:.2})");
            return Ok(None);
        }
        self.tracking = true;

        // The network reports x/y/z coordinates in its own input pixel space.
        // Normalize x/y so downstream code is independent of resolutions.
        let res = self.cnn.input_resolution();
        let (w, h) = (res.width() as f32, res.height() as f32);
        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        for (coords, out) in zip_exact(
            outputs.as_slice(0)?.chunks_exact(3),
            landmarks.positions_mut(),
        ) {
            out[0] = (coords[0] / w).clamp(0.0, 1.0);
            out[1] = (coords[1] / h).clamp(0.0, 1.0);
        }

        Ok(Some(landmarks))
    }
}
