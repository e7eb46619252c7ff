//! The frame processing pipeline.
//!
//! Ties together frame acquisition, hand landmark detection, region
//! extraction, sign classification and overlay rendering. The pipeline only
//! talks to its collaborators through traits, so each stage can be replaced
//! by a canned implementation in tests.

use crate::classify::{decide, Classifier, Decision, CONFIDENCE_THRESHOLD};
use crate::hand;
use crate::image::{draw, Color, Image};
use crate::labels::LabelTable;
use crate::landmark::Detector;
use crate::rect::Rect;
use crate::region::hand_region;
use crate::resolution::Resolution;
use crate::timer::{FpsCounter, Timer};

/// Title of the window showing the annotated camera frame.
pub const MAIN_WINDOW: &str = "fingerspell";

/// Title of the window showing the cropped hand region.
pub const REGION_WINDOW: &str = "hand region";

/// A source of camera frames.
pub trait FrameSource {
    /// Fetches the next frame, blocking until one is available.
    ///
    /// Returns [`None`] when the stream has ended (or the device failed and
    /// no more frames will arrive), which stops the pipeline.
    fn next_frame(&mut self) -> Option<Image>;
}

/// The user-facing side of the pipeline: displays frames and reports
/// cancellation.
pub trait Ui {
    /// Displays `image` in the window named `window`, creating it on first
    /// use.
    fn show(&mut self, window: &str, image: &Image) -> anyhow::Result<()>;

    /// Returns `true` once the user has requested to quit.
    fn cancel_requested(&mut self) -> bool;
}

/// What the pipeline produced for a single frame.
#[derive(Debug, Default)]
pub struct FrameOutput {
    /// The padded hand bounding box, if a hand was found.
    pub region: Option<Rect>,
    /// The cropped hand region, resized for display.
    pub preview: Option<Image>,
    /// The classification outcome, if a region was classified.
    pub decision: Option<Decision>,
}

/// The per-frame recognition pipeline.
pub struct Pipeline<D, C> {
    detector: D,
    classifier: C,
    labels: LabelTable,
    threshold: f32,
    t_detect: Timer,
    t_classify: Timer,
    fps: FpsCounter,
}

impl<D: Detector, C: Classifier> Pipeline<D, C> {
    pub fn new(detector: D, classifier: C, labels: LabelTable) -> Self {
        Self {
            detector,
            classifier,
            labels,
            threshold: CONFIDENCE_THRESHOLD,
            t_detect: Timer::new("detect"),
            t_classify: Timer::new("classify"),
            fps: FpsCounter::new("pipeline"),
        }
    }

    /// Overrides the confidence threshold of the decision rule.
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Processes a single frame.
    ///
    /// Detects the hand, classifies the cropped region and draws the overlay
    /// (skeleton, bounding box, label and key hint) onto `frame` in place.
    /// The crop fed to the classifier is taken *before* anything is drawn.
    pub fn process(&mut self, frame: &mut Image) -> anyhow::Result<FrameOutput> {
        let landmarks = {
            let _guard = self.t_detect.start();
            self.detector.detect(frame)?
        };

        let Some(landmarks) = landmarks else {
            draw_quit_hint(frame);
            return Ok(FrameOutput::default());
        };

        let region = hand_region(&landmarks, frame.resolution());
        let mut preview = None;
        let mut decision = None;
        if let Some(rect) = region {
            let probs = {
                let _guard = self.t_classify.start();
                self.classifier.classify(frame.view(rect))?
            };
            preview = Some(frame.view(rect).resize(Resolution::PREVIEW));
            decision = Some(decide(&probs, &self.labels, self.threshold));
        }

        hand::draw_skeleton(frame, &landmarks);
        if let (Some(rect), Some(decision)) = (region, &decision) {
            let (color, text) = match decision {
                Decision::Sign { label, confidence } => {
                    (Color::GREEN, format!("{label} ({confidence:.2})"))
                }
                Decision::Uncertain { confidence } => {
                    (Color::RED, format!("Uncertain ({confidence:.2})"))
                }
            };
            draw::rect(frame, rect).color(color).stroke_width(2);
            draw::text(frame, 50, 50, &text)
                .color(color)
                .align_left()
                .align_top();
        }
        draw_quit_hint(frame);

        Ok(FrameOutput {
            region,
            preview,
            decision,
        })
    }

    /// Runs the pipeline until the frame source ends or the UI requests
    /// cancellation.
    ///
    /// A frame whose detection or classification fails is logged and shown
    /// without an overlay; the loop keeps running. Cancellation is observed
    /// once per iteration, after the frame has been displayed, so no further
    /// frame is acquired afterwards.
    pub fn run<S: FrameSource, U: Ui>(&mut self, source: &mut S, ui: &mut U) -> anyhow::Result<()> {
        while let Some(mut frame) = source.next_frame() {
            match self.process(&mut frame) {
                Ok(output) => {
                    if let Some(preview) = &output.preview {
                        ui.show(REGION_WINDOW, preview)?;
                    }
                }
                Err(e) => log::warn!("dropping overlay for this frame: {e:?}"),
            }
            ui.show(MAIN_WINDOW, &frame)?;

            self.fps.tick_with([&self.t_detect, &self.t_classify]);
            if ui.cancel_requested() {
                log::info!("quit requested, stopping pipeline");
                break;
            }
        }
        Ok(())
    }
}

fn draw_quit_hint(frame: &mut Image) {
    let y = frame.height() as i32 - 10;
    draw::text(frame, 10, y, "Press Q to quit")
        .color(Color::WHITE)
        .align_left()
        .align_bottom();
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use super::*;
    use crate::classify::ClassProbabilities;
    use crate::landmark::Landmarks;

    struct FakeDetector(Option<Landmarks>);

    impl Detector for FakeDetector {
        fn detect(&mut self, _frame: &Image) -> anyhow::Result<Option<Landmarks>> {
            Ok(self.0.clone())
        }
    }

    struct FakeClassifier(Vec<f32>);

    impl Classifier for FakeClassifier {
        fn classify(
            &mut self,
            _crop: crate::image::ImageView<'_>,
        ) -> anyhow::Result<ClassProbabilities> {
            Ok(ClassProbabilities::new(self.0.clone()))
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(
            &mut self,
            _crop: crate::image::ImageView<'_>,
        ) -> anyhow::Result<ClassProbabilities> {
            anyhow::bail!("inference exploded")
        }
    }

    /// Hands out canned frames and counts how often it gets released, like a
    /// capture device would be.
    struct FakeSource {
        frames: VecDeque<Image>,
        releases: Rc<Cell<u32>>,
    }

    impl FakeSource {
        fn with_frames(count: usize) -> Self {
            Self {
                frames: (0..count).map(|_| Image::new(32, 32)).collect(),
                releases: Rc::new(Cell::new(0)),
            }
        }
    }

    impl FrameSource for FakeSource {
        fn next_frame(&mut self) -> Option<Image> {
            self.frames.pop_front()
        }
    }

    impl Drop for FakeSource {
        fn drop(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    #[derive(Default)]
    struct FakeUi {
        shown: Vec<String>,
        cancel_after_shows: Option<usize>,
    }

    impl Ui for FakeUi {
        fn show(&mut self, window: &str, _image: &Image) -> anyhow::Result<()> {
            self.shown.push(window.to_string());
            Ok(())
        }

        fn cancel_requested(&mut self) -> bool {
            matches!(self.cancel_after_shows, Some(n) if self.shown.len() >= n)
        }
    }

    fn labels(names: &[&str]) -> LabelTable {
        let map: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        LabelTable::from_class_indices(map).unwrap()
    }

    fn hand_landmarks() -> Landmarks {
        [[0.2, 0.2], [0.6, 0.7]].into_iter().collect()
    }

    #[test]
    fn confident_frame_produces_sign_overlay() {
        let mut pipeline = Pipeline::new(
            FakeDetector(Some(hand_landmarks())),
            FakeClassifier(vec![0.9, 0.1]),
            labels(&["A", "B"]),
        );

        let mut frame = Image::new(100, 100);
        let output = pipeline.process(&mut frame).unwrap();

        let region = output.region.unwrap();
        assert!(!region.is_empty());
        assert_eq!(
            output.decision,
            Some(Decision::Sign {
                label: "A".to_string(),
                confidence: 0.9
            })
        );
        assert_eq!(output.preview.unwrap().resolution(), Resolution::PREVIEW);
        // The bounding box is stroked in green.
        assert_eq!(frame.get(region.x() as u32, region.y() as u32), Color::GREEN);
    }

    #[test]
    fn unconfident_frame_stays_uncertain() {
        let mut pipeline = Pipeline::new(
            FakeDetector(Some(hand_landmarks())),
            FakeClassifier(vec![0.5, 0.5]),
            labels(&["A", "B"]),
        );

        let mut frame = Image::new(100, 100);
        let output = pipeline.process(&mut frame).unwrap();
        assert_eq!(
            output.decision,
            Some(Decision::Uncertain { confidence: 0.5 })
        );
    }

    #[test]
    fn frame_without_hand_produces_no_output() {
        let mut pipeline = Pipeline::new(
            FakeDetector(None),
            FakeClassifier(vec![1.0]),
            labels(&["A"]),
        );

        let mut frame = Image::new(64, 64);
        let output = pipeline.process(&mut frame).unwrap();
        assert_eq!(output.region, None);
        assert!(output.preview.is_none());
        assert_eq!(output.decision, None);
    }

    #[test]
    fn cancellation_stops_the_loop_without_fetching_more_frames() {
        let mut pipeline = Pipeline::new(
            FakeDetector(None),
            FakeClassifier(vec![1.0]),
            labels(&["A"]),
        );

        let mut ui = FakeUi {
            cancel_after_shows: Some(1),
            ..FakeUi::default()
        };

        let mut source = FakeSource::with_frames(10);
        let releases = source.releases.clone();

        pipeline.run(&mut source, &mut ui).unwrap();
        assert_eq!(ui.shown, [MAIN_WINDOW]);
        assert_eq!(source.frames.len(), 9);

        // The source is released exactly once, when it goes out of scope.
        assert_eq!(releases.get(), 0);
        drop(source);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn end_of_stream_stops_the_loop() {
        let mut pipeline = Pipeline::new(
            FakeDetector(None),
            FakeClassifier(vec![1.0]),
            labels(&["A"]),
        );

        let mut source = FakeSource::with_frames(3);
        let mut ui = FakeUi::default();

        pipeline.run(&mut source, &mut ui).unwrap();
        assert_eq!(ui.shown.len(), 3);
    }

    #[test]
    fn failing_inference_drops_the_overlay_but_shows_the_frame() {
        let mut pipeline = Pipeline::new(
            FakeDetector(Some(hand_landmarks())),
            FailingClassifier,
            labels(&["A"]),
        );

        let mut source = FakeSource::with_frames(2);
        let mut ui = FakeUi::default();

        pipeline.run(&mut source, &mut ui).unwrap();
        // Both frames are still displayed (without a region preview), and
        // the loop drained the source.
        assert_eq!(ui.shown, [MAIN_WINDOW, MAIN_WINDOW]);
        assert!(source.frames.is_empty());
    }
}
