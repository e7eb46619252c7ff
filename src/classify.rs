//! Sign classification and the confidence decision rule.

use crate::image::ImageView;
use crate::labels::LabelTable;
use crate::nn::{Cnn, CnnInputShape, ColorMapper, NeuralNetwork};
use crate::num::TotalF32;

/// Minimum winning probability for a classification to be reported as a sign.
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Per-class probabilities produced by a classifier, indexed by class index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities(Vec<f32>);

impl ClassProbabilities {
    pub fn new(probs: Vec<f32>) -> Self {
        Self(probs)
    }

    /// Returns the winning `(class_index, probability)` pair.
    ///
    /// Ties are broken in favor of the lower class index. Returns [`None`]
    /// when there are no classes at all.
    pub fn top(&self) -> Option<(usize, f32)> {
        // `max_by_key` keeps the *last* maximum; reverse so ties go to the
        // lower index.
        self.0
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|&(_, &prob)| TotalF32(prob))
            .map(|(i, &prob)| (i, prob))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// A sign classification capability operating on a cropped hand image.
///
/// The pipeline only depends on this contract; tests substitute a canned
/// implementation for the neural network backend.
pub trait Classifier {
    /// Classifies the hand in `crop`, returning per-class probabilities.
    fn classify(&mut self, crop: ImageView<'_>) -> anyhow::Result<ClassProbabilities>;
}

/// The outcome of applying the decision rule to one classified frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The classifier is confident: a concrete sign was recognized.
    Sign { label: String, confidence: f32 },
    /// The winning probability did not exceed the confidence threshold, or
    /// the winning class has no label.
    Uncertain { confidence: f32 },
}

impl Decision {
    /// Returns the winning probability, regardless of whether it was accepted.
    pub fn confidence(&self) -> f32 {
        match self {
            Decision::Sign { confidence, .. } | Decision::Uncertain { confidence } => *confidence,
        }
    }
}

/// Applies the confidence decision rule to a set of class probabilities.
///
/// The winning class is accepted only if its probability *strictly exceeds*
/// `threshold`; a probability exactly at the threshold stays uncertain. A
/// winning class index without an entry in `labels` is also reported as
/// uncertain rather than invented.
pub fn decide(probs: &ClassProbabilities, labels: &LabelTable, threshold: f32) -> Decision {
    let Some((index, confidence)) = probs.top() else {
        return Decision::Uncertain { confidence: 0.0 };
    };

    if confidence > threshold {
        if let Some(label) = labels.get(index) {
            return Decision::Sign {
                label: label.to_string(),
                confidence,
            };
        }
        log::warn!("classifier produced class index {index} with no label entry");
    }
    Decision::Uncertain { confidence }
}

/// A CNN-backed fingerspelling sign classifier.
///
/// Expects a network with a single `[1, H, W, 3]` input and a single
/// `[1, num_classes]` softmax output. Input crops are resized to the
/// network's input resolution and intensities are mapped to `[0, 1]`.
pub struct SignClassifier {
    cnn: Cnn,
}

impl SignClassifier {
    /// Creates a classifier from a network predicting `num_classes` classes.
    ///
    /// The network's output must be a `[1, num_classes]` tensor; a model
    /// trained against a different label set is rejected here instead of
    /// producing nonsense decisions later.
    pub fn new(nn: NeuralNetwork, num_classes: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(
            nn.num_outputs() == 1,
            "classifier network must have exactly 1 output, this one has {}",
            nn.num_outputs(),
        );
        check_class_cardinality(&nn.output_shape(0)?, num_classes)?;

        let cnn = Cnn::new(nn, CnnInputShape::NHWC, ColorMapper::linear(0.0..=1.0))?;
        Ok(Self { cnn })
    }
}

fn check_class_cardinality(shape: &[usize], num_classes: usize) -> anyhow::Result<()> {
    match shape {
        [1, n] if *n == num_classes => Ok(()),
        [1, n] => anyhow::bail!(
            "classifier network predicts {n} classes, but the label table has {num_classes}"
        ),
        _ => anyhow::bail!("unexpected classifier output shape {shape:?}"),
    }
}

impl Classifier for SignClassifier {
    fn classify(&mut self, crop: ImageView<'_>) -> anyhow::Result<ClassProbabilities> {
        let outputs = self.cnn.estimate(crop)?;
        Ok(ClassProbabilities::new(outputs.as_slice(0)?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn labels(names: &[&str]) -> LabelTable {
        let map: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        LabelTable::from_class_indices(map).unwrap()
    }

    #[test]
    fn confident_prediction_yields_sign() {
        let table = labels(&["A", "B", "C"]);
        let probs = ClassProbabilities::new(vec![0.9, 0.05, 0.05]);
        assert_eq!(
            decide(&probs, &table, CONFIDENCE_THRESHOLD),
            Decision::Sign {
                label: "A".to_string(),
                confidence: 0.9
            }
        );
    }

    #[test]
    fn threshold_is_strict() {
        let table = labels(&["A", "B"]);

        let at_threshold = ClassProbabilities::new(vec![0.7, 0.3]);
        assert_eq!(
            decide(&at_threshold, &table, CONFIDENCE_THRESHOLD),
            Decision::Uncertain { confidence: 0.7 }
        );

        let above_threshold = ClassProbabilities::new(vec![0.71, 0.29]);
        assert_eq!(
            decide(&above_threshold, &table, CONFIDENCE_THRESHOLD),
            Decision::Sign {
                label: "A".to_string(),
                confidence: 0.71
            }
        );
    }

    #[test]
    fn missing_label_yields_uncertain() {
        let table = labels(&["A"]);
        let probs = ClassProbabilities::new(vec![0.1, 0.9]);
        assert_eq!(
            decide(&probs, &table, CONFIDENCE_THRESHOLD),
            Decision::Uncertain { confidence: 0.9 }
        );
    }

    #[test]
    fn top_breaks_ties_towards_lower_index() {
        let probs = ClassProbabilities::new(vec![0.4, 0.4, 0.2]);
        assert_eq!(probs.top(), Some((0, 0.4)));
    }

    #[test]
    fn class_cardinality_must_match_label_table() {
        assert!(check_class_cardinality(&[1, 5], 5).is_ok());
        assert!(check_class_cardinality(&[1, 29], 5).is_err());
        assert!(check_class_cardinality(&[5], 5).is_err());
        assert!(check_class_cardinality(&[2, 5], 5).is_err());
    }

    #[test]
    fn empty_probabilities_yield_uncertain() {
        let table = labels(&[]);
        let probs = ClassProbabilities::new(vec![]);
        assert_eq!(
            decide(&probs, &table, CONFIDENCE_THRESHOLD),
            Decision::Uncertain { confidence: 0.0 }
        );
    }
}
