use std::{env, path::PathBuf};

use anyhow::Context;
use fingerspell::{
    classify::SignClassifier,
    gui::{self, WindowUi},
    hand::HandLandmarker,
    labels::LabelTable,
    nn::NeuralNetwork,
    pipeline::Pipeline,
    video::webcam::{Webcam, WebcamOptions},
};

fn main() -> ! {
    fingerspell::init_logger!();
    gui::run(run)
}

fn run() -> anyhow::Result<()> {
    let labels_path = artifact_path("FINGERSPELL_LABELS", "class_indices.json");
    let labels = LabelTable::load(&labels_path)
        .with_context(|| format!("failed to load label table '{}'", labels_path.display()))?;
    log::info!("loaded {} class labels", labels.len());

    let hand_path = artifact_path("FINGERSPELL_HAND_MODEL", "hand_landmark.onnx");
    let detector = HandLandmarker::new(
        NeuralNetwork::load(&hand_path)
            .with_context(|| format!("failed to load landmark model '{}'", hand_path.display()))?,
    )?;

    let sign_path = artifact_path("FINGERSPELL_SIGN_MODEL", "sign_classifier.onnx");
    let classifier = SignClassifier::new(
        NeuralNetwork::load(&sign_path)
            .with_context(|| format!("failed to load sign model '{}'", sign_path.display()))?,
        labels.len(),
    )?;

    let mut webcam = Webcam::open(WebcamOptions::default()).context("failed to open webcam")?;
    let mut ui = WindowUi::new();

    let mut pipeline = Pipeline::new(detector, classifier, labels);
    pipeline.run(&mut webcam, &mut ui)
}

fn artifact_path(var: &str, default: &str) -> PathBuf {
    env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
