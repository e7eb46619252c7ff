//! Real-time sign-alphabet recognition.
//!
//! The pipeline captures webcam frames, locates a hand with a landmark
//! network, crops and normalizes the hand region, classifies it with a
//! trained sign classifier, and overlays the decision on the displayed frame.
//!
//! # Environment Variables
//!
//! Some parts of the pipeline can be overridden by setting environment
//! variables:
//!
//! * `FINGERSPELL_WEBCAM_NAME`: Forces the device to use for [`Webcam`]s
//!   created without an explicit device name. If unset, the first device that
//!   supports a compatible image format will be used.
//! * `FINGERSPELL_HAND_MODEL`: Path of the hand landmark ONNX model.
//! * `FINGERSPELL_SIGN_MODEL`: Path of the sign classifier ONNX model.
//! * `FINGERSPELL_LABELS`: Path of the class index JSON artifact.
//!
//! [`Webcam`]: video::webcam::Webcam

use log::LevelFilter;

pub mod classify;
pub mod gui;
pub mod hand;
pub mod image;
pub mod iter;
pub mod labels;
pub mod landmark;
pub mod nn;
pub mod num;
pub mod pipeline;
pub mod rect;
pub mod region;
pub mod resolution;
pub mod termination;
pub mod timer;
pub mod video;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("wgpu"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and the library will log at *debug* level; `wgpu` will
/// always log at *warn* level. `RUST_LOG` can override the defaults.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
