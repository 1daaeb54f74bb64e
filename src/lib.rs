//! Gesture FX - gesture-reactive visual effects on a live webcam stream.
//!
//! Hand motion leaves fading trails, fast motion sprays short-lived
//! particles, and raising one or both hands above the shoulders washes
//! the frame in a state color. Pose landmarks come from an ONNX model,
//! frames from the webcam; everything composites on the CPU.

pub mod camera;
pub mod effects;
pub mod pose;

pub use effects::{EffectsConfig, GestureState, VisualEffects};
