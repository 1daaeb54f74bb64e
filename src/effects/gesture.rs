//! Gesture state derived from skeletal landmarks.

use crate::pose::{Landmark, LANDMARK_COUNT, LEFT_SHOULDER, LEFT_WRIST, RIGHT_SHOULDER, RIGHT_WRIST};

/// Which hands are raised above shoulder height this frame.
///
/// Derived fresh every frame; never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    None,
    Left,
    Right,
    Both,
}

/// Classify the current frame's landmarks.
///
/// A wrist counts as raised when its y coordinate is numerically smaller
/// than the matching shoulder's (image coordinates grow downward). An
/// incomplete landmark list (fewer than the full 33-point skeleton,
/// including an empty one) is a normal "no body" frame, not an error.
pub fn classify(landmarks: &[Landmark]) -> GestureState {
    if landmarks.len() < LANDMARK_COUNT {
        return GestureState::None;
    }

    let left_raised = landmarks[LEFT_WRIST].y < landmarks[LEFT_SHOULDER].y;
    let right_raised = landmarks[RIGHT_WRIST].y < landmarks[RIGHT_SHOULDER].y;

    match (left_raised, right_raised) {
        (true, true) => GestureState::Both,
        (true, false) => GestureState::Left,
        (false, true) => GestureState::Right,
        (false, false) => GestureState::None,
    }
}
