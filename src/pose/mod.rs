//! Pose landmark source.
//!
//! Runs a BlazePose-style landmark model through ONNX Runtime on a
//! background thread. The frame loop hands frames in with a non-blocking
//! send (dropping frames under load) and reads back the latest landmark
//! set. Per frame the result is either the full 33-point skeleton in
//! pixel coordinates or an empty list meaning "no body detected."

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use ndarray::Array4;
use parking_lot::Mutex;

/// Landmarks in the full-body skeleton convention.
pub const LANDMARK_COUNT: usize = 33;

/// Keypoint ids the effects engine consumes.
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;

/// Skeleton edges (start keypoint, end keypoint) for the 33-point body.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    // Face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    // Arms
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    // Torso
    (11, 23),
    (12, 24),
    (23, 24),
    // Legs
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// Model input is a square RGB crop of this side length.
const INPUT_SIZE: u32 = 256;

/// Values per landmark in the model output (x, y, z, visibility, presence).
const LANDMARK_STRIDE: usize = 5;

/// Minimum pose score to accept a detection.
const SCORE_THRESHOLD: f32 = 0.5;

/// One body keypoint in pixel coordinates of the processed frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// Landmarks for one frame. `landmarks` is either empty or holds the full
/// 33-point skeleton, ordered by keypoint id.
#[derive(Clone, Default)]
pub struct PoseResult {
    pub landmarks: Vec<Landmark>,
    pub frame_number: u64,
}

/// Frame handed to the inference thread.
struct FrameData {
    /// RGBA pixel data
    data: Vec<u8>,
    width: u32,
    height: u32,
    frame_number: u64,
}

/// Background pose detector.
pub struct PoseDetector {
    latest_result: Arc<Mutex<PoseResult>>,
    frame_sender: Option<Sender<FrameData>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl PoseDetector {
    pub fn new() -> Result<Self, String> {
        let latest_result = Arc::new(Mutex::new(PoseResult::default()));
        let running = Arc::new(AtomicBool::new(false));

        // Bounded channel: when inference lags, stale frames are dropped
        // at the sender instead of queueing up.
        let (frame_sender, frame_receiver) = crossbeam_channel::bounded::<FrameData>(2);

        let latest_result_clone = latest_result.clone();
        let running_clone = running.clone();

        let thread_handle = std::thread::Builder::new()
            .name("pose-inference".to_string())
            .spawn(move || {
                Self::inference_thread(frame_receiver, latest_result_clone, running_clone);
            })
            .map_err(|e| format!("Failed to spawn inference thread: {}", e))?;

        Ok(Self {
            latest_result,
            frame_sender: Some(frame_sender),
            running,
            thread_handle: Some(thread_handle),
        })
    }

    fn inference_thread(
        frame_receiver: Receiver<FrameData>,
        latest_result: Arc<Mutex<PoseResult>>,
        running: Arc<AtomicBool>,
    ) {
        log::info!("Pose inference thread started");

        let mut session = match Self::init_session() {
            Ok(s) => {
                running.store(true, Ordering::Release);
                log::info!("Pose landmark model loaded");
                Some(s)
            }
            Err(e) => {
                log::warn!("Failed to load pose model: {}. Pose tracking disabled.", e);
                None
            }
        };

        while let Ok(frame) = frame_receiver.recv() {
            if let Some(ref mut session) = session {
                match Self::run_landmarks(session, &frame) {
                    Ok(landmarks) => {
                        *latest_result.lock() = PoseResult {
                            landmarks,
                            frame_number: frame.frame_number,
                        };
                    }
                    Err(e) => {
                        log::warn!("Pose inference error: {}", e);
                    }
                }
            }
        }

        running.store(false, Ordering::Release);
        log::info!("Pose inference thread stopped");
    }

    /// Initialize ONNX Runtime and load the landmark model.
    fn init_session() -> Result<ort::session::Session, String> {
        let model_dir = Self::find_model_dir()?;
        let model_path = model_dir.join("pose_landmark.onnx");
        if !model_path.exists() {
            return Err(format!("Pose model not found: {:?}", model_path));
        }

        ort::init()
            .with_name("GestureFx")
            .commit()
            .map_err(|e| format!("Failed to initialize ORT: {}", e))?;

        let session = ort::session::Session::builder()
            .map_err(|e| format!("Failed to create session builder: {}", e))?
            .with_intra_threads(2)
            .map_err(|e| format!("Failed to set threads: {}", e))?
            .commit_from_file(&model_path)
            .map_err(|e| format!("Failed to load pose model: {}", e))?;

        log::info!("Loaded pose model from {:?}", model_path);
        Ok(session)
    }

    /// Locate the models directory next to the executable or the cwd.
    fn find_model_dir() -> Result<PathBuf, String> {
        if let Ok(exe_path) = std::env::current_exe() {
            let mut dir = exe_path.parent().map(PathBuf::from);
            // Walk up a few levels to cover cargo run from target/{debug,release}.
            for _ in 0..3 {
                if let Some(d) = dir {
                    let model_dir = d.join("models");
                    if model_dir.exists() {
                        return Ok(model_dir);
                    }
                    dir = d.parent().map(PathBuf::from);
                } else {
                    break;
                }
            }
        }

        let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
        let model_dir = cwd.join("models");
        if model_dir.exists() {
            return Ok(model_dir);
        }

        Err("Models directory not found. Create a 'models' directory with pose_landmark.onnx.".to_string())
    }

    /// Run the landmark model on one frame.
    ///
    /// Returns the 33 skeletal landmarks scaled to frame pixels, or an
    /// empty list when no body clears the score threshold.
    fn run_landmarks(
        session: &mut ort::session::Session,
        frame: &FrameData,
    ) -> Result<Vec<Landmark>, String> {
        let input = Self::preprocess_nhwc(frame, INPUT_SIZE, INPUT_SIZE);

        let input_array = Array4::from_shape_vec(
            (1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3),
            input,
        )
        .map_err(|e| format!("Failed to create input array: {}", e))?;

        let input_tensor = ort::value::Tensor::from_array(input_array)
            .map_err(|e| format!("Failed to create tensor: {}", e))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| format!("Inference failed: {}", e))?;

        // The model emits a landmark tensor (39 x 5 floats, first 33 are
        // the skeleton) and a single-value pose score; match them by size.
        let mut raw_landmarks: Option<Vec<f32>> = None;
        let mut score: Option<f32> = None;
        for (_name, output) in outputs.iter() {
            let Ok((_shape, data)) = output.try_extract_tensor::<f32>() else {
                continue;
            };
            if data.len() >= LANDMARK_COUNT * LANDMARK_STRIDE {
                raw_landmarks = Some(data.to_vec());
            } else if data.len() == 1 {
                score = Some(data[0]);
            }
        }

        let raw = raw_landmarks.ok_or("No landmark output from pose model")?;
        if score.unwrap_or(1.0) < SCORE_THRESHOLD {
            return Ok(Vec::new());
        }

        // Model coordinates are in input-crop pixels; rescale to the frame.
        let sx = frame.width as f32 / INPUT_SIZE as f32;
        let sy = frame.height as f32 / INPUT_SIZE as f32;
        let landmarks = (0..LANDMARK_COUNT)
            .map(|i| Landmark {
                x: raw[i * LANDMARK_STRIDE] * sx,
                y: raw[i * LANDMARK_STRIDE + 1] * sy,
            })
            .collect();

        Ok(landmarks)
    }

    /// Resize to the model input and convert to NHWC float [0, 1].
    fn preprocess_nhwc(frame: &FrameData, target_width: u32, target_height: u32) -> Vec<f32> {
        let mut output = vec![0.0f32; (target_width * target_height * 3) as usize];

        let x_ratio = frame.width as f32 / target_width as f32;
        let y_ratio = frame.height as f32 / target_height as f32;

        for y in 0..target_height {
            for x in 0..target_width {
                let src_x = (x as f32 * x_ratio) as u32;
                let src_y = (y as f32 * y_ratio) as u32;
                let src_idx = ((src_y * frame.width + src_x) * 4) as usize;

                if src_idx + 2 < frame.data.len() {
                    let out_idx = ((y * target_width + x) * 3) as usize;
                    output[out_idx] = frame.data[src_idx] as f32 / 255.0;
                    output[out_idx + 1] = frame.data[src_idx + 1] as f32 / 255.0;
                    output[out_idx + 2] = frame.data[src_idx + 2] as f32 / 255.0;
                }
            }
        }

        output
    }

    /// Submit a frame for inference (non-blocking).
    pub fn process_frame(&self, frame: &[u8], width: u32, height: u32, frame_number: u64) {
        if let Some(ref sender) = self.frame_sender {
            let _ = sender.try_send(FrameData {
                data: frame.to_vec(),
                width,
                height,
                frame_number,
            });
        }
    }

    /// Latest landmark set produced by the inference thread.
    pub fn latest(&self) -> PoseResult {
        self.latest_result.lock().clone()
    }

    /// Whether the model loaded and the thread is serving results.
    pub fn is_ready(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&mut self) {
        // Dropping the sender ends the thread's recv loop.
        self.frame_sender = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PoseDetector {
    fn drop(&mut self) {
        self.stop();
    }
}
