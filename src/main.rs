//! Gesture FX - main entry point.
//!
//! Frame loop: grab the latest webcam frame, mirror it, feed the pose
//! detector, run the effects engine over the frame, and present it in a
//! software-rendered window. Frames are processed one at a time; the
//! effects engine never sees two frames concurrently.

use std::time::{Duration, Instant};

use gesture_fx::camera::CameraCapture;
use gesture_fx::effects::{compositor, Color, EffectsConfig, Frame, GestureState, VisualEffects};
use gesture_fx::pose::PoseDetector;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

const WINDOW_TITLE: &str = "Gesture FX";
const CAMERA_INDEX: u32 = 0;
const CAMERA_WIDTH: u32 = 1280;
const CAMERA_HEIGHT: u32 = 720;
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
const FPS_LABEL_POS: (i32, i32) = (10, 50);
const FPS_LABEL_SCALE: i32 = 3;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Gesture FX v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    for cam in CameraCapture::list_cameras() {
        log::info!("Camera {}: {}", cam.index, cam.name);
    }

    let mut capture = CameraCapture::new(CAMERA_INDEX, CAMERA_WIDTH, CAMERA_HEIGHT)?;

    // The camera decides the actual resolution; wait for the first frame
    // to size the window.
    let first = wait_for_first_frame(&capture)?;
    let (width, height) = (first.width, first.height);
    log::info!("Streaming at {}x{}", width, height);

    let pose = PoseDetector::new()?;
    let mut effects = VisualEffects::new(EffectsConfig::default());

    let mut window = Window::new(
        WINDOW_TITLE,
        width as usize,
        height as usize,
        WindowOptions::default(),
    )
    .map_err(|e| e.to_string())?;
    window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

    log::info!("Press ESC to exit, S to save a snapshot");

    let mut display = vec![0u32; (width * height) as usize];
    let mut last_frame_number = u64::MAX;
    let mut last_state = GestureState::None;
    let mut snapshot_count = 0u32;
    let mut fps_frames = 0u32;
    let mut fps_marker = Instant::now();
    let mut prev_processed = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if let Some(cam) = capture.latest_frame() {
            if cam.frame_number != last_frame_number {
                last_frame_number = cam.frame_number;

                if cam.width != width || cam.height != height {
                    log::warn!(
                        "Dropping frame with unexpected size {}x{}",
                        cam.width,
                        cam.height
                    );
                } else if let Some(mut frame) = Frame::from_rgba(cam.data, cam.width, cam.height) {
                    // Mirror so on-screen motion matches the user's.
                    frame.flip_horizontal();

                    pose.process_frame(frame.data(), width, height, cam.frame_number);
                    let landmarks = pose.latest().landmarks;

                    let state = effects.apply(&mut frame, &landmarks);
                    if state != last_state {
                        log::info!("Gesture state: {:?}", state);
                        last_state = state;
                    }

                    // Skeleton overlay and FPS counter go on top of the
                    // effects, like the rest of the on-frame feedback.
                    compositor::draw_skeleton(&mut frame, &landmarks);

                    let now = Instant::now();
                    let dt = now.duration_since(prev_processed).as_secs_f32();
                    prev_processed = now;
                    let fps = if dt > 0.0 { (1.0 / dt) as u32 } else { 0 };
                    compositor::draw_label(
                        &mut frame,
                        &format!("FPS: {}", fps),
                        FPS_LABEL_POS.0,
                        FPS_LABEL_POS.1,
                        Color::GREEN,
                        FPS_LABEL_SCALE,
                    );

                    pack_rgba(frame.data(), &mut display);

                    if window.is_key_pressed(Key::S, KeyRepeat::No) {
                        snapshot_count += 1;
                        save_snapshot(&frame, snapshot_count)?;
                    }

                    fps_frames += 1;
                    if fps_marker.elapsed() >= Duration::from_secs(1) {
                        log::info!(
                            "{} fps, {} particles",
                            fps_frames,
                            effects.particles().len()
                        );
                        fps_frames = 0;
                        fps_marker = Instant::now();
                    }
                }
            }
        }

        window
            .update_with_buffer(&display, width as usize, height as usize)
            .map_err(|e| e.to_string())?;
    }

    capture.stop();
    Ok(())
}

fn wait_for_first_frame(
    capture: &CameraCapture,
) -> Result<gesture_fx::camera::CameraFrame, String> {
    let start = Instant::now();
    loop {
        if let Some(frame) = capture.latest_frame() {
            return Ok(frame);
        }
        if start.elapsed() > FIRST_FRAME_TIMEOUT {
            return Err("Timed out waiting for the first camera frame".to_string());
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// RGBA bytes to the 0RGB u32 layout minifb expects.
fn pack_rgba(rgba: &[u8], out: &mut [u32]) {
    for (px, slot) in rgba.chunks_exact(4).zip(out.iter_mut()) {
        *slot = ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32;
    }
}

fn save_snapshot(frame: &Frame, count: u32) -> Result<(), String> {
    let path = format!("gesture-fx-{:03}.png", count);
    let img = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Snapshot buffer size mismatch")?;
    img.save(&path).map_err(|e| e.to_string())?;
    log::info!("Saved {}", path);
    Ok(())
}
