//! CPU compositor: tint, trails, particles.
//!
//! All drawing happens in place on the frame's RGBA buffer. Draw order is
//! part of the contract: background tint first, then trails, then
//! particles, so particles stay visually on top of the color wash.

use super::frame::{Color, Frame};
use super::gesture::GestureState;
use super::particles::Particle;
use super::trail::{Point2, Trail};
use crate::pose::{Landmark, LANDMARK_COUNT, POSE_CONNECTIONS};

const LABEL_X: i32 = 50;
const LABEL_Y: i32 = 100;
const LABEL_SCALE: i32 = 4;

const BONE_THICKNESS: i32 = 2;
const JOINT_RADIUS: i32 = 2;

/// Alpha-blend the full-frame color wash for a raised-hands state and draw
/// its label. `GestureState::None` leaves the frame untouched.
pub fn apply_tint(frame: &mut Frame, state: GestureState, alpha: f32) {
    let (color, label) = match state {
        GestureState::None => return,
        GestureState::Left => (Color::RED, "Left Hand Raised!"),
        GestureState::Right => (Color::BLUE, "Right Hand Raised!"),
        GestureState::Both => (Color::GREEN, "Both Hands Raised! POWER UP!"),
    };
    frame.blend_fill(color, alpha);
    draw_label(frame, label, LABEL_X, LABEL_Y, color, LABEL_SCALE);
}

/// Draw the detected skeleton over the frame: red bones first, green
/// joints on top. An incomplete landmark list draws nothing.
pub fn draw_skeleton(frame: &mut Frame, landmarks: &[Landmark]) {
    if landmarks.len() < LANDMARK_COUNT {
        return;
    }
    let point = |i: usize| Point2::new(landmarks[i].x, landmarks[i].y);
    for &(a, b) in &POSE_CONNECTIONS {
        draw_line(frame, point(a), point(b), Color::RED, BONE_THICKNESS);
    }
    for lm in &landmarks[..LANDMARK_COUNT] {
        fill_circle(
            frame,
            lm.x.round() as i32,
            lm.y.round() as i32,
            JOINT_RADIUS,
            Color::GREEN,
        );
    }
}

/// Draw one hand trail as connected segments, thickest at the newest
/// sample. Segments touching a not-visible sample are skipped, so a broken
/// trail renders as separate strokes rather than interpolating across the
/// gap.
pub fn draw_trail(frame: &mut Frame, trail: &Trail, color: Color) {
    let cap = trail.capacity() as f32;
    for i in 1..trail.len() {
        let (Some(prev), Some(curr)) = (trail.entry(i - 1), trail.entry(i)) else {
            continue;
        };
        let thickness = ((cap / (i as f32 + 1.0)).sqrt() * 3.0) as i32;
        draw_line(frame, prev, curr, color, thickness);
    }
}

/// Draw every active particle as a small filled disc.
pub fn draw_particles(frame: &mut Frame, particles: &[Particle], radius: i32) {
    for p in particles {
        fill_circle(
            frame,
            p.pos.x.round() as i32,
            p.pos.y.round() as i32,
            radius,
            p.color,
        );
    }
}

fn fill_circle(frame: &mut Frame, cx: i32, cy: i32, r: i32, color: Color) {
    if r <= 0 {
        frame.set_pixel(cx, cy, color);
        return;
    }
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                frame.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }
}

/// Bresenham line, stamped with a disc to get the requested stroke width.
fn draw_line(frame: &mut Frame, a: Point2, b: Point2, color: Color, thickness: i32) {
    let mut x0 = a.x.round() as i32;
    let mut y0 = a.y.round() as i32;
    let x1 = b.x.round() as i32;
    let y1 = b.y.round() as i32;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = thickness / 2;

    loop {
        fill_circle(frame, x0, y0, radius, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Render a label with the 3x5 bitmap font, scaled up `scale` times.
pub fn draw_label(frame: &mut Frame, text: &str, x: i32, y: i32, color: Color, scale: i32) {
    let mut cx = x;
    for ch in text.chars() {
        let rows = glyph(ch);
        for (row, &bits) in rows.iter().enumerate() {
            for col in 0..3i32 {
                if bits & (1u8 << (2 - col)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        frame.set_pixel(
                            cx + col * scale + sx,
                            y + row as i32 * scale + sy,
                            color,
                        );
                    }
                }
            }
        }
        cx += 4 * scale; // 3 columns plus a 1-column gap
    }
}

/// 3x5 glyphs for the characters the on-frame labels use; anything else
/// renders as a centered dot.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000; 5],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::trail::Trail;

    fn pattern_frame() -> Frame {
        let mut frame = Frame::new(16, 16);
        for x in 0..16 {
            frame.set_pixel(x, x, Color::new(x as u8 * 10, 128, 200));
        }
        frame
    }

    #[test]
    fn test_tint_none_leaves_frame_untouched() {
        let mut frame = pattern_frame();
        let before = frame.data().to_vec();
        apply_tint(&mut frame, GestureState::None, 0.4);
        assert_eq!(frame.data(), before.as_slice());
    }

    #[test]
    fn test_tint_blends_whole_frame() {
        let mut frame = Frame::new(8, 8);
        apply_tint(&mut frame, GestureState::Right, 0.4);
        // Black * 0.6 + blue * 0.4 on every pixel (label is off-frame at 8x8).
        for px in frame.data().chunks_exact(4) {
            assert_eq!(px[0], 0);
            assert_eq!(px[1], 0);
            assert_eq!(px[2], 102);
        }
    }

    #[test]
    fn test_tint_left_is_red_both_is_green() {
        let mut frame = Frame::new(4, 4);
        apply_tint(&mut frame, GestureState::Left, 1.0);
        assert_eq!(frame.data()[0], 255);

        let mut frame = Frame::new(4, 4);
        apply_tint(&mut frame, GestureState::Both, 1.0);
        assert_eq!(frame.data()[1], 255);
    }

    #[test]
    fn test_particle_disc_is_drawn() {
        let mut frame = Frame::new(32, 32);
        let particles = [Particle {
            pos: Point2::new(16.4, 16.4),
            vel: Point2::new(0.0, 0.0),
            life: 5,
            color: Color::CYAN,
        }];
        draw_particles(&mut frame, &particles, 3);

        let at = |x: u32, y: u32| {
            let idx = ((y * 32 + x) * 4) as usize;
            &frame.data()[idx..idx + 3]
        };
        assert_eq!(at(16, 16), &[0, 255, 255]);
        assert_eq!(at(19, 16), &[0, 255, 255]); // radius 3 reaches here
        assert_eq!(at(20, 16), &[0, 0, 0]); // but not past it
    }

    #[test]
    fn test_trail_segment_with_absent_endpoint_is_skipped() {
        let mut trail = Trail::new(30);
        trail.push(Some(Point2::new(2.0, 2.0)));
        trail.push(None);
        trail.push(Some(Point2::new(28.0, 2.0)));

        let mut frame = Frame::new(32, 8);
        draw_trail(&mut frame, &trail, Color::MAGENTA);
        assert!(frame.data().iter().all(|&b| b == 0 || b == 255));
        // Both segments touch the absent sample, so nothing is drawn.
        assert!(frame
            .data()
            .chunks_exact(4)
            .all(|px| px[0] == 0 && px[2] == 0));
    }

    #[test]
    fn test_skeleton_bones_red_joints_green() {
        let mut lms = vec![Landmark::default(); LANDMARK_COUNT];
        lms[11] = Landmark { x: 10.0, y: 40.0 };
        lms[12] = Landmark { x: 50.0, y: 40.0 };

        let mut frame = Frame::new(64, 64);
        draw_skeleton(&mut frame, &lms);

        let at = |x: u32, y: u32| {
            let idx = ((y * 64 + x) * 4) as usize;
            &frame.data()[idx..idx + 3]
        };
        // Midpoint of the shoulder bone is a red connection pixel.
        assert_eq!(at(30, 40), &[255, 0, 0]);
        // The joints themselves are drawn green on top of the bones.
        assert_eq!(at(10, 40), &[0, 255, 0]);
        assert_eq!(at(50, 40), &[0, 255, 0]);
    }

    #[test]
    fn test_skeleton_needs_full_body() {
        let mut frame = pattern_frame();
        let before = frame.data().to_vec();
        draw_skeleton(&mut frame, &[]);
        let short = vec![Landmark::default(); LANDMARK_COUNT - 1];
        draw_skeleton(&mut frame, &short);
        assert_eq!(frame.data(), before.as_slice());
    }

    #[test]
    fn test_fps_label_renders_digits() {
        let mut frame = Frame::new(128, 64);
        draw_label(&mut frame, "FPS: 60", 10, 10, Color::GREEN, 3);
        assert!(frame.data().chunks_exact(4).any(|px| px[1] == 255));
    }

    #[test]
    fn test_trail_draws_between_present_samples() {
        let mut trail = Trail::new(30);
        trail.push(Some(Point2::new(4.0, 8.0)));
        trail.push(Some(Point2::new(24.0, 8.0)));

        let mut frame = Frame::new(32, 16);
        draw_trail(&mut frame, &trail, Color::CYAN);
        let idx = ((8 * 32 + 14) * 4) as usize;
        assert_eq!(frame.data()[idx + 1], 255);
        assert_eq!(frame.data()[idx + 2], 255);
    }
}
