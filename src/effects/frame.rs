//! RGBA frame buffer that the compositor draws into.

/// Solid RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
}

/// Owned RGBA pixel buffer (4 bytes per pixel, row-major).
///
/// The effects engine mutates one of these in place each frame; nothing
/// here persists across frames.
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Create an opaque black frame.
    pub fn new(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self { data, width, height }
    }

    /// Wrap an existing RGBA buffer. Returns `None` if the buffer length
    /// does not match the dimensions.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if data.len() != (width * height * 4) as usize {
            return None;
        }
        Some(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }

    /// Write a single pixel; coordinates outside the frame are clipped.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.data[idx] = color.r;
        self.data[idx + 1] = color.g;
        self.data[idx + 2] = color.b;
    }

    /// Alpha-blend a solid color over the whole frame.
    /// `alpha` = 0.0 leaves the frame unchanged, 1.0 replaces it.
    pub fn blend_fill(&mut self, color: Color, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let keep = 1.0 - alpha;
        for px in self.data.chunks_exact_mut(4) {
            px[0] = (px[0] as f32 * keep + color.r as f32 * alpha) as u8;
            px[1] = (px[1] as f32 * keep + color.g as f32 * alpha) as u8;
            px[2] = (px[2] as f32 * keep + color.b as f32 * alpha) as u8;
        }
    }

    /// Mirror the frame horizontally in place.
    pub fn flip_horizontal(&mut self) {
        if self.width == 0 {
            return;
        }
        let w = self.width as usize;
        for row in self.data.chunks_exact_mut(w * 4) {
            let (mut i, mut j) = (0usize, w - 1);
            while i < j {
                for c in 0..4 {
                    row.swap(i * 4 + c, j * 4 + c);
                }
                i += 1;
                j -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_clips() {
        let mut frame = Frame::new(4, 4);
        frame.set_pixel(-1, 0, Color::RED);
        frame.set_pixel(0, 4, Color::RED);
        frame.set_pixel(4, 0, Color::RED);
        assert!(frame.data().chunks_exact(4).all(|px| px[0] == 0));

        frame.set_pixel(2, 1, Color::RED);
        let idx = (1 * 4 + 2) * 4;
        assert_eq!(frame.data()[idx], 255);
        assert_eq!(frame.data()[idx + 1], 0);
    }

    #[test]
    fn test_blend_fill() {
        let mut frame = Frame::new(2, 2);
        frame.blend_fill(Color::new(100, 200, 50), 0.4);
        let px = &frame.data()[..4];
        assert_eq!(px[0], 40);
        assert_eq!(px[1], 80);
        assert_eq!(px[2], 20);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_flip_horizontal() {
        let mut frame = Frame::new(3, 1);
        frame.set_pixel(0, 0, Color::RED);
        frame.set_pixel(2, 0, Color::BLUE);
        frame.flip_horizontal();
        assert_eq!(frame.data()[0], 0); // blue now leftmost
        assert_eq!(frame.data()[2], 255);
        assert_eq!(frame.data()[8], 255); // red now rightmost
    }

    #[test]
    fn test_flip_zero_width_frame_is_noop() {
        let mut frame = Frame::new(0, 4);
        frame.flip_horizontal();
        assert!(frame.data().is_empty());
    }

    #[test]
    fn test_from_rgba_length_check() {
        assert!(Frame::from_rgba(vec![0u8; 16], 2, 2).is_some());
        assert!(Frame::from_rgba(vec![0u8; 15], 2, 2).is_none());
    }
}
