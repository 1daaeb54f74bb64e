//! Bounded per-hand motion histories.
//!
//! Each tracked hand keeps a short, most-recent-first trail of positions.
//! Pushing a new sample past capacity evicts the oldest one. A hand that
//! moved further than the motion threshold between its two newest samples
//! raises a motion burst, which the particle system turns into a spray.

use super::frame::Color;

/// Pixel position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A burst request produced by fast hand motion.
#[derive(Clone, Copy, Debug)]
pub struct MotionBurst {
    pub pos: Point2,
    pub color: Color,
}

/// Fixed-capacity ring buffer of trail samples, most-recent-first.
///
/// An entry of `None` means the hand was not visible that frame; it still
/// occupies a slot so the trail stays aligned with frame time.
pub struct Trail {
    slots: Box<[Option<Point2>]>,
    head: usize,
    len: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "trail needs room for two samples");
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a sample to the front, evicting the oldest at capacity.
    pub fn push(&mut self, point: Option<Point2>) {
        let cap = self.slots.len();
        self.head = (self.head + cap - 1) % cap;
        self.slots[self.head] = point;
        if self.len < cap {
            self.len += 1;
        }
    }

    /// Sample at recency index `i` (0 = newest). Out-of-range indices and
    /// not-visible samples both read as `None`.
    pub fn entry(&self, i: usize) -> Option<Point2> {
        if i >= self.len {
            return None;
        }
        self.slots[(self.head + i) % self.slots.len()]
    }

    /// Iterate samples most-recent-first.
    pub fn iter(&self) -> impl Iterator<Item = Option<Point2>> + '_ {
        (0..self.len).map(move |i| self.slots[(self.head + i) % self.slots.len()])
    }
}

/// The two hand trails plus the motion-burst trigger.
pub struct TrailStore {
    left: Trail,
    right: Trail,
    left_color: Color,
    right_color: Color,
    motion_threshold: f32,
}

impl TrailStore {
    pub fn new(
        capacity: usize,
        motion_threshold: f32,
        left_color: Color,
        right_color: Color,
    ) -> Self {
        Self {
            left: Trail::new(capacity),
            right: Trail::new(capacity),
            left_color,
            right_color,
            motion_threshold,
        }
    }

    /// Push this frame's wrist samples and report any motion bursts.
    pub fn update(
        &mut self,
        left: Option<Point2>,
        right: Option<Point2>,
    ) -> [Option<MotionBurst>; 2] {
        [
            Self::push_hand(&mut self.left, left, self.left_color, self.motion_threshold),
            Self::push_hand(&mut self.right, right, self.right_color, self.motion_threshold),
        ]
    }

    fn push_hand(
        trail: &mut Trail,
        point: Option<Point2>,
        color: Color,
        threshold: f32,
    ) -> Option<MotionBurst> {
        trail.push(point);
        // Compare only the two newest samples. If either is not visible
        // the trail was broken and no burst fires.
        let curr = trail.entry(0)?;
        let prev = trail.entry(1)?;
        if curr.distance(prev) > threshold {
            Some(MotionBurst { pos: curr, color })
        } else {
            None
        }
    }

    pub fn left(&self) -> &Trail {
        &self.left
    }

    pub fn right(&self) -> &Trail {
        &self.right
    }

    pub fn left_color(&self) -> Color {
        self.left_color
    }

    pub fn right_color(&self) -> Color {
        self.right_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> Option<Point2> {
        Some(Point2::new(x, y))
    }

    fn store() -> TrailStore {
        TrailStore::new(30, 5.0, Color::MAGENTA, Color::CYAN)
    }

    #[test]
    fn test_trail_capacity_bound() {
        let mut trail = Trail::new(30);
        for i in 0..45 {
            trail.push(pt(i as f32, 0.0));
            assert!(trail.len() <= 30);
        }
        assert_eq!(trail.len(), 30);
        // Most-recent-first: newest is 44, oldest surviving is 15.
        assert_eq!(trail.entry(0), Some(Point2::new(44.0, 0.0)));
        assert_eq!(trail.entry(29), Some(Point2::new(15.0, 0.0)));
        let collected: Vec<_> = trail.iter().collect();
        assert_eq!(collected.len(), 30);
        assert_eq!(collected[1], Some(Point2::new(43.0, 0.0)));
    }

    #[test]
    #[should_panic(expected = "two samples")]
    fn test_trail_rejects_capacity_below_two() {
        Trail::new(1);
    }

    #[test]
    fn test_trail_keeps_absent_slots() {
        let mut trail = Trail::new(4);
        trail.push(pt(1.0, 1.0));
        trail.push(None);
        trail.push(pt(2.0, 2.0));
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.entry(0), Some(Point2::new(2.0, 2.0)));
        assert_eq!(trail.entry(1), None);
        assert_eq!(trail.entry(2), Some(Point2::new(1.0, 1.0)));
    }

    #[test]
    fn test_burst_requires_both_samples_present() {
        let mut trails = store();
        trails.update(pt(0.0, 0.0), None);
        let bursts = trails.update(None, pt(100.0, 100.0));
        assert!(bursts[0].is_none());
        assert!(bursts[1].is_none());
        // Regained tracking far away: previous sample is absent, no burst.
        let bursts = trails.update(pt(200.0, 200.0), None);
        assert!(bursts[0].is_none());
        assert!(bursts[1].is_none());
    }

    #[test]
    fn test_burst_threshold_is_strict() {
        let mut trails = store();
        trails.update(pt(0.0, 0.0), pt(0.0, 0.0));
        // 3-4-5 triangle: distance exactly 5 does not fire.
        let bursts = trails.update(pt(3.0, 4.0), pt(0.0, 0.0));
        assert!(bursts[0].is_none());
        // Distance 10 fires, tagged with the hand color at the new position.
        let bursts = trails.update(pt(9.0, 12.0), pt(0.0, 0.0));
        let burst = bursts[0].expect("burst should fire above threshold");
        assert_eq!(burst.pos, Point2::new(9.0, 12.0));
        assert_eq!(burst.color, Color::MAGENTA);
        assert!(bursts[1].is_none());
    }

    #[test]
    fn test_right_hand_burst_color() {
        let mut trails = store();
        trails.update(None, pt(0.0, 0.0));
        let bursts = trails.update(None, pt(20.0, 0.0));
        assert_eq!(bursts[1].expect("right burst").color, Color::CYAN);
    }

    #[test]
    fn test_first_sample_never_bursts() {
        let mut trails = store();
        let bursts = trails.update(pt(500.0, 500.0), pt(500.0, 500.0));
        assert!(bursts[0].is_none());
        assert!(bursts[1].is_none());
    }
}
