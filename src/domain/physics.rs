/// Physics layer: world geometry constants and bounding-box queries.
///
/// ## Coordinates
///
/// Logical canvas of `VIEW_W` x `VIEW_H` pixels, origin top-left, y grows
/// downward. Every entity position is the top-left corner of its box.
/// A negative vertical velocity moves upward.
///
/// ## Timestep
///
/// One simulation step per rendered frame. Velocities are pixels/frame and
/// are never scaled by elapsed time.

// ── Viewport ──

pub const VIEW_W: f32 = 500.0;
pub const VIEW_H: f32 = 700.0;

// ── Player ──

pub const PLAYER_W: f32 = 40.0;
pub const PLAYER_H: f32 = 40.0;
/// Horizontal displacement per frame while a direction is held.
pub const PLAYER_MOVE_SPEED: f32 = 5.0;
/// Added to vertical velocity every frame.
pub const GRAVITY: f32 = 0.5;
/// Velocity after bouncing off a normal platform.
pub const JUMP_STRENGTH: f32 = -19.0;
/// Velocity after bouncing off a boost platform.
pub const BOOST_JUMP_STRENGTH: f32 = -36.0;

// ── Platforms ──

pub const PLATFORM_W: f32 = 80.0;
pub const PLATFORM_H: f32 = 10.0;
pub const VERTICAL_SPACING: f32 = 60.0;
pub const HORIZONTAL_PADDING: i32 = 20;

// ── Layout ──

/// y of the platform the player starts on.
pub const INITIAL_PLATFORM_Y: f32 = VIEW_H - 150.0;
/// Anchor the first seeded platform is generated from.
pub const SEED_ANCHOR_Y: f32 = VIEW_H - 120.0;
/// Platforms stacked above the initial one at startup.
pub const SEEDED_PLATFORMS: usize = 10;
/// The world scrolls while the player's top edge is above this line.
pub const SCROLL_LINE_Y: f32 = VIEW_H / 4.0;

/// Axis-aligned box. `(x, y)` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes() {
        let a = Rect::new(0.0, 0.0, 40.0, 40.0);
        let b = Rect::new(30.0, 35.0, 80.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let player = Rect::new(0.0, 0.0, 40.0, 40.0);
        let below = Rect::new(0.0, 40.0, 80.0, 10.0);
        let beside = Rect::new(40.0, 0.0, 80.0, 10.0);
        assert!(!player.overlaps(&below));
        assert!(!player.overlaps(&beside));
    }

    #[test]
    fn disjoint_boxes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(100.0, 100.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn layout_constants() {
        assert_eq!(INITIAL_PLATFORM_Y, 550.0);
        assert_eq!(SEED_ANCHOR_Y, 580.0);
        assert_eq!(SCROLL_LINE_Y, 175.0);
        assert!(JUMP_STRENGTH < 0.0);
        assert!(BOOST_JUMP_STRENGTH < JUMP_STRENGTH);
    }
}
