/// Entities: Player and Platform, plus the per-frame input they react to.
/// Each entity owns its own update rule; cross-entity rules (bounce,
/// scroll) live in `sim::step`.

use super::physics::{
    Rect, GRAVITY, PLATFORM_H, PLATFORM_W, PLAYER_H, PLAYER_MOVE_SPEED, PLAYER_W, VIEW_W,
};

/// Horizontal travel direction of a platform.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Frame input: which movement directions are held this frame.
/// Both held at once cancel out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
}

/// Registry key of a live platform. Allocated in increasing order, so
/// ordering by id is insertion order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PlatformId(pub u32);

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub score: u32,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player { x, y, vy: 0.0, score: 0 }
    }

    /// Place the player so its bottom-center sits on the platform's top-center.
    pub fn standing_on(platform: &Platform) -> Self {
        let r = platform.rect();
        Player::new(r.x + r.w / 2.0 - PLAYER_W / 2.0, r.top() - PLAYER_H)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_W, PLAYER_H)
    }

    /// Advance one frame: gravity first, then position (semi-implicit
    /// Euler), then horizontal input and wrap-around.
    pub fn update(&mut self, input: FrameInput) {
        self.vy += GRAVITY;
        self.y += self.vy;

        if input.left {
            self.x -= PLAYER_MOVE_SPEED;
        }
        if input.right {
            self.x += PLAYER_MOVE_SPEED;
        }

        // Exiting one side re-enters on the other
        if self.x + PLAYER_W > VIEW_W {
            self.x = 0.0;
        }
        if self.x < 0.0 {
            self.x = VIEW_W - PLAYER_W;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    /// Destroyed right after granting a bounce.
    pub temporary: bool,
    /// Grants the stronger bounce.
    pub boost: bool,
}

impl Platform {
    pub fn new(x: f32, y: f32) -> Self {
        Platform {
            x,
            y,
            direction: Direction::Right,
            temporary: false,
            boost: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLATFORM_W, PLATFORM_H)
    }

    /// Slide horizontally by `speed` and bounce off the viewport edges.
    /// Returns true if the direction flipped this frame.
    pub fn update(&mut self, speed: f32) -> bool {
        self.x += self.direction.sign() * speed;

        if self.x + PLATFORM_W >= VIEW_W || self.x <= 0.0 {
            self.direction = self.direction.flipped();
            self.x = self.x.clamp(0.0, VIEW_W - PLATFORM_W);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::physics::{JUMP_STRENGTH, PLATFORM_W, VIEW_W};
    use proptest::prelude::*;

    #[test]
    fn gravity_accumulates_each_frame() {
        let mut p = Player::new(100.0, 100.0);
        p.update(FrameInput::default());
        assert_eq!(p.vy, 0.5);
        assert_eq!(p.y, 100.5);
        p.update(FrameInput::default());
        assert_eq!(p.vy, 1.0);
        assert_eq!(p.y, 101.5);
    }

    #[test]
    fn velocity_applied_after_gravity() {
        let mut p = Player::new(100.0, 300.0);
        p.vy = JUMP_STRENGTH;
        p.update(FrameInput::default());
        assert_eq!(p.vy, -18.5);
        assert_eq!(p.y, 281.5);
    }

    #[test]
    fn horizontal_input() {
        let mut p = Player::new(100.0, 100.0);
        p.update(FrameInput { left: true, right: false });
        assert_eq!(p.x, 95.0);
        p.update(FrameInput { left: false, right: true });
        assert_eq!(p.x, 100.0);
        p.update(FrameInput { left: true, right: true });
        assert_eq!(p.x, 100.0);
    }

    #[test]
    fn wraps_right_to_left() {
        let mut p = Player::new(VIEW_W - PLAYER_W - 2.0, 100.0);
        p.update(FrameInput { left: false, right: true });
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn wraps_left_to_right() {
        let mut p = Player::new(2.0, 100.0);
        p.update(FrameInput { left: true, right: false });
        assert_eq!(p.x, VIEW_W - PLAYER_W);
    }

    #[test]
    fn standing_on_platform() {
        let plat = Platform::new(210.0, 550.0);
        let p = Player::standing_on(&plat);
        assert_eq!(p.x, 230.0);
        assert_eq!(p.y, 510.0);
        assert_eq!(p.score, 0);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn platform_moves_by_speed() {
        let mut plat = Platform::new(100.0, 0.0);
        assert!(!plat.update(4.0));
        assert_eq!(plat.x, 104.0);
        plat.direction = Direction::Left;
        assert!(!plat.update(6.0));
        assert_eq!(plat.x, 98.0);
    }

    #[test]
    fn platform_flips_at_right_edge() {
        let mut plat = Platform::new(VIEW_W - PLATFORM_W - 4.0, 0.0);
        assert!(plat.update(4.0));
        assert_eq!(plat.direction, Direction::Left);
        assert_eq!(plat.x, VIEW_W - PLATFORM_W);
        assert!(!plat.update(4.0));
        assert_eq!(plat.x, VIEW_W - PLATFORM_W - 4.0);
    }

    #[test]
    fn platform_flips_at_left_edge_and_clamps() {
        let mut plat = Platform::new(2.0, 0.0);
        plat.direction = Direction::Left;
        assert!(plat.update(5.0));
        assert_eq!(plat.direction, Direction::Right);
        assert_eq!(plat.x, 0.0);
    }

    #[test]
    fn new_platform_defaults() {
        let plat = Platform::new(20.0, 40.0);
        assert_eq!(plat.direction, Direction::Right);
        assert!(!plat.temporary);
        assert!(!plat.boost);
    }

    proptest! {
        #[test]
        fn player_stays_inside_viewport(x in 0.0f32..(VIEW_W - PLAYER_W), left: bool, right: bool) {
            let mut p = Player::new(x, 100.0);
            p.update(FrameInput { left, right });
            prop_assert!(p.x >= 0.0);
            prop_assert!(p.x + PLAYER_W <= VIEW_W);
        }

        #[test]
        fn flip_keeps_platform_in_bounds(x in 0.0f32..(VIEW_W - PLATFORM_W), speed in 4.0f32..=6.0, left: bool) {
            let mut plat = Platform::new(x, 0.0);
            if left { plat.direction = Direction::Left; }
            let before = plat.direction;
            let flipped = plat.update(speed);
            if flipped {
                prop_assert_eq!(plat.direction, before.flipped());
                prop_assert!(plat.x >= 0.0 && plat.x <= VIEW_W - PLATFORM_W);
            } else {
                prop_assert_eq!(plat.direction, before);
            }
            // Speed magnitude is unaffected by a flip
            prop_assert_eq!(plat.direction.sign().abs(), 1.0);
        }
    }
}
