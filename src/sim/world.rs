/// WorldState: the complete state of a running session.
///
/// ## Platform registry
///
/// Live platforms are owned by a single `PlatformRegistry`, keyed by
/// `PlatformId`. Ids are handed out in increasing order and never reused,
/// so iterating the registry visits platforms in insertion order. Removing
/// a platform is erasing its key; nothing else holds a reference to it.
///
/// ## Spawn anchor
///
/// `last_spawn_y` is the y of the most recently generated platform, as it
/// was when generated. Scrolling does not move it; only a new spawn does.

use std::collections::BTreeMap;

use crate::domain::entity::{Platform, PlatformId, Player};
use crate::domain::generator::PlatformGenerator;
use crate::domain::physics::{
    INITIAL_PLATFORM_Y, PLATFORM_W, SEEDED_PLATFORMS, SEED_ANCHOR_Y, VIEW_W,
};
use crate::domain::rules::BASE_PLATFORM_SPEED;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    Terminated,
}

#[derive(Clone, Debug, Default)]
pub struct PlatformRegistry {
    next_id: u32,
    live: BTreeMap<PlatformId, Platform>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, platform: Platform) -> PlatformId {
        let id = PlatformId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, platform);
        id
    }

    pub fn remove(&mut self, id: PlatformId) -> Option<Platform> {
        self.live.remove(&id)
    }

    /// Live platforms in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PlatformId, &Platform)> {
        self.live.iter().map(|(id, p)| (*id, p))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlatformId, &mut Platform)> {
        self.live.iter_mut().map(|(id, p)| (*id, p))
    }
}

// ── Inspection helpers for tests ──

#[cfg(test)]
impl PlatformRegistry {
    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.live.get(&id)
    }

    pub fn contains(&self, id: PlatformId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub platforms: PlatformRegistry,

    // ── Session ──
    /// Horizontal speed shared by every platform; set by the difficulty rule.
    pub platform_speed: f32,
    pub last_spawn_y: f32,
    pub phase: Phase,
    pub frame: u64,

    pub generator: PlatformGenerator,
}

impl WorldState {
    /// Startup layout: one centered platform near the bottom with the player
    /// standing on it, then a stack of seeded platforms above.
    pub fn new(generator: PlatformGenerator) -> Self {
        let initial = Platform::new(VIEW_W / 2.0 - PLATFORM_W / 2.0, INITIAL_PLATFORM_Y);
        let player = Player::standing_on(&initial);

        let mut world = WorldState {
            player,
            platforms: PlatformRegistry::new(),
            platform_speed: BASE_PLATFORM_SPEED,
            last_spawn_y: SEED_ANCHOR_Y,
            phase: Phase::Running,
            frame: 0,
            generator,
        };
        world.platforms.insert(initial);
        for _ in 0..SEEDED_PLATFORMS {
            world.spawn_platform();
        }
        world
    }

    /// Generate a platform above the spawn anchor, register it and move
    /// the anchor to it.
    pub fn spawn_platform(&mut self) -> PlatformId {
        let platform = self.generator.generate(self.last_spawn_y);
        self.last_spawn_y = platform.y;
        self.platforms.insert(platform)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// End the session from outside the simulation (quit request).
    pub fn terminate(&mut self) {
        self.phase = Phase::Terminated;
    }
}
