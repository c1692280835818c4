/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Player physics (gravity, input, wrap)
///   2. Platform movement at the current shared speed
///   3. Difficulty (speed from score, applies from the next frame)
///   4. Bounce resolution (falling player vs platforms)
///   5. Scroll / recycle (world moves down while the player is high)
///   6. Fall check (player below the viewport ends the session)
///
/// Once the phase is `Terminated` every further call is a no-op.

use crate::domain::entity::{FrameInput, PlatformId};
use crate::domain::physics::{BOOST_JUMP_STRENGTH, JUMP_STRENGTH, SCROLL_LINE_Y, VIEW_H};
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Running { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame += 1;

    world.player.update(input);
    move_platforms(world);
    resolve_difficulty(world, &mut events);
    resolve_bounce(world, &mut events);
    resolve_scroll(world, &mut events);
    resolve_fall(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Platforms
// ══════════════════════════════════════════════════════════════

fn move_platforms(world: &mut WorldState) {
    let speed = world.platform_speed;
    for (_, platform) in world.platforms.iter_mut() {
        platform.update(speed);
    }
}

fn resolve_difficulty(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let speed = rules::platform_speed(world.player.score);
    if speed != world.platform_speed {
        world.platform_speed = speed;
        events.push(GameEvent::SpeedChanged { speed });
    }
}

// ══════════════════════════════════════════════════════════════
// Bounce
//
// Only a falling player can bounce. Candidates are checked in registry
// order and the first overlap wins, even if another platform overlaps
// more deeply.
// ══════════════════════════════════════════════════════════════

fn resolve_bounce(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.vy <= 0.0 { return; }

    let player_rect = world.player.rect();
    let hit = world.platforms.iter()
        .find(|(_, p)| player_rect.overlaps(&p.rect()))
        .map(|(id, p)| (id, p.boost, p.temporary));

    let (id, boost, temporary) = match hit { Some(h) => h, None => return };

    world.player.vy = if boost { BOOST_JUMP_STRENGTH } else { JUMP_STRENGTH };
    events.push(GameEvent::Bounced { id, boost });

    if temporary {
        world.platforms.remove(id);
        events.push(GameEvent::PlatformBroken { id });
    }
}

// ══════════════════════════════════════════════════════════════
// Scroll / recycle
//
// Instead of moving a camera, the player and platforms are pushed down by
// the player's current speed. The spawn anchor stays put, so replacements
// keep climbing from the last generated y. Every platform that ends up
// below the viewport is replaced by a fresh one above and scores one point.
// ══════════════════════════════════════════════════════════════

fn resolve_scroll(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.rect().top() >= SCROLL_LINE_Y { return; }

    let scroll = world.player.vy.abs();
    world.player.y += scroll;
    for (_, platform) in world.platforms.iter_mut() {
        platform.y += scroll;
    }

    let culled: Vec<PlatformId> = world.platforms.iter()
        .filter(|(_, p)| p.rect().top() > VIEW_H)
        .map(|(id, _)| id)
        .collect();

    for id in culled {
        world.platforms.remove(id);
        let spawned = world.spawn_platform();
        world.player.score += 1;
        events.push(GameEvent::PlatformRecycled { culled: id, spawned });
    }
}

// ══════════════════════════════════════════════════════════════
// Fall
// ══════════════════════════════════════════════════════════════

fn resolve_fall(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.rect().top() > VIEW_H {
        world.phase = Phase::Terminated;
        events.push(GameEvent::PlayerFell { score: world.player.score });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
