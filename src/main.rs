/// Entry point and game loop.

mod assets;
mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use assets::GameAssets;
use config::GameConfig;
use domain::generator::PlatformGenerator;
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::canvas::{compose, Canvas};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

fn main() {
    let config = GameConfig::load();
    logging::init(&config.log);
    log::info!("Bird Jumper starting at {} fps", config.fps);

    let source = assets::source_for(config.assets_dir.as_deref());
    let assets = match GameAssets::load(source.as_ref()) {
        Ok(a) => a,
        Err(e) => {
            log::error!("Asset load failed: {e}");
            eprintln!("Failed to load assets: {e}");
            std::process::exit(1);
        }
    };

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("Layout seed {seed}");
    let mut world = WorldState::new(PlatformGenerator::new(seed, config.spawn));

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        // Undo whatever part of the setup succeeded
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        std::process::exit(1);
    }

    let result = game_loop(&mut world, &mut renderer, &assets, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("Game error: {e}");
        eprintln!("Game error: {e}");
    }

    log::info!("Session over: score {}, {} frames", world.player.score, world.frame);
    println!();
    println!("Thanks for playing Bird Jumper!");
    println!("Final Score: {}", world.player.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    assets: &GameAssets,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new();
    if gp.connected {
        log::info!("Gamepad detected");
    }

    let mut canvas = Canvas::default();
    let frame_time = Duration::from_secs_f64(1.0 / config.fps as f64);
    let mut next_frame = Instant::now();

    while world.is_running() {
        // Frame pacing: wait out the rest of the frame, never catch up
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        }
        next_frame = next_frame.max(now) + frame_time;

        kb.drain_events();
        gp.update();

        if kb.quit_requested() || gp.quit_pressed() {
            log::info!("Quit requested at score {}", world.player.score);
            world.terminate();
            break;
        }

        let input = gp.merge_into(kb.frame_input());
        let events = step::step(world, input);
        log_events(world.frame, &events);

        if !world.is_running() {
            break;
        }

        compose(&mut canvas, world, assets);
        renderer.present(&canvas)?;
    }

    Ok(())
}

fn log_events(frame: u64, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Bounced { id, boost } => {
                log::trace!("[{frame}] bounce off {:?} (boost: {boost})", id);
            }
            GameEvent::PlatformBroken { id } => {
                log::debug!("[{frame}] temporary platform {:?} broke", id);
            }
            GameEvent::PlatformRecycled { culled, spawned } => {
                log::debug!("[{frame}] recycled {:?} -> {:?}", culled, spawned);
            }
            GameEvent::SpeedChanged { speed } => {
                log::info!("[{frame}] platform speed now {speed}");
            }
            GameEvent::PlayerFell { score } => {
                log::info!("[{frame}] player fell, final score {score}");
            }
        }
    }
}
