/// Keyboard input state tracker.
///
/// Tracks which keys are currently held down so movement continues for as
/// long as a key is held, and collects quit requests seen during the frame.
///
/// Uses Release events when the terminal's keyboard enhancement is active.
/// Falls back to timeout-based release detection on terminals that don't
/// report them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent drain.
    fresh_presses: Vec<KeyCode>,

    ctrl_c: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(8),
            fresh_presses: Vec::with_capacity(4),
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.apply(key, Instant::now()),
                Ok(Event::FocusLost) => self.last_active.clear(),
                _ => {}
            }
        }

        self.expire(Instant::now());
    }

    /// The movement this frame's simulation step should see.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
        }
    }

    /// Esc, `q` or Ctrl+C seen since the last drain.
    pub fn quit_requested(&self) -> bool {
        self.ctrl_c || self.any_pressed(KEYS_QUIT)
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.contains_key(&code)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    // ── Internal ──

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Unreliable without enhancement; timeout expiry handles it
            KeyEventKind::Release => {}
            _ => {
                if self.last_active.insert(key.code, now).is_none() {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Drop keys not refreshed within HOLD_TIMEOUT. With Release events
    /// honored, keys stay held until released.
    fn expire(&mut self, now: Instant) {
        if self.honor_release {
            return;
        }
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }
}
