/// Gamepad input tracker using gilrs.
///
/// Fixed mapping:
///   D-pad / Left Stick    →  Move left / right
///   Select                →  Quit
///
/// Without the `gamepad` feature this compiles to an always-idle tracker.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::domain::entity::FrameInput;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    dpad_left: bool,
    dpad_right: bool,
    stick_x: f32,
    quit_pressed: bool,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("Gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            quit_pressed: false,
            connected,
        }
    }

    /// Drain pending gamepad events. Call once per frame.
    pub fn update(&mut self) {
        self.quit_pressed = false;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick_x = value;
                }
                EventType::Connected => {
                    log::info!("Gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("Gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        match btn {
            Button::DPadLeft => self.dpad_left = held,
            Button::DPadRight => self.dpad_right = held,
            Button::Select if held => self.quit_pressed = true,
            _ => {}
        }
    }

    // ── Queries ──

    pub fn left_held(&self) -> bool {
        self.dpad_left || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.dpad_right || self.stick_x > STICK_DEADZONE
    }

    pub fn quit_pressed(&self) -> bool {
        self.quit_pressed
    }

    /// Merge this pad's movement into keyboard input.
    pub fn merge_into(&self, input: FrameInput) -> FrameInput {
        FrameInput {
            left: input.left || self.left_held(),
            right: input.right || self.right_held(),
        }
    }

    // ── Internal ──

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.dpad_left = false;
        self.dpad_right = false;
        self.stick_x = 0.0;
        self.quit_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> GamepadState {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            quit_pressed: false,
            connected: false,
        }
    }

    #[test]
    fn stick_respects_deadzone() {
        let mut pad = idle();
        pad.stick_x = -0.2;
        assert!(!pad.left_held());
        pad.stick_x = -0.6;
        assert!(pad.left_held());
        assert!(!pad.right_held());
        pad.stick_x = 0.9;
        assert!(pad.right_held());
    }

    #[test]
    fn merge_keeps_keyboard_input() {
        let mut pad = idle();
        pad.dpad_right = true;
        let merged = pad.merge_into(FrameInput { left: true, right: false });
        assert_eq!(merged, FrameInput { left: true, right: true });
    }

    #[test]
    fn release_all_clears_state() {
        let mut pad = idle();
        pad.dpad_left = true;
        pad.stick_x = 1.0;
        pad.quit_pressed = true;
        pad.release_all();
        assert!(!pad.left_held() && !pad.right_held() && !pad.quit_pressed());
    }

    #[cfg(feature = "gamepad")]
    #[test]
    fn select_requests_quit() {
        let mut pad = idle();
        pad.set_button(Button::Select, true);
        assert!(pad.quit_pressed());
        pad.update();
        assert!(!pad.quit_pressed());
    }
}
