use macroquad::prelude::*;

use crate::input::touch::{PointerId, PointerPhase, PointerSample, VirtualJoystick};
use crate::input::{combine_keyboard, InputVector};

/// Non-movement commands read from the devices this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    ToggleDebug,
    ToggleQuestLog,
    TurnInQuest,
    Logout,
}

/// Unifies keyboard, touch and mouse-drag input into one movement vector
/// per tick.
///
/// Precedence is absolute: while the virtual joystick is held it owns
/// movement and the keyboard is ignored entirely, so a key left wedged
/// down cannot fight a drag.
pub struct InputAggregator {
    joystick: VirtualJoystick,
}

impl InputAggregator {
    pub fn new(dead_zone: f32, max_distance: f32) -> Self {
        Self {
            joystick: VirtualJoystick::new(dead_zone, max_distance),
        }
    }

    /// Read all devices and produce the tick's movement vector.
    pub fn poll_movement(&mut self) -> InputVector {
        let samples = collect_pointer_samples();
        self.joystick.update(&samples);

        if self.joystick.is_active() {
            return self.joystick.get_input();
        }

        let up = is_key_down(KeyCode::W) || is_key_down(KeyCode::Up);
        let down = is_key_down(KeyCode::S) || is_key_down(KeyCode::Down);
        let left = is_key_down(KeyCode::A) || is_key_down(KeyCode::Left);
        let right = is_key_down(KeyCode::D) || is_key_down(KeyCode::Right);

        combine_keyboard(up, down, left, right)
    }

    /// One-shot UI commands for this tick.
    pub fn poll_commands(&self) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        if is_key_pressed(KeyCode::F3) {
            commands.push(UiCommand::ToggleDebug);
        }
        if is_key_pressed(KeyCode::Q) {
            commands.push(UiCommand::ToggleQuestLog);
        }
        if is_key_pressed(KeyCode::E) {
            commands.push(UiCommand::TurnInQuest);
        }
        if is_key_pressed(KeyCode::Escape) {
            commands.push(UiCommand::Logout);
        }
        commands
    }

    pub fn render_overlay(&self) {
        self.joystick.render();
    }
}

/// Gather this tick's pointer observations from the touch screen and the
/// mouse. A device that yields nothing simply contributes no samples.
fn collect_pointer_samples() -> Vec<PointerSample> {
    let mut samples: Vec<PointerSample> = touches()
        .iter()
        .map(|touch| {
            let phase = match touch.phase {
                TouchPhase::Started => PointerPhase::Started,
                TouchPhase::Moved | TouchPhase::Stationary => PointerPhase::Moved,
                TouchPhase::Ended | TouchPhase::Cancelled => PointerPhase::Ended,
            };
            PointerSample {
                id: PointerId::Touch(touch.id),
                phase,
                position: touch.position,
            }
        })
        .collect();

    let mouse_pos = Vec2::from(mouse_position());
    if is_mouse_button_pressed(MouseButton::Left) {
        samples.push(PointerSample {
            id: PointerId::Mouse,
            phase: PointerPhase::Started,
            position: mouse_pos,
        });
    } else if is_mouse_button_down(MouseButton::Left) {
        samples.push(PointerSample {
            id: PointerId::Mouse,
            phase: PointerPhase::Moved,
            position: mouse_pos,
        });
    } else if is_mouse_button_released(MouseButton::Left) {
        samples.push(PointerSample {
            id: PointerId::Mouse,
            phase: PointerPhase::Ended,
            position: mouse_pos,
        });
    }

    samples
}
