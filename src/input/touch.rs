// Virtual joystick for touch screens and mouse dragging.
// The joystick anchors where the pointer first lands and reads direction
// and magnitude from the drag offset.

use macroquad::prelude::*;

use crate::input::InputVector;

/// Which device is currently driving the joystick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerId {
    Touch(u64),
    Mouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Started,
    Moved,
    Ended,
}

/// One pointer observation for a tick; built from touches and the mouse
/// by the input handler so this module stays device-agnostic.
#[derive(Debug, Clone, Copy)]
pub struct PointerSample {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub position: Vec2,
}

/// Pure joystick math: direction of the drag, magnitude scaled so the
/// dead zone reads as zero and `max_distance` (or beyond) reads as 1.
pub fn joystick_vector(
    center: Vec2,
    current: Vec2,
    dead_zone: f32,
    max_distance: f32,
) -> InputVector {
    let delta = current - center;
    let distance = delta.length();

    if distance <= dead_zone || max_distance <= 0.0 {
        return InputVector::ZERO;
    }

    let clamped = distance.min(max_distance);
    let direction = delta / distance;
    let magnitude = clamped / max_distance;

    InputVector {
        x: direction.x * magnitude,
        y: direction.y * magnitude,
    }
}

/// Virtual joystick state. Tracks a single pointer from press to release.
pub struct VirtualJoystick {
    center: Option<Vec2>,
    current: Option<Vec2>,
    pointer: Option<PointerId>,
    dead_zone: f32,
    max_distance: f32,
    base_radius: f32,
    stick_radius: f32,
}

impl VirtualJoystick {
    pub fn new(dead_zone: f32, max_distance: f32) -> Self {
        Self {
            center: None,
            current: None,
            pointer: None,
            dead_zone,
            max_distance,
            base_radius: 70.0,
            stick_radius: 35.0,
        }
    }

    /// Feed this tick's pointer samples. Returns true if the joystick
    /// consumed a pointer.
    pub fn update(&mut self, samples: &[PointerSample]) -> bool {
        if let Some(tracking) = self.pointer {
            let tracked = samples.iter().find(|s| s.id == tracking);
            match tracked {
                Some(sample) => match sample.phase {
                    PointerPhase::Moved | PointerPhase::Started => {
                        self.current = Some(sample.position);
                    }
                    PointerPhase::Ended => self.release(),
                },
                // Pointer disappeared without an end event
                None => self.release(),
            }
            return true;
        }

        for sample in samples {
            if sample.phase == PointerPhase::Started {
                self.pointer = Some(sample.id);
                self.center = Some(sample.position);
                self.current = Some(sample.position);
                return true;
            }
        }

        false
    }

    fn release(&mut self) {
        self.pointer = None;
        self.center = None;
        self.current = None;
    }

    /// Whether a pointer is currently held. While active, the joystick
    /// owns movement input outright.
    pub fn is_active(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn get_input(&self) -> InputVector {
        match (self.center, self.current) {
            (Some(center), Some(current)) => {
                joystick_vector(center, current, self.dead_zone, self.max_distance)
            }
            _ => InputVector::ZERO,
        }
    }

    /// Draw the joystick base and stick at the anchor point.
    pub fn render(&self) {
        if let (Some(center), Some(current)) = (self.center, self.current) {
            draw_circle(
                center.x,
                center.y,
                self.base_radius,
                Color::new(1.0, 1.0, 1.0, 0.2),
            );
            draw_circle_lines(
                center.x,
                center.y,
                self.base_radius,
                2.0,
                Color::new(1.0, 1.0, 1.0, 0.4),
            );

            let delta = current - center;
            let distance = delta.length().min(self.max_distance);
            let stick_pos = if delta.length() > 0.0 {
                center + delta.normalize() * distance
            } else {
                center
            };

            draw_circle(
                stick_pos.x,
                stick_pos.y,
                self.stick_radius,
                Color::new(1.0, 1.0, 1.0, 0.5),
            );
        }
    }
}
