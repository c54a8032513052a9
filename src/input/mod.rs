pub mod handler;
pub mod touch;

pub use handler::{InputAggregator, UiCommand};
pub use touch::VirtualJoystick;

/// Normalized movement input for one tick. Each component lies in
/// `[-1, 1]` and the vector's length never exceeds 1, so diagonal
/// movement is no faster than axial movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputVector {
    pub x: f32,
    pub y: f32,
}

impl InputVector {
    pub const ZERO: InputVector = InputVector { x: 0.0, y: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Combine per-axis key flags into a movement vector, normalizing
/// diagonals to unit length.
pub fn combine_keyboard(up: bool, down: bool, left: bool, right: bool) -> InputVector {
    let x = (right as i32 - left as i32) as f32;
    let y = (down as i32 - up as i32) as f32;

    if x != 0.0 && y != 0.0 {
        let len = (x * x + y * y).sqrt();
        InputVector {
            x: x / len,
            y: y / len,
        }
    } else {
        InputVector { x, y }
    }
}
