use crate::game::player::Direction;

/// Sprite frame dimensions in the character sheets.
pub const SPRITE_WIDTH: f32 = 32.0;
pub const SPRITE_HEIGHT: f32 = 48.0;

/// Sprite sheet row per facing direction.
///
/// The sheets are laid out as a fixed 4-row grid, one walk cycle per row.
/// This mapping is a property of the art, so it is a table rather than
/// anything computed from the direction value.
pub fn direction_row(direction: Direction) -> u32 {
    match direction {
        Direction::Down => 0,
        Direction::Left => 1,
        Direction::Right => 2,
        Direction::Up => 3,
    }
}

/// Walk-cycle state: a fractional frame accumulator over a fixed-length
/// row of frames.
///
/// The accumulator only advances while the player is moving and snaps
/// straight back to frame 0 on stop; there is no wind-down animation.
#[derive(Debug, Clone)]
pub struct WalkAnimation {
    frame_accumulator: f32,
    pub frame_count: u32,
    pub frames_per_second: f32,
}

impl WalkAnimation {
    pub fn new(frame_count: u32, frames_per_second: f32) -> Self {
        Self {
            frame_accumulator: 0.0,
            frame_count: frame_count.max(1),
            frames_per_second,
        }
    }

    pub fn update(&mut self, moving: bool, dt: f32) {
        if moving {
            self.frame_accumulator += self.frames_per_second * dt;
            if self.frame_accumulator >= self.frame_count as f32 {
                self.frame_accumulator %= self.frame_count as f32;
            }
        } else {
            self.frame_accumulator = 0.0;
        }
    }

    pub fn current_frame(&self) -> u32 {
        (self.frame_accumulator as u32).min(self.frame_count - 1)
    }

    /// Source rectangle in the sprite sheet for the current frame.
    pub fn source_rect(&self, direction: Direction) -> (f32, f32, f32, f32) {
        let col = self.current_frame();
        let row = direction_row(direction);
        (
            col as f32 * SPRITE_WIDTH,
            row as f32 * SPRITE_HEIGHT,
            SPRITE_WIDTH,
            SPRITE_HEIGHT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_while_moving() {
        let mut anim = WalkAnimation::new(4, 10.0);
        anim.update(false, 0.5);
        assert_eq!(anim.current_frame(), 0);

        anim.update(true, 0.15);
        assert_eq!(anim.current_frame(), 1);

        anim.update(true, 0.1);
        assert_eq!(anim.current_frame(), 2);
    }

    #[test]
    fn wraps_at_frame_count() {
        let mut anim = WalkAnimation::new(4, 10.0);
        anim.update(true, 0.45); // 4.5 frames worth
        assert_eq!(anim.current_frame(), 0);

        anim.update(true, 0.1);
        assert_eq!(anim.current_frame(), 1);
    }

    #[test]
    fn snaps_to_zero_on_stop() {
        let mut anim = WalkAnimation::new(4, 10.0);
        anim.update(true, 0.25);
        assert_eq!(anim.current_frame(), 2);

        anim.update(false, 0.016);
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn direction_rows_are_fixed() {
        assert_eq!(direction_row(Direction::Down), 0);
        assert_eq!(direction_row(Direction::Left), 1);
        assert_eq!(direction_row(Direction::Right), 2);
        assert_eq!(direction_row(Direction::Up), 3);
    }

    #[test]
    fn source_rect_tracks_frame_and_row() {
        let mut anim = WalkAnimation::new(4, 10.0);
        anim.update(true, 0.15);
        let (sx, sy, sw, sh) = anim.source_rect(Direction::Right);
        assert_eq!((sx, sy), (SPRITE_WIDTH, 2.0 * SPRITE_HEIGHT));
        assert_eq!((sw, sh), (SPRITE_WIDTH, SPRITE_HEIGHT));
    }
}
