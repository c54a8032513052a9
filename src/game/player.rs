use crate::game::world::WorldGeometry;
use crate::input::InputVector;

/// Facing direction; selects the sprite sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Left,
    Right,
    Up,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Down
    }
}

/// Collision box extents in pixels. Slightly narrower than the sprite so
/// the player can slip through door-sized gaps.
pub const PLAYER_WIDTH: f32 = 24.0;
pub const PLAYER_HEIGHT: f32 = 28.0;

/// The locally simulated player: position, facing and movement activity.
///
/// Position is mutated only by `step`, once per simulation tick, and only
/// through moves the world geometry approves. Anything reading `x`/`y`
/// can rely on them being collision-free and in bounds.
#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub is_moving: bool,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
}

impl Player {
    pub fn new(x: f32, y: f32, speed: f32) -> Self {
        Self {
            x,
            y,
            direction: Direction::Down,
            is_moving: false,
            speed,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }

    /// Center of the collision box; what the camera tracks.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Advance one tick of movement.
    ///
    /// Axes resolve independently: the horizontal move is tested and
    /// committed first, then the vertical move is tested against the
    /// already-updated X. Moving diagonally into a wall therefore slides
    /// along it instead of stopping dead.
    ///
    /// `is_moving` reflects the requested deltas, not the committed ones,
    /// so the walk animation keeps running while pushing against a wall.
    pub fn step(&mut self, input: InputVector, world: &WorldGeometry, dt: f32) {
        let move_x = input.x * self.speed * dt;
        let move_y = input.y * self.speed * dt;

        self.is_moving = move_x != 0.0 || move_y != 0.0;
        if !self.is_moving {
            // No input: facing stays as-is
            return;
        }

        if move_x != 0.0 && world.can_occupy(self.x + move_x, self.y, self.width, self.height) {
            self.x += move_x;
        }
        if move_y != 0.0 && world.can_occupy(self.x, self.y + move_y, self.width, self.height) {
            self.y += move_y;
        }

        // Vertical wins exact ties, matching how players read the sprite
        self.direction = if move_x.abs() > move_y.abs() {
            if move_x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if move_y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::WallRect;
    use proptest::prelude::*;

    fn open_world() -> WorldGeometry {
        WorldGeometry::from_parts(40, 40, 16, Vec::new())
    }

    #[test]
    fn moves_freely_in_open_space() {
        let world = open_world();
        let mut player = Player::new(100.0, 100.0, 120.0);

        player.step(InputVector { x: 1.0, y: 0.0 }, &world, 0.5);
        assert_eq!(player.x, 160.0);
        assert_eq!(player.y, 100.0);
        assert_eq!(player.direction, Direction::Right);
        assert!(player.is_moving);
    }

    #[test]
    fn zero_input_keeps_direction() {
        let world = open_world();
        let mut player = Player::new(100.0, 100.0, 120.0);
        player.step(InputVector { x: 0.0, y: -1.0 }, &world, 0.1);
        assert_eq!(player.direction, Direction::Up);

        player.step(InputVector::ZERO, &world, 0.1);
        assert!(!player.is_moving);
        assert_eq!(player.direction, Direction::Up);
    }

    #[test]
    fn diagonal_ties_face_vertical() {
        let world = open_world();
        let mut player = Player::new(100.0, 100.0, 120.0);
        player.step(InputVector { x: 0.5, y: 0.5 }, &world, 0.1);
        assert_eq!(player.direction, Direction::Down);
    }

    #[test]
    fn slides_along_wall_on_diagonal_input() {
        // Wall directly right of the player; down-right input should
        // still move the player down.
        let world = WorldGeometry::from_parts(
            40,
            40,
            16,
            vec![WallRect::new(130.0, 0.0, 20.0, 640.0)],
        );
        let mut player = Player::new(100.0, 100.0, 120.0);

        player.step(InputVector { x: 0.7, y: 0.7 }, &world, 0.5);
        assert_eq!(player.x, 100.0, "horizontal move should be rejected");
        assert!(player.y > 100.0, "vertical move should slide through");
        assert!(player.is_moving, "animation keeps running against the wall");
    }

    #[test]
    fn downward_move_blocked_near_map_edge() {
        // 40x40 tiles of 16px => 640px tall map. A wall band sits near the
        // bottom edge; one full-second step downward is rejected outright.
        let world = WorldGeometry::from_parts(
            40,
            40,
            16,
            vec![WallRect::new(0.0, 540.0, 100.0, 20.0)],
        );
        let mut player = Player::new(30.0, 550.0, 120.0);

        player.step(InputVector { x: 0.0, y: 1.0 }, &world, 1.0);
        assert_eq!(player.y, 550.0, "blocked move must not change Y");
        assert_eq!(player.x, 30.0, "X had no input and must not change");
        assert!(player.is_moving, "requested motion still drives animation");
    }

    proptest! {
        /// Starting from a valid position, no input sequence can push the
        /// player into a wall or out of bounds.
        #[test]
        fn position_stays_collision_free(
            steps in proptest::collection::vec((-1.0f32..=1.0, -1.0f32..=1.0, 0.001f32..=0.1), 1..200)
        ) {
            let world = WorldGeometry::from_parts(
                40,
                40,
                16,
                vec![
                    WallRect::new(100.0, 100.0, 60.0, 20.0),
                    WallRect::new(300.0, 0.0, 20.0, 640.0),
                    WallRect::new(0.0, 540.0, 100.0, 20.0),
                    WallRect::new(400.0, 400.0, 120.0, 120.0),
                ],
            );
            let mut player = Player::new(200.0, 200.0, 120.0);
            prop_assert!(world.can_occupy(player.x, player.y, player.width, player.height));

            for (x, y, dt) in steps {
                player.step(InputVector { x, y }, &world, dt);
                prop_assert!(
                    world.can_occupy(player.x, player.y, player.width, player.height),
                    "player at ({}, {}) violates geometry", player.x, player.y
                );
            }
        }
    }
}
