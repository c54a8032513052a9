pub mod camera;
pub mod player;
pub mod world;

pub use camera::Camera;
pub use player::{Direction, Player};
pub use world::WorldGeometry;

use crate::input::InputVector;
use crate::render::animation::WalkAnimation;

/// Simulation mode. The frame loop runs only while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    Running,
    LoggedOut,
}

/// Floating level-up banner
pub struct LevelUpEvent {
    pub new_level: i32,
    pub time: f64,
}

/// All per-frame simulation state. Owned and mutated exclusively by the
/// frame loop; remote caches live in the synchronizer, not here.
pub struct GameState {
    pub mode: SimMode,
    pub world: WorldGeometry,
    pub player: Player,
    pub camera: Camera,
    pub animation: WalkAnimation,
    pub debug_mode: bool,
    pub quest_log_open: bool,
    pub level_up_events: Vec<LevelUpEvent>,
}

impl GameState {
    pub fn new(world: WorldGeometry, player: Player, camera: Camera, animation: WalkAnimation) -> Self {
        Self {
            mode: SimMode::Running,
            world,
            player,
            camera,
            animation,
            debug_mode: false,
            quest_log_open: false,
            level_up_events: Vec::new(),
        }
    }

    /// One simulation tick: motion, then camera, then animation.
    pub fn update(&mut self, input: InputVector, dt: f32, viewport: (f32, f32)) {
        self.player.step(input, &self.world, dt);
        self.camera
            .update(self.player.center(), &self.world, viewport);
        self.animation.update(self.player.is_moving, dt);
    }

    /// Collect any XP pickups the player is standing on. Returns the
    /// total reward, 0 most ticks.
    pub fn collect_pickups(&mut self) -> i32 {
        let (px, py) = self.player.center();
        let mut reward = 0;
        for pickup in &mut self.world.pickups {
            if pickup.collected {
                continue;
            }
            let dx = pickup.x - px;
            let dy = pickup.y - py;
            if (dx * dx + dy * dy).sqrt() <= pickup.radius {
                pickup.collected = true;
                reward += pickup.experience;
            }
        }
        reward
    }

    /// Drop expired HUD events (banners older than 2.5s).
    pub fn expire_events(&mut self, now: f64) {
        self.level_up_events.retain(|event| now - event.time < 2.5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> GameState {
        let mut world = WorldGeometry::from_parts(40, 40, 16, Vec::new());
        world.pickups.push(crate::game::world::PickupSpot {
            x: 210.0,
            y: 210.0,
            radius: 20.0,
            experience: 25,
            collected: false,
        });
        let player = Player::new(200.0, 200.0, 120.0);
        let camera = Camera::new(1.0, 0.1);
        let animation = WalkAnimation::new(4, 10.0);
        GameState::new(world, player, camera, animation)
    }

    #[test]
    fn update_runs_motion_camera_animation_in_order() {
        let mut state = test_state();
        state.update(InputVector { x: 1.0, y: 0.0 }, 0.1, (320.0, 240.0));

        assert!(state.player.x > 200.0);
        assert!(state.player.is_moving);
        assert!(state.animation.current_frame() >= 1);
        // Camera eased toward the player this tick
        assert!(state.camera.x > 0.0);
    }

    #[test]
    fn pickups_are_collected_once() {
        let mut state = test_state();
        assert_eq!(state.collect_pickups(), 25);
        assert_eq!(state.collect_pickups(), 0, "pickup must not re-trigger");
    }

    #[test]
    fn distant_pickups_are_untouched() {
        let mut state = test_state();
        state.player.x = 500.0;
        state.player.y = 500.0;
        assert_eq!(state.collect_pickups(), 0);
        assert!(!state.world.pickups[0].collected);
    }

    #[test]
    fn expired_banners_are_dropped() {
        let mut state = test_state();
        state.level_up_events.push(LevelUpEvent {
            new_level: 2,
            time: 10.0,
        });
        state.expire_events(11.0);
        assert_eq!(state.level_up_events.len(), 1);
        state.expire_events(13.0);
        assert!(state.level_up_events.is_empty());
    }
}
