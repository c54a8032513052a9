use crate::game::world::WorldGeometry;

/// Viewport follow camera.
///
/// The camera eases toward the player with a fixed per-tick coefficient:
/// `x += (target_x - x) * follow_speed`. This smoothing is per-tick, not
/// per-second, so devices running at higher frame rates converge faster.
/// That matches the long-standing feel of the game and is kept as-is;
/// normalizing it to wall-clock time would change behavior on every
/// machine at once.
#[derive(Debug, Clone)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub zoom: f32,
    pub follow_speed: f32,
}

impl Camera {
    pub fn new(zoom: f32, follow_speed: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
            zoom,
            follow_speed,
        }
    }

    /// Jump straight to the clamped position for a focus point. Used at
    /// spawn so the first frame doesn't sweep across the map.
    pub fn snap_to(&mut self, focus: (f32, f32), world: &WorldGeometry, viewport: (f32, f32)) {
        self.update(focus, world, viewport);
        self.x = self.target_x;
        self.y = self.target_y;
        self.clamp_to(world, viewport);
    }

    /// Ease toward the focus point, then clamp into world bounds.
    pub fn update(&mut self, focus: (f32, f32), world: &WorldGeometry, viewport: (f32, f32)) {
        let view_w = viewport.0 / self.zoom;
        let view_h = viewport.1 / self.zoom;

        self.target_x = focus.0 - view_w / 2.0;
        self.target_y = focus.1 - view_h / 2.0;

        self.x += (self.target_x - self.x) * self.follow_speed;
        self.y += (self.target_y - self.y) * self.follow_speed;

        self.clamp_to(world, viewport);
    }

    fn clamp_to(&mut self, world: &WorldGeometry, viewport: (f32, f32)) {
        let view_w = viewport.0 / self.zoom;
        let view_h = viewport.1 / self.zoom;
        self.x = clamp_axis(self.x, 0.0, world.pixel_width() - view_w);
        self.y = clamp_axis(self.y, 0.0, world.pixel_height() - view_h);
    }

    /// Visible world-space rectangle, for culling.
    pub fn view_rect(&self, viewport: (f32, f32)) -> (f32, f32, f32, f32) {
        (
            self.x,
            self.y,
            viewport.0 / self.zoom,
            viewport.1 / self.zoom,
        )
    }
}

/// Clamp with a deterministic answer when the range is inverted (world
/// smaller than the viewport): settle on `min`.
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    if max < min {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldGeometry {
        // 640x640 px
        WorldGeometry::from_parts(40, 40, 16, Vec::new())
    }

    #[test]
    fn eases_toward_target() {
        let world = world();
        let mut camera = Camera::new(1.0, 0.5);
        camera.snap_to((320.0, 320.0), &world, (200.0, 200.0));

        // Move focus; one update covers half the remaining distance
        camera.update((420.0, 320.0), &world, (200.0, 200.0));
        assert!((camera.x - 270.0).abs() < 0.001);

        // Converges monotonically over repeated ticks
        for _ in 0..100 {
            camera.update((420.0, 320.0), &world, (200.0, 200.0));
        }
        assert!((camera.x - camera.target_x).abs() < 0.01);
    }

    #[test]
    fn clamps_inside_world_bounds() {
        let world = world();
        let mut camera = Camera::new(1.0, 1.0);

        camera.snap_to((0.0, 0.0), &world, (200.0, 200.0));
        assert_eq!((camera.x, camera.y), (0.0, 0.0));

        camera.snap_to((640.0, 640.0), &world, (200.0, 200.0));
        assert_eq!((camera.x, camera.y), (440.0, 440.0));
    }

    #[test]
    fn zoom_shrinks_the_visible_window() {
        let world = world();
        let mut camera = Camera::new(2.0, 1.0);
        camera.snap_to((640.0, 640.0), &world, (200.0, 200.0));
        // At 2x zoom only 100px of world is visible per axis
        assert_eq!((camera.x, camera.y), (540.0, 540.0));
    }

    #[test]
    fn small_map_settles_on_one_value() {
        // 5x5 tiles of 16px => 80px map, far smaller than the viewport
        let world = WorldGeometry::from_parts(5, 5, 16, Vec::new());
        let mut camera = Camera::new(1.0, 0.3);

        camera.update((40.0, 40.0), &world, (800.0, 600.0));
        let first = (camera.x, camera.y);
        for _ in 0..10 {
            camera.update((40.0, 40.0), &world, (800.0, 600.0));
            assert_eq!((camera.x, camera.y), first, "camera must not oscillate");
        }
        assert_eq!(first, (0.0, 0.0));
    }
}
