pub mod animation;

use std::collections::HashMap;

use macroquad::prelude::*;

use crate::game::GameState;
use crate::sync::levels;
use crate::sync::{QuestStatus, SyncState, Synchronizer};

/// Skins we ship sheets for; anything else falls back to rect rendering.
const SKINS: [&str; 4] = ["tan", "pale", "brown", "ghost"];

/// Tile colors for procedural rendering (before we have tile art)
fn tile_color(tile_id: u32) -> Color {
    match tile_id {
        0 => Color::from_rgba(46, 64, 38, 255),    // Void/undergrowth
        1 => Color::from_rgba(60, 90, 50, 255),    // Grass
        2 => Color::from_rgba(90, 70, 50, 255),    // Dirt
        3 => Color::from_rgba(40, 60, 100, 255),   // Water
        4 => Color::from_rgba(80, 80, 90, 255),    // Rock
        5 => Color::from_rgba(100, 85, 60, 255),   // Sand
        _ => Color::from_rgba(100, 50, 100, 255),  // Unknown (debug purple)
    }
}

pub struct Renderer {
    skins: HashMap<String, Texture2D>,
}

impl Renderer {
    /// Load the character sheets. A missing sheet downgrades that skin to
    /// rect rendering; only the map asset is allowed to stop startup.
    pub async fn new() -> Self {
        let mut skins = HashMap::new();
        for skin in SKINS {
            let path = format!("assets/sprites/{}.png", skin);
            match load_texture(&path).await {
                Ok(texture) => {
                    texture.set_filter(FilterMode::Nearest);
                    skins.insert(skin.to_string(), texture);
                }
                Err(e) => log::warn!("Sprite sheet {} unavailable: {}", path, e),
            }
        }
        Self { skins }
    }

    pub fn render(&self, state: &GameState, sync: &Synchronizer, now: f64) {
        clear_background(Color::from_rgba(20, 24, 28, 255));

        let viewport = (screen_width(), screen_height());
        let camera = &state.camera;
        let zoom = camera.zoom;
        let (view_x, view_y, view_w, view_h) = camera.view_rect(viewport);
        let tile = state.world.tile_size as f32;

        // Ground tiles, culled to the visible window
        let tx0 = (view_x / tile).floor().max(0.0) as u32;
        let ty0 = (view_y / tile).floor().max(0.0) as u32;
        let tx1 = (((view_x + view_w) / tile).ceil() as u32 + 1).min(state.world.map_width);
        let ty1 = (((view_y + view_h) / tile).ceil() as u32 + 1).min(state.world.map_height);

        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                let color = tile_color(state.world.ground_tile(tx, ty));
                draw_rectangle(
                    (tx as f32 * tile - view_x) * zoom,
                    (ty as f32 * tile - view_y) * zoom,
                    tile * zoom + 1.0,
                    tile * zoom + 1.0,
                    color,
                );
            }
        }

        // Walls
        for wall in state.world.walls() {
            draw_rectangle(
                (wall.x - view_x) * zoom,
                (wall.y - view_y) * zoom,
                wall.width * zoom,
                wall.height * zoom,
                Color::from_rgba(52, 48, 54, 255),
            );
        }

        // Pickups
        for pickup in &state.world.pickups {
            if !pickup.collected {
                draw_circle(
                    (pickup.x - view_x) * zoom,
                    (pickup.y - view_y) * zoom,
                    5.0 * zoom,
                    Color::from_rgba(240, 210, 80, 255),
                );
            }
        }

        self.draw_player(state, sync, view_x, view_y, zoom);
        self.draw_hud(state, sync, now);
        if state.debug_mode {
            self.draw_debug(state, sync);
        }
    }

    fn draw_player(
        &self,
        state: &GameState,
        sync: &Synchronizer,
        view_x: f32,
        view_y: f32,
        zoom: f32,
    ) {
        let player = &state.player;
        let sx = (player.x - view_x) * zoom;
        let sy = (player.y - view_y) * zoom;

        let skin = sync.stats().map(|s| s.skin.as_str()).unwrap_or("tan");
        if let Some(texture) = self.skins.get(skin) {
            let (src_x, src_y, src_w, src_h) = state.animation.source_rect(player.direction);
            // Sprite is wider/taller than the collision box; anchor feet
            let dest_w = src_w * zoom;
            let dest_h = src_h * zoom;
            draw_texture_ex(
                texture,
                sx - (dest_w - player.width * zoom) / 2.0,
                sy + player.height * zoom - dest_h,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(dest_w, dest_h)),
                    source: Some(Rect::new(src_x, src_y, src_w, src_h)),
                    ..Default::default()
                },
            );
        } else {
            // No sheet: body rect plus a facing notch, bobbing with the
            // walk cycle so animation state stays visible
            let bob = if player.is_moving {
                (state.animation.current_frame() % 2) as f32 * 2.0
            } else {
                0.0
            };
            draw_rectangle(
                sx,
                sy - bob,
                player.width * zoom,
                player.height * zoom,
                Color::from_rgba(220, 180, 140, 255),
            );
            let (nx, ny) = match player.direction {
                crate::game::Direction::Down => (player.width / 2.0, player.height),
                crate::game::Direction::Up => (player.width / 2.0, 0.0),
                crate::game::Direction::Left => (0.0, player.height / 2.0),
                crate::game::Direction::Right => (player.width, player.height / 2.0),
            };
            draw_circle(sx + nx * zoom, sy + ny * zoom - bob, 3.0 * zoom, RED);
        }

        // Name label
        if let Some(stats) = sync.stats() {
            let label = &stats.name;
            let dims = measure_text(label, None, 16, 1.0);
            draw_text(
                label,
                sx + (player.width * zoom - dims.width) / 2.0,
                sy - 8.0,
                16.0,
                WHITE,
            );
        }
    }

    fn draw_hud(&self, state: &GameState, sync: &Synchronizer, now: f64) {
        // Stats panel
        draw_rectangle(8.0, 8.0, 220.0, 64.0, Color::from_rgba(0, 0, 0, 160));
        match sync.stats() {
            Some(stats) => {
                draw_text(&format!("{}  Lv {}", stats.name, stats.level), 16.0, 28.0, 20.0, WHITE);
                let progress = levels::level_progress(stats.level, stats.experience);
                draw_rectangle(16.0, 38.0, 180.0, 10.0, Color::from_rgba(60, 60, 60, 255));
                draw_rectangle(
                    16.0,
                    38.0,
                    180.0 * progress,
                    10.0,
                    Color::from_rgba(120, 200, 90, 255),
                );
                draw_text(
                    &format!("XP {} / {}   Points {}",
                        stats.experience,
                        levels::xp_required(stats.level),
                        stats.points),
                    16.0,
                    64.0,
                    16.0,
                    GRAY,
                );
            }
            None => {
                draw_text("Syncing...", 16.0, 40.0, 20.0, GRAY);
            }
        }

        if sync.is_degraded() {
            let text = "Could not sync - progress is safe, retrying";
            let dims = measure_text(text, None, 18, 1.0);
            draw_text(
                text,
                screen_width() - dims.width - 16.0,
                28.0,
                18.0,
                Color::from_rgba(240, 160, 80, 255),
            );
        }

        // Level-up banners
        for (i, event) in state.level_up_events.iter().enumerate() {
            let age = (now - event.time) as f32;
            let text = format!("Level {}!", event.new_level);
            let dims = measure_text(&text, None, 32, 1.0);
            draw_text(
                &text,
                (screen_width() - dims.width) / 2.0,
                140.0 + i as f32 * 36.0 - age * 12.0,
                32.0,
                Color::from_rgba(250, 220, 90, 255),
            );
        }

        // Quest log panel
        if state.quest_log_open {
            let x = screen_width() - 280.0;
            draw_rectangle(x, 48.0, 264.0, 200.0, Color::from_rgba(0, 0, 0, 180));
            draw_text("Quests [Q]", x + 12.0, 70.0, 20.0, WHITE);
            if sync.quests().is_empty() {
                draw_text("Nothing yet", x + 12.0, 96.0, 16.0, GRAY);
            }
            for (i, quest) in sync.quests().iter().take(8).enumerate() {
                let (glyph, color) = match quest.status {
                    QuestStatus::Active => ("> ", WHITE),
                    QuestStatus::PlayerDone => ("~ ", Color::from_rgba(240, 210, 80, 255)),
                    QuestStatus::Completed => ("+ ", Color::from_rgba(120, 200, 90, 255)),
                };
                draw_text(
                    &format!("{}{}", glyph, quest.id),
                    x + 12.0,
                    96.0 + i as f32 * 20.0,
                    16.0,
                    color,
                );
            }
            draw_text("E turns in the first active quest", x + 12.0, 236.0, 14.0, GRAY);
        }

        // Latest feedback note, bottom left
        if let Some(note) = sync.feedback_notes().first() {
            draw_text(
                &format!("Mail: {}", note.message),
                16.0,
                screen_height() - 16.0,
                16.0,
                Color::from_rgba(150, 200, 255, 255),
            );
        }
    }

    fn draw_debug(&self, state: &GameState, sync: &Synchronizer) {
        let y = 92.0;
        draw_text(&format!("FPS: {}", get_fps()), 10.0, y, 16.0, WHITE);
        draw_text(
            &format!("Pos: ({:.1}, {:.1})", state.player.x, state.player.y),
            10.0,
            y + 20.0,
            16.0,
            YELLOW,
        );
        draw_text(
            &format!("Cam: ({:.1}, {:.1}) zoom {:.1}",
                state.camera.x, state.camera.y, state.camera.zoom),
            10.0,
            y + 40.0,
            16.0,
            YELLOW,
        );
        for (i, (name, sync_state)) in sync.channel_states().iter().enumerate() {
            let color = match sync_state {
                SyncState::Merged => Color::from_rgba(100, 255, 150, 255),
                SyncState::Fetching => Color::from_rgba(150, 200, 255, 255),
                SyncState::Error => Color::from_rgba(255, 100, 100, 255),
                SyncState::Idle => GRAY,
            };
            draw_text(
                &format!("{}: {:?}", name, sync_state),
                10.0,
                y + 60.0 + i as f32 * 20.0,
                16.0,
                color,
            );
        }
    }
}
