//! Composition root and frame loop.
//!
//! Everything is wired here, by hand, through constructors: world,
//! player, camera, input, store, synchronizer. No globals; the loop owns
//! the per-frame state and the synchronizer owns the remote caches.

use std::sync::Arc;

use macroquad::prelude::*;

use crate::config::GameConfig;
use crate::error::ClientError;
use crate::game::{Camera, GameState, LevelUpEvent, Player, SimMode, WorldGeometry};
use crate::input::{InputAggregator, UiCommand};
use crate::render::animation::WalkAnimation;
use crate::render::Renderer;
use crate::sync::{
    MemoryStore, NoticeBus, QuestStatus, RemoteStore, StatNotice, StatPatch, Synchronizer,
};

pub const MAP_PATH: &str = "assets/maps/meadow.json";

pub fn window_conf() -> Conf {
    Conf {
        window_title: "Embervale".to_string(),
        window_width: 1280,
        window_height: 720,
        fullscreen: false,
        ..Default::default()
    }
}

pub async fn run() {
    init_diagnostics();

    let config = GameConfig::load();
    let renderer = Renderer::new().await;

    let world = match load_world().await {
        Ok(world) => world,
        Err(e) => {
            // Asset failures are the one fatal class: report and never
            // start the simulation loop
            log::error!("Startup failed: {}", e);
            error_screen(&e).await;
            return;
        }
    };

    let player_id = resolve_player_id(&config);
    let store = build_store(&config, &player_id);
    let sync = Synchronizer::new(store, &player_id, &config.sync);
    let bus = NoticeBus::new();
    let input = InputAggregator::new(config.input.dead_zone, config.input.max_distance);

    let spawn = world.spawn;
    let player = Player::new(spawn.0, spawn.1, config.movement.speed);
    let mut camera = Camera::new(config.camera.zoom, config.camera.follow_speed);
    camera.snap_to(
        player.center(),
        &world,
        (screen_width(), screen_height()),
    );
    let animation = WalkAnimation::new(config.animation.frame_count, config.animation.walk_fps);

    let state = GameState::new(world, player, camera, animation);
    game_loop(state, renderer, sync, bus, input).await;
}

fn init_diagnostics() {
    #[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
    env_logger::init();

    #[cfg(not(target_arch = "wasm32"))]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Some(location) = panic_info.location() {
            eprintln!(
                "  at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));

    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

async fn load_world() -> Result<WorldGeometry, ClientError> {
    let json = load_string(MAP_PATH)
        .await
        .map_err(|e| ClientError::asset(MAP_PATH, e))?;
    WorldGeometry::from_tiled_json(MAP_PATH, &json)
}

/// Session identity: persisted page-side on wasm, config-driven elsewhere.
fn resolve_player_id(config: &GameConfig) -> String {
    #[cfg(target_arch = "wasm32")]
    {
        let mut storage = quad_storage::STORAGE.lock().unwrap();
        if let Some(id) = storage.get("playerId") {
            return id;
        }
        storage.set("playerId", &config.remote.player_id);
    }
    config.remote.player_id.clone()
}

fn build_store(config: &GameConfig, player_id: &str) -> Arc<dyn RemoteStore> {
    #[cfg(not(target_arch = "wasm32"))]
    if !config.remote.base_url.is_empty() {
        log::info!("Using remote store at {}", config.remote.base_url);
        return Arc::new(crate::sync::http_store::HttpStore::new(
            &config.remote.base_url,
        ));
    }

    log::info!("No remote configured; running against the offline store");
    Arc::new(seed_offline_store(player_id))
}

/// Offline/demo data so the game is playable with no backend at all.
fn seed_offline_store(player_id: &str) -> MemoryStore {
    use serde_json::json;

    let store = MemoryStore::new();
    store.insert(
        "players",
        player_id,
        1,
        json!({
            "name": player_id,
            "skin": "tan",
            "level": 1,
            "experience": 0,
            "points": 0
        }),
    );
    store.insert(
        "quests",
        "first-steps",
        1,
        json!({"status": "active", "assignedTo": player_id, "endTime": 4_102_444_800_000u64}),
    );
    store.insert(
        "quests",
        "gather-embers",
        1,
        json!({"status": "active", "assignedTo": player_id}),
    );
    store.insert(
        "feedback",
        "welcome",
        1,
        json!({"assignedTo": player_id, "message": "Welcome to the meadow!"}),
    );
    store
}

async fn game_loop(
    mut state: GameState,
    renderer: Renderer,
    mut sync: Synchronizer,
    bus: NoticeBus,
    mut input: InputAggregator,
) {
    let mut debug_notice_seq: u64 = 0;

    while state.mode == SimMode::Running {
        let delta = get_frame_time();
        let now = get_time();
        let now_ms = (now * 1000.0) as u64;

        // 1. Apply sync results and notices that arrived between frames
        sync.pump();
        for notice in bus.drain() {
            sync.apply_notice(notice);
        }

        // 2. One-shot commands
        for command in input.poll_commands() {
            match command {
                UiCommand::ToggleDebug => state.debug_mode = !state.debug_mode,
                UiCommand::ToggleQuestLog => state.quest_log_open = !state.quest_log_open,
                UiCommand::TurnInQuest => {
                    let target = sync
                        .quests()
                        .iter()
                        .find(|q| q.status == QuestStatus::Active)
                        .map(|q| q.id.clone());
                    if let Some(id) = target {
                        if sync.complete_quest(&id, now_ms) {
                            log::info!("Quest {} turned in", id);
                        }
                    }
                }
                UiCommand::Logout => {
                    sync.end_session();
                    state.mode = SimMode::LoggedOut;
                }
            }
        }

        // Debug hooks: F5 pushes a points bump through the notice
        // channel, F6 files a canned feedback report
        if state.debug_mode && is_key_pressed(KeyCode::F5) {
            debug_notice_seq += 1;
            let points = sync.stats().map(|s| s.points + 1).unwrap_or(1);
            bus.sender().send(StatNotice {
                id: debug_notice_seq,
                target: sync.player_id().to_string(),
                patch: StatPatch {
                    points: Some(points),
                    ..Default::default()
                },
                timestamp: now_ms,
            });
        }
        if state.debug_mode && is_key_pressed(KeyCode::F6) {
            sync.submit_feedback("ping from the meadow", now_ms);
        }

        // 3. Simulation: input -> motion -> camera -> animation
        let movement = input.poll_movement();
        state.update(movement, delta, (screen_width(), screen_height()));

        let reward = state.collect_pickups();
        if reward > 0 && sync.grant_experience(reward, now_ms) {
            let new_level = sync.stats().map(|s| s.level).unwrap_or(0);
            state.level_up_events.push(LevelUpEvent {
                new_level,
                time: now,
            });
        }
        state.expire_events(now);

        // 4. Poll timers; may kick off background fetches
        sync.advance(delta);

        // 5. Render
        renderer.render(&state, &sync, now);
        input.render_overlay();

        next_frame().await;
    }

    logged_out_screen().await;
}

/// Shown when startup assets fail; the simulation never starts.
async fn error_screen(error: &ClientError) {
    let detail = error.to_string();
    loop {
        clear_background(Color::from_rgba(20, 24, 28, 255));
        draw_text("Could not load the game", 40.0, 80.0, 32.0, RED);
        draw_text(&detail, 40.0, 120.0, 18.0, GRAY);
        draw_text("Press Escape to quit", 40.0, 160.0, 18.0, WHITE);
        if is_key_pressed(KeyCode::Escape) {
            return;
        }
        next_frame().await;
    }
}

async fn logged_out_screen() {
    loop {
        clear_background(Color::from_rgba(20, 24, 28, 255));
        draw_text("Logged out", 40.0, 80.0, 32.0, WHITE);
        draw_text("Relaunch to play again", 40.0, 120.0, 18.0, GRAY);
        if is_key_pressed(KeyCode::Escape) {
            return;
        }
        next_frame().await;
    }
}
