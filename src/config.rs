//! Runtime configuration loaded from `config.toml`.
//!
//! Every knob has a default so the game runs with no config file at all.
//! A malformed file is logged and replaced with defaults rather than
//! aborting startup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    pub input: InputConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Player movement speed in pixels per second
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Per-tick follow coefficient (see game::camera for the frame-rate caveat)
    pub follow_speed: f32,
    pub zoom: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Walk cycle speed in frames per second
    pub walk_fps: f32,
    /// Frames per direction row in the sprite sheet
    pub frame_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Joystick inputs closer to the anchor than this are ignored (pixels)
    pub dead_zone: f32,
    /// Joystick travel that maps to full speed (pixels)
    pub max_distance: f32,
}

/// Poll cadence per synchronized entity class.
///
/// These are deliberately separate knobs: stats change often, quests
/// rarely, feedback almost never. Collapsing them into one aggressive
/// interval is how the request storms happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub stats_interval_secs: f32,
    pub quests_interval_secs: f32,
    pub feedback_interval_secs: f32,
    /// Upper bound on the error-retry backoff
    pub max_backoff_secs: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the document store. Empty runs offline against an
    /// in-memory store.
    pub base_url: String,
    /// Player document id; doubles as the sync identity
    pub player_id: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
            animation: AnimationConfig::default(),
            input: InputConfig::default(),
            sync: SyncConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { speed: 120.0 }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_speed: 0.08,
            zoom: 2.0,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            walk_fps: 10.0,
            frame_count: 4,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dead_zone: 10.0,
            max_distance: 60.0,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stats_interval_secs: 5.0,
            quests_interval_secs: 15.0,
            feedback_interval_secs: 45.0,
            max_backoff_secs: 60.0,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            player_id: "wanderer".to_string(),
        }
    }
}

impl GameConfig {
    /// Load config from the standard locations, falling back to defaults.
    pub fn load() -> Self {
        for path in config_paths() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                    }
                },
                Err(_) => continue,
            }
        }
        Self::default()
    }

    /// Parse a config file at an explicit path.
    pub fn from_path(path: &std::path::Path) -> Result<Self, toml::de::Error> {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        toml::from_str(&contents)
    }
}

#[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
fn config_paths() -> Vec<std::path::PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("embervale").join("config.toml"));
    }
    paths.push(std::path::PathBuf::from("config.toml"));
    paths
}

#[cfg(any(target_arch = "wasm32", target_os = "android"))]
fn config_paths() -> Vec<std::path::PathBuf> {
    vec![std::path::PathBuf::from("config.toml")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = GameConfig::default();
        assert!(config.movement.speed > 0.0);
        assert!(config.sync.stats_interval_secs < config.sync.quests_interval_secs);
        assert!(config.sync.quests_interval_secs < config.sync.feedback_interval_secs);
        assert!(config.remote.base_url.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[movement]\nspeed = 200.0\n\n[sync]\nstats_interval_secs = 2.5").unwrap();

        let config = GameConfig::from_path(file.path()).unwrap();
        assert_eq!(config.movement.speed, 200.0);
        assert_eq!(config.sync.stats_interval_secs, 2.5);
        // Untouched sections fall back to defaults
        assert_eq!(config.camera.zoom, GameConfig::default().camera.zoom);
        assert_eq!(
            config.sync.quests_interval_secs,
            GameConfig::default().sync.quests_interval_secs
        );
    }
}
