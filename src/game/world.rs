use serde::Deserialize;

use crate::error::ClientError;

/// Tiled JSON map format (simplified for orthogonal maps)
#[derive(Debug, Deserialize)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    #[serde(default)]
    pub orientation: String,
    pub layers: Vec<TiledLayer>,
}

#[derive(Debug, Deserialize)]
pub struct TiledLayer {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub data: Vec<u32>,
    #[serde(default)]
    pub objects: Vec<TiledObject>,
}

#[derive(Debug, Deserialize)]
pub struct TiledObject {
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

/// An axis-aligned obstacle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WallRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// AABB overlap with closed-open intervals, so boxes that merely share an
/// edge do not collide.
#[inline]
pub fn aabb_overlaps(ax: f32, ay: f32, aw: f32, ah: f32, b: &WallRect) -> bool {
    ax < b.x + b.width && ax + aw > b.x && ay < b.y + b.height && ay + ah > b.y
}

/// A pickup marker placed in the map; grants XP when walked over.
#[derive(Debug, Clone)]
pub struct PickupSpot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub experience: i32,
    pub collected: bool,
}

/// Static world geometry: map extents plus the immutable wall set.
///
/// Built once from a Tiled map at load time and never mutated afterwards.
#[derive(Debug)]
pub struct WorldGeometry {
    pub map_width: u32,
    pub map_height: u32,
    pub tile_size: u32,
    walls: Vec<WallRect>,
    pub ground: Vec<u32>,
    pub spawn: (f32, f32),
    pub pickups: Vec<PickupSpot>,
}

impl WorldGeometry {
    /// Parse a Tiled JSON map. The `"walls"` object layer becomes the
    /// collision set; `"spawn"` and `"pickups"` objects are optional.
    pub fn from_tiled_json(path: &str, json: &str) -> Result<Self, ClientError> {
        let tiled: TiledMap =
            serde_json::from_str(json).map_err(|e| ClientError::asset(path, e))?;

        if !tiled.orientation.is_empty() && tiled.orientation != "orthogonal" {
            log::warn!(
                "Map orientation is '{}', expected 'orthogonal'",
                tiled.orientation
            );
        }

        let mut walls = Vec::new();
        let mut ground = vec![0u32; (tiled.width * tiled.height) as usize];
        let mut spawn = None;
        let mut pickups = Vec::new();

        for layer in &tiled.layers {
            match layer.layer_type.as_str() {
                "tilelayer" => {
                    if layer.data.len() == ground.len() {
                        ground.copy_from_slice(&layer.data);
                    } else {
                        log::warn!(
                            "Tile layer '{}' has {} tiles, expected {}",
                            layer.name,
                            layer.data.len(),
                            ground.len()
                        );
                    }
                }
                "objectgroup" => match layer.name.to_lowercase().as_str() {
                    "walls" => {
                        for obj in &layer.objects {
                            walls.push(WallRect::new(obj.x, obj.y, obj.width, obj.height));
                        }
                    }
                    "spawn" => {
                        if let Some(obj) = layer.objects.first() {
                            spawn = Some((obj.x, obj.y));
                        }
                    }
                    "pickups" => {
                        for obj in &layer.objects {
                            pickups.push(PickupSpot {
                                x: obj.x,
                                y: obj.y,
                                radius: obj.width.max(obj.height).max(16.0) / 2.0,
                                experience: 25,
                                collected: false,
                            });
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        let spawn = spawn.ok_or_else(|| ClientError::MissingSpawn {
            path: path.to_string(),
        })?;

        log::info!(
            "Loaded map {}: {}x{} tiles, {} walls, {} pickups",
            path,
            tiled.width,
            tiled.height,
            walls.len(),
            pickups.len()
        );

        Ok(Self {
            map_width: tiled.width,
            map_height: tiled.height,
            tile_size: tiled.tilewidth,
            walls,
            ground,
            spawn,
            pickups,
        })
    }

    /// Build geometry directly from parts.
    pub fn from_parts(
        map_width: u32,
        map_height: u32,
        tile_size: u32,
        walls: Vec<WallRect>,
    ) -> Self {
        Self {
            map_width,
            map_height,
            tile_size,
            walls,
            ground: vec![0; (map_width * map_height) as usize],
            spawn: (
                map_width as f32 * tile_size as f32 / 2.0,
                map_height as f32 * tile_size as f32 / 2.0,
            ),
            pickups: Vec::new(),
        }
    }

    pub fn pixel_width(&self) -> f32 {
        (self.map_width * self.tile_size) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.map_height * self.tile_size) as f32
    }

    pub fn walls(&self) -> &[WallRect] {
        &self.walls
    }

    /// True iff a box at `(x, y)` with the given extents lies fully inside
    /// the map and intersects no wall.
    pub fn can_occupy(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        if x < 0.0 || y < 0.0 || x + width > self.pixel_width() || y + height > self.pixel_height()
        {
            return false;
        }
        !self
            .walls
            .iter()
            .any(|wall| aabb_overlaps(x, y, width, height, wall))
    }

    /// Tile id at a tile coordinate (0 = empty / out of range).
    pub fn ground_tile(&self, tx: u32, ty: u32) -> u32 {
        if tx >= self.map_width || ty >= self.map_height {
            return 0;
        }
        let idx = (ty * self.map_width + tx) as usize;
        self.ground.get(idx).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> WorldGeometry {
        // 40x40 tiles of 16px => 640x640 px
        WorldGeometry::from_parts(
            40,
            40,
            16,
            vec![
                WallRect::new(100.0, 100.0, 60.0, 20.0),
                WallRect::new(300.0, 0.0, 20.0, 640.0),
            ],
        )
    }

    #[test]
    fn open_space_is_occupiable() {
        let world = test_world();
        assert!(world.can_occupy(10.0, 10.0, 24.0, 28.0));
        assert!(world.can_occupy(200.0, 400.0, 24.0, 28.0));
    }

    #[test]
    fn wall_overlap_is_rejected() {
        let world = test_world();
        // Box straddling the first wall
        assert!(!world.can_occupy(110.0, 90.0, 24.0, 28.0));
        // Box fully inside the second wall's column
        assert!(!world.can_occupy(305.0, 200.0, 10.0, 10.0));
    }

    #[test]
    fn shared_edges_do_not_collide() {
        let world = test_world();
        // Box whose right edge exactly touches the wall's left edge
        assert!(world.can_occupy(76.0, 100.0, 24.0, 20.0));
        // Box whose top edge exactly touches the wall's bottom edge
        assert!(world.can_occupy(100.0, 120.0, 24.0, 20.0));
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let world = test_world();
        assert!(!world.can_occupy(-1.0, 10.0, 24.0, 28.0));
        assert!(!world.can_occupy(10.0, -0.5, 24.0, 28.0));
        // Bottom-right corner poking past the map edge
        assert!(!world.can_occupy(630.0, 630.0, 24.0, 28.0));
        // Exactly flush with the edge is fine
        assert!(world.can_occupy(640.0 - 24.0, 640.0 - 28.0, 24.0, 28.0));
    }

    #[test]
    fn tiled_map_parses_walls_and_spawn() {
        let json = r#"{
            "width": 4, "height": 3, "tilewidth": 16,
            "orientation": "orthogonal",
            "layers": [
                {"name": "ground", "type": "tilelayer",
                 "data": [1,1,1,1,1,2,2,1,1,1,1,1]},
                {"name": "walls", "type": "objectgroup",
                 "objects": [{"name": "w0", "x": 0, "y": 0, "width": 16, "height": 48}]},
                {"name": "spawn", "type": "objectgroup",
                 "objects": [{"name": "start", "x": 32, "y": 16}]}
            ]
        }"#;
        let world = WorldGeometry::from_tiled_json("test.json", json).unwrap();
        assert_eq!(world.map_width, 4);
        assert_eq!(world.walls().len(), 1);
        assert_eq!(world.spawn, (32.0, 16.0));
        assert_eq!(world.ground_tile(1, 1), 2);
        assert!(!world.can_occupy(4.0, 4.0, 8.0, 8.0));
        assert!(world.can_occupy(20.0, 4.0, 8.0, 8.0));
    }

    #[test]
    fn map_without_spawn_is_an_error() {
        let json = r#"{"width": 2, "height": 2, "tilewidth": 16, "layers": []}"#;
        let err = WorldGeometry::from_tiled_json("nospawn.json", json).unwrap_err();
        assert!(matches!(err, ClientError::MissingSpawn { .. }));
    }

    #[test]
    fn garbage_json_is_an_asset_error() {
        let err = WorldGeometry::from_tiled_json("bad.json", "not json").unwrap_err();
        assert!(matches!(err, ClientError::AssetLoad { .. }));
    }
}
