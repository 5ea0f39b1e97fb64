use crate::game::math::Vector2D;
use crate::game::types::Wall;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Static arena configuration, read once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub ms_per_frame: u64,
    /// Ticks a dead snake waits before respawning.
    pub respawn_rate: i32,
    pub survival_mode: bool,
    pub universe_size: u32,
    pub walls: Vec<Wall>,
}

impl Default for GameSettings {
    fn default() -> Self {
        let universe_size = 2000;
        Self {
            ms_per_frame: 34,
            respawn_rate: 100,
            survival_mode: false,
            universe_size,
            walls: border_walls(universe_size),
        }
    }
}

impl GameSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: GameSettings = serde_json::from_str(&raw)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings.validated())
    }

    /// Loads `path`, falling back to the built-in arena when the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!("using default settings: {error:#}");
                Self::default()
            }
        }
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.ms_per_frame)
    }

    fn validated(mut self) -> Self {
        self.ms_per_frame = self.ms_per_frame.max(1);
        self.respawn_rate = self.respawn_rate.max(0);
        let mut seen = HashSet::new();
        self.walls.retain(|wall| {
            if !wall.is_axis_aligned() {
                tracing::warn!(wall = wall.id, "dropping wall that is not axis-aligned");
                return false;
            }
            if !seen.insert(wall.id) {
                tracing::warn!(wall = wall.id, "dropping wall with duplicate id");
                return false;
            }
            true
        });
        self
    }
}

/// Four walls tracing the edge of a square arena centred on the origin.
pub fn border_walls(universe_size: u32) -> Vec<Wall> {
    let half = universe_size as f64 / 2.0;
    let corners = [
        Vector2D::new(-half, -half),
        Vector2D::new(half, -half),
        Vector2D::new(half, half),
        Vector2D::new(-half, half),
    ];
    (0..corners.len())
        .map(|index| Wall {
            id: index as u32,
            p1: corners[index],
            p2: corners[(index + 1) % corners.len()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.json", std::process::id()));
        std::fs::write(&path, contents).expect("write temp settings");
        path
    }

    #[test]
    fn defaults_are_playable() {
        let settings = GameSettings::default();
        assert_eq!(settings.walls.len(), 4);
        assert!(settings.walls.iter().all(Wall::is_axis_aligned));
        assert_eq!(settings.frame_period(), Duration::from_millis(34));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("snake-arena-settings-that-does-not-exist.json");
        let settings = GameSettings::load_or_default(&path);
        assert_eq!(settings.universe_size, GameSettings::default().universe_size);
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let path = write_temp("snake-arena-broken", "{ not json");
        assert!(GameSettings::load(&path).is_err());
        let settings = GameSettings::load_or_default(&path);
        assert_eq!(settings.ms_per_frame, 34);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn partial_file_keeps_other_defaults_and_filters_walls() {
        let path = write_temp(
            "snake-arena-partial",
            r#"{
                "universe_size": 1200,
                "survival_mode": true,
                "walls": [
                    {"wall": 1, "p1": {"x": 0, "y": 0}, "p2": {"x": 0, "y": 100}},
                    {"wall": 2, "p1": {"x": 0, "y": 0}, "p2": {"x": 50, "y": 50}},
                    {"wall": 1, "p1": {"x": 10, "y": 0}, "p2": {"x": 90, "y": 0}}
                ]
            }"#,
        );
        let settings = GameSettings::load(&path).expect("valid settings");
        assert_eq!(settings.universe_size, 1200);
        assert!(settings.survival_mode);
        assert_eq!(settings.respawn_rate, 100);
        assert_eq!(settings.walls.len(), 1);
        assert_eq!(settings.walls[0].p2.y, 100.0);
        let _ = std::fs::remove_file(path);
    }
}
