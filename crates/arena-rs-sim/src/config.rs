use serde::Deserialize;
use std::path::Path;

use arena_rs_game::boss::Archetype;
use arena_rs_game::error::GameError;
use arena_rs_game::grid::{TileGrid, DEFAULT_TILE_SIZE};

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    pub encounter: EncounterSection,
    #[serde(default)]
    pub arena: ArenaSection,
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct EncounterSection {
    pub archetype: String,
    /// Bosses already defeated this session.
    #[serde(default)]
    pub encounter_index: u32,
    #[serde(default)]
    pub stage: u32,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ArenaSection {
    /// ASCII layout. When absent, an open room of `width` x `height` tiles is used.
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
}

fn default_width() -> usize {
    40
}

fn default_height() -> usize {
    23
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

impl Default for ArenaSection {
    fn default() -> Self {
        Self {
            map: None,
            width: default_width(),
            height: default_height(),
            tile_size: default_tile_size(),
        }
    }
}

impl ArenaSection {
    pub fn build_grid(&self) -> Result<TileGrid, GameError> {
        match &self.map {
            Some(map) => TileGrid::from_ascii(map, self.tile_size),
            None => Ok(TileGrid::open_room(self.width, self.height, self.tile_size)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Hard stop, in simulated seconds.
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f32,
    #[serde(default = "default_player_dps")]
    pub player_dps: f32,
    #[serde(default = "default_player_strafe_speed")]
    pub player_strafe_speed: f32,
    /// JSON-lines event log output path.
    #[serde(default)]
    pub event_log: Option<String>,
}

fn default_tick_rate() -> u32 {
    60
}

fn default_max_seconds() -> f32 {
    120.0
}

fn default_player_dps() -> f32 {
    40.0
}

fn default_player_strafe_speed() -> f32 {
    90.0
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            max_seconds: default_max_seconds(),
            player_dps: default_player_dps(),
            player_strafe_speed: default_player_strafe_speed(),
            event_log: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(contents)?;
        if config.simulation.tick_rate == 0 {
            return Err("simulation.tick_rate must be at least 1".into());
        }
        if config.arena.tile_size <= 0.0 {
            return Err("arena.tile_size must be positive".into());
        }
        Ok(config)
    }

    pub fn archetype(&self) -> Result<Archetype, GameError> {
        self.encounter.archetype.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_rs_game::grid::Grid;

    #[test]
    fn parse_minimal_config() {
        let toml_str = r#"
            [encounter]
            archetype = "siegebreaker"
        "#;
        let config = SimConfig::parse(toml_str).unwrap();
        assert_eq!(config.archetype().unwrap(), Archetype::Siegebreaker);
        assert_eq!(config.encounter.encounter_index, 0);
        assert_eq!(config.encounter.stage, 0);
        assert!(config.encounter.theme.is_none());
        assert!(config.encounter.seed.is_none());
        // arena defaults when absent
        assert!(config.arena.map.is_none());
        assert_eq!(config.arena.width, 40);
        assert_eq!(config.arena.height, 23);
        assert_eq!(config.arena.tile_size, 32.0);
        // simulation defaults when absent
        assert_eq!(config.simulation.tick_rate, 60);
        assert_eq!(config.simulation.max_seconds, 120.0);
        assert_eq!(config.simulation.player_dps, 40.0);
        assert_eq!(config.simulation.player_strafe_speed, 90.0);
        assert!(config.simulation.event_log.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            [encounter]
            archetype = "Sentinel"
            encounter_index = 2
            stage = 5
            theme = "crimson"
            seed = 99

            [arena]
            map = """
            #####
            #B.P#
            #####
            """
            tile_size = 48.0

            [simulation]
            tick_rate = 30
            max_seconds = 10.0
            player_dps = 25.0
            player_strafe_speed = 120.0
            event_log = "events.jsonl"

            [logging]
            level = "debug"
        "#;
        let config = SimConfig::parse(toml_str).unwrap();
        assert_eq!(config.archetype().unwrap(), Archetype::Sentinel);
        assert_eq!(config.encounter.encounter_index, 2);
        assert_eq!(config.encounter.stage, 5);
        assert_eq!(config.encounter.theme.as_deref(), Some("crimson"));
        assert_eq!(config.encounter.seed, Some(99));
        assert_eq!(config.simulation.tick_rate, 30);
        assert_eq!(config.simulation.event_log.as_deref(), Some("events.jsonl"));
        assert_eq!(config.logging.level, "debug");

        let grid = config.arena.build_grid().unwrap();
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.tile_size(), 48.0);
        assert!(grid.boss_spawn().is_some());
        assert!(grid.player_spawn().is_some());
    }

    #[test]
    fn bundled_config_is_valid() {
        let config = SimConfig::parse(include_str!("../sim.toml")).unwrap();
        assert_eq!(config.archetype().unwrap(), Archetype::Siegebreaker);
        let grid = config.arena.build_grid().unwrap();
        assert_eq!(grid.cols(), 40);
        assert!(grid.boss_spawn().is_some() && grid.player_spawn().is_some());
    }

    #[test]
    fn unknown_archetype_is_reported() {
        let config = SimConfig::parse("[encounter]\narchetype = \"dragon\"\n").unwrap();
        assert!(matches!(
            config.archetype(),
            Err(GameError::UnknownArchetype(name)) if name == "dragon"
        ));
    }

    #[test]
    fn missing_encounter_section_fails() {
        assert!(SimConfig::parse("[logging]\nlevel = \"warn\"\n").is_err());
    }

    #[test]
    fn zero_tick_rate_rejected() {
        let toml_str = r#"
            [encounter]
            archetype = "brute"

            [simulation]
            tick_rate = 0
        "#;
        assert!(SimConfig::parse(toml_str).is_err());
    }
}
