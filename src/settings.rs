//! Game configuration
//!
//! Loaded from a JSON document listing the levels and the per-colour score
//! tables. Layout files are referenced by path and read by the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::colour_index;
use crate::consts::{COLOUR_COUNT, WILDCARD};
use crate::sim::{Board, Level, ScoreTable};

/// Errors raised while loading configuration or building a level
#[derive(Debug)]
pub enum LevelError {
    /// Config file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// Config JSON is malformed
    Parse(serde_json::Error),
    /// The config has no levels
    NoLevels,
    /// Requested level index is past the end
    MissingLevel(usize),
    /// A level releases balls every 0 seconds
    ZeroSpawnInterval(usize),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LevelError::Parse(e) => write!(f, "invalid config: {}", e),
            LevelError::NoLevels => write!(f, "config defines no levels"),
            LevelError::MissingLevel(i) => write!(f, "level {} does not exist", i + 1),
            LevelError::ZeroSpawnInterval(i) => {
                write!(f, "level {} has a spawn_interval of 0", i + 1)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io { source, .. } => Some(source),
            LevelError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e)
    }
}

/// One value per ball colour, keyed by colour name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourTable {
    #[serde(default)]
    pub grey: u32,
    #[serde(default)]
    pub orange: u32,
    #[serde(default)]
    pub blue: u32,
    #[serde(default)]
    pub green: u32,
    #[serde(default)]
    pub yellow: u32,
}

impl ColourTable {
    /// Values in colour-index order
    pub fn to_array(self) -> [u32; COLOUR_COUNT] {
        [self.grey, self.orange, self.blue, self.green, self.yellow]
    }

    /// Each entry scaled by `modifier`, truncated
    pub fn scaled(self, modifier: f32) -> [u32; COLOUR_COUNT] {
        self.to_array().map(|v| (v as f32 * modifier).max(0.0) as u32)
    }
}

fn default_modifier() -> f32 {
    1.0
}

/// Per-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSettings {
    /// Path of the layout file, relative to the config file
    pub layout: String,
    /// Time limit in seconds; absent or negative means unlimited
    #[serde(default)]
    pub time: Option<i32>,
    /// Seconds between ball releases
    pub spawn_interval: u32,
    #[serde(default = "default_modifier")]
    pub score_increase_from_hole_capture_modifier: f32,
    #[serde(default = "default_modifier")]
    pub score_decrease_from_wrong_hole_modifier: f32,
    /// Colours of the queued balls, in release order
    #[serde(default)]
    pub balls: Vec<String>,
}

impl LevelSettings {
    /// Time limit in whole seconds, `None` when unlimited
    pub fn time_limit(&self) -> Option<u32> {
        self.time.filter(|&t| t >= 0).map(|t| t as u32)
    }

    /// Ball colour indices; unknown names fall back to the wildcard
    pub fn ball_colours(&self) -> Vec<u8> {
        self.balls
            .iter()
            .map(|name| {
                colour_index(name).unwrap_or_else(|| {
                    log::warn!("Unknown ball colour {:?}, using grey", name);
                    WILDCARD
                })
            })
            .collect()
    }
}

/// Whole-game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub levels: Vec<LevelSettings>,
    pub score_increase_from_hole_capture: ColourTable,
    pub score_decrease_from_wrong_hole: ColourTable,
}

impl Settings {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let settings: Settings = serde_json::from_str(json)?;
        if settings.levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        if let Some(i) = settings.levels.iter().position(|l| l.spawn_interval == 0) {
            return Err(LevelError::ZeroSpawnInterval(i));
        }
        Ok(settings)
    }

    /// Read and parse a JSON config file
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded {} levels from {}", settings.levels.len(), path.display());
        Ok(settings)
    }

    pub fn level(&self, index: usize) -> Result<&LevelSettings, LevelError> {
        self.levels.get(index).ok_or(LevelError::MissingLevel(index))
    }

    /// Score table for a level, with its modifiers applied
    pub fn score_table(&self, index: usize) -> Result<ScoreTable, LevelError> {
        let level = self.level(index)?;
        Ok(ScoreTable {
            increase: self
                .score_increase_from_hole_capture
                .scaled(level.score_increase_from_hole_capture_modifier),
            decrease: self
                .score_decrease_from_wrong_hole
                .scaled(level.score_decrease_from_wrong_hole_modifier),
        })
    }

    /// Build a playable level from its settings and layout text
    pub fn build_level(&self, index: usize, layout: &str) -> Result<Level, LevelError> {
        let level = self.level(index)?;
        Ok(Level {
            board: Board::parse(layout),
            balls: level.ball_colours(),
            spawn_interval: level.spawn_interval,
            time_limit: level.time_limit(),
            scores: self.score_table(index)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "levels": [
            {
                "layout": "level1.txt",
                "time": 120,
                "spawn_interval": 10,
                "score_increase_from_hole_capture_modifier": 1.0,
                "score_decrease_from_wrong_hole_modifier": 1.0,
                "balls": ["blue", "orange", "grey"]
            },
            {
                "layout": "level2.txt",
                "time": -1,
                "spawn_interval": 8,
                "score_increase_from_hole_capture_modifier": 1.5,
                "score_decrease_from_wrong_hole_modifier": 0.5,
                "balls": ["pink"]
            }
        ],
        "score_increase_from_hole_capture": {
            "grey": 70, "orange": 50, "blue": 50, "green": 50, "yellow": 100
        },
        "score_decrease_from_wrong_hole": {
            "grey": 0, "orange": 25, "blue": 25, "green": 25, "yellow": 100
        }
    }"#;

    #[test]
    fn test_parse_config() {
        let settings = Settings::from_json(CONFIG).unwrap();
        assert_eq!(settings.levels.len(), 2);
        assert_eq!(settings.levels[0].time_limit(), Some(120));
        assert_eq!(settings.levels[1].time_limit(), None);
        assert_eq!(settings.levels[0].ball_colours(), vec![2, 1, 0]);
        // Unknown colours become the wildcard
        assert_eq!(settings.levels[1].ball_colours(), vec![0]);
    }

    #[test]
    fn test_score_table_modifiers() {
        let settings = Settings::from_json(CONFIG).unwrap();
        let table = settings.score_table(1).unwrap();
        assert_eq!(table.increase, [105, 75, 75, 75, 150]);
        assert_eq!(table.decrease, [0, 12, 12, 12, 50]);
    }

    #[test]
    fn test_build_level() {
        let settings = Settings::from_json(CONFIG).unwrap();
        let level = settings.build_level(0, "XXXX\nXS X\n").unwrap();
        assert_eq!(level.balls, vec![2, 1, 0]);
        assert_eq!(level.spawn_interval, 10);
        assert_eq!(level.board.spawners().len(), 1);
        assert!(matches!(
            settings.build_level(5, ""),
            Err(LevelError::MissingLevel(5))
        ));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(LevelError::Parse(_))
        ));
        let empty = r#"{"levels": [], "score_increase_from_hole_capture": {},
            "score_decrease_from_wrong_hole": {}}"#;
        assert!(matches!(Settings::from_json(empty), Err(LevelError::NoLevels)));
        let zero = r#"{"levels": [{"layout": "a", "spawn_interval": 0}],
            "score_increase_from_hole_capture": {}, "score_decrease_from_wrong_hole": {}}"#;
        assert!(matches!(
            Settings::from_json(zero),
            Err(LevelError::ZeroSpawnInterval(0))
        ));
    }

    #[test]
    fn test_bundled_levels_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let settings = Settings::load(&dir.join("config.json")).unwrap();
        for (i, level) in settings.levels.iter().enumerate() {
            let layout = std::fs::read_to_string(dir.join(&level.layout)).unwrap();
            let built = settings.build_level(i, &layout).unwrap();
            assert!(!built.board.spawners().is_empty(), "level {} has no spawner", i + 1);
            assert!(!built.balls.is_empty());
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
        assert!(err.to_string().contains("here.json"));
    }
}
