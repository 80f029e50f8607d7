use crate::browser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==================== Seasons ====================
/// Seasons cycle once per session: every restart moves to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Inclusive range of acorns hanging in a single tree.
    /// ┌──────────┬────────┐
    /// │ Season   │ Acorns │
    /// ├──────────┼────────┤
    /// │ Spring   │ 2..=5  │
    /// │ Summer   │ 1..=4  │
    /// │ Autumn   │ 0..=2  │
    /// │ Winter   │ 0..=1  │
    /// └──────────┴────────┘
    pub fn tree_acorn_band(self) -> (i32, i32) {
        match self {
            Season::Spring => (2, 5),
            Season::Summer => (1, 4),
            Season::Autumn => (0, 2),
            Season::Winter => (0, 1),
        }
    }

    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

// ==================== Errors ====================
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cheek capacity must be at least 1")]
    ZeroCapacity,
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("timer interval `{0}` must be at least 1ms")]
    ZeroInterval(&'static str),
    #[error("screen width {width} is narrower than the minimum {min}")]
    ScreenTooNarrow { width: i16, min: i16 },
    #[error("screen width {width} is wider than the maximum {max}")]
    ScreenTooWide { width: i16, max: i16 },
    #[error("floor band {floor_height} does not fit in a screen {height} high")]
    FloorOutOfBounds { floor_height: i16, height: i16 },
}

// ==================== Configuration ====================
/// Everything tunable about a play session. Missing fields in `config.json`
/// fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i16,
    pub height: i16,
    /// thickness of the ground strip at the bottom of the screen
    pub floor_height: i16,
    pub player: PlayerTuning,
    pub countdown: CountdownConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 700,
            height: 400,
            floor_height: 30,
            player: PlayerTuning::default(),
            countdown: CountdownConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub base_run_speed: f64,
    pub base_jump_height: f64,
    pub cheek_capacity: u32,
    /// run speed lost when the cheeks are completely full
    pub max_cheek_debuff: f64,
    pub coffee_buff: f64,
    pub coffee_decay_step: f64,
    pub coffee_decay_interval_ms: u32,
    pub golden_multiplier: f64,
    pub golden_duration_ms: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        PlayerTuning {
            base_run_speed: 2.0,
            base_jump_height: 4.0,
            cheek_capacity: 25,
            max_cheek_debuff: 1.0,
            coffee_buff: 2.0,
            coffee_decay_step: 0.1,
            coffee_decay_interval_ms: 500,
            golden_multiplier: 2.0,
            golden_duration_ms: 10_000,
        }
    }
}

/// Session length per season, in seconds. Winter is the shortest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    pub spring_secs: u32,
    pub summer_secs: u32,
    pub autumn_secs: u32,
    pub winter_secs: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        CountdownConfig {
            spring_secs: 180,
            summer_secs: 150,
            autumn_secs: 120,
            winter_secs: 90,
        }
    }
}

impl CountdownConfig {
    pub fn seconds(&self, season: Season) -> u32 {
        match season {
            Season::Spring => self.spring_secs,
            Season::Summer => self.summer_secs,
            Season::Autumn => self.autumn_secs,
            Season::Winter => self.winter_secs,
        }
    }
}

impl GameConfig {
    const CONFIG_PATH: &'static str = "config.json";
    // a tree canopy plus a little room to place it
    const MIN_WIDTH: i16 = 200;
    // keeps scene layout arithmetic well inside i16
    const MAX_WIDTH: i16 = 4_096;

    /// y coordinate of the top of the ground strip
    pub fn floor(&self) -> i16 {
        self.height - self.floor_height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < Self::MIN_WIDTH {
            return Err(ConfigError::ScreenTooNarrow {
                width: self.width,
                min: Self::MIN_WIDTH,
            });
        }
        if self.width > Self::MAX_WIDTH {
            return Err(ConfigError::ScreenTooWide {
                width: self.width,
                max: Self::MAX_WIDTH,
            });
        }
        if self.floor_height <= 0 || self.floor_height >= self.height {
            return Err(ConfigError::FloorOutOfBounds {
                floor_height: self.floor_height,
                height: self.height,
            });
        }
        let player = &self.player;
        if player.cheek_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        for (field, value) in [
            ("coffee_buff", player.coffee_buff),
            ("coffee_decay_step", player.coffee_decay_step),
            ("golden_multiplier", player.golden_multiplier),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if player.coffee_decay_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("coffee_decay_interval_ms"));
        }
        if player.golden_duration_ms == 0 {
            return Err(ConfigError::ZeroInterval("golden_duration_ms"));
        }
        Ok(())
    }

    /// Fetch `config.json` next to the page. Any failure (missing file, bad
    /// JSON, invalid values) keeps the compiled defaults.
    pub async fn load() -> GameConfig {
        match browser::fetch_json::<GameConfig>(Self::CONFIG_PATH).await {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    log::info!("loaded {}", Self::CONFIG_PATH);
                    config
                }
                Err(err) => {
                    log::warn!("{} rejected ({}), using defaults", Self::CONFIG_PATH, err);
                    GameConfig::default()
                }
            },
            Err(err) => {
                log::warn!("{} unavailable ({:#}), using defaults", Self::CONFIG_PATH, err);
                GameConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.floor(), 370);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "width": 800, "player": { "cheek_capacity": 10 } }"#)
                .unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 400);
        assert_eq!(config.player.cheek_capacity, 10);
        assert_eq!(config.player.base_run_speed, 2.0);
    }

    #[test]
    fn rejects_zero_capacity_and_bad_decay() {
        let mut config = GameConfig::default();
        config.player.cheek_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let mut config = GameConfig::default();
        config.player.coffee_decay_step = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "coffee_decay_step",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_non_positive_buffs() {
        let mut config = GameConfig::default();
        config.player.coffee_buff = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "coffee_buff",
                value: 0.0
            })
        );

        let mut config = GameConfig::default();
        config.player.golden_multiplier = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "golden_multiplier",
                value: -1.0
            })
        );

        config.player.golden_multiplier = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "golden_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn rejects_screens_too_wide_to_lay_out() {
        let mut config = GameConfig::default();
        config.width = 12_000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ScreenTooWide {
                width: 12_000,
                max: 4_096
            })
        );
        config.width = 4_096;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_floor_taller_than_screen() {
        let mut config = GameConfig::default();
        config.floor_height = 400;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FloorOutOfBounds { .. })
        ));
    }

    #[test]
    fn winter_is_the_shortest_session() {
        let countdown = CountdownConfig::default();
        let winter = countdown.seconds(Season::Winter);
        for season in [Season::Spring, Season::Summer, Season::Autumn] {
            assert!(countdown.seconds(season) > winter);
        }
        assert_eq!(countdown.seconds(Season::Spring), 180);
    }

    #[test]
    fn seasons_cycle_back_to_spring() {
        let mut season = Season::Spring;
        for _ in 0..4 {
            season = season.next();
        }
        assert_eq!(season, Season::Spring);
    }
}
