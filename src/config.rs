//! Session configuration.
//!
//! The browser host may pass a JSON object; missing fields fall back to the
//! defaults below. A config is validated once when a `Game` is built and never
//! changes afterwards.

use serde::Deserialize;
use thiserror::Error;

use crate::grid::{Bounds, Cell};
use crate::narrator::NARRATOR_SCRIPT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub grid_width: u16,
    pub grid_height: u16,
    /// Pixel size of one cell; rendering only.
    pub cell_size: u16,
    /// Base tick interval in milliseconds.
    pub tick_ms: u32,
    /// Herd length that wins the game.
    pub win_length: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 15,
            cell_size: 32,
            tick_ms: 150,
            win_length: NARRATOR_SCRIPT.len() + 1,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u16, height: u16 },
    #[error("cell size must be non-zero")]
    ZeroCellSize,
    #[error("tick interval must be at least 2ms, got {0}ms")]
    TickTooShort(u32),
    #[error("win length must be at least 2, got {0}")]
    WinTooShort(usize),
    #[error("win length {win_length} leaves no free cell on a {area}-cell grid")]
    WinExceedsGrid { win_length: usize, area: usize },
    #[error("invalid config json: {0}")]
    Json(String),
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.tick_ms < 2 {
            return Err(ConfigError::TickTooShort(self.tick_ms));
        }
        if self.win_length < 2 {
            return Err(ConfigError::WinTooShort(self.win_length));
        }
        // A target is spawned right before the win check, so the herd must never
        // fill the board.
        let area = self.bounds().area();
        if self.win_length >= area {
            return Err(ConfigError::WinExceedsGrid {
                win_length: self.win_length,
                area,
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(i32::from(self.grid_width), i32::from(self.grid_height))
    }

    pub fn start_cell(&self) -> Cell {
        self.bounds().center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.win_length, 15);
        assert_eq!(config.start_cell(), Cell::new(10, 7));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = GameConfig::from_json(r#"{"gridWidth": 10, "tickMs": 200}"#).unwrap();
        assert_eq!(config.grid_width, 10);
        assert_eq!(config.grid_height, 15);
        assert_eq!(config.tick_ms, 200);
        assert_eq!(config.win_length, 15);
    }

    #[test]
    fn rejects_unwinnable_or_degenerate_configs() {
        let base = GameConfig::default();
        let empty = GameConfig { grid_height: 0, ..base };
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyGrid { .. })));

        let fast = GameConfig { tick_ms: 1, ..base };
        assert_eq!(fast.validate(), Err(ConfigError::TickTooShort(1)));

        let tiny = GameConfig { grid_width: 2, grid_height: 2, win_length: 4, ..base };
        assert_eq!(tiny.validate(), Err(ConfigError::WinExceedsGrid { win_length: 4, area: 4 }));

        let trivial = GameConfig { win_length: 1, ..base };
        assert_eq!(trivial.validate(), Err(ConfigError::WinTooShort(1)));
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(GameConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            GameConfig::from_json(r#"{"cellSize": 0}"#),
            Err(ConfigError::ZeroCellSize)
        ));
    }
}
