use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::BoardSize;
use crate::{Result, SimonError};

/// Top-level configuration structure for the game, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub pattern: PatternConfig,
    pub timing: TimingConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.board.columns == 0 || self.board.rows == 0 {
            return Err(SimonError::Config(
                "board.columns and board.rows must be > 0".into(),
            ));
        }
        if self.pattern.length == 0 {
            return Err(SimonError::Config("pattern.length must be > 0".into()));
        }
        let timing = &self.timing;
        if timing.flash_step_ms == 0 || timing.tap_step_ms == 0 || timing.reveal_step_ms == 0 {
            return Err(SimonError::Config("step delays must be > 0".into()));
        }
        Ok(())
    }

    /// Pretty JSON with every default value, handy as a starting config file.
    pub fn default_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&AppConfig::default())?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub columns: u8,
    pub rows: u8,
}

impl BoardConfig {
    pub fn size(&self) -> BoardSize {
        BoardSize::new(self.columns, self.rows)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            rows: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Entries in the pattern pool.
    pub length: usize,
    /// Fixed RNG seed for reproducible games.
    pub seed: Option<u64>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            length: 1000,
            seed: None,
        }
    }
}

/// Delays in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub flash_step_ms: u64,
    pub tap_step_ms: u64,
    pub reveal_step_ms: u64,
    pub round_advance_ms: u64,
    pub reset_ms: u64,
    /// Extra corner-chase cycles; the flash runs `flash_revs + 1` cycles.
    pub flash_revs: u32,
}

impl TimingConfig {
    pub fn flash_step(&self) -> Duration {
        Duration::from_millis(self.flash_step_ms)
    }

    pub fn tap_step(&self) -> Duration {
        Duration::from_millis(self.tap_step_ms)
    }

    pub fn reveal_step(&self) -> Duration {
        Duration::from_millis(self.reveal_step_ms)
    }

    pub fn round_advance(&self) -> Duration {
        Duration::from_millis(self.round_advance_ms)
    }

    pub fn reset(&self) -> Duration {
        Duration::from_millis(self.reset_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            flash_step_ms: 50,
            tap_step_ms: 100,
            reveal_step_ms: 200,
            round_advance_ms: 500,
            reset_ms: 2000,
            flash_revs: 3,
        }
    }
}
