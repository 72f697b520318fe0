//! Run settings
//!
//! Loaded from a JSON file by the host shell. Every field has a default so
//! partial files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::BOSS_SPAWN_TIME_MS;

/// Game mode chosen on the mode-select screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Normal,
    /// Reduced effects for slow machines
    Lite,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "Normal",
            GameMode::Lite => "Lite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(GameMode::Normal),
            "lite" | "performance" => Some(GameMode::Lite),
            _ => None,
        }
    }

    /// Particles actually emitted for a requested burst size
    pub fn particle_count(&self, requested: usize) -> usize {
        match self {
            GameMode::Normal => requested,
            GameMode::Lite => requested / 3,
        }
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Effects level
    pub mode: GameMode,
    /// Hard cap on live particles
    pub max_particles: usize,
    /// Time between boss spawns
    pub boss_interval_ms: f64,
    /// Fill the world with shapes when a run starts
    pub initial_shapes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Normal,
            max_particles: 2000,
            boss_interval_ms: BOSS_SPAWN_TIME_MS,
            initial_shapes: true,
        }
    }
}

impl Settings {
    /// Create settings for a game mode (applies mode defaults)
    pub fn from_mode(mode: GameMode) -> Self {
        let mut settings = Self {
            mode,
            ..Self::default()
        };
        if mode == GameMode::Lite {
            settings.max_particles = 500;
        }
        settings
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Replace unusable numbers with defaults
    fn sanitize(&mut self) {
        if !self.boss_interval_ms.is_finite() || self.boss_interval_ms <= 0.0 {
            log::warn!(
                "Ignoring boss interval {}, using default",
                self.boss_interval_ms
            );
            self.boss_interval_ms = BOSS_SPAWN_TIME_MS;
        }
    }
}
