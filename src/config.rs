// src/config.rs

use crate::engine::RateConstants;
use crate::grid::tracking::MAX_TRACKED_CELLS;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Umgebungsvariable mit dem Pfad zu einer JSON-Konfiguration.
pub const CONFIG_ENV_VAR: &str = "ECM_EXPLORER_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Einstellungen der Visualisierung.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Kantenlänge N des Gitters.
    pub grid_size: usize,
    /// Kantenlänge der Live-Heatmap in Pixeln.
    pub heatmap_size: u32,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Kantenlänge der exportierten Heatmap (SVG und PNG).
    pub export_size: u32,
    /// Startradius des Pinsels in Zellen.
    pub brush_radius: u32,
    /// Maximal beobachtete Zellen (höchstens 8).
    pub tracker_capacity: usize,
    /// Proben pro Zeitreihe.
    pub history_len: usize,
    pub time_step: f64,
    pub rates: RateConstants,
    /// Seed der Ersatz-Engine; `None` = zufällig.
    pub seed: Option<u64>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            heatmap_size: 500,
            chart_width: 700,
            chart_height: 300,
            export_size: 600,
            brush_radius: 5,
            tracker_capacity: MAX_TRACKED_CELLS,
            history_len: 300,
            time_step: 0.1,
            rates: RateConstants::default(),
            seed: None,
        }
    }
}

impl VisualizerConfig {
    pub const BRUSH_RADIUS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

    pub fn new() -> Self {
        Self::default()
    }

    /// Variante mit 2 beobachteten Zellen und 200 Proben.
    pub fn reduced() -> Self {
        Self::default().with_tracker_capacity(2).with_history_len(200)
    }

    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.grid_size = size;
        self
    }

    pub fn with_heatmap_size(mut self, size: u32) -> Self {
        self.heatmap_size = size;
        self
    }

    pub fn with_brush_radius(mut self, radius: u32) -> Self {
        self.brush_radius = radius.clamp(
            *Self::BRUSH_RADIUS_RANGE.start(),
            *Self::BRUSH_RADIUS_RANGE.end(),
        );
        self
    }

    pub fn with_tracker_capacity(mut self, capacity: usize) -> Self {
        self.tracker_capacity = capacity.min(MAX_TRACKED_CELLS);
        self
    }

    pub fn with_history_len(mut self, len: usize) -> Self {
        self.history_len = len;
        self
    }

    pub fn with_time_step(mut self, dt: f64) -> Self {
        self.time_step = dt;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |message: &str| {
            Err(ConfigError::InvalidConfiguration {
                message: message.to_string(),
            })
        };
        if self.grid_size == 0 {
            return invalid("grid_size must be greater than 0");
        }
        if self.heatmap_size == 0 || self.export_size == 0 {
            return invalid("heatmap_size and export_size must be greater than 0");
        }
        if self.chart_width <= 80 || self.chart_height <= 80 {
            return invalid("chart must be larger than its padding (80px)");
        }
        if !Self::BRUSH_RADIUS_RANGE.contains(&self.brush_radius) {
            return invalid("brush_radius must be within 1..=20");
        }
        if self.tracker_capacity == 0 || self.tracker_capacity > MAX_TRACKED_CELLS {
            return invalid("tracker_capacity must be within 1..=8");
        }
        if self.history_len < 2 {
            return invalid("history_len must be at least 2");
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return invalid("time_step must be positive");
        }
        if self.rates.validate().is_err() {
            return invalid("rate constants must be positive");
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Lädt die Datei aus [`CONFIG_ENV_VAR`]; ohne Variable gelten die Defaults.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
