// src/render/color_scale.rs

use super::color::Color;
use crate::grid::field::ScalarField2D;

/// Untergrenze für log10(min), wenn kein positives Minimum existiert.
const LOG_FLOOR: f64 = -3.0;
/// Ersatz-Maximum für Felder ohne positive Werte.
const DEFAULT_MAX: f64 = 0.01;
/// Mindestbreite des logarithmischen Bereichs.
const MIN_LOG_RANGE: f64 = 0.01;

/// Farbfamilie der Heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HueFamily {
    /// Rot-Gelb, für primäre (ECM) Moleküle.
    Warm,
    /// Blau-Cyan, für Feedback-Moleküle.
    Cool,
}

impl HueFamily {
    /// Bildet eine Intensität auf RGB ab. Kanäle werden abgerundet.
    pub fn color(self, intensity: f64) -> Color {
        let channel = |scale: f64| (255.0 * scale * intensity).min(255.0).max(0.0).floor() as u8;
        match self {
            HueFamily::Warm => Color::rgb(channel(2.0), channel(1.0), 0),
            HueFamily::Cool => Color::rgb(0, channel(1.0), channel(2.0)),
        }
    }
}

/// Adaptive Log-Normierung über das beobachtete Minimum/Maximum eines Feldes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    /// Kleinster positiver Wert (nach Korrektur evtl. 0).
    pub min_value: f64,
    /// Größter positiver Wert (0.01, falls keiner existiert).
    pub max_value: f64,
    pub log_min: f64,
    pub log_max: f64,
    pub log_range: f64,
}

impl ColorScale {
    /// Bestimmt die Normierung aus allen strikt positiven Einträgen.
    /// Nullen und negative Werte gehen nicht in die Bereichssuche ein.
    pub fn from_field<F: ScalarField2D + ?Sized>(field: &F) -> Self {
        let (min, max) = field
            .values()
            .filter(|v| *v > 0.0)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        Self::from_range(min, max)
    }

    /// Wendet die Korrekturregeln auf ein rohes (min, max) an.
    pub fn from_range(min_positive: f64, max_positive: f64) -> Self {
        let max_value = if max_positive.is_finite() && max_positive > 0.0 {
            max_positive
        } else {
            DEFAULT_MAX
        };
        let mut min_value = if min_positive.is_finite() { min_positive } else { 0.0 };
        if min_value >= max_value {
            min_value = 0.0;
        }

        let log_min = if min_value > 0.0 {
            min_value.log10()
        } else {
            LOG_FLOOR
        };
        let log_max = max_value.log10();
        let log_range = (log_max - log_min).max(MIN_LOG_RANGE);

        Self {
            min_value,
            max_value,
            log_min,
            log_max,
            log_range,
        }
    }

    /// Unbegrenzte Intensität. Kann > 1 werden, wenn `value` über dem
    /// beobachteten Maximum liegt, und < 0 unter dem Minimum.
    pub fn raw_intensity(&self, value: f64) -> f64 {
        if value > 0.0 {
            (value.log10() - self.log_min) / self.log_range
        } else {
            0.0
        }
    }

    /// Intensität auf `[0, 1]` begrenzt.
    pub fn intensity(&self, value: f64) -> f64 {
        self.raw_intensity(value).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64, family: HueFamily) -> Color {
        family.color(self.intensity(value))
    }
}
