// src/engine/molecules.rs

use crate::render::color_scale::HueFamily;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primäre (ECM) Moleküle in Engine-Reihenfolge.
pub const PRIMARY_MOLECULES: [&str; 17] = [
    "proCI",
    "proCIII",
    "fibronectin",
    "periostin",
    "TNC",
    "PAI1",
    "CTGF",
    "EDAFN",
    "TIMP1",
    "TIMP2",
    "proMMP1",
    "proMMP2",
    "proMMP3",
    "proMMP8",
    "proMMP9",
    "proMMP12",
    "proMMP14",
];

/// Feedback-Moleküle in Engine-Reihenfolge.
pub const FEEDBACK_MOLECULES: [&str; 4] = ["TGFBfb", "AngIIfb", "IL6fb", "ET1fb"];

/// Eingabemoleküle, die der Pinsel pro Zelle überschreibt.
pub const INPUT_MOLECULES: [&str; 11] = [
    "AngIIin",
    "TGFBin",
    "tensionin",
    "IL6in",
    "IL1in",
    "TNFain",
    "NEin",
    "PDGFin",
    "ET1in",
    "NPin",
    "E2in",
];

pub const INPUT_COUNT: usize = INPUT_MOLECULES.len();

/// Namensraum eines Moleküls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoleculeFamily {
    #[default]
    Primary,
    Feedback,
}

impl MoleculeFamily {
    pub fn names(self) -> &'static [&'static str] {
        match self {
            MoleculeFamily::Primary => &PRIMARY_MOLECULES,
            MoleculeFamily::Feedback => &FEEDBACK_MOLECULES,
        }
    }

    pub fn hue(self) -> HueFamily {
        match self {
            MoleculeFamily::Primary => HueFamily::Warm,
            MoleculeFamily::Feedback => HueFamily::Cool,
        }
    }
}

impl fmt::Display for MoleculeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoleculeFamily::Primary => write!(f, "ECM"),
            MoleculeFamily::Feedback => write!(f, "Feedback"),
        }
    }
}

/// Auswahl eines Moleküls: Namensraum plus Index darin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MoleculeId {
    pub family: MoleculeFamily,
    pub index: usize,
}

impl MoleculeId {
    pub const fn primary(index: usize) -> Self {
        Self {
            family: MoleculeFamily::Primary,
            index,
        }
    }

    pub const fn feedback(index: usize) -> Self {
        Self {
            family: MoleculeFamily::Feedback,
            index,
        }
    }

    /// `None` für einen Index außerhalb des Katalogs.
    pub fn name(&self) -> Option<&'static str> {
        self.family.names().get(self.index).copied()
    }

    pub fn is_known(&self) -> bool {
        self.name().is_some()
    }

    pub fn hue(&self) -> HueFamily {
        self.family.hue()
    }

    /// Alle bekannten Moleküle, erst primär, dann Feedback.
    pub fn all() -> impl Iterator<Item = MoleculeId> {
        (0..PRIMARY_MOLECULES.len())
            .map(MoleculeId::primary)
            .chain((0..FEEDBACK_MOLECULES.len()).map(MoleculeId::feedback))
    }
}

impl fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}#{}", self.family, self.index),
        }
    }
}
