// src/ui/mod.rs
//
// Dünne egui-Schicht: Steuerfenster, Heatmap- und Diagrammansicht.

pub mod panel;
pub mod view;

use crate::render::Color;
use bevy::prelude::Resource;
use bevy_egui::egui::Color32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    Info,
    Error,
}

/// Letzte Meldung für den Benutzer (Exporte, fehlgeschlagene Schritte).
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    pub fn info(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.kind = StatusKind::Info;
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.kind = StatusKind::Error;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub fn to_color32(color: Color) -> Color32 {
    let alpha = (color.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}
