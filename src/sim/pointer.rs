// src/sim/pointer.rs
//
// Zeigereingaben auf der Heatmap als explizite Zustandsmaschine
// (Idle -> Painting -> Idle), unabhängig von einer Fenster-API.

use crate::grid::coords::{GridCell, GridIndex, to_grid};
use bevy::math::Vec2;

/// Diskrete Zeigerereignisse in Pixeln der angezeigten Fläche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    Leave,
    Click(Vec2),
}

/// Aktive Interaktionsmodi. Beide dürfen gleichzeitig an sein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionModes {
    pub brush: bool,
    pub track: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Painting,
}

/// Was die Sitzung auf ein Ereignis hin tun soll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Pinselstempel um diesen (evtl. außerhalb liegenden) Index.
    Stamp(GridIndex),
    /// Malen beendet: Overrides komplett neu setzen.
    CommitSelection,
    ToggleTracked(GridCell),
}

/// Umrechnung Pixel -> Gitter für die aktuelle Anzeige.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub width: f32,
    pub grid_n: usize,
}

impl SurfaceGeometry {
    pub fn index_at(&self, position: Vec2) -> GridIndex {
        to_grid(position.x, position.y, self.width, self.grid_n)
    }
}

impl PointerState {
    /// Ein Übergang. Beobachten hat Vorrang: bei aktivem Beobachtungsmodus
    /// startet ein Druck kein Malen.
    pub fn handle(
        self,
        event: PointerEvent,
        modes: InteractionModes,
        geometry: SurfaceGeometry,
    ) -> (PointerState, Option<PointerAction>) {
        use PointerEvent::*;
        use PointerState::*;

        match (self, event) {
            (Idle, Down(pos)) if modes.brush && !modes.track => {
                (Painting, Some(PointerAction::Stamp(geometry.index_at(pos))))
            }
            (Painting, Down(pos)) | (Painting, Move(pos)) if modes.brush => {
                (Painting, Some(PointerAction::Stamp(geometry.index_at(pos))))
            }
            (Painting, Up) | (Painting, Leave) => {
                let action = modes.brush.then_some(PointerAction::CommitSelection);
                (Idle, action)
            }
            // Pinsel wurde während des Malens abgeschaltet
            (Painting, _) if !modes.brush => (Idle, None),
            (state, Click(pos)) if modes.track => {
                let action = geometry
                    .index_at(pos)
                    .to_cell(geometry.grid_n)
                    .map(PointerAction::ToggleTracked);
                (state, action)
            }
            (state, _) => (state, None),
        }
    }
}
