// src/sim/systems.rs
use super::scheduler::{FrameScheduler, TickOutcome};
use super::session::Session;
use crate::ui::StatusLine;
use bevy::prelude::*;

/// Ein Tick pro Frame; ein fehlgeschlagener Schritt beendet den Lauf.
pub fn frame_tick_system(
    mut scheduler: ResMut<FrameScheduler>,
    mut session: ResMut<Session>,
    mut status: ResMut<StatusLine>,
) {
    if !scheduler.is_running() {
        return;
    }
    if scheduler.tick(&mut session) == TickOutcome::Stopped {
        status.error("Simulation step failed, run stopped.");
    }
}
