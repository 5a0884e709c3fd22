// src/sim/scheduler.rs

use super::session::{Session, StepOutcome};
use bevy::log::{info, warn};
use bevy::prelude::Resource;

/// Ergebnis eines Frame-Ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nicht gestartet.
    Idle,
    Advanced,
    /// Läuft, aber die Engine ist noch nicht bereit.
    Waiting,
    /// Schritt fehlgeschlagen, Lauf gestoppt.
    Stopped,
}

/// Kooperative Schleife: der Host ruft [`FrameScheduler::tick`] einmal pro
/// Frame, solange `running` gesetzt ist folgt je ein Schritt mit Redraw.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameScheduler {
    running: bool,
    ticks: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("Simulation run started.");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Simulation run stopped after {} ticks.", self.ticks);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Anzahl ausgeführter Schritte seit Programmstart.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self, session: &mut Session) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        match session.step() {
            Ok(StepOutcome::Advanced) => {
                self.ticks += 1;
                TickOutcome::Advanced
            }
            Ok(StepOutcome::Skipped) => TickOutcome::Waiting,
            Err(err) => {
                warn!("Stopping the run after a failed step: {err}");
                self.stop();
                TickOutcome::Stopped
            }
        }
    }
}
