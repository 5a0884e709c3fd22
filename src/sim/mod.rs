// src/sim/mod.rs
//
// Sitzungszustand, Zeigerlogik und Frame-Schleife.

pub mod pointer;
pub mod scheduler;
pub mod session;
pub mod systems;

#[cfg(test)]
pub(crate) mod testing;

pub use pointer::{InteractionModes, PointerAction, PointerEvent, PointerState};
pub use scheduler::{FrameScheduler, TickOutcome};
pub use session::{EngineLink, LiveFrame, Session, StepOutcome};
