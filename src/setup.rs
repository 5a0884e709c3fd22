// ./src/setup.rs
use crate::config::VisualizerConfig;
use crate::engine::DiffusionEngine;
use crate::sim::Session;
use crate::ui::StatusLine;
use bevy::prelude::*;

/// Lädt die Konfiguration; eine kaputte Datei fällt auf die Defaults zurück.
pub fn load_config() -> VisualizerConfig {
    match VisualizerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!("Ignoring configuration ({err}), using defaults.");
            VisualizerConfig::default()
        }
    }
}

pub fn setup_scene(mut commands: Commands) {
    // egui zeichnet alles, die Kamera liefert nur das Fenster-Target
    commands.spawn(Camera2dBundle::default());
}

/// Baut die Sitzung und bindet die Diffusions-Engine an.
pub fn setup_session(
    mut commands: Commands,
    config: Res<VisualizerConfig>,
    mut status: ResMut<StatusLine>,
) {
    let engine = match config.seed {
        Some(seed) => DiffusionEngine::with_seed(config.grid_size, seed),
        None => DiffusionEngine::new(config.grid_size),
    };
    info!("Diffusion engine seed: {}", engine.seed());

    let mut session = Session::new((*config).clone());
    match session.attach_engine(Box::new(engine)) {
        Ok(()) => status.info("Engine ready."),
        Err(err) => status.error(format!("Engine could not be started: {err}")),
    }
    commands.insert_resource(session);
}
