// ./src/main.rs
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

// Eigene Module deklarieren
pub mod config;
pub mod engine;
pub mod export;
pub mod grid;
pub mod render;
pub mod setup;
pub mod sim;
pub mod ui;

use setup::{load_config, setup_scene, setup_session};
use sim::{FrameScheduler, systems::frame_tick_system};
use ui::{
    StatusLine,
    panel::control_panel_system,
    view::{LiveTextures, chart_view_system, heatmap_view_system},
};

fn main() {
    let config = load_config();
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "ECM Explorer".into(),
                resolution: (1280.0, 900.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(config)
        .init_resource::<FrameScheduler>()
        .init_resource::<StatusLine>()
        .init_resource::<LiveTextures>()
        .add_systems(Startup, (setup_scene, setup_session).chain())
        .add_systems(
            Update,
            (
                // Erst rechnen, dann Eingaben und Ansichten
                frame_tick_system,
                control_panel_system,
                heatmap_view_system,
                chart_view_system,
            )
                .chain(),
        )
        .run();
}
