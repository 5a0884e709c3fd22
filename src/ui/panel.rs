// src/ui/panel.rs
use super::{StatusKind, StatusLine, to_color32};
use crate::config::VisualizerConfig;
use crate::engine::molecules::INPUT_MOLECULES;
use crate::engine::{MoleculeFamily, MoleculeId, RateConstants};
use crate::export::{ExportFormat, ExportTarget};
use crate::sim::{FrameScheduler, Session, StepOutcome};
use bevy::prelude::*;
use bevy_egui::{
    EguiContexts,
    egui::{self, ComboBox, DragValue, Slider, Window},
};

/// Bereich des Zeitschritt-Reglers.
const TIME_STEP_RANGE: std::ops::RangeInclusive<f64> = 0.01..=0.5;
/// Exporte landen im Arbeitsverzeichnis.
const EXPORT_DIR: &str = ".";

pub fn control_panel_system(
    mut contexts: EguiContexts,
    mut session: ResMut<Session>,
    mut scheduler: ResMut<FrameScheduler>,
    mut status: ResMut<StatusLine>,
) {
    let session = session.as_mut();
    let scheduler = scheduler.as_mut();
    let status = status.as_mut();

    Window::new("ECM Explorer")
        .default_width(350.0)
        .default_pos(egui::pos2(540.0, 10.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Simulation");
            ui.label(format!(
                "Iteration: {} | Time: {:.2}",
                session.iteration(),
                session.time()
            ));
            if !session.is_ready() {
                ui.colored_label(egui::Color32::YELLOW, "Engine not ready.");
            }
            run_controls(ui, session, scheduler, status);

            ui.collapsing("Molecule", |ui| molecule_selector(ui, session, status));
            ui.collapsing("Brush (input)", |ui| brush_controls(ui, session, status));
            ui.collapsing("Tracked cells (plot)", |ui| tracking_controls(ui, session, status));
            ui.collapsing("ODE parameters", |ui| parameter_controls(ui, session, status));
            ui.collapsing("Export", |ui| export_controls(ui, session, status));

            if !status.is_empty() {
                ui.separator();
                match status.kind {
                    StatusKind::Info => ui.label(status.text.as_str()),
                    StatusKind::Error => ui.colored_label(egui::Color32::RED, status.text.as_str()),
                };
            }
        });
}

/// Fehler landen in der Statuszeile, geloggt hat sie die Sitzung schon.
fn report<T, E: std::fmt::Display>(status: &mut StatusLine, action: &str, result: Result<T, E>) {
    if let Err(err) = result {
        status.error(format!("{action} failed: {err}"));
    }
}

fn run_controls(
    ui: &mut egui::Ui,
    session: &mut Session,
    scheduler: &mut FrameScheduler,
    status: &mut StatusLine,
) {
    ui.horizontal(|ui| {
        let running = scheduler.is_running();
        if ui.add_enabled(!running, egui::Button::new("▶ Start")).clicked() {
            scheduler.start();
        }
        if ui.add_enabled(running, egui::Button::new("⏸ Stop")).clicked() {
            scheduler.stop();
        }
        if ui.button("Step ▶").clicked() {
            match session.step() {
                Ok(StepOutcome::Advanced) => {}
                Ok(StepOutcome::Skipped) => status.info("Engine not ready, step ignored."),
                Err(err) => status.error(format!("Step failed: {err}")),
            }
        }
        if ui.button("↺ Reset").clicked() {
            scheduler.stop();
            match session.reset() {
                Ok(()) => status.info("Simulation reset."),
                Err(err) => status.error(format!("Reset failed: {err}")),
            }
        }
    });
}

fn molecule_selector(ui: &mut egui::Ui, session: &mut Session, status: &mut StatusLine) {
    let current = session.molecule();
    let mut selected = current;
    ComboBox::from_label("Displayed molecule")
        .selected_text(format!("{} ({})", current, current.family))
        .show_ui(ui, |ui| {
            for family in [MoleculeFamily::Primary, MoleculeFamily::Feedback] {
                ui.label(family.to_string());
                for molecule in MoleculeId::all().filter(|m| m.family == family) {
                    ui.selectable_value(&mut selected, molecule, molecule.to_string());
                }
            }
        });
    if selected != current {
        report(status, "Switching molecule", session.set_molecule(selected));
    }
}

fn brush_controls(ui: &mut egui::Ui, session: &mut Session, status: &mut StatusLine) {
    let mut brush = session.modes().brush;
    if ui.checkbox(&mut brush, "Brush mode").changed() {
        session.set_brush_mode(brush);
    }

    let mut radius = session.brush_radius();
    if ui
        .add(Slider::new(&mut radius, VisualizerConfig::BRUSH_RADIUS_RANGE).text("Brush size"))
        .changed()
    {
        session.set_brush_radius(radius);
    }

    ui.horizontal(|ui| {
        let count = session.selection().len();
        if count == 0 {
            ui.label("No cells selected");
        } else {
            ui.label(format!("{count} cells selected for input"));
        }
        if ui.button("Clear selection").clicked() {
            report(status, "Clearing the selection", session.clear_selection());
        }
    });

    ui.separator();
    ui.label("Input molecules (applied to selected cells)");
    let values = *session.input_values();
    for (index, name) in INPUT_MOLECULES.iter().enumerate() {
        let mut value = values[index];
        if ui
            .add(Slider::new(&mut value, 0.0..=1.0).step_by(0.01).text(*name))
            .changed()
        {
            report(status, "Applying input values", session.set_input_value(index, value));
        }
    }
}

fn tracking_controls(ui: &mut egui::Ui, session: &mut Session, status: &mut StatusLine) {
    let mut track = session.modes().track;
    if ui.checkbox(&mut track, "Cell selection mode").changed() {
        session.set_track_mode(track);
    }
    ui.horizontal(|ui| {
        ui.label(format!(
            "{} cells selected for tracking (max {})",
            session.tracker().len(),
            session.tracker().capacity()
        ));
        if ui.button("Clear tracked cells").clicked() {
            report(status, "Clearing tracked cells", session.clear_tracked());
        }
    });

    // Editor für die Konzentration des angezeigten Moleküls
    let values = match session.tracked_values() {
        Ok(values) if !values.is_empty() => values,
        Ok(_) => return,
        Err(err) => {
            status.error(format!("Reading tracked cells failed: {err}"));
            return;
        }
    };
    ui.label(format!("{} at tracked cells", session.molecule()));
    for (k, (tracked, current)) in values.into_iter().enumerate() {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 0.0, to_color32(tracked.color));
            ui.label(format!("Cell {} {}", k + 1, tracked.cell));
            let mut value = current;
            if ui
                .add(
                    DragValue::new(&mut value)
                        .speed(0.01)
                        .clamp_range(0.0..=1.0)
                        .max_decimals(4),
                )
                .changed()
            {
                report(
                    status,
                    "Editing the concentration",
                    session.set_cell_concentration(tracked.cell, value),
                );
            }
        });
    }
}

fn parameter_controls(ui: &mut egui::Ui, session: &mut Session, status: &mut StatusLine) {
    let mut dt = session.time_step();
    if ui
        .add(Slider::new(&mut dt, TIME_STEP_RANGE).step_by(0.01).text("Time step"))
        .changed()
    {
        report(status, "Setting the time step", session.set_time_step(dt));
    }

    let mut rates = *session.rates();
    let mut changed = false;
    for ((name, value), range) in rates.iter_mut().zip(RateConstants::RANGES) {
        changed |= ui
            .add(Slider::new(value, range).text(name).max_decimals(4))
            .changed();
    }
    if changed {
        report(status, "Updating rate constants", session.set_rate_constants(rates));
    }
    if ui.button("Restore defaults").clicked() {
        report(
            status,
            "Restoring rate constants",
            session.set_rate_constants(RateConstants::default()),
        );
    }
}

fn export_controls(ui: &mut egui::Ui, session: &mut Session, status: &mut StatusLine) {
    let buttons = [
        ("Heatmap SVG", ExportTarget::Heatmap, ExportFormat::Svg),
        ("Heatmap PNG", ExportTarget::Heatmap, ExportFormat::Png),
        ("Line plot SVG", ExportTarget::LinePlot, ExportFormat::Svg),
        ("Line plot PNG", ExportTarget::LinePlot, ExportFormat::Png),
    ];
    ui.horizontal_wrapped(|ui| {
        for (label, target, format) in buttons {
            if ui.button(label).clicked() {
                export_to_disk(session, status, target, format);
            }
        }
    });
}

/// Exportiert und speichert; jeder Fehler endet als Statusmeldung.
fn export_to_disk(
    session: &mut Session,
    status: &mut StatusLine,
    target: ExportTarget,
    format: ExportFormat,
) {
    let saved = session.export(target, format).and_then(|snapshot| {
        snapshot
            .map(|snapshot| {
                snapshot
                    .save(EXPORT_DIR)
                    .inspect_err(|err| error!("Writing the {target} export failed: {err}"))
            })
            .transpose()
    });
    match saved {
        Ok(Some(path)) => status.info(format!("Saved {}", path.display())),
        Ok(None) => status.info("Engine not ready, nothing exported."),
        Err(err) => status.error(format!("Error exporting {target}: {err}")),
    }
}
