// src/ui/view.rs
//
// Zeigt die Live-Flächen als egui-Texturen und füttert Zeigereingaben der
// Heatmap in die Sitzung.

use super::StatusLine;
use crate::render::Surface;
use crate::sim::{PointerEvent, Session};
use bevy::prelude::*;
use bevy_egui::{
    EguiContexts,
    egui::{self, ColorImage, TextureHandle, TextureOptions},
};

/// Hochgeladene Texturen und die Revision, aus der sie stammen.
#[derive(Resource, Default)]
pub struct LiveTextures {
    heatmap: Option<TextureHandle>,
    chart: Option<TextureHandle>,
    revision: Option<u64>,
}

/// Zeigerzustand der Ansicht zwischen zwei Frames.
#[derive(Default)]
pub struct HoverMemory {
    hovered: bool,
}

fn color_image(surface: &Surface) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [surface.width() as usize, surface.height() as usize],
        surface.as_raw(),
    )
}

fn upload(ctx: &egui::Context, slot: &mut Option<TextureHandle>, name: &str, surface: &Surface) {
    let image = color_image(surface);
    match slot {
        Some(handle) => handle.set(image, TextureOptions::NEAREST),
        None => *slot = Some(ctx.load_texture(name, image, TextureOptions::NEAREST)),
    }
}

impl LiveTextures {
    /// Lädt neu hoch, wenn die Sitzung seit dem letzten Frame neu gezeichnet hat.
    fn sync(&mut self, ctx: &egui::Context, session: &Session) {
        let live = session.live();
        if self.revision == Some(live.revision) {
            return;
        }
        upload(ctx, &mut self.heatmap, "ecm-heatmap", &live.heatmap);
        upload(ctx, &mut self.chart, "ecm-lineplot", &live.chart);
        self.revision = Some(live.revision);
    }
}

/// Übersetzt die egui-Antwort eines Frames in diskrete Zeigerereignisse.
/// Reihenfolge: Down, Move, Up, Click, Leave.
fn pointer_events(ui: &egui::Ui, response: &egui::Response, memory: &mut HoverMemory) -> Vec<PointerEvent> {
    let origin = response.rect.min;
    let local = |pos: egui::Pos2| Vec2::new(pos.x - origin.x, pos.y - origin.y);
    let (pressed, released, delta) = ui.input(|input| {
        (
            input.pointer.primary_pressed(),
            input.pointer.primary_released(),
            input.pointer.delta(),
        )
    });

    let mut events = Vec::new();
    if let Some(pos) = response.interact_pointer_pos().or(response.hover_pos()) {
        if pressed && response.hovered() {
            events.push(PointerEvent::Down(local(pos)));
        } else if response.dragged() && delta != egui::Vec2::ZERO {
            events.push(PointerEvent::Move(local(pos)));
        }
    }
    if released {
        events.push(PointerEvent::Up);
    }
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.push(PointerEvent::Click(local(pos)));
        }
    }
    let hovered = response.hovered();
    if memory.hovered && !hovered {
        events.push(PointerEvent::Leave);
    }
    memory.hovered = hovered;
    events
}

pub fn heatmap_view_system(
    mut contexts: EguiContexts,
    mut session: ResMut<Session>,
    mut textures: ResMut<LiveTextures>,
    mut status: ResMut<StatusLine>,
    mut memory: Local<HoverMemory>,
) {
    let ctx = contexts.ctx_mut().clone();
    textures.sync(&ctx, &session);

    let Some(texture) = textures.heatmap.clone() else {
        return;
    };
    let size = texture.size_vec2();
    egui::Window::new("Heatmap")
        .default_pos(egui::pos2(10.0, 10.0))
        .resizable(false)
        .show(&ctx, |ui| {
            let response = ui.add(
                egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                    .fit_to_exact_size(size)
                    .sense(egui::Sense::click_and_drag()),
            );

            for event in pointer_events(ui, &response, &mut memory) {
                if let Err(err) = session.dispatch(event, response.rect.width()) {
                    status.error(format!("Interaction failed: {err}"));
                }
            }
            if response.hovered() && session.modes().brush {
                ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
            }
        });
}

pub fn chart_view_system(
    mut contexts: EguiContexts,
    textures: Res<LiveTextures>,
) {
    let Some(texture) = textures.chart.clone() else {
        return;
    };
    let size = texture.size_vec2();
    egui::Window::new("Concentration over time")
        .default_pos(egui::pos2(10.0, 560.0))
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.add(
                egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                    .fit_to_exact_size(size),
            );
        });
}
