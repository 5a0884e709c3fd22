// src/render/raster.rs
//
// Pixelflächen entstehen aus demselben SVG-Dokument wie der Vektor-Export:
// usvg parst, resvg rendert in eine tiny-skia-Pixmap.

use super::color::Color;
use super::scene::Scene;
use super::svg::scene_to_svg_string;
use bevy::log::debug;
use bevy_egui::egui::FontDefinitions;
use image::{Rgba, RgbaImage};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};
use usvg::fontdb::Database;
use usvg::{Options, Tree};

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("SVG could not be parsed: {0}")]
    Parse(#[from] usvg::Error),

    #[error("Pixmap allocation failed ({width}x{height})")]
    Allocation { width: u32, height: u32 },
}

pub type RasterResult<T> = Result<T, RasterError>;

/// Schriften für alle Rasterungen, einmal pro Prozess geladen.
///
/// Systemschriften sind optional; die mit egui ausgelieferten Schriften sind
/// immer vorhanden und decken `sans-serif` und `serif` ab.
fn font_database() -> Arc<Database> {
    static FONTS: OnceLock<Arc<Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = Database::new();
            for data in FontDefinitions::default().font_data.into_values() {
                db.load_font_data(data.font.to_vec());
            }
            let bundled = db
                .faces()
                .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
                .find(|name| name.starts_with("Ubuntu"))
                .or_else(|| {
                    db.faces()
                        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
                });
            db.load_system_fonts();
            if let Some(family) = bundled {
                db.set_sans_serif_family(family.clone());
                db.set_serif_family(family);
            }
            debug!("Font database ready ({} faces).", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Pixelpuffer einer Fläche (RGBA, nicht vormultipliziert).
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Einfarbige Fläche, etwa solange noch nichts gezeichnet wurde.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let Color { r, g, b, .. } = background;
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    /// Rendert eine Szene in ihrer eigenen Größe.
    pub fn from_scene(scene: &Scene) -> RasterResult<Self> {
        let width = scene.width.round().max(0.0) as u32;
        let height = scene.height.round().max(0.0) as u32;
        Self::from_scene_scaled(scene, width, height)
    }

    /// Rendert eine Szene auf `width` x `height` Pixel, Texte eingeschlossen.
    pub fn from_scene_scaled(scene: &Scene, width: u32, height: u32) -> RasterResult<Self> {
        let allocation = RasterError::Allocation { width, height };
        if scene.width <= 0.0 || scene.height <= 0.0 {
            return Err(allocation);
        }
        let mut options = Options::default();
        options.fontdb = font_database();
        let tree = Tree::from_data(scene_to_svg_string(scene).as_bytes(), &options)?;

        let mut pixmap = Pixmap::new(width, height).ok_or(allocation)?;
        pixmap.fill(tiny_skia::Color::WHITE);
        let transform = Transform::from_scale(
            width as f32 / scene.width,
            height as f32 / scene.height,
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut image = RgbaImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Rohdaten RGBA, zeilenweise.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width() && y < self.height()).then(|| {
            let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
            Color::rgb(r, g, b)
        })
    }

    /// Pixel im Bereich `[x0, x1) x [y0, y1)`, die nicht `background` sind.
    #[cfg(test)]
    pub(crate) fn count_differing(&self, x0: u32, y0: u32, x1: u32, y1: u32, background: Color) -> usize {
        (y0..y1.min(self.height()))
            .flat_map(|y| (x0..x1.min(self.width())).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixel(x, y) != Some(background))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::TextItem;
    use bevy::math::{Rect, Vec2};

    #[test]
    fn test_fill_and_background() {
        let mut scene = Scene::new(20.0, 10.0).with_background(Color::BLACK);
        scene
            .group("cells")
            .fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::rgb(0, 114, 178));
        let surface = Surface::from_scene(&scene).unwrap();
        assert_eq!((surface.width(), surface.height()), (20, 10));
        assert_eq!(surface.pixel(4, 4), Some(Color::rgb(0, 114, 178)));
        assert_eq!(surface.pixel(15, 4), Some(Color::BLACK));
    }

    #[test]
    fn test_adjacent_cells_leave_no_gap() {
        // 7 Zellen auf 20px: nicht ganzzahlige Kanten
        let mut scene = Scene::new(20.0, 4.0).with_background(Color::WHITE);
        let size = 20.0 / 7.0;
        let cells = scene.group("cells");
        for i in 0..7 {
            let x = i as f32 * size;
            cells.fill_rect(Rect::new(x, 0.0, x + size, 4.0), Color::BLACK);
        }
        let surface = Surface::from_scene(&scene).unwrap();
        assert_eq!(surface.count_differing(0, 0, 20, 4, Color::BLACK), 0);
    }

    #[test]
    fn test_alpha_overlay_blends() {
        let mut scene = Scene::new(4.0, 4.0).with_background(Color::BLACK);
        scene
            .group("overlay")
            .fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::WHITE.with_alpha(0.5));
        let surface = Surface::from_scene(&scene).unwrap();
        let Some(Color { r, .. }) = surface.pixel(2, 2) else {
            panic!("pixel out of range");
        };
        assert!((126..=129).contains(&r), "r = {r}");
    }

    #[test]
    fn test_text_is_rasterized() {
        let mut scene = Scene::new(120.0, 40.0).with_background(Color::WHITE);
        scene
            .group("labels")
            .text(TextItem::new(Vec2::new(5.0, 28.0), "Iteration", 20.0));
        let surface = Surface::from_scene(&scene).unwrap();
        assert!(surface.count_differing(0, 0, 120, 40, Color::WHITE) > 20);
    }

    #[test]
    fn test_scaled_render_and_empty_scene() {
        let mut scene = Scene::new(10.0, 10.0).with_background(Color::WHITE);
        scene
            .group("cells")
            .fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::BLACK);
        let surface = Surface::from_scene_scaled(&scene, 60, 60).unwrap();
        assert_eq!(surface.width(), 60);
        assert_eq!(surface.pixel(29, 29), Some(Color::BLACK));
        assert_eq!(surface.pixel(31, 31), Some(Color::WHITE));

        let empty = Scene::new(0.0, 0.0);
        assert!(matches!(
            Surface::from_scene(&empty),
            Err(RasterError::Allocation { .. })
        ));
    }
}
