// src/render/mod.rs
pub mod color;
pub mod color_scale;
pub mod heatmap;
pub mod raster;
pub mod scene;
pub mod svg;
pub mod timeseries;

pub use color::Color;
pub use color_scale::{ColorScale, HueFamily};
pub use heatmap::{HeatmapFrame, HeatmapRenderer};
pub use raster::{RasterError, RasterResult, Surface};
pub use scene::{Scene, Shape, ShapeGroup, TextAnchor, TextItem};
pub use timeseries::TimeSeriesRenderer;
