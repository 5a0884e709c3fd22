// src/export/png.rs

use super::ExportResult;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// PNG-kodiert ein RGBA-Bild.
pub fn encode(image: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut cursor = Cursor::new(&mut bytes);
        image.write_to(&mut cursor, ImageFormat::Png)?;
    }
    Ok(bytes)
}
