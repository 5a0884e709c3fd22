// src/render/color.rs

use std::fmt;

/// 8-Bit RGB-Farbe mit Deckkraft in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Eq for Color {}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Achsen und Beschriftung im Diagramm.
    pub const INK: Color = Color::rgb(0, 0, 0);
    pub const GRIDLINE: Color = Color::rgb(0xEE, 0xEE, 0xEE);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// `#RRGGBB` (ohne Alpha).
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_ignores_alpha() {
        let color = Color::rgb(0x00, 0x72, 0xB2);
        assert_eq!(color.hex(), "#0072B2");
        assert_eq!(color.with_alpha(0.3).hex(), "#0072B2");
        assert!(!color.with_alpha(0.3).is_opaque());
        assert_eq!(color.to_string(), "rgb(0,114,178)");
    }
}
