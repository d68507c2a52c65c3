//! HSV to RGB conversion

use palette::{encoding, FromColor, Hsv, Srgb};

/// Convert HSV to RGB
///
/// # Arguments
/// * `hue` - Degrees, any value (taken modulo 360)
/// * `sat` - Saturation, 0.0-1.0
/// * `val` - Value, 0.0-1.0
///
/// Returns `(r, g, b)`, each 0.0-1.0.
pub fn hsv_to_rgb(hue: f32, sat: f32, val: f32) -> (f32, f32, f32) {
    let sat = sat.clamp(0.0, 1.0);
    let val = val.clamp(0.0, 1.0);
    let hue = if hue.is_finite() {
        hue.rem_euclid(360.0)
    } else {
        0.0
    };

    let hsv: Hsv<encoding::Srgb, f32> = Hsv::new(hue, sat, val);
    let rgb: Srgb<f32> = Srgb::from_color(hsv);
    (rgb.red, rgb.green, rgb.blue)
}

/// An 8-bit RGB triple as written to DMX channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Create a new triple
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale unit-range components to 0-255, rounding to nearest
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: unit_to_byte(r),
            g: unit_to_byte(g),
            b: unit_to_byte(b),
        }
    }

    /// Fully saturated color at `hue` with brightness `value` (0-255)
    pub fn from_hue(hue: f32, value: u8) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, 1.0, value as f32 / 255.0);
        Self::from_unit(r, g, b)
    }

    /// Components in red, green, blue order
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
